//! Module `parser` implements a recursive‑descent parser over the scanned token
//! stream.
//!
//! The parser is error‑tolerant: a malformed declaration is recorded and the
//! parser *synchronizes* to the next statement boundary, so one pass reports
//! every syntax error in the input.  `parse` returns the statement list only if
//! no error was recorded.
//!
//! Several surface forms are desugared here rather than in the evaluator:
//!
//! - `x += e` (and `-= *= /=`) becomes an assignment whose value is a `Binary`
//!   node reusing the compound operator token.
//! - Prefix `++x` / `--x` become the equivalent compound assignment with a
//!   literal `1` operand.
//! - Postfix `x++` / `x--` become an [`Expr::Post`] pairing the read with the
//!   same compound assignment, so they yield the value before the update.
//! - `for` loops become a block holding the initializer and a `while` whose
//!   `aftereach` slot carries the increment clause (after any user‑written
//!   `aftereach` statement).

use crate::ast::{Expr, ExprId, FunDecl, LiteralValue, Method, Stmt};
use crate::error::{QuillError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use std::rc::Rc;

pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    /// How many enclosing loops the parser is currently inside; `break` and
    /// `continue` are rejected at depth zero.
    loop_depth: usize,
    next_expr_id: ExprId,
    errors: Vec<QuillError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created over {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            loop_depth: 0,
            next_expr_id: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the whole program.  On any syntax error, every error found is
    /// returned and the (partial) statement list is discarded.
    pub fn parse(mut self) -> std::result::Result<Vec<Stmt<'a>>, Vec<QuillError>> {
        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        if self.errors.is_empty() {
            debug!("Parsed {} top-level statements", statements.len());

            Ok(statements)
        } else {
            Err(self.errors)
        }
    }

    // ───────────────────────────── token plumbing ───────────────────────────

    fn peek(&self) -> &'a Token<'a> {
        &self.tokens[self.current]
    }

    fn peek_next(&self) -> &'a Token<'a> {
        if self.current + 1 < self.tokens.len() {
            &self.tokens[self.current + 1]
        } else {
            self.peek()
        }
    }

    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    /// Discriminant comparison, so payload variants match regardless of value.
    fn check(&self, tt: &TokenType) -> bool {
        self.peek().token_type == *tt
    }

    fn match_token(&mut self, types: &[TokenType]) -> bool {
        for tt in types {
            if self.check(tt) {
                self.advance();

                return true;
            }
        }

        false
    }

    fn consume(&mut self, tt: &TokenType, msg: &str) -> Result<&'a Token<'a>> {
        if self.check(tt) {
            Ok(self.advance())
        } else {
            Err(self.error_at(self.peek(), msg))
        }
    }

    fn error_at(&self, token: &Token<'a>, msg: &str) -> QuillError {
        let location = if matches!(token.token_type, TokenType::EOF) {
            format!("at end: {}", msg)
        } else {
            format!("at '{}': {}", token.lexeme, msg)
        };

        QuillError::parse(token.line, location)
    }

    fn next_id(&mut self) -> ExprId {
        let id = self.next_expr_id;
        self.next_expr_id += 1;

        id
    }

    /// Skip tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::FORALL
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ───────────────────────────── declarations ─────────────────────────────

    /// One declaration, or `None` after recording an error and synchronizing.
    fn declaration(&mut self) -> Option<Stmt<'a>> {
        let result = if self.match_token(&[TokenType::CLASS]) {
            self.class_declaration()
        } else if self.check(&TokenType::FUN)
            && matches!(self.peek_next().token_type, TokenType::IDENTIFIER)
        {
            // `fun` followed by a name is a declaration; a bare `fun` is an
            // anonymous function expression and falls through to `statement`.
            self.advance();

            self.function_declaration()
        } else if self.match_token(&[TokenType::VAR]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(err) => {
                self.errors.push(err);
                self.synchronize();

                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt<'a>> {
        let name = self.consume(&TokenType::IDENTIFIER, "Expect class name.")?;

        let superclass = if self.match_token(&[TokenType::LESS]) {
            let super_name = self.consume(&TokenType::IDENTIFIER, "Expect superclass name.")?;

            Some(Expr::Variable {
                id: self.next_id(),
                name: super_name,
            })
        } else {
            None
        };

        self.consume(&TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Method<'a>> = Vec::new();
        let mut statics: Vec<Method<'a>> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if self.match_token(&[TokenType::STATIC]) {
                self.consume(&TokenType::LEFT_BRACE, "Expect '{' after 'static'.")?;

                while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
                    statics.push(self.method()?);
                }

                self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after static block.")?;
            } else {
                methods.push(self.method()?);
            }
        }

        self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
            statics,
        })
    }

    fn method(&mut self) -> Result<Method<'a>> {
        let name = self.consume(&TokenType::IDENTIFIER, "Expect method name.")?;
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after method name.")?;
        let declaration = self.params_and_body("method")?;

        Ok(Method { name, declaration })
    }

    fn function_declaration(&mut self) -> Result<Stmt<'a>> {
        let name = self.consume(&TokenType::IDENTIFIER, "Expect function name.")?;
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after function name.")?;
        let declaration = self.params_and_body("function")?;

        Ok(Stmt::Function { name, declaration })
    }

    /// Parameter list and body, starting just after the opening parenthesis.
    fn params_and_body(&mut self, kind: &str) -> Result<Rc<FunDecl<'a>>> {
        let mut params: Vec<&'a Token<'a>> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= 255 {
                    self.errors
                        .push(self.error_at(self.peek(), "Can't have more than 255 parameters."));
                }

                params.push(self.consume(&TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.match_token(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;
        self.consume(
            &TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {} body.", kind),
        )?;

        let body = self.block()?;

        Ok(Rc::new(FunDecl { params, body }))
    }

    fn var_declaration(&mut self) -> Result<Stmt<'a>> {
        let name = self.consume(&TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer = if self.match_token(&[TokenType::EQUAL]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            &TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────────── statements ───────────────────────────────

    fn statement(&mut self) -> Result<Stmt<'a>> {
        if self.match_token(&[TokenType::FOR]) {
            self.for_statement()
        } else if self.match_token(&[TokenType::FORALL]) {
            self.forall_statement()
        } else if self.match_token(&[TokenType::IF]) {
            self.if_statement()
        } else if self.match_token(&[TokenType::PRINT]) {
            self.print_statement()
        } else if self.match_token(&[TokenType::RETURN]) {
            self.return_statement()
        } else if self.match_token(&[TokenType::WHILE]) {
            self.while_statement()
        } else if self.match_token(&[TokenType::BREAK]) {
            self.break_statement()
        } else if self.match_token(&[TokenType::CONTINUE]) {
            self.continue_statement()
        } else if self.match_token(&[TokenType::LEFT_BRACE]) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    /// Statements up to (and consuming) the closing brace.
    fn block(&mut self) -> Result<Vec<Stmt<'a>>> {
        let mut statements: Vec<Stmt<'a>> = Vec::new();

        while !self.check(&TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(&TokenType::RIGHT_BRACE, "Expect '}' after block.")?;

        Ok(statements)
    }

    fn if_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&[TokenType::ELSE]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> Result<Stmt<'a>> {
        let value = self.expression()?;
        self.consume(&TokenType::SEMICOLON, "Expect ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt<'a>> {
        let keyword = self.previous();

        let value = if !self.check(&TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(&TokenType::SEMICOLON, "Expect ';' after return value.")?;

        Ok(Stmt::Return { keyword, value })
    }

    fn break_statement(&mut self) -> Result<Stmt<'a>> {
        let keyword = self.previous();

        if self.loop_depth == 0 {
            return Err(self.error_at(keyword, "Can't use 'break' outside of a loop."));
        }

        self.consume(&TokenType::SEMICOLON, "Expect ';' after 'break'.")?;

        Ok(Stmt::Break(keyword))
    }

    fn continue_statement(&mut self) -> Result<Stmt<'a>> {
        let keyword = self.previous();

        if self.loop_depth == 0 {
            return Err(self.error_at(keyword, "Can't use 'continue' outside of a loop."));
        }

        self.consume(&TokenType::SEMICOLON, "Expect ';' after 'continue'.")?;

        Ok(Stmt::Continue(keyword))
    }

    fn while_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;

        let (body, aftereach) = self.loop_body()?;

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
            aftereach: aftereach.map(Box::new),
        })
    }

    fn for_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.match_token(&[TokenType::SEMICOLON]) {
            None
        } else if self.match_token(&[TokenType::VAR]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(&TokenType::SEMICOLON) {
            self.expression()?
        } else {
            Expr::Literal(LiteralValue::True)
        };
        self.consume(&TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if !self.check(&TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let (body, user_aftereach) = self.loop_body()?;

        // The written `aftereach` clause runs first, then the increment.
        let aftereach = match (user_aftereach, increment) {
            (Some(after), Some(inc)) => {
                Some(Stmt::Block(vec![after, Stmt::Expression(inc)]))
            }
            (Some(after), None) => Some(after),
            (None, Some(inc)) => Some(Stmt::Expression(inc)),
            (None, None) => None,
        };

        let desugared = Stmt::While {
            condition,
            body: Box::new(body),
            aftereach: aftereach.map(Box::new),
        };

        Ok(match initializer {
            Some(init) => Stmt::Block(vec![init, desugared]),
            None => desugared,
        })
    }

    /// `forall (name : sequence) body` iterates a list or string, rebinding
    /// `name` to each element in turn.
    fn forall_statement(&mut self) -> Result<Stmt<'a>> {
        self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'forall'.")?;
        let name = self.consume(&TokenType::IDENTIFIER, "Expect loop variable name.")?;
        self.consume(&TokenType::COLON, "Expect ':' after loop variable.")?;
        let sequence = self.expression()?;
        self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after sequence.")?;

        let (body, aftereach) = self.loop_body()?;

        Ok(Stmt::Forall {
            name,
            sequence,
            body: Box::new(body),
            aftereach: aftereach.map(Box::new),
        })
    }

    /// Loop body plus optional `aftereach` clause, with depth tracking around
    /// both so nested `break`/`continue` validate correctly.
    fn loop_body(&mut self) -> Result<(Stmt<'a>, Option<Stmt<'a>>)> {
        self.loop_depth += 1;

        let body = self.statement();
        let aftereach = match &body {
            Ok(_) if self.match_token(&[TokenType::AFTEREACH]) => Some(self.statement()),
            _ => None,
        };

        self.loop_depth -= 1;

        let aftereach = match aftereach {
            Some(result) => Some(result?),
            None => None,
        };

        Ok((body?, aftereach))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'a>> {
        let expr = self.expression()?;
        self.consume(&TokenType::SEMICOLON, "Expect ';' after expression.")?;

        Ok(Stmt::Expression(expr))
    }

    // ───────────────────────────── expressions ──────────────────────────────

    /// expression → comma
    fn expression(&mut self) -> Result<Expr<'a>> {
        self.comma()
    }

    /// comma → assignment ( "," assignment )*
    fn comma(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.assignment()?;

        while self.match_token(&[TokenType::COMMA]) {
            let operator = self.previous();
            let right = self.assignment()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// assignment → ternary ( ( "=" | "+=" | "-=" | "*=" | "/=" ) assignment )?
    fn assignment(&mut self) -> Result<Expr<'a>> {
        let expr = self.ternary()?;

        if self.match_token(&[
            TokenType::EQUAL,
            TokenType::PLUS_EQUAL,
            TokenType::MINUS_EQUAL,
            TokenType::STAR_EQUAL,
            TokenType::SLASH_EQUAL,
        ]) {
            let operator = self.previous();
            let value = self.assignment()?;

            return self.build_assignment(expr, operator, value);
        }

        Ok(expr)
    }

    /// Turn `target op value` into the matching store node.  Compound
    /// operators wrap the value in a `Binary` over a copy of the target, so
    /// `a.b += 1` reads `a.b` once more than a plain `=` would.
    fn build_assignment(
        &mut self,
        target: Expr<'a>,
        operator: &'a Token<'a>,
        value: Expr<'a>,
    ) -> Result<Expr<'a>> {
        let value = if matches!(operator.token_type, TokenType::EQUAL) {
            value
        } else {
            Expr::Binary {
                left: Box::new(target.clone()),
                operator,
                right: Box::new(value),
            }
        };

        match target {
            Expr::Variable { name, .. } => Ok(Expr::Assign {
                id: self.next_id(),
                name,
                value: Box::new(value),
            }),
            Expr::Get { object, name } => Ok(Expr::Set {
                object,
                name,
                value: Box::new(value),
            }),
            Expr::Index {
                object,
                bracket,
                index,
            } => Ok(Expr::SetIndex {
                object,
                bracket,
                index,
                value: Box::new(value),
            }),
            _ => Err(self.error_at(operator, "Invalid assignment target.")),
        }
    }

    /// ternary → or ( "?" assignment ":" assignment )?
    fn ternary(&mut self) -> Result<Expr<'a>> {
        let expr = self.or()?;

        if self.match_token(&[TokenType::QUESTION]) {
            let if_true = self.assignment()?;
            self.consume(&TokenType::COLON, "Expect ':' in ternary expression.")?;
            let if_false = self.assignment()?;

            return Ok(Expr::Conditional {
                condition: Box::new(expr),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            });
        }

        Ok(expr)
    }

    /// or → and ( "or" and )*
    fn or(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.and()?;

        while self.match_token(&[TokenType::OR]) {
            let operator = self.previous();
            let right = self.and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// and → xor ( "and" xor )*
    fn and(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.xor()?;

        while self.match_token(&[TokenType::AND]) {
            let operator = self.previous();
            let right = self.xor()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// xor → equality ( "xor" equality )*
    ///
    /// `xor` cannot short‑circuit, so it is an ordinary binary operator.
    fn xor(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.equality()?;

        while self.match_token(&[TokenType::XOR]) {
            let operator = self.previous();
            let right = self.equality()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// equality → comparison ( ( "!=" | "==" ) comparison )*
    fn equality(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.comparison()?;

        while self.match_token(&[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL]) {
            let operator = self.previous();
            let right = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )*
    fn comparison(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.term()?;

        while self.match_token(&[
            TokenType::GREATER,
            TokenType::GREATER_EQUAL,
            TokenType::LESS,
            TokenType::LESS_EQUAL,
        ]) {
            let operator = self.previous();
            let right = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// term → factor ( ( "-" | "+" ) factor )*
    fn term(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.factor()?;

        while self.match_token(&[TokenType::MINUS, TokenType::PLUS]) {
            let operator = self.previous();
            let right = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// factor → unary ( ( "/" | "*" ) unary )*
    fn factor(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.unary()?;

        while self.match_token(&[TokenType::SLASH, TokenType::STAR]) {
            let operator = self.previous();
            let right = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// unary → ( "!" | "-" | "++" | "--" ) unary | postfix
    fn unary(&mut self) -> Result<Expr<'a>> {
        if self.match_token(&[TokenType::BANG, TokenType::MINUS]) {
            let operator = self.previous();
            let right = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        if self.match_token(&[TokenType::PLUS_PLUS, TokenType::MINUS_MINUS]) {
            let operator = self.previous();
            let target = self.unary()?;

            // `++x` is `x += 1`, yielding the updated value.
            return self.build_assignment(
                target,
                operator,
                Expr::Literal(LiteralValue::Number(1.0)),
            );
        }

        self.postfix()
    }

    /// postfix → call ( "++" | "--" )*
    fn postfix(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.call()?;

        while self.match_token(&[TokenType::PLUS_PLUS, TokenType::MINUS_MINUS]) {
            let operator = self.previous();

            // `x++` reads the current value, then applies `x += 1`.
            let effect = self.build_assignment(
                expr.clone(),
                operator,
                Expr::Literal(LiteralValue::Number(1.0)),
            )?;

            expr = Expr::Post {
                value: Box::new(expr),
                effect: Box::new(effect),
            };
        }

        Ok(expr)
    }

    /// call → primary ( "(" arguments? ")" | "." IDENTIFIER | "[" expression "]" )*
    fn call(&mut self) -> Result<Expr<'a>> {
        let mut expr = self.primary()?;

        loop {
            if self.match_token(&[TokenType::LEFT_PAREN]) {
                expr = self.finish_call(expr)?;
            } else if self.match_token(&[TokenType::DOT]) {
                let name =
                    self.consume(&TokenType::IDENTIFIER, "Expect property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else if self.match_token(&[TokenType::LEFT_BRACKET]) {
                let bracket = self.previous();
                let index = self.expression()?;
                self.consume(&TokenType::RIGHT_BRACKET, "Expect ']' after index.")?;

                expr = Expr::Index {
                    object: Box::new(expr),
                    bracket,
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr<'a>) -> Result<Expr<'a>> {
        let mut arguments: Vec<Expr<'a>> = Vec::new();

        if !self.check(&TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= 255 {
                    self.errors
                        .push(self.error_at(self.peek(), "Can't have more than 255 arguments."));
                }

                arguments.push(self.assignment()?);

                if !self.match_token(&[TokenType::COMMA]) {
                    break;
                }
            }
        }

        let paren = self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr<'a>> {
        let token = self.peek();

        match &token.token_type {
            TokenType::FALSE => {
                self.advance();

                Ok(Expr::Literal(LiteralValue::False))
            }
            TokenType::TRUE => {
                self.advance();

                Ok(Expr::Literal(LiteralValue::True))
            }
            TokenType::NIL => {
                self.advance();

                Ok(Expr::Literal(LiteralValue::Nil))
            }
            TokenType::NUMBER(n) => {
                let n = *n;
                self.advance();

                Ok(Expr::Literal(LiteralValue::Number(n)))
            }
            TokenType::STRING(s) => {
                let s = s.clone();
                self.advance();

                Ok(Expr::Literal(LiteralValue::Str(s)))
            }
            TokenType::IDENTIFIER => {
                let name = self.advance();

                Ok(Expr::Variable {
                    id: self.next_id(),
                    name,
                })
            }
            TokenType::THIS => {
                let keyword = self.advance();

                Ok(Expr::This {
                    id: self.next_id(),
                    keyword,
                })
            }
            TokenType::SUPER => {
                let keyword = self.advance();
                self.consume(&TokenType::DOT, "Expect '.' after 'super'.")?;
                let method =
                    self.consume(&TokenType::IDENTIFIER, "Expect superclass method name.")?;

                Ok(Expr::Super {
                    id: self.next_id(),
                    keyword,
                    method,
                })
            }
            TokenType::FUN => {
                self.advance();
                self.consume(&TokenType::LEFT_PAREN, "Expect '(' after 'fun'.")?;
                let declaration = self.params_and_body("function")?;

                Ok(Expr::Fun(declaration))
            }
            TokenType::LEFT_PAREN => {
                self.advance();
                let expr = self.expression()?;
                self.consume(&TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;

                Ok(Expr::Grouping(Box::new(expr)))
            }
            TokenType::LEFT_BRACKET => {
                let bracket = self.advance();
                let mut items: Vec<Expr<'a>> = Vec::new();

                if !self.check(&TokenType::RIGHT_BRACKET) {
                    loop {
                        items.push(self.assignment()?);

                        if !self.match_token(&[TokenType::COMMA]) {
                            break;
                        }
                    }
                }

                self.consume(&TokenType::RIGHT_BRACKET, "Expect ']' after list items.")?;

                Ok(Expr::List { bracket, items })
            }
            _ => Err(self.error_at(token, "Expect expression.")),
        }
    }
}
