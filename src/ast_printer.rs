use crate::ast::{Expr, LiteralValue, Method, Stmt};

/// Renders the tree in Crafting‑Interpreters prefix form, for the `parse`
/// subcommand and parser tests.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3.0 → 3.0
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            // ── binary / logical operators ──────────────────────────────
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            // ── ternary ─────────────────────────────────────────────────
            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => format!(
                "(?: {} {} {})",
                Self::print(condition),
                Self::print(if_true),
                Self::print(if_false)
            ),

            // ── variables and assignment ────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.into(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            // ── calls and property access ───────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(=. {} {} {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            // ── sequences ───────────────────────────────────────────────
            Expr::Index { object, index, .. } => {
                format!("([] {} {})", Self::print(object), Self::print(index))
            }

            Expr::SetIndex {
                object,
                index,
                value,
                ..
            } => format!(
                "(=[] {} {} {})",
                Self::print(object),
                Self::print(index),
                Self::print(value)
            ),

            Expr::List { items, .. } => {
                let mut s = String::from("(list");
                for item in items {
                    s.push(' ');
                    s.push_str(&Self::print(item));
                }
                s.push(')');
                s
            }

            // ── functions and classes ───────────────────────────────────
            Expr::Fun(declaration) => {
                let mut s = String::from("(fun (");
                for (i, param) in declaration.params.iter().enumerate() {
                    if i > 0 {
                        s.push(' ');
                    }
                    s.push_str(param.lexeme);
                }
                s.push(')');
                for stmt in &declaration.body {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(stmt));
                }
                s.push(')');
                s
            }

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            Expr::Post { effect, .. } => format!("(post {})", Self::print(effect)),
        }
    }

    pub fn print_stmt(stmt: &Stmt<'_>) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(expr {})", Self::print(expr)),

            Stmt::Print(expr) => format!("(print {})", Self::print(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.lexeme, Self::print(init)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut s = String::from("(block");
                for stmt in statements {
                    s.push(' ');
                    s.push_str(&Self::print_stmt(stmt));
                }
                s.push(')');
                s
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch),
                    Self::print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    Self::print(condition),
                    Self::print_stmt(then_branch)
                ),
            },

            Stmt::While {
                condition,
                body,
                aftereach,
            } => match aftereach {
                Some(after) => format!(
                    "(while {} {} aftereach {})",
                    Self::print(condition),
                    Self::print_stmt(body),
                    Self::print_stmt(after)
                ),
                None => format!(
                    "(while {} {})",
                    Self::print(condition),
                    Self::print_stmt(body)
                ),
            },

            Stmt::Forall {
                name,
                sequence,
                body,
                aftereach,
            } => match aftereach {
                Some(after) => format!(
                    "(forall {} {} {} aftereach {})",
                    name.lexeme,
                    Self::print(sequence),
                    Self::print_stmt(body),
                    Self::print_stmt(after)
                ),
                None => format!(
                    "(forall {} {} {})",
                    name.lexeme,
                    Self::print(sequence),
                    Self::print_stmt(body)
                ),
            },

            Stmt::Break(_) => "(break)".into(),

            Stmt::Continue(_) => "(continue)".into(),

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", Self::print(value)),
                None => "(return)".into(),
            },

            Stmt::Function { name, declaration } => {
                format!(
                    "(fun {} {})",
                    name.lexeme,
                    Self::print(&Expr::Fun(declaration.clone()))
                )
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                statics,
            } => {
                let mut s = format!("(class {}", name.lexeme);

                if let Some(superclass) = superclass {
                    s.push_str(" < ");
                    s.push_str(&Self::print(superclass));
                }

                let push_methods = |label: &str, list: &[Method<'_>], s: &mut String| {
                    for method in list {
                        s.push(' ');
                        s.push_str(label);
                        s.push(' ');
                        s.push_str(method.name.lexeme);
                    }
                };

                push_methods("method", methods, &mut s);
                push_methods("static", statics, &mut s);

                s.push(')');
                s
            }
        }
    }
}
