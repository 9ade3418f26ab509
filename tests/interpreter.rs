#[cfg(test)]
mod interpreter_tests {
    use quill::interpreter::Interpreter;
    use quill::parser::Parser;
    use quill::resolver::Resolver;
    use quill::scanner::Scanner;
    use quill::token::Token;

    /// Run `source` through the whole pipeline, then read back the named
    /// globals as display strings.  Any error from any phase is returned as
    /// its first message.
    fn run_capture(source: &str, names: &[&str]) -> Result<Vec<String>, String> {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        let statements = Parser::new(&tokens)
            .parse()
            .map_err(|errors| errors[0].to_string())?;

        let mut interpreter = Interpreter::new();

        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .map_err(|errors| errors[0].to_string())?;

        interpreter.interpret(&statements).map_err(|e| e.to_string())?;

        Ok(names
            .iter()
            .map(|name| {
                interpreter
                    .global(name)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "<unset>".to_owned())
            })
            .collect())
    }

    fn run_one(source: &str, name: &str) -> Result<String, String> {
        run_capture(source, &[name]).map(|mut v| v.remove(0))
    }

    fn run_err(source: &str) -> String {
        run_capture(source, &[]).expect_err("expected an error")
    }

    // ───────────────────────── expressions ─────────────────────────

    #[test]
    fn arithmetic_and_grouping() {
        assert_eq!(run_one("var r = (1 + 2) * 3 - 4 / 2;", "r").unwrap(), "7");
    }

    #[test]
    fn string_concatenation_stringifies_either_side() {
        let r = run_capture(
            r#"var a = "a" + 1; var b = 2 + "b"; var c = "x" + nil + true;"#,
            &["a", "b", "c"],
        )
        .unwrap();

        assert_eq!(r, vec!["a1", "2b", "xniltrue"]);
    }

    #[test]
    fn list_concatenation_builds_a_new_list() {
        let r = run_capture(
            "var a = [1, 2]; var b = [3]; var c = a + b; a[0] = 9;",
            &["a", "b", "c"],
        )
        .unwrap();

        // Mutating `a` afterwards must not affect the concatenated list.
        assert_eq!(r, vec!["[9, 2]", "[3]", "[1, 2, 3]"]);
    }

    #[test]
    fn adding_incompatible_operands_fails() {
        assert_eq!(
            run_err("var r = true + 1;"),
            "[line 1] Runtime error: Invalid operands."
        );
    }

    #[test]
    fn division_by_zero_fails() {
        assert_eq!(
            run_err("var r = 1 / 0;"),
            "[line 1] Runtime error: Right operand cannot be 0."
        );
    }

    #[test]
    fn logical_operators_yield_operand_values() {
        let r = run_capture(
            r#"var a = nil or "fallback"; var b = "left" and "right"; var c = false and 1;"#,
            &["a", "b", "c"],
        )
        .unwrap();

        assert_eq!(r, vec!["fallback", "right", "false"]);
    }

    #[test]
    fn xor_is_boolean_and_eager() {
        let r = run_capture(
            "var a = true xor false; var b = 1 xor 2; var c = nil xor nil;",
            &["a", "b", "c"],
        )
        .unwrap();

        assert_eq!(r, vec!["true", "false", "false"]);
    }

    #[test]
    fn ternary_evaluates_one_branch() {
        let r = run_capture(
            r#"
            var taken = 0;
            fun mark() { taken = taken + 1; return "yes"; }
            var a = 1 < 2 ? mark() : mark();
            "#,
            &["a", "taken"],
        )
        .unwrap();

        assert_eq!(r, vec!["yes", "1"]);
    }

    #[test]
    fn comma_operator_yields_the_right_operand() {
        let r = run_capture(
            "var count = 0; fun tick() { count = count + 1; } var r = (tick(), 42);",
            &["r", "count"],
        )
        .unwrap();

        assert_eq!(r, vec!["42", "1"]);
    }

    #[test]
    fn compound_assignment() {
        let r = run_capture(
            "var a = 10; a += 5; var b = 10; b -= 5; var c = 10; c *= 5; var d = 10; d /= 5;",
            &["a", "b", "c", "d"],
        )
        .unwrap();

        assert_eq!(r, vec!["15", "5", "50", "2"]);
    }

    #[test]
    fn compound_assignment_concatenates_strings() {
        assert_eq!(
            run_one(r#"var s = "ab"; s += "cd";"#, "s").unwrap(),
            "abcd"
        );
    }

    #[test]
    fn prefix_increment_yields_the_new_value() {
        let r = run_capture("var a = 1; var b = ++a;", &["a", "b"]).unwrap();

        assert_eq!(r, vec!["2", "2"]);
    }

    #[test]
    fn postfix_increment_yields_the_old_value() {
        let r = run_capture("var a = 1; var b = a++; var c = a--;", &["a", "b", "c"]).unwrap();

        assert_eq!(r, vec!["1", "1", "2"]);
    }

    #[test]
    fn increment_works_through_properties_and_indexes() {
        let r = run_capture(
            r#"
            class Box {}
            var box = Box();
            box.n = 5;
            box.n++;
            var list = [1, 2];
            --list[1];
            "#,
            &["list"],
        )
        .unwrap();

        assert_eq!(r, vec!["[1, 1]"]);
    }

    // ───────────────────────── variables and scope ─────────────────────────

    #[test]
    fn shadowing_resolves_to_the_nearest_binding() {
        let r = run_one(
            r#"
            var x = "outer";
            var r = "unset";
            {
                var x = "inner";
                r = x;
            }
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "inner");
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        let r = run_capture(
            r#"
            fun makeCounter() {
                var count = 0;
                fun increment() { count = count + 1; return count; }
                return increment;
            }
            var counter = makeCounter();
            counter();
            var a = counter();
            var other = makeCounter();
            var b = other();
            "#,
            &["a", "b"],
        )
        .unwrap();

        assert_eq!(r, vec!["2", "1"]);
    }

    #[test]
    fn closure_capture_is_frozen_at_function_creation() {
        // The classic binding test: the closure keeps seeing the binding it
        // resolved, not a later shadowing one.
        let r = run_one(
            r#"
            var r = "unset";
            var a = "global";
            {
                fun read() { return a; }
                var first = read();
                var a = "block";
                var second = read();
                r = first + " " + second + " " + a;
            }
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "global global block");
    }

    #[test]
    fn unused_local_is_a_resolve_error() {
        assert_eq!(
            run_err("{ var dead = 1; }"),
            "[line 1] Error: Local variable 'dead' is unused."
        );
    }

    #[test]
    fn duplicate_local_declaration_is_an_error() {
        assert_eq!(
            run_err("{ var a = 1; var a = 2; print a; }"),
            "[line 1] Error: Already a variable with name 'a' in this scope."
        );
    }

    #[test]
    fn reading_a_local_in_its_own_initializer_is_an_error() {
        let err = run_err("{ var a = a; print a; }");

        assert!(err.contains("Can't read local variable in its own initializer"));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        assert_eq!(
            run_err("print missing;"),
            "[line 1] Runtime error: Undefined variable 'missing'."
        );
    }

    // ───────────────────────── control flow ─────────────────────────

    #[test]
    fn while_with_break_and_continue() {
        let r = run_one(
            r#"
            var sum = 0;
            var i = 0;
            var odd = false;
            while (true) {
                i = i + 1;
                odd = !odd;
                if (i > 10) break;
                if (!odd) continue;
                sum = sum + i;
            }
            "#,
            "sum",
        )
        .unwrap();

        // 1 + 3 + 5 + 7 + 9
        assert_eq!(r, "25");
    }

    #[test]
    fn aftereach_runs_after_continue_but_not_after_break() {
        let r = run_one(
            r#"
            var log = "";
            var i = 0;
            while (i < 5) {
                i = i + 1;
                if (i == 2) continue;
                if (i == 4) break;
                log = log + i;
            } aftereach log = log + ".";
            "#,
            "log",
        )
        .unwrap();

        assert_eq!(r, "1..3.");
    }

    #[test]
    fn for_loop_desugars_increment_into_aftereach() {
        let r = run_one(
            r#"
            var log = "";
            for (var i = 0; i < 3; i = i + 1) {
                if (i == 1) continue;
                log = log + i;
            }
            "#,
            "log",
        )
        .unwrap();

        // `continue` still reaches the increment, so the loop terminates.
        assert_eq!(r, "02");
    }

    #[test]
    fn for_loop_aftereach_runs_before_the_increment() {
        let r = run_one(
            r#"
            var log = "";
            for (var i = 0; i < 3; i = i + 1) {
                log = log + "b" + i;
            } aftereach log = log + "a" + i;
            "#,
            "log",
        )
        .unwrap();

        assert_eq!(r, "b0a0b1a1b2a2");
    }

    #[test]
    fn forall_iterates_list_elements_in_order() {
        let r = run_one(
            r#"
            fun sum(xs) {
                var total = 0;
                forall (x : xs) total = total + x;
                return total;
            }
            var r = sum([1, 2, 3, 4]);
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "10");
    }

    #[test]
    fn forall_iterates_string_characters() {
        let r = run_one(
            r#"
            var out = "";
            forall (c : "héllo") out = out + c + "-";
            "#,
            "out",
        )
        .unwrap();

        assert_eq!(r, "h-é-l-l-o-");
    }

    #[test]
    fn forall_honors_break_continue_and_aftereach() {
        let r = run_one(
            r#"
            var log = "";
            forall (n : [1, 2, 3, 4, 5]) {
                if (n == 2) continue;
                if (n == 4) break;
                log = log + n;
            } aftereach log = log + ".";
            "#,
            "log",
        )
        .unwrap();

        // `continue` reaches the aftereach clause, `break` does not.
        assert_eq!(r, "1..3.");
    }

    #[test]
    fn forall_loop_variable_keeps_its_last_binding() {
        let r = run_one(
            r#"
            var last = "start";
            forall (w : ["a", "b", "c"]) last = w;
            "#,
            "w",
        )
        .unwrap();

        assert_eq!(r, "c");
    }

    #[test]
    fn forall_over_a_non_sequence_is_a_runtime_error() {
        let err = run_err("forall (x : 5) print x;");

        assert_eq!(
            err,
            "[line 1] Runtime error: Can't iterate over a non-sequence."
        );
    }

    #[test]
    fn break_outside_a_loop_is_a_parse_error() {
        assert_eq!(
            run_err("break;"),
            "[line 1] Error: at 'break': Can't use 'break' outside of a loop."
        );
    }

    #[test]
    fn continue_outside_a_loop_is_a_parse_error() {
        assert_eq!(
            run_err("continue;"),
            "[line 1] Error: at 'continue': Can't use 'continue' outside of a loop."
        );
    }

    // ───────────────────────── functions ─────────────────────────

    #[test]
    fn falling_off_the_end_returns_nil() {
        assert_eq!(
            run_one("fun noop() {} var r = noop();", "r").unwrap(),
            "nil"
        );
    }

    #[test]
    fn anonymous_functions_are_values() {
        let r = run_one(
            r#"
            var twice = fun (f, x) { return f(f(x)); };
            var r = twice(fun (n) { return n + 1; }, 5);
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "7");
    }

    #[test]
    fn wrong_arity_is_a_runtime_error() {
        assert_eq!(
            run_err("fun f(a, b) { return a + b; } f(1);"),
            "[line 1] Runtime error: Expected 2 arguments but got 1 instead."
        );
    }

    #[test]
    fn calling_a_non_callable_fails() {
        assert_eq!(
            run_err("var x = 1; x();"),
            "[line 1] Runtime error: Calling an uncallable thing."
        );
    }

    #[test]
    fn return_outside_a_function_is_a_resolve_error() {
        assert_eq!(
            run_err("return 1;"),
            "[line 1] Error: Can't return outside of a function."
        );
    }

    #[test]
    fn recursion() {
        assert_eq!(
            run_one(
                "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } var r = fib(12);",
                "r"
            )
            .unwrap(),
            "144"
        );
    }

    // ───────────────────────── sequences ─────────────────────────

    #[test]
    fn list_index_read_and_write() {
        let r = run_capture(
            "var l = [1, 2, 3]; var a = l[1]; l[2] = 9;",
            &["a", "l"],
        )
        .unwrap();

        assert_eq!(r, vec!["2", "[1, 2, 9]"]);
    }

    #[test]
    fn string_indexing_yields_single_character_strings() {
        let r = run_capture(
            r#"var s = "héllo"; var a = s[1]; var n = length(s);"#,
            &["a", "n"],
        )
        .unwrap();

        assert_eq!(r, vec!["é", "5"]);
    }

    #[test]
    fn string_elements_cannot_be_assigned() {
        assert_eq!(
            run_err(r#"var s = "abc"; s[0] = "x";"#),
            "[line 1] Runtime error: Cannot set index of a string, strings are immutable."
        );
    }

    #[test]
    fn index_out_of_range() {
        assert_eq!(
            run_err("var l = [1]; var r = l[1];"),
            "[line 1] Runtime error: Indexing out of range of sequence."
        );
        assert_eq!(
            run_err("var l = [1]; var r = l[-1];"),
            "[line 1] Runtime error: Indexing out of range of sequence."
        );
    }

    #[test]
    fn fractional_indexes_truncate() {
        assert_eq!(run_one("var r = [10, 20][1.7];", "r").unwrap(), "20");
    }

    #[test]
    fn indexing_a_non_sequence_fails() {
        assert_eq!(
            run_err("var r = 5[0];"),
            "[line 1] Runtime error: Indexing something that is not a sequence."
        );
    }

    #[test]
    fn non_numeric_index_fails() {
        assert_eq!(
            run_err(r#"var r = [1]["x"];"#),
            "[line 1] Runtime error: Index to sequence is not a number."
        );
    }

    #[test]
    fn length_of_non_sequence_is_nil() {
        assert_eq!(run_one("var r = length(5);", "r").unwrap(), "nil");
    }

    // ───────────────────────── classes ─────────────────────────

    #[test]
    fn fields_and_methods() {
        let r = run_one(
            r#"
            class Counter {
                init() { this.count = 0; }
                bump() { this.count = this.count + 1; return this.count; }
            }
            var c = Counter();
            c.bump();
            var r = c.bump();
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "2");
    }

    #[test]
    fn init_returns_the_instance() {
        let r = run_one(
            r#"
            class Thing { init() { this.x = 1; return; } }
            var r = Thing().x;
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "1");
    }

    #[test]
    fn inheritance_and_super() {
        let r = run_one(
            r#"
            class A {
                describe() { return "A"; }
            }
            class B < A {
                describe() { return super.describe() + "B"; }
            }
            class C < B {}
            var r = C().describe();
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "AB");
    }

    #[test]
    fn bound_methods_remember_their_receiver() {
        let r = run_one(
            r#"
            class Greeter {
                init(name) { this.name = name; }
                greet() { return "hi " + this.name; }
            }
            var method = Greeter("ada").greet;
            var r = method();
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "hi ada");
    }

    #[test]
    fn static_methods_are_called_on_the_class() {
        let r = run_one(
            r#"
            class Math {
                static {
                    square(n) { return n * n; }
                }
            }
            var r = Math.square(6);
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "36");
    }

    #[test]
    fn static_this_is_the_class_object() {
        let r = run_one(
            r#"
            class Config {
                static {
                    set(v) { this.value = v; }
                    get() { return this.value; }
                }
            }
            Config.set(7);
            var r = Config.get();
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "7");
    }

    #[test]
    fn class_fields_live_on_the_class() {
        let r = run_one(
            r#"
            class Registry {}
            Registry.count = 3;
            var r = Registry.count;
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "3");
    }

    #[test]
    fn static_lookup_falls_back_to_the_superclass() {
        let r = run_one(
            r#"
            class Base {
                shared() { return "from base"; }
            }
            class Derived < Base {
                static { }
            }
            var r = Derived.shared();
            "#,
            "r",
        )
        .unwrap();

        assert_eq!(r, "from base");
    }

    #[test]
    fn superclass_must_be_a_class() {
        assert_eq!(
            run_err("var NotAClass = 1; class Broken < NotAClass {} print Broken;"),
            "[line 1] Runtime error: Superclass must be a class."
        );
    }

    #[test]
    fn class_cannot_inherit_from_itself() {
        assert_eq!(
            run_err("{ class Loop < Loop {} print Loop; }"),
            "[line 1] Error: A class cannot inherit from itself."
        );
    }

    #[test]
    fn this_outside_a_class_is_a_resolve_error() {
        assert_eq!(
            run_err("print this;"),
            "[line 1] Error: Cannot use 'this' outside of a class."
        );
    }

    #[test]
    fn super_in_a_static_method_is_a_resolve_error() {
        let err = run_err(
            r#"
            class A { m() { return 1; } }
            class B < A {
                static {
                    m() { return super.m(); }
                }
            }
            print B;
            "#,
        );

        assert!(err.contains("Cannot use 'super' inside a static method."));
    }

    #[test]
    fn class_nested_in_a_static_method_may_use_super() {
        let r = run_one(
            r#"
            class Base {
                g() { return "base"; }
            }
            class Maker {
                static {
                    build() {
                        class Sub < Base {
                            m() { return super.g(); }
                        }
                        return Sub();
                    }
                }
            }
            var r = Maker.build().m();
            "#,
            "r",
        );

        assert_eq!(r.unwrap(), "base");
    }

    #[test]
    fn super_in_a_static_after_a_nested_class_is_still_an_error() {
        let err = run_err(
            r#"
            class Base {
                g() { return 1; }
            }
            class Outer < Base {
                static {
                    first() {
                        class Inner { m() { return 2; } }
                        return Inner;
                    }
                    bad() { return super.g(); }
                }
            }
            print Outer;
            "#,
        );

        assert!(err.contains("Cannot use 'super' inside a static method."));
    }

    #[test]
    fn init_in_a_static_block_is_a_resolve_error() {
        let err = run_err(
            r#"
            class A {
                static {
                    init() { return; }
                }
            }
            print A;
            "#,
        );

        assert!(err.contains("Can't declare 'init' in static context in class 'A'."));
    }

    #[test]
    fn returning_a_value_from_init_is_a_resolve_error() {
        let err = run_err("class A { init() { return 1; } } print A;");

        assert!(err.contains("Can't return a value in 'init' constructor."));
    }

    #[test]
    fn undefined_property_names_the_class() {
        assert_eq!(
            run_err("class A {} A().missing;"),
            "[line 1] Runtime error: Undefined property 'missing' on instance of class 'A'."
        );
    }

    #[test]
    fn property_access_on_a_non_instance_fails() {
        assert_eq!(
            run_err("var x = 1; x.field;"),
            "[line 1] Runtime error: Tried to access property from something not an instance of a class."
        );
    }

    // ───────────────────────── natives and exit ─────────────────────────

    #[test]
    fn clock_is_a_number() {
        let r = run_one("var r = clock() > 0;", "r").unwrap();

        assert_eq!(r, "true");
    }

    #[test]
    fn exit_stops_the_program_cleanly() {
        let source = "var before = 1; exit(); var after = 2;";

        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter).resolve(&statements).unwrap();

        assert_eq!(interpreter.interpret(&statements).unwrap(), false);
        assert!(interpreter.global("before").is_some());
        assert!(interpreter.global("after").is_none());
    }

    #[test]
    fn resolving_twice_is_deterministic() {
        let source = r#"
        fun outer() {
            var x = 1;
            fun inner() { return x; }
            return inner();
        }
        var r = outer();
        "#;

        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter).resolve(&statements).unwrap();
        Resolver::new(&mut interpreter).resolve(&statements).unwrap();

        interpreter.interpret(&statements).unwrap();

        assert_eq!(interpreter.global("r").unwrap().to_string(), "1");
    }
}
