use super::*;
use crate::interpreter::lexer::Lexer;

fn parse(source: &str) -> ParseResult<Program> {
    Parser::new(Lexer::new(source).tokenize().unwrap()).parse()
}

fn parse_debug(source: &str) -> String {
    format!("{:?}", parse(source).unwrap())
}

mod expressions {
    use super::*;

    #[test]
    fn precedence() {
        assert_eq!(parse_debug("say 2 + 3 * 4"), "say (2 + (3 * 4))");
        assert_eq!(parse_debug("say (2 + 3) * 4"), "say ((2 + 3) * 4)");
        assert_eq!(parse_debug("say 10 - 4 - 3"), "say ((10 - 4) - 3)");
        assert_eq!(parse_debug("say 1 + 2 < 4 == true"), "say (((1 + 2) < 4) == true)");
        assert_eq!(parse_debug("say a or b and c"), "say (a or (b and c))");
        assert_eq!(parse_debug("say x % 3 == 0 and not done"), "say (((x % 3) == 0) and (not done))");
    }

    #[test]
    fn unary_chains() {
        assert_eq!(parse_debug("say --x"), "say (-(-x))");
        assert_eq!(parse_debug("say not not 0"), "say (not (not 0))");
        assert_eq!(parse_debug("say -(5 + 3) * 2"), "say ((-(5 + 3)) * 2)");
    }

    #[test]
    fn parentheses_are_kept_in_the_tree() {
        let program = parse("say (1)").unwrap();

        assert_eq!(program.statements, vec![Stmt::Say(Expr::Parenthesized(Box::new(Expr::NumberLiteral(1.0))))]);
    }

    #[test]
    fn calls_and_input() {
        assert_eq!(parse_debug("say max(1, a + 2)"), "say max(1, (a + 2))");
        assert_eq!(parse_debug("say now()"), "say now()");
        assert_eq!(parse_debug("kas name = input(\"Name: \")"), "kas name = input(\"Name: \")");
        assert_eq!(parse_debug("kas line = input()"), "kas line = input()");
    }

    #[test]
    fn string_escapes() {
        let program = parse(r#"say "a\tb\n\"q\" \\ \x" + 'it\'s'"#).unwrap();

        assert_eq!(program.statements, vec![Stmt::Say(Expr::BinaryOperation {
            left: Box::new(Expr::StringLiteral(String::from("a\tb\n\"q\" \\ \\x"))),
            operator: BinaryOperator::Add,
            right: Box::new(Expr::StringLiteral(String::from("it's"))),
        })]);
    }

    #[test]
    fn decimal_numbers() {
        assert_eq!(parse("say 3.25").unwrap().statements, vec![Stmt::Say(Expr::NumberLiteral(3.25))]);
    }
}

mod statements {
    use super::*;

    #[test]
    fn statements_separated_by_newlines() {
        assert_eq!(parse_debug("\n\nkas x = 5\n\nsay x\n"), "kas x = 5\nsay x");
        // Separators are optional
        assert_eq!(parse_debug("kas x = 5 say x"), "kas x = 5\nsay x");
    }

    #[test]
    fn if_else_chains() {
        let source = "if x > 1 {\n  say \"big\"\n}\nelse if x == 1 {\n  say \"one\"\n} else {\n  say \"small\"\n}";

        assert_eq!(parse_debug(source),
                   "if (x > 1) { say \"big\" } else if (x == 1) { say \"one\" } else { say \"small\" }");
        assert_eq!(parse_debug("if (ok) say 1"), "if ok say 1");
    }

    #[test]
    fn if_without_else_leaves_following_statement() {
        assert_eq!(parse_debug("if a { say 1 }\n\nsay 2"), "if a { say 1 }\nsay 2");
    }

    #[test]
    fn loops() {
        assert_eq!(parse_debug("while i < 3 {\n kas i = i + 1\n}"), "while (i < 3) { kas i = (i + 1) }");
        assert_eq!(parse_debug("for kas i = 10 to 1 step -1 { say i }"), "for kas i = 10 to 1 step (-1) { say i }");
        assert_eq!(parse_debug("for kas i = 1 to n\n{\n}"), "for kas i = 1 to n { }");
    }

    #[test]
    fn functions() {
        let source = "function add(a, b) {\n  return a + b\n}\nfunction noop() { return }";

        assert_eq!(parse_debug(source), "function add(a, b) { return (a + b) }\nfunction noop() { return }");
    }

    #[test]
    fn bare_return_before_newline() {
        let program = parse("function f() {\n  return\n  say 1\n}").unwrap();

        match &program.statements[0] {
            Stmt::FunctionDefinition(function) => assert_eq!(function.body, vec![
                Stmt::Return(None),
                Stmt::Say(Expr::NumberLiteral(1.0)),
            ]),
            other => panic!("expected function definition, got {:?}", other),
        }
    }

    #[test]
    fn loop_control() {
        assert_eq!(parse_debug("while true { if x { break } else { continue } }"),
                   "while true { if x { break } else { continue } }");
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_variable_name() {
        let error = parse("kas = 5").unwrap_err();

        assert_eq!(error.pos, TokenPos::new(1, 5));
        assert_eq!(error.message, "Expected variable name after 'kas'");
        assert_eq!(error.to_string(), "[line 1 column 5] Error at '=': Expected variable name after 'kas'");
    }

    #[test]
    fn missing_closing_bracket() {
        let error = parse("if x {\n say 1\n").unwrap_err();

        assert_eq!(error.found, None);
        assert_eq!(error.message, "Expected '}' to close block");
        assert_eq!(error.to_string(), "[line 3 column 1] Error at EOF: Expected '}' to close block");
    }

    #[test]
    fn statement_must_start_with_keyword() {
        let error = parse("x = 5").unwrap_err();

        assert_eq!(error.found.as_deref(), Some("x"));
        assert_eq!(error.message, "Unexpected token");
    }

    #[test]
    fn expression_required() {
        let error = parse("say\n").unwrap_err();

        assert_eq!(error.to_string(), "[line 1 column 4] Error at newline: Expected expression");
    }

    #[test]
    fn range_needs_to() {
        assert_eq!(parse("for kas i = 1 3 { }").unwrap_err().message, "Expected 'to' after loop start value");
        assert_eq!(parse("for i = 1 to 3 { }").unwrap_err().message, "Expected 'kas' after 'for'");
    }

    #[test]
    fn function_body_must_be_block() {
        assert_eq!(parse("function f() say 1").unwrap_err().message, "Expected '{' before function body");
    }

    #[test]
    fn duplicate_parameters() {
        let error = parse("function f(a, a) { }").unwrap_err();

        assert_eq!(error.message, "Duplicate parameter");
        assert_eq!(error.pos, TokenPos::new(1, 15));
    }

    #[test]
    fn break_outside_loop() {
        assert_eq!(parse("break").unwrap_err().message, "'break' outside of a loop");
        assert_eq!(parse("while true { function f() { continue } }").unwrap_err().message,
                   "'continue' outside of a loop");
    }

    #[test]
    fn input_requires_parentheses() {
        assert_eq!(parse("say input").unwrap_err().message, "Expected '(' after 'input'");
    }

    #[test]
    fn deep_parentheses_are_rejected() {
        let source = format!("say {}1{}", "(".repeat(20000), ")".repeat(20000));
        let error = parse(&source).unwrap_err();

        assert_eq!(error.message, "Nesting too deep");
        assert_eq!(error.found.as_deref(), Some("("));
    }

    #[test]
    fn deep_unary_chains_are_rejected() {
        let source = format!("say {}1", "-".repeat(20000));

        assert_eq!(parse(&source).unwrap_err().message, "Nesting too deep");
    }

    #[test]
    fn deep_blocks_are_rejected() {
        let source = format!("{}{}", "{".repeat(20000), "}".repeat(20000));

        assert_eq!(parse(&source).unwrap_err().message, "Nesting too deep");
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let source = format!("say {}1{}", "(".repeat(200), ")".repeat(200));

        assert_eq!(parse_debug(&source), "say 1");
    }
}
