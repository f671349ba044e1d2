use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sin_lang_core::ast::Expression;
use sin_lang_core::parser::{Expected, ParseError};
use sin_lang_interpreter::{Error, Interpreter, Value};

fn run_with_prelude(source: &str) -> Result<Value, Error> {
    let interpreter = Interpreter::default();
    let environment = interpreter.prelude_environment()?;
    interpreter.run_in(source, &environment)
}

fn parse_error(source: &str) -> ParseError {
    match run_with_prelude(source) {
        Err(Error::Parse(error)) => error,
        other => panic!("expected a parse error for {source:?}, got {other:?}"),
    }
}

#[test]
fn test_include_splices_a_block() {
    let program = sin_lang_core::parse("include \"tests/fixtures/math.sin\" 1").unwrap();

    assert_eq!(program.expressions.len(), 2);
    match &program.expressions[0] {
        Expression::Block(block) => {
            assert_eq!(block.to_string(), "(square = fun (x) mul(x, x) end)")
        }
        other => panic!("include produced {other}"),
    }
}

#[test]
fn test_included_bindings_are_visible() {
    let inputs = vec![
        ("include \"tests/fixtures/math.sin\" square(7)", Value::Number(49)),
        ("include \"tests/fixtures/nested.sin\" cube(3)", Value::Number(27)),
        (
            "include \"tests/fixtures/math.sin\" include \"tests/fixtures/math.sin\" square(2)",
            Value::Number(4),
        ),
    ];

    for (input, expected) in inputs {
        assert_eq!(run_with_prelude(input).unwrap(), expected, "running {input:?}");
    }
}

#[test]
fn test_include_value_is_last_expression() {
    let result = run_with_prelude("x = include \"tests/fixtures/math.sin\" x(5)");

    assert_eq!(result.unwrap(), Value::Number(25));
}

#[test]
fn test_missing_include() {
    match parse_error("include \"tests/fixtures/missing.sin\"") {
        ParseError::Include { path, .. } => {
            assert_eq!(path, PathBuf::from("tests/fixtures/missing.sin"))
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_include_cycles_are_rejected() {
    for (source, culprit) in [
        ("include \"tests/fixtures/itself.sin\"", "tests/fixtures/itself.sin"),
        ("include \"tests/fixtures/cycle_a.sin\"", "tests/fixtures/cycle_a.sin"),
    ] {
        match parse_error(source) {
            ParseError::IncludeCycle { path } => assert_eq!(path, PathBuf::from(culprit)),
            other => panic!("unexpected error {other:?} for {source:?}"),
        }
    }
}

#[test]
fn test_errors_inside_included_files_abort_parsing() {
    let error = parse_error("include \"tests/fixtures/broken.sin\" 1");

    assert!(matches!(
        error,
        ParseError::PrematureEndOfInput {
            expected: Expected::Token(_)
        }
    ));
}
