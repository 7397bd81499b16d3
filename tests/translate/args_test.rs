//! Argument list parsing through the public API.

use babeldb::translate::args::{parse_args, ArgParseError};

#[test]
fn test_mixed_argument_shapes() {
    let parsed = parse_args("(a, 'b,c', (n,p), {x:1})").unwrap();
    assert_eq!(parsed.args, vec!["a", "b,c", "(n,p)", "x:1"]);
    assert_eq!(parsed.remainder, "");
}

#[test]
fn test_nested_parentheses_keep_inner_quotes() {
    let parsed = parse_args("((select ')' from t), b)").unwrap();
    assert_eq!(parsed.args, vec!["(select ')' from t)", "b"]);
}

#[test]
fn test_escaped_terminator() {
    let parsed = parse_args(r#"("say \"hi\"", x)"#).unwrap();
    assert_eq!(parsed.args, vec![r#"say \"hi\""#, "x"]);
}

#[test]
fn test_remainder_is_untouched() {
    let parsed = parse_args("(PRICES, 'select 1')  AS p JOIN q ON p.a = q.a").unwrap();
    assert_eq!(parsed.args, vec!["PRICES", "select 1"]);
    assert_eq!(parsed.remainder, "  AS p JOIN q ON p.a = q.a");
}

#[test]
fn test_errors_carry_fragment() {
    let err = parse_args("(\"open").unwrap_err();
    assert!(matches!(err, ArgParseError::Malformed(_)));

    let err = parse_args("(\"open)").unwrap_err();
    assert_eq!(
        err,
        ArgParseError::Unterminated {
            terminator: '"',
            fragment: "(\"open)".into()
        }
    );
    assert_eq!(err.to_string(), "ending \" not found in: (\"open)");
}
