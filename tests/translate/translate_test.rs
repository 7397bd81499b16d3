//! Query rewriting.

use babeldb::translate::{translate, Command, CommandKind};
use babeldb::BabelError;

fn sym(alias: &str, symbol: &str) -> Command {
    Command::new(alias, "sym", vec![symbol.to_string()])
}

#[test]
fn test_bare_symbol_is_single_command() {
    let t = translate("AAPL").unwrap();
    assert_eq!(t.rewritten_query.as_deref(), Some(""));
    assert_eq!(t.commands, vec![sym("", "AAPL")]);
}

#[test]
fn test_symbol_with_database_suffix() {
    let t = translate("  aapl:prices ").unwrap();
    assert_eq!(t.commands, vec![sym("", "aapl:prices")]);
    assert!(t.bypass_command().is_some());
}

#[test]
fn test_from_symbol_table() {
    let t = translate("SELECT * FROM S_AAPL").unwrap();
    assert_eq!(t.rewritten_query.as_deref(), Some("SELECT * FROM AAPL"));
    assert_eq!(t.commands, vec![sym("AAPL", "AAPL")]);
    assert!(t.bypass_command().is_none());
}

#[test]
fn test_from_symbol_table_with_database() {
    let t = translate("select px from s_msft:prices where px > 1").unwrap();
    assert_eq!(
        t.rewritten_query.as_deref(),
        Some("select px from msft_prices where px > 1")
    );
    assert_eq!(t.commands, vec![sym("msft_prices", "msft:prices")]);
}

#[test]
fn test_repeated_symbol_materializes_once() {
    let t = translate("SELECT * FROM S_A JOIN (SELECT * FROM S_A) x ON 1=1").unwrap();
    assert_eq!(t.commands.len(), 1);
}

#[test]
fn test_query_sym_rewrites_to_alias() {
    let t = translate("QUERY_SYM(AAPL)").unwrap();
    assert_eq!(t.rewritten_query.as_deref(), Some("AAPL"));
    assert_eq!(t.commands, vec![sym("AAPL", "AAPL")]);
    assert_eq!(t.bypass_command(), Some(&t.commands[0]));
}

#[test]
fn test_query_sym_unrolls_arguments() {
    let t = translate("SELECT * FROM QUERY_SYM(AAPL, BRK.B, X-Y:db)").unwrap();
    assert_eq!(
        t.rewritten_query.as_deref(),
        Some("SELECT * FROM AAPL, BRK_B, X_Y_db")
    );
    assert_eq!(
        t.commands,
        vec![sym("AAPL", "AAPL"), sym("BRK_B", "BRK.B"), sym("X_Y_db", "X-Y:db")]
    );
}

#[test]
fn test_temp_aliases_follow_command_order() {
    let t = translate(
        "SELECT * FROM S_IBM c, query_web('https://a.test/x.csv') a \
         JOIN QUERY_DATA('k,v\n1,2') b ON a.k = b.k",
    )
    .unwrap();

    let aliases: Vec<&str> = t.commands.iter().map(|c| c.alias.as_str()).collect();
    assert_eq!(aliases, vec!["IBM", "temptbl1", "temptbl2"]);
    assert_eq!(
        t.rewritten_query.as_deref(),
        Some("SELECT * FROM IBM c, temptbl1 a JOIN temptbl2 b ON a.k = b.k")
    );
    assert_eq!(t.commands[1].kind().unwrap(), CommandKind::Web);
    assert_eq!(t.commands[2].args, vec!["k,v\n1,2"]);
}

#[test]
fn test_db_command_arguments() {
    let t = translate(r#"SELECT * FROM QUERY_DB(PRICES, "select * from px where d > '2024'", 500)"#).unwrap();
    assert_eq!(t.commands[0].name, "db");
    assert_eq!(t.commands[0].args[0], "PRICES");
    assert_eq!(t.commands[0].args[1], "select * from px where d > '2024'");
    assert_eq!(t.commands[0].args[2], "500");
}

#[test]
fn test_plain_sql_passes_through() {
    let sql = "SELECT a, b FROM trades WHERE sym = 'X'";
    let t = translate(sql).unwrap();
    assert_eq!(t.rewritten_query.as_deref(), Some(sql));
    assert!(t.commands.is_empty());
}

#[test]
fn test_malformed_call_aborts() {
    let err = translate("SELECT * FROM QUERY_WEB 'x'").unwrap_err();
    assert!(matches!(err, BabelError::MalformedArgumentList(_)));
    assert!(err.is_query_error());

    let err = translate("SELECT * FROM QUERY_DATA('a,b)").unwrap_err();
    assert!(matches!(err, BabelError::UnterminatedSpan { terminator: '\'', .. }));
}

#[test]
fn test_translation_serializes() {
    let t = translate("QUERY_SYM(AAPL)").unwrap();
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["rewritten_query"], "AAPL");
    assert_eq!(json["commands"][0]["name"], "sym");
}
