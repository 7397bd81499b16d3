//! End-to-end queries against an in-memory SQLite engine.

use std::collections::HashMap;
use std::sync::Arc;

use babeldb::backend::{BackingConnection, SqliteConnection};
use babeldb::config::ConnectionConfig;
use babeldb::dispatch::{Dispatcher, FederatedExecutor, Fetcher};
use babeldb::registry::{SymbolEntry, SymbolRegistry};
use babeldb::{BabelDb, BabelError, BabelResult, ColumnarTable, Value};

struct Pages(HashMap<&'static str, &'static str>);

impl Fetcher for Pages {
    fn fetch_url(&self, url: &str, _method: &str, _body: Option<&str>) -> Option<String> {
        self.0.get(url).map(|s| s.to_string())
    }
}

/// One remote database named PRICES.
struct Prices(SqliteConnection);

impl Prices {
    fn new() -> Self {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE px (sym VARCHAR, px DOUBLE);
             INSERT INTO px VALUES ('AAPL', 190.5), ('AAPL', 191.0), ('MSFT', 410.0);",
        )
        .unwrap();
        Self(conn)
    }
}

impl FederatedExecutor for Prices {
    fn execute(&self, _database: &str, query: &str, _staleness_ms: u64) -> BabelResult<ColumnarTable> {
        Ok(self.0.query(query)?)
    }

    fn list_databases_with_symbol_registries(&self) -> BabelResult<Vec<String>> {
        Ok(vec!["PRICES".into()])
    }

    fn database_exists(&self, database: &str) -> bool {
        database.eq_ignore_ascii_case("PRICES")
    }
}

fn engine() -> BabelDb {
    let pages = Pages(HashMap::from([
        ("https://x.test/keys.csv", "k\n1\n2\n3"),
        ("https://x.test/rates", r#"{"rates": [{"ccy": "EUR", "r": 1.1}, {"ccy": "GBP", "r": 1.3}]}"#),
    ]));
    let registry = SymbolRegistry::with_entries(vec![
        SymbolEntry::new(Some("PRICES".into()), "AAPL", "select * from px where sym = 'XXX'")
            .with_title("Apple Inc"),
    ]);
    let dispatcher = Dispatcher::new(Arc::new(pages))
        .with_executor(Arc::new(Prices::new()))
        .with_registry(Arc::new(registry));
    BabelDb::new(Arc::new(SqliteConnection::open_in_memory().unwrap()), dispatcher)
}

#[test]
fn test_join_web_and_inline_data() {
    let db = engine();
    let t = db
        .execute(
            "SELECT a.k, b.v FROM QUERY_WEB('https://x.test/keys.csv') a \
             JOIN QUERY_DATA('k,v\n1,one\n3,three') b ON a.k = b.k ORDER BY a.k",
            0,
        )
        .unwrap();
    assert_eq!(t.row_count(), 2);
    assert_eq!(t.value(0, 0), Value::Int(1));
    assert_eq!(t.value(1, 1), Value::Text("three".into()));
}

#[test]
fn test_json_with_path() {
    let t = engine()
        .execute("SELECT ccy FROM QUERY_WEB('https://x.test/rates#.rates') WHERE r > 1.2", 0)
        .unwrap();
    assert_eq!(t.row_count(), 1);
    assert_eq!(t.value(0, 0), Value::Text("GBP".into()));
}

#[test]
fn test_symbol_table() {
    let t = engine()
        .execute("SELECT COUNT(*) AS n, MAX(px) AS hi FROM S_AAPL", 0)
        .unwrap();
    assert_eq!(t.value(0, 0), Value::Int(2));
    assert_eq!(t.value(0, 1), Value::Float(191.0));
}

#[test]
fn test_bare_symbol_returns_rows() {
    let t = engine().execute("aapl", 0).unwrap();
    assert_eq!(t.names(), vec!["sym", "px"]);
    assert_eq!(t.row_count(), 2);
}

#[test]
fn test_federated_query() {
    let t = engine()
        .execute("SELECT sym FROM QUERY_DB(PRICES, 'select * from px where px > 200')", 0)
        .unwrap();
    assert_eq!(t.value(0, 0), Value::Text("MSFT".into()));
}

#[test]
fn test_symbol_search_as_table() {
    let t = engine()
        .execute("SELECT symbol, title FROM QUERY_SYMBOLS(apple)", 0)
        .unwrap();
    assert_eq!(t.value(0, 0), Value::Text("AAPL".into()));
    assert_eq!(t.value(0, 1), Value::Text("Apple Inc".into()));
}

#[test]
fn test_registry_listing() {
    let t = engine().execute("SYMBOLS", 0).unwrap();
    assert_eq!(t.names(), vec!["symbol", "database", "query", "title", "description"]);
    assert_eq!(t.row_count(), 1);
}

#[test]
fn test_unknown_symbol_aborts() {
    let err = engine().execute("SELECT * FROM S_NOPE", 0).unwrap_err();
    assert!(matches!(err, BabelError::UnknownSymbol(ref s) if s == "NOPE"));
}

#[test]
fn test_backend_error_surfaces() {
    let err = engine()
        .execute("SELECT * FROM QUERY_DATA('a\n1') JOIN missing ON 1 = 1", 0)
        .unwrap_err();
    assert!(matches!(err, BabelError::Backend(_)));
    assert!(!err.is_query_error());
}

#[test]
fn test_unsupported_driver() {
    let err = BabelDb::open(&ConnectionConfig::duckdb(":memory:"), Arc::new(Pages(HashMap::new())))
        .unwrap_err();
    assert!(matches!(err, BabelError::Backend(_)));
}
