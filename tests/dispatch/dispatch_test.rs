//! Command dispatch against in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use babeldb::backend::ConnectionCache;
use babeldb::config::ConnectionConfig;
use babeldb::dispatch::{Dispatcher, FederatedExecutor, Fetcher};
use babeldb::registry::SymbolRegistry;
use babeldb::sql::SqlType;
use babeldb::translate::Command;
use babeldb::{BabelError, BabelResult, ColumnarTable, Value};

#[derive(Default)]
struct Pages {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl Pages {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }
}

impl Fetcher for Pages {
    fn fetch_url(&self, url: &str, _method: &str, _body: Option<&str>) -> Option<String> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned()
    }
}

/// Each named database is its own in-memory SQLite engine.
struct SqliteFederation {
    cache: ConnectionCache,
    staleness: Mutex<Vec<u64>>,
}

impl SqliteFederation {
    fn new() -> Self {
        Self {
            cache: ConnectionCache::new(),
            staleness: Mutex::new(Vec::new()),
        }
        .seed(
                "PRICES",
                "CREATE TABLE px (sym VARCHAR, px DOUBLE);
                 INSERT INTO px VALUES ('AAPL', 190.5), ('MSFT', 410.0);
                 CREATE TABLE SYMBOLS (symbol VARCHAR, query VARCHAR, title VARCHAR);
                 INSERT INTO SYMBOLS VALUES
                    ('aapl', 'select * from px where sym = ''{{SYM}}''', 'Apple Inc'),
                    ('msft', 'select * from px where sym = ''XXX''', 'Microsoft');",
            )
        .seed("REFDATA", "CREATE TABLE ccy (code VARCHAR); INSERT INTO ccy VALUES ('USD');")
    }

    fn seed(self, db: &str, sql: &str) -> Self {
        self.cache
            .open(db, &ConnectionConfig::in_memory())
            .unwrap()
            .execute_batch(sql)
            .unwrap();
        self
    }
}

impl FederatedExecutor for SqliteFederation {
    fn execute(&self, database: &str, query: &str, staleness_ms: u64) -> BabelResult<ColumnarTable> {
        self.staleness.lock().unwrap().push(staleness_ms);
        let conn = self.cache.open(database, &ConnectionConfig::in_memory())?;
        Ok(conn.query(query)?)
    }

    fn list_databases_with_symbol_registries(&self) -> BabelResult<Vec<String>> {
        Ok(vec!["PRICES".into(), "REFDATA".into()])
    }

    fn database_exists(&self, database: &str) -> bool {
        self.cache.contains(database)
    }
}

fn setup() -> (Dispatcher, Arc<SqliteFederation>) {
    let federation = Arc::new(SqliteFederation::new());
    let registry = Arc::new(SymbolRegistry::new());
    registry
        .refresh(federation.as_ref(), "SELECT * FROM SYMBOLS;")
        .unwrap();
    federation.staleness.lock().unwrap().clear();

    let pages = Pages::default()
        .with("https://x.test/prices.csv", "sym;px\nAAPL;1.5\nMSFT;2")
        .with("https://x.test/api", r#"{"data": {"quotes": [{"s": "A", "v": 1}, {"s": "B", "v": 2}]}}"#)
        .with("https://x.test/empty", "");
    let dispatcher = Dispatcher::new(Arc::new(pages))
        .with_executor(federation.clone())
        .with_registry(registry);
    (dispatcher, federation)
}

fn cmd(name: &str, args: &[&str]) -> Command {
    Command::new("temptbl0", name, args.iter().map(|a| a.to_string()).collect())
}

#[test]
fn test_registry_refresh_skips_failing_database() {
    let (dispatcher, _) = setup();
    let registry = dispatcher.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("aapl").database.as_deref(), Some("PRICES"));
}

#[test]
fn test_web_csv() {
    let (dispatcher, _) = setup();
    let t = dispatcher
        .execute(&cmd("web", &["https://x.test/prices.csv"]), 0)
        .unwrap();
    assert_eq!(t.names(), vec!["sym", "px"]);
    assert_eq!(t.types()[1], SqlType::Float64);
}

#[test]
fn test_web_json_path_and_types() {
    let (dispatcher, _) = setup();
    let t = dispatcher
        .execute(&cmd("web", &["https://x.test/api#.data.quotes#{v: 'DOUBLE'}"]), 0)
        .unwrap();
    assert_eq!(t.names(), vec!["s", "v"]);
    assert_eq!(t.types(), vec![SqlType::Text, SqlType::Float64]);
}

#[test]
fn test_web_without_content() {
    let (dispatcher, _) = setup();
    let err = dispatcher
        .execute(&cmd("web", &["https://x.test/missing"]), 0)
        .unwrap_err();
    assert!(matches!(err, BabelError::Fetch { source: None, .. }));
    assert!(!err.is_query_error());
}

#[test]
fn test_data_arity() {
    let (dispatcher, _) = setup();
    let t = dispatcher.execute(&cmd("data", &["a,b\n1,2"]), 0).unwrap();
    assert_eq!(t.row_count(), 1);

    let err = dispatcher
        .execute(&cmd("data", &["a", "b", "c", "d"]), 0)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported command: query_data takes 1-3 args, got 4"
    );
}

#[test]
fn test_sym_runs_registry_query() {
    let (dispatcher, federation) = setup();
    let t = dispatcher.execute(&cmd("sym", &["AAPL"]), 250).unwrap();
    assert_eq!(t.row_count(), 1);
    assert_eq!(t.value(0, 1), Value::Float(190.5));

    let t = dispatcher.execute(&cmd("sym", &["msft:prices"]), 0).unwrap();
    assert_eq!(t.value(0, 0), Value::Text("MSFT".into()));

    assert_eq!(*federation.staleness.lock().unwrap(), vec![250, 0]);
}

#[test]
fn test_sym_database_suffix_fallback() {
    let (dispatcher, _) = setup();
    let t = dispatcher
        .execute(&cmd("sym", &["select code from ccy:refdata"]), 0)
        .unwrap();
    assert_eq!(t.value(0, 0), Value::Text("USD".into()));
}

#[test]
fn test_unknown_symbol() {
    let (dispatcher, _) = setup();
    let err = dispatcher.execute(&cmd("sym", &["NOPE"]), 0).unwrap_err();
    assert_eq!(err.to_string(), "couldn't find symbol = NOPE");
    assert_eq!(err.offending_fragment(), Some("NOPE"));
}

#[test]
fn test_symbols_search() {
    let (dispatcher, _) = setup();
    let t = dispatcher.execute(&cmd("symbols", &["apple"]), 0).unwrap();
    assert_eq!(t.row_count(), 1);
    assert_eq!(t.value(0, 0), Value::Text("AAPL".into()));
    assert_eq!(
        t.value(0, 2),
        Value::Text("select * from px where sym = 'AAPL'".into())
    );
}

#[test]
fn test_db_command() {
    let (dispatcher, federation) = setup();
    let t = dispatcher
        .execute(&cmd("db", &["PRICES", "select count(*) as n from px", "9000"]), 1)
        .unwrap();
    assert_eq!(t.value(0, 0), Value::Int(2));
    assert_eq!(*federation.staleness.lock().unwrap(), vec![9000]);

    let err = dispatcher
        .execute(&cmd("db", &["ELSEWHERE", "select 1"]), 0)
        .unwrap_err();
    assert!(matches!(err, BabelError::UnknownDatabase(ref db) if db == "ELSEWHERE"));
}

#[test]
fn test_backend_errors_propagate() {
    let (dispatcher, _) = setup();
    let err = dispatcher
        .execute(&cmd("db", &["PRICES", "select * from nowhere"]), 0)
        .unwrap_err();
    assert!(matches!(err, BabelError::Backend(_)));
}

#[test]
fn test_unknown_command() {
    let (dispatcher, _) = setup();
    let err = dispatcher.execute(&cmd("teleport", &[]), 0).unwrap_err();
    assert!(matches!(err, BabelError::UnsupportedCommand(_)));
}
