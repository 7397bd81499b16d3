//! Views over data files sitting in a directory.
//!
//! Each `.csv` or `.parquet` file becomes a view named after its stem, so a
//! DuckDB backing engine can query local files as tables.

use std::path::Path;

use tracing::debug;

use super::BackendResult;
use crate::sql::Dialect;

/// `CREATE OR REPLACE VIEW` statement for one file, or `None` for files
/// DuckDB cannot scan directly.
pub fn view_statement(path: &Path) -> Option<String> {
    let reader = match path.extension()?.to_str()?.to_lowercase().as_str() {
        "csv" => "read_csv",
        "parquet" => "read_parquet",
        _ => return None,
    };
    let name = path.file_stem()?.to_str()?.replace(' ', "_");
    let location = Dialect::DuckDb
        .dialect()
        .quote_string(&path.to_string_lossy());
    Some(format!(
        "CREATE OR REPLACE VIEW {} AS SELECT * FROM {}({})",
        name, reader, location
    ))
}

/// View statements for every data file in `dir`, sorted by file name.
pub fn local_files(dir: &Path) -> BackendResult<Vec<String>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let statements: Vec<String> = paths.iter().filter_map(|p| view_statement(p)).collect();
    debug!(dir = %dir.display(), views = statements.len(), "local file views");
    Ok(statements)
}
