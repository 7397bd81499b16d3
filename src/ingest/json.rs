//! JSON documents to typed tables.

use std::collections::HashMap;

use serde_json::Value as Json;

use super::json_path;
use super::IngestError;
use crate::infer::{classify_json, convert::convert, merge, InferredType};
use crate::sql::types::SqlType;
use crate::table::{ColumnData, ColumnarTable, Value};

/// Parse a JSON document, optionally narrowed by a path expression.
///
/// The row source is the document itself when it is an array, else the
/// first array-valued field of a top-level object. An object with no array
/// field becomes a two-column `keys`/`vals` table and a scalar is read as a
/// one-element array.
pub fn from_json(
    text: &str,
    path: Option<&str>,
    overrides: &HashMap<String, SqlType>,
) -> Result<ColumnarTable, IngestError> {
    let mut doc: Json = serde_json::from_str(text)?;
    if let Some(path) = path.filter(|p| !p.trim().is_empty()) {
        doc = json_path::select(doc, path)?;
    }

    match doc {
        Json::Array(items) => from_array(items, overrides),
        Json::Object(map) => {
            let first_array = map
                .iter()
                .find_map(|(_, v)| v.as_array().cloned());
            match first_array {
                Some(items) => from_array(items, overrides),
                None => from_single_object(map),
            }
        }
        scalar => from_array(vec![scalar], overrides),
    }
}

fn from_single_object(map: serde_json::Map<String, Json>) -> Result<ColumnarTable, IngestError> {
    let (keys, vals): (Vec<_>, Vec<_>) = map
        .into_iter()
        .map(|(k, v)| (Some(k), Some(to_pretty(&v))))
        .unzip();
    Ok(ColumnarTable::new(
        vec!["keys".into(), "vals".into()],
        vec![ColumnData::Text(keys), ColumnData::Text(vals)],
    )?)
}

fn to_pretty(v: &Json) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn from_array(items: Vec<Json>, overrides: &HashMap<String, SqlType>) -> Result<ColumnarTable, IngestError> {
    match items.first() {
        None => Ok(ColumnarTable::empty(["empty"])),
        Some(Json::Object(_)) | Some(Json::Array(_)) => from_rows(&items, overrides),
        Some(first) => Ok(from_scalars(first, &items)?),
    }
}

fn kind_label(v: &Json) -> &'static str {
    match v {
        Json::Null => "NULL",
        Json::Bool(_) => "BOOLEAN",
        Json::Number(_) => "NUMBER",
        Json::String(_) => "STRING",
        Json::Array(_) => "ARRAY",
        Json::Object(_) => "OBJECT",
    }
}

/// `[1, 2, 3]` or `["a", "b"]`: one column named after the first item's kind.
fn from_scalars(first: &Json, items: &[Json]) -> Result<ColumnarTable, crate::table::TableError> {
    let data = match first {
        Json::Number(_) => ColumnData::Float64(
            items
                .iter()
                .map(|v| v.as_f64().unwrap_or(f64::NAN))
                .collect(),
        ),
        _ => ColumnData::Text(
            items
                .iter()
                .map(|v| match v {
                    Json::Null => None,
                    Json::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
    };
    ColumnarTable::new(vec![kind_label(first).to_string()], vec![data])
}

/// Rows that are objects (keyed by field name) or arrays (keyed `c0`, `c1`...).
/// Keys are unioned in first-seen order.
fn from_rows(items: &[Json], overrides: &HashMap<String, SqlType>) -> Result<ColumnarTable, IngestError> {
    let mut names: Vec<String> = Vec::new();
    let mut inferred: HashMap<String, InferredType> = HashMap::new();

    for row in items {
        for (key, value) in row_cells(row) {
            let t = classify_json(value);
            match inferred.get_mut(&key) {
                Some(prev) => *prev = merge(*prev, t),
                None => {
                    names.push(key.clone());
                    inferred.insert(key, t);
                }
            }
        }
    }

    let types: Vec<SqlType> = names
        .iter()
        .map(|name| match overrides.get(name) {
            Some(t) => t.clone(),
            None => inferred
                .get(name)
                .copied()
                .unwrap_or(InferredType::Null)
                .to_sql_type(),
        })
        .collect();

    let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();
    let mut columns: Vec<ColumnData> = types
        .iter()
        .map(|t| ColumnData::allocate(t, items.len()))
        .collect();

    for (r, row) in items.iter().enumerate() {
        for (key, value) in row_cells(row) {
            if let Some(&c) = index.get(key.as_str()) {
                columns[c].set(r, json_value(value, &types[c]));
            }
        }
    }

    Ok(ColumnarTable::new(names, columns)?)
}

fn row_cells(row: &Json) -> Vec<(String, &Json)> {
    match row {
        Json::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("c{}", i), v))
            .collect(),
        other => vec![("c0".to_string(), other)],
    }
}

/// Convert a JSON node to the column type. Nested arrays and objects in
/// text columns keep their JSON text.
fn json_value(v: &Json, target: &SqlType) -> Value {
    match (v, target) {
        (Json::Null, _) => Value::Null,
        (Json::Number(n), t) if t.is_float() => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        (Json::Number(n), t) if t.is_integer() => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => convert(&n.to_string(), t),
        },
        (Json::Bool(b), SqlType::Bool) => Value::Bool(*b),
        (Json::String(s), t) => convert(s, t),
        (other, t) => convert(&other.to_string(), t),
    }
}
