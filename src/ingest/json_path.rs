//! A small jq-style path language for narrowing JSON documents.
//!
//! Supported: `.`, `.field`, `."quoted field"`, `["quoted field"]`, `[n]`
//! (negative counts from the end) and `[]` (iterate), chained freely:
//! `.data[].quote`, `.rows[-1]`.

use serde_json::Value as Json;

use super::IngestError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Field(String),
    Index(i64),
    Iterate,
}

/// Apply `path` to `root`.
///
/// A single result is returned as is; several results are collected into
/// an array. A null result is an error.
pub fn select(root: Json, path: &str) -> Result<Json, IngestError> {
    let steps = parse_path(path)?;

    let mut current = vec![root];
    for step in &steps {
        let mut next = Vec::new();
        for value in current {
            apply(step, value, &mut next, path)?;
        }
        current = next;
    }

    let result = if current.len() == 1 {
        current.pop().unwrap_or(Json::Null)
    } else {
        Json::Array(current)
    };
    if result.is_null() {
        return Err(IngestError::NullPath(path.to_string()));
    }
    Ok(result)
}

fn apply(step: &Step, value: Json, out: &mut Vec<Json>, path: &str) -> Result<(), IngestError> {
    match (step, value) {
        (Step::Field(name), Json::Object(mut map)) => out.push(map.remove(name).unwrap_or(Json::Null)),
        (Step::Field(_), Json::Null) => out.push(Json::Null),
        (Step::Index(i), Json::Array(mut items)) => {
            let idx = if *i < 0 { items.len() as i64 + i } else { *i };
            let item = usize::try_from(idx)
                .ok()
                .filter(|&idx| idx < items.len())
                .map(|idx| items.swap_remove(idx))
                .unwrap_or(Json::Null);
            out.push(item);
        }
        (Step::Index(_), Json::Null) => out.push(Json::Null),
        (Step::Iterate, Json::Array(items)) => out.extend(items),
        (Step::Iterate, Json::Object(map)) => out.extend(map.into_iter().map(|(_, v)| v)),
        (step, other) => {
            return Err(path_error(
                path,
                format!("cannot apply {:?} to {}", step, kind_name(&other)),
            ))
        }
    }
    Ok(())
}

fn kind_name(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn path_error(path: &str, reason: impl Into<String>) -> IngestError {
    IngestError::Path {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn parse_path(path: &str) -> Result<Vec<Step>, IngestError> {
    let chars: Vec<char> = path.trim().chars().collect();
    let mut steps = Vec::new();
    let mut i = 0;

    if chars.first() != Some(&'.') && chars.first() != Some(&'[') {
        return Err(path_error(path, "path must start with . or ["));
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                match chars.get(i) {
                    None | Some('.') | Some('[') => {}
                    Some('"') => {
                        let (name, end) = read_quoted(&chars, i, path)?;
                        steps.push(Step::Field(name));
                        i = end;
                    }
                    Some(_) => {
                        let start = i;
                        while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                            i += 1;
                        }
                        if i == start {
                            return Err(path_error(path, format!("unexpected {:?}", chars[i])));
                        }
                        steps.push(Step::Field(chars[start..i].iter().collect()));
                    }
                }
            }
            '[' => {
                i += 1;
                match chars.get(i) {
                    Some(']') => {
                        steps.push(Step::Iterate);
                        i += 1;
                    }
                    Some('"') => {
                        let (name, end) = read_quoted(&chars, i, path)?;
                        if chars.get(end) != Some(&']') {
                            return Err(path_error(path, "expected ]"));
                        }
                        steps.push(Step::Field(name));
                        i = end + 1;
                    }
                    _ => {
                        let start = i;
                        while i < chars.len() && chars[i] != ']' {
                            i += 1;
                        }
                        if i == chars.len() {
                            return Err(path_error(path, "expected ]"));
                        }
                        let text: String = chars[start..i].iter().collect();
                        let n = text
                            .trim()
                            .parse::<i64>()
                            .map_err(|_| path_error(path, format!("bad index {}", text)))?;
                        steps.push(Step::Index(n));
                        i += 1;
                    }
                }
            }
            c => return Err(path_error(path, format!("unexpected {:?}", c))),
        }
    }

    Ok(steps)
}

/// Read a `"..."` starting at `open`; returns the contents and the index
/// just past the closing quote.
fn read_quoted(chars: &[char], open: usize, path: &str) -> Result<(String, usize), IngestError> {
    let mut out = String::new();
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                out.push(chars[i + 1]);
                i += 2;
            }
            '"' => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Err(path_error(path, "unterminated quoted field"))
}
