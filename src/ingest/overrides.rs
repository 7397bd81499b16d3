//! Column type overrides written as `{name: 'TYPE', other: INT}`.

use std::collections::HashMap;

use crate::sql::types::SqlType;

/// Parse a column-type override map.
///
/// Braces and quotes are optional. Entries without a `:` are skipped and
/// unrecognized type names fall back to text.
pub fn parse_overrides(text: &str) -> HashMap<String, SqlType> {
    let body = text.trim();
    let body = body.strip_prefix('{').unwrap_or(body);
    let body = body.strip_suffix('}').unwrap_or(body);

    body.split(',')
        .filter_map(|entry| entry.split_once(':'))
        .filter_map(|(name, ty)| {
            let name = unquote(name);
            if name.is_empty() {
                return None;
            }
            let ty = SqlType::parse(unquote(ty)).unwrap_or(SqlType::Text);
            Some((name.to_string(), ty))
        })
        .collect()
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '\'' || c == '"').trim()
}
