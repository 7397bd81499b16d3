//! Scraping `<table>` elements out of HTML pages.

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::grid::from_string_grid;
use super::IngestError;
use crate::sql::types::SqlType;
use crate::table::ColumnarTable;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("valid selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("valid selector"));

/// Layout tables that never hold data.
const SKIPPED_CLASSES: &[&str] = &["sidebar", "navbox-inner", "infobox", "vcard", "navbox-subgroup"];

const WIKIPEDIA_TITLE: &str = "- Wikipedia</title>";

type Row = Vec<Option<String>>;

/// Scrape every data table on the page into one typed table.
///
/// Tables with the same header (ignoring case) are concatenated; a table
/// with a different header contributes its columns by name.
pub fn from_html(text: &str, overrides: &HashMap<String, SqlType>) -> Result<ColumnarTable, IngestError> {
    let doc = Html::parse_document(text);
    let skip_sup = text.contains(WIKIPEDIA_TITLE);

    let mut header: Vec<String> = Vec::new();
    let mut body: Vec<Row> = Vec::new();

    for table in doc.select(&TABLE) {
        if table.value().classes().any(|c| SKIPPED_CLASSES.contains(&c)) {
            continue;
        }
        let Some((cur_header, rows)) = scrape_table(table, skip_sup) else {
            continue;
        };

        if header.is_empty() {
            header = cur_header.clone();
        }
        if same_header(&cur_header, &header) {
            body.extend(rows);
            continue;
        }

        let positions: Vec<usize> = cur_header
            .iter()
            .map(|name| match header.iter().position(|h| h == name) {
                Some(p) => p,
                None => {
                    header.push(name.clone());
                    header.len() - 1
                }
            })
            .collect();
        for row in rows {
            let mut remapped: Row = vec![None; header.len()];
            for (cell, &p) in row.into_iter().zip(&positions) {
                remapped[p] = cell;
            }
            body.push(remapped);
        }
    }

    if header.is_empty() {
        return Ok(ColumnarTable::empty(Vec::<String>::new()));
    }

    rewrite_long_dates(&mut body, header.len());

    let mut grid = Vec::with_capacity(body.len() + 1);
    grid.push(header.into_iter().map(Some).collect());
    grid.extend(body);
    Ok(from_string_grid(grid, overrides, true)?)
}

fn same_header(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

/// Header plus data rows of one table, or `None` when it has no data.
///
/// When only a few rows carry `<th>` cells, the widest of them is the
/// header and the rest of the rows are data. Otherwise the first row is the
/// header. A header narrower than the widest data row is padded `c<n>`.
fn scrape_table(table: ElementRef, skip_sup: bool) -> Option<(Vec<String>, Vec<Row>)> {
    let rows: Vec<ElementRef> = table.select(&ROW).collect();
    let (first, rest) = rows.split_first()?;

    let th_rows: Vec<&ElementRef> = rows.iter().filter(|r| has_th(r)).collect();

    let (header, data): (Vec<String>, Vec<Row>) = if (th_rows.len() as f64) < 0.5 * rest.len() as f64 {
        let header = th_rows
            .iter()
            .map(|r| row_cells(r, skip_sup))
            .filter(|cells| cells.len() > 1)
            .max_by_key(|cells| cells.len())
            .unwrap_or_default();
        let data = rows
            .iter()
            .filter(|r| !has_th(r))
            .map(|r| row_cells(r, skip_sup).into_iter().map(Some).collect())
            .collect();
        (header, data)
    } else {
        let header = row_cells(first, skip_sup);
        let data = rest
            .iter()
            .map(|r| row_cells(r, skip_sup).into_iter().map(Some).collect())
            .collect();
        (header, data)
    };

    if data.is_empty() {
        return None;
    }

    let width = data.iter().map(Vec::len).max().unwrap_or(0).max(header.len());
    let header = (0..width)
        .map(|i| header.get(i).cloned().unwrap_or_else(|| format!("c{}", i)))
        .collect();
    Some((header, data))
}

fn has_th(row: &ElementRef) -> bool {
    row.children()
        .filter_map(ElementRef::wrap)
        .any(|c| c.value().name() == "th")
}

fn row_cells(row: &ElementRef, skip_sup: bool) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .map(|c| cell_text(c, skip_sup))
        .collect()
}

fn cell_text(cell: ElementRef, skip_sup: bool) -> String {
    let mut raw = String::new();
    collect_text(cell, skip_sup, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(el: ElementRef, skip_sup: bool, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        if let Some(child_el) = ElementRef::wrap(child) {
            if skip_sup && child_el.value().name() == "sup" {
                continue;
            }
            if child_el.value().name() == "br" {
                out.push(' ');
            }
            collect_text(child_el, skip_sup, out);
        }
    }
}

fn parse_long_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%B %d, %Y").ok()
}

/// Columns whose every non-blank cell reads `Month dd, yyyy` are rewritten
/// to ISO dates.
fn rewrite_long_dates(body: &mut [Row], width: usize) {
    for c in 0..width {
        let cells = || {
            body.iter()
                .filter_map(move |row| row.get(c).and_then(|v| v.as_deref()))
                .filter(|s| !s.trim().is_empty())
        };
        if cells().next().is_none() || !cells().all(|s| parse_long_date(s).is_some()) {
            continue;
        }
        for row in body.iter_mut() {
            if let Some(Some(cell)) = row.get_mut(c) {
                if let Some(d) = parse_long_date(cell) {
                    *cell = d.format("%Y-%m-%d").to_string();
                }
            }
        }
    }
}
