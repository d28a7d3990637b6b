use std::collections::BTreeMap;

use scraper::{Html, Selector};

use outage_core::{
    parse_interval, AssetType, DetailRecord, OutageNature, OutageStatus, SummaryRow,
};

use crate::error::HarvestError;
use crate::fetch::TablePage;

/// Column count of a summary-table row and field count of a detail document.
const SUMMARY_COLUMNS: usize = 7;
const DETAIL_FIELDS: usize = 6;

/// Decodes one table page into summary rows.
///
/// Status and nature codes are decoded where recognized and kept verbatim
/// where not; the interval cell is split into UTC start/end instants.
pub fn parse_summary_rows(page: &TablePage) -> Result<Vec<SummaryRow>, HarvestError> {
    page.rows.iter().map(parse_summary_row).collect()
}

fn parse_summary_row(row: &Vec<String>) -> Result<SummaryRow, HarvestError> {
    if row.len() != SUMMARY_COLUMNS {
        return Err(HarvestError::ParseShape {
            id: "summary row".to_string(),
            message: format!("expected {SUMMARY_COLUMNS} columns, got {}", row.len()),
        });
    }
    let detail_id = row[6].clone();
    let interval_cell = row[2].replace("&nbsp;", " ");
    let (interval_start, interval_end) =
        parse_interval(&interval_cell).map_err(|err| HarvestError::ParseShape {
            id: detail_id.clone(),
            message: err.to_string(),
        })?;

    Ok(SummaryRow {
        status: OutageStatus::decode(&row[0]),
        nature: OutageNature::decode(&row[1]),
        interval_start,
        interval_end,
        in_area: row[3].clone(),
        out_area: row[4].clone(),
        capacity_value: strip_markup(&row[5]),
        detail_id,
    })
}

/// Flattens an HTML fragment to its text content (capacity cells arrive
/// wrapped in markup).
pub fn strip_markup(cell: &str) -> String {
    let fragment = Html::parse_fragment(cell);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parses one detail document into its six fields.
///
/// Two known backend quirks are compensated here:
/// - a duplicated `Failure` cell is dropped;
/// - when "no affected assets" applies the backend omits a row, so short
///   documents are padded by repeating the last field until six. The padding
///   is lossy and logged as a data-quality warning.
///
/// Anything that still doesn't fit six fields is a `ParseShape` failure.
pub fn parse_detail_document(html: &str, detail_id: &str) -> Result<DetailRecord, HarvestError> {
    let doc = Html::parse_document(html);
    let cell_sel = Selector::parse("table tr td").ok();

    let mut cells: Vec<String> = Vec::new();
    if let Some(sel) = cell_sel.as_ref() {
        for cell in doc.select(sel) {
            // Asset-class cells carry the code as a CSS class instead of text.
            match cell.value().attr("class") {
                Some(class) => {
                    let code = class.split_whitespace().next().unwrap_or(class);
                    cells.push(AssetType::decode(code).to_string());
                }
                None => cells.push(cell.text().collect::<String>().trim().to_string()),
            }
        }
    }

    if cells.iter().filter(|cell| *cell == "Failure").count() == 2 {
        if let Some(position) = cells.iter().position(|cell| cell == "Failure") {
            cells.remove(position);
        }
    }

    if cells.is_empty() || cells.len() > DETAIL_FIELDS {
        return Err(HarvestError::ParseShape {
            id: detail_id.to_string(),
            message: format!("detail document has {} fields, expected {DETAIL_FIELDS}", cells.len()),
        });
    }
    if cells.len() < DETAIL_FIELDS {
        engine_logging::harvest_warn!(
            "detail {detail_id} has missing fields, repeating the last value to fill in"
        );
        while cells.len() < DETAIL_FIELDS {
            let last = cells[cells.len() - 1].clone();
            cells.push(last);
        }
    }

    let mut fields = cells.into_iter();
    Ok(DetailRecord {
        detail_id: detail_id.to_string(),
        comments: fields.next().unwrap_or_default(),
        reason: fields.next().unwrap_or_default(),
        code: fields.next().unwrap_or_default(),
        asset_type: AssetType::decode(&fields.next().unwrap_or_default()),
        name: fields.next().unwrap_or_default(),
        location: fields.next().unwrap_or_default(),
    })
}

/// Scrapes the portal's filter page into a country → border-values map.
/// The page lists one hierarchic filter block per country, in the same order
/// as the country list.
pub fn scrape_border_map(html: &str, countries: &[&str]) -> BTreeMap<String, Vec<String>> {
    let doc = Html::parse_document(html);
    let block_sel = Selector::parse("div.dv-sub-filter-hierarchic-wrapper").ok();
    let input_sel = Selector::parse("input").ok();

    let mut map = BTreeMap::new();
    let (Some(block_sel), Some(input_sel)) = (block_sel, input_sel) else {
        return map;
    };

    for (country, block) in countries.iter().zip(doc.select(&block_sel)) {
        let mut borders = Vec::new();
        for input in block.select(&input_sel) {
            if let Some(value) = input.value().attr("value") {
                // The blocks contain an "on" toggle that is not a border.
                if value.contains("on") {
                    continue;
                }
                borders.push(value.to_string());
            }
        }
        map.insert((*country).to_string(), borders);
    }
    map
}
