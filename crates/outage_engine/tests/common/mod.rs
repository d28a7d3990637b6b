#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use outage_engine::{Backend, FetchError, SeriesPage, TablePage, TableQuery};

/// Scripted backend: pages are served in call order, and every call is
/// recorded so tests can assert call counts and offsets.
#[derive(Default)]
pub struct MockBackend {
    pub table_pages: Mutex<VecDeque<Result<TablePage, FetchError>>>,
    pub detail_docs: Mutex<HashMap<String, Result<String, FetchError>>>,
    pub series_scripts: Mutex<HashMap<String, VecDeque<Result<SeriesPage, FetchError>>>>,
    pub table_calls: Mutex<Vec<u64>>,
    pub detail_calls: Mutex<Vec<String>>,
    pub series_calls: Mutex<Vec<(String, u64)>>,
}

impl MockBackend {
    pub fn with_table_pages(pages: Vec<TablePage>) -> Self {
        let backend = Self::default();
        *backend.table_pages.lock().unwrap() = pages.into_iter().map(Ok).collect();
        backend
    }

    pub fn push_detail(&self, detail_id: &str, doc: Result<String, FetchError>) {
        self.detail_docs
            .lock()
            .unwrap()
            .insert(detail_id.to_string(), doc);
    }

    pub fn push_series(&self, detail_id: &str, pages: Vec<Result<SeriesPage, FetchError>>) {
        self.series_scripts
            .lock()
            .unwrap()
            .insert(detail_id.to_string(), pages.into_iter().collect());
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn table_page(&self, _query: &TableQuery, offset: u64) -> Result<TablePage, FetchError> {
        self.table_calls.lock().unwrap().push(offset);
        self.table_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(FetchError::Body(format!(
                    "no scripted table page for offset {offset}"
                )))
            })
    }

    async fn detail_document(&self, detail_id: &str) -> Result<String, FetchError> {
        self.detail_calls.lock().unwrap().push(detail_id.to_string());
        self.detail_docs
            .lock()
            .unwrap()
            .get(detail_id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Status(404)))
    }

    async fn series_page(
        &self,
        detail_id: &str,
        offset: u64,
        _items_per_page: u64,
    ) -> Result<SeriesPage, FetchError> {
        self.series_calls
            .lock()
            .unwrap()
            .push((detail_id.to_string(), offset));
        self.series_scripts
            .lock()
            .unwrap()
            .get_mut(detail_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(FetchError::Body(format!(
                    "no scripted series page for {detail_id} at offset {offset}"
                )))
            })
    }

    async fn border_values(&self, _country: &str) -> Result<Vec<String>, FetchError> {
        Ok(vec!["CTY|TEST!BZN".to_string()])
    }
}

pub fn test_config() -> outage_core::SessionConfig {
    outage_core::SessionConfig {
        from_date: "01.01.2021".to_string(),
        to_date: "01.02.2021".to_string(),
        // Keep tests fast; the politeness delay is exercised implicitly.
        request_delay_seconds: 0.0,
        ..outage_core::SessionConfig::default()
    }
}

pub fn test_query() -> TableQuery {
    TableQuery::build(&test_config(), None)
}

/// One raw summary-table row as the portal serves it.
pub fn raw_summary_row(detail_id: &str) -> Vec<String> {
    vec![
        "A05".to_string(),
        "A53".to_string(),
        "01.01.2021 00:00&nbsp;-&nbsp;10.01.2021 00:00 (UTC)".to_string(),
        "DE".to_string(),
        "FR".to_string(),
        "<span>1000</span>".to_string(),
        detail_id.to_string(),
    ]
}

pub fn table_page(ids: &[&str], total: u64) -> TablePage {
    TablePage {
        rows: ids.iter().map(|id| raw_summary_row(id)).collect(),
        total,
    }
}

pub fn series_page(range: std::ops::Range<u64>, total: u64) -> SeriesPage {
    SeriesPage {
        rows: range
            .map(|i| (format!("mtu-{i}"), format!("{i}")))
            .collect(),
        total,
    }
}

/// A well-formed six-field detail document.
pub fn detail_document() -> String {
    let cells = [
        "no remarks".to_string(),
        "maintenance".to_string(),
        "X-17".to_string(),
        "<td class=\"B21\"></td>".to_string(),
        "Line 4".to_string(),
        "North".to_string(),
    ];
    let rows: String = cells
        .iter()
        .map(|cell| {
            if cell.starts_with("<td") {
                format!("<tr>{cell}</tr>")
            } else {
                format!("<tr><td>{cell}</td></tr>")
            }
        })
        .collect();
    format!("<html><body><table>{rows}</table></body></html>")
}
