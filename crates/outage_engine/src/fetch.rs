use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_TYPE, ORIGIN};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use outage_core::{ItemsPerPage, SessionConfig, COUNTRIES};

use crate::parse::scrape_border_map;

/// Production portal base. Overridable for tests.
const DEFAULT_BASE_URL: &str =
    "https://transparency.entsoe.eu/outage-domain/r2/unavailabilityInTransmissionGrid/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection-level failure: DNS, refused, reset, timeout.
    #[error("connection failed: {0}")]
    Transport(String),
    /// The server rejected the request parameters; retrying the same request
    /// will never succeed.
    #[error("server rejected request parameters: {0}")]
    BadParams(String),
    /// Unexpected HTTP status with no parseable validation body.
    #[error("http status {0}")]
    Status(u16),
    /// The response body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    Body(String),
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One paginated slice of the summary table, as the portal's DataTables
/// endpoint returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TablePage {
    #[serde(rename = "aaData")]
    pub rows: Vec<Vec<String>>,
    #[serde(rename = "iTotalRecords")]
    pub total: u64,
}

/// One paginated slice of a per-id time series: `(mtu label, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeriesPage {
    #[serde(rename = "aaData")]
    pub rows: Vec<(String, String)>,
    #[serde(rename = "iTotalRecords")]
    pub total: u64,
}

/// The resolved summary-table query: everything except the page offset.
#[derive(Debug, Clone)]
pub struct TableQuery {
    pub params: Vec<(String, String)>,
    pub items_per_page: ItemsPerPage,
}

impl TableQuery {
    /// Builds the portal query from a session config and the resolved border
    /// values for its country filter (`None` means all borders).
    pub fn build(config: &SessionConfig, borders: Option<&[String]>) -> Self {
        let mut params: Vec<(String, String)> = vec![
            ("name".into(), String::new()),
            ("defaultValue".into(), "false".into()),
            ("viewType".into(), "TABLE".into()),
            ("areaType".into(), config.area_type.clone()),
            ("atch".into(), "false".into()),
            (
                "dateTime.dateTime".into(),
                format!("{} 00:00|UTC|DAY", config.from_date),
            ),
            (
                "dateTime.endDateTime".into(),
                format!("{} 00:00|UTC|DAY", config.to_date),
            ),
        ];
        match borders {
            Some(values) => {
                for value in values {
                    params.push(("border.values".into(), value.clone()));
                }
            }
            None => params.push(("border.values".into(), "ALL".into())),
        }
        for code in config.asset_type_codes() {
            params.push(("assetType.values".into(), code.into()));
        }
        for code in config.outage_type_codes() {
            params.push(("outageType.values".into(), code.into()));
        }
        for code in config.outage_status_codes() {
            params.push(("outageStatus.values".into(), code.into()));
        }
        Self {
            params,
            items_per_page: config.items_per_page,
        }
    }
}

/// The backend fetch capability the harvesters run against.
///
/// One implementation speaks to the real portal; tests script their own.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn table_page(&self, query: &TableQuery, offset: u64) -> Result<TablePage, FetchError>;

    /// Raw HTML document for one detail id.
    async fn detail_document(&self, detail_id: &str) -> Result<String, FetchError>;

    async fn series_page(
        &self,
        detail_id: &str,
        offset: u64,
        items_per_page: u64,
    ) -> Result<SeriesPage, FetchError>;

    /// Border values for a country filter. Static portal configuration,
    /// fetched once per run.
    async fn border_values(&self, country: &str) -> Result<Vec<String>, FetchError>;
}

/// Reqwest-backed portal client implementing the undocumented wire protocol:
/// DataTables POST bodies for the table and curve endpoints, a plain GET for
/// detail documents.
pub struct PortalBackend {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl PortalBackend {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static("https://transparency.entsoe.eu"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// POST one DataTables request and decode its JSON body.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        body: serde_json::Value,
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .query(params)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header("X-Requested-With", "XMLHttpRequest")
            .body(body.to_string())
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        if !status.is_success() {
            // Validation failures come back as {"errors": [{"message": …}]}.
            return Err(extract_validation_error(&text)
                .map(FetchError::BadParams)
                .unwrap_or(FetchError::Status(status.as_u16())));
        }

        serde_json::from_str(&text).map_err(|err| FetchError::Body(err.to_string()))
    }

    async fn get_text(&self, path: &str, params: &[(String, String)]) -> Result<String, FetchError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .query(params)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))
    }

    /// Country → border values, scraped once from the portal's filter page.
    /// Read-only lookup data, not session state.
    pub async fn border_map(&self) -> Result<BTreeMap<String, Vec<String>>, FetchError> {
        let html = self.get_text("show", &[]).await?;
        Ok(scrape_border_map(&html, &COUNTRIES))
    }
}

#[async_trait::async_trait]
impl Backend for PortalBackend {
    async fn table_page(&self, query: &TableQuery, offset: u64) -> Result<TablePage, FetchError> {
        let body = json!({
            "sEcho": 2,
            "iColumns": 7,
            "sColumns": "status,nature,unavailabilityInterval,inArea,outArea,newNTC,",
            "iDisplayStart": offset,
            "iDisplayLength": query.items_per_page.get(),
            "amDataProp": [0, 1, 2, 3, 4, 5, 6],
        });
        self.post_json("getDataTableData/", &query.params, body).await
    }

    async fn detail_document(&self, detail_id: &str) -> Result<String, FetchError> {
        let params = vec![
            ("detailId".to_string(), detail_id.to_string()),
            ("fullDetailId".to_string(), detail_id.to_string()),
            // Millisecond cache-buster the portal front end sends.
            ("_".to_string(), Utc::now().timestamp_millis().to_string()),
        ];
        self.get_text("detail", &params).await
    }

    async fn series_page(
        &self,
        detail_id: &str,
        offset: u64,
        items_per_page: u64,
    ) -> Result<SeriesPage, FetchError> {
        let params = vec![("detailId".to_string(), detail_id.to_string())];
        let body = json!({
            "sEcho": 1,
            "iColumns": 2,
            "sColumns": "mtu,ntc",
            "iDisplayStart": offset,
            "iDisplayLength": items_per_page,
            "amDataProp": [0, 1],
        });
        self.post_json("getDetailCurve/", &params, body).await
    }

    async fn border_values(&self, country: &str) -> Result<Vec<String>, FetchError> {
        let map = self.border_map().await?;
        map.get(country)
            .cloned()
            .ok_or_else(|| FetchError::BadParams(format!("no borders known for {country}")))
    }
}

fn extract_validation_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("errors")?.get(0)?.get("message")?.as_str()?;
    Some(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use outage_core::SessionConfig;

    #[test]
    fn table_query_defaults_to_all_borders_and_codes() {
        let config = SessionConfig {
            from_date: "01.01.2020".into(),
            to_date: "01.02.2020".into(),
            ..SessionConfig::default()
        };
        let query = TableQuery::build(&config, None);

        let borders: Vec<_> = query
            .params
            .iter()
            .filter(|(k, _)| k == "border.values")
            .collect();
        assert_eq!(borders.len(), 1);
        assert_eq!(borders[0].1, "ALL");

        let statuses: Vec<_> = query
            .params
            .iter()
            .filter(|(k, _)| k == "outageStatus.values")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(statuses, vec!["A05", "A09", "A13"]);
    }

    #[test]
    fn validation_message_is_pulled_from_error_body() {
        let body = r#"{"errors":[{"message":"dateTime is required"}]}"#;
        assert_eq!(
            extract_validation_error(body),
            Some("dateTime is required".to_string())
        );
        assert_eq!(extract_validation_error("<html>502</html>"), None);
    }
}
