use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codes::{AssetType, OutageNature, OutageStatus};
use crate::cursor::ItemsPerPage;
use crate::window::SeriesWindow;

/// Country codes the portal knows about.
pub const COUNTRIES: [&str; 39] = [
    "AL", "AT", "BY", "BE", "BA", "BG", "HR", "CZ", "DK", "EE", "MK", "FI", "FR", "DE", "GR",
    "HU", "IE", "IT", "LV", "LT", "LU", "MT", "MD", "ME", "NL", "NO", "PL", "PT", "RO", "RU",
    "RS", "SK", "SI", "ES", "SE", "CH", "TR", "UA", "UK",
];

/// Grid view the table is filtered by, e.g. `BORDER_CTA`.
pub type AreaType = String;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionConfigError {
    #[error("country code {0:?} is invalid")]
    InvalidCountry(String),
}

/// One harvest session, as read from the config file.
///
/// Dates are `dd.mm.yyyy` strings because that is the format the portal's
/// query parameters expect verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub from_date: String,
    pub to_date: String,
    pub area_type: AreaType,
    /// Restricting to one country shrinks the session considerably and is
    /// kinder to the backend.
    pub country: Option<String>,
    /// Filter values; `None` means all known codes.
    pub asset_types: Option<Vec<AssetType>>,
    pub outage_types: Option<Vec<OutageNature>>,
    pub outage_statuses: Option<Vec<OutageStatus>>,
    pub items_per_page: ItemsPerPage,
    /// Pause between per-id requests. A politeness control, not a tunable
    /// performance knob.
    pub request_delay_seconds: f64,
    pub skip_details: bool,
    pub skip_timeseries: bool,
    /// Cap series history at this many days (24 hourly points each).
    pub days_to_fetch: Option<u64>,
    pub skip_past_data: bool,
    /// Resume a crashed session from its checkpoint instead of refetching.
    pub resume: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            from_date: String::new(),
            to_date: String::new(),
            area_type: "BORDER_CTA".to_string(),
            country: None,
            asset_types: None,
            outage_types: None,
            outage_statuses: None,
            items_per_page: ItemsPerPage::default(),
            request_delay_seconds: 1.0,
            skip_details: false,
            skip_timeseries: false,
            days_to_fetch: None,
            skip_past_data: false,
            resume: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionConfigError> {
        if let Some(country) = &self.country {
            if !COUNTRIES.contains(&country.as_str()) {
                return Err(SessionConfigError::InvalidCountry(country.clone()));
            }
        }
        Ok(())
    }

    /// Series fetch bounds derived from the windowing knobs.
    pub fn series_window(&self) -> SeriesWindow {
        SeriesWindow {
            skip_past_data: self.skip_past_data,
            max_points: self.days_to_fetch.map(|days| days * 24),
        }
    }

    /// Asset-type request codes for the table query, defaulting to all.
    pub fn asset_type_codes(&self) -> Vec<&'static str> {
        filter_codes(self.asset_types.as_deref(), AssetType::request_code, {
            &[
                AssetType::AcLink,
                AssetType::DcLink,
                AssetType::Substation,
                AssetType::Transformer,
                AssetType::NotSpecified,
            ]
        })
    }

    pub fn outage_type_codes(&self) -> Vec<&'static str> {
        filter_codes(self.outage_types.as_deref(), OutageNature::request_code, {
            &[OutageNature::Forced, OutageNature::Planned]
        })
    }

    pub fn outage_status_codes(&self) -> Vec<&'static str> {
        filter_codes(
            self.outage_statuses.as_deref(),
            OutageStatus::request_code,
            &[
                OutageStatus::Active,
                OutageStatus::Cancelled,
                OutageStatus::Withdrawn,
            ],
        )
    }
}

fn filter_codes<T>(
    selected: Option<&[T]>,
    code: impl Fn(&T) -> Option<&'static str>,
    all: &[T],
) -> Vec<&'static str> {
    let source = selected.unwrap_or(all);
    source.iter().filter_map(code).collect()
}

/// Deterministic session name used in every artifact filename:
/// `{country}_{areaType}_{fromDate}_{toDate}` with dots folded away.
pub fn session_name(config: &SessionConfig) -> String {
    let country = config.country.as_deref().unwrap_or("ALL");
    format!(
        "{}_{}_{}_{}",
        country,
        config.area_type,
        config.from_date.replace('.', "_"),
        config.to_date.replace('.', "_"),
    )
}
