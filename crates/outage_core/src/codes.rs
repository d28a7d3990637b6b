use std::fmt;

use serde::{Deserialize, Serialize};

/// Outage status of one summary row.
///
/// Raw table cells carry backend codes (`A05`/`A09`/`A13`). Anything else is
/// preserved verbatim so an unfamiliar code never drops data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutageStatus {
    Active,
    Cancelled,
    Withdrawn,
    Other(String),
}

impl OutageStatus {
    /// Decodes a raw status cell. Matches on containment because the backend
    /// embeds the code in surrounding markup.
    pub fn decode(raw: &str) -> Self {
        match raw {
            "Active" => Self::Active,
            "Cancelled" => Self::Cancelled,
            "Withdrawn" => Self::Withdrawn,
            _ if raw.contains("A05") => Self::Active,
            _ if raw.contains("A09") => Self::Cancelled,
            _ if raw.contains("A13") => Self::Withdrawn,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Backend request code for this status, if it has one.
    pub fn request_code(&self) -> Option<&'static str> {
        match self {
            Self::Active => Some("A05"),
            Self::Cancelled => Some("A09"),
            Self::Withdrawn => Some("A13"),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::Cancelled => "Cancelled",
            Self::Withdrawn => "Withdrawn",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for OutageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OutageStatus {
    fn from(raw: String) -> Self {
        Self::decode(&raw)
    }
}

impl From<OutageStatus> for String {
    fn from(status: OutageStatus) -> String {
        status.as_str().to_string()
    }
}

/// Whether an outage was planned or forced (`A53`/`A54`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutageNature {
    Planned,
    Forced,
    Other(String),
}

impl OutageNature {
    pub fn decode(raw: &str) -> Self {
        match raw {
            "Planned" => Self::Planned,
            "Forced" => Self::Forced,
            _ if raw.contains("A53") => Self::Planned,
            _ if raw.contains("A54") => Self::Forced,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn request_code(&self) -> Option<&'static str> {
        match self {
            Self::Planned => Some("A53"),
            Self::Forced => Some("A54"),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Planned => "Planned",
            Self::Forced => "Forced",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for OutageNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OutageNature {
    fn from(raw: String) -> Self {
        Self::decode(&raw)
    }
}

impl From<OutageNature> for String {
    fn from(nature: OutageNature) -> String {
        nature.as_str().to_string()
    }
}

/// Grid asset class of a detail record (`B21`..`B24`, `UNKNOWN`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
    AcLink,
    DcLink,
    Substation,
    Transformer,
    NotSpecified,
    Other(String),
}

impl AssetType {
    pub fn decode(raw: &str) -> Self {
        match raw {
            "B21" | "AC Link" => Self::AcLink,
            "B22" | "DC Link" => Self::DcLink,
            "B23" | "Substation" => Self::Substation,
            "B24" | "Transformer" => Self::Transformer,
            "UNKNOWN" | "Not specified" => Self::NotSpecified,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn request_code(&self) -> Option<&'static str> {
        match self {
            Self::AcLink => Some("B21"),
            Self::DcLink => Some("B22"),
            Self::Substation => Some("B23"),
            Self::Transformer => Some("B24"),
            Self::NotSpecified => Some("UNKNOWN"),
            Self::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AcLink => "AC Link",
            Self::DcLink => "DC Link",
            Self::Substation => "Substation",
            Self::Transformer => "Transformer",
            Self::NotSpecified => "Not specified",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AssetType {
    fn from(raw: String) -> Self {
        Self::decode(&raw)
    }
}

impl From<AssetType> for String {
    fn from(asset: AssetType) -> String {
        asset.as_str().to_string()
    }
}
