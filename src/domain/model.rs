use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One source row: column name / value pairs in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: Vec<(String, String)>,
}

impl Record {
    pub fn new(data: Vec<(String, String)>) -> Self {
        Self { data }
    }

    /// Value of the first column with exactly this name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|(_, value)| value.as_str())
    }
}

/// Decoded input file.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Vendor timestamp reduced to a calendar date, or kept verbatim when its
/// shape is unknown. Parsed dates order before raw text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum VendorDate {
    Date(NaiveDate),
    Raw(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarrantyInfo {
    pub ship_date: Option<VendorDate>,
    pub warranty_expiration: Option<VendorDate>,
}

/// Normalized storage description of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageSummary {
    #[default]
    Unknown,
    Drive {
        capacity: String,
        unit: CapacityUnit,
        kind: DriveKind,
    },
    /// Storage-like component whose text could not be normalized.
    Raw(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityUnit {
    Gb,
    Tb,
}

impl fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityUnit::Gb => write!(f, "GB"),
            CapacityUnit::Tb => write!(f, "TB"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveKind {
    Ssd,
    Hdd,
}

impl fmt::Display for DriveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveKind::Ssd => write!(f, "SSD"),
            DriveKind::Hdd => write!(f, "HDD"),
        }
    }
}

impl fmt::Display for StorageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageSummary::Unknown => Ok(()),
            StorageSummary::Drive {
                capacity,
                unit,
                kind,
            } => write!(f, "{} {} {}", capacity, unit, kind),
            StorageSummary::Raw(text) => write!(f, "{}", text),
        }
    }
}

/// OAuth access token shared by every lookup of one run.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// One asset of the entitlement response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntitlements {
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub ship_date: Option<String>,
    #[serde(default)]
    pub entitlements: Vec<Entitlement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsResponse {
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item_description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub part_description: String,
}

// 廠商偶爾回傳 null 描述
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Component {
    pub fn new(item_description: &str, part_description: &str) -> Self {
        Self {
            item_description: item_description.to_string(),
            part_description: part_description.to_string(),
        }
    }
}

/// What a run would look up, computed without contacting the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupPlan {
    pub rows_read: usize,
    pub service_tags: Vec<String>,
}

impl LookupPlan {
    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.service_tags.len()
    }

    /// One token request plus a warranty and a storage call per tag.
    pub fn api_calls(&self) -> usize {
        1 + self.service_tags.len() * 2
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_read: usize,
    pub enriched: usize,
    pub skipped: usize,
    pub lookup_failures: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichedTable {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_get_returns_first_exact_match() {
        let record = Record::new(vec![
            ("Model".to_string(), "XPS 13".to_string()),
            ("Model".to_string(), "Latitude".to_string()),
        ]);
        assert_eq!(record.get("Model"), Some("XPS 13"));
        assert_eq!(record.get("model"), None);
    }

    #[test]
    fn test_storage_summary_display() {
        let drive = StorageSummary::Drive {
            capacity: "512".to_string(),
            unit: CapacityUnit::Gb,
            kind: DriveKind::Ssd,
        };
        assert_eq!(drive.to_string(), "512 GB SSD");
        assert_eq!(StorageSummary::Unknown.to_string(), "");
        assert_eq!(StorageSummary::Raw("HDD,SATA".to_string()).to_string(), "HDD,SATA");
    }

    #[test]
    fn test_bearer_token_debug_is_redacted() {
        let token = BearerToken::new("secret-token");
        assert_eq!(format!("{:?}", token), "BearerToken(***)");
        assert_eq!(token.as_str(), "secret-token");
    }

    #[test]
    fn test_entitlement_payload_tolerates_missing_fields() {
        let assets: Vec<AssetEntitlements> = serde_json::from_value(serde_json::json!([
            {"serviceTag": "ABC123", "shipDate": "2020-01-15T00:00:00Z",
             "entitlements": [{"startDate": "2020-01-15T00:00:00Z", "endDate": "2023-01-15T23:59:59.000Z",
                               "serviceLevelDescription": "ProSupport", "itemNumber": "997-8328"}]},
            {"serviceTag": "BAD", "invalid": true}
        ]))
        .unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].entitlements.len(), 1);
        assert_eq!(
            assets[0].entitlements[0].end_date.as_deref(),
            Some("2023-01-15T23:59:59.000Z")
        );
        assert!(assets[1].invalid);
        assert!(assets[1].ship_date.is_none());
    }

    #[test]
    fn test_component_null_description_is_empty() {
        let response: ComponentsResponse = serde_json::from_value(serde_json::json!({
            "components": [{"itemDescription": null, "partDescription": "SSDR,512G,PCIE"}]
        }))
        .unwrap();
        assert_eq!(response.components[0], Component::new("", "SSDR,512G,PCIE"));
    }
}
