use crate::domain::model::{BearerToken, CapacityUnit, Component, DriveKind, StorageSummary};
use crate::domain::ports::VendorApi;
use crate::utils::error::Result;
use regex::Regex;
use std::sync::LazyLock;

static STORAGE_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SSD|HDD|Solid State Drive|SSDR").unwrap());

// 順序即優先權：先找明確的 GB/TB，再找縮寫 G/T
static CAPACITY_PATTERNS: LazyLock<Vec<(Regex, CapacityUnit)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)(\d+)\s*GB").unwrap(), CapacityUnit::Gb),
        (Regex::new(r"(?i)(\d+)\s*TB").unwrap(), CapacityUnit::Tb),
        (Regex::new(r"(?i)(\d+)\s*G\b").unwrap(), CapacityUnit::Gb),
        (Regex::new(r"(?i)(\d+)\s*T\b").unwrap(), CapacityUnit::Tb),
    ]
});

static SSD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)SSD|Solid State Drive|SSDR").unwrap());

static HDD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HDD|Hard Drive|HD").unwrap());

/// Fetch the component list for one service tag and summarize its storage.
pub async fn get_storage<A: VendorApi + ?Sized>(
    api: &A,
    service_tag: &str,
    token: &BearerToken,
) -> Result<StorageSummary> {
    let components = api.fetch_components(service_tag, token).await?;
    Ok(summarize_components(&components))
}

pub fn is_storage_component(component: &Component) -> bool {
    STORAGE_KEYWORDS.is_match(&component.item_description)
        || STORAGE_KEYWORDS.is_match(&component.part_description)
}

pub fn extract_capacity(text: &str) -> Option<(String, CapacityUnit)> {
    CAPACITY_PATTERNS.iter().find_map(|(pattern, unit)| {
        pattern
            .captures(text)
            .map(|caps| (caps[1].to_string(), *unit))
    })
}

pub fn classify_drive(text: &str) -> Option<DriveKind> {
    if SSD_PATTERN.is_match(text) {
        Some(DriveKind::Ssd)
    } else if HDD_PATTERN.is_match(text) {
        Some(DriveKind::Hdd)
    } else {
        None
    }
}

fn description_text(component: &Component) -> String {
    format!(
        "{} {}",
        component.item_description, component.part_description
    )
}

/// First storage component with both a capacity and a drive type wins.
///
/// When none normalizes, the raw text of the first storage component is kept
/// so the export still shows something the reader can interpret.
pub fn summarize_components(components: &[Component]) -> StorageSummary {
    let storage: Vec<&Component> = components
        .iter()
        .filter(|c| is_storage_component(c))
        .collect();

    for component in &storage {
        let text = description_text(component);
        if let (Some((capacity, unit)), Some(kind)) =
            (extract_capacity(&text), classify_drive(&text))
        {
            return StorageSummary::Drive {
                capacity,
                unit,
                kind,
            };
        }
    }

    match storage.first() {
        Some(component) => StorageSummary::Raw(description_text(component).trim().to_string()),
        None => StorageSummary::Unknown,
    }
}
