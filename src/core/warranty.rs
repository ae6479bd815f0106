use crate::domain::model::{AssetEntitlements, BearerToken, VendorDate, WarrantyInfo};
use crate::domain::ports::VendorApi;
use crate::utils::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Output format of every date column.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Fetch entitlements for one service tag and reduce them to [`WarrantyInfo`].
pub async fn get_warranty<A: VendorApi + ?Sized>(
    api: &A,
    service_tag: &str,
    token: &BearerToken,
) -> Result<WarrantyInfo> {
    let assets = api.fetch_entitlements(service_tag, token).await?;
    Ok(derive_warranty(&assets))
}

/// Ship date of the first asset and the latest entitlement end date under it.
pub fn derive_warranty(assets: &[AssetEntitlements]) -> WarrantyInfo {
    let Some(asset) = assets.first() else {
        return WarrantyInfo::default();
    };

    // 廠商對無效的 service tag 仍會回傳一筆 invalid 資料
    if asset.invalid {
        return WarrantyInfo::default();
    }

    let end_dates = asset
        .entitlements
        .iter()
        .filter_map(|entitlement| entitlement.end_date.as_deref())
        .filter_map(parse_vendor_date);

    WarrantyInfo {
        ship_date: asset.ship_date.as_deref().and_then(parse_vendor_date),
        warranty_expiration: latest_date(end_dates),
    }
}

/// Latest parsed date; when nothing parsed, the lexically greatest raw value.
fn latest_date(dates: impl Iterator<Item = VendorDate>) -> Option<VendorDate> {
    let (parsed, raw): (Vec<VendorDate>, Vec<VendorDate>) =
        dates.partition(|date| matches!(date, VendorDate::Date(_)));
    parsed.into_iter().max().or_else(|| raw.into_iter().max())
}

/// Parses the timestamp shapes the vendor emits down to a calendar date.
/// Unknown shapes are kept as trimmed text; blank values yield `None`.
pub fn parse_vendor_date(raw: &str) -> Option<VendorDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(VendorDate::Date(dt.date_naive()));
    }
    // 例如 2020-01-15T06:00:00.000+0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(VendorDate::Date(dt.date_naive()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(VendorDate::Date(dt.date()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(VendorDate::Date(date));
    }

    tracing::debug!("Keeping unrecognized vendor date verbatim: {}", raw);
    Some(VendorDate::Raw(raw.to_string()))
}

pub fn format_date(date: Option<&VendorDate>) -> String {
    match date {
        Some(VendorDate::Date(d)) => d.format(DATE_FORMAT).to_string(),
        Some(VendorDate::Raw(raw)) => raw.clone(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Entitlement;

    fn asset(ship_date: Option<&str>, end_dates: &[&str]) -> AssetEntitlements {
        AssetEntitlements {
            invalid: false,
            ship_date: ship_date.map(str::to_string),
            entitlements: end_dates
                .iter()
                .map(|end| Entitlement {
                    end_date: Some(end.to_string()),
                })
                .collect(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<VendorDate> {
        NaiveDate::from_ymd_opt(y, m, d).map(VendorDate::Date)
    }

    fn raw(text: &str) -> Option<VendorDate> {
        Some(VendorDate::Raw(text.to_string()))
    }

    #[test]
    fn test_latest_end_date_wins() {
        let info = derive_warranty(&[asset(
            Some("2020-01-15"),
            &["2023-01-15", "2021-01-15", "2022-06-30"],
        )]);
        assert_eq!(info.ship_date, date(2020, 1, 15));
        assert_eq!(info.warranty_expiration, date(2023, 1, 15));
    }

    #[test]
    fn test_only_first_asset_is_used() {
        let info = derive_warranty(&[
            asset(Some("2019-03-01"), &["2020-03-01"]),
            asset(Some("2021-01-01"), &["2030-01-01"]),
        ]);
        assert_eq!(info.ship_date, date(2019, 3, 1));
        assert_eq!(info.warranty_expiration, date(2020, 3, 1));
    }

    #[test]
    fn test_empty_entitlements_leave_expiration_empty() {
        let info = derive_warranty(&[asset(Some("2020-01-15"), &[])]);
        assert_eq!(info.ship_date, date(2020, 1, 15));
        assert!(info.warranty_expiration.is_none());
    }

    #[test]
    fn test_empty_response_is_not_an_error() {
        assert_eq!(derive_warranty(&[]), WarrantyInfo::default());
    }

    #[test]
    fn test_invalid_asset_yields_nothing() {
        let mut invalid = asset(Some("2020-01-15"), &["2023-01-15"]);
        invalid.invalid = true;
        assert_eq!(derive_warranty(&[invalid]), WarrantyInfo::default());
    }

    #[test]
    fn test_parse_vendor_date_shapes() {
        assert_eq!(parse_vendor_date("2020-01-15T00:00:00Z"), date(2020, 1, 15));
        assert_eq!(parse_vendor_date("2023-01-15T23:59:59.000Z"), date(2023, 1, 15));
        assert_eq!(parse_vendor_date("2023-01-15T05:59:59.999-06:00"), date(2023, 1, 15));
        assert_eq!(parse_vendor_date("2023-01-15T05:59:59"), date(2023, 1, 15));
        assert_eq!(parse_vendor_date(" 2020-01-15 "), date(2020, 1, 15));
        assert_eq!(parse_vendor_date("2020-01-15T06:00:00.000+0000"), date(2020, 1, 15));
        assert_eq!(parse_vendor_date("2023-01-15T05:59:59.999+0000"), date(2023, 1, 15));
        assert_eq!(parse_vendor_date(" not a date "), raw("not a date"));
        assert_eq!(parse_vendor_date(""), None);
        assert_eq!(parse_vendor_date("   "), None);
    }

    #[test]
    fn test_offset_without_colon_keeps_dates() {
        let info = derive_warranty(&[asset(
            Some("2020-01-15T06:00:00.000+0000"),
            &["2021-01-15T05:59:59.999+0000", "2023-01-15T05:59:59.999+0000"],
        )]);
        assert_eq!(info.ship_date, date(2020, 1, 15));
        assert_eq!(info.warranty_expiration, date(2023, 1, 15));
        assert_eq!(format_date(info.warranty_expiration.as_ref()), "01/15/2023");
    }

    #[test]
    fn test_parsed_end_dates_win_over_unrecognized_ones() {
        let info = derive_warranty(&[asset(None, &["zz-unknown", "2021-01-15"])]);
        assert!(info.ship_date.is_none());
        assert_eq!(info.warranty_expiration, date(2021, 1, 15));
    }

    #[test]
    fn test_unrecognized_dates_are_rendered_verbatim() {
        let info = derive_warranty(&[asset(
            Some("15.01.2020"),
            &["2021/01/15 06:00", "2023/01/15 06:00"],
        )]);
        assert_eq!(info.ship_date, raw("15.01.2020"));
        assert_eq!(info.warranty_expiration, raw("2023/01/15 06:00"));
        assert_eq!(format_date(info.ship_date.as_ref()), "15.01.2020");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2020, 1, 15).as_ref()), "01/15/2020");
        assert_eq!(format_date(raw("2020-13-45").as_ref()), "2020-13-45");
        assert_eq!(format_date(None), "");
    }
}
