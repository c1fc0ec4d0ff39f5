use chrono::NaiveDate;

use crate::error::AppError;

/// Parse an optional `YYYY-MM-DD` query value. Blank counts as absent.
pub(crate) fn parse_optional_date(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<NaiveDate>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::InvalidField {
            field,
            message: format!("invalid {field} (expected YYYY-MM-DD)"),
        })
}

/// Both bounds present and reversed is rejected; anything else passes.
pub(crate) fn validate_date_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::InvalidField {
                field: "endDate",
                message: "endDate must be on or after startDate".to_string(),
            });
        }
    }
    Ok(())
}

/// Trim an id filter; an empty value means "no filter".
pub(crate) fn optional_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{optional_filter, parse_optional_date, validate_date_order};

    #[test]
    fn parse_optional_date_accepts_iso_dates_and_blanks() {
        assert_eq!(
            parse_optional_date(Some("2024-02-29"), "startDate").expect("date"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(parse_optional_date(Some("  "), "startDate").expect("blank"), None);
        assert_eq!(parse_optional_date(None, "startDate").expect("absent"), None);
    }

    #[test]
    fn parse_optional_date_rejects_other_formats() {
        assert!(parse_optional_date(Some("02/01/2024"), "startDate").is_err());
        assert!(parse_optional_date(Some("2024-02-30"), "endDate").is_err());
        assert!(parse_optional_date(Some("2024-01-05T10:00:00Z"), "endDate").is_err());
    }

    #[test]
    fn reversed_bounds_are_rejected_only_when_both_present() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1);
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert!(validate_date_order(jan5, jan1).is_err());
        assert!(validate_date_order(jan1, jan5).is_ok());
        assert!(validate_date_order(jan1, jan1).is_ok());
        assert!(validate_date_order(jan5, None).is_ok());
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(optional_filter(Some("".to_string())), None);
        assert_eq!(
            optional_filter(Some(" pipe_1 ".to_string())),
            Some("pipe_1".to_string())
        );
    }
}
