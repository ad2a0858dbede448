//! Shared serde helpers for schedule exports.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

/// Serde default for boolean flags that are on unless disabled.
pub(crate) fn default_true() -> bool {
    true
}

/// Accepted calendar date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse a calendar date, day-first when ambiguous.
///
/// Blank or unparseable input yields `None` rather than an error; a bad date
/// must never sink the record it belongs to.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Timestamps exported with a time component keep only the date part.
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// `#[serde(with = "flexible_date")]` for `Option<NaiveDate>` fields.
pub mod flexible_date {
    use super::*;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_date))
    }
}

/// Identifier lists arrive either as JSON arrays or as a delimited string.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdList {
    List(Vec<String>),
    Delimited(String),
}

/// `#[serde(deserialize_with = "id_list")]` for predecessor/successor lists.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed: Option<IdList> = Option::deserialize(deserializer)?;
    Ok(match parsed {
        None => Vec::new(),
        Some(IdList::List(items)) => items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(IdList::Delimited(raw)) => raw
            .split([';', ','])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(parse_date("2026-01-15"), Some(expected));
        assert_eq!(parse_date("15-01-2026"), Some(expected));
        assert_eq!(parse_date("15/01/2026"), Some(expected));
        assert_eq!(parse_date("2026-01-15T08:00:00"), Some(expected));
    }

    #[test]
    fn test_parse_date_blank_and_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
    }
}
