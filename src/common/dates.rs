// src/common/dates.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const TEXT_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Aceita datas ISO (com ou sem hora) e os formatos franceses usuais.
/// Anos com dois dígitos ("15/01/25") são tratados como 20xx.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| {
            if date.year() < 100 {
                date.with_year(date.year() + 2000)
            } else {
                Some(date)
            }
        })
}

/// Número de série do Excel (época 1899-12-30, bug do ano bissexto de 1900 incluído).
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Datas digitadas como número "ddmmyy" (ex: 270524 -> 27/05/2024).
pub fn compact_number_to_date(value: i64) -> Option<NaiveDate> {
    if !(10_100..=311_299).contains(&value) {
        return None;
    }
    let day = (value / 10_000) as u32;
    let month = ((value / 100) % 100) as u32;
    let year = 2000 + (value % 100) as i32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Valores numéricos vindos da planilha: acima de 40000 é série do Excel,
/// abaixo disso tentamos o formato compacto ddmmyy.
pub fn spreadsheet_number_to_date(value: f64) -> Option<NaiveDate> {
    if value > 40_000.0 && value < 100_000.0 {
        excel_serial_to_date(value)
    } else {
        compact_number_to_date(value.trunc() as i64)
    }
}

pub fn format_fr(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

// Helpers para `#[serde(deserialize_with = ...)]`

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("date invalide: {}", raw)))
}

pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_flexible_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("date invalide: {}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2025-01-15", ymd(2025, 1, 15))]
    #[case("2025-01-15T10:30:00.000Z", ymd(2025, 1, 15))]
    #[case("2025-01-15T10:30:00", ymd(2025, 1, 15))]
    #[case("15/01/2025", ymd(2025, 1, 15))]
    #[case("15/01/25", ymd(2025, 1, 15))]
    #[case(" 03.11.2024 ", ymd(2024, 11, 3))]
    fn parses_common_date_formats(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_flexible_date(raw), Some(expected));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("bientot"), None);
    }

    #[test]
    fn converts_excel_serials() {
        assert_eq!(excel_serial_to_date(45658.0), Some(ymd(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(45658.75), Some(ymd(2025, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn converts_compact_numbers() {
        assert_eq!(spreadsheet_number_to_date(270524.0), Some(ymd(2024, 5, 27)));
        assert_eq!(spreadsheet_number_to_date(46031.0), excel_serial_to_date(46031.0));
        assert_eq!(compact_number_to_date(320124), None);
    }

    #[test]
    fn formats_french_dates() {
        assert_eq!(format_fr(ymd(2025, 3, 7)), "07/03/2025");
    }
}
