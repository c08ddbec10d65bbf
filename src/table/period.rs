//! Period label normalization.
//!
//! INE labels periods in English prose ("2021", "March 2020",
//! "1st quarter of 2021"). We turn them into calendar dates so tables can be
//! indexed and exported consistently.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::Periodicity;
use crate::error::IneError;

/// A row label: a calendar date, or the raw label for periodicities we do not convert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Date(NaiveDate),
    Raw(String),
}

impl Period {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for Period {
    /// ISO `YYYY-MM-DD` for dates, verbatim otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Raw(label) => f.write_str(label),
        }
    }
}

/// Convert a raw period label into a [`Period`].
pub fn normalize(periodicity: &Periodicity, label: &str) -> Result<Period, IneError> {
    let label = label.trim();
    let date = match periodicity {
        Periodicity::Annual | Periodicity::Decennial => first_of_month(parse_year(label)?, 1, label)?,
        Periodicity::Monthly => NaiveDate::parse_from_str(&format!("01 {label}"), "%d %B %Y")
            .map_err(|e| IneError::Decode(format!("invalid monthly period '{label}': {e}")))?,
        Periodicity::Quarterly => quarter_to_date(label)?,
        Periodicity::Other(_) => return Ok(Period::Raw(label.to_string())),
    };
    Ok(Period::Date(date))
}

/// `"{1st|2nd|3rd|4th} quarter of {year}"` → first day of the quarter's last month.
///
/// Unknown ordinals fall back to January of the same year.
fn quarter_to_date(label: &str) -> Result<NaiveDate, IneError> {
    let mut parts = label.split_whitespace();
    let ordinal = parts.next().unwrap_or_default();
    let year = parts
        .last()
        .ok_or_else(|| IneError::Decode(format!("invalid quarterly period '{label}'")))?;
    let month = match ordinal {
        "1st" => 3,
        "2nd" => 6,
        "3rd" => 9,
        "4th" => 12,
        _ => 1,
    };
    first_of_month(parse_year(year)?, month, label)
}

fn parse_year(raw: &str) -> Result<i32, IneError> {
    if raw.len() != 4 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IneError::Decode(format!("invalid year in period '{raw}'")));
    }
    raw.parse::<i32>()
        .map_err(|e| IneError::Decode(format!("invalid year in period '{raw}': {e}")))
}

fn first_of_month(year: i32, month: u32, label: &str) -> Result<NaiveDate, IneError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| IneError::Decode(format!("period '{label}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> Period {
        Period::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn annual_and_decennial() {
        assert_eq!(normalize(&Periodicity::Annual, "2021").unwrap(), ymd(2021, 1, 1));
        assert_eq!(normalize(&Periodicity::Decennial, "2011").unwrap(), ymd(2011, 1, 1));
        assert!(normalize(&Periodicity::Annual, "21").is_err());
        assert!(normalize(&Periodicity::Annual, "2021/22").is_err());
    }

    #[test]
    fn monthly() {
        assert_eq!(normalize(&Periodicity::Monthly, "March 2020").unwrap(), ymd(2020, 3, 1));
        assert_eq!(normalize(&Periodicity::Monthly, "December 1999").unwrap(), ymd(1999, 12, 1));
        assert!(normalize(&Periodicity::Monthly, "Marchember 2020").is_err());
    }

    #[test]
    fn quarterly_maps_to_quarter_end_month() {
        assert_eq!(normalize(&Periodicity::Quarterly, "1st quarter of 2021").unwrap(), ymd(2021, 3, 1));
        assert_eq!(normalize(&Periodicity::Quarterly, "2nd quarter of 2021").unwrap(), ymd(2021, 6, 1));
        assert_eq!(normalize(&Periodicity::Quarterly, "3rd quarter of 2021").unwrap(), ymd(2021, 9, 1));
        assert_eq!(normalize(&Periodicity::Quarterly, "4th quarter of 2021").unwrap(), ymd(2021, 12, 1));
    }

    #[test]
    fn quarterly_unknown_ordinal_defaults_to_january() {
        assert_eq!(normalize(&Periodicity::Quarterly, "5th quarter of 2021").unwrap(), ymd(2021, 1, 1));
    }

    #[test]
    fn other_periodicity_passes_label_through() {
        let p = normalize(&Periodicity::Other("Biennial".into()), "2019-2020").unwrap();
        assert_eq!(p, Period::Raw("2019-2020".into()));
        assert_eq!(p.to_string(), "2019-2020");
    }

    #[test]
    fn display_is_iso() {
        assert_eq!(ymd(2020, 3, 1).to_string(), "2020-03-01");
    }

    proptest! {
        #[test]
        fn normalize_is_deterministic(year in 1000i32..=9999, month in 1u32..=12, q in 0usize..4) {
            let name = NaiveDate::from_ymd_opt(year, month, 1).unwrap().format("%B").to_string();
            let monthly = format!("{name} {year}");
            prop_assert_eq!(
                normalize(&Periodicity::Monthly, &monthly).unwrap(),
                normalize(&Periodicity::Monthly, &monthly).unwrap()
            );
            prop_assert_eq!(normalize(&Periodicity::Monthly, &monthly).unwrap(), ymd(year, month, 1));

            let quarterly = format!("{} quarter of {year}", ["1st", "2nd", "3rd", "4th"][q]);
            prop_assert_eq!(
                normalize(&Periodicity::Quarterly, &quarterly).unwrap(),
                ymd(year, (q as u32 + 1) * 3, 1)
            );
        }
    }
}
