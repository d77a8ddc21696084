//! Spanish month names and period labels (`"Enero 2024"` or `"2024"`).
//!
//! Periods carry no ordering of their own. Series are ordered by their
//! position in the source dataset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A calendar month, named in Spanish as it appears in the datasets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    /// Returns all months from January to December.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Enero,
            Self::Febrero,
            Self::Marzo,
            Self::Abril,
            Self::Mayo,
            Self::Junio,
            Self::Julio,
            Self::Agosto,
            Self::Septiembre,
            Self::Octubre,
            Self::Noviembre,
            Self::Diciembre,
        ]
    }

    /// Returns the month number, 1 for January.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Creates a month from its number (1-12).
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        if number >= 1 && number <= 12 {
            Some(Self::all()[(number - 1) as usize])
        } else {
            None
        }
    }
}

/// A month+year or bare-year label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// A calendar month, e.g. `Enero 2024`.
    Month {
        /// Four-digit year.
        year: u16,
        /// Month of the year.
        month: Month,
    },
    /// A bare year, e.g. `2024`.
    Year(u16),
}

impl Period {
    /// Creates a month period.
    #[must_use]
    pub const fn month(month: Month, year: u16) -> Self {
        Self::Month { year, month }
    }

    /// Returns the year of this period.
    #[must_use]
    pub const fn year(self) -> u16 {
        match self {
            Self::Month { year, .. } | Self::Year(year) => year,
        }
    }

    /// Returns the preceding month, or the preceding year for bare years.
    #[must_use]
    pub fn previous(self) -> Self {
        match self {
            Self::Month {
                year,
                month: Month::Enero,
            } => Self::month(Month::Diciembre, year - 1),
            Self::Month { year, month } => Self::month(
                Month::from_number(month.number() - 1).unwrap_or(Month::Enero),
                year,
            ),
            Self::Year(year) => Self::Year(year - 1),
        }
    }

    /// Returns the same month one year earlier.
    #[must_use]
    pub const fn year_before(self) -> Self {
        match self {
            Self::Month { year, month } => Self::month(month, year - 1),
            Self::Year(year) => Self::Year(year - 1),
        }
    }

    /// Returns every month from `start` to `end` inclusive.
    ///
    /// Returns an empty list when either bound is a bare year or `start`
    /// comes after `end`.
    #[must_use]
    pub fn month_range(start: Self, end: Self) -> Vec<Self> {
        let (Self::Month { year: sy, month: sm }, Self::Month { year: ey, month: em }) =
            (start, end)
        else {
            return Vec::new();
        };

        let first = u32::from(sy) * 12 + u32::from(sm.number() - 1);
        let last = u32::from(ey) * 12 + u32::from(em.number() - 1);

        (first..=last)
            .filter_map(|index| {
                let year = u16::try_from(index / 12).ok()?;
                let month = Month::from_number(u8::try_from(index % 12).ok()? + 1)?;
                Some(Self::month(month, year))
            })
            .collect()
    }

    /// The 19-month report window, `Enero 2024` through `Julio 2025`.
    #[must_use]
    pub fn report_window() -> Vec<Self> {
        Self::month_range(
            Self::month(Month::Enero, 2024),
            Self::month(Month::Julio, 2025),
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{month} {year}"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Error returned when a period label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodParseError {
    /// The label that failed to parse.
    pub label: String,
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid period '{}': expected \"<Mes> <Año>\" or a year",
            self.label
        )
    }
}

impl std::error::Error for PeriodParseError {}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError {
            label: s.to_string(),
        };

        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(year), None, None) => year.parse().map(Self::Year).map_err(|_| err()),
            (Some(month), Some(year), None) => {
                let month: Month = month.parse().map_err(|_| err())?;
                let year: u16 = year.parse().map_err(|_| err())?;
                Ok(Self::month(month, year))
            }
            _ => Err(err()),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_period() {
        let period: Period = "Enero 2024".parse().unwrap();
        assert_eq!(period, Period::month(Month::Enero, 2024));
        assert_eq!(period.to_string(), "Enero 2024");
    }

    #[test]
    fn parses_month_case_insensitively() {
        let period: Period = "septiembre 2024".parse().unwrap();
        assert_eq!(period, Period::month(Month::Septiembre, 2024));
    }

    #[test]
    fn parses_bare_year() {
        let period: Period = "2019".parse().unwrap();
        assert_eq!(period, Period::Year(2019));
    }

    #[test]
    fn rejects_garbage() {
        assert!("Primavera 2024".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
        assert!("Enero 2024 extra".parse::<Period>().is_err());
    }

    #[test]
    fn previous_of_january_is_december_of_prior_year() {
        let period = Period::month(Month::Enero, 2024);
        assert_eq!(period.previous(), Period::month(Month::Diciembre, 2023));
        assert_eq!(
            Period::month(Month::Marzo, 2025).previous(),
            Period::month(Month::Febrero, 2025)
        );
    }

    #[test]
    fn year_before_keeps_month() {
        let period = Period::month(Month::Julio, 2025);
        assert_eq!(period.year_before(), Period::month(Month::Julio, 2024));
    }

    #[test]
    fn report_window_has_nineteen_months() {
        let window = Period::report_window();
        assert_eq!(window.len(), 19);
        assert_eq!(window[0].to_string(), "Enero 2024");
        assert_eq!(window[8].to_string(), "Septiembre 2024");
        assert_eq!(window[18].to_string(), "Julio 2025");
    }

    #[test]
    fn month_range_is_empty_when_reversed() {
        let range = Period::month_range(
            Period::month(Month::Marzo, 2025),
            Period::month(Month::Enero, 2025),
        );
        assert!(range.is_empty());
    }

    #[test]
    fn month_numbers() {
        assert_eq!(Month::Enero.number(), 1);
        assert_eq!(Month::Diciembre.number(), 12);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Month::from_number(9), Some(Month::Septiembre));
    }
}
