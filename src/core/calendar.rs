use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::SimulationError;
use super::types::MAX_MONTHS;

/// Calendar month used as the key of the monthly series.
///
/// Ordering is chronological and the `Display` form is the zero-padded
/// `YYYY-MM` string, so lexicographic and calendar order agree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// The month `months` after this one, or `None` past 9999-12.
    pub fn offset(self, months: u32) -> Option<Self> {
        let zero_based = i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        let year = i32::try_from(zero_based / 12).ok()?;
        MonthKey::new(year, (zero_based % 12) as u32 + 1)
    }

    /// Consecutive months starting here, stopping early at the end of the calendar.
    pub fn range(self, count: u32) -> impl Iterator<Item = MonthKey> {
        (0..count).map_while(move |i| self.offset(i))
    }
}

/// Parses the start month and checks that the whole horizon fits the key format.
pub fn parse_horizon(start_month: &str, months: u32) -> Result<MonthKey, SimulationError> {
    let start: MonthKey = start_month.parse()?;
    if months == 0 || months > MAX_MONTHS {
        return Err(SimulationError::InvalidMonthCount);
    }
    if start.offset(months - 1).is_none() {
        return Err(SimulationError::HorizonPastCalendar { start, months });
    }
    Ok(start)
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SimulationError::InvalidStartMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Run-relative quarter and year for a 0-based month index.
///
/// Quarters count from the first simulated month, not from January. The
/// quarter number keeps climbing past 4 while the year advances every twelve
/// months, so from the second run year on no `1..=4` schedule entry matches.
pub fn run_quarter(month_index: u32, base_year: i32) -> (u32, i32) {
    let quarter = month_index / 3 + 1;
    let year = base_year + (month_index / 12) as i32;
    (quarter, year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_zero_padded_keys() {
        let key: MonthKey = "2025-03".parse().expect("valid month");
        assert_eq!(key.year(), 2025);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2025-03");
    }

    #[test]
    fn rejects_malformed_start_months() {
        for raw in ["2025-3", "25-03", "2025-13", "2025-00", "2025/03", "abcd-ef", ""] {
            let err = raw.parse::<MonthKey>().expect_err("must reject");
            assert_eq!(err, SimulationError::InvalidStartMonth(raw.to_string()));
        }
    }

    #[test]
    fn offset_rolls_over_year_boundaries() {
        let key = MonthKey::new(2024, 11).expect("valid");
        let keys: Vec<String> = key.range(4).map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(key.offset(26).map(|k| k.to_string()), Some("2027-01".to_string()));
    }

    #[test]
    fn offset_stops_at_last_representable_month() {
        let last = MonthKey::new(9999, 12).expect("valid");
        assert_eq!(last.offset(0), Some(last));
        assert_eq!(last.offset(1), None);
        assert_eq!(last.range(3).count(), 1);
    }

    #[test]
    fn horizon_must_fit_calendar_and_month_limit() {
        assert_eq!(parse_horizon("2025-01", 12).map(|k| k.to_string()), Ok("2025-01".to_string()));
        assert_eq!(parse_horizon("9999-01", 12).map(|k| k.to_string()), Ok("9999-01".to_string()));
        assert_eq!(
            parse_horizon("9999-12", 2),
            Err(SimulationError::HorizonPastCalendar {
                start: MonthKey::new(9999, 12).expect("valid"),
                months: 2,
            })
        );
        assert_eq!(parse_horizon("2025-01", 0), Err(SimulationError::InvalidMonthCount));
        assert!(parse_horizon("2025-01", MAX_MONTHS).is_ok());
        assert_eq!(
            parse_horizon("2025-01", MAX_MONTHS + 1),
            Err(SimulationError::InvalidMonthCount)
        );
        assert_eq!(parse_horizon("2025-01", u32::MAX), Err(SimulationError::InvalidMonthCount));
    }

    #[test]
    fn run_quarter_counts_from_first_month_without_wrapping() {
        assert_eq!(run_quarter(0, 2025), (1, 2025));
        assert_eq!(run_quarter(2, 2025), (1, 2025));
        assert_eq!(run_quarter(3, 2025), (2, 2025));
        assert_eq!(run_quarter(11, 2025), (4, 2025));
        assert_eq!(run_quarter(12, 2025), (5, 2026));
        assert_eq!(run_quarter(23, 2025), (8, 2026));
    }

    #[test]
    fn serializes_as_string_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(MonthKey::new(2025, 1).expect("valid"), 1);
        map.insert(MonthKey::new(2024, 12).expect("valid"), 2);
        let json = serde_json::to_string(&map).expect("serializable");
        assert_eq!(json, r#"{"2024-12":2,"2025-01":1}"#);
    }
}
