//! Date pattern scanning
//!
//! Recognised forms, in matching priority:
//!
//! | Form | Example | Year |
//! |------|---------|------|
//! | ROC era, CJK | `民國114年7月1日` | +1911 |
//! | Gregorian, CJK | `2025年7月1日` | as written |
//! | Gregorian, numeric | `2025/07/01`, `2025-07-01` | as written |
//! | ROC era, numeric | `114/07/01` | +1911 |
//! | Month/day, CJK | `7月1日` | reference year |
//!
//! An optional `HH:MM` (with an optional 上午/下午/晚上 marker) may follow
//! the date directly.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Offset between the ROC era and the Gregorian calendar
pub const ROC_YEAR_OFFSET: i32 = 1911;

/// One date found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// Byte offset of the first character of the date
    pub start: usize,
    /// Byte offset just past the date (and its time, if any)
    pub end: usize,
    /// The date text as written, without the time
    pub raw: String,
    /// Resolved calendar date
    pub date: NaiveDate,
    /// Explicit time of day, if one followed the date
    pub time: Option<NaiveTime>,
}

#[derive(Clone, Copy)]
enum YearRule {
    Gregorian,
    RocEra,
    Reference,
}

struct DatePattern {
    regex: Regex,
    year: YearRule,
    digit_bounded: bool,
}

fn pattern(re: &str, year: YearRule, digit_bounded: bool) -> DatePattern {
    DatePattern {
        regex: Regex::new(re).unwrap_or_else(|_| unreachable!()),
        year,
        digit_bounded,
    }
}

static PATTERNS: Lazy<Vec<DatePattern>> = Lazy::new(|| {
    vec![
        pattern(
            r"民國\s*(\d{2,3})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*[日號]",
            YearRule::RocEra,
            false,
        ),
        pattern(
            r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*[日號]",
            YearRule::Gregorian,
            true,
        ),
        pattern(r"(\d{4})[/-](\d{1,2})[/-](\d{1,2})", YearRule::Gregorian, true),
        pattern(r"(\d{3})/(\d{1,2})/(\d{1,2})", YearRule::RocEra, true),
        pattern(r"()(\d{1,2})\s*月\s*(\d{1,2})\s*[日號]", YearRule::Reference, true),
    ]
});

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\sT]*(?:\([^)]{1,3}\)|（[^）]{1,3}）)?\s*(上午|下午|晚上)?\s*(\d{1,2})[:：](\d{2})")
        .unwrap_or_else(|_| unreachable!())
});

fn digit_before(text: &str, idx: usize) -> bool {
    text[..idx].chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

fn digit_after(text: &str, idx: usize) -> bool {
    text[idx..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn time_after(text: &str) -> Option<(NaiveTime, usize)> {
    let caps = TIME_PATTERN.captures(text)?;
    let mut hour: u32 = caps.get(2)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(3)?.as_str().parse().ok()?;
    if matches!(caps.get(1).map(|m| m.as_str()), Some("下午" | "晚上")) && hour < 12 {
        hour += 12;
    }
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some((time, caps.get(0)?.end()))
}

/// Find every recognisable date in `text`
///
/// Matches never overlap; earlier patterns in the table win. A date written
/// the same way twice is reported once. Impossible dates (month 13, Feb 30)
/// are skipped. Results are ordered by position.
pub fn find_dates(text: &str, reference_year: i32) -> Vec<DateMatch> {
    let mut taken: Vec<(usize, usize)> = Vec::new();
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for pattern in PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (start, date_end) = (whole.start(), whole.end());

            if pattern.digit_bounded && (digit_before(text, start) || digit_after(text, date_end)) {
                continue;
            }
            if taken.iter().any(|&(s, e)| start < e && s < date_end) {
                continue;
            }

            let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok());
            let (Some(month), Some(day)) = (number(2), number(3)) else {
                continue;
            };
            let year = match pattern.year {
                YearRule::Gregorian => number(1),
                YearRule::RocEra => number(1).map(|y| y + ROC_YEAR_OFFSET),
                YearRule::Reference => Some(reference_year),
            };
            let Some(date) = year.and_then(|y| NaiveDate::from_ymd_opt(y, month as u32, day as u32))
            else {
                continue;
            };

            taken.push((start, date_end));
            let raw = whole.as_str().to_string();
            if !seen.insert(raw.clone()) {
                continue;
            }

            let (time, end) = match time_after(&text[date_end..]) {
                Some((time, len)) => (Some(time), date_end + len),
                None => (None, date_end),
            };

            found.push(DateMatch {
                start,
                end,
                raw,
                date,
                time,
            });
        }
    }

    found.sort_by_key(|m| m.start);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_gregorian_numeric_with_time() {
        let found = find_dates("報名截止 2025/07/01 23:59", 2025);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2025, 7, 1));
        assert_eq!(found[0].time, Some(hm(23, 59)));
        assert_eq!(found[0].raw, "2025/07/01");
    }

    #[test]
    fn test_dash_and_cjk_forms() {
        let found = find_dates("開始 2026-03-05，結束 2026年3月9日", 2025);
        let dates: Vec<_> = found.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![ymd(2026, 3, 5), ymd(2026, 3, 9)]);
    }

    #[test]
    fn test_roc_era_forms() {
        let found = find_dates("民國114年7月1日 與 114/08/02", 2025);
        let dates: Vec<_> = found.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![ymd(2025, 7, 1), ymd(2025, 8, 2)]);
    }

    #[test]
    fn test_roc_numeric_not_matched_inside_gregorian() {
        let found = find_dates("2025/07/01", 2025);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2025, 7, 1));
    }

    #[test]
    fn test_month_day_uses_reference_year() {
        let found = find_dates("講座在 12月3日 下午2:30 舉行", 2027);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2027, 12, 3));
        assert_eq!(found[0].time, Some(hm(14, 30)));
    }

    #[test]
    fn test_month_day_not_double_counted_inside_full_date() {
        let found = find_dates("2026年1月2日", 2025);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, ymd(2026, 1, 2));
    }

    #[test]
    fn test_identical_substrings_deduplicated() {
        let found = find_dates("2026/01/02 提醒，再次提醒 2026/01/02", 2025);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_invalid_dates_skipped() {
        assert!(find_dates("2026/13/40 與 2026/02/30", 2025).is_empty());
    }

    #[test]
    fn test_no_dates() {
        assert!(find_dates("版本 1.2.3，電話 0912-345-678", 2025).is_empty());
    }

    #[test]
    fn test_weekday_between_date_and_time() {
        let found = find_dates("2026/05/20（三）19:00", 2025);
        assert_eq!(found[0].time, Some(hm(19, 0)));
    }
}
