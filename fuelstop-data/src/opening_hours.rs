//! Parser for the common subset of the OSM `opening_hours` tag.
//!
//! Supported syntax:
//! - `24/7`
//! - rules separated by `;`, later rules replacing the days they name
//! - day selectors such as `Mo`, `Mo-Fr`, `Fr-Mo` (wrapping) and `Mo,We,Fr`
//! - comma separated time ranges `HH:MM-HH:MM`, with closing times up to
//!   `47:59` for intervals that run past midnight
//! - `off` / `closed`
//!
//! Rules that only name public or school holidays (`PH`, `SH`) are skipped,
//! since a weekly schedule cannot express them.

use chrono::{NaiveTime, Weekday};
use fuelstop_core::{ALL_WEEKDAYS, OpenInterval, WeeklySchedule};
use thiserror::Error;

const HOLIDAY_SELECTORS: [&str; 2] = ["PH", "SH"];
const DAY_ABBREVIATIONS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Errors returned by [`parse_opening_hours`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpeningHoursError {
    /// The tag held no rules.
    #[error("opening hours are empty")]
    Empty,
    /// A day selector named something other than a weekday.
    #[error("unknown weekday `{token}`")]
    UnknownDay {
        /// The offending selector item.
        token: String,
    },
    /// A time was not `HH:MM` or was out of range.
    #[error("invalid time `{token}`")]
    InvalidTime {
        /// The offending time.
        token: String,
    },
    /// A time range lacked its `-` separator.
    #[error("invalid time range `{token}`")]
    InvalidRange {
        /// The offending range.
        token: String,
    },
}

/// Parse an OSM `opening_hours` value into a weekly schedule.
///
/// # Errors
///
/// Returns [`OpeningHoursError`] when the value is empty or uses syntax
/// outside the supported subset.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use fuelstop_data::parse_opening_hours;
///
/// let schedule = parse_opening_hours("Mo-Fr 06:00-22:00; Sa 08:00-20:00; Su off")?;
/// assert_eq!(schedule.hours_on(Weekday::Tue).len(), 1);
/// assert!(schedule.hours_on(Weekday::Sun).is_empty());
///
/// let saturday_evening = NaiveDate::from_ymd_opt(2024, 5, 11)
///     .and_then(|d| d.and_hms_opt(19, 30, 0))
///     .ok_or("bad timestamp")?;
/// assert!(schedule.is_open_at(saturday_evening));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_opening_hours(value: &str) -> Result<WeeklySchedule, OpeningHoursError> {
    let rules: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .collect();
    if rules.is_empty() {
        return Err(OpeningHoursError::Empty);
    }

    let mut schedule = WeeklySchedule::new();
    for rule in rules {
        if let Some((days, intervals)) = parse_rule(rule)? {
            for day in days {
                schedule.set_day(day, intervals.clone());
            }
        }
    }
    Ok(schedule)
}

type Rule = (Vec<Weekday>, Vec<OpenInterval>);

/// `None` for rules that apply only to holidays.
fn parse_rule(rule: &str) -> Result<Option<Rule>, OpeningHoursError> {
    let tokens: Vec<&str> = rule.split_whitespace().collect();
    let selector_len = tokens
        .iter()
        .take_while(|token| looks_like_day_selector(token))
        .count();
    let (selector_tokens, time_tokens) = tokens
        .split_at_checked(selector_len)
        .unwrap_or((tokens.as_slice(), &[]));

    let days = if selector_tokens.is_empty() {
        Some(ALL_WEEKDAYS.to_vec())
    } else {
        parse_days(&selector_tokens.concat())?
    };
    let Some(selected) = days else {
        return Ok(None);
    };
    let intervals = parse_times(&time_tokens.join(" "))?;
    Ok(Some((selected, intervals)))
}

fn looks_like_day_selector(token: &str) -> bool {
    let items = token.trim_matches(',');
    !items.is_empty()
        && items.split(',').all(|item| {
            item.get(..2).is_some_and(|prefix| {
                DAY_ABBREVIATIONS.contains(&prefix) || HOLIDAY_SELECTORS.contains(&prefix)
            })
        })
}

/// `None` when the selector names holidays only.
fn parse_days(selector: &str) -> Result<Option<Vec<Weekday>>, OpeningHoursError> {
    let mut days = Vec::new();
    let mut names_weekday = false;
    for item in selector.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if HOLIDAY_SELECTORS.contains(&item) {
            continue;
        }
        names_weekday = true;
        match item.split_once('-') {
            Some((from, to)) => days.extend(day_span(parse_day(from)?, parse_day(to)?)),
            None => days.push(parse_day(item)?),
        }
    }
    Ok(names_weekday.then_some(days))
}

fn parse_day(token: &str) -> Result<Weekday, OpeningHoursError> {
    match token {
        "Mo" => Ok(Weekday::Mon),
        "Tu" => Ok(Weekday::Tue),
        "We" => Ok(Weekday::Wed),
        "Th" => Ok(Weekday::Thu),
        "Fr" => Ok(Weekday::Fri),
        "Sa" => Ok(Weekday::Sat),
        "Su" => Ok(Weekday::Sun),
        _ => Err(OpeningHoursError::UnknownDay {
            token: token.to_owned(),
        }),
    }
}

/// Inclusive span of weekdays, wrapping past Sunday.
fn day_span(from: Weekday, to: Weekday) -> Vec<Weekday> {
    let mut days = vec![from];
    let mut current = from;
    while current != to {
        current = current.succ();
        days.push(current);
    }
    days
}

fn parse_times(times: &str) -> Result<Vec<OpenInterval>, OpeningHoursError> {
    match times {
        "" | "24/7" => Ok(vec![OpenInterval::all_day()]),
        "off" | "closed" => Ok(Vec::new()),
        _ => times
            .split(',')
            .map(str::trim)
            .filter(|range| !range.is_empty())
            .map(parse_range)
            .collect(),
    }
}

fn parse_range(range: &str) -> Result<OpenInterval, OpeningHoursError> {
    let (opens, closes) = range
        .split_once('-')
        .ok_or_else(|| OpeningHoursError::InvalidRange {
            token: range.to_owned(),
        })?;
    Ok(OpenInterval::new(
        parse_clock(opens.trim(), false)?,
        parse_clock(closes.trim(), true)?,
    ))
}

/// Closing times from `24:00` onward fold back onto the next day's clock.
fn parse_clock(token: &str, closing: bool) -> Result<NaiveTime, OpeningHoursError> {
    let invalid = || OpeningHoursError::InvalidTime {
        token: token.to_owned(),
    };
    let (hours, minutes) = token.split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    let clock_hour = match hour.checked_sub(24) {
        Some(folded) if closing && folded < 24 => folded,
        _ => hour,
    };
    NaiveTime::from_hms_opt(clock_hour, minute, 0).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rstest::rstest;

    fn clock(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    fn interval(opens: (u32, u32), closes: (u32, u32)) -> OpenInterval {
        OpenInterval::new(clock(opens.0, opens.1), clock(closes.0, closes.1))
    }

    /// 6 May 2024 is a Monday.
    fn may_2024(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[rstest]
    fn around_the_clock() {
        let schedule = parse_opening_hours("24/7").expect("should parse");
        assert_eq!(schedule, WeeklySchedule::always_open());
    }

    #[rstest]
    fn weekday_and_saturday_rules() {
        let schedule =
            parse_opening_hours("Mo-Fr 08:00-20:00; Sa 09:00-14:00").expect("should parse");

        for day in [Weekday::Mon, Weekday::Wed, Weekday::Fri] {
            assert_eq!(schedule.hours_on(day), [interval((8, 0), (20, 0))]);
        }
        assert_eq!(schedule.hours_on(Weekday::Sat), [interval((9, 0), (14, 0))]);
        assert!(schedule.hours_on(Weekday::Sun).is_empty());
    }

    #[rstest]
    fn sunday_lands_in_its_own_slot() {
        let schedule = parse_opening_hours("Su 10:00-16:00").expect("should parse");

        assert_eq!(schedule.hours_on(Weekday::Sun), [interval((10, 0), (16, 0))]);
        assert!(schedule.is_open_at(may_2024(12, 11, 0)));
        assert!(!schedule.is_open_at(may_2024(13, 11, 0)));
    }

    #[rstest]
    fn later_rules_override_named_days() {
        let schedule = parse_opening_hours("Mo-Su 06:00-22:00; Su off").expect("should parse");

        assert!(schedule.hours_on(Weekday::Sun).is_empty());
        assert_eq!(schedule.hours_on(Weekday::Sat), [interval((6, 0), (22, 0))]);
    }

    #[rstest]
    fn day_ranges_wrap_past_sunday() {
        let schedule = parse_opening_hours("Fr-Mo 10:00-12:00").expect("should parse");

        for day in [Weekday::Fri, Weekday::Sat, Weekday::Sun, Weekday::Mon] {
            assert_eq!(schedule.hours_on(day).len(), 1, "{day} should be open");
        }
        for day in [Weekday::Tue, Weekday::Wed, Weekday::Thu] {
            assert!(schedule.hours_on(day).is_empty(), "{day} should be closed");
        }
    }

    #[rstest]
    fn day_lists_and_split_shifts() {
        let schedule =
            parse_opening_hours("Mo,We, Fr 07:00-09:00, 17:00-19:00").expect("should parse");

        assert_eq!(
            schedule.hours_on(Weekday::Fri),
            [interval((7, 0), (9, 0)), interval((17, 0), (19, 0))]
        );
        assert!(schedule.hours_on(Weekday::Tue).is_empty());
        assert_eq!(schedule.hours_on(Weekday::Wed).len(), 2);
    }

    #[rstest]
    fn bare_time_range_applies_to_every_day() {
        let schedule = parse_opening_hours("06:00-22:00").expect("should parse");

        assert!(schedule.is_open_at(may_2024(5, 21, 59)));
        assert!(!schedule.is_open_at(may_2024(8, 22, 0)));
    }

    #[rstest]
    #[case("Mo-Fr 22:00-06:00")]
    #[case("Mo-Fr 22:00-30:00")]
    fn overnight_intervals_spill_into_the_next_day(#[case] value: &str) {
        let schedule = parse_opening_hours(value).expect("should parse");

        assert!(schedule.is_open_at(may_2024(7, 3, 0)));
        assert!(!schedule.is_open_at(may_2024(7, 7, 0)));
    }

    #[rstest]
    fn midnight_to_midnight_is_all_day() {
        let schedule = parse_opening_hours("Mo-Sa 00:00-24:00").expect("should parse");

        assert_eq!(schedule.hours_on(Weekday::Tue), [OpenInterval::all_day()]);
        assert!(schedule.hours_on(Weekday::Sun).is_empty());
    }

    #[rstest]
    fn day_selector_without_times_is_all_day() {
        let schedule = parse_opening_hours("Mo-Fr").expect("should parse");

        assert_eq!(schedule.hours_on(Weekday::Mon), [OpenInterval::all_day()]);
        assert!(schedule.hours_on(Weekday::Sat).is_empty());
    }

    #[rstest]
    #[case("Mo-Fr 08:00-18:00; PH off")]
    #[case("Mo-Fr 08:00-18:00; PH,SH 10:00-12:00")]
    fn holiday_only_rules_are_skipped(#[case] value: &str) {
        let schedule = parse_opening_hours(value).expect("should parse");

        assert_eq!(schedule.hours_on(Weekday::Mon), [interval((8, 0), (18, 0))]);
        assert!(schedule.hours_on(Weekday::Sat).is_empty());
    }

    #[rstest]
    fn closed_everywhere_is_an_empty_schedule() {
        let schedule = parse_opening_hours("off").expect("should parse");
        assert!(schedule.is_empty());
    }

    #[rstest]
    #[case("", OpeningHoursError::Empty)]
    #[case(" ; ", OpeningHoursError::Empty)]
    #[case("Mo-Fx 08:00-12:00", OpeningHoursError::UnknownDay { token: "Fx".to_owned() })]
    #[case("Mo 25:00-26:00", OpeningHoursError::InvalidTime { token: "25:00".to_owned() })]
    #[case("Mo 08:00", OpeningHoursError::InvalidRange { token: "08:00".to_owned() })]
    #[case("Mo 18:00+", OpeningHoursError::InvalidRange { token: "18:00+".to_owned() })]
    #[case("sunrise-sunset", OpeningHoursError::InvalidTime { token: "sunrise".to_owned() })]
    #[case("Mo 8-12", OpeningHoursError::InvalidTime { token: "8".to_owned() })]
    fn rejects_unsupported_syntax(#[case] value: &str, #[case] expected: OpeningHoursError) {
        assert_eq!(parse_opening_hours(value), Err(expected));
    }
}
