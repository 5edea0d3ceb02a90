//! Course start dates.
//!
//! The CMS stores start dates as free text. The three numeric layouts it
//! uses are taken apart component by component so `05-04-2025` is always
//! the fifth of April; anything else goes through a generic parse.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::config::{DATE_FLEXIBLE, DATE_TO_BE_DETERMINED, UPCOMING_LIMIT};
use crate::model::course::Course;

static DAY_FIRST_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})-(\d{2})-(\d{4})$").unwrap());
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static DAY_FIRST_SLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{4})$").unwrap());

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text == DATE_TO_BE_DETERMINED || text == DATE_FLEXIBLE {
        return None;
    }

    if let Some(caps) = DAY_FIRST_DASH
        .captures(text)
        .or_else(|| DAY_FIRST_SLASH.captures(text))
    {
        return from_parts(&caps[3], &caps[2], &caps[1]);
    }
    if let Some(caps) = ISO_DATE.captures(text) {
        return from_parts(&caps[1], &caps[2], &caps[3]);
    }

    parse_generic(text)
}

fn from_parts(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn parse_generic(text: &str) -> Option<NaiveDate> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Some(date_time.date_naive());
    }
    if let Ok(date_time) = DateTime::parse_from_rfc2822(text) {
        return Some(date_time.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(date_time.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y/%m/%d").ok()
}

/// Display form used for start dates the normalizer could parse.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Earliest first; undated courses last, by title.
pub fn compare_by_start(a: &Course, b: &Course) -> Ordering {
    match (parse_date(&a.start_date), parse_date(&b.start_date)) {
        (Some(a_date), Some(b_date)) => a_date.cmp(&b_date),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    }
}

pub fn sort_by_start(courses: &mut [Course]) {
    courses.sort_by(compare_by_start);
}

/// Courses starting `today` or later (undated ones included), sorted,
/// capped at [`UPCOMING_LIMIT`].
pub fn upcoming(courses: Vec<Course>, today: NaiveDate) -> Vec<Course> {
    let mut upcoming: Vec<Course> = courses
        .into_iter()
        .filter(|course| parse_date(&course.start_date).is_none_or(|date| date >= today))
        .collect();
    sort_by_start(&mut upcoming);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::course::CourseStatus;
    use chrono::Datelike;

    fn course(title: &str, start_date: &str) -> Course {
        Course {
            id: 0,
            slug: title.to_lowercase(),
            title: title.to_string(),
            description: String::new(),
            image: String::new(),
            category: "Algemeen".into(),
            status: CourseStatus::Open,
            max_participants: None,
            current_participants: None,
            start_date: start_date.to_string(),
            location: "Online".into(),
            price: "Op aanvraag".into(),
            time: None,
            duration: None,
            subsidy_amount: None,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn numeric_layouts_keep_day_and_month_apart() {
        let date = parse_date("25-12-2024").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 12, 25));
        assert_eq!(parse_date("05-04-2025"), Some(ymd(2025, 4, 5)));
        assert_eq!(parse_date("2025-04-05"), Some(ymd(2025, 4, 5)));
        assert_eq!(parse_date("05/04/2025"), Some(ymd(2025, 4, 5)));
    }

    #[test]
    fn sentinels_and_blank_are_undated() {
        assert_eq!(parse_date("Nader te bepalen"), None);
        assert_eq!(parse_date("Flexibel"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("binnenkort"), None);
    }

    #[test]
    fn impossible_dates_are_undated() {
        assert_eq!(parse_date("31-02-2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn generic_formats_fall_through() {
        assert_eq!(parse_date("2025-03-01T09:30:00"), Some(ymd(2025, 3, 1)));
        assert_eq!(parse_date("2025-03-01T09:30:00+01:00"), Some(ymd(2025, 3, 1)));
        assert_eq!(parse_date("2025-03-01 09:30:00"), Some(ymd(2025, 3, 1)));
        assert_eq!(parse_date("Sat, 01 Mar 2025 09:30:00 +0100"), Some(ymd(2025, 3, 1)));
    }

    #[test]
    fn undated_courses_sort_last_by_title() {
        let mut courses = vec![
            course("Word", "Flexibel"),
            course("Excel", "10-03-2025"),
            course("Access", "Nader te bepalen"),
            course("Outlook", "2025-01-15"),
        ];
        sort_by_start(&mut courses);
        let titles: Vec<_> = courses.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Outlook", "Excel", "Access", "Word"]);
    }

    #[test]
    fn upcoming_drops_past_and_caps_at_five() {
        let today = ymd(2025, 3, 10);
        let courses = vec![
            course("Gisteren", "09-03-2025"),
            course("Vandaag", "10-03-2025"),
            course("Later", "2025-06-01"),
            course("Flex", "Flexibel"),
            course("A", "2025-04-01"),
            course("B", "2025-05-01"),
            course("C", "2025-07-01"),
        ];
        let titles: Vec<_> = upcoming(courses, today)
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, ["Vandaag", "A", "B", "Later", "C"]);
    }
}
