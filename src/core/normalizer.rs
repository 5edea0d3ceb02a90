//! Raw CMS course rows to [`Course`].
//!
//! Every field has its own resolver and its own default, so a row with
//! missing or odd values still becomes a complete course.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::{
    DATE_TO_BE_DETERMINED, DEFAULT_CATEGORY, DEFAULT_LOCATION, NEARLY_FULL_RATIO,
    PLACEHOLDER_IMAGE, PRICE_ON_REQUEST,
};
use crate::core::dates;
use crate::model::course::{Course, CourseStatus};
use crate::model::raw_course::{FallbackRawCourse, PrimaryRawCourse, RawCourse, Record, value_text};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").unwrap());

pub fn normalize(raw: &RawCourse) -> Course {
    match raw {
        RawCourse::Primary(primary) => normalize_primary(primary),
        RawCourse::Fallback(fallback) => normalize_fallback(fallback),
    }
}

/// Id-keyed lookup table built from a detail endpoint's rows.
pub fn index_by_id(rows: &[Value]) -> HashMap<u64, Record> {
    rows.iter()
        .filter_map(|row| Record::from_value(row.clone()))
        .filter_map(|record| Some((record.id("id").or_else(|| record.id("ID"))?, record)))
        .collect()
}

/// Joins reservation rows with their course and location rows.
pub fn join_primary(
    reservations: &[Value],
    details: &HashMap<u64, Record>,
    locations: &HashMap<u64, Record>,
) -> Vec<RawCourse> {
    reservations
        .iter()
        .filter_map(|row| Record::from_value(row.clone()))
        .map(|reservation| {
            let detail = reservation.id("course_id").and_then(|id| details.get(&id)).cloned();
            let location = reservation
                .id("location_id")
                .and_then(|id| locations.get(&id))
                .cloned();
            RawCourse::Primary(PrimaryRawCourse {
                reservation,
                detail,
                location,
            })
        })
        .collect()
}

pub fn fallback_rows(rows: &[Value]) -> Vec<RawCourse> {
    rows.iter()
        .filter_map(|row| Record::from_value(row.clone()))
        .map(|record| RawCourse::Fallback(FallbackRawCourse(record)))
        .collect()
}

/// Normalizes a batch and makes the slugs unique within it.
pub fn normalize_all(rows: &[RawCourse]) -> Vec<Course> {
    let mut courses: Vec<Course> = rows.iter().map(normalize).collect();
    dedupe_slugs(&mut courses);
    courses
}

fn dedupe_slugs(courses: &mut [Course]) {
    let mut taken: HashSet<String> = HashSet::new();
    for course in courses.iter_mut() {
        if taken.insert(course.slug.clone()) {
            continue;
        }
        let mut n = 2;
        while taken.contains(&format!("{}-{}", course.slug, n)) {
            n += 1;
        }
        course.slug = format!("{}-{}", course.slug, n);
        taken.insert(course.slug.clone());
    }
}

fn normalize_primary(raw: &PrimaryRawCourse) -> Course {
    let reservation = &raw.reservation;
    let detail = raw.detail.clone().unwrap_or_default();
    let id = reservation.id("id").unwrap_or(0);
    let title = detail
        .rendered("title")
        .or_else(|| detail.text("name"))
        .unwrap_or_default();
    let maximum = reservation.number("maximum_count");
    let reserved = reservation.number("reserved_count");

    Course {
        id,
        slug: detail
            .text("link")
            .and_then(|link| slug_from_link(&link))
            .or_else(|| detail.text("slug"))
            .unwrap_or_else(|| slugify(&title, id)),
        description: detail
            .rendered("content")
            .or_else(|| detail.text("description"))
            .unwrap_or_default(),
        image: detail
            .first_text(&["featured_image_url", "image"])
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        category: detail
            .text("category")
            .or_else(|| reservation.text("category"))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        status: derive_status(reserved, maximum),
        max_participants: maximum.and_then(to_count),
        current_participants: Some(reserved.and_then(to_count).unwrap_or(0)),
        start_date: display_date(reservation.text("start_date")),
        location: raw
            .location
            .as_ref()
            .and_then(|location| location.text("name").or_else(|| location.rendered("title")))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        price: reservation
            .number("price")
            .map(format_euro)
            .unwrap_or_else(|| PRICE_ON_REQUEST.to_string()),
        time: time_range(
            reservation.text("start_time").as_deref(),
            reservation.text("end_time").as_deref(),
        ),
        duration: reservation.text("duration"),
        subsidy_amount: reservation.number("soob_subsidie").map(format_euro),
        title,
    }
}

fn normalize_fallback(raw: &FallbackRawCourse) -> Course {
    let row = &raw.0;
    let id = row.id("id").or_else(|| row.id("ID")).unwrap_or(0);
    let title = row
        .rendered("title")
        .or_else(|| row.first_text(&["naam", "post_title"]))
        .unwrap_or_default();

    Course {
        id,
        slug: row
            .first_text(&["slug", "post_name"])
            .unwrap_or_else(|| slugify(&title, id)),
        description: row
            .get("content")
            .and_then(|content| content.get("rendered"))
            .and_then(value_text)
            .or_else(|| row.first_text(&["description", "post_content", "beschrijving"]))
            .unwrap_or_default(),
        image: row
            .first_text(&["featured_image_url", "image", "thumbnail", "afbeelding"])
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        category: row
            .text("category")
            .or_else(|| first_category_name(row))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        status: row
            .text("status")
            .map(|status| CourseStatus::parse(&status))
            .unwrap_or_default(),
        max_participants: row
            .first_number(&["max_participants", "maxParticipants", "maximum_deelnemers"])
            .and_then(to_count),
        current_participants: Some(
            row.first_number(&[
                "current_participants",
                "currentParticipants",
                "huidige_deelnemers",
            ])
            .and_then(to_count)
            .unwrap_or(0),
        ),
        time: row.first_text(&["tijd", "time", "aanvangstijd", "starttijd"]),
        duration: row.first_text(&["duration", "duur", "tijdsduur"]),
        start_date: row
            .first_text(&["start_date", "startDate", "datum", "startdatum"])
            .unwrap_or_else(|| DATE_TO_BE_DETERMINED.to_string()),
        location: row
            .first(&["location", "locatie", "plaats", "vestiging"])
            .and_then(location_name)
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
        price: row
            .first(&["price", "prijs", "kosten", "tarief"])
            .and_then(display_amount)
            .unwrap_or_else(|| PRICE_ON_REQUEST.to_string()),
        subsidy_amount: row
            .first(&["soob_subsidie", "soobSubsidie", "soob", "subsidie"])
            .and_then(display_amount),
        title,
    }
}

fn first_category_name(row: &Record) -> Option<String> {
    row.get("categories")?
        .as_array()?
        .first()?
        .get("name")
        .and_then(value_text)
}

fn location_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map.get("name").and_then(value_text),
        other => value_text(other),
    }
}

/// Numbers (or numeric strings) become euro amounts, other text is kept.
fn display_amount(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => number.as_f64().map(format_euro),
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(amount) if amount.is_finite() => Some(format_euro(amount)),
            _ => value_text(value),
        },
        _ => None,
    }
}

fn to_count(number: f64) -> Option<u32> {
    (number.is_finite() && number >= 0.0).then(|| number.round() as u32)
}

fn display_date(text: Option<String>) -> String {
    match text {
        Some(text) => dates::parse_date(&text)
            .map(dates::format_date)
            .unwrap_or(text),
        None => DATE_TO_BE_DETERMINED.to_string(),
    }
}

/// `full` at or over the maximum, `nearly_full` from 80% of it.
pub fn derive_status(reserved: Option<f64>, maximum: Option<f64>) -> CourseStatus {
    let (Some(reserved), Some(maximum)) = (reserved, maximum) else {
        return CourseStatus::Open;
    };
    if maximum <= 0.0 {
        return CourseStatus::Open;
    }
    if reserved >= maximum {
        CourseStatus::Full
    } else if reserved >= maximum * NEARLY_FULL_RATIO {
        CourseStatus::NearlyFull
    } else {
        CourseStatus::Open
    }
}

/// `"09:00:00"`, `"12:30"` becomes `"09:00 - 12:30"`.
pub fn time_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = clock(start?)?;
    let end = clock(end?)?;
    Some(format!("{} - {}", start, end))
}

fn clock(text: &str) -> Option<String> {
    let mut parts = text.trim().split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next().map_or(Some(0), |m| m.trim().parse().ok())?;
    Some(format!("{:02}:{:02}", hours, minutes))
}

/// `1234.5` becomes `"€1.234,50"`.
pub fn format_euro(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}€{},{:02}", sign, grouped, cents % 100)
}

/// Path of a permalink without host and surrounding slashes.
pub fn slug_from_link(link: &str) -> Option<String> {
    let path = match url::Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.to_string(),
    };
    let slug = path.trim_matches('/');
    (!slug.is_empty()).then(|| slug.to_string())
}

/// URL-safe slug from a title, `course-<id>` when nothing is left.
pub fn slugify(title: &str, id: u64) -> String {
    let slug = title.to_lowercase();
    let slug = WHITESPACE.replace_all(&slug, "-");
    let slug = slug.replace('&', "-and-");
    let slug = NON_WORD.replace_all(&slug, "");
    let slug = HYPHENS.replace_all(&slug, "-");
    if slug.is_empty() || slug == "-" {
        format!("course-{}", id)
    } else {
        slug.into_owned()
    }
}
