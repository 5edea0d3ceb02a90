use serde::{Deserialize, Serialize};

use crate::core::html_text;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Open,
    #[serde(alias = "bijna_vol")]
    NearlyFull,
    #[serde(alias = "vol")]
    Full,
}

impl CourseStatus {
    /// Lenient parse of a CMS status; anything unknown is `Open`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "full" | "vol" => CourseStatus::Full,
            "nearly_full" | "bijna_vol" => CourseStatus::NearlyFull,
            _ => CourseStatus::Open,
        }
    }

    /// Badge label shown next to a course.
    pub fn label(&self) -> &'static str {
        match self {
            CourseStatus::Open => "Beschikbaar",
            CourseStatus::NearlyFull => "Bijna vol",
            CourseStatus::Full => "Vol",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub current_participants: Option<u32>,
    pub start_date: String,
    pub location: String,
    pub price: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub subsidy_amount: Option<String>,
}

impl Course {
    /// Free places, `None` when the maximum is unknown.
    pub fn availability(&self) -> Option<u32> {
        let max = self.max_participants.filter(|max| *max > 0)?;
        Some(max.saturating_sub(self.current_participants.unwrap_or(0)))
    }

    pub fn availability_text(&self) -> String {
        match self.availability() {
            None => String::new(),
            Some(0) => "Geen plaatsen beschikbaar".to_string(),
            Some(1) => "Nog 1 plaats beschikbaar".to_string(),
            Some(n) if n <= 3 => format!("Nog {} plaatsen beschikbaar", n),
            Some(n) => format!("{} plaatsen beschikbaar", n),
        }
    }

    /// Plain-text preview of the description.
    pub fn excerpt(&self, max_chars: usize) -> String {
        html_text::excerpt(&self.description, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(max: Option<u32>, current: Option<u32>) -> Course {
        Course {
            id: 1,
            slug: "excel".into(),
            title: "Excel".into(),
            description: "<p>Leer <strong>Excel</strong> in één dag.</p>".into(),
            image: String::new(),
            category: "Algemeen".into(),
            status: CourseStatus::Open,
            max_participants: max,
            current_participants: current,
            start_date: "Nader te bepalen".into(),
            location: "Online".into(),
            price: "Op aanvraag".into(),
            time: None,
            duration: None,
            subsidy_amount: None,
        }
    }

    #[test]
    fn availability_texts() {
        assert_eq!(course(None, Some(3)).availability_text(), "");
        assert_eq!(course(Some(10), Some(12)).availability_text(), "Geen plaatsen beschikbaar");
        assert_eq!(course(Some(10), Some(9)).availability_text(), "Nog 1 plaats beschikbaar");
        assert_eq!(course(Some(10), Some(7)).availability_text(), "Nog 3 plaatsen beschikbaar");
        assert_eq!(course(Some(10), None).availability_text(), "10 plaatsen beschikbaar");
    }

    #[test]
    fn status_accepts_dutch_values() {
        let status: CourseStatus = serde_json::from_str("\"bijna_vol\"").unwrap();
        assert_eq!(status, CourseStatus::NearlyFull);
        assert_eq!(CourseStatus::parse("VOL"), CourseStatus::Full);
        assert_eq!(CourseStatus::parse("gesloten"), CourseStatus::Open);
        assert_eq!(serde_json::to_string(&CourseStatus::NearlyFull).unwrap(), "\"nearly_full\"");
    }

    #[test]
    fn status_labels() {
        assert_eq!(CourseStatus::Open.label(), "Beschikbaar");
        assert_eq!(CourseStatus::NearlyFull.label(), "Bijna vol");
        assert_eq!(CourseStatus::Full.label(), "Vol");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(course(Some(10), Some(2))).unwrap();
        assert_eq!(json["maxParticipants"], 10);
        assert_eq!(json["startDate"], "Nader te bepalen");
        assert!(json.get("subsidyAmount").is_some());
    }

    #[test]
    fn excerpt_strips_markup() {
        assert_eq!(course(None, None).excerpt(10), "Leer Excel...");
    }
}
