use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success: bool,
    pub courses_count: usize,
    pub message: String,
}

impl SyncReport {
    pub fn from_count(courses_count: usize) -> Self {
        if courses_count == 0 {
            return SyncReport::failure("Kon geen cursussen synchroniseren van WordPress endpoints");
        }
        SyncReport {
            success: true,
            courses_count,
            message: format!(
                "Succesvol {} cursussen gesynchroniseerd van WordPress",
                courses_count
            ),
        }
    }

    pub fn failure(message: &str) -> Self {
        SyncReport {
            success: false,
            courses_count: 0,
            message: message.to_string(),
        }
    }
}
