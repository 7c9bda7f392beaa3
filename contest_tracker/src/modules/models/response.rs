use contest_tracker_libs::models::{Contest, SolutionLink};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestsResponse {
    pub contests: Vec<Contest>,
    pub solution_links: Vec<SolutionLink>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn not_found(message: impl ToString) -> Self {
        Self {
            error: message.to_string(),
            details: None,
        }
    }

    pub fn internal(details: impl ToString) -> Self {
        Self {
            error: String::from("Internal server error"),
            details: Some(details.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
