use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSolutionLinkRequest {
    pub youtube_link: String,
}

/// `?title=` of the contest search. A missing title matches every contest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContestsParameter {
    pub title: Option<String>,
}
