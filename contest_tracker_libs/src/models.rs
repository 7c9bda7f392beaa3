use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A contest row as stored and served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    #[serde(rename = "_id")]
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub platform: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub url: String,
    pub bookmarked: bool,
}

/// The part of a contest owned by the contest source.
///
/// Synchronization writes only these fields, so `bookmarked` survives every upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestRecord {
    pub external_id: i64,
    pub name: String,
    pub platform: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookmarkState {
    #[serde(rename = "_id")]
    pub id: i64,
    pub bookmarked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SolutionLink {
    #[serde(rename = "_id")]
    pub id: i64,
    pub contest_id: i64,
    pub platform: String,
    pub youtube_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSolutionLink {
    pub contest_id: i64,
    pub platform: String,
    pub youtube_link: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serialize_contest() {
        let contest = Contest {
            id: 7,
            external_id: 55123,
            name: String::from("Codeforces Round 950 (Div. 3)"),
            platform: String::from("codeforces"),
            start_time: Utc.with_ymd_and_hms(2024, 6, 3, 14, 35, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 3, 16, 50, 0).unwrap(),
            url: String::from("https://codeforces.com/contests/1980"),
            bookmarked: true,
        };

        let value = serde_json::to_value(&contest).unwrap();
        assert_eq!(value["_id"], 7);
        assert_eq!(value["externalId"], 55123);
        assert_eq!(value["startTime"], "2024-06-03T14:35:00Z");
        assert_eq!(value["bookmarked"], true);
    }

    #[test]
    fn test_deserialize_new_solution_link() {
        let raw = r#"{"contestId": 3, "platform": "leetcode", "youtubeLink": "https://www.youtube.com/watch?v=abc"}"#;
        let link: NewSolutionLink = serde_json::from_str(raw).unwrap();

        assert_eq!(link.contest_id, 3);
        assert_eq!(link.youtube_link, "https://www.youtube.com/watch?v=abc");
    }
}
