//! Video title to contest matching.
//!
//! Every platform owns an ordered list of rules. A rule inspects the video title and the
//! contests of that platform and answers with the id of the single contest it designates.
//! Zero or several candidates mean the rule has no answer.

use crate::models::Contest;
use once_cell::sync::Lazy;
use regex::Regex;

pub type MatchRule = fn(&str, &[&Contest]) -> Option<i64>;

static WEEKLY_CONTEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bweekly\s+contest\s+(\d+)").unwrap());
static ROUND_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bround\s+#?(\d+)").unwrap());

const LEETCODE_RULES: &[MatchRule] = &[weekly_contest];
const CODEFORCES_RULES: &[MatchRule] = &[round_number];
const DEFAULT_RULES: &[MatchRule] = &[title_contains_name];

pub fn rules_for(platform: &str) -> &'static [MatchRule] {
    match platform {
        "leetcode" => LEETCODE_RULES,
        "codeforces" => CODEFORCES_RULES,
        _ => DEFAULT_RULES,
    }
}

/// Find the contest of `platform` that the video `title` refers to.
pub fn match_contest<'a>(platform: &str, title: &str, contests: &'a [Contest]) -> Option<&'a Contest> {
    let candidates: Vec<&Contest> = contests
        .iter()
        .filter(|contest| contest.platform == platform)
        .collect();

    let id = rules_for(platform)
        .iter()
        .find_map(|rule| rule(title, &candidates))?;

    candidates.into_iter().find(|contest| contest.id == id)
}

/// `Weekly Contest 402` => contest names containing `weekly contest 402`.
pub fn weekly_contest(title: &str, contests: &[&Contest]) -> Option<i64> {
    let number = capture_number(&WEEKLY_CONTEST, title)?;
    let phrase = format!("weekly contest {}", number);

    single(
        contests
            .iter()
            .filter(|contest| contains_phrase(&normalize(&contest.name), &phrase)),
    )
}

/// `Round #950` or `Round 950` => contest names containing `round 950` (`#` ignored).
pub fn round_number(title: &str, contests: &[&Contest]) -> Option<i64> {
    let number = capture_number(&ROUND_NUMBER, title)?;
    let phrase = format!("round {}", number);

    single(
        contests
            .iter()
            .filter(|contest| contains_phrase(&normalize(&contest.name), &phrase)),
    )
}

/// The lowercased title contains the lowercased contest name.
pub fn title_contains_name(title: &str, contests: &[&Contest]) -> Option<i64> {
    let title = normalize(title);

    single(contests.iter().filter(|contest| {
        let name = normalize(&contest.name);
        !name.is_empty() && contains_phrase(&title, &name)
    }))
}

fn capture_number(pattern: &Regex, title: &str) -> Option<u64> {
    pattern
        .captures(title)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse::<u64>().ok())
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .replace('#', "")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Substring test that refuses to cut through a word on the left or a number on the right,
/// so `round 10` is not found in `round 100` and `weekly contest 1` not in `biweekly contest 1`.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(index, _)| {
        let left_ok = haystack[..index]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let right_ok = haystack[index + phrase.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_digit());
        left_ok && right_ok
    })
}

fn single<'a>(mut candidates: impl Iterator<Item = &'a &'a Contest>) -> Option<i64> {
    let first = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(first.id),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn contest(id: i64, platform: &str, name: &str) -> Contest {
        Contest {
            id,
            external_id: id * 100,
            name: String::from(name),
            platform: String::from(platform),
            start_time: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap(),
            url: String::new(),
            bookmarked: false,
        }
    }

    #[test]
    fn test_weekly_contest() {
        let contests = vec![
            contest(1, "leetcode", "Leetcode Weekly Contest 402"),
            contest(2, "leetcode", "Leetcode Weekly Contest 403"),
            contest(3, "leetcode", "Leetcode Biweekly Contest 402"),
        ];

        let matched = match_contest("leetcode", "Weekly Contest 402 Solution", &contests);
        assert_eq!(matched.map(|c| c.id), Some(1));

        let matched = match_contest("leetcode", "weekly contest 999 | all problems", &contests);
        assert!(matched.is_none());
    }

    #[test]
    fn test_weekly_contest_number_boundary() {
        let contests = vec![contest(1, "leetcode", "Weekly Contest 4020")];
        assert!(match_contest("leetcode", "Weekly Contest 402", &contests).is_none());
    }

    #[test]
    fn test_weekly_contest_word_boundary() {
        let contests = vec![
            contest(1, "leetcode", "Leetcode Weekly Contest 402"),
            contest(2, "leetcode", "Leetcode Biweekly Contest 402"),
        ];
        let matched = match_contest("leetcode", "Weekly Contest 402 Solution", &contests);
        assert_eq!(matched.map(|c| c.id), Some(1));

        let contests = vec![contest(2, "leetcode", "Leetcode Biweekly Contest 402")];
        assert!(match_contest("leetcode", "Weekly Contest 402 Solution", &contests).is_none());
    }

    #[test]
    fn test_round_number() {
        let contests = vec![
            contest(1, "codeforces", "Codeforces Round 950 (Div. 3)"),
            contest(2, "codeforces", "Codeforces Round #868 (Div. 2)"),
            contest(3, "codeforces", "Codeforces Round 95"),
        ];

        let matched = match_contest("codeforces", "Codeforces Round #950 | A-E", &contests);
        assert_eq!(matched.map(|c| c.id), Some(1));

        let matched = match_contest("codeforces", "Round 868 Div 2 solutions", &contests);
        assert_eq!(matched.map(|c| c.id), Some(2));
    }

    #[test]
    fn test_round_number_ambiguous() {
        let contests = vec![
            contest(1, "codeforces", "Codeforces Round 951 (Div. 1)"),
            contest(2, "codeforces", "Codeforces Round 951 (Div. 2)"),
        ];
        assert!(match_contest("codeforces", "Codeforces Round 951", &contests).is_none());
    }

    #[test]
    fn test_title_contains_name() {
        let contests = vec![
            contest(1, "codechef", "Starters 139"),
            contest(2, "codechef", "Starters 13"),
        ];

        let matched = match_contest("codechef", "CodeChef STARTERS 139 | Div 2", &contests);
        assert_eq!(matched.map(|c| c.id), Some(1));
    }

    #[test]
    fn test_no_fallback_across_platforms() {
        let contests = vec![contest(1, "codeforces", "Codeforces Round 950")];

        assert!(match_contest("leetcode", "Codeforces Round 950", &contests).is_none());
        assert!(match_contest("codechef", "Codeforces Round 950", &contests).is_none());
    }

    #[test]
    fn test_platform_rule_does_not_fall_back_to_substring() {
        let contests = vec![contest(1, "leetcode", "Leetcode Weekly Contest 402")];
        assert!(match_contest("leetcode", "Leetcode Weekly Contest 402 is out", &contests).is_some());
        assert!(match_contest("leetcode", "leetcode weekly contest", &contests).is_none());
    }
}
