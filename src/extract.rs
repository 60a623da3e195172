use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::config::Config;
use crate::error::ConfigError;
use crate::models::{MessageUnit, Record};

/// Turns raw messages into candidate records.
///
/// Each heuristic is a standalone step returning an optional value; none of them fail.
pub struct Extractor {
    link_pattern: Regex,
    budget_marker: String,
    source: String,
}

impl Extractor {
    pub fn new(link_pattern: &str, budget_marker: &str, source: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            link_pattern: Regex::new(link_pattern)?,
            budget_marker: budget_marker.to_string(),
            source: source.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.link_pattern, &config.budget_marker, &config.source)
    }

    /// Returns `None` for an empty message.
    pub fn extract(&self, message: &MessageUnit) -> Option<Record> {
        let title = extract_title(&message.text)?;

        Some(Record {
            title,
            description: message.text.clone(),
            budget: extract_budget(&message.text, &self.budget_marker),
            skills: extract_skills(&message.emphasized),
            link: extract_link(&message.links, &self.link_pattern),
            date: message.datetime.as_deref().and_then(parse_timestamp),
            source: self.source.clone(),
        })
    }
}

fn extract_title(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Wire format is RFC 3339, e.g. `2024-01-15T22:48:59+00:00`.
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// First link in document order that looks like a job-board posting.
/// Profile links and anything else are ignored.
fn extract_link(links: &[String], pattern: &Regex) -> Option<String> {
    links
        .iter()
        .map(|href| href.trim())
        .find(|href| !href.is_empty() && pattern.is_match(href))
        .map(str::to_string)
}

/// Last line carrying the marker wins, even when nothing is left after stripping it.
fn extract_budget(text: &str, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }

    let mut budget = None;
    for line in text.lines().filter(|line| line.contains(marker)) {
        budget = budget_from_line(line, marker);
    }
    budget
}

fn budget_from_line(line: &str, marker: &str) -> Option<String> {
    let (before, after) = line.split_once(marker)?;

    // "Need API work 💰$500" -> "$500"; "$500 💰" -> "$500"
    let after = after.replace(marker, "");
    let value = if after.trim().is_empty() { before } else { after.as_str() };
    let value = value.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Comma-separated emphasized spans are skill lists; single emphasized words are not.
fn extract_skills(spans: &[String]) -> Vec<String> {
    spans
        .iter()
        .filter(|span| span.contains(','))
        .flat_map(|span| span.split(','))
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn extractor() -> Extractor {
        Extractor::new(r"freelancer\.com/projects/", "💰", "test-feed").unwrap()
    }

    fn message(text: &str) -> MessageUnit {
        MessageUnit {
            text: text.to_string(),
            ..MessageUnit::default()
        }
    }

    #[test]
    fn test_title_is_first_non_empty_line() {
        assert_eq!(extract_title("\n   \n  Backend Dev  \nmore"), Some("Backend Dev".to_string()));
        assert_eq!(extract_title("Single"), Some("Single".to_string()));
        assert_eq!(extract_title(""), None);
        assert_eq!(extract_title(" \n\t\n"), None);
    }

    #[test]
    fn test_empty_message_yields_no_candidate() {
        assert!(extractor().extract(&message("")).is_none());
        assert!(extractor().extract(&message("   \n ")).is_none());
    }

    #[test]
    fn test_timestamp_parsing() {
        let parsed = parse_timestamp("2024-01-15T22:48:59+00:00").unwrap();
        assert_eq!(parsed.hour(), 22);
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_unparseable_timestamp_leaves_date_unset() {
        let mut msg = message("Title");
        msg.datetime = Some("15/01/2024".to_string());
        let record = extractor().extract(&msg).unwrap();
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_first_matching_link_wins() {
        let pattern = Regex::new(r"freelancer\.com/projects/").unwrap();
        let links = vec![
            "https://www.freelancer.com/u/someone".to_string(),
            "https://www.freelancer.com/projects/python/first".to_string(),
            "https://www.freelancer.com/projects/python/second".to_string(),
        ];
        assert_eq!(
            extract_link(&links, &pattern),
            Some("https://www.freelancer.com/projects/python/first".to_string())
        );
    }

    #[test]
    fn test_unrelated_links_ignored() {
        let pattern = Regex::new(r"freelancer\.com/projects/").unwrap();
        let links = vec![
            "https://t.me/Freelanceroff".to_string(),
            "https://example.com".to_string(),
        ];
        assert_eq!(extract_link(&links, &pattern), None);
        assert_eq!(extract_link(&[], &pattern), None);
    }

    #[test]
    fn test_budget_last_match_wins() {
        let text = "Title\n💰 $100\nsomething\n💰 $250 - $400\n";
        assert_eq!(extract_budget(text, "💰"), Some("$250 - $400".to_string()));
    }

    #[test]
    fn test_budget_later_empty_marker_line_clears_value() {
        assert_eq!(extract_budget("Title\n💰 $100\nmore\n💰\n", "💰"), None);
        assert_eq!(
            extract_budget("Title\n💰\n💰 $100\n", "💰"),
            Some("$100".to_string())
        );
    }

    #[test]
    fn test_budget_strips_marker_and_leading_text() {
        assert_eq!(extract_budget("Need API work 💰$500", "💰"), Some("$500".to_string()));
        assert_eq!(extract_budget("$500 💰", "💰"), Some("$500".to_string()));
        assert_eq!(extract_budget("no marker here", "💰"), None);
        assert_eq!(extract_budget("💰", "💰"), None);
    }

    #[test]
    fn test_skills_from_comma_spans_only() {
        let spans = vec![
            "urgent".to_string(),
            "Go, Docker".to_string(),
            "PHP,  , MySQL,".to_string(),
        ];
        assert_eq!(extract_skills(&spans), vec!["Go", "Docker", "PHP", "MySQL"]);
        assert!(extract_skills(&["bold".to_string()]).is_empty());
    }

    #[test]
    fn test_skills_keep_duplicates() {
        let spans = vec!["Go, Go".to_string(), "Go, Rust".to_string()];
        assert_eq!(extract_skills(&spans), vec!["Go", "Go", "Go", "Rust"]);
    }

    #[test]
    fn test_extract_full_message() {
        let msg = MessageUnit {
            text: "Backend Dev\nNeed API work 💰$500\n".to_string(),
            datetime: Some("2024-01-15T22:48:59+00:00".to_string()),
            links: vec!["https://www.freelancer.com/projects/api/backend-dev".to_string()],
            emphasized: vec!["Go, Docker".to_string()],
        };
        let record = extractor().extract(&msg).unwrap();
        assert_eq!(record.title, "Backend Dev");
        assert_eq!(record.description, msg.text);
        assert_eq!(record.budget.as_deref(), Some("$500"));
        assert_eq!(record.skills, vec!["Go", "Docker"]);
        assert_eq!(
            record.link.as_deref(),
            Some("https://www.freelancer.com/projects/api/backend-dev")
        );
        assert!(record.date.is_some());
        assert_eq!(record.source, "test-feed");
    }

    #[test]
    fn test_invalid_link_pattern_rejected() {
        assert!(matches!(
            Extractor::new("(unclosed", "💰", "feed"),
            Err(ConfigError::LinkPattern(_))
        ));
    }
}
