use std::collections::HashSet;

use crate::models::Record;

/// Accepts records that mention at least one vocabulary keyword.
///
/// Single words must appear as a whole token, so "ai" does not match "said".
/// Phrases ("open source") match as plain substrings.
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl RelevanceFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn is_relevant(&self, record: &Record) -> bool {
        let text = format!(
            "{} {} {}",
            record.title,
            record.description,
            record.skills.join(" ")
        )
        .to_lowercase();

        let words: HashSet<&str> = tokenize(&text).collect();

        self.keywords.iter().any(|keyword| {
            if keyword.contains(char::is_whitespace) {
                text.contains(keyword.as_str())
            } else {
                words.contains(keyword.as_str())
            }
        })
    }
}

/// Maximal runs of ASCII lowercase letters and digits; everything else separates.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|word| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, description: &str, skills: &[&str]) -> Record {
        Record {
            title: title.to_string(),
            description: description.to_string(),
            budget: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            link: None,
            date: None,
            source: String::new(),
        }
    }

    #[test]
    fn test_is_relevant() {
        let filter = RelevanceFilter::new(&["python", "scraping", "design"]);

        let tech = record(
            "Python Developer Needed",
            "Looking for someone to build a scraping bot.",
            &["python", "scraping"],
        );
        assert!(filter.is_relevant(&tech));

        let design = record(
            "Logo Designer",
            "Design a logo for a bakery.",
            &["design", "photoshop"],
        );
        assert!(filter.is_relevant(&design));

        let chef = record("Chef Needed", "Cook food.", &["cooking"]);
        assert!(!filter.is_relevant(&chef));
    }

    #[test]
    fn test_single_word_requires_whole_token() {
        let filter = RelevanceFilter::new(&["ai"]);
        assert!(!filter.is_relevant(&record("He said", "nothing else", &[])));
        assert!(filter.is_relevant(&record("Build an AI agent", "", &[])));
        assert!(filter.is_relevant(&record("Chatbot", "uses (AI)-powered replies", &[])));
    }

    #[test]
    fn test_phrase_matches_as_substring() {
        let filter = RelevanceFilter::new(&["open source"]);
        assert!(filter.is_relevant(&record("Maintain our Open Source library", "", &[])));
        assert!(!filter.is_relevant(&record("Open the source files", "", &[])));
    }

    #[test]
    fn test_skills_are_searched() {
        let filter = RelevanceFilter::new(&["docker"]);
        assert!(filter.is_relevant(&record("Help wanted", "details in chat", &["Go", "Docker"])));
    }

    #[test]
    fn test_keywords_normalized() {
        let filter = RelevanceFilter::new(&["  Kubernetes ", ""]);
        assert!(filter.is_relevant(&record("kubernetes cluster", "", &[])));
    }

    #[test]
    fn test_empty_vocabulary_rejects_everything() {
        let filter = RelevanceFilter::new::<&str>(&[]);
        assert!(!filter.is_relevant(&record("Python API bot", "", &[])));
    }

    #[test]
    fn test_mixed_script_text() {
        let filter = RelevanceFilter::new(&["ai"]);
        assert!(filter.is_relevant(&record("Нужен AIбот", "Нужен AIбот", &[])));

        let filter = RelevanceFilter::new(&["бот"]);
        assert!(!filter.is_relevant(&record("Нужен бот", "", &[])));
    }

    #[test]
    fn test_tokenize() {
        let words: Vec<_> = tokenize("node.js, c++ & web3!").collect();
        assert_eq!(words, vec!["node", "js", "c", "web3"]);
    }
}
