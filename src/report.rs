use std::collections::HashMap;

use crate::models::Record;

/// Frequency tables over a persisted dataset.
pub struct Report {
    pub titles: Vec<String>,
    skills: HashMap<String, usize>,
    title_keywords: HashMap<String, usize>,
}

impl Report {
    pub fn from_records(records: &[Record]) -> Self {
        let mut skills: HashMap<String, usize> = HashMap::new();
        let mut title_keywords: HashMap<String, usize> = HashMap::new();

        for record in records {
            for skill in &record.skills {
                *skills.entry(skill.clone()).or_default() += 1;
            }

            // skip small words
            for word in record.title.to_lowercase().split_whitespace() {
                if word.chars().count() > 3 {
                    *title_keywords.entry(word.to_string()).or_default() += 1;
                }
            }
        }

        Self {
            titles: records.iter().map(|r| r.title.clone()).collect(),
            skills,
            title_keywords,
        }
    }

    pub fn top_skills(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.skills, n)
    }

    pub fn top_title_keywords(&self, n: usize) -> Vec<(&str, usize)> {
        top(&self.title_keywords, n)
    }
}

/// Highest counts first; ties alphabetical so output is stable.
fn top(counts: &HashMap<String, usize>, n: usize) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(n);
    entries
}
