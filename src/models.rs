use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// One harvested job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub budget: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub source: String,
}

/// One raw message as the feed presents it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageUnit {
    pub text: String,
    pub datetime: Option<String>,
    pub links: Vec<String>,
    pub emphasized: Vec<String>,
}

impl Record {
    /// Identity key used for deduplication. Records without a link have none.
    pub fn identity(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| !l.is_empty())
    }
}

// Older datasets wrote "" for missing budget/link.
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// Zero timestamps ("0001-01-01T00:00:00Z") and garbage both mean "no date".
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .filter(|d| d.year() > 1))
}
