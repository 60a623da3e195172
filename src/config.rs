use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const DEFAULT_FEED: &str = "https://t.me/s/Freelanceroff";

// Interesting tech gigs
const DEFAULT_KEYWORDS: &[&str] = &[
    "saas", "open source", "opensource", "api", "bot", "scraping", "automation",
    "react", "go", "golang", "python", "node", "nodejs", "typescript", "javascript",
    "vue", "nextjs", "aws", "docker", "kubernetes", "cloud", "ai", "machine learning",
    "ml", "llm", "gpt", "crypto", "blockchain", "web3", "security", "pentest",
];

/// Run parameters and vocabulary for one harvest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Latest-content view the traversal starts from
    pub seed_url: String,
    /// Stamped on every record
    pub source: String,
    /// Maximum messages inspected per run
    pub scan_budget: usize,
    pub keywords: Vec<String>,
    /// Regex an embedded link must match to become the record's identity
    pub link_pattern: String,
    pub budget_marker: String,
    /// Hosts the traversal may visit; empty allows any
    pub allowed_domains: Vec<String>,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_FEED.to_string(),
            source: DEFAULT_FEED.to_string(),
            scan_budget: 150,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            link_pattern: r"freelancer\.com/projects/".to_string(),
            budget_marker: "💰".to_string(),
            allowed_domains: vec!["t.me".to_string()],
            store_path: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the platform config directory when none is given.
    ///
    /// A missing default file means defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) => match Self::from_file(&path) {
                    Err(ConfigError::Read { source, .. })
                        if source.kind() == ErrorKind::NotFound =>
                    {
                        Ok(Self::default())
                    }
                    other => other,
                },
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gighunt")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Where the dataset lives: explicit setting, XDG data dir, or the working directory.
    pub fn dataset_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "gighunt") {
            proj_dirs.data_dir().join("gigs.json")
        } else {
            PathBuf::from("gigs.json")
        }
    }
}
