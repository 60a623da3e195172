use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::HarvestError;
use crate::extract::Extractor;
use crate::feed::FeedSource;
use crate::filter::RelevanceFilter;
use crate::store::MergeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    BudgetReached,
    NoOlderPage,
    /// Older-page link pointed at a page already visited this run
    Revisit,
    /// Older-page link left the allowed domains
    OffDomain,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::BudgetReached => "scan budget reached",
            StopReason::NoOlderPage => "no older page",
            StopReason::Revisit => "older page already visited",
            StopReason::OffDomain => "older page outside allowed domains",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Default)]
pub struct RunStats {
    pub pages: usize,
    pub scanned: usize,
    pub empty: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub added: usize,
    pub stop: Option<StopReason>,
}

/// Walks the feed from the newest page backwards until the scan budget runs out.
pub struct Harvester<'a, F: FeedSource> {
    feed: &'a mut F,
    extractor: &'a Extractor,
    filter: &'a RelevanceFilter,
    scan_budget: usize,
    allowed_domains: Vec<String>,
    stats: RunStats,
}

impl<'a, F: FeedSource> Harvester<'a, F> {
    pub fn new(
        feed: &'a mut F,
        extractor: &'a Extractor,
        filter: &'a RelevanceFilter,
        config: &Config,
    ) -> Self {
        Self {
            feed,
            extractor,
            filter,
            scan_budget: config.scan_budget,
            allowed_domains: config
                .allowed_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            stats: RunStats::default(),
        }
    }

    /// Counters for the run so far; still meaningful after a failed run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Traverse from `seed_url`, offering every relevant candidate to `store`.
    ///
    /// A page-fetch failure ends the run; whatever was merged before it stays in `store`.
    pub fn run(
        &mut self,
        seed_url: &str,
        store: &mut MergeStore,
    ) -> Result<StopReason, HarvestError> {
        if !self.is_allowed(seed_url) {
            return Err(HarvestError::DomainNotAllowed(seed_url.to_string()));
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut next = seed_url.to_string();

        let reason = loop {
            visited.insert(next.clone());
            info!(url = %next, scanned = self.stats.scanned, "visiting page");

            let page = self
                .feed
                .fetch_page(&next)
                .inspect_err(|e| warn!(error = %e, "page fetch failed"))?;
            self.stats.pages += 1;

            for message in &page.messages {
                self.stats.scanned += 1;

                let Some(candidate) = self.extractor.extract(message) else {
                    self.stats.empty += 1;
                    continue;
                };

                if !self.filter.is_relevant(&candidate) {
                    debug!(title = %candidate.title, "not relevant");
                    self.stats.rejected += 1;
                    continue;
                }

                if store.offer(candidate) {
                    self.stats.added += 1;
                } else {
                    self.stats.duplicates += 1;
                }
            }

            if self.stats.scanned >= self.scan_budget {
                break StopReason::BudgetReached;
            }

            match page.older {
                None => break StopReason::NoOlderPage,
                Some(older) if visited.contains(&older) => break StopReason::Revisit,
                Some(older) if !self.is_allowed(&older) => break StopReason::OffDomain,
                Some(older) => next = older,
            }
        };

        info!(
            reason = %reason,
            pages = self.stats.pages,
            scanned = self.stats.scanned,
            added = self.stats.added,
            "traversal stopped"
        );
        self.stats.stop = Some(reason);
        Ok(reason)
    }

    fn is_allowed(&self, url: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return false;
        };
        self.allowed_domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }
}
