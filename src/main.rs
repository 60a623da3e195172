mod config;
mod error;
mod extract;
mod feed;
mod filter;
mod harvest;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use extract::Extractor;
use feed::HttpFeed;
use filter::RelevanceFilter;
use harvest::Harvester;
use report::Report;
use std::path::PathBuf;
use store::{Dataset, MergeStore};

#[derive(Parser)]
#[command(name = "gighunt")]
#[command(about = "Harvest freelance gigs from a public channel feed")]
struct Cli {
    /// Path to a JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the feed and merge new gigs into the dataset
    Scrape {
        /// Page to start from (newest messages)
        #[arg(long)]
        seed: Option<String>,

        /// Maximum number of messages to inspect
        #[arg(short, long)]
        budget: Option<usize>,

        /// Keyword to match (repeatable, replaces the configured vocabulary)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// Dataset file
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Show what would be added without writing the dataset
        #[arg(long)]
        dry_run: bool,
    },

    /// Show skill and title keyword frequencies
    Report {
        /// Number of entries per table
        #[arg(short, long, default_value = "15")]
        top: usize,

        /// Dataset file
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// List the most recent gigs
    List {
        /// Number of gigs to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Dataset file
        #[arg(short, long)]
        store: Option<PathBuf>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gighunt=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Scrape {
            seed,
            budget,
            keywords,
            store,
            dry_run,
        } => {
            if let Some(seed) = seed {
                config.seed_url = seed;
            }
            if let Some(budget) = budget {
                config.scan_budget = budget;
            }
            if !keywords.is_empty() {
                config.keywords = keywords;
            }
            if store.is_some() {
                config.store_path = store;
            }
            scrape(&config, dry_run)?;
        }

        Commands::Report { top, store } => {
            let dataset = Dataset::new(store.unwrap_or_else(|| config.dataset_path()));
            let records = dataset.load();
            let report = Report::from_records(&records);

            println!("=== ALL GIG TITLES ===");
            for title in &report.titles {
                println!("- {}", title);
            }

            println!("\n=== TOP SKILLS ===");
            for (skill, count) in report.top_skills(top) {
                println!("{}: {}", skill, count);
            }

            println!("\n=== TOP TITLE KEYWORDS ===");
            for (word, count) in report.top_title_keywords(top) {
                println!("{}: {}", word, count);
            }
        }

        Commands::List { limit, store } => {
            let dataset = Dataset::new(store.unwrap_or_else(|| config.dataset_path()));
            let records = dataset.load();
            if records.is_empty() {
                println!("No gigs found in {}.", dataset.path().display());
            } else {
                println!("{:<17} {:<40} {:<16} {}", "DATE", "TITLE", "BUDGET", "LINK");
                println!("{}", "-".repeat(100));
                for record in records.iter().rev().take(limit) {
                    let date = record
                        .date
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<17} {:<40} {:<16} {}",
                        date,
                        truncate(&record.title, 38),
                        truncate(record.budget.as_deref().unwrap_or("-"), 14),
                        record.link.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}

fn scrape(config: &Config, dry_run: bool) -> Result<()> {
    let extractor = Extractor::from_config(config).context("Invalid extraction settings")?;
    let filter = RelevanceFilter::new(&config.keywords);
    let dataset = Dataset::new(config.dataset_path());

    let prior = dataset.load();
    if !prior.is_empty() {
        println!("Loaded {} existing gigs from {}", prior.len(), dataset.path().display());
    }
    let mut store = MergeStore::new(prior);

    let mut feed = HttpFeed::new().context("Failed to build HTTP client")?;
    let mut harvester = Harvester::new(&mut feed, &extractor, &filter, config);

    println!("Starting scraper at {}...", config.seed_url);
    let outcome = harvester.run(&config.seed_url, &mut store);
    let stats = harvester.stats();

    if dry_run {
        for record in store.added() {
            println!(
                "[DRY RUN] Would add: {} ({})",
                record.title,
                record.link.as_deref().unwrap_or("no link")
            );
        }
    } else {
        // Keep whatever was merged even if traversal failed part-way.
        dataset
            .save(store.records())
            .with_context(|| format!("Failed to write {}", dataset.path().display()))?;
    }

    outcome.context("Scrape aborted")?;

    println!(
        "\nScraping complete. Total database: {} gigs (New: {}, Scanned: {} messages this run).",
        store.len(),
        store.added().len(),
        stats.scanned
    );
    if let Some(stop) = stats.stop {
        println!(
            "Visited {} pages, stopped: {} ({} irrelevant, {} duplicates, {} empty).",
            stats.pages, stop, stats.rejected, stats.duplicates, stats.empty
        );
    }
    if dry_run {
        println!("\n(Dry run - nothing was written)");
    } else {
        println!("Saved results to {}", dataset.path().display());
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
