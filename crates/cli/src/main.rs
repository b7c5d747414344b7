//! Command-line front end for eco-friendliness classification.
//!
//! Usage:
//!     ecocert classify --labels labels.json --metadata product.json
//!     ecocert image photo.jpg
//!     ecocert health
//!     ecocert lexicon --group vehicles

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecocert_classifier::{ClassifierConfig, HttpClassifier, LabelSource};
use ecocert_explain::{describe_match, summarize_result};
use ecocert_lexicon::Lexicon;
use ecocert_model::{ClassificationResult, LabelPrediction, ProductMetadata};
use ecocert_scoring::{classify, ScoringConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ecocert")]
#[command(about = "Estimate how eco-friendly a product photo looks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Image classifier URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:8501")]
    classifier_url: String,

    /// Classifier request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,

    /// Scoring config JSON (partial overrides allowed)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Custom lexicon JSON
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    /// Debug logging and per-match detail
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify already-resolved label predictions
    Classify {
        /// JSON array of {"label", "probability"} objects
        #[arg(short, long)]
        labels: PathBuf,

        /// Seller metadata JSON
        #[arg(short, long)]
        metadata: Option<PathBuf>,
    },

    /// Send an image to the classifier and classify the result
    Image {
        /// Path to the image file
        path: PathBuf,

        /// Seller metadata JSON
        #[arg(short, long)]
        metadata: Option<PathBuf>,
    },

    /// Check classifier health
    Health,

    /// List lexicon groups and entries
    Lexicon {
        /// Only show this group
        #[arg(short, long)]
        group: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "ecocert=debug" } else { "ecocert=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let lexicon = load_lexicon(cli.lexicon.as_deref())?;
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Classify { labels, metadata } => {
            let labels = load_labels(labels)?;
            let metadata = load_metadata(metadata.as_deref())?;
            let result = classify(&labels, metadata.as_ref(), &lexicon, &config);
            print_result(&result, &cli)?;
        }
        Commands::Image { path, metadata } => {
            let classifier = build_classifier(&cli)?;
            let image = std::fs::read(path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            let metadata = load_metadata(metadata.as_deref())?;

            let labels = classifier.classify(image).await?;
            tracing::info!(
                classifier = classifier.name(),
                labels = labels.len(),
                "Received predictions"
            );

            let result = classify(&labels, metadata.as_ref(), &lexicon, &config);
            print_result(&result, &cli)?;
        }
        Commands::Health => {
            let classifier = build_classifier(&cli)?;
            run_health(&classifier).await?;
        }
        Commands::Lexicon { group } => {
            run_lexicon(&lexicon, group.as_deref(), &cli.format)?;
        }
    }

    Ok(())
}

fn build_classifier(cli: &Cli) -> Result<HttpClassifier> {
    let config = ClassifierConfig {
        base_url: cli.classifier_url.clone(),
        timeout_secs: cli.timeout_secs,
        ..Default::default()
    };
    Ok(HttpClassifier::new(config)?)
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_lexicon(path: Option<&Path>) -> Result<Lexicon> {
    match path {
        Some(path) => {
            let lexicon = Lexicon::from_json(&read_file(path)?)
                .with_context(|| format!("Invalid lexicon {}", path.display()))?;
            tracing::debug!(entries = lexicon.len(), "Loaded custom lexicon");
            Ok(lexicon)
        }
        None => Ok(Lexicon::builtin()),
    }
}

fn load_config(path: Option<&Path>) -> Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::from_json(&read_file(path)?)
            .with_context(|| format!("Invalid scoring config {}", path.display())),
        None => Ok(ScoringConfig::default()),
    }
}

fn load_metadata(path: Option<&Path>) -> Result<Option<ProductMetadata>> {
    path.map(|path| {
        serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("Invalid metadata {}", path.display()))
    })
    .transpose()
}

/// Parse predictions and order them by descending probability.
fn parse_labels(json: &str) -> Result<Vec<LabelPrediction>> {
    let mut labels: Vec<LabelPrediction> = serde_json::from_str(json)?;
    labels.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    Ok(labels)
}

fn load_labels(path: &Path) -> Result<Vec<LabelPrediction>> {
    parse_labels(&read_file(path)?).with_context(|| format!("Invalid labels {}", path.display()))
}

fn stars(result: &ClassificationResult) -> String {
    let filled = result.filled_stars() as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn print_result(result: &ClassificationResult, cli: &Cli) -> Result<()> {
    if cli.format == "json" {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", summarize_result(result));
    println!("{} {:.1}/5", stars(result), result.display_score());
    println!("Eco-friendly: {}", if result.eco_friendly { "yes" } else { "no" });

    if !result.detection_summary.is_empty() {
        println!("\nDetected:");
        for line in &result.detection_summary {
            println!("  {}", line);
        }
    }

    if !result.matched_features.is_empty() {
        println!("\nRecognized: {}", result.matched_features.join(", "));
    }

    if !result.recommendations.is_empty() {
        println!("\nRecommendations:");
        for advice in &result.recommendations {
            println!("  - {}", advice);
        }
    }

    if cli.verbose && !result.matches.is_empty() {
        println!("\nMatches:");
        for record in &result.matches {
            println!("  {}", describe_match(record));
        }
        println!("Raw score: {:.3}", result.raw_score);
    }

    Ok(())
}

async fn run_health(classifier: &HttpClassifier) -> Result<()> {
    print!("Checking {} classifier at {}... ", classifier.name(), classifier.config().base_url);

    match classifier.health_check().await {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_lexicon(lexicon: &Lexicon, group: Option<&str>, format: &str) -> Result<()> {
    let groups: Vec<_> = match group {
        Some(name) => vec![lexicon
            .group(name)
            .with_context(|| format!("Unknown group: {}", name))?],
        None => lexicon.groups().collect(),
    };

    if format == "json" {
        let listing: Vec<_> = groups
            .iter()
            .map(|g| {
                serde_json::json!({
                    "name": g.name(),
                    "type": g.entry_type(),
                    "terms": g.entries().iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for g in &groups {
        let terms: Vec<_> = g.entries().iter().map(|e| e.text.as_str()).collect();
        println!(
            "{} [{}, {:+.1}]: {}",
            g.name(),
            g.entry_type().label(),
            g.entry_type().max_score(),
            terms.join(", ")
        );
    }

    println!("\nTotal: {} entries in {} groups", lexicon.len(), lexicon.groups().count());

    Ok(())
}
