//! Evaluation against labelled sample transcripts.

use std::collections::BTreeSet;

use anyhow::Context;
use clap::Args;
use shelfmatch_matcher::{ProcessingResult, TranscriptSample};

use super::{create_matcher, print_error};
use crate::Cli;
use crate::config::Config;

/// Run the sample transcripts and compare results with expectations.
#[derive(Args)]
pub struct EvalCommand {
    /// Labelled transcripts (JSON array)
    #[arg(long, default_value = "data/sample_transcripts.json")]
    transcripts: String,

    /// Search an in-memory catalog built from this products file instead of Azure AI Search
    #[arg(long, value_name = "PATH")]
    catalog: Option<String>,
}

impl EvalCommand {
    pub async fn run(&self, _cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
        let samples = load_samples(&self.transcripts)?;
        let matcher = create_matcher(cfg, self.catalog.as_deref()).await?;

        let rule = "=".repeat(80);
        let sep = "-".repeat(80);
        let total = samples.len();
        let mut succeeded = 0;

        for (i, sample) in samples.iter().enumerate() {
            println!("\n[{}/{}] Transkript: {}", i + 1, total, sample.id);
            println!("{sep}");
            match matcher.process(&sample.text).await {
                Ok(result) => {
                    println!("{}", result.to_summary());
                    println!("\nValidace výsledků:");
                    for line in validate(&result, sample) {
                        println!("  {line}");
                    }
                    succeeded += 1;
                }
                Err(e) => {
                    tracing::error!(id = %sample.id, error = %e, "transcript failed");
                    print_error(&format!("Zpracování selhalo: {e}"));
                }
            }
            println!("{sep}");
        }

        println!("\n{rule}");
        println!("SOUHRN: {succeeded}/{total} transkriptů úspěšně zpracováno");
        println!("{rule}");
        Ok(())
    }
}

fn load_samples(path: &str) -> anyhow::Result<Vec<TranscriptSample>> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let samples: Vec<TranscriptSample> =
        serde_json::from_slice(&data).with_context(|| format!("invalid transcripts in {path}"))?;
    tracing::info!(count = samples.len(), path, "loaded sample transcripts");
    Ok(samples)
}

/// Compare one result with its labels, one report line per check.
fn validate(result: &ProcessingResult, sample: &TranscriptSample) -> Vec<String> {
    let mut lines = Vec::new();

    let found: BTreeSet<&str> = result
        .matched_products()
        .iter()
        .map(|p| p.product_name())
        .collect();
    let expected: BTreeSet<&str> = sample.expected_products.iter().map(String::as_str).collect();

    if found == expected {
        lines.push(format!(
            "✓ Produkty: OK (nalezeno {}/{})",
            found.len(),
            expected.len()
        ));
    } else {
        let missing: Vec<&str> = expected.difference(&found).copied().collect();
        let extra: Vec<&str> = found.difference(&expected).copied().collect();
        if !missing.is_empty() {
            lines.push(format!("⚠ Produkty: Chybí {}: {:?}", missing.len(), missing));
        }
        if !extra.is_empty() {
            lines.push(format!("⚠ Produkty: Navíc {}: {:?}", extra.len(), extra));
        }
    }

    lines.push(check_flag(
        "Konkurence",
        sample.has_competitor_mention,
        result.competitor_advantage_mentioned(),
    ));
    lines.push(check_flag(
        "Umístění",
        sample.has_placement_issue,
        result.bad_placement_mentioned(),
    ));
    lines
}

fn check_flag(label: &str, expected: bool, detected: bool) -> String {
    if expected == detected {
        format!("✓ {label}: OK")
    } else {
        format!("✗ {label}: Očekáváno {expected}, detekováno {detected}")
    }
}
