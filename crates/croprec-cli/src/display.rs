//! Terminal rendering for recommendations and artifact summaries.

use std::path::Path;

use croprec_ai::ModelArtifact;
use croprec_core::{Recommendation, RecommendError};
use serde_json::{Value, json};

const BAR_WIDTH: usize = 30;
const MAX_LIST_ITEMS: usize = 25;

/// Ranked table with a proportional bar per crop.
pub fn print_recommendations(recs: &[Recommendation]) {
    if recs.is_empty() {
        println!("(no recommendations)");
        return;
    }

    let name_width = recs.iter().map(|r| r.crop.len()).max().unwrap_or(4).max(4);
    println!("{:>4}  {:<name_width$}  {:>8}", "rank", "crop", "prob %");
    for (i, rec) in recs.iter().enumerate() {
        println!(
            "{:>4}  {:<name_width$}  {:>8.2}  {}",
            i + 1,
            rec.crop,
            rec.probability,
            bar(rec.probability)
        );
    }
}

pub fn print_json(recs: &[Recommendation]) -> anyhow::Result<()> {
    let body = json!({ "recommendations": recs });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

pub fn print_error_json(err: &RecommendError) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&error_body(err))?);
    Ok(())
}

/// Server-side detail is redacted; client errors are reported as-is.
fn error_body(err: &RecommendError) -> Value {
    json!({
        "error": err.public_message(),
        "client_error": err.is_client_error(),
    })
}

/// Vertical summary of an artifact: provenance, pipeline shape, labels.
pub fn print_artifact(artifact: &ModelArtifact, path: &Path) {
    let meta = artifact.metadata();
    println!("=== {} ===", meta.model_name.as_deref().unwrap_or("unnamed model"));
    println!();

    println!("--- Provenance ---");
    print_field("path", &path.display().to_string());
    if let Some(ts) = meta.trained_at {
        print_field("trained_at", &ts.format("%Y-%m-%d %H:%M UTC").to_string());
    }
    if let Some(acc) = meta.accuracy {
        print_field("accuracy", &format!("{:.2}%", acc * 100.0));
    }
    println!();

    println!("--- Pipeline ---");
    print_field("scaler", artifact.scaler().kind());
    print_field("classifier", artifact.classifier().kind());
    print_field("features", &artifact.feature_names().join(", "));
    println!();

    println!("--- Labels ({}) ---", artifact.labels().len());
    for line in numbered(artifact.labels().iter()) {
        println!("{line}");
    }
}

fn print_field(name: &str, value: &str) {
    println!("  {name:<12} {value}");
}

fn numbered<'a>(items: impl ExactSizeIterator<Item = &'a str>) -> Vec<String> {
    let total = items.len();
    let mut lines: Vec<String> = items
        .take(MAX_LIST_ITEMS)
        .enumerate()
        .map(|(i, item)| format!("  {:>3}. {item}", i + 1))
        .collect();
    if total > MAX_LIST_ITEMS {
        lines.push(format!("  ... and {} more", total - MAX_LIST_ITEMS));
    }
    lines
}

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.min(BAR_WIDTH))
}
