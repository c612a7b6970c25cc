//! Plain-text tables for stdout.

use std::fmt::Write as _;
use std::path::Path;

use tokenplan_core::{format_size, AccountingResult, DurationEstimate, EstimateError, ModelDescriptor};

pub fn models_table(models: &[ModelDescriptor]) -> String {
    let mut out = String::new();
    for (index, model) in models.iter().enumerate() {
        let mut notes = Vec::new();
        if model.is_all_option {
            notes.push("all models".to_string());
        }
        if model.auth_required {
            notes.push("auth required, skipped".to_string());
        }
        if model.trust_remote_code {
            notes.push("trust_remote_code".to_string());
        }
        let methods: Vec<&str> = model.method_names().collect();
        if !methods.is_empty() {
            notes.push(format!("methods: {}", methods.join(", ")));
        }
        let _ = writeln!(out, "{:>3}. {:<32} {}", index + 1, model.name, notes.join("; "));
    }
    out
}

pub fn measurement_table(
    dataset_name: &str,
    dataset_path: &Path,
    accounting: &AccountingResult,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset: {dataset_name} ({})", dataset_path.display());
    let _ = writeln!(
        out,
        "Samples: {}  Size: {} ({} bytes)",
        accounting.sample_count,
        format_size(accounting.total_bytes),
        accounting.total_bytes
    );
    if accounting.sample_count == 0 {
        let _ = writeln!(out, "No samples were extracted.");
        return out;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<32} {:>16} {:>12} {:>8}", "Model", "Tokens", "Bytes/token", "Errors");
    for tally in &accounting.models {
        let ratio = tally
            .compression_ratio(accounting.total_bytes)
            .map(|r| format!("{r:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<32} {:>16} {:>12} {:>8}",
            tally.name, tally.total_tokens, ratio, tally.error_count
        );
    }
    out
}

pub fn estimates_table(
    method: &str,
    epochs: u32,
    target_bytes: Option<u64>,
    rows: &[(String, Result<DurationEstimate, EstimateError>)],
) -> String {
    let mut out = String::new();
    let scope = match target_bytes {
        Some(bytes) => format!(", scaled to {}", format_size(bytes)),
        None => String::new(),
    };
    let plural = if epochs == 1 { "" } else { "s" };
    let _ = writeln!(out, "Estimates for {method:?}, {epochs} epoch{plural}{scope}:");
    for (name, row) in rows {
        match row {
            Ok(estimate) => {
                let _ = writeln!(
                    out,
                    "  {:<32} {:>16} tokens  {:>3} x {:>8.1} tok/s  {:.0} tok/day  {}",
                    name,
                    estimate.total_tokens,
                    estimate.worker_count,
                    estimate.throughput,
                    estimate.tokens_per_day(),
                    estimate.formatted()
                );
            }
            Err(err) => {
                let _ = writeln!(out, "  {name:<32} n/a ({err})");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{estimates_table, measurement_table, models_table};
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tokenplan_core::{AccountingResult, DurationEstimator, ModelDescriptor};

    #[test]
    fn models_table_lists_notes() {
        let models = vec![
            ModelDescriptor::placeholder("All"),
            ModelDescriptor::new("gated").with_auth_required(),
            ModelDescriptor::new("qwen").with_method("lora", 10.0, 1).with_method("full", 5.0, 2),
        ];
        let table = models_table(&models);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("all models"));
        assert!(lines[1].contains("auth required"));
        assert!(lines[2].ends_with("methods: full, lora"));
    }

    #[test]
    fn measurement_table_shows_ratio_or_dash() {
        let mut accounting = AccountingResult::new(1000, 3, ["a", "b"]);
        accounting.models[0].total_tokens = 400;
        accounting.models[1].error_count = 3;

        let table = measurement_table("news", Path::new("news.jsonl"), &accounting);

        let a = table.lines().find(|l| l.starts_with("a ")).unwrap();
        let b = table.lines().find(|l| l.starts_with("b ")).unwrap();
        assert!(a.contains("2.50"));
        assert!(b.contains(" - ") && b.trim_end().ends_with('3'));
    }

    #[test]
    fn empty_measurement_says_so() {
        let accounting = AccountingResult::new(0, 0, ["a"]);
        let table = measurement_table("empty", Path::new("e.txt"), &accounting);
        assert!(table.contains("No samples were extracted."));
    }

    #[test]
    fn estimate_rows_render_errors_inline() {
        let models = vec![ModelDescriptor::new("qwen").with_method("full", 100.0, 4)];
        let estimator = DurationEstimator::new(&models);
        let rows = vec![
            ("qwen".to_string(), estimator.estimate(120_000, "qwen", "full", 1)),
            ("other".to_string(), estimator.estimate(10, "other", "full", 1)),
        ];

        let table = estimates_table("full", 1, None, &rows);

        assert!(table.starts_with("Estimates for \"full\", 1 epoch:"));
        assert!(table.lines().nth(1).unwrap().ends_with("5 minutes"));
        assert!(table.lines().nth(2).unwrap().contains("n/a"));
    }
}
