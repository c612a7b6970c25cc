use std::path::Path;

use anyhow::{anyhow, bail, Context};
use engine_logging::{engine_info, engine_warn};
use tokenplan_core::{
    plan_loads, scale, BudgetConfig, DurationEstimate, DurationEstimator, EstimateError,
};
use tokenplan_engine::{
    load_config, measure, FetchSettings, HubTokenizerLoader, MeasureError, MeasurementRecord,
    ReportStore, ResourceResolver,
};

use crate::cli::{Cli, Command, CompareArgs, EstimateArgs, ModelsArgs};
use crate::progress::BarProgressSink;
use crate::render;

const REPORT_DIR: &str = "reports";

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Models(args) => run_models(&args),
        Command::Compare(args) => run_compare(&args, !cli.quiet),
        Command::Estimate(args) => run_estimate(&args),
    }
}

fn read_config(path: &Path) -> anyhow::Result<BudgetConfig> {
    load_config(path).with_context(|| format!("loading config {}", path.display()))
}

fn run_models(args: &ModelsArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;
    print!("{}", render::models_table(&config.models));
    Ok(())
}

fn run_compare(args: &CompareArgs, show_progress: bool) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;
    let resolver = ResourceResolver::for_config(&args.config);

    let dataset = match args.dataset.as_deref() {
        Some(key) => config
            .find_dataset(key)
            .ok_or_else(|| anyhow!("no dataset named or numbered {key:?}"))?,
        None => config
            .default_dataset()
            .ok_or_else(|| anyhow!("the config lists no datasets"))?,
    };

    let plan = plan_loads(&config.models, &args.models)?;
    for token in &plan.unmatched {
        engine_warn!("Ignoring unknown model selection {token:?}");
    }

    let loader = HubTokenizerLoader::new(resolver.clone(), FetchSettings::default())
        .context("starting the download runtime")?;
    let sink = BarProgressSink::new(show_progress);

    let measurement = match measure(dataset, &plan, &resolver, &loader, &sink) {
        Ok(measurement) => measurement,
        Err(MeasureError::NoTokenizers { failed }) => {
            for (name, err) in &failed {
                eprintln!("{name}: {err}");
            }
            bail!("none of the selected tokenizers could be loaded");
        }
        Err(err) => return Err(err).with_context(|| format!("measuring {:?}", dataset.name)),
    };

    print!(
        "{}",
        render::measurement_table(&dataset.name, &measurement.dataset_path, &measurement.accounting)
    );
    for (name, err) in &measurement.failed {
        println!("Not loaded: {name} ({err})");
    }
    for name in &measurement.skipped_auth {
        println!("Skipped: {name} (authentication required)");
    }

    if !args.no_save && measurement.accounting.sample_count > 0 {
        let dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| resolver.working_dir().join(REPORT_DIR));
        let record = MeasurementRecord {
            dataset_name: dataset.name.clone(),
            dataset_path: measurement.dataset_path.clone(),
            measured_utc: chrono::Utc::now().to_rfc3339(),
            accounting: measurement.accounting.clone(),
        };
        let saved = ReportStore::new(dir).save(&record)?;
        println!("Saved measurement to {}", saved.display());
    }

    if let Some(method) = args.estimate.method.as_deref() {
        let counts = measurement.accounting.token_counts();
        let rows = estimate_rows(
            &config,
            &counts,
            measurement.accounting.total_bytes,
            method,
            args.estimate.epochs,
            args.estimate.target_size,
        )?;
        println!();
        print!(
            "{}",
            render::estimates_table(method, args.estimate.epochs, args.estimate.target_size, &rows)
        );
    }
    Ok(())
}

fn run_estimate(args: &EstimateArgs) -> anyhow::Result<()> {
    let config = read_config(&args.config)?;

    let (counts, measured_bytes) = match (&args.report, args.tokens) {
        (Some(report), _) => report_counts(report, args.model.as_deref())?,
        (None, Some(tokens)) => {
            let model = args
                .model
                .clone()
                .ok_or_else(|| anyhow!("--tokens needs --model"))?;
            (vec![(model, tokens)], 0)
        }
        (None, None) => bail!("pass --report or --tokens"),
    };

    let rows = estimate_rows(
        &config,
        &counts,
        measured_bytes,
        &args.method,
        args.epochs,
        args.target_size,
    )?;
    print!(
        "{}",
        render::estimates_table(&args.method, args.epochs, args.target_size, &rows)
    );
    Ok(())
}

fn report_counts(
    report: &Path,
    model: Option<&str>,
) -> anyhow::Result<(Vec<(String, u64)>, u64)> {
    let record = ReportStore::load(report)?;
    engine_info!(
        "Using measurement of {:?} taken {}",
        record.dataset_name,
        record.measured_utc
    );
    let mut counts = record.accounting.token_counts();
    if let Some(model) = model {
        counts.retain(|(name, _)| name == model);
        if counts.is_empty() {
            bail!("{} has no measurement for {model:?}", report.display());
        }
    }
    Ok((counts, record.accounting.total_bytes))
}

type EstimateRow = (String, Result<DurationEstimate, EstimateError>);

/// Scales the measured counts when a target size is given, then estimates
/// each model independently so one bad entry does not hide the others.
fn estimate_rows(
    config: &BudgetConfig,
    counts: &[(String, u64)],
    measured_bytes: u64,
    method: &str,
    epochs: u32,
    target_bytes: Option<u64>,
) -> anyhow::Result<Vec<EstimateRow>> {
    let counts = match target_bytes {
        Some(target) => scale(counts, measured_bytes, target)
            .context("scaling the measurement to the target size")?,
        None => counts.to_vec(),
    };

    let estimator = DurationEstimator::new(&config.models);
    Ok(counts
        .into_iter()
        .map(|(name, tokens)| {
            let estimate = estimator.estimate(tokens, &name, method, epochs);
            if let Err(err) = &estimate {
                engine_warn!("No estimate for {name:?}: {err}");
            }
            (name, estimate)
        })
        .collect())
}
