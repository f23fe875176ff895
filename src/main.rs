// Entry point: load the storm export, clean and classify it, then write
// the casualty and damage rankings.
//
// One batch pass per run. Outputs land in `--out-dir`:
// - top_casualties.csv, top_damage.csv
// - summary.json
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use storm_report::cache::SourceCache;
use storm_report::config::{Args, Config, Source};
use storm_report::normalize::normalize;
use storm_report::reports::{generate_summary, rank, group_by_class, Metric};
use storm_report::taxonomy::{ClassCache, Taxonomy};
use storm_report::util::{format_int, format_number};
use storm_report::{loader, output};
use tracing::{info, warn};

fn resolve_source(config: &Config) -> Result<PathBuf> {
    match &config.source {
        Source::File(path) => Ok(path.clone()),
        Source::Url(url) => SourceCache::new(&config.cache_dir, config.cache_ttl)
            .fetch(url)
            .with_context(|| format!("Failed to fetch {}", url)),
    }
}

fn load_taxonomy(config: &Config) -> Result<Taxonomy> {
    match &config.rules {
        Some(path) => {
            let t = Taxonomy::from_csv_path(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?;
            info!("Loaded {} taxonomy rules from {}", t.rules().len(), path.display());
            Ok(t)
        }
        None => Ok(Taxonomy::builtin().clone()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storm_report=info")),
        )
        .init();

    let config = Config::from_args(Args::parse())?;
    let path = resolve_source(&config)?;
    let taxonomy = load_taxonomy(&config)?;

    let (raw, load_report) = loader::load_path(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    println!(
        "Processing dataset... ({} rows loaded, {} skipped due to parse errors)",
        format_int(load_report.loaded_rows),
        format_int(load_report.parse_errors)
    );
    if let (Some(first), Some(last)) = (load_report.first_year, load_report.last_year) {
        println!("Events span {}–{}.", first, last);
    }

    let mut classes = ClassCache::new(&taxonomy);
    let (clean, norm_report) = normalize(&raw, &mut classes, config.invalid_scale)
        .context("Failed to normalize records")?;
    println!(
        "{} records kept ({} without impact, {} with unknown/estimated magnitude, {} with unrecognized scale code, {} with overflowing counts).",
        format_int(norm_report.kept),
        format_int(norm_report.dropped_no_impact),
        format_int(norm_report.dropped_sentinel),
        format_int(norm_report.dropped_invalid_scale),
        format_int(norm_report.dropped_overflow)
    );
    println!(
        "{} distinct labels; {} records classified as Other.",
        format_int(norm_report.distinct_labels),
        format_int(norm_report.other_records)
    );
    let unmatched = classes.unmatched_labels();
    if !unmatched.is_empty() {
        info!("{} labels matched no rule", unmatched.len());
    }

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create {}", config.out_dir.display()))?;

    let grouped = group_by_class(&clean);
    let rankings = [
        (
            Metric::Casualties,
            "top_casualties.csv",
            "Most Harmful Event Types to Population Health",
            "Fatalities + Injuries",
        ),
        (
            Metric::Damage,
            "top_damage.csv",
            "Event Types with the Greatest Economic Consequences",
            "Property + Crop Damage, USD",
        ),
    ];
    for (metric, file, title, note) in rankings {
        let top = rank(grouped.clone(), metric, config.top_n);
        let rows = output::ranked_rows(&top, metric);
        let out = config.out_dir.join(file);
        if let Err(e) = output::write_csv(&out, &rows) {
            warn!("Write error for {}: {}", out.display(), e);
        }
        output::preview_table(title, Some(note), &rows);
        println!("(Full table exported to {})", out.display());
    }

    let summary = generate_summary(&clean, config.top_n);
    let summary_path = config.out_dir.join("summary.json");
    if let Err(e) = output::write_json(&summary_path, &summary) {
        warn!("Write error for {}: {}", summary_path.display(), e);
    }
    println!(
        "\nTotals: {} casualties, ${} damage across {} event classes.",
        format_int(summary.total_casualties),
        format_number(summary.total_damage, 0),
        summary.total_classes
    );
    Ok(())
}
