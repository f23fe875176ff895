use crate::error::Result;
use crate::reports::Metric;
use crate::types::{AggregateRow, RankedRow};
use crate::util::{format_int, format_number, text_bar};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 30;

/// Render ranked aggregates for display, with a bar scaled to the leader.
pub fn ranked_rows(rows: &[AggregateRow], metric: Metric) -> Vec<RankedRow> {
    let max = rows.iter().map(|r| metric.value(r)).fold(0.0, f64::max);
    rows.iter()
        .enumerate()
        .map(|(idx, r)| {
            let value = metric.value(r);
            let total = match metric {
                Metric::Casualties => format_int(r.casualties),
                Metric::Damage => format!("${}", format_number(r.damage, 0)),
            };
            RankedRow {
                rank: idx + 1,
                event_type: r.event_class.clone(),
                total,
                bar: text_bar(value, max, BAR_WIDTH),
            }
        })
        .collect()
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T])
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows));
}
