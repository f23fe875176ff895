use crate::types::{AggregateRow, CasualtyEntry, DamageEntry, NormalizedRecord, SummaryStats};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Casualties,
    Damage,
}

impl Metric {
    pub fn value(self, row: &AggregateRow) -> f64 {
        match self {
            Metric::Casualties => row.casualties as f64,
            Metric::Damage => row.damage,
        }
    }
}

/// Sum both metrics per event class, in first-encountered class order.
/// Casualty sums saturate at the `i64` bounds.
pub fn group_by_class(data: &[NormalizedRecord]) -> Vec<AggregateRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow> = Vec::new();
    for r in data {
        let i = *index.entry(r.event_class.as_str()).or_insert_with(|| {
            rows.push(AggregateRow {
                event_class: r.event_class.clone(),
                casualties: 0,
                damage: 0.0,
            });
            rows.len() - 1
        });
        rows[i].casualties = rows[i].casualties.saturating_add(r.casualties);
        rows[i].damage += r.damage;
    }
    rows
}

/// Sort descending by `metric` and keep the first `top_n`.
///
/// The sort is stable, so equal totals keep their grouping order. Fewer
/// than `top_n` classes yields all of them.
pub fn rank(mut rows: Vec<AggregateRow>, metric: Metric, top_n: usize) -> Vec<AggregateRow> {
    rows.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(Ordering::Equal)
    });
    rows.truncate(top_n);
    rows
}

pub fn aggregate(data: &[NormalizedRecord], metric: Metric, top_n: usize) -> Vec<AggregateRow> {
    rank(group_by_class(data), metric, top_n)
}


pub fn generate_summary(data: &[NormalizedRecord], top_n: usize) -> SummaryStats {
    let grouped = group_by_class(data);
    let total_classes = grouped.len();
    let top_casualties = rank(grouped.clone(), Metric::Casualties, top_n);
    let top_damage = rank(grouped, Metric::Damage, top_n);
    SummaryStats {
        total_records: data.len(),
        total_classes,
        total_casualties: data
            .iter()
            .fold(0i64, |acc, r| acc.saturating_add(r.casualties)),
        total_damage: data.iter().map(|r| r.damage).sum(),
        top_casualties: top_casualties
            .into_iter()
            .map(|r| CasualtyEntry {
                event_type: r.event_class,
                casualties: r.casualties,
            })
            .collect(),
        top_damage: top_damage
            .into_iter()
            .map(|r| DamageEntry {
                event_type: r.event_class,
                damage: r.damage,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(class: &str, casualties: i64, damage: f64) -> NormalizedRecord {
        NormalizedRecord {
            event_class: class.to_string(),
            casualties,
            damage,
        }
    }

    fn classes(rows: &[AggregateRow]) -> Vec<&str> {
        rows.iter().map(|r| r.event_class.as_str()).collect()
    }

    #[test]
    fn groups_in_encounter_order() {
        let data = vec![
            rec("Hail", 1, 10.0),
            rec("Tornado", 2, 20.0),
            rec("Hail", 3, 30.0),
        ];
        let rows = group_by_class(&data);
        assert_eq!(classes(&rows), vec!["Hail", "Tornado"]);
        assert_eq!(rows[0].casualties, 4);
        assert_eq!(rows[0].damage, 40.0);
    }

    #[test]
    fn group_totals_match_record_totals() {
        let data = vec![
            rec("Hail", 1, 10.0),
            rec("Tornado", 20, 5.0),
            rec("Flood", 0, 7.5),
            rec("Hail", 4, 0.5),
            rec("Other", 2, 1.0),
        ];
        let rows = group_by_class(&data);
        let by_rows: i64 = rows.iter().map(|r| r.casualties).sum();
        let by_records: i64 = data.iter().map(|r| r.casualties).sum();
        assert_eq!(by_rows, by_records);
        let dmg_rows: f64 = rows.iter().map(|r| r.damage).sum();
        assert_eq!(dmg_rows, 24.0);
    }

    #[test]
    fn casualty_sums_saturate() {
        let data = vec![rec("Tornado", i64::MAX - 1, 0.0), rec("Tornado", 10, 0.0)];
        let rows = group_by_class(&data);
        assert_eq!(rows[0].casualties, i64::MAX);
    }

    #[test]
    fn ties_keep_encounter_order() {
        let data = vec![
            rec("Hail", 5, 0.0),
            rec("Tornado", 9, 0.0),
            rec("Flood", 5, 0.0),
            rec("Lightning", 5, 0.0),
        ];
        let top = aggregate(&data, Metric::Casualties, 10);
        assert_eq!(classes(&top), vec!["Tornado", "Hail", "Flood", "Lightning"]);
    }

    #[test]
    fn truncates_without_padding() {
        let data = vec![rec("Hail", 1, 1.0), rec("Tornado", 2, 2.0), rec("Flood", 3, 3.0)];
        assert_eq!(aggregate(&data, Metric::Damage, 5).len(), 3);
        assert_eq!(
            classes(&aggregate(&data, Metric::Damage, 2)),
            vec!["Flood", "Tornado"]
        );
    }

    #[test]
    fn metrics_rank_independently() {
        let data = vec![rec("Tornado", 100, 1.0), rec("Flood", 1, 1_000.0)];
        assert_eq!(classes(&aggregate(&data, Metric::Casualties, 1)), vec!["Tornado"]);
        assert_eq!(classes(&aggregate(&data, Metric::Damage, 1)), vec!["Flood"]);
    }

    #[test]
    fn empty_input_gives_empty_ranking() {
        assert!(aggregate(&[], Metric::Casualties, 5).is_empty());
        let summary = generate_summary(&[], 5);
        assert_eq!(summary.total_records, 0);
        assert!(summary.top_damage.is_empty());
    }

    #[test]
    fn summary_carries_both_rankings() {
        let data = vec![rec("Tornado", 25, 1_000_000.0), rec("Thunderstorm Wind", 1, 10_000.0)];
        let s = generate_summary(&data, 5);
        assert_eq!(s.total_classes, 2);
        assert_eq!(s.total_casualties, 26);
        assert_eq!(s.total_damage, 1_010_000.0);
        assert_eq!(s.top_casualties[0].event_type, "Tornado");
        assert_eq!(s.top_damage[1].damage, 10_000.0);
    }

    #[test]
    fn summary_json_keeps_casualties_integral() {
        let data = vec![rec("Tornado", 25, 1_000_000.0)];
        let json = serde_json::to_value(generate_summary(&data, 5)).unwrap();
        assert_eq!(json["total_casualties"], serde_json::json!(25));
        assert_eq!(json["top_casualties"][0]["casualties"], serde_json::json!(25));
        assert!(json["top_casualties"][0]["casualties"].is_i64());
        assert_eq!(json["top_damage"][0]["damage"], serde_json::json!(1_000_000.0));
    }
}
