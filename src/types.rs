use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as it appears in the storm data export. Everything is read
/// as text and parsed by the loader so bad cells can be counted instead of
/// aborting the whole read.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "BGN_DATE")]
    pub bgn_date: Option<String>,
    #[serde(rename = "EVTYPE")]
    pub evtype: Option<String>,
    #[serde(rename = "FATALITIES")]
    pub fatalities: Option<String>,
    #[serde(rename = "INJURIES")]
    pub injuries: Option<String>,
    #[serde(rename = "PROPDMG")]
    pub propdmg: Option<String>,
    #[serde(rename = "PROPDMGEXP")]
    pub propdmgexp: Option<String>,
    #[serde(rename = "CROPDMG")]
    pub cropdmg: Option<String>,
    #[serde(rename = "CROPDMGEXP")]
    pub cropdmgexp: Option<String>,
}

/// A parsed storm event. Read-only input to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub event_type: String,
    pub fatalities: i64,
    pub injuries: i64,
    pub prop_dmg: f64,
    pub prop_dmg_exp: String,
    pub crop_dmg: f64,
    pub crop_dmg_exp: String,
}

impl RawRecord {
    pub fn new(
        event_type: &str,
        fatalities: i64,
        injuries: i64,
        prop_dmg: f64,
        prop_dmg_exp: &str,
        crop_dmg: f64,
        crop_dmg_exp: &str,
    ) -> Self {
        RawRecord {
            event_type: event_type.to_string(),
            fatalities,
            injuries,
            prop_dmg,
            prop_dmg_exp: prop_dmg_exp.to_string(),
            crop_dmg,
            crop_dmg_exp: crop_dmg_exp.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub event_class: String,
    pub casualties: i64,
    pub damage: f64,
}

/// Per-class totals. Both metrics are always summed; ranking picks one.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub event_class: String,
    pub casualties: i64,
    pub damage: f64,
}

/// Presentation row for one ranked class.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankedRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "EventType")]
    #[tabled(rename = "EventType")]
    pub event_type: String,
    #[serde(rename = "Total")]
    #[tabled(rename = "Total")]
    pub total: String,
    #[serde(skip)]
    #[tabled(rename = "Chart")]
    pub bar: String,
}

#[derive(Debug, Serialize)]
pub struct CasualtyEntry {
    pub event_type: String,
    pub casualties: i64,
}

#[derive(Debug, Serialize)]
pub struct DamageEntry {
    pub event_type: String,
    pub damage: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_classes: usize,
    pub total_casualties: i64,
    pub total_damage: f64,
    pub top_casualties: Vec<CasualtyEntry>,
    pub top_damage: Vec<DamageEntry>,
}
