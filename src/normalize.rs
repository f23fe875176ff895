// Record cleaning: filter, normalize labels and scale codes, classify,
// and decode damage into absolute dollars.
use crate::error::{Result, StormError};
use crate::magnitude::decode_magnitude;
use crate::taxonomy::{ClassCache, OTHER};
use crate::types::{NormalizedRecord, RawRecord};
use crate::util::normalize_whitespace_upper;
use std::str::FromStr;
use tracing::{debug, warn};

/// Scale codes the source uses to flag a magnitude as unknown or estimated.
pub const SENTINEL_SCALE_CODES: [&str; 3] = ["+", "-", "?"];

/// What to do with a record whose scale code is not `H/K/M/B/empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidScalePolicy {
    /// Abort normalization with [`StormError::InvalidScaleCode`].
    #[default]
    Fail,
    /// Exclude the record, log it, and count it in the report.
    Skip,
}

impl FromStr for InvalidScalePolicy {
    type Err = StormError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(InvalidScalePolicy::Fail),
            "skip" => Ok(InvalidScalePolicy::Skip),
            other => Err(StormError::Config(format!(
                "unknown invalid-scale policy '{}' (expected fail or skip)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub input_records: usize,
    pub kept: usize,
    pub dropped_no_impact: usize,
    pub dropped_sentinel: usize,
    pub dropped_invalid_scale: usize,
    /// Records whose fatalities plus injuries do not fit in an `i64`.
    pub dropped_overflow: usize,
    /// Kept records with a negative count or coefficient. These flow
    /// through unchanged.
    pub negative_values: usize,
    pub distinct_labels: usize,
    pub other_records: usize,
}

pub fn normalize_label(label: &str) -> String {
    normalize_whitespace_upper(label)
}

/// Trimmed, uppercased scale code. Empty means "no exponent".
pub fn normalize_scale_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn is_sentinel(code: &str) -> bool {
    SENTINEL_SCALE_CODES.contains(&code)
}

fn has_impact(r: &RawRecord) -> bool {
    r.prop_dmg != 0.0 || r.crop_dmg != 0.0 || r.fatalities != 0 || r.injuries != 0
}

/// Turn raw records into classified, decoded records.
///
/// Output order follows input order among surviving records.
pub fn normalize(
    records: &[RawRecord],
    classes: &mut ClassCache<'_>,
    policy: InvalidScalePolicy,
) -> Result<(Vec<NormalizedRecord>, NormalizeReport)> {
    let mut report = NormalizeReport {
        input_records: records.len(),
        ..Default::default()
    };
    let mut out = Vec::with_capacity(records.len());

    for r in records {
        if !has_impact(r) {
            report.dropped_no_impact += 1;
            continue;
        }
        let prop_exp = normalize_scale_code(&r.prop_dmg_exp);
        let crop_exp = normalize_scale_code(&r.crop_dmg_exp);
        if is_sentinel(&prop_exp) || is_sentinel(&crop_exp) {
            report.dropped_sentinel += 1;
            continue;
        }

        let damage = match decode_damage(r, &prop_exp, &crop_exp) {
            Ok(d) => d,
            Err(StormError::InvalidScaleCode { code }) if policy == InvalidScalePolicy::Skip => {
                warn!(
                    "Skipping '{}' record with unrecognized scale code '{}'",
                    r.event_type.trim(),
                    code
                );
                report.dropped_invalid_scale += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let Some(casualties) = r.fatalities.checked_add(r.injuries) else {
            warn!(
                "Skipping '{}' record: casualty count {} + {} overflows",
                r.event_type.trim(),
                r.fatalities,
                r.injuries
            );
            report.dropped_overflow += 1;
            continue;
        };

        if r.fatalities < 0 || r.injuries < 0 || r.prop_dmg < 0.0 || r.crop_dmg < 0.0 {
            report.negative_values += 1;
        }

        let label = normalize_label(&r.event_type);
        let event_class = classes.classify(&label).to_string();
        if event_class == OTHER {
            report.other_records += 1;
        }

        out.push(NormalizedRecord {
            event_class,
            casualties,
            damage,
        });
    }

    report.kept = out.len();
    report.distinct_labels = classes.distinct_labels();
    if report.negative_values > 0 {
        warn!(
            "{} records carry negative counts or damage; totals include them as-is",
            report.negative_values
        );
    }
    debug!(
        "Label cache: {} hits, {} misses",
        classes.hits(),
        classes.misses()
    );
    Ok((out, report))
}

fn decode_damage(r: &RawRecord, prop_exp: &str, crop_exp: &str) -> Result<f64> {
    Ok(decode_magnitude(r.prop_dmg, prop_exp)? + decode_magnitude(r.crop_dmg, crop_exp)?)
}
