use crate::error::{Result, StormError};
use crate::types::{RawRecord, RawRow};
use crate::util::{parse_count, parse_event_year, parse_f64_safe};
use bzip2::read::MultiBzDecoder;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Columns every storm export must carry. `BGN_DATE` is optional.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "EVTYPE",
    "FATALITIES",
    "INJURIES",
    "PROPDMG",
    "PROPDMGEXP",
    "CROPDMG",
    "CROPDMGEXP",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

/// Open a storm export, transparently decompressing `.bz2` files.
pub fn open_source(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    let is_bz2 = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("bz2"))
        .unwrap_or(false);
    if is_bz2 {
        Ok(Box::new(MultiBzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

pub fn load_path(path: &Path) -> Result<(Vec<RawRecord>, LoadReport)> {
    info!("Loading storm data from {}", path.display());
    let (records, report) = load_reader(open_source(path)?)?;
    info!(
        "Loaded {} of {} rows ({} parse errors)",
        report.loaded_rows, report.total_rows, report.parse_errors
    );
    Ok((records, report))
}

/// Read storm rows from any CSV source. Rows that fail to deserialize or
/// carry unparseable numbers are counted and skipped. A header lacking any
/// of [`REQUIRED_COLUMNS`] fails the whole read.
pub fn load_reader<R: Read>(reader: R) -> Result<(Vec<RawRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h.trim() == **col))
    {
        return Err(StormError::MissingColumn(missing.to_string()));
    }
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let Some(record) = to_record(&row) else {
            report.parse_errors += 1;
            continue;
        };

        if let Some(year) = parse_event_year(row.bgn_date.as_deref()) {
            report.first_year = Some(report.first_year.map_or(year, |y| y.min(year)));
            report.last_year = Some(report.last_year.map_or(year, |y| y.max(year)));
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    Ok((records, report))
}

fn to_record(row: &RawRow) -> Option<RawRecord> {
    Some(RawRecord {
        event_type: row.evtype.clone().unwrap_or_default(),
        fatalities: parse_count(row.fatalities.as_deref())?,
        injuries: parse_count(row.injuries.as_deref())?,
        prop_dmg: parse_f64_safe(row.propdmg.as_deref())?,
        prop_dmg_exp: row.propdmgexp.clone().unwrap_or_default(),
        crop_dmg: parse_f64_safe(row.cropdmg.as_deref())?,
        crop_dmg_exp: row.cropdmgexp.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
STATE__,BGN_DATE,EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP
1.00,4/18/1950 0:00:00,TORNADO,0.00,15.00,25.00,K,0.00,
1.00,11/15/2011 0:00:00,TSTM WIND,1.00,0.00,10.00,K,0.00,
1.00,6/1/1996 0:00:00,HAIL,abc,0.00,0.00,,0.00,
";

    #[test]
    fn reads_storm_columns() {
        let (records, report) = load_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(report.first_year, Some(1950));
        assert_eq!(report.last_year, Some(2011));
        assert_eq!(records[0], RawRecord::new("TORNADO", 0, 15, 25.0, "K", 0.0, ""));
        assert_eq!(records[1].event_type, "TSTM WIND");
        assert_eq!(records[1].fatalities, 1);
    }

    #[test]
    fn empty_file_with_header_loads_nothing() {
        let csv = "EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP\n";
        let (records, report) = load_reader(csv.as_bytes()).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.total_rows, 0);
        assert_eq!(report.first_year, None);
    }

    #[test]
    fn header_without_a_required_column_is_fatal() {
        let csv = "STATE,EVT,DEATHS\n1,TORNADO,5\n1,HAIL,0\n";
        match load_reader(csv.as_bytes()) {
            Err(StormError::MissingColumn(col)) => assert_eq!(col, "EVTYPE"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }

        let csv = "FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP\n5,20,1,M,0,\n";
        assert!(matches!(
            load_reader(csv.as_bytes()),
            Err(StormError::MissingColumn(col)) if col == "EVTYPE"
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_path(Path::new("/nonexistent/storm.csv")).is_err());
    }
}
