//! CSV ingest and normalization.
//!
//! This module turns the price/event table into a clean, date-ordered
//! `Dataset` that the rest of the pipeline can trust.
//!
//! Design goals:
//! - **Strict schema** for the three required columns (clear errors + exit code 2)
//! - **Fail fast**: one malformed row rejects the file; nothing downstream runs
//! - **Deterministic behavior**: stable sort, vocabulary in chronological order

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::{BASELINE_LABEL, DatasetStats, EventVocabulary, PriceObservation, RawRow};

const DATE_ALIASES: [&str; 3] = ["date", "data", "ds"];
const PRICE_ALIASES: [&str; 4] = ["price", "preço", "preco", "y"];
const EVENT_ALIASES: [&str; 2] = ["event", "evento"];

/// Why the data file could not be turned into a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read header row: {0}")]
    Header(String),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("duplicate date {date} (lines {first_line} and {second_line})")]
    DuplicateDate {
        date: NaiveDate,
        first_line: usize,
        second_line: usize,
    },

    #[error("file contains no data rows")]
    Empty,
}

/// The session's immutable table: observations sorted by date plus their vocabulary.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub observations: Vec<PriceObservation>,
    pub vocabulary: EventVocabulary,
    pub stats: DatasetStats,
}

impl Dataset {
    /// Sort rows by date, reject duplicate dates, and resolve the label vocabulary.
    pub fn from_rows(mut rows: Vec<RawRow>) -> Result<Self, LoadError> {
        if rows.is_empty() {
            return Err(LoadError::Empty);
        }

        // Stable sort keeps file order for equal dates, so the duplicate report
        // names the lines in the order they appear.
        rows.sort_by_key(|r| r.date);
        for pair in rows.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(LoadError::DuplicateDate {
                    date: pair[0].date,
                    first_line: pair[0].line,
                    second_line: pair[1].line,
                });
            }
        }

        let mut vocabulary = EventVocabulary::default();
        let observations: Vec<PriceObservation> = rows
            .into_iter()
            .map(|r| PriceObservation {
                date: r.date,
                price: r.price,
                event: vocabulary.intern(&r.label),
            })
            .collect();

        let stats = compute_stats(&observations).ok_or(LoadError::Empty)?;

        Ok(Self {
            observations,
            vocabulary,
            stats,
        })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Load the price/event CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let dataset = read_dataset(file)?;
    tracing::info!(
        path = %path.display(),
        rows = dataset.len(),
        events = dataset.vocabulary.len(),
        "loaded price history"
    );
    Ok(dataset)
}

/// Parse a price/event table from any reader (used by `load_dataset` and tests).
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Header(e.to_string()))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because records start after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| LoadError::Malformed {
            line,
            message: format!("CSV parse error: {e}"),
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row = parse_row(&record, &columns, line)
            .map_err(|message| LoadError::Malformed { line, message })?;
        rows.push(row);
    }

    Dataset::from_rows(rows)
}

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    price: usize,
    event: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let header_map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let find = |aliases: &[&str], column: &'static str| {
            aliases
                .iter()
                .find_map(|a| header_map.get(*a).copied())
                .ok_or(LoadError::MissingColumn(column))
        };

        Ok(Self {
            date: find(&DATE_ALIASES, "date")?,
            price: find(&PRICE_ALIASES, "price")?,
            event: find(&EVENT_ALIASES, "event")?,
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns, line: usize) -> Result<RawRow, String> {
    let date_raw = get_required(record, columns.date, "date")?;
    let price_raw = get_required(record, columns.price, "price")?;
    let label = record
        .get(columns.event)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(BASELINE_LABEL);

    Ok(RawRow {
        line,
        date: parse_date(date_raw)?,
        price: parse_price(price_raw)?,
        label: label.to_string(),
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Spreadsheet exports of datetime columns carry a midnight time component.
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_price(s: &str) -> Result<f64, String> {
    let normalized = if s.contains('.') {
        s.to_string()
    } else {
        s.replace(',', ".")
    };
    let v = normalized
        .parse::<f64>()
        .map_err(|_| format!("Invalid price '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite price '{s}'."))
    }
}

fn compute_stats(observations: &[PriceObservation]) -> Option<DatasetStats> {
    let first = observations.first()?;
    let last = observations.last()?;
    let (mut price_min, mut price_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for o in observations {
        price_min = price_min.min(o.price);
        price_max = price_max.max(o.price);
    }
    Some(DatasetStats {
        n_rows: observations.len(),
        first_date: first.date,
        last_date: last.date,
        price_min,
        price_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventId;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn load_sorts_rows_and_resolves_vocabulary() {
        let csv = "Data,Preço,Evento\n\
                   2024-01-03,81.0,B\n\
                   2024-01-01,80.0,A\n\
                   2024-01-02,82.0,A\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();

        let dates: Vec<NaiveDate> = ds.observations.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));

        // Vocabulary follows chronological first appearance, not file order.
        assert_eq!(ds.vocabulary.labels(), ["A", "B"]);
        assert_eq!(ds.observations[2].event, EventId(1));
        assert_eq!(ds.stats.price_min, 80.0);
        assert_eq!(ds.stats.price_max, 82.0);
    }

    #[test]
    fn english_headers_bom_and_datetime_suffix_are_accepted() {
        let csv = "\u{feff}Date,Price,Event\n2020-04-21 00:00:00,\"19,33\",COVID-19\n2020-04-22,20.37,\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert!((ds.observations[0].price - 19.33).abs() < 1e-12);
        assert_eq!(ds.vocabulary.label(ds.observations[1].event), BASELINE_LABEL);
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let csv = "date,price,event\n2024-01-01,80,A\n2024-01-01,81,A\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateDate { first_line: 2, second_line: 3, .. }
        ));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "date,event\n2024-01-01,A\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("price")));
    }

    #[test]
    fn malformed_row_fails_the_whole_load() {
        let csv = "date,price,event\n2024-01-01,80,A\n2024-13-45,81,A\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 3, .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = read_dataset("date,price,event\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }

    #[test]
    fn load_dataset_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brent.csv");
        std::fs::write(&path, "date,price,event\n02/01/2024,79.5,A\n01/01/2024,80,A\n").unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.stats.first_date, ymd(2024, 1, 1));
        assert_eq!(ds.stats.last_date, ymd(2024, 1, 2));
    }
}
