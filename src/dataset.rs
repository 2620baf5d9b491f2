//! CSV ingestion for launch-monitor exports and CSV output of results.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shot::{LabeledShot, ShotMeasurement};
use crate::validation::ReferenceShot;

/// Zero-based column positions of the fields used for fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub total: usize,
    pub speed: usize,
    pub spin: usize,
    pub vla: usize,
}

impl Default for ColumnLayout {
    /// Launch-monitor session export: total, ball speed, spin and VLA at
    /// columns 3, 5, 6 and 8.
    fn default() -> Self {
        Self {
            total: 3,
            speed: 5,
            spin: 6,
            vla: 8,
        }
    }
}

impl ColumnLayout {
    fn min_columns(&self) -> usize {
        [self.total, self.speed, self.spin, self.vla]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Row counts from a lenient load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
}

fn read_without_bom(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

fn parse_field(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    record
        .get(idx)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Load labelled shots from a headered CSV export.
///
/// Short rows, unparsable numbers and malformed records are skipped and
/// counted rather than failing the whole file.
pub fn load_labeled_shots<P: AsRef<Path>>(
    path: P,
    columns: &ColumnLayout,
) -> Result<(Vec<LabeledShot>, LoadStats)> {
    let path = path.as_ref();
    let text = read_without_bom(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let min_columns = columns.min_columns();
    let mut shots = Vec::new();
    let mut stats = LoadStats::default();

    for (i, result) in reader.records().enumerate() {
        stats.rows += 1;
        // header is line 1
        let line = i + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{}:{line}: unreadable row ({e})", path.display());
                stats.skipped += 1;
                continue;
            }
        };
        if record.len() < min_columns {
            log::warn!(
                "{}:{line}: {} columns, need {min_columns}",
                path.display(),
                record.len()
            );
            stats.skipped += 1;
            continue;
        }

        let fields = (
            parse_field(&record, columns.speed),
            parse_field(&record, columns.vla),
            parse_field(&record, columns.spin),
            parse_field(&record, columns.total),
        );
        match fields {
            (Some(speed), Some(vla), Some(spin), Some(total)) => {
                shots.push(LabeledShot::new(speed, vla, spin, total));
                stats.loaded += 1;
            }
            _ => {
                log::warn!("{}:{line}: non-numeric shot fields", path.display());
                stats.skipped += 1;
            }
        }
    }

    log::info!(
        "loaded {} shots from {} ({} skipped)",
        stats.loaded,
        path.display(),
        stats.skipped
    );
    Ok((shots, stats))
}

fn load_records<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let text = read_without_bom(path.as_ref())?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Load measurements from CSV with header
/// `ball_speed,vla,hla,total_spin,spin_axis`. Any bad row is an error.
pub fn load_measurements<P: AsRef<Path>>(path: P) -> Result<Vec<ShotMeasurement>> {
    load_records(path)
}

/// Like [`load_measurements`] with an extra `carry` column (yards)
pub fn load_reference_shots<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceShot>> {
    load_records(path)
}

/// Write flat records as headered CSV
pub fn write_csv<W: Write, T: Serialize>(out: W, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
