//! Flat CSV history file with atomic replacement.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{record::CalculationRecord, types::Operation};

use super::{CorruptRow, HistorySink, LoadOutcome, PersistError, PersistResult};

/// Required first line of every history file.
pub const HEADER: &str = "operation,operand_a,operand_b,result,timestamp";
const COLUMNS: usize = 5;

/// [`HistorySink`] backed by one CSV file.
#[derive(Debug, Clone)]
pub struct CsvHistoryFile {
    path: PathBuf,
}

impl CsvHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for CsvHistoryFile {
    fn save(&mut self, records: &[CalculationRecord]) -> PersistResult<()> {
        save(records, &self.path)
    }

    fn load(&self) -> PersistResult<LoadOutcome> {
        load(&self.path)
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Writes `records` to `path`, replacing any previous content atomically.
///
/// Rows go to a sibling temp file which is synced and then renamed over the
/// target, so readers see either the old file or the new one.
pub fn save(records: &[CalculationRecord], path: &Path) -> PersistResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let written = write_rows(records, &tmp);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }

    log::debug!("saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Reads the history file at `path`.
///
/// A missing file is not an error. Rows that fail to parse are skipped and
/// reported alongside the valid records in [`LoadOutcome::Loaded`].
pub fn load(path: &Path) -> PersistResult<LoadOutcome> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no history file at {}, starting empty", path.display());
            return Ok(LoadOutcome::Missing);
        }
        Err(err) => return Err(err.into()),
    };

    // Each line decodes on its own; invalid UTF-8 marks only that row corrupt.
    let mut lines = bytes
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(idx, raw)| {
            let decoded = std::str::from_utf8(raw).map(|line| line.trim_end_matches('\r'));
            (idx + 1, raw, decoded)
        })
        .filter(|(_, _, line)| !matches!(line, Ok(text) if text.trim().is_empty()));

    let Some((_, raw_header, header)) = lines.next() else {
        return Ok(LoadOutcome::Loaded {
            records: Vec::new(),
            corrupt: Vec::new(),
        });
    };
    match header {
        Ok(header) if header.trim().trim_start_matches('\u{feff}') == HEADER => {}
        _ => {
            return Err(PersistError::InvalidHeader {
                found: String::from_utf8_lossy(raw_header).trim_end().to_string(),
            });
        }
    }

    let mut records = Vec::new();
    let mut corrupt = Vec::new();
    for (line, _, row) in lines {
        let parsed = row
            .map_err(|e| format!("row is not valid UTF-8: {e}"))
            .and_then(parse_row);
        match parsed {
            Ok(rec) => records.push(rec),
            Err(reason) => {
                let bad = CorruptRow { line, reason };
                log::warn!("{}: skipping {bad}", path.display());
                corrupt.push(bad);
            }
        }
    }

    log::info!(
        "loaded {} records from {} ({} skipped)",
        records.len(),
        path.display(),
        corrupt.len()
    );
    Ok(LoadOutcome::Loaded { records, corrupt })
}

/// Renders one record as a CSV row, without line terminator.
pub fn format_row(rec: &CalculationRecord) -> String {
    let operand_b = rec.operand_b().map(|b| b.to_string()).unwrap_or_default();
    format!(
        "{},{},{},{},{}",
        rec.operation(),
        rec.operand_a(),
        operand_b,
        rec.result(),
        rec.timestamp().to_rfc3339_opts(SecondsFormat::AutoSi, true)
    )
}

/// Parses one CSV row into a record.
pub fn parse_row(row: &str) -> Result<CalculationRecord, String> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(format!("expected {COLUMNS} columns, found {}", fields.len()));
    }

    let operation: Operation = fields[0].parse().map_err(|e| format!("{e}"))?;
    let operand_a = parse_number("operand_a", fields[1])?;
    let operand_b = match fields[2] {
        "" => None,
        raw => Some(parse_number("operand_b", raw)?),
    };
    let arity_ok = operation.arity().accepts(1 + usize::from(operand_b.is_some()));
    if !arity_ok {
        return Err(format!(
            "{operation} takes {}",
            operation.arity().describe()
        ));
    }
    let result = parse_number("result", fields[3])?;
    let timestamp = DateTime::parse_from_rfc3339(fields[4])
        .map_err(|e| format!("bad timestamp '{}': {e}", fields[4]))?
        .with_timezone(&Utc);

    Ok(CalculationRecord::new(operation, operand_a, operand_b, result, timestamp))
}

fn parse_number(column: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{column} '{raw}' is not a finite number"))
}

fn write_rows(records: &[CalculationRecord], tmp: &Path) -> PersistResult<()> {
    let file = File::create(tmp)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{HEADER}")?;
    for rec in records {
        writeln!(out, "{}", format_row(rec))?;
    }
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
