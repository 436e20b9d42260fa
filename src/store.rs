//! Store module - Flat per-ride record log
//!
//! The file is one header line followed by one `passenger,driver` row per
//! tick:
//!
//! ```text
//! Passenger Heart Rate, Driver Heart Rate
//! 92.4,131.7
//! ```
//!
//! Column 0 is always the passenger and column 1 the driver, for writers and
//! readers alike. Row `n` (0-based, after the header) is tick `n`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MonitorError, Result};
use crate::ride::{Sample, Series};

pub const HEADER: &str = "Passenger Heart Rate, Driver Heart Rate";
const HEADER_FIELDS: [&str; 2] = ["Passenger Heart Rate", "Driver Heart Rate"];

// ============================================================================
// STREAM-LEVEL CODEC
// ============================================================================

pub fn write_series<W: Write>(writer: W, series: &Series) -> Result<()> {
    let mut rows = RowWriter::start(writer, 0)?;
    for sample in series {
        rows.append(sample.driver_bpm, sample.passenger_bpm)?;
    }
    rows.flush()
}

pub fn read_series<R: Read>(reader: R) -> Result<Series> {
    let rows = read_rows(reader)?;
    Ok(rows.into_iter().map(|s| (s.driver_bpm, s.passenger_bpm)).collect())
}

/// Parses header and rows. Any bad row fails the whole read.
fn read_rows<R: Read>(mut reader: R) -> Result<Vec<Sample>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    // 1-based numbers of the non-blank lines. The csv reader skips blank
    // lines, so this maps record `idx` back to its line in the file.
    let lines: Vec<u64> = bytes
        .split(|&b| b == b'\n')
        .zip(1u64..)
        .filter(|(text, _)| !matches!(**text, [] | [b'\r']))
        .map(|(_, n)| n)
        .collect();
    if lines.first() != Some(&1) {
        return Err(MonitorError::MalformedHeader { found: String::new() });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());

    let headers = rdr
        .headers()
        .map_err(|e| MonitorError::MalformedHeader { found: e.to_string() })?;
    if headers.iter().ne(HEADER_FIELDS.iter().copied()) {
        return Err(MonitorError::MalformedHeader {
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut samples = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // Rows are contiguous from line 2, so a jump is a blank row.
        let expected = idx as u64 + 2;
        let line = lines.get(idx + 1).copied().unwrap_or(expected);
        if line > expected {
            return Err(MonitorError::MalformedRecord { line: expected, reason: "empty row".to_string() });
        }
        let record = result.map_err(|e| MonitorError::MalformedRecord { line, reason: e.to_string() })?;
        if record.len() != 2 {
            return Err(MonitorError::MalformedRecord {
                line,
                reason: format!("expected 2 columns, found {}", record.len()),
            });
        }
        let passenger_bpm = parse_bpm(&record[0], line)?;
        let driver_bpm = parse_bpm(&record[1], line)?;
        samples.push(Sample::new(idx as u64, driver_bpm, passenger_bpm));
    }
    Ok(samples)
}

fn parse_bpm(field: &str, line: u64) -> Result<f64> {
    let value: f64 = field.parse().map_err(|_| MonitorError::MalformedRecord {
        line,
        reason: format!("{field:?} is not a number"),
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(MonitorError::MalformedRecord {
            line,
            reason: format!("{value} is not a positive finite BPM"),
        });
    }
    Ok(value)
}

// ============================================================================
// ROW WRITER - Append rows one tick at a time
// ============================================================================

pub struct RowWriter<W: Write> {
    inner: csv::Writer<W>,
    next_tick: u64,
}

impl<W: Write> RowWriter<W> {
    /// Writes the header, then hands out a writer for rows.
    fn start(mut writer: W, next_tick: u64) -> Result<Self> {
        writeln!(writer, "{HEADER}")?;
        Ok(Self::resume(writer, next_tick))
    }

    fn resume(writer: W, next_tick: u64) -> Self {
        let inner = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        Self { inner, next_tick }
    }

    /// Writes one row in passenger, driver order and returns its tick.
    pub fn append(&mut self, driver_bpm: f64, passenger_bpm: f64) -> Result<u64> {
        self.inner
            .serialize((passenger_bpm, driver_bpm))
            .map_err(io::Error::from)?;
        let tick = self.next_tick;
        self.next_tick += 1;
        Ok(tick)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

// ============================================================================
// SERIES STORE - File-backed log
// ============================================================================

#[derive(Debug, Clone)]
pub struct SeriesStore {
    path: PathBuf,
}

impl SeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file with the whole series.
    pub fn save(&self, series: &Series) -> Result<()> {
        let file = File::create(&self.path)?;
        write_series(BufWriter::new(file), series)?;
        info!(path = %self.path.display(), samples = series.len(), "heart rate data saved");
        Ok(())
    }

    /// Truncates the file, writes the header and returns a row appender.
    pub fn create(&self) -> Result<RowWriter<BufWriter<File>>> {
        let file = File::create(&self.path)?;
        let mut rows = RowWriter::start(BufWriter::new(file), 0)?;
        rows.flush()?;
        Ok(rows)
    }

    /// Opens an existing log for appending after its last row.
    pub fn open_append(&self) -> Result<RowWriter<BufWriter<File>>> {
        let existing = self.load()?.len() as u64;
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| self.missing(source))?;
        Ok(RowWriter::resume(BufWriter::new(file), existing))
    }

    pub fn load(&self) -> Result<Series> {
        let file = File::open(&self.path).map_err(|source| self.missing(source))?;
        let series = read_series(io::BufReader::new(file))?;
        debug!(path = %self.path.display(), samples = series.len(), "heart rate data loaded");
        Ok(series)
    }

    /// Every fully written row, for a file another process may still be
    /// appending to.
    pub fn load_complete(&self) -> Result<Series> {
        let rows = self.load_since(0)?;
        Ok(rows.into_iter().map(|s| (s.driver_bpm, s.passenger_bpm)).collect())
    }

    /// Rows after the first `seen`, ignoring a trailing row that has no line
    /// terminator yet (a writer may be mid-row).
    pub fn load_since(&self, seen: usize) -> Result<Vec<Sample>> {
        let mut contents = String::new();
        File::open(&self.path)
            .map_err(|source| self.missing(source))?
            .read_to_string(&mut contents)?;

        let complete = match contents.rfind('\n') {
            Some(end) => &contents[..=end],
            None => "",
        };
        if complete.is_empty() {
            // Header not fully written yet.
            return Ok(Vec::new());
        }

        let rows = read_rows(complete.as_bytes())?;
        Ok(rows.into_iter().skip(seen).collect())
    }

    fn missing(&self, source: io::Error) -> MonitorError {
        MonitorError::MissingRecordFile { path: self.path.clone(), source }
    }
}
