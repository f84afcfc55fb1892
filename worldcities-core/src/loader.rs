use std::path::{Path, PathBuf};
use std::time::Instant;

use calamine::{open_workbook_auto, Reader};
use thiserror::Error;
use tracing::{info, warn};

use crate::location::{Location, RowParseError};
use crate::locations_db::LocationsDb;

pub const DEFAULT_SHEET: &str = "Sheet1";

const WORKBOOK_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xla", "xls", "ods"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open workbook {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("cannot read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: RowParseError,
    },
    #[error("unsupported data file format: {0:?}")]
    UnsupportedFormat(PathBuf),
}

/// What to do with a row that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Log the row and keep going.
    #[default]
    Lenient,
    /// Abort the load on the first bad row.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

/// Reads `[_, city, latitude, longitude, country]` rows from a workbook
/// sheet or a CSV file. The first row is a header and is always skipped.
pub fn parse_data_file(
    path: &Path,
    sheet: &str,
    policy: LoadPolicy,
) -> Result<LocationsDb, LoadError> {
    let start_time = Instant::now();
    info!("Reading data file {path:?}");
    let (db, stats) = match extension(path).as_deref() {
        Some("csv") => load_csv(path, policy)?,
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => load_workbook(path, sheet, policy)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };
    info!(
        "Loaded {} locations ({} rows skipped) in {:.2?}",
        stats.loaded,
        stats.skipped,
        start_time.elapsed()
    );
    Ok(db.mk_autocomplete())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn load_workbook(
    path: &Path,
    sheet: &str,
    policy: LoadPolicy,
) -> Result<(LocationsDb, LoadStats), LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|source| LoadError::Sheet {
            sheet: sheet.to_string(),
            source,
        })?;
    // `rows()` starts at the first used cell; pad back to A1 so column
    // positions and row numbers match the sheet.
    let (row0, col0) = range.start().unwrap_or((0, 0));
    let rows = range.rows().enumerate().map(|(idx, row)| {
        let cells = std::iter::repeat(String::new())
            .take(col0 as usize)
            .chain(row.iter().map(|cell| cell.to_string()))
            .collect::<Vec<_>>();
        (row0 as usize + idx, Ok(cells))
    });
    ingest_rows(rows, policy)
}

fn load_csv(path: &Path, policy: LoadPolicy) -> Result<(LocationsDb, LoadStats), LoadError> {
    // Header handling is left to `ingest_rows` so both sources count rows alike.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let rows = reader.records().enumerate().map(|(idx, record)| {
        let cells = record
            .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
            .map_err(LoadError::from);
        (idx, cells)
    });
    ingest_rows(rows, policy)
}

/// Consumes `(zero-based row, cells)` pairs. Row 0 is the header.
fn ingest_rows<I>(rows: I, policy: LoadPolicy) -> Result<(LocationsDb, LoadStats), LoadError>
where
    I: Iterator<Item = (usize, Result<Vec<String>, LoadError>)>,
{
    let mut db = LocationsDb::default();
    let mut stats = LoadStats::default();
    for (idx, row) in rows.filter(|(idx, _)| *idx > 0) {
        let line = idx + 1;
        let cells = match (row, policy) {
            (Ok(cells), _) => cells,
            (Err(err), LoadPolicy::Strict) => return Err(err),
            (Err(err), LoadPolicy::Lenient) => {
                warn!("Skipping unreadable record at row {line}: {err}");
                stats.skipped += 1;
                continue;
            }
        };
        match (Location::from_row(&cells), policy) {
            (Ok(loc), _) => {
                db.insert(loc);
                stats.loaded += 1;
            }
            (Err(source), LoadPolicy::Strict) => return Err(LoadError::Row { row: line, source }),
            (Err(err), LoadPolicy::Lenient) => {
                warn!("Skipping row {line}: {err}");
                stats.skipped += 1;
            }
        }
    }
    Ok((db, stats))
}
