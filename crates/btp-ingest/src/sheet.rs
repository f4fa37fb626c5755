//! CSV ingestion for preference sheets.
//!
//! Converts the two tabular inputs into allocator records:
//! - student sheet -> `Vec<StudentRecord>` in row order
//! - faculty sheet -> `FacultyPreferences` + `FacultyOrder` (row order)
//!
//! ## Sheet layout
//!
//! | column | content                                          |
//! |--------|--------------------------------------------------|
//! | 1      | identifier (student or faculty)                  |
//! | 2..n   | ranked choices, most preferred first             |
//!
//! The first row is a header and its names are not interpreted. Rows may be
//! ragged. Cells are trimmed and blank cells are dropped rather than kept as
//! placeholders, so `S1,F1,,F3` ranks `[F1, F3]`. A row whose identifier is
//! blank is skipped and counted.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use btp_alloc::{FacultyOrder, FacultyPreferences, StudentRecord};
use tracing::warn;

use crate::IngestReport;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while reading a preference sheet.
#[derive(Debug)]
pub enum IngestError {
    /// The file could not be opened.
    Io { path: String, msg: String },
    /// The CSV reader rejected a record.
    Csv { row: Option<u64>, msg: String },
    /// No header row at all.
    Empty,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io { path, msg } => write!(f, "cannot open '{path}': {msg}"),
            IngestError::Csv { row: Some(row), msg } => write!(f, "csv row {row}: {msg}"),
            IngestError::Csv { row: None, msg } => write!(f, "csv error: {msg}"),
            IngestError::Empty => write!(f, "sheet is empty (no header row)"),
        }
    }
}

impl std::error::Error for IngestError {}

fn csv_err(e: csv::Error) -> IngestError {
    IngestError::Csv {
        row: e.position().map(|p| p.line()),
        msg: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parsed sheets
// ---------------------------------------------------------------------------

/// Student sheet as read.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSheet {
    pub students: Vec<StudentRecord>,
    pub report: IngestReport,
}

/// Faculty sheet as read.
#[derive(Debug, Clone, PartialEq)]
pub struct FacultySheet {
    pub preferences: FacultyPreferences,
    pub order: FacultyOrder,
    pub report: IngestReport,
}

/// One non-header row: identifier plus its non-blank choices.
struct SheetRow {
    id: String,
    choices: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a student sheet from `path`.
pub fn parse_students_file(path: &Path) -> Result<StudentSheet, IngestError> {
    parse_students_reader(open(path)?)
}

/// Read a student sheet from in-memory CSV text.
pub fn parse_students_str(src: &str) -> Result<StudentSheet, IngestError> {
    parse_students_reader(src.as_bytes())
}

/// Read a faculty sheet from `path`.
pub fn parse_faculty_file(path: &Path) -> Result<FacultySheet, IngestError> {
    parse_faculty_reader(open(path)?)
}

/// Read a faculty sheet from in-memory CSV text.
pub fn parse_faculty_str(src: &str) -> Result<FacultySheet, IngestError> {
    parse_faculty_reader(src.as_bytes())
}

/// Student rows become records in row order.
///
/// A repeated student id keeps every row (each is a separate candidate for
/// the allocator) and is listed in `report.duplicate_ids`.
pub fn parse_students_reader<R: Read>(rdr: R) -> Result<StudentSheet, IngestError> {
    let mut report = IngestReport::default();
    let rows = read_rows(rdr, &mut report)?;

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut students = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id.clone()) {
            warn!(student = %row.id, "duplicate student id in sheet");
            report.duplicate_ids.push(row.id.clone());
        }
        students.push(StudentRecord::new(row.id, row.choices));
    }

    Ok(StudentSheet { students, report })
}

/// Faculty rows become wish-lists plus the row order.
///
/// A repeated faculty id: the later row's wish-list replaces the earlier one,
/// the id keeps its first position in `order`, and it is listed in
/// `report.duplicate_ids`.
pub fn parse_faculty_reader<R: Read>(rdr: R) -> Result<FacultySheet, IngestError> {
    let mut report = IngestReport::default();
    let rows = read_rows(rdr, &mut report)?;

    let mut preferences = FacultyPreferences::new();
    let mut order = FacultyOrder::new();
    for row in rows {
        if preferences.insert(row.id.clone(), row.choices).is_some() {
            warn!(faculty = %row.id, "duplicate faculty id in sheet; later row wins");
            report.duplicate_ids.push(row.id);
        } else {
            order.push(row.id);
        }
    }

    Ok(FacultySheet {
        preferences,
        order,
        report,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        msg: e.to_string(),
    })
}

fn read_rows<R: Read>(rdr: R, report: &mut IngestReport) -> Result<Vec<SheetRow>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    if rdr.headers().map_err(csv_err)?.is_empty() {
        return Err(IngestError::Empty);
    }

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(csv_err)?;
        report.rows_read += 1;

        let mut cells = rec.iter();
        let id = cells.next().unwrap_or("").to_string();
        if id.is_empty() {
            report.rows_skipped_blank_id += 1;
            continue;
        }

        let mut choices = Vec::new();
        for cell in cells {
            if cell.is_empty() {
                report.blank_cells_dropped += 1;
            } else {
                choices.push(cell.to_string());
            }
        }

        report.rows_ok += 1;
        out.push(SheetRow { id, choices });
    }

    if report.rows_skipped_blank_id > 0 {
        warn!(
            skipped = report.rows_skipped_blank_id,
            "rows with blank identifier skipped"
        );
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_students_str(""), Err(IngestError::Empty)));
        assert!(matches!(parse_faculty_str(""), Err(IngestError::Empty)));
    }

    #[test]
    fn header_only_returns_nothing() {
        let sheet = parse_students_str("Student,Choice 1,Choice 2\n").unwrap();
        assert!(sheet.students.is_empty());
        assert_eq!(sheet.report.rows_read, 0);
    }

    #[test]
    fn students_keep_row_order_and_drop_blank_cells() {
        let csv = "Roll,P1,P2,P3\nS2,F1,,F3\nS1, F2 ,F1,\n";
        let sheet = parse_students_str(csv).unwrap();
        assert_eq!(
            sheet.students,
            vec![
                StudentRecord::new("S2", ["F1", "F3"]),
                StudentRecord::new("S1", ["F2", "F1"]),
            ]
        );
        assert_eq!(sheet.report.rows_read, 2);
        assert_eq!(sheet.report.rows_ok, 2);
        assert_eq!(sheet.report.blank_cells_dropped, 2);
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let csv = "Roll,P1\nS1,F1,F2,F3\nS2\n";
        let sheet = parse_students_str(csv).unwrap();
        assert_eq!(sheet.students[0].preferences.len(), 3);
        assert!(sheet.students[1].preferences.is_empty());
    }

    #[test]
    fn blank_identifier_rows_are_skipped() {
        let csv = "Roll,P1\n,F1\nS1,F1\n";
        let sheet = parse_students_str(csv).unwrap();
        assert_eq!(sheet.students.len(), 1);
        assert_eq!(sheet.report.rows_skipped_blank_id, 1);
        assert_eq!(sheet.report.rows_ok, 1);
    }

    #[test]
    fn duplicate_students_are_kept_and_reported() {
        let csv = "Roll,P1\nS1,F1\nS1,F2\n";
        let sheet = parse_students_str(csv).unwrap();
        assert_eq!(sheet.students.len(), 2);
        assert_eq!(sheet.report.duplicate_ids, vec!["S1".to_string()]);
    }

    #[test]
    fn faculty_order_follows_rows() {
        let csv = "Faculty,R1,R2\nZed,S1,S2\nAmy,S2\n";
        let sheet = parse_faculty_str(csv).unwrap();
        assert_eq!(sheet.order, vec!["Zed".to_string(), "Amy".to_string()]);
        assert_eq!(sheet.preferences["Zed"], vec!["S1".to_string(), "S2".to_string()]);
        assert_eq!(sheet.preferences["Amy"], vec!["S2".to_string()]);
    }

    #[test]
    fn duplicate_faculty_later_row_wins_first_position_kept() {
        let csv = "Faculty,R1\nF1,S1\nF2,S2\nF1,S3\n";
        let sheet = parse_faculty_str(csv).unwrap();
        assert_eq!(sheet.order, vec!["F1".to_string(), "F2".to_string()]);
        assert_eq!(sheet.preferences["F1"], vec!["S3".to_string()]);
        assert_eq!(sheet.report.duplicate_ids, vec!["F1".to_string()]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_students_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("here.csv"));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faculty.csv");
        std::fs::write(&path, "Faculty,R1\nF1,S1\n").unwrap();
        let sheet = parse_faculty_file(&path).unwrap();
        assert_eq!(sheet.order, vec!["F1".to_string()]);
    }
}
