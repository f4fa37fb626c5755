//! btp-ingest
//!
//! Reads student and faculty preference sheets (CSV) into the records the
//! allocator consumes, and reports what was dropped on the way in.
//!
//! This crate does **not** allocate or export; callers (CLI) hand the parsed
//! values to `btp-alloc` and the results to `btp-artifacts`.

pub mod cross_check;
pub mod sheet;

use serde::Serialize;

pub use cross_check::{cross_check, CrossCheck};
pub use sheet::{
    parse_faculty_file, parse_faculty_reader, parse_faculty_str, parse_students_file,
    parse_students_reader, parse_students_str, FacultySheet, IngestError, StudentSheet,
};

/// Row-level accounting for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows turned into a record.
    pub rows_ok: usize,
    pub rows_skipped_blank_id: usize,
    /// Ids seen on more than one row, in the order the repeat was met.
    pub duplicate_ids: Vec<String>,
    /// Blank choice cells dropped across all rows.
    pub blank_cells_dropped: usize,
}
