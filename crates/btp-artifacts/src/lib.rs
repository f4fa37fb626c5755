use anyhow::{Context, Result};
use btp_alloc::{
    AllocationOutcome, AllocationParams, AllocationState, FacultyId, Placement, StudentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ALLOCATIONS_HEADER: [&str; 2] = ["Faculty", "Students"];
pub const UNALLOCATED_HEADER: &str = "Unallocated Students";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub config_hash: String,
    pub inputs: InputList,
    pub params: ParamsJson,
    pub summary: SummaryJson,
    pub artifacts: ArtifactList,
    /// Every acceptance in commit order.
    pub placements: Vec<PlacementJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputList {
    pub students_path: String,
    pub faculty_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamsJson {
    pub max_capacity: usize,
    pub max_rounds: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryJson {
    pub students: usize,
    pub allocated: usize,
    pub unallocated: usize,
    pub faculties: usize,
    pub faculties_at_capacity: usize,
    pub rounds_executed: usize,
    pub placements_per_round: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementJson {
    pub student: String,
    pub faculty: String,
    pub round: usize,
}

impl From<&Placement> for PlacementJson {
    fn from(p: &Placement) -> Self {
        Self {
            student: p.student.clone(),
            faculty: p.faculty.clone(),
            round: p.round,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactList {
    pub allocations_csv: String,
    pub unallocated_csv: String,
    pub manifest_json: String,
}

pub struct WriteRunArtifactsArgs<'a> {
    pub out_dir: &'a Path,
    pub schema_version: i32,
    pub run_id: Uuid,
    pub config_hash: &'a str,
    pub students_path: &'a str,
    pub faculty_path: &'a str,
    pub params: &'a AllocationParams,
    pub outcome: &'a AllocationOutcome,
    /// Row order of the allocations table.
    pub faculty_order: &'a [FacultyId],
    pub delimiter: &'a str,
    pub allocations_file: &'a str,
    pub unallocated_file: &'a str,
    pub manifest_file: &'a str,
}

#[derive(Debug)]
pub struct WriteRunArtifactsResult {
    pub allocations_path: PathBuf,
    pub unallocated_path: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: RunManifest,
}

/// One row per faculty in `faculty_order`; students joined by `delimiter`.
///
/// A faculty with no students, or missing from `allocation`, gets an empty
/// cell.
pub fn render_allocations_csv(
    allocation: &AllocationState,
    faculty_order: &[FacultyId],
    delimiter: &str,
) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(ALLOCATIONS_HEADER)
        .context("write allocations header failed")?;
    for faculty in faculty_order {
        let joined = allocation
            .students_for(faculty)
            .map(|list| list.join(delimiter))
            .unwrap_or_default();
        w.write_record([faculty.as_str(), joined.as_str()])
            .with_context(|| format!("write allocations row failed: {faculty}"))?;
    }
    finish(w)
}

/// Single-column table of unallocated students.
pub fn render_unallocated_csv(unallocated: &[StudentId]) -> Result<String> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([UNALLOCATED_HEADER])
        .context("write unallocated header failed")?;
    for s in unallocated {
        w.write_record([s.as_str()])
            .with_context(|| format!("write unallocated row failed: {s}"))?;
    }
    finish(w)
}

fn finish(w: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = w.into_inner().context("flush csv buffer failed")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

pub fn build_manifest(args: &WriteRunArtifactsArgs<'_>) -> RunManifest {
    let s = args.outcome.summary(args.params);
    RunManifest {
        schema_version: args.schema_version,
        run_id: args.run_id,
        created_at_utc: Utc::now(),
        config_hash: args.config_hash.to_string(),
        inputs: InputList {
            students_path: args.students_path.to_string(),
            faculty_path: args.faculty_path.to_string(),
        },
        params: ParamsJson {
            max_capacity: args.params.max_capacity,
            max_rounds: args.params.max_rounds,
        },
        summary: SummaryJson {
            students: s.students,
            allocated: s.allocated,
            unallocated: s.unallocated,
            faculties: s.faculties,
            faculties_at_capacity: s.faculties_at_capacity,
            rounds_executed: args.outcome.rounds_executed,
            placements_per_round: s.placements_per_round,
        },
        artifacts: ArtifactList {
            allocations_csv: args.allocations_file.to_string(),
            unallocated_csv: args.unallocated_file.to_string(),
            manifest_json: args.manifest_file.to_string(),
        },
        placements: args.outcome.placements.iter().map(PlacementJson::from).collect(),
    }
}

/// Write both tables and the manifest under `out_dir` (created if missing).
///
/// Existing files with the same names are overwritten; a run's outputs are
/// fully determined by its inputs except `run_id` and `created_at_utc`.
pub fn write_run_artifacts(args: WriteRunArtifactsArgs<'_>) -> Result<WriteRunArtifactsResult> {
    fs::create_dir_all(args.out_dir)
        .with_context(|| format!("create output dir failed: {}", args.out_dir.display()))?;

    let allocations_path = args.out_dir.join(args.allocations_file);
    let body = render_allocations_csv(&args.outcome.allocation, args.faculty_order, args.delimiter)?;
    fs::write(&allocations_path, body)
        .with_context(|| format!("write allocations failed: {}", allocations_path.display()))?;

    let unallocated_path = args.out_dir.join(args.unallocated_file);
    let body = render_unallocated_csv(&args.outcome.unallocated)?;
    fs::write(&unallocated_path, body)
        .with_context(|| format!("write unallocated failed: {}", unallocated_path.display()))?;

    let manifest = build_manifest(&args);
    let manifest_path = args.out_dir.join(args.manifest_file);
    let json = serde_json::to_string_pretty(&manifest).context("serialize manifest failed")?;
    fs::write(&manifest_path, format!("{json}\n"))
        .with_context(|| format!("write manifest failed: {}", manifest_path.display()))?;

    Ok(WriteRunArtifactsResult {
        allocations_path,
        unallocated_path,
        manifest_path,
        manifest,
    })
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read manifest failed: {}", path.display()))?;
    serde_json::from_str(&raw).context("parse manifest json failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use btp_alloc::{wish_lists, Allocator, StudentRecord};

    fn outcome() -> (AllocationOutcome, Vec<FacultyId>) {
        let students = vec![
            StudentRecord::new("A", ["F1", "F2"]),
            StudentRecord::new("B", ["F1"]),
            StudentRecord::new("C", ["F1"]),
        ];
        let faculty = wish_lists([("F1", vec!["B", "C", "A"]), ("F2", vec!["A"]), ("F3", vec![])]);
        let out = Allocator::standard().run(&students, faculty);
        (out, vec!["F3".into(), "F1".into(), "F2".into()])
    }

    #[test]
    fn allocations_follow_faculty_order_with_empty_cells() {
        let (out, order) = outcome();
        let csv = render_allocations_csv(&out.allocation, &order, ", ").unwrap();
        assert_eq!(csv, "Faculty,Students\nF3,\nF1,\"B, C\"\nF2,A\n");
    }

    #[test]
    fn faculty_missing_from_allocation_gets_empty_cell() {
        let (out, _) = outcome();
        let order = vec!["GHOST".to_string()];
        let csv = render_allocations_csv(&out.allocation, &order, ";").unwrap();
        assert_eq!(csv, "Faculty,Students\nGHOST,\n");
    }

    #[test]
    fn unallocated_is_single_column() {
        let csv = render_unallocated_csv(&["X".to_string(), "Y".to_string()]).unwrap();
        assert_eq!(csv, "Unallocated Students\nX\nY\n");
        assert_eq!(render_unallocated_csv(&[]).unwrap(), "Unallocated Students\n");
    }

    #[test]
    fn write_then_read_manifest() {
        let (out, order) = outcome();
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("run");
        let params = AllocationParams::standard();
        let run_id = Uuid::new_v4();

        let res = write_run_artifacts(WriteRunArtifactsArgs {
            out_dir: &out_dir,
            schema_version: 1,
            run_id,
            config_hash: "abc",
            students_path: "students.csv",
            faculty_path: "faculty.csv",
            params: &params,
            outcome: &out,
            faculty_order: &order,
            delimiter: ", ",
            allocations_file: "allocations.csv",
            unallocated_file: "unallocated_students.csv",
            manifest_file: "manifest.json",
        })
        .unwrap();

        assert!(res.allocations_path.exists());
        assert!(res.unallocated_path.exists());

        let m = read_manifest(&res.manifest_path).unwrap();
        assert_eq!(m, res.manifest);
        assert_eq!(m.run_id, run_id);
        assert_eq!(m.summary.students, 3);
        assert_eq!(m.summary.allocated, 3);
        assert_eq!(m.placements.len(), 3);
        assert_eq!(m.artifacts.allocations_csv, "allocations.csv");
    }
}
