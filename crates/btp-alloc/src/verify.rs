//! btp-alloc: verify
//!
//! After-the-fact checks on an `AllocationOutcome`.
//!
//! The allocator enforces these rules while it runs; this module re-derives
//! them from the output alone so callers can refuse to export a result that
//! breaks one (fail-closed gate before artifacts are written).
//!
//! Checks:
//!   - capacity per faculty
//!   - a student sits in at most one faculty list
//!   - allocated and unallocated partition the input students
//!   - placement log agrees with the allocation map
//!   - every placement happened inside the round window
//!   - replaying the placement log against the original wish-lists, each
//!     student was the head of the faculty's list when accepted

use std::collections::{BTreeMap, BTreeSet};

use crate::allocator::{AllocationOutcome, AllocationParams};
use crate::types::{FacultyId, FacultyPreferences, StudentId, StudentRecord};

// ─── InvariantViolation ──────────────────────────────────────────────────────

/// A single broken allocation rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A faculty holds more students than the capacity allows.
    CapacityExceeded {
        faculty: FacultyId,
        load: usize,
        capacity: usize,
    },
    /// A student appears in more than one allocation slot.
    DuplicatePlacement {
        student: StudentId,
        faculties: Vec<FacultyId>,
    },
    /// An allocated id is not among the input students.
    UnknownStudent {
        student: StudentId,
        faculty: FacultyId,
    },
    /// A student is both allocated and unallocated, or neither.
    NotPartitioned { student: StudentId },
    /// The placement log and the allocation map disagree.
    PlacementLogMismatch { student: StudentId },
    /// A placement carries a round index outside `[0, max_rounds)`.
    RoundOutOfRange {
        student: StudentId,
        round: usize,
        max_rounds: usize,
    },
    /// The student was not the head of the faculty's list at acceptance.
    NotHeadOfList {
        student: StudentId,
        faculty: FacultyId,
        head: Option<StudentId>,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded {
                faculty,
                load,
                capacity,
            } => write!(f, "faculty '{faculty}' holds {load} students, capacity {capacity}"),
            Self::DuplicatePlacement { student, faculties } => {
                write!(f, "student '{student}' placed more than once: {faculties:?}")
            }
            Self::UnknownStudent { student, faculty } => {
                write!(f, "faculty '{faculty}' holds unknown student '{student}'")
            }
            Self::NotPartitioned { student } => {
                write!(f, "student '{student}' is not in exactly one output set")
            }
            Self::PlacementLogMismatch { student } => {
                write!(f, "placement log disagrees with allocation for '{student}'")
            }
            Self::RoundOutOfRange {
                student,
                round,
                max_rounds,
            } => write!(
                f,
                "student '{student}' placed in round {round}, outside 0..{max_rounds}"
            ),
            Self::NotHeadOfList {
                student,
                faculty,
                head,
            } => match head {
                Some(h) => write!(
                    f,
                    "student '{student}' accepted by '{faculty}' while head was '{h}'"
                ),
                None => write!(
                    f,
                    "student '{student}' accepted by '{faculty}' with an empty wish-list"
                ),
            },
        }
    }
}

// ─── Checks ──────────────────────────────────────────────────────────────────

/// Run every check and return all violations (empty = clean).
///
/// `original_faculty` must be the wish-lists as they were *before* the run.
pub fn verify_outcome(
    students: &[StudentRecord],
    original_faculty: &FacultyPreferences,
    outcome: &AllocationOutcome,
    params: &AllocationParams,
) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    out.extend(check_capacity(outcome, params));
    out.extend(check_uniqueness(outcome));
    out.extend(check_partition(students, outcome));
    out.extend(check_placement_log(outcome, params));
    out.extend(check_mutual_first_choice(original_faculty, outcome));
    out
}

pub fn check_capacity(
    outcome: &AllocationOutcome,
    params: &AllocationParams,
) -> Vec<InvariantViolation> {
    outcome
        .allocation
        .iter()
        .filter(|(_, list)| list.len() > params.max_capacity)
        .map(|(faculty, list)| InvariantViolation::CapacityExceeded {
            faculty: faculty.clone(),
            load: list.len(),
            capacity: params.max_capacity,
        })
        .collect()
}

pub fn check_uniqueness(outcome: &AllocationOutcome) -> Vec<InvariantViolation> {
    let mut homes: BTreeMap<&StudentId, Vec<FacultyId>> = BTreeMap::new();
    for (faculty, list) in outcome.allocation.iter() {
        for s in list {
            homes.entry(s).or_default().push(faculty.clone());
        }
    }

    homes
        .into_iter()
        .filter(|(_, faculties)| faculties.len() > 1)
        .map(|(student, faculties)| InvariantViolation::DuplicatePlacement {
            student: student.clone(),
            faculties,
        })
        .collect()
}

pub fn check_partition(
    students: &[StudentRecord],
    outcome: &AllocationOutcome,
) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let input: BTreeSet<&StudentId> = students.iter().map(|s| &s.id).collect();
    let unallocated: BTreeSet<&StudentId> = outcome.unallocated.iter().collect();

    for (faculty, list) in outcome.allocation.iter() {
        for s in list {
            if !input.contains(s) {
                out.push(InvariantViolation::UnknownStudent {
                    student: s.clone(),
                    faculty: faculty.clone(),
                });
            }
        }
    }

    for id in &input {
        let allocated = outcome.allocation.is_allocated(id);
        if allocated == unallocated.contains(id) {
            out.push(InvariantViolation::NotPartitioned {
                student: (*id).clone(),
            });
        }
    }

    for id in &unallocated {
        if !input.contains(id) {
            out.push(InvariantViolation::NotPartitioned {
                student: (*id).clone(),
            });
        }
    }

    out
}

pub fn check_placement_log(
    outcome: &AllocationOutcome,
    params: &AllocationParams,
) -> Vec<InvariantViolation> {
    let mut out = Vec::new();

    for p in &outcome.placements {
        if p.round >= params.max_rounds {
            out.push(InvariantViolation::RoundOutOfRange {
                student: p.student.clone(),
                round: p.round,
                max_rounds: params.max_rounds,
            });
        }
        if outcome.allocation.faculty_of(&p.student) != Some(&p.faculty) {
            out.push(InvariantViolation::PlacementLogMismatch {
                student: p.student.clone(),
            });
        }
    }

    if outcome.placements.len() != outcome.allocation.allocated_count() {
        let logged: BTreeSet<&StudentId> = outcome.placements.iter().map(|p| &p.student).collect();
        for s in outcome.allocation.allocated_students() {
            if !logged.contains(s) {
                out.push(InvariantViolation::PlacementLogMismatch { student: s.clone() });
            }
        }
    }

    out
}

/// Replay the placement log against the pre-run wish-lists.
///
/// Rounds are non-decreasing in the log and acceptance order inside a round
/// is the log order, so replaying in sequence reconstructs each wish-list as
/// the allocator saw it.
pub fn check_mutual_first_choice(
    original_faculty: &FacultyPreferences,
    outcome: &AllocationOutcome,
) -> Vec<InvariantViolation> {
    let mut lists = original_faculty.clone();
    let mut out = Vec::new();

    for p in &outcome.placements {
        let head = lists.get(&p.faculty).and_then(|l| l.first()).cloned();
        if head.as_ref() != Some(&p.student) {
            out.push(InvariantViolation::NotHeadOfList {
                student: p.student.clone(),
                faculty: p.faculty.clone(),
                head,
            });
        }
        for list in lists.values_mut() {
            list.retain(|s| s != &p.student);
        }
    }

    out
}
