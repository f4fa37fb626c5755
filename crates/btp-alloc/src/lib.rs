//! btp-alloc
//!
//! Student-to-faculty allocation core.
//! - Ranked student choices + ranked faculty wish-lists in
//! - Round-based mutual-first-choice matching with a per-faculty capacity
//! - Allocation map, unallocated list and placement log out
//! - After-the-fact invariant verification
//! - Pure deterministic logic (no IO, no time, no randomness)

mod types;

pub mod allocator;
pub mod verify;

pub use allocator::{
    allocate, unallocated_students, AllocationOutcome, AllocationParams, AllocationSummary,
    Allocator, ParamsError, MAX_CAPACITY, MAX_ROUNDS,
};
pub use types::{
    AllocationState, FacultyId, FacultyOrder, FacultyPreferences, Placement, StudentId,
    StudentRecord,
};
pub use verify::{verify_outcome, InvariantViolation};

/// Helper to build `FacultyPreferences` with minimal boilerplate.
pub fn wish_lists<I, F, L, S>(items: I) -> FacultyPreferences
where
    I: IntoIterator<Item = (F, L)>,
    F: Into<FacultyId>,
    L: IntoIterator<Item = S>,
    S: Into<StudentId>,
{
    let mut m = FacultyPreferences::new();
    for (faculty, list) in items {
        m.insert(faculty.into(), list.into_iter().map(Into::into).collect());
    }
    m
}
