//! btp-alloc: allocator
//!
//! Round-based mutual-first-choice matching of students to faculty.
//!
//! Responsibilities (pure, no IO):
//! - Accept ranked student choices and ranked faculty wish-lists.
//! - Walk preference levels 0..max_rounds; in round k every still-unplaced
//!   student asks for their k-th choice.
//! - Commit a match only when the student is the head of that faculty's
//!   remaining list and the faculty is below capacity.
//! - Produce an `AllocationOutcome`: the allocation map, the unallocated
//!   students and a placement log.
//!
//! Design notes:
//! - Greedy and order-dependent. Within a round, ties go to whoever comes
//!   first in the student input. Accepted placements are never revisited.
//! - A student who misses at rank k is not retried at rank k+1 in the same
//!   round; they wait for the next round.
//! - Unknown faculty ids, exhausted wish-lists, full faculties and short
//!   preference lists all carry the student forward. None of them is an error.
//! - The faculty map is taken by value because the run consumes it.

use std::collections::HashSet;

use tracing::debug;

use crate::types::{
    AllocationState, FacultyId, FacultyPreferences, Placement, StudentId, StudentRecord,
};

/// Maximum students a faculty may accept.
pub const MAX_CAPACITY: usize = 8;

/// Number of preference levels attempted.
pub const MAX_ROUNDS: usize = 5;

// ─── Error ───────────────────────────────────────────────────────────────────

/// Errors produced when building `AllocationParams`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamsError {
    /// Capacity of zero would leave every student unallocated.
    ZeroCapacity,
    /// Zero rounds would never look at a single preference.
    ZeroRounds,
}

impl std::fmt::Display for ParamsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "max_capacity must be > 0"),
            Self::ZeroRounds => write!(f, "max_rounds must be > 0"),
        }
    }
}

impl std::error::Error for ParamsError {}

// ─── AllocationParams ────────────────────────────────────────────────────────

/// Limits applied during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationParams {
    pub max_capacity: usize,
    pub max_rounds: usize,
}

impl AllocationParams {
    pub fn new(max_capacity: usize, max_rounds: usize) -> Result<Self, ParamsError> {
        if max_capacity == 0 {
            return Err(ParamsError::ZeroCapacity);
        }
        if max_rounds == 0 {
            return Err(ParamsError::ZeroRounds);
        }
        Ok(Self {
            max_capacity,
            max_rounds,
        })
    }

    /// Capacity 8, five preference levels.
    pub fn standard() -> Self {
        Self {
            max_capacity: MAX_CAPACITY,
            max_rounds: MAX_ROUNDS,
        }
    }
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self::standard()
    }
}

// ─── AllocationOutcome ───────────────────────────────────────────────────────

/// The result of one allocation run.
///
/// `allocation` and `unallocated` partition the input students.
/// `placements` lists every acceptance in the order it committed.
/// `rounds_executed` is how many preference levels were actually walked
/// (fewer than `max_rounds` when everyone was placed early).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationOutcome {
    pub allocation: AllocationState,
    pub unallocated: Vec<StudentId>,
    pub placements: Vec<Placement>,
    pub rounds_executed: usize,
}

impl AllocationOutcome {
    /// True when every input student was placed.
    pub fn is_complete(&self) -> bool {
        self.unallocated.is_empty()
    }

    pub fn summary(&self, params: &AllocationParams) -> AllocationSummary {
        let mut placements_per_round = vec![0usize; self.rounds_executed];
        for p in &self.placements {
            if let Some(slot) = placements_per_round.get_mut(p.round) {
                *slot += 1;
            }
        }

        let faculties_at_capacity = self
            .allocation
            .iter()
            .filter(|(_, list)| list.len() >= params.max_capacity)
            .count();

        let allocated = self.allocation.allocated_count();
        AllocationSummary {
            students: allocated + self.unallocated.len(),
            allocated,
            unallocated: self.unallocated.len(),
            faculties: self.allocation.faculty_count(),
            faculties_at_capacity,
            placements_per_round,
        }
    }
}

/// Headline counts for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationSummary {
    /// Distinct input students.
    pub students: usize,
    pub allocated: usize,
    pub unallocated: usize,
    pub faculties: usize,
    pub faculties_at_capacity: usize,
    /// Index = preference level.
    pub placements_per_round: Vec<usize>,
}

// ─── Allocator ───────────────────────────────────────────────────────────────

/// Student-to-faculty allocator.
///
/// # Algorithm
///
/// 1. Start with an empty allocation list for every faculty key.
/// 2. `remaining` = all students, input order.
/// 3. For each preference level while `remaining` is non-empty:
///    - each student asks for the faculty at that level of their list;
///    - the faculty accepts iff it exists, its wish-list is non-empty, it is
///      below capacity and the student is the head of its wish-list;
///    - an accepted student is removed from every faculty's wish-list;
///    - everyone else is carried to the next level.
/// 4. Whoever is left is unallocated.
#[derive(Clone, Debug, Default)]
pub struct Allocator {
    params: AllocationParams,
}

impl Allocator {
    pub fn new(params: AllocationParams) -> Self {
        Self { params }
    }

    /// Allocator with `MAX_CAPACITY` and `MAX_ROUNDS`.
    pub fn standard() -> Self {
        Self::new(AllocationParams::standard())
    }

    pub fn params(&self) -> &AllocationParams {
        &self.params
    }

    /// Run the round loop.
    ///
    /// `students` is only read. `faculty` is consumed: accepted students are
    /// stripped from every wish-list as the run progresses. Clone it first if
    /// the original lists are still needed.
    pub fn run(&self, students: &[StudentRecord], faculty: FacultyPreferences) -> AllocationOutcome {
        let mut faculty = faculty;
        let mut allocation = AllocationState::with_faculties(faculty.keys());
        let mut placements: Vec<Placement> = Vec::new();

        let mut remaining: Vec<&StudentRecord> = students.iter().collect();
        let mut level = 0usize;

        while !remaining.is_empty() && level < self.params.max_rounds {
            let mut carried: Vec<&StudentRecord> = Vec::with_capacity(remaining.len());

            for student in remaining {
                match self.accepting_faculty(student, level, &faculty, &allocation) {
                    Some(target) => {
                        allocation.push(&target, student.id.clone());
                        for wish_list in faculty.values_mut() {
                            wish_list.retain(|s| s != &student.id);
                        }
                        debug!(
                            student = %student.id,
                            faculty = %target,
                            round = level,
                            "placed"
                        );
                        placements.push(Placement {
                            student: student.id.clone(),
                            faculty: target,
                            round: level,
                        });
                    }
                    None => carried.push(student),
                }
            }

            debug!(
                round = level,
                carried = carried.len(),
                placed_total = placements.len(),
                "round complete"
            );

            remaining = carried;
            level += 1;
        }

        let unallocated = unallocated_students(students, &allocation);

        AllocationOutcome {
            allocation,
            unallocated,
            placements,
            rounds_executed: level,
        }
    }

    /// The faculty that takes `student` at `level`, if the match commits.
    fn accepting_faculty(
        &self,
        student: &StudentRecord,
        level: usize,
        faculty: &FacultyPreferences,
        allocation: &AllocationState,
    ) -> Option<FacultyId> {
        let preferred = student.choice_at(level)?;
        let wish_list = faculty.get(preferred)?;
        let head = wish_list.first()?;

        if allocation.load(preferred) >= self.params.max_capacity {
            return None;
        }
        if head != &student.id {
            return None;
        }
        Some(preferred.clone())
    }
}

/// Run a standard allocation (capacity 8, five rounds) and return the map.
///
/// `faculty` is consumed; see [`Allocator::run`].
pub fn allocate(students: &[StudentRecord], faculty: FacultyPreferences) -> AllocationState {
    Allocator::standard().run(students, faculty).allocation
}

/// Input students that no faculty accepted.
///
/// Set difference of input ids minus allocated ids, reported in input order
/// with repeated ids listed once.
pub fn unallocated_students(
    students: &[StudentRecord],
    allocation: &AllocationState,
) -> Vec<StudentId> {
    let allocated: HashSet<&str> = allocation.allocated_students().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();

    students
        .iter()
        .map(|s| s.id.as_str())
        .filter(|id| !allocated.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
