//! Scenario: allocation invariants hold for arbitrary inputs
//!
//! # Invariants under test
//!
//! 1. Capacity, uniqueness, partition and mutual-first-choice hold for every
//!    run (`verify_outcome` is clean).
//! 2. Determinism: two runs over identical inputs produce identical outcomes.
//! 3. Permanence: a student is placed at most once, and placement rounds
//!    never go backwards.
//! 4. A placement in round k is always the student's k-th choice.
//!
//! Inputs are generated: faculty index 6 is never a real faculty, and
//! wish-lists may name ids that are not students.

use btp_alloc::{
    verify_outcome, AllocationParams, Allocator, FacultyPreferences, StudentRecord,
};
use proptest::prelude::*;
use std::collections::HashSet;

const FACULTIES: usize = 6;

fn build(
    student_prefs: &[Vec<usize>],
    faculty_lists: &[Vec<usize>],
) -> (Vec<StudentRecord>, FacultyPreferences) {
    let students = student_prefs
        .iter()
        .enumerate()
        .map(|(i, prefs)| StudentRecord::new(format!("S{i}"), prefs.iter().map(|f| format!("F{f}"))))
        .collect();

    let faculty = faculty_lists
        .iter()
        .enumerate()
        .map(|(f, list)| (format!("F{f}"), list.iter().map(|s| format!("S{s}")).collect::<Vec<_>>()))
        .collect();

    (students, faculty)
}

proptest! {
    #[test]
    fn invariants_hold_for_random_inputs(
        student_prefs in prop::collection::vec(prop::collection::vec(0usize..=FACULTIES, 0..7), 0..24),
        faculty_lists in prop::collection::vec(prop::collection::vec(0usize..28, 0..14), FACULTIES),
        capacity in 1usize..9,
        rounds in 1usize..7,
    ) {
        let (students, faculty) = build(&student_prefs, &faculty_lists);
        let params = AllocationParams::new(capacity, rounds).unwrap();
        let allocator = Allocator::new(params);

        let first = allocator.run(&students, faculty.clone());
        let second = allocator.run(&students, faculty.clone());

        // 1
        let violations = verify_outcome(&students, &faculty, &first, &params);
        prop_assert!(violations.is_empty(), "violations: {:?}", violations);

        // 2
        prop_assert_eq!(&first, &second);

        // 3
        let mut seen = HashSet::new();
        for p in &first.placements {
            prop_assert!(seen.insert(p.student.clone()), "{} placed twice", p.student);
        }
        for w in first.placements.windows(2) {
            prop_assert!(w[0].round <= w[1].round);
        }

        // 4
        for p in &first.placements {
            let record = students.iter().find(|s| s.id == p.student).unwrap();
            prop_assert_eq!(record.choice_at(p.round), Some(&p.faculty));
        }

        prop_assert!(first.rounds_executed <= rounds);
    }
}
