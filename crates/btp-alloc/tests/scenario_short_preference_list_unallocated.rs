//! Scenario: short preference lists drop out after their window
//!
//! # Invariants under test
//!
//! 1. A student with two preferences can only match in rounds 0 and 1.
//! 2. Rounds 2..4 still run for other students, but never look at the short
//!    list again; the student ends unallocated even if a faculty later wants
//!    them at its head.
//! 3. Unknown faculty references are skipped silently, not errors.

use btp_alloc::{wish_lists, Allocator, StudentRecord};

#[test]
fn two_preference_student_is_unallocated_after_round_one() {
    let students = vec![
        // Neither F1 nor F2 has SHORT at its head in rounds 0-1.
        StudentRecord::new("SHORT", ["F1", "F2"]),
        // LONG keeps the loop alive until round 4.
        StudentRecord::new("LONG", ["X", "X", "X", "X", "F3"]),
    ];
    let faculty = wish_lists([
        ("F1", vec!["OTHER"]),
        ("F2", vec!["OTHER", "SHORT"]),
        ("F3", vec!["LONG", "SHORT"]),
    ]);

    let out = Allocator::standard().run(&students, faculty);

    assert_eq!(out.rounds_executed, 5, "all five rounds ran");
    assert_eq!(out.allocation.faculty_of("LONG").map(String::as_str), Some("F3"));
    assert_eq!(out.placements[0].round, 4);

    // F3's head becomes SHORT once LONG is stripped, but SHORT never asks.
    assert_eq!(out.unallocated, vec!["SHORT".to_string()]);
}

#[test]
fn student_with_no_preferences_is_unallocated() {
    let students = vec![StudentRecord::new("EMPTY", Vec::<String>::new())];
    let faculty = wish_lists([("F1", vec!["EMPTY"])]);
    let out = Allocator::standard().run(&students, faculty);
    assert_eq!(out.unallocated, vec!["EMPTY".to_string()]);
    assert!(out.allocation.students_for("F1").expect("slot").is_empty());
}

#[test]
fn unknown_faculty_references_carry_forward() {
    let students = vec![StudentRecord::new("S1", ["GHOST", "PHANTOM", "F1"])];
    let faculty = wish_lists([("F1", vec!["S1"])]);
    let out = Allocator::standard().run(&students, faculty);
    assert_eq!(out.placements.len(), 1);
    assert_eq!(out.placements[0].round, 2);
}
