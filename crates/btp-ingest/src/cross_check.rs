//! Cross-sheet reference diagnostics.
//!
//! The allocator treats a dangling reference as "no match" and carries on.
//! This module lists those references so an operator can fix the sheets
//! before a run. It never changes the data.

use std::collections::BTreeSet;

use btp_alloc::{FacultyId, FacultyPreferences, StudentId, StudentRecord};
use serde::Serialize;

/// Dangling and empty entries found across the two sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossCheck {
    /// (student, faculty) where the student ranks a faculty with no row.
    pub unknown_faculty_refs: Vec<(StudentId, FacultyId)>,
    /// (faculty, student) where the faculty ranks a student with no row.
    pub unknown_student_refs: Vec<(FacultyId, StudentId)>,
    pub students_without_preferences: Vec<StudentId>,
    pub faculties_without_preferences: Vec<FacultyId>,
}

impl CrossCheck {
    pub fn is_clean(&self) -> bool {
        self.unknown_faculty_refs.is_empty()
            && self.unknown_student_refs.is_empty()
            && self.students_without_preferences.is_empty()
            && self.faculties_without_preferences.is_empty()
    }
}

pub fn cross_check(students: &[StudentRecord], faculty: &FacultyPreferences) -> CrossCheck {
    let student_ids: BTreeSet<&str> = students.iter().map(|s| s.id.as_str()).collect();
    let mut out = CrossCheck::default();

    for s in students {
        if s.preferences.is_empty() {
            out.students_without_preferences.push(s.id.clone());
        }
        for f in &s.preferences {
            if !faculty.contains_key(f) {
                out.unknown_faculty_refs.push((s.id.clone(), f.clone()));
            }
        }
    }

    for (f, wish_list) in faculty {
        if wish_list.is_empty() {
            out.faculties_without_preferences.push(f.clone());
        }
        for s in wish_list {
            if !student_ids.contains(s.as_str()) {
                out.unknown_student_refs.push((f.clone(), s.clone()));
            }
        }
    }

    out
}
