//! `btp inspect`: read both sheets and report problems without allocating.

use anyhow::Result;
use btp_ingest::cross_check;

use super::{load_sheets, print_ingest_report};

pub fn run_inspect(students: &str, faculty: &str) -> Result<()> {
    let (s, f) = load_sheets(students, faculty)?;

    print_ingest_report("students", &s.report);
    print_ingest_report("faculty", &f.report);
    for id in &s.report.duplicate_ids {
        println!("duplicate_student id={id}");
    }
    for id in &f.report.duplicate_ids {
        println!("duplicate_faculty id={id}");
    }

    let cc = cross_check(&s.students, &f.preferences);
    for (student, fac) in &cc.unknown_faculty_refs {
        println!("unknown_faculty_ref student={student} faculty={fac}");
    }
    for (fac, student) in &cc.unknown_student_refs {
        println!("unknown_student_ref faculty={fac} student={student}");
    }
    for id in &cc.students_without_preferences {
        println!("student_without_preferences id={id}");
    }
    for id in &cc.faculties_without_preferences {
        println!("faculty_without_preferences id={id}");
    }
    println!("cross_check_clean={}", cc.is_clean());

    Ok(())
}
