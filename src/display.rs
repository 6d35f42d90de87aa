use crate::algos::RunSummary;
use crate::model::{AssignmentPool, Outcome};
use crate::stats::FairnessReport;

pub fn display_details(a: &AssignmentPool) {
    let mut projects = a.viable_projects();
    projects.sort_by_key(|&p| a.project(p).name.clone());
    for p in projects {
        let mut students = a.students_for(p).clone();
        students.sort_by_key(|&s| a.student(s).name.clone());
        if !students.is_empty() {
            let project = a.project(p);
            println!(
                "{} ({}, {}/{}):",
                project.name,
                project.org_type,
                students.len(),
                project.capacity
            );
            for s in students {
                let student = a.student(s);
                print!("  - {} [{}]", student.name, student.nationality);
                if let Outcome::Assigned { rank, stage, .. } = a.outcome(s) {
                    match rank {
                        Some(rank) => print!(" (rank {})", rank + 1),
                        None => print!(" (unranked)"),
                    }
                    if stage.is_fallback() {
                        print!(" ({stage})");
                    }
                }
                println!();
            }
            println!();
        }
    }
}

pub fn display_stats(report: &FairnessReport) {
    println!(
        "Students assigned/unassigned/total: {}/{}/{}",
        report.assigned(),
        report.unassigned,
        report.students
    );
    let cumul = report.ranks.iter().scan(0, |s, &r| {
        *s += r;
        Some(*s)
    });
    println!("Final ranking:");
    for (rank, (n, c)) in report.ranks.iter().zip(cumul).enumerate() {
        if *n != 0 {
            println!(
                "  - rank {}: {} (cumulative {} - {:.2}%)",
                rank + 1,
                n,
                c,
                100.0 * c as f32 / report.students.max(1) as f32
            );
        }
    }
    if report.outside_preferences != 0 {
        println!("  - unranked: {}", report.outside_preferences);
    }
    println!(
        "Placed by fallback: {}, matching type preference: {}",
        report.fallback, report.type_matched
    );
}

pub fn display_dropped(a: &AssignmentPool, summary: &RunSummary) {
    let mut projects = summary
        .dropped
        .iter()
        .map(|&p| a.project(p).name.clone())
        .collect::<Vec<_>>();
    projects.sort();
    if !projects.is_empty() {
        println!(
            "Dropped projects ({} students displaced):",
            summary.displaced.len()
        );
        for p in projects {
            println!("  - {p}");
        }
    }
}

pub fn display_unassigned(a: &AssignmentPool) {
    let mut students = a
        .unassigned_students()
        .into_iter()
        .map(|s| a.student(s))
        .collect::<Vec<_>>();
    students.sort_by_key(|s| s.name.clone());
    if !students.is_empty() {
        println!("Unassigned students:");
        for s in students {
            print!("  - {} [{}]", s.name, s.nationality);
            if s.is_lazy() {
                print!(" (no valid preference)");
            }
            println!();
        }
    }
}
