use std::fmt::Write;

use serde::Serialize;

use crate::average::summarize;
use crate::history::{dated_history, headline_average, round_display};
use crate::models::{AveragePoint, GradeRecord, GradeType};

#[derive(Debug, Clone, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone)]
pub struct SubjectAverage {
    pub subject: String,
    pub student: Option<f64>,
    pub class: Option<f64>,
    pub grade_count: usize,
}

pub fn chart_data(records: &[GradeRecord], scale: f64) -> ChartData {
    let dated = dated_history(records, scale);
    let labels = dated
        .iter()
        .map(|(date, _)| date.format("%b %d").to_string())
        .collect();
    let series = |pick: fn(&AveragePoint) -> f64| -> Vec<f64> {
        dated
            .iter()
            .map(|(_, point)| round_display(pick(point)))
            .collect()
    };

    ChartData {
        labels,
        datasets: vec![
            ChartDataset {
                label: "student".to_string(),
                data: series(|point| point.student),
            },
            ChartDataset {
                label: "class".to_string(),
                data: series(|point| point.class),
            },
        ],
    }
}

pub fn summarize_by_subject(records: &[GradeRecord], scale: f64) -> Vec<SubjectAverage> {
    let mut subjects: Vec<&str> = Vec::new();
    for record in records {
        if !subjects.contains(&record.subject.as_str()) {
            subjects.push(&record.subject);
        }
    }

    subjects
        .into_iter()
        .map(|subject| {
            let grades: Vec<GradeRecord> = records
                .iter()
                .filter(|record| record.subject == subject)
                .cloned()
                .collect();
            SubjectAverage {
                subject: subject.to_string(),
                student: summarize(&grades, GradeType::Student, scale).average(),
                class: summarize(&grades, GradeType::ClassAverage, scale).average(),
                grade_count: grades.len(),
            }
        })
        .collect()
}

fn display(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", round_display(v)))
}

pub fn build_report(scope: Option<&str>, scale: f64, records: &[GradeRecord]) -> String {
    let dated = dated_history(records, scale);
    let points: Vec<AveragePoint> = dated.iter().map(|(_, point)| *point).collect();
    let subjects = summarize_by_subject(records, scale);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all periods");

    let _ = writeln!(output, "# Grade History Report");
    let _ = writeln!(output, "Generated for {} ({} grades)", scope_label, records.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Average");

    match headline_average(&points) {
        Some(student) => {
            let _ = writeln!(output, "{:.2}/{}", round_display(student), scale);
        }
        None => {
            let _ = writeln!(output, "No grades recorded for this selection.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## By Subject");

    if subjects.is_empty() {
        let _ = writeln!(output, "No subjects in this selection.");
    } else {
        for subject in subjects.iter() {
            let _ = writeln!(
                output,
                "- {}: {} (class {}) across {} grades",
                subject.subject,
                display(subject.student),
                display(subject.class),
                subject.grade_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Progression");

    if dated.is_empty() {
        let _ = writeln!(output, "No grades recorded for this selection.");
    } else {
        let _ = writeln!(output, "| Date | Student | Class |");
        let _ = writeln!(output, "|------|---------|-------|");
        for (date, point) in dated.iter() {
            let _ = writeln!(
                output,
                "| {} | {:.2} | {:.2} |",
                date,
                round_display(point.student),
                round_display(point.class)
            );
        }
    }

    output
}
