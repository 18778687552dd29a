use std::collections::HashSet;

use chrono::Datelike;

use crate::models::{GradeRecord, PeriodKey, SubjectSeries};

fn period_key(series: &SubjectSeries) -> PeriodKey {
    PeriodKey {
        title: series.title.clone(),
        year: series.start_date.year(),
    }
}

pub fn distinct_periods(all: &[SubjectSeries]) -> Vec<PeriodKey> {
    let mut seen = HashSet::new();
    all.iter()
        .map(period_key)
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

pub fn resolve_year(periods: &[PeriodKey], title: &str, year: i32) -> i32 {
    if periods.iter().any(|p| p.title == title && p.year == year) {
        return year;
    }
    periods
        .iter()
        .find(|p| p.title == title)
        .map(|p| p.year)
        .unwrap_or(year)
}

pub fn select_subjects<'a>(
    all: &'a [SubjectSeries],
    title: &str,
    year: i32,
) -> Vec<&'a SubjectSeries> {
    all.iter()
        .filter(|series| series.title == title && series.start_date.year() == year)
        .filter(|series| series.series.is_some())
        .collect()
}

pub fn flatten_records(subjects: &[&SubjectSeries]) -> Vec<GradeRecord> {
    subjects
        .iter()
        .flat_map(|series| {
            series.series.iter().flatten().map(move |record| {
                let mut record = record.clone();
                if record.subject.is_empty() {
                    record.subject = series.subject.clone();
                }
                record
            })
        })
        .collect()
}

pub fn filter_by_subject(records: &[GradeRecord], subject: &str) -> Vec<GradeRecord> {
    records
        .iter()
        .filter(|record| record.subject == subject)
        .cloned()
        .collect()
}
