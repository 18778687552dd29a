use chrono::NaiveDate;

use crate::average::{Accumulator, DEFAULT_SCALE};
use crate::models::{AveragePoint, GradeRecord, GradeType};

#[derive(Debug, Clone)]
pub struct HistoryBuilder {
    student: Accumulator,
    class: Accumulator,
}

impl Default for HistoryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

impl HistoryBuilder {
    pub fn new(scale: f64) -> Self {
        Self {
            student: Accumulator::new(GradeType::Student, scale),
            class: Accumulator::new(GradeType::ClassAverage, scale),
        }
    }

    pub fn push(&mut self, record: &GradeRecord) -> AveragePoint {
        self.student.push(record);
        self.class.push(record);
        self.current()
    }

    pub fn current(&self) -> AveragePoint {
        AveragePoint {
            student: self.student.average(),
            class: self.class.average(),
        }
    }
}

pub fn progressive_history(records: &[GradeRecord]) -> Vec<AveragePoint> {
    progressive_history_on_scale(records, DEFAULT_SCALE)
}

pub fn progressive_history_on_scale(records: &[GradeRecord], scale: f64) -> Vec<AveragePoint> {
    let mut builder = HistoryBuilder::new(scale);
    records.iter().map(|record| builder.push(record)).collect()
}

pub fn project_dates(records: &[GradeRecord]) -> Vec<NaiveDate> {
    records.iter().map(|record| record.date).collect()
}

pub fn dated_history(records: &[GradeRecord], scale: f64) -> Vec<(NaiveDate, AveragePoint)> {
    project_dates(records)
        .into_iter()
        .zip(progressive_history_on_scale(records, scale))
        .collect()
}

pub fn headline_average(history: &[AveragePoint]) -> Option<f64> {
    history.last().map(|point| point.student)
}

pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
