use tracing::debug;

use crate::models::{GradeRecord, GradeType, WeightedSummary};

pub const DEFAULT_SCALE: f64 = 20.0;

pub fn weighted_average(records: &[GradeRecord], grade_type: GradeType, scale: f64) -> f64 {
    summarize(records, grade_type, scale).average().unwrap_or(0.0)
}

pub fn summarize(records: &[GradeRecord], grade_type: GradeType, scale: f64) -> WeightedSummary {
    let mut accumulator = Accumulator::new(grade_type, scale);
    for record in records {
        accumulator.push(record);
    }

    let summary = accumulator.summary();
    if summary.count < records.len() {
        debug!(
            grade_type = grade_type.label(),
            total = records.len(),
            excluded = records.len() - summary.count,
            "records excluded from average"
        );
    }
    summary
}

pub fn normalized_contribution(
    record: &GradeRecord,
    grade_type: GradeType,
    scale: f64,
) -> Option<(f64, f64)> {
    let value = record.value.as_ref()?;

    let out_of = value.out_of.unwrap_or(scale);
    if !out_of.is_finite() || out_of <= 0.0 {
        return None;
    }

    let raw = value.raw(grade_type).filter(|raw| raw.is_finite())?;

    let coef = value.coef.unwrap_or(1.0);
    if !coef.is_finite() || coef <= 0.0 {
        return None;
    }

    Some(((raw / out_of) * scale, coef))
}

#[derive(Debug, Clone)]
pub struct Accumulator {
    grade_type: GradeType,
    scale: f64,
    summary: WeightedSummary,
}

impl Accumulator {
    pub fn new(grade_type: GradeType, scale: f64) -> Self {
        Self {
            grade_type,
            scale,
            summary: WeightedSummary::default(),
        }
    }

    pub fn push(&mut self, record: &GradeRecord) -> bool {
        match normalized_contribution(record, self.grade_type, self.scale) {
            Some((normalized, coef)) => {
                self.summary.weighted_sum += normalized * coef;
                self.summary.total_weight += coef;
                self.summary.count += 1;
                true
            }
            None => false,
        }
    }

    pub fn average(&self) -> f64 {
        self.summary.average().unwrap_or(0.0)
    }

    pub fn summary(&self) -> WeightedSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GradeValue;
    use chrono::NaiveDate;

    fn grade(student: Option<f64>, out_of: Option<f64>, coef: Option<f64>) -> GradeRecord {
        GradeRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
            value: Some(GradeValue {
                student,
                class_average: None,
                out_of,
                coef,
            }),
            subject: "maths".to_string(),
        }
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn empty_input_averages_to_zero() {
        assert_eq!(weighted_average(&[], GradeType::Student, DEFAULT_SCALE), 0.0);
        assert_eq!(summarize(&[], GradeType::Student, DEFAULT_SCALE).average(), None);
    }

    #[test]
    fn single_grade_keeps_its_value() {
        let records = vec![grade(Some(15.0), Some(20.0), Some(1.0))];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 15.0));
    }

    #[test]
    fn grades_are_normalized_onto_scale() {
        let records = vec![grade(Some(8.0), Some(10.0), None)];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 16.0));

        let records = vec![grade(Some(75.0), Some(100.0), None)];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 15.0));
    }

    #[test]
    fn coefficients_weight_the_mean() {
        let records = vec![
            grade(Some(10.0), None, Some(1.0)),
            grade(Some(20.0), None, Some(3.0)),
        ];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 17.5));
    }

    #[test]
    fn invalid_coefficients_are_excluded() {
        let records = vec![
            grade(Some(12.0), None, Some(1.0)),
            grade(Some(2.0), None, Some(0.0)),
            grade(Some(4.0), None, Some(-1.0)),
            grade(Some(6.0), None, Some(f64::NAN)),
        ];
        let summary = summarize(&records, GradeType::Student, 20.0);
        assert_eq!(summary.count, 1);
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 12.0));
    }

    #[test]
    fn missing_scores_do_not_pull_toward_zero() {
        let mut absent = grade(None, None, None);
        absent.subject = "history".to_string();
        let no_value = GradeRecord {
            value: None,
            ..grade(None, None, None)
        };
        let records = vec![grade(Some(14.0), None, None), absent, no_value];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 14.0));
        assert!(close(weighted_average(&records, GradeType::ClassAverage, 20.0), 0.0));
    }

    #[test]
    fn non_positive_maximum_is_excluded() {
        let records = vec![
            grade(Some(14.0), Some(0.0), None),
            grade(Some(5.0), Some(-10.0), None),
            grade(Some(10.0), Some(20.0), None),
        ];
        let summary = summarize(&records, GradeType::Student, 20.0);
        assert_eq!(summary.count, 1);
        assert!(close(summary.average().unwrap_or_default(), 10.0));
    }

    #[test]
    fn negative_scores_are_not_clamped() {
        let records = vec![grade(Some(-4.0), Some(20.0), None)];
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), -4.0));
    }

    #[test]
    fn unreadable_coefficient_or_maximum_excludes_the_grade() {
        let records: Vec<GradeRecord> = serde_json::from_str(
            r#"[
                {"date": "2024-01-10", "value": {"student": 10, "coef": "abc"}},
                {"date": "2024-01-11", "value": {"student": 8, "outOf": "n/a"}},
                {"date": "2024-01-12", "value": {"student": 4, "outOf": {}, "coef": 2}},
                {"date": "2024-01-13", "value": {"student": 20}}
            ]"#,
        )
        .expect("records parse");

        let summary = summarize(&records, GradeType::Student, 20.0);
        assert_eq!(summary.count, 1);
        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 20.0));
    }

    #[test]
    fn comma_decimal_scores_are_excluded() {
        let records: Vec<GradeRecord> = serde_json::from_str(
            r#"[
                {"date": "2024-01-10", "value": {"student": "12,5"}},
                {"date": "2024-01-11", "value": {"student": "20"}}
            ]"#,
        )
        .expect("records parse");

        assert!(close(weighted_average(&records, GradeType::Student, 20.0), 20.0));
    }

    #[test]
    fn repeated_calls_agree() {
        let records = vec![
            grade(Some(9.0), Some(10.0), Some(2.0)),
            grade(Some(11.0), None, Some(0.5)),
        ];
        let first = weighted_average(&records, GradeType::Student, 20.0);
        let second = weighted_average(&records, GradeType::Student, 20.0);
        assert_eq!(first, second);
    }

    #[test]
    fn accumulator_reports_contributions() {
        let mut accumulator = Accumulator::new(GradeType::Student, 20.0);
        assert!(accumulator.push(&grade(Some(10.0), None, None)));
        assert!(!accumulator.push(&grade(None, None, None)));
        assert_eq!(accumulator.summary().count, 1);
        assert!(close(accumulator.average(), 10.0));
    }
}
