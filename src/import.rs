use std::path::Path;

use anyhow::{bail, Context};
use tracing::{debug, info};

use crate::models::{parse_date, parse_number, GradeRecord, GradeValue, SubjectSeries};

pub fn load_series(path: &Path) -> anyhow::Result<Vec<SubjectSeries>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let series = match extension.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => bail!("unsupported input {}: expected .json or .csv", path.display()),
    };

    info!(
        path = %path.display(),
        subjects = series.len(),
        "loaded grade series"
    );
    Ok(series)
}

pub fn load_json(path: &Path) -> anyhow::Result<Vec<SubjectSeries>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid grade document {}", path.display()))
}

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<SubjectSeries>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        subject: String,
        period: String,
        period_start: String,
        date: String,
        student: Option<String>,
        class_average: Option<String>,
        out_of: Option<String>,
        coef: Option<String>,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut grouped: Vec<SubjectSeries> = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("malformed row at line {line}"))?;

        let date = parse_date(&row.date)
            .with_context(|| format!("invalid date {:?} at line {line}", row.date))?;
        let start_date = parse_date(&row.period_start).with_context(|| {
            format!("invalid period_start {:?} at line {line}", row.period_start)
        })?;

        let number = |field: &Option<String>| field.as_deref().and_then(parse_number);
        let record = GradeRecord {
            date,
            value: Some(GradeValue {
                student: number(&row.student),
                class_average: number(&row.class_average),
                out_of: number(&row.out_of),
                coef: number(&row.coef),
            }),
            subject: row.subject.clone(),
        };

        let existing = grouped.iter_mut().find(|series| {
            series.subject == row.subject
                && series.title == row.period
                && series.start_date == start_date
        });

        match existing {
            Some(series) => series.series.get_or_insert_with(Vec::new).push(record),
            None => grouped.push(SubjectSeries {
                subject: row.subject,
                title: row.period,
                start_date,
                series: Some(vec![record]),
            }),
        }
    }

    debug!(subjects = grouped.len(), "grouped csv rows by subject and period");
    Ok(grouped)
}
