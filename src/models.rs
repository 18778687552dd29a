use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{de, Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeType {
    Student,
    ClassAverage,
}

impl GradeType {
    pub fn label(self) -> &'static str {
        match self {
            GradeType::Student => "student",
            GradeType::ClassAverage => "classAverage",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeValue {
    #[serde(default, deserialize_with = "lenient_number")]
    pub student: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub class_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub out_of: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub coef: Option<f64>,
}

impl GradeValue {
    pub fn raw(&self, grade_type: GradeType) -> Option<f64> {
        match grade_type {
            GradeType::Student => self.student,
            GradeType::ClassAverage => self.class_average,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GradeRecord {
    #[serde(deserialize_with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub value: Option<GradeValue>,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSeries {
    pub subject: String,
    pub title: String,
    #[serde(deserialize_with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub series: Option<Vec<GradeRecord>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AveragePoint {
    pub student: f64,
    pub class: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedSummary {
    pub weighted_sum: f64,
    pub total_weight: f64,
    pub count: usize,
}

impl WeightedSummary {
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 || self.total_weight <= 0.0 {
            None
        } else {
            Some(self.weighted_sum / self.total_weight)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeriodKey {
    pub title: String,
    pub year: i32,
}

pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawNumber::Number(value)) => Some(value),
        Some(RawNumber::Text(text)) => parse_number(&text),
        Some(RawNumber::Other(_)) => Some(f64::NAN),
        None => None,
    })
}

fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_date(&text).ok_or_else(|| de::Error::custom(format!("invalid date {text:?}")))
}
