use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use grade_history::average::{summarize, DEFAULT_SCALE};
use grade_history::history::{dated_history, round_display};
use grade_history::import::load_series;
use grade_history::models::{GradeRecord, GradeType};
use grade_history::periods::{
    distinct_periods, filter_by_subject, flatten_records, resolve_year, select_subjects,
};
use grade_history::report;

#[derive(Parser)]
#[command(name = "grade-history")]
#[command(about = "Weighted grade averages and their progression", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Grade document (.json time series or .csv rows)
    #[arg(long)]
    input: PathBuf,
    /// Common scale grades are normalized onto
    #[arg(long, env = "GRADES_SCALE", default_value_t = DEFAULT_SCALE)]
    scale: f64,
    /// Period title, defaults to the first period in the document
    #[arg(long)]
    period: Option<String>,
    /// Year the period starts in
    #[arg(long)]
    year: Option<i32>,
    /// Only keep grades of this subject
    #[arg(long)]
    subject: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Student,
    ClassAverage,
}

impl From<TypeArg> for GradeType {
    fn from(value: TypeArg) -> Self {
        match value {
            TypeArg::Student => GradeType::Student,
            TypeArg::ClassAverage => GradeType::ClassAverage,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HistoryFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// List the periods available in a document
    Periods {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the weighted average of the selected grades
    Average {
        #[command(flatten)]
        selection: Selection,
        #[arg(long = "type", value_enum, default_value_t = TypeArg::Student)]
        grade_type: TypeArg,
    },
    /// Print the running average after each grade
    History {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, value_enum, default_value_t = HistoryFormat::Table)]
        format: HistoryFormat,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        selection: Selection,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

struct Selected {
    scope: String,
    records: Vec<GradeRecord>,
}

fn select(selection: &Selection) -> anyhow::Result<Selected> {
    let all = load_series(&selection.input)?;
    let periods = distinct_periods(&all);

    let title = match &selection.period {
        Some(title) => title.clone(),
        None => periods
            .first()
            .map(|p| p.title.clone())
            .context("document contains no periods")?,
    };
    let requested_year = match selection.year {
        Some(year) => year,
        None => periods
            .iter()
            .find(|p| p.title == title)
            .map(|p| p.year)
            .with_context(|| format!("no period titled {title:?}"))?,
    };
    let year = resolve_year(&periods, &title, requested_year);
    if year != requested_year {
        warn!(period = %title, requested_year, year, "period not offered in requested year");
    }

    let subjects = select_subjects(&all, &title, year);
    let mut records = flatten_records(&subjects);
    let mut scope = format!("{title} {year}");

    if let Some(subject) = &selection.subject {
        records = filter_by_subject(&records, subject);
        scope = format!("{subject}, {scope}");
    }

    info!(scope = %scope, grades = records.len(), "selected grades");
    Ok(Selected { scope, records })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Periods { input } => {
            let all = load_series(&input)?;
            let periods = distinct_periods(&all);

            if periods.is_empty() {
                println!("No periods found.");
                return Ok(());
            }

            println!("Available periods:");
            for period in periods {
                println!("- {} ({})", period.title, period.year);
            }
        }
        Commands::Average {
            selection,
            grade_type,
        } => {
            let selected = select(&selection)?;
            let grade_type = GradeType::from(grade_type);
            let summary = summarize(&selected.records, grade_type, selection.scale);

            match summary.average() {
                Some(average) => println!(
                    "{} average for {}: {:.2}/{} across {} grades",
                    grade_type.label(),
                    selected.scope,
                    round_display(average),
                    selection.scale,
                    summary.count
                ),
                None => println!("No usable grades for {}.", selected.scope),
            }
        }
        Commands::History { selection, format } => {
            let selected = select(&selection)?;

            match format {
                HistoryFormat::Table => {
                    let dated = dated_history(&selected.records, selection.scale);
                    if dated.is_empty() {
                        println!("No grades for {}.", selected.scope);
                        return Ok(());
                    }
                    println!("Progression for {}:", selected.scope);
                    for (date, point) in dated {
                        println!(
                            "- {} student {:.2} class {:.2}",
                            date,
                            round_display(point.student),
                            round_display(point.class)
                        );
                    }
                }
                HistoryFormat::Json => {
                    let chart = report::chart_data(&selected.records, selection.scale);
                    println!("{}", serde_json::to_string_pretty(&chart)?);
                }
                HistoryFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    writer.write_record(["date", "student", "class"])?;
                    for (date, point) in dated_history(&selected.records, selection.scale) {
                        writer.write_record([
                            date.to_string(),
                            point.student.to_string(),
                            point.class.to_string(),
                        ])?;
                    }
                    writer.flush()?;
                }
            }
        }
        Commands::Report { selection, out } => {
            let selected = select(&selection)?;
            let report = report::build_report(
                Some(selected.scope.as_str()),
                selection.scale,
                &selected.records,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
