use crate::infra::build_standing_service;
use academic_standing::config::AppConfig;
use academic_standing::error::AppError;
use academic_standing::standing::StudentId;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SummarizeArgs {
    /// Student identifier as it appears in the registrar export
    #[arg(long)]
    pub(crate) student: String,
    /// Study year to summarize. Defaults to the latest registered term.
    #[arg(long, requires = "term")]
    pub(crate) year: Option<u16>,
    /// Study term ordinal: 1 (first), 2 (second) or 3 (summer)
    #[arg(long, requires = "year")]
    pub(crate) term: Option<u8>,
    /// Directory of registrar CSV exports (overrides STANDING_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Date stamped on the report (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Summarize every student's latest term before reporting
    #[arg(long)]
    pub(crate) refresh: bool,
    /// Emit JSON instead of markdown
    #[arg(long)]
    pub(crate) json: bool,
    /// Directory of registrar CSV exports (overrides STANDING_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) fn run_summarize(args: SummarizeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_standing_service(&config.standing, args.data_dir.as_deref())?;
    let student_id = StudentId(args.student);

    let summary = match (args.year, args.term) {
        (Some(year), Some(term)) => service.build_or_update(&student_id, year, term)?,
        _ => service.summarize_latest(&student_id)?,
    };

    match summary {
        Some(summary) => {
            let rendered = serde_json::to_string_pretty(&summary).map_err(std::io::Error::from)?;
            println!("{rendered}");
            let decision =
                service.classify_student(&student_id, summary.study_year, summary.study_term.into())?;
            println!("Status: {} ({})", decision.status.label(), decision.reason.summary());
        }
        None => println!("No graded registrations for {student_id} in the requested term."),
    }

    Ok(())
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_standing_service(&config.standing, args.data_dir.as_deref())?;

    if args.refresh {
        let summaries = service.summarize_cohort()?;
        println!("Refreshed {} term summaries.", summaries.len());
        println!();
    }

    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let report = service.standing_report(as_of)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", report.render());
    }

    Ok(())
}
