use crate::commands::{run_report, run_summarize, ReportArgs, SummarizeArgs};
use crate::server;
use academic_standing::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Academic Standing",
    about = "Evaluate term summaries and academic standing from registrar exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build the term summary of one student and print it as JSON
    Summarize(SummarizeArgs),
    /// Print the standing of every student as of a date
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Summarize(args) => run_summarize(args),
        Command::Report(args) => run_report(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["academic-standing-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn summarize_accepts_explicit_term() {
        let cli = Cli::try_parse_from([
            "academic-standing-api",
            "summarize",
            "--student",
            "6520500001",
            "--year",
            "1",
            "--term",
            "2",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Summarize(args)) => {
                assert_eq!(args.student, "6520500001");
                assert_eq!(args.year, Some(1));
                assert_eq!(args.term, Some(2));
            }
            other => panic!("expected summarize, got {other:?}"),
        }
    }

    #[test]
    fn summarize_requires_year_and_term_together() {
        let result = Cli::try_parse_from([
            "academic-standing-api",
            "summarize",
            "--student",
            "6520500001",
            "--year",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn report_parses_as_of_date() {
        let cli = Cli::try_parse_from([
            "academic-standing-api",
            "report",
            "--as-of",
            "2024-05-31",
            "--refresh",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Report(args)) => {
                assert_eq!(
                    args.as_of,
                    chrono::NaiveDate::from_ymd_opt(2024, 5, 31)
                );
                assert!(args.refresh);
            }
            other => panic!("expected report, got {other:?}"),
        }
    }
}
