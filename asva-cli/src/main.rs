//! ASVA command-line front-end
//!
//! Environment:
//!   ASVA_LOG       log filter on stderr (e.g. `debug`, `asva_select=debug`; default `info`)
//!   ASVA_PLOT_DIR  plot directory name next to the dataset (default Plots)

use asva::{load_dataset, AnalysisConfig, Asva, BatchReport};
use clap::error::ErrorKind;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ASVA_LOG";

/// Pick and run a hypothesis test for every measurement column of a
/// grouped dataset, and draw annotated box plots
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "asva-cli")]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// JSON array of flat records
    dataset: PathBuf,

    /// Categorical column holding the group labels
    group_column: String,

    /// Analyze only this column (repeatable; default is every column)
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,

    /// Skip chart output
    #[arg(long)]
    no_plots: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Log filter from `ASVA_LOG` directives, `info` when unset or invalid
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn init_logging() {
    let filter = log_filter(env::var(LOG_ENV).ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<BatchReport, asva::AsvaError> {
    let dataset = load_dataset(&args.dataset)?;
    let config = AnalysisConfig::from_env().with_plots(!args.no_plots);
    let asva = Asva::new().with_config(config);

    if args.columns.is_empty() {
        asva.analyze_all(&dataset, &args.group_column)
    } else {
        let columns: Vec<&str> = args.columns.iter().map(String::as_str).collect();
        asva.analyze_columns(&dataset, &args.group_column, &columns)
    }
}

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_logging();

    let batch = match run(&args) {
        Ok(batch) => batch,
        Err(e) => {
            error!(code = %e.code, "{}", e);
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&batch) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: cannot serialize report: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        print!("{}", batch.render_text());
    }
    ExitCode::SUCCESS
}
