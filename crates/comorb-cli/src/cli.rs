//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use comorb_model::{ScoreType, WeightScheme};

#[derive(Parser)]
#[command(
    name = "comorbidity-risk",
    version,
    about = "Charlson and Elixhauser comorbidity scoring from diagnosis extracts",
    long_about = "Compute Charlson and Elixhauser comorbidity indices from a diagnosis extract.\n\n\
                  ICD-9 and ICD-10 codes are scored separately with the R comorbidity package\n\
                  and merged into one matrix per patient. The risk-series command repeats this\n\
                  over a cumulative monthly window and writes one risk column per month."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the combined comorbidity matrix and score every patient.
    Matrix(MatrixArgs),

    /// Compute cumulative monthly risk scores for every patient.
    RiskSeries(RiskSeriesArgs),

    /// List the categories of a comorbidity index.
    Categories(CategoriesArgs),
}

#[derive(Args)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Comorbidity index to compute.
    #[arg(long = "score", value_enum, default_value = "charlson")]
    pub score: ScoreArg,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Write the combined matrix with a score column to this CSV file.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct RiskSeriesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Comorbidity index to compute.
    #[arg(long = "score", value_enum, default_value = "elixhauser")]
    pub score: ScoreArg,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Output CSV (default: <INPUT dir>/<score>_risk_over_time.csv).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Print the summary as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct CategoriesArgs {
    /// Comorbidity index whose categories to list.
    #[arg(long = "score", value_enum, default_value = "charlson")]
    pub score: ScoreArg,
}

/// Diagnosis extract location, layout and R setup.
#[derive(Args)]
pub struct InputArgs {
    /// Diagnosis extract (CSV or other delimited text).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Read at most N data rows.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,

    /// Field delimiter (single ASCII character).
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,

    #[arg(long = "patient-column", default_value = "patient_id")]
    pub patient_column: String,

    #[arg(long = "code-column", default_value = "icd_code")]
    pub code_column: String,

    /// Column holding the ICD revision (9 or 10).
    #[arg(long = "icd-type-column", default_value = "icd_type")]
    pub icd_type_column: String,

    #[arg(long = "datetime-column", default_value = "diagnosis_datetime")]
    pub datetime_column: String,

    /// Rscript executable.
    #[arg(long = "rscript", value_name = "PATH", default_value = "Rscript")]
    pub rscript: PathBuf,
}

#[derive(Args)]
pub struct ScoringArgs {
    /// Weighting scheme (default: charlson for Charlson, swiss for Elixhauser).
    #[arg(long = "weights", value_enum)]
    pub weights: Option<WeightsArg>,

    /// Score a cohort with only ICD-9 or only ICD-10 codes on its own.
    ///
    /// Charlson runs require both revisions by default.
    #[arg(long = "allow-partial-cohort")]
    pub allow_partial_cohort: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScoreArg {
    Charlson,
    Elixhauser,
}

impl From<ScoreArg> for ScoreType {
    fn from(value: ScoreArg) -> Self {
        match value {
            ScoreArg::Charlson => ScoreType::Charlson,
            ScoreArg::Elixhauser => ScoreType::Elixhauser,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WeightsArg {
    Charlson,
    Quan,
    /// van Walraven weights.
    Vw,
    Swiss,
}

impl From<WeightsArg> for WeightScheme {
    fn from(value: WeightsArg) -> Self {
        match value {
            WeightsArg::Charlson => WeightScheme::Charlson,
            WeightsArg::Quan => WeightScheme::Quan,
            WeightsArg::Vw => WeightScheme::VanWalraven,
            WeightsArg::Swiss => WeightScheme::Swiss,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("comorbidity-risk").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn both_scoring_commands_accept_json() {
        let Command::RiskSeries(args) = parse(&["risk-series", "dx.csv", "--json"]).command else {
            panic!("expected risk-series");
        };
        assert!(args.json);
        assert!(!args.no_progress);
        assert!(matches!(args.score, ScoreArg::Elixhauser));

        let Command::Matrix(args) = parse(&["matrix", "dx.csv", "--json"]).command else {
            panic!("expected matrix");
        };
        assert!(args.json);
        assert!(matches!(args.score, ScoreArg::Charlson));
    }

    #[test]
    fn risk_series_defaults_to_table_output() {
        let Command::RiskSeries(args) = parse(&["risk-series", "dx.csv"]).command else {
            panic!("expected risk-series");
        };
        assert!(!args.json);
        assert_eq!(args.input.input, PathBuf::from("dx.csv"));
    }
}
