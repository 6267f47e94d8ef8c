use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use comorb_cli::pipeline::{
    ScoreStats, category_counts, ingest, latest_scores, output_matrix, output_series,
    risk_over_time, score_cohort,
};
use comorb_core::{CohortPolicy, ScoringOptions};
use comorb_ingest::{DiagnosisColumns, DiagnosisTable, IngestOptions};
use comorb_model::{IcdVersion, ScoreType, risk_column_label};
use comorb_output::default_risk_output_path;
use comorb_rbridge::{RConfig, RRuntime, RScorer};

use crate::cli::{CategoriesArgs, InputArgs, MatrixArgs, RiskSeriesArgs, ScoreArg, ScoringArgs};
use crate::summary::print_categories;
use crate::types::{InputSummary, MatrixResult, RiskSeriesResult};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

pub fn run_categories(args: &CategoriesArgs) -> Result<()> {
    print_categories(ScoreType::from(args.score));
    Ok(())
}

pub fn run_matrix(args: &MatrixArgs) -> Result<MatrixResult> {
    let options = scoring_options(args.score, &args.scoring)?;
    let span = info_span!("matrix", score_type = %options.score_type);
    let _guard = span.enter();

    let table = load_input(&args.input)?;
    let scorer = r_scorer(&args.input)?;
    let outcome = score_cohort(&table.records, &options, &scorer)?;
    if let Some(path) = &args.output {
        output_matrix(path, &outcome)?;
    }

    Ok(MatrixResult {
        input: input_summary(&args.input.input, &table),
        score_type: options.score_type,
        weights: options.weights,
        patients: outcome.matrix.height(),
        categories: category_counts(&outcome.matrix),
        scores: ScoreStats::from_scores(&outcome.scores),
        output: args.output.clone(),
    })
}

pub fn run_risk_series(args: &RiskSeriesArgs) -> Result<RiskSeriesResult> {
    let options = scoring_options(args.score, &args.scoring)?;
    let span = info_span!("risk_series", score_type = %options.score_type);
    let _guard = span.enter();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_risk_output_path(&args.input.input, options.score_type));

    let table = load_input(&args.input)?;
    let scorer = r_scorer(&args.input)?;

    let bar = progress_bar(args.no_progress);
    let series = risk_over_time(&table, &options, &scorer, |progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.index as u64);
        bar.set_message(risk_column_label(progress.month));
    });
    bar.finish_and_clear();
    let series = series?;

    output_series(&output, &series)?;
    info!(path = %output.display(), "risk series written");

    Ok(RiskSeriesResult {
        input: input_summary(&args.input.input, &table),
        score_type: options.score_type,
        weights: options.weights,
        patients: series.patient_count(),
        months: series.column_labels(),
        latest: ScoreStats::from_scores(&latest_scores(&series)),
        output,
    })
}

fn scoring_options(score: ScoreArg, args: &ScoringArgs) -> Result<ScoringOptions> {
    let mut options = ScoringOptions::new(score.into());
    if let Some(weights) = args.weights {
        options = options.with_weights(weights.into());
    }
    if args.allow_partial_cohort {
        options = options.with_cohort_policy(CohortPolicy::Lenient);
    }
    options.validate()?;
    Ok(options)
}

fn load_input(args: &InputArgs) -> Result<DiagnosisTable> {
    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", args.delimiter);
    }
    let delimiter = u8::try_from(args.delimiter).context("delimiter")?;
    let options = IngestOptions::default()
        .with_delimiter(delimiter)
        .with_max_rows(args.max_rows);
    let columns = DiagnosisColumns::default()
        .with_patient_id(&args.patient_column)
        .with_icd_code(&args.code_column)
        .with_icd_type(&args.icd_type_column)
        .with_diagnosis_datetime(&args.datetime_column);
    ingest(&args.input, &columns, &options)
}

fn r_scorer(args: &InputArgs) -> Result<RScorer> {
    let config = RConfig::default().with_rscript(&args.rscript);
    let runtime = RRuntime::init(config).context("initialize R runtime")?;
    Ok(RScorer::new(runtime))
}

fn input_summary(path: &Path, table: &DiagnosisTable) -> InputSummary {
    InputSummary {
        path: path.to_path_buf(),
        records: table.records.len(),
        icd9_records: table.count_by_version(IcdVersion::Icd9),
        icd10_records: table.count_by_version(IcdVersion::Icd10),
        skipped_records: table.skipped_unknown_version + table.skipped_blank_code,
    }
}

fn progress_bar(disabled: bool) -> ProgressBar {
    if disabled || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
