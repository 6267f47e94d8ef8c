//! Process-wide R runtime.
//!
//! The runtime is initialized once per process with [`RRuntime::init`]. It
//! verifies that `Rscript` runs and that the `comorbidity` package loads, then
//! writes the bundled R script to a directory owned by the runtime. Scorers
//! borrow the `'static` runtime and never initialize it themselves.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

use tempfile::TempDir;
use tracing::{debug, info};

use comorb_core::ScorerError;

const SCRIPT: &str = include_str!("comorbidity.R");
const SCRIPT_NAME: &str = "comorbidity.R";
const PACKAGE: &str = "comorbidity";
/// Exit status of the package probe when the package is missing.
const MISSING_PACKAGE_STATUS: i32 = 3;

static RUNTIME: OnceLock<RRuntime> = OnceLock::new();

/// Where to find R.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RConfig {
    /// `Rscript` executable, resolved through `PATH` when not absolute.
    pub rscript: PathBuf,
}

impl Default for RConfig {
    fn default() -> Self {
        Self {
            rscript: PathBuf::from("Rscript"),
        }
    }
}

impl RConfig {
    #[must_use]
    pub fn with_rscript(mut self, rscript: impl Into<PathBuf>) -> Self {
        self.rscript = rscript.into();
        self
    }
}

/// Initialized R environment shared by every scorer in the process.
#[derive(Debug)]
pub struct RRuntime {
    rscript: PathBuf,
    version: String,
    script: PathBuf,
    // Kept alive for the lifetime of the process; holds `script`.
    _workdir: TempDir,
}

impl RRuntime {
    /// Initializes the process-wide runtime.
    ///
    /// Fails with [`ScorerError::AlreadyInitialized`] when called a second
    /// time, and with [`ScorerError::Unavailable`] when R or the package
    /// cannot be used. A failed initialization leaves the runtime unset.
    pub fn init(config: RConfig) -> Result<&'static RRuntime, ScorerError> {
        if RUNTIME.get().is_some() {
            return Err(ScorerError::AlreadyInitialized);
        }
        let runtime = Self::start(config)?;
        RUNTIME
            .set(runtime)
            .map_err(|_| ScorerError::AlreadyInitialized)?;
        Self::get().ok_or_else(|| ScorerError::Unavailable("R runtime was not stored".to_string()))
    }

    /// The initialized runtime, if [`RRuntime::init`] succeeded.
    pub fn get() -> Option<&'static RRuntime> {
        RUNTIME.get()
    }

    fn start(config: RConfig) -> Result<Self, ScorerError> {
        let version = probe_version(&config.rscript)?;
        probe_package(&config.rscript)?;

        let workdir = tempfile::Builder::new().prefix("comorb-r-").tempdir()?;
        let script = workdir.path().join(SCRIPT_NAME);
        std::fs::write(&script, SCRIPT)?;

        info!(
            rscript = %config.rscript.display(),
            version = %version,
            "R runtime initialized"
        );
        Ok(Self {
            rscript: config.rscript,
            version,
            script,
            _workdir: workdir,
        })
    }

    pub fn rscript(&self) -> &Path {
        &self.rscript
    }

    /// First line of `Rscript --version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn script_path(&self) -> &Path {
        &self.script
    }

    /// Runs one command of the bundled script, mapping failures to
    /// [`ScorerError::Failed`].
    pub(crate) fn run_script<I, A>(&self, operation: &'static str, args: I) -> Result<(), ScorerError>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.rscript);
        command.arg("--vanilla").arg(&self.script).args(args);
        debug!(operation, "invoking Rscript");
        let output = command.output().map_err(|e| ScorerError::Failed {
            operation,
            message: format!("failed to run {}: {e}", self.rscript.display()),
        })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ScorerError::Failed {
                operation,
                message: failure_message(&output),
            })
        }
    }
}

fn probe_version(rscript: &Path) -> Result<String, ScorerError> {
    let output = Command::new(rscript)
        .arg("--version")
        .output()
        .map_err(|e| {
            ScorerError::Unavailable(format!("cannot run {}: {e}", rscript.display()))
        })?;
    if !output.status.success() {
        return Err(ScorerError::Unavailable(format!(
            "{} --version failed: {}",
            rscript.display(),
            failure_message(&output)
        )));
    }
    // Older R versions print the banner on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    Ok(text.lines().next().unwrap_or_default().trim().to_string())
}

fn probe_package(rscript: &Path) -> Result<(), ScorerError> {
    let probe = format!(
        "if (!requireNamespace('{PACKAGE}', quietly = TRUE)) quit(status = {MISSING_PACKAGE_STATUS})"
    );
    let output = Command::new(rscript)
        .args(["--vanilla", "-e", probe.as_str()])
        .output()
        .map_err(|e| {
            ScorerError::Unavailable(format!("cannot run {}: {e}", rscript.display()))
        })?;
    match output.status.code() {
        Some(0) => Ok(()),
        Some(MISSING_PACKAGE_STATUS) => Err(ScorerError::Unavailable(format!(
            "R package '{PACKAGE}' is not installed"
        ))),
        _ => Err(ScorerError::Unavailable(format!(
            "package check failed: {}",
            failure_message(&output)
        ))),
    }
}

/// Trimmed stderr, or the exit status when R printed nothing.
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.to_string()
    }
}
