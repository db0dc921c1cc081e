use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed; per-file failures may have been
///   reported but the run finished.
/// - `Failure` (1): Command completed but user action is required
///   (e.g. a config file already exists).
/// - `Error` (2): Fatal misconfiguration or internal error; no side effects.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
