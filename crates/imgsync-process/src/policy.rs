//! Per-step failure policies
//!
//! Which nonzero exits abort a run and which are only logged is declared
//! next to each step as a [`FailurePolicy`] value instead of being spread
//! through the calling code.

use crate::{Error, Result, ToolOutput};

/// What a nonzero exit of a step means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any nonzero exit aborts the run
    Fatal,
    /// Any nonzero exit is logged as a warning and the run continues
    WarnAndContinue,
    /// Only `code` with `marker` somewhere in the output is tolerated;
    /// every other nonzero exit is fatal
    TolerateDiagnostic {
        code: i32,
        marker: &'static str,
    },
}

/// How a completed step ended under its policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded(ToolOutput),
    Tolerated(ToolOutput),
}

impl StepOutcome {
    pub fn output(&self) -> &ToolOutput {
        match self {
            Self::Succeeded(out) | Self::Tolerated(out) => out,
        }
    }

    pub fn is_tolerated(&self) -> bool {
        matches!(self, Self::Tolerated(_))
    }
}

impl FailurePolicy {
    /// Whether a nonzero exit with this code and output is let through.
    pub fn tolerates(&self, code: i32, output: &str) -> bool {
        match self {
            Self::Fatal => false,
            Self::WarnAndContinue => true,
            Self::TolerateDiagnostic {
                code: allowed,
                marker,
            } => code == *allowed && output.contains(marker),
        }
    }

    /// Classify a finished step.
    pub fn evaluate(&self, label: &str, output: ToolOutput) -> Result<StepOutcome> {
        if output.success() {
            return Ok(StepOutcome::Succeeded(output));
        }

        let code = output.code_or_signal();
        if self.tolerates(code, &output.output) {
            tracing::warn!(
                step = %label,
                code,
                "Step exited nonzero, continuing:\n{}",
                output.output
            );
            return Ok(StepOutcome::Tolerated(output));
        }

        Err(Error::Failed {
            tool: label.to_string(),
            code,
            output: output.output,
        })
    }
}
