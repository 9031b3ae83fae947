use std::fmt;
use std::path::PathBuf;

/// Bracket structure defects found while building an interpreter.
///
/// Both variants are raised before a single instruction executes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// A `]` with no open `[` to close.
    #[error("Unmatched bracket ']' at instruction {index} (source offset {offset})")]
    UnmatchedLoopEnd { index: usize, offset: usize },

    /// A `[` still open when the program ends. Reports the innermost one.
    #[error("Unmatched bracket '[' at instruction {index} (source offset {offset})")]
    UnmatchedLoopStart { index: usize, offset: usize },
}

impl StructuralError {
    /// Character offset in the original source, for caret diagnostics.
    pub fn offset(&self) -> usize {
        match self {
            StructuralError::UnmatchedLoopEnd { offset, .. }
            | StructuralError::UnmatchedLoopStart { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> UnmatchedBracketKind {
        match self {
            StructuralError::UnmatchedLoopEnd { .. } => UnmatchedBracketKind::Close,
            StructuralError::UnmatchedLoopStart { .. } => UnmatchedBracketKind::Open,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}

/// Failure to obtain program text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {} as UTF-8: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Anything that can stop [`crate::Interpreter::from_file`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// A bounded run stopped before the program finished.
///
/// Carries whatever the program printed up to that point.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunAborted {
    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize, output: String },

    /// Execution aborted due to cooperative cancellation (timeout, Ctrl+C).
    #[error("Execution aborted: cancelled")]
    Canceled { output: String },
}

impl RunAborted {
    pub fn partial_output(&self) -> &str {
        match self {
            RunAborted::StepLimitExceeded { output, .. } | RunAborted::Canceled { output } => output,
        }
    }
}
