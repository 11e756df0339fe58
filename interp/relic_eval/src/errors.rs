//! Error types for the evaluation engine.
//!
//! `EvalErrorKind` provides typed error categories; factory functions are the
//! public construction API and populate both `kind` and `message`. Errors
//! carry the nearest enclosing source span and accumulate backtrace frames
//! while unwinding through invocation boundaries.
//!
//! "Relation does not hold" is never an error; it flows through
//! [`Outcome::NotMatched`](crate::Outcome::NotMatched).

use relic_ir::Span;
use std::fmt;

/// Result of an evaluation step.
pub type EvalResult<T> = Result<T, EvalError>;

/// Which namespace a failed lookup searched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameKind {
    Var,
    Type,
    Func,
    Rel,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var => write!(f, "variable"),
            Self::Type => write!(f, "type"),
            Self::Func => write!(f, "function"),
            Self::Rel => write!(f, "relation"),
        }
    }
}

/// Typed error category for structured diagnostics.
///
/// Each variant carries the data the condition needs, so callers match on
/// kinds instead of parsing message strings. The `Display` impl produces the
/// message the factory functions store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A name lookup missed every environment and global table.
    UnboundName { kind: NameKind, name: String },
    /// Wrong number of arguments, positions, or destructuring elements.
    ArityMismatch {
        what: String,
        expected: usize,
        got: usize,
    },
    /// A destructuring assignment met an incompatible shape.
    PatternMatchFailure { reason: String },
    /// A defined operation was applied outside its domain.
    InvalidOperation { reason: String },
    /// Type substitution attempted with a function-typed argument.
    TypeSubstitutionError { reason: String },
    /// A construct the engine explicitly does not support.
    NotImplemented { feature: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundName { kind, name } => write!(f, "unbound {kind}: {name}"),
            Self::ArityMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what} expects {expected}, got {got}"),
            Self::PatternMatchFailure { reason } => write!(f, "pattern match failure: {reason}"),
            Self::InvalidOperation { reason } => write!(f, "invalid operation: {reason}"),
            Self::TypeSubstitutionError { reason } => {
                write!(f, "type substitution error: {reason}")
            }
            Self::NotImplemented { feature } => write!(f, "not implemented: {feature}"),
        }
    }
}

/// A single frame in an evaluation backtrace: one function or relation
/// invocation in the chain at the point where the error occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Function or relation name.
    pub name: String,
    /// Source location of the invocation.
    pub span: Span,
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message, equal to `kind.to_string()`.
    pub message: String,
    /// Source location where the error was raised.
    pub span: Span,
    /// Invocation frames accumulated while unwinding, innermost first.
    pub frames: Vec<Frame>,
}

impl EvalError {
    fn from_kind(kind: EvalErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            span,
            frames: Vec::new(),
        }
    }

    /// Record an invocation boundary this error unwound through.
    #[must_use]
    pub fn with_frame(mut self, name: impl Into<String>, span: Span) -> Self {
        self.frames.push(Frame {
            name: name.into(),
            span,
        });
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)?;
        for (i, frame) in self.frames.iter().enumerate() {
            write!(f, "\n  {i}: {} at {}", frame.name, frame.span)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// A name lookup missed.
#[cold]
pub fn unbound_name(kind: NameKind, name: &str, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::UnboundName {
            kind,
            name: name.to_string(),
        },
        span,
    )
}

/// Wrong argument or position count.
#[cold]
pub fn arity_mismatch(what: &str, expected: usize, got: usize, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ArityMismatch {
            what: what.to_string(),
            expected,
            got,
        },
        span,
    )
}

/// A destructuring assignment met an incompatible shape.
#[cold]
pub fn pattern_match_failure(reason: impl Into<String>, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::PatternMatchFailure {
            reason: reason.into(),
        },
        span,
    )
}

/// A defined operation was applied outside its domain.
#[cold]
pub fn invalid_operation(reason: impl Into<String>, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::InvalidOperation {
            reason: reason.into(),
        },
        span,
    )
}

/// Type substitution attempted with a function-typed argument.
#[cold]
pub fn type_substitution_error(reason: impl Into<String>, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::TypeSubstitutionError {
            reason: reason.into(),
        },
        span,
    )
}

/// A construct the engine explicitly does not support.
#[cold]
pub fn not_implemented(feature: impl Into<String>, span: Span) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotImplemented {
            feature: feature.into(),
        },
        span,
    )
}
