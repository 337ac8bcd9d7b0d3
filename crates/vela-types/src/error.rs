//! Unification errors.
//!
//! Every failure is an ordinary value carrying the two types involved and
//! a [`Span`]; the engine never panics on user input. Structural failures
//! inside arrays, tuples and functions are wrapped in
//! [`TypeError::Positioned`] so diagnostics can point at the exact
//! sub-position that failed.

use thiserror::Error;

use crate::span::Span;
use crate::types::{Type, VarId};

pub type TypeResult<T> = Result<T, TypeError>;

/// Where inside a compound type a nested unification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    ArrayElement,
    TupleElement(usize),
    FunctionParams,
    FunctionResult,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::ArrayElement => f.write_str("array element"),
            Position::TupleElement(index) => write!(f, "tuple element {index}"),
            Position::FunctionParams => f.write_str("function parameters"),
            Position::FunctionResult => f.write_str("function result"),
        }
    }
}

/// Why two types failed to unify.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("Mismatched arity: expected {expected} of length {expected_len}, found {found} of length {found_len}")]
    ArityMismatch {
        expected: Type,
        found: Type,
        expected_len: usize,
        found_len: usize,
        span: Span,
    },

    #[error("Signedness mismatch: {left} is not compatible with {right}")]
    SignednessMismatch { left: Type, right: Type, span: Span },

    #[error("Constraint conflict on v{var}: {found} does not unify with {constraint}")]
    ConstraintViolation {
        var: VarId,
        constraint: Type,
        found: Type,
        span: Span,
    },

    #[error("No alternative of {choice} unifies with {target}")]
    ChoiceExhausted {
        choice: Type,
        target: Type,
        span: Span,
    },

    #[error("Cannot unify two polymorphic types: {left} and {right}")]
    Unsupported { left: Type, right: Type, span: Span },

    #[error("Unification exceeded the depth limit of {limit}")]
    DepthExceeded { limit: usize, span: Span },

    /// Occurs check failure: binding the variable would create a cyclic type.
    #[error("Infinite type: v{var} cannot equal {ty}")]
    InfiniteType { var: VarId, ty: Type, span: Span },

    /// Wrapper adding the sub-position where a structural unification failed.
    #[error("{position} mismatch: {source}")]
    Positioned {
        position: Position,
        #[source]
        source: Box<TypeError>,
        span: Span,
    },
}

impl TypeError {
    pub(crate) fn positioned(position: Position, source: TypeError, span: Span) -> TypeError {
        TypeError::Positioned {
            position,
            source: Box::new(source),
            span,
        }
    }

    /// The source location associated with this error.
    pub fn span(&self) -> Span {
        match self {
            TypeError::Mismatch { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::SignednessMismatch { span, .. }
            | TypeError::ConstraintViolation { span, .. }
            | TypeError::ChoiceExhausted { span, .. }
            | TypeError::Unsupported { span, .. }
            | TypeError::DepthExceeded { span, .. }
            | TypeError::InfiniteType { span, .. }
            | TypeError::Positioned { span, .. } => *span,
        }
    }

    /// Unwrap position wrappers down to the failure that started the chain.
    pub fn root_cause(&self) -> &TypeError {
        match self {
            TypeError::Positioned { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stable diagnostic code, taken from the root cause for wrapped errors.
    pub fn code(&self) -> &'static str {
        match self.root_cause() {
            TypeError::Mismatch { .. } => error_codes::TYPE_MISMATCH,
            TypeError::ArityMismatch { .. } => error_codes::ARITY_MISMATCH,
            TypeError::SignednessMismatch { .. } => error_codes::SIGNEDNESS_MISMATCH,
            TypeError::ConstraintViolation { .. } => error_codes::CONSTRAINT_VIOLATION,
            TypeError::ChoiceExhausted { .. } => error_codes::CHOICE_EXHAUSTED,
            TypeError::Unsupported { .. } => error_codes::UNSUPPORTED_UNIFICATION,
            TypeError::DepthExceeded { .. } => error_codes::DEPTH_EXCEEDED,
            TypeError::InfiniteType { .. } => error_codes::INFINITE_TYPE,
            TypeError::Positioned { .. } => unreachable!("root_cause never returns a wrapper"),
        }
    }
}

/// Error code constants for Vela type diagnostics
pub mod error_codes {
    pub const TYPE_MISMATCH: &str = "VT0001";
    pub const ARITY_MISMATCH: &str = "VT0002";
    pub const SIGNEDNESS_MISMATCH: &str = "VT0003";
    pub const CONSTRAINT_VIOLATION: &str = "VT0004";
    pub const CHOICE_EXHAUSTED: &str = "VT0005";
    pub const UNSUPPORTED_UNIFICATION: &str = "VT0006";
    pub const DEPTH_EXCEEDED: &str = "VT0007";
    pub const INFINITE_TYPE: &str = "VT0008";
}
