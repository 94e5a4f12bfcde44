//! The crate's single error taxonomy.
//!
//! Every fallible public operation returns [`CgResult<T>`]; there is no
//! panicking path for input-dependent failures. The eight variants below are
//! exhaustive by design (new failure modes should fit one of them rather
//! than growing the enum).

use thiserror::Error;

use crate::shape::ShapeError;
use crate::tensor::TensorError;

/// Result alias used throughout the crate.
pub type CgResult<T> = Result<T, CgError>;

#[derive(Error, Debug)]
pub enum CgError {
    /// Bad types, out-of-range hyperparameters, negative or non-integer shape
    /// entries, malformed operator construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Node lookup by name failed.
    #[error("cannot find node '{0}'")]
    NotFound(String),

    /// Read of a `value` or `grad` that has not been set.
    #[error("node '{0}' has no value")]
    NoValue(String),

    /// A node constructor ran with no session graph bound.
    #[error("no active graph has been set")]
    NoActiveGraph,

    /// An operator has no gradient callable for one of its inputs, or the
    /// backward target's cached value is not numeric.
    #[error("cannot differentiate input '{input}' of node '{node}'")]
    Undifferentiable { node: String, input: String },

    /// A gradient callable returned a tensor whose length does not match the
    /// corresponding input's value length.
    #[error("gradient of length {got} does not conform to input '{node}' of length {expected}")]
    NonConformingGradient {
        node: String,
        expected: usize,
        got: usize,
    },

    /// Internal traversal invariant violation; should be unreachable.
    #[error("stack is empty")]
    StackEmpty,

    /// A foreign forward or gradient callable returned an error.
    #[error("evaluation of node '{node}' failed: {detail}")]
    EvalFailed { node: String, detail: String },
}

impl From<ShapeError> for CgError {
    fn from(err: ShapeError) -> Self {
        CgError::InvalidArgument(err.0)
    }
}

impl From<TensorError> for CgError {
    fn from(err: TensorError) -> Self {
        CgError::InvalidArgument(err.to_string())
    }
}
