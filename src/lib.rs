//! autodiff_core: a reverse-mode automatic differentiation engine built
//! around an explicit computation graph.
//!
//! Layers: [`tensor`]/[`shape`] (storage) -> [`kernels`] (numeric
//! primitives) -> [`autograd`] (graph, nodes, the foreign callable contract,
//! forward/backward) -> [`optimizer`]/[`init`] (training-adjacent surface).
//! [`session`] holds the thread-local "current graph" every node
//! constructor reads implicitly.
//!
//! Determinism: call [`runtime::set_seed`] before constructing parameters to
//! get reproducible initializer draws.

pub mod autograd;
pub mod error;
pub mod init;
pub mod kernels;
pub mod optimizer;
pub mod runtime;
pub mod session;
pub mod shape;
pub mod tensor;

pub use autograd::{
    backward, constant, forward, input, operator, parameter, Arg, ForwardFn, Function, Graph,
    GradFn, Node, NodeId, NodeKind, NodeOrConstant, OperatorInput,
};
pub use error::{CgError, CgResult};
pub use optimizer::{Optimizer, OptimizerKind};
pub use runtime::{set_seed, with_rng};
pub use session::current_graph;
pub use shape::{Shape, ShapeError};
pub use tensor::{Tensor, TensorError, TensorResult};
