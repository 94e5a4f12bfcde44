//! Autograd: computation graph, the foreign callable contract, and the
//! backward pass that accumulates gradients into parameters.

pub mod check;
pub mod function;
pub mod graph;
pub mod node;
pub mod stack;

pub use function::{Arg, Function, ForwardFn, GradFn};
pub use graph::Graph;
pub use node::{Node, NodeId, NodeKind, NodeOrConstant, OperatorInput};

use std::rc::Rc;

use crate::error::CgResult;
use crate::session;
use crate::tensor::Tensor;

/// Register a constant node on the current graph's session.
pub fn constant(value: Tensor, name: Option<&str>) -> CgResult<Node> {
    Ok(session::current_graph()?.constant(value, name))
}

/// Register a parameter node on the current graph's session.
pub fn parameter(value: Tensor, name: Option<&str>) -> CgResult<Node> {
    Ok(session::current_graph()?.parameter(value, name))
}

/// Register an input node on the current graph's session.
pub fn input(name: Option<&str>) -> CgResult<Node> {
    Ok(session::current_graph()?.input(name))
}

/// Register an operator node on the current graph's session.
pub fn operator(
    function: Rc<Function>,
    inputs: Vec<OperatorInput>,
    name: Option<&str>,
) -> CgResult<Node> {
    session::current_graph()?.operator(function, inputs, name)
}

/// Run forward evaluation of `target` within `graph`.
pub fn forward(graph: &Graph, target: &Node) -> CgResult<()> {
    graph.forward(target)
}

/// Run the backward pass from `target` within `graph`.
pub fn backward(graph: &Graph, target: &Node, index: Option<usize>) -> CgResult<()> {
    graph.backward(target, index)
}
