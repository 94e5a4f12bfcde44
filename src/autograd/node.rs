//! Node handles and the tagged-union node kind.
//!
//! A [`Node`] is a lightweight handle (a graph reference plus an id) rather
//! than an owning struct: the actual node data lives inside the `Graph` it
//! was registered with, indexed by id. This mirrors the graph owning a flat
//! `Vec` of node records and every other component working with ids into it.

use std::rc::Rc;

use crate::autograd::function::Function;
use crate::autograd::graph::Graph;
use crate::error::CgResult;
use crate::tensor::Tensor;

pub type NodeId = usize;

/// The four node kinds. No fifth "non-differentiable operator" kind (see
/// the design notes on why that variant from the source system is omitted).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    Constant,
    Parameter,
    Input,
    Operator,
}

/// An operator's reference to one of its inputs, carrying the inputs'
/// declaration order and optional tag.
#[derive(Clone)]
pub struct InputRef {
    pub node: NodeId,
    pub tag: Option<String>,
}

/// Something that can be wired up as an operator input: either a node
/// already registered with the graph, or a bare tensor that gets promoted to
/// a fresh `Constant` node first.
pub enum NodeOrConstant {
    Node(Node),
    Constant(Tensor),
}

impl From<Node> for NodeOrConstant {
    fn from(n: Node) -> Self {
        NodeOrConstant::Node(n)
    }
}

impl From<Tensor> for NodeOrConstant {
    fn from(t: Tensor) -> Self {
        NodeOrConstant::Constant(t)
    }
}

/// One entry of the `inputs` list passed to `operator(...)`.
pub struct OperatorInput {
    pub(crate) tag: Option<String>,
    pub(crate) source: NodeOrConstant,
}

impl OperatorInput {
    pub fn tagged(tag: impl Into<String>, source: impl Into<NodeOrConstant>) -> Self {
        OperatorInput {
            tag: Some(tag.into()),
            source: source.into(),
        }
    }
}

impl<T: Into<NodeOrConstant>> From<T> for OperatorInput {
    fn from(source: T) -> Self {
        OperatorInput {
            tag: None,
            source: source.into(),
        }
    }
}

/// A handle to a node registered with some [`Graph`]. Cheap to clone: it
/// clones the graph's `Rc` and copies the id, it does not duplicate node
/// data.
#[derive(Clone)]
pub struct Node {
    pub(crate) graph: Graph,
    pub(crate) id: NodeId,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("id", &self.id).finish()
    }
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> String {
        self.graph.node_name(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.graph.node_kind(self.id)
    }

    /// The node's cached value. Fails with `NoValue` if unset.
    pub fn value(&self) -> CgResult<Tensor> {
        self.graph.node_value(self.id)
    }

    /// The node's accumulated gradient, if any has been accumulated yet.
    pub fn grad(&self) -> CgResult<Option<Tensor>> {
        self.graph.node_grad(self.id)
    }

    /// The `Function` backing an operator node.
    pub(crate) fn function(&self) -> Option<Rc<Function>> {
        self.graph.node_function(self.id)
    }

    /// Bind an externally supplied value to an `Input` node. Fails with
    /// `InvalidArgument` on any other node kind.
    pub fn bind_value(&self, value: Tensor) -> CgResult<()> {
        self.graph.bind_input_value(self.id, value)
    }

    /// Overwrite a `Parameter` node's value in place. Fails with
    /// `InvalidArgument` on any other node kind.
    pub fn set_value(&self, value: Tensor) -> CgResult<()> {
        self.graph.set_parameter_value(self.id, value)
    }

    /// The graph this node belongs to.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}
