//! The graph: owns nodes, assigns ids/names, and runs forward/backward.

use std::cell::RefCell;
use std::rc::Rc;

use crate::autograd::function::{Arg, Function};
use crate::autograd::node::{InputRef, Node, NodeId, NodeKind, NodeOrConstant, OperatorInput};
use crate::autograd::stack::Stack;
use crate::error::{CgError, CgResult};
use crate::session;
use crate::tensor::Tensor;

struct NodeData {
    name: String,
    kind: NodeKind,
    value: Option<Tensor>,
    grad: Option<Tensor>,
    inputs: Vec<InputRef>,
    function: Option<Rc<Function>>,
}

struct GraphInner {
    nodes: Vec<NodeData>,
    eager: bool,
}

/// Owner of a computation graph's nodes. Cheaply cloneable: clones share the
/// same underlying node storage (`Rc<RefCell<_>>`), so a `Graph` handle
/// behaves like a reference to the one graph it was created from.
#[derive(Clone)]
pub struct Graph(Rc<RefCell<GraphInner>>);

impl Graph {
    /// Create an empty graph and mark it current in the session.
    pub fn new(eager: bool) -> Self {
        let graph = Graph(Rc::new(RefCell::new(GraphInner {
            nodes: Vec::new(),
            eager,
        })));
        session::set_graph(graph.clone());
        graph
    }

    pub fn eager(&self) -> bool {
        self.0.borrow().eager
    }

    pub fn node_count(&self) -> usize {
        self.0.borrow().nodes.len()
    }

    /// `v<len(nodes)+1>`, the name the next node would receive by default.
    pub fn gen_name(&self) -> String {
        format!("v{}", self.0.borrow().nodes.len() + 1)
    }

    /// Most recently inserted node with the given name.
    pub fn get(&self, name: &str) -> CgResult<Node> {
        let inner = self.0.borrow();
        for (i, node) in inner.nodes.iter().enumerate().rev() {
            if node.name == name {
                return Ok(Node {
                    graph: self.clone(),
                    id: i + 1,
                });
            }
        }
        Err(CgError::NotFound(name.to_string()))
    }

    fn add_node(&self, data: NodeData) -> NodeId {
        let mut inner = self.0.borrow_mut();
        inner.nodes.push(data);
        inner.nodes.len()
    }

    fn default_name(&self, name: Option<String>, id: NodeId) -> String {
        name.unwrap_or_else(|| format!("v{id}"))
    }

    pub fn constant(&self, value: Tensor, name: Option<&str>) -> Node {
        let id = self.0.borrow().nodes.len() + 1;
        let name = self.default_name(name.map(str::to_string), id);
        let id = self.add_node(NodeData {
            name,
            kind: NodeKind::Constant,
            value: Some(value),
            grad: None,
            inputs: Vec::new(),
            function: None,
        });
        Node {
            graph: self.clone(),
            id,
        }
    }

    /// `value` is duplicated on capture so optimizer updates never alias the
    /// caller's storage.
    pub fn parameter(&self, value: Tensor, name: Option<&str>) -> Node {
        let id = self.0.borrow().nodes.len() + 1;
        let name = self.default_name(name.map(str::to_string), id);
        let id = self.add_node(NodeData {
            name,
            kind: NodeKind::Parameter,
            value: Some(value.duplicate()),
            grad: None,
            inputs: Vec::new(),
            function: None,
        });
        Node {
            graph: self.clone(),
            id,
        }
    }

    pub fn input(&self, name: Option<&str>) -> Node {
        let id = self.0.borrow().nodes.len() + 1;
        let name = self.default_name(name.map(str::to_string), id);
        let id = self.add_node(NodeData {
            name,
            kind: NodeKind::Input,
            value: None,
            grad: None,
            inputs: Vec::new(),
            function: None,
        });
        Node {
            graph: self.clone(),
            id,
        }
    }

    /// `inputs` entries that are bare tensors are promoted to `Constant`
    /// nodes first (appended immediately before the operator). Fails with
    /// `InvalidArgument` if `inputs` is empty. If the graph is eager and
    /// every (promoted) input already has a value, the operator's forward
    /// function runs immediately.
    pub fn operator(
        &self,
        function: Rc<Function>,
        inputs: Vec<OperatorInput>,
        name: Option<&str>,
    ) -> CgResult<Node> {
        if inputs.is_empty() {
            return Err(CgError::InvalidArgument(
                "operator node requires at least one input".into(),
            ));
        }

        let mut refs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let node_id = match input.source {
                NodeOrConstant::Node(n) => n.id,
                NodeOrConstant::Constant(t) => self.constant(t, None).id,
            };
            refs.push(InputRef {
                node: node_id,
                tag: input.tag,
            });
        }

        let can_eval = {
            let inner = self.0.borrow();
            refs.iter()
                .all(|r| inner.nodes[r.node - 1].value.is_some())
        };

        let id = self.0.borrow().nodes.len() + 1;
        let name = self.default_name(name.map(str::to_string), id);
        let id = self.add_node(NodeData {
            name,
            kind: NodeKind::Operator,
            value: None,
            grad: None,
            inputs: refs,
            function: Some(function),
        });
        let node = Node {
            graph: self.clone(),
            id,
        };

        if self.eager() && can_eval {
            self.exec_forward(id)?;
        }

        Ok(node)
    }

    pub(crate) fn node_name(&self, id: NodeId) -> String {
        self.0.borrow().nodes[id - 1].name.clone()
    }

    pub(crate) fn node_kind(&self, id: NodeId) -> NodeKind {
        self.0.borrow().nodes[id - 1].kind
    }

    pub(crate) fn node_function(&self, id: NodeId) -> Option<Rc<Function>> {
        self.0.borrow().nodes[id - 1].function.clone()
    }

    pub(crate) fn node_value(&self, id: NodeId) -> CgResult<Tensor> {
        let inner = self.0.borrow();
        inner.nodes[id - 1]
            .value
            .clone()
            .ok_or_else(|| CgError::NoValue(inner.nodes[id - 1].name.clone()))
    }

    pub(crate) fn node_grad(&self, id: NodeId) -> CgResult<Option<Tensor>> {
        Ok(self.0.borrow().nodes[id - 1].grad.clone())
    }

    pub(crate) fn bind_input_value(&self, id: NodeId, value: Tensor) -> CgResult<()> {
        let mut inner = self.0.borrow_mut();
        let node = &mut inner.nodes[id - 1];
        if node.kind != NodeKind::Input {
            return Err(CgError::InvalidArgument(format!(
                "cannot bind a value to non-input node '{}'",
                node.name
            )));
        }
        node.value = Some(value);
        Ok(())
    }

    /// Overwrite a `Parameter` node's value in place. Used by optimizer
    /// steps and by gradient-check perturbation; fails on any other kind.
    pub(crate) fn set_parameter_value(&self, id: NodeId, value: Tensor) -> CgResult<()> {
        let mut inner = self.0.borrow_mut();
        let node = &mut inner.nodes[id - 1];
        if node.kind != NodeKind::Parameter {
            return Err(CgError::InvalidArgument(format!(
                "cannot overwrite value of non-parameter node '{}'",
                node.name
            )));
        }
        node.value = Some(value);
        Ok(())
    }

    /// Depth-first traversal over operator ancestors of `target`, per the
    /// "descend on first unvisited operator input" rule. Returns the
    /// post-order (inputs before consumers); callers reverse it themselves
    /// for backward mode.
    fn postorder(&self, target: NodeId) -> CgResult<Vec<NodeId>> {
        let inner = self.0.borrow();
        let n = inner.nodes.len();
        if target < 1 || target > n {
            return Err(CgError::InvalidArgument(format!(
                "cannot retrieve node with id {target}"
            )));
        }

        let mut visited = vec![false; n];
        let mut stack: Stack<NodeId> = Stack::new();
        stack.push(target);
        visited[target - 1] = true;

        let mut order = Vec::new();
        while !stack.is_empty() {
            let node_id = *stack.top()?;
            let node = &inner.nodes[node_id - 1];

            let mut descended = false;
            for input in &node.inputs {
                let input_id = input.node;
                if !visited[input_id - 1] && inner.nodes[input_id - 1].kind == NodeKind::Operator {
                    visited[input_id - 1] = true;
                    stack.push(input_id);
                    descended = true;
                    break;
                }
            }

            if !descended {
                order.push(stack.pop()?);
            }
        }

        Ok(order)
    }

    fn exec_forward(&self, node_id: NodeId) -> CgResult<()> {
        let (function, owned_args) = {
            let inner = self.0.borrow();
            let node = &inner.nodes[node_id - 1];
            let function = node
                .function
                .clone()
                .expect("operator node must carry a function");
            let mut owned_args = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                let input_node = &inner.nodes[input.node - 1];
                let value = input_node
                    .value
                    .clone()
                    .ok_or_else(|| CgError::NoValue(input_node.name.clone()))?;
                owned_args.push((input.tag.clone(), value));
            }
            (function, owned_args)
        };

        let args: Vec<Arg> = owned_args
            .iter()
            .map(|(tag, value)| Arg {
                tag: tag.as_deref(),
                value,
            })
            .collect();

        let node_name = self.node_name(node_id);
        let value = function
            .call_forward(&args)
            .map_err(|e| CgError::EvalFailed {
                node: node_name,
                detail: e.to_string(),
            })?;

        self.0.borrow_mut().nodes[node_id - 1].value = Some(value);
        Ok(())
    }

    fn exec_backward(&self, node_id: NodeId) -> CgResult<()> {
        let (function, owned_args, value, grad, inputs) = {
            let inner = self.0.borrow();
            let node = &inner.nodes[node_id - 1];
            let function = node
                .function
                .clone()
                .expect("operator node must carry a function");
            let mut owned_args = Vec::with_capacity(node.inputs.len());
            for input in &node.inputs {
                let input_node = &inner.nodes[input.node - 1];
                let value = input_node
                    .value
                    .clone()
                    .ok_or_else(|| CgError::NoValue(input_node.name.clone()))?;
                owned_args.push((input.tag.clone(), value));
            }
            let value = node
                .value
                .clone()
                .ok_or_else(|| CgError::NoValue(node.name.clone()))?;
            let grad = node
                .grad
                .clone()
                .ok_or_else(|| CgError::NoValue(format!("{}.grad", node.name)))?;
            (function, owned_args, value, grad, node.inputs.clone())
        };

        let args: Vec<Arg> = owned_args
            .iter()
            .map(|(tag, value)| Arg {
                tag: tag.as_deref(),
                value,
            })
            .collect();

        let node_name = self.node_name(node_id);

        for (i, input) in inputs.iter().enumerate() {
            let input_kind = self.node_kind(input.node);
            if input_kind == NodeKind::Constant {
                continue;
            }

            let grad_fn = function.grad_for(i, input.tag.as_deref()).ok_or_else(|| {
                CgError::Undifferentiable {
                    node: node_name.clone(),
                    input: self.node_name(input.node),
                }
            })?;

            let g = grad_fn(&args, &value, &grad).map_err(|e| CgError::EvalFailed {
                node: node_name.clone(),
                detail: e.to_string(),
            })?;

            self.accumulate_grad(input.node, g)?;
        }

        Ok(())
    }

    fn accumulate_grad(&self, id: NodeId, g: Tensor) -> CgResult<()> {
        let mut inner = self.0.borrow_mut();
        let target_len = inner.nodes[id - 1]
            .value
            .as_ref()
            .map(Tensor::len)
            .unwrap_or_else(|| g.len());
        let node = &mut inner.nodes[id - 1];

        match &mut node.grad {
            None => {
                if g.len() != target_len {
                    return Err(CgError::NonConformingGradient {
                        node: node.name.clone(),
                        expected: target_len,
                        got: g.len(),
                    });
                }
                node.grad = Some(g);
            }
            Some(existing) => {
                if existing.len() != g.len() {
                    return Err(CgError::NonConformingGradient {
                        node: node.name.clone(),
                        expected: existing.len(),
                        got: g.len(),
                    });
                }
                let summed: Vec<f64> = existing
                    .as_real()
                    .iter()
                    .zip(g.as_real().iter())
                    .map(|(a, b)| a + b)
                    .collect();
                *existing = Tensor::with_shape_of(summed, existing)?;
            }
        }
        Ok(())
    }

    /// Evaluate `target` and every operator ancestor, in topological order.
    pub fn forward(&self, target: &Node) -> CgResult<()> {
        if target.kind() != NodeKind::Operator {
            return Err(CgError::InvalidArgument(
                "forward target must be an operator node".into(),
            ));
        }
        let order = self.postorder(target.id)?;
        for node_id in order {
            self.exec_forward(node_id)?;
        }
        Ok(())
    }

    /// Clear every node's gradient, seed `target`'s, and accumulate
    /// gradients into every reachable ancestor in reverse topological order.
    pub fn backward(&self, target: &Node, index: Option<usize>) -> CgResult<()> {
        if target.kind() != NodeKind::Operator {
            return Err(CgError::InvalidArgument(
                "backward target must be an operator node".into(),
            ));
        }

        {
            let mut inner = self.0.borrow_mut();
            for node in inner.nodes.iter_mut() {
                node.grad = None;
            }
        }

        let target_value = self.node_value(target.id)?;
        let m = target_value.len();

        let mut seed = vec![0.0; m];
        match index {
            Some(k) => {
                if k < 1 || k > m {
                    return Err(CgError::InvalidArgument(format!(
                        "index {k} out of bounds for length {m}"
                    )));
                }
                seed[k - 1] = 1.0;
            }
            None => seed.iter_mut().for_each(|v| *v = 1.0),
        }
        let seed_tensor = Tensor::with_shape_of(seed, &target_value)?;
        self.0.borrow_mut().nodes[target.id - 1].grad = Some(seed_tensor);

        let mut order = self.postorder(target.id)?;
        order.reverse();
        for node_id in order {
            self.exec_backward(node_id)?;
        }
        Ok(())
    }
}
