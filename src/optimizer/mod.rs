//! Optimizer: a parameter list, hyperparameters, and a per-step update rule.
//! One `Optimizer` struct covers all five kinds; `step()` dispatches on
//! `kind` the same way node forward/backward dispatches on `NodeKind`.

use crate::autograd::{Graph, Node, NodeId, NodeKind};
use crate::error::{CgError, CgResult};
use crate::tensor::Tensor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptimizerKind {
    Sgd,
    Momentum,
    Adagrad,
    Rmsprop,
    Adam,
}

fn validate_parms(_graph: &Graph, parms: &[Node]) -> CgResult<Vec<NodeId>> {
    if parms.is_empty() {
        return Err(CgError::InvalidArgument(
            "optimizer requires at least one parameter".into(),
        ));
    }
    let mut ids = Vec::with_capacity(parms.len());
    for p in parms {
        if p.kind() != NodeKind::Parameter {
            return Err(CgError::InvalidArgument(format!(
                "optimizer parameter '{}' is not a parameter node",
                p.name()
            )));
        }
        ids.push(p.id());
    }
    Ok(ids)
}

fn validate_lr(lr: f64) -> CgResult<()> {
    if lr > 0.0 {
        Ok(())
    } else {
        Err(CgError::InvalidArgument(format!(
            "learning rate must be > 0, got {lr}"
        )))
    }
}

fn validate_gamma(gamma: f64) -> CgResult<()> {
    if (0.0..1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(CgError::InvalidArgument(format!(
            "decay rate must be in [0, 1), got {gamma}"
        )))
    }
}

fn validate_beta(beta: f64, name: &str) -> CgResult<()> {
    if beta > 0.0 && beta < 1.0 {
        Ok(())
    } else {
        Err(CgError::InvalidArgument(format!(
            "{name} must be in (0, 1), got {beta}"
        )))
    }
}

fn validate_eps(eps: f64) -> CgResult<()> {
    if eps > 0.0 {
        Ok(())
    } else {
        Err(CgError::InvalidArgument(format!(
            "epsilon must be > 0, got {eps}"
        )))
    }
}

/// Gradient-descent optimizer family: SGD, Momentum, Adagrad, RMSprop, Adam.
/// Owns its parameter list and lazily-initialized state buffers, which
/// persist across calls to `step`.
pub struct Optimizer {
    kind: OptimizerKind,
    graph: Graph,
    parms: Vec<NodeId>,
    lr: f64,
    gamma: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    buf0: Vec<Option<Tensor>>,
    buf1: Vec<Option<Tensor>>,
    t: u64,
}

impl Optimizer {
    pub fn sgd(graph: &Graph, parms: Vec<Node>, lr: f64) -> CgResult<Self> {
        validate_lr(lr)?;
        let ids = validate_parms(graph, &parms)?;
        Ok(Self::new(graph, OptimizerKind::Sgd, ids, lr, 0.0, 0.0, 0.0, 0.0))
    }

    pub fn momentum(graph: &Graph, parms: Vec<Node>, lr: f64, gamma: f64) -> CgResult<Self> {
        validate_lr(lr)?;
        validate_gamma(gamma)?;
        let ids = validate_parms(graph, &parms)?;
        Ok(Self::new(
            graph,
            OptimizerKind::Momentum,
            ids,
            lr,
            gamma,
            0.0,
            0.0,
            0.0,
        ))
    }

    pub fn adagrad(graph: &Graph, parms: Vec<Node>, lr: f64, eps: f64) -> CgResult<Self> {
        validate_lr(lr)?;
        validate_eps(eps)?;
        let ids = validate_parms(graph, &parms)?;
        Ok(Self::new(
            graph,
            OptimizerKind::Adagrad,
            ids,
            lr,
            0.0,
            0.0,
            0.0,
            eps,
        ))
    }

    pub fn rmsprop(graph: &Graph, parms: Vec<Node>, lr: f64, gamma: f64, eps: f64) -> CgResult<Self> {
        validate_lr(lr)?;
        validate_gamma(gamma)?;
        validate_eps(eps)?;
        let ids = validate_parms(graph, &parms)?;
        Ok(Self::new(
            graph,
            OptimizerKind::Rmsprop,
            ids,
            lr,
            gamma,
            0.0,
            0.0,
            eps,
        ))
    }

    pub fn adam(
        graph: &Graph,
        parms: Vec<Node>,
        lr: f64,
        beta1: f64,
        beta2: f64,
        eps: f64,
    ) -> CgResult<Self> {
        validate_lr(lr)?;
        validate_beta(beta1, "beta1")?;
        validate_beta(beta2, "beta2")?;
        validate_eps(eps)?;
        let ids = validate_parms(graph, &parms)?;
        Ok(Self::new(
            graph,
            OptimizerKind::Adam,
            ids,
            lr,
            0.0,
            beta1,
            beta2,
            eps,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        graph: &Graph,
        kind: OptimizerKind,
        parms: Vec<NodeId>,
        lr: f64,
        gamma: f64,
        beta1: f64,
        beta2: f64,
        eps: f64,
    ) -> Self {
        let n = parms.len();
        Optimizer {
            kind,
            graph: graph.clone(),
            parms,
            lr,
            gamma,
            beta1,
            beta2,
            eps,
            buf0: vec![None; n],
            buf1: vec![None; n],
            t: 0,
        }
    }

    /// Apply one update to every parameter using its currently accumulated
    /// gradient. Fails with `NonConformingGradient` if a parameter has no
    /// gradient or a gradient of the wrong length. If parameter `k` fails,
    /// parameters `0..k` are already updated.
    pub fn step(&mut self) -> CgResult<()> {
        self.t += 1;
        let beta1_t = self.beta1.powi(self.t as i32);
        let beta2_t = self.beta2.powi(self.t as i32);

        for i in 0..self.parms.len() {
            let id = self.parms[i];
            let node = Node {
                graph: self.graph.clone(),
                id,
            };
            let value = node.value()?;
            let grad = node
                .grad()?
                .ok_or_else(|| CgError::NonConformingGradient {
                    node: node.name(),
                    expected: value.len(),
                    got: 0,
                })?;
            if grad.len() != value.len() {
                return Err(CgError::NonConformingGradient {
                    node: node.name(),
                    expected: value.len(),
                    got: grad.len(),
                });
            }

            let v = value.as_real();
            let g = grad.as_real();
            let n = v.len();

            let updated = match self.kind {
                OptimizerKind::Sgd => v.iter().zip(g.iter()).map(|(vi, gi)| vi - self.lr * gi).collect(),
                OptimizerKind::Momentum => {
                    let buf = self.buf0[i].get_or_insert_with(|| Tensor::zeros(value.shape().clone()));
                    let mut b = buf.as_real();
                    for j in 0..n {
                        b[j] = self.gamma * b[j] + self.lr * g[j];
                    }
                    *buf = Tensor::with_shape_of(b.clone(), &value)?;
                    v.iter().zip(b.iter()).map(|(vi, bi)| vi - bi).collect()
                }
                OptimizerKind::Adagrad => {
                    let buf = self.buf0[i].get_or_insert_with(|| Tensor::zeros(value.shape().clone()));
                    let mut b = buf.as_real();
                    for j in 0..n {
                        b[j] += g[j] * g[j];
                    }
                    *buf = Tensor::with_shape_of(b.clone(), &value)?;
                    (0..n)
                        .map(|j| v[j] - self.lr * g[j] / (b[j].sqrt() + self.eps))
                        .collect()
                }
                OptimizerKind::Rmsprop => {
                    let buf = self.buf0[i].get_or_insert_with(|| Tensor::zeros(value.shape().clone()));
                    let mut b = buf.as_real();
                    for j in 0..n {
                        b[j] = self.gamma * b[j] + (1.0 - self.gamma) * g[j] * g[j];
                    }
                    *buf = Tensor::with_shape_of(b.clone(), &value)?;
                    (0..n)
                        .map(|j| v[j] - self.lr * g[j] / (b[j].sqrt() + self.eps))
                        .collect()
                }
                OptimizerKind::Adam => {
                    let buf0 = self.buf0[i].get_or_insert_with(|| Tensor::zeros(value.shape().clone()));
                    let mut m = buf0.as_real();
                    for j in 0..n {
                        m[j] = self.beta1 * m[j] + (1.0 - self.beta1) * g[j];
                    }
                    *buf0 = Tensor::with_shape_of(m.clone(), &value)?;

                    let buf1 = self.buf1[i].get_or_insert_with(|| Tensor::zeros(value.shape().clone()));
                    let mut r = buf1.as_real();
                    for j in 0..n {
                        r[j] = self.beta2 * r[j] + (1.0 - self.beta2) * g[j] * g[j];
                    }
                    *buf1 = Tensor::with_shape_of(r.clone(), &value)?;

                    (0..n)
                        .map(|j| {
                            let m_hat = m[j] / (1.0 - beta1_t);
                            let v_hat = r[j] / (1.0 - beta2_t);
                            v[j] - self.lr * m_hat / (v_hat.sqrt() + self.eps)
                        })
                        .collect()
                }
            };

            node.set_value(Tensor::with_shape_of(updated, &value)?)?;
        }
        Ok(())
    }
}
