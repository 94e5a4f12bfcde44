//! Central-difference gradient checking. A test helper, not a production
//! API (nothing in the core depends on this module).

use crate::autograd::{Graph, Node};
use crate::error::CgResult;
use crate::tensor::Tensor;

/// The step size used by [`numerical_grad`] and [`check_gradients`] unless a
/// caller picks a different one.
pub const DEFAULT_EPS: f64 = 1e-4;

fn select(values: &[f64], index: Option<usize>) -> f64 {
    match index {
        Some(k) => values[k - 1],
        None => values.iter().sum(),
    }
}

/// Central-difference estimate of d(target)/d(param), one coordinate of
/// `param` at a time, perturbing its value in place and restoring it
/// afterward. `index` selects which coordinate of `target`'s value to
/// differentiate; `None` sums every coordinate, matching an all-ones seed.
pub fn numerical_grad(
    graph: &Graph,
    target: &Node,
    param: &Node,
    index: Option<usize>,
    eps: f64,
) -> CgResult<Tensor> {
    let original = param.value()?;
    let base = original.as_real();
    let mut grad = vec![0.0; base.len()];

    for i in 0..base.len() {
        let mut plus = base.clone();
        plus[i] += eps;
        param.set_value(Tensor::with_shape_of(plus, &original)?)?;
        graph.forward(target)?;
        let f_plus = select(&target.value()?.as_real(), index);

        let mut minus = base.clone();
        minus[i] -= eps;
        param.set_value(Tensor::with_shape_of(minus, &original)?)?;
        graph.forward(target)?;
        let f_minus = select(&target.value()?.as_real(), index);

        grad[i] = (f_plus - f_minus) / (2.0 * eps);
    }

    param.set_value(original.clone())?;
    graph.forward(target)?;

    Ok(Tensor::with_shape_of(grad, &original)?)
}

/// Run `backward` once, then assert the analytic gradient accumulated on
/// `param` agrees with [`numerical_grad`] within `(rtol, atol)`. Returns an
/// `Err` describing the mismatch instead of panicking, so tests can report
/// it with `.unwrap()` or match on it directly.
pub fn check_gradients(
    graph: &Graph,
    target: &Node,
    param: &Node,
    index: Option<usize>,
    eps: f64,
    rtol: f64,
    atol: f64,
) -> Result<(), String> {
    graph
        .backward(target, index)
        .map_err(|e| format!("backward failed: {e}"))?;
    let analytic = param
        .grad()
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("parameter '{}' accumulated no gradient", param.name()))?;

    let numeric = numerical_grad(graph, target, param, index, eps).map_err(|e| e.to_string())?;

    for (a, n) in analytic.as_real().iter().zip(numeric.as_real().iter()) {
        let tol = atol + rtol * n.abs();
        if (a - n).abs() > tol {
            return Err(format!(
                "gradient mismatch for '{}': analytic {a}, numeric {n}, tolerance {tol}",
                param.name()
            ));
        }
    }

    Ok(())
}
