//! Numerically stable sigmoid, clamped away from 0 and 1.

use crate::error::CgResult;
use crate::tensor::Tensor;

const EPS_MIN: f64 = f64::EPSILON;

/// `sigmoid(x)`, clamped to `[EPS_MIN, 1 - EPS_MIN]` so downstream `ln`/`log`
/// kernels (e.g. in a cross-entropy built on top of this) never see exactly
/// 0 or 1.
pub fn sigmoid(x: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = x
        .as_real()
        .iter()
        .map(|&v| {
            let s = 1.0 / (1.0 + (-v).exp());
            s.clamp(EPS_MIN, 1.0 - EPS_MIN)
        })
        .collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

/// Gradient of sigmoid given the node's own cached output `y = sigmoid(x)`
/// (not `x` itself) and the upstream gradient: `grad * y * (1 - y)`.
pub fn sigmoid_grad(value: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = value
        .as_real()
        .iter()
        .zip(grad.as_real().iter())
        .map(|(&y, &g)| y * (1.0 - y) * g)
        .collect();
    Ok(Tensor::with_shape_of(data, value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_of_zero_is_one_half() {
        let x = Tensor::real(vec![0.0], Shape::new(vec![1])).unwrap();
        assert_relative_eq!(sigmoid(&x).unwrap().as_real()[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn clamps_extreme_values() {
        let x = Tensor::real(vec![-1000.0, 1000.0], Shape::new(vec![2])).unwrap();
        let y = sigmoid(&x).unwrap();
        assert!(y.as_real()[0] > 0.0);
        assert!(y.as_real()[1] < 1.0);
    }

    #[test]
    fn grad_matches_logistic_derivative() {
        let y = Tensor::real(vec![0.5], Shape::new(vec![1])).unwrap();
        let g = Tensor::real(vec![1.0], Shape::new(vec![1])).unwrap();
        assert_relative_eq!(sigmoid_grad(&y, &g).unwrap().as_real()[0], 0.25);
    }
}
