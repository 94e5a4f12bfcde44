//! Elementwise transcendental kernels: sqrt, cbrt, exp, exp2, ln, log2,
//! log10, abs, sin. All unary; each gradient is the local derivative times
//! the upstream gradient.

use crate::error::CgResult;
use crate::tensor::Tensor;

fn unary(x: &Tensor, f: impl Fn(f64) -> f64) -> CgResult<Tensor> {
    let data: Vec<f64> = x.as_real().iter().map(|&v| f(v)).collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

fn unary_grad(x: &Tensor, grad: &Tensor, df: impl Fn(f64) -> f64) -> CgResult<Tensor> {
    let data: Vec<f64> = x
        .as_real()
        .iter()
        .zip(grad.as_real().iter())
        .map(|(&v, &g)| df(v) * g)
        .collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

pub fn sqrt(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::sqrt)
}

pub fn sqrt_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| 1.0 / (2.0 * v.sqrt()))
}

pub fn cbrt(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::cbrt)
}

pub fn cbrt_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| {
        let c = v.cbrt();
        1.0 / (3.0 * c * c)
    })
}

pub fn exp(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::exp)
}

pub fn exp_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, f64::exp)
}

pub fn exp2(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::exp2)
}

pub fn exp2_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| v.exp2() * std::f64::consts::LN_2)
}

pub fn ln(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::ln)
}

pub fn ln_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| 1.0 / v)
}

pub fn log2(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::log2)
}

pub fn log2_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| 1.0 / (v * std::f64::consts::LN_2))
}

pub fn log10(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::log10)
}

pub fn log10_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| 1.0 / (v * std::f64::consts::LN_10))
}

pub fn abs(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::abs)
}

pub fn abs_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, |v| if v < 0.0 { -1.0 } else { 1.0 })
}

pub fn sin(x: &Tensor) -> CgResult<Tensor> {
    unary(x, f64::sin)
}

pub fn sin_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    unary_grad(x, grad, f64::cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use approx::assert_relative_eq;

    fn t(data: Vec<f64>) -> Tensor {
        let n = data.len();
        Tensor::real(data, Shape::new(vec![n])).unwrap()
    }

    #[test]
    fn exp_grad_equals_value() {
        let x = t(vec![1.0, 2.0]);
        let grad = t(vec![1.0, 1.0]);
        let y = exp(&x).unwrap();
        let g = exp_grad(&x, &grad).unwrap();
        assert_relative_eq!(y.as_real()[0], g.as_real()[0], epsilon = 1e-12);
    }

    #[test]
    fn sin_grad_is_cosine() {
        let x = t(vec![0.0]);
        let grad = t(vec![1.0]);
        assert_relative_eq!(sin_grad(&x, &grad).unwrap().as_real()[0], 1.0);
    }
}
