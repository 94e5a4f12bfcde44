//! Initializers: allocate a tensor of a given shape from some distribution
//! and wrap it as a parameter node on the current graph. Deterministic for a
//! fixed seed, since every draw goes through the thread-local RNG in
//! [`crate::runtime`].

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::autograd::{self, Node};
use crate::error::{CgError, CgResult};
use crate::runtime::with_rng;
use crate::shape::Shape;
use crate::tensor::Tensor;

fn validate_shape(shape: &Shape) -> CgResult<()> {
    if shape.dims().iter().any(|&d| d == 0) {
        return Err(CgError::InvalidArgument(
            "shape dimensions must be positive".into(),
        ));
    }
    Ok(())
}

fn validate_fan(shape: &Shape) -> CgResult<(usize, usize)> {
    validate_shape(shape)?;
    let dims = shape.dims();
    if dims.len() < 2 {
        return Err(CgError::InvalidArgument(
            "xavier initializers require a shape with at least 2 dimensions".into(),
        ));
    }
    Ok((dims[0], dims[1]))
}

/// A parameter node of zeros with the given shape.
pub fn zeros(shape: Shape) -> CgResult<Node> {
    validate_shape(&shape)?;
    let n = shape.numel();
    autograd::parameter(Tensor::real(vec![0.0; n], shape)?, None)
}

/// A parameter node of ones with the given shape.
pub fn ones(shape: Shape) -> CgResult<Node> {
    validate_shape(&shape)?;
    let n = shape.numel();
    autograd::parameter(Tensor::real(vec![1.0; n], shape)?, None)
}

/// A parameter node drawn i.i.d. from `U(min, max)`.
pub fn uniform(shape: Shape, min: f64, max: f64) -> CgResult<Node> {
    validate_shape(&shape)?;
    let n = shape.numel();
    let data: Vec<f64> = with_rng(|rng| (0..n).map(|_| rng.gen_range(min..=max)).collect());
    autograd::parameter(Tensor::real(data, shape)?, None)
}

/// A parameter node drawn i.i.d. from `N(mean, sd^2)`.
pub fn gaussian(shape: Shape, mean: f64, sd: f64) -> CgResult<Node> {
    validate_shape(&shape)?;
    let n = shape.numel();
    let dist = Normal::new(mean, sd)
        .map_err(|e| CgError::InvalidArgument(format!("invalid normal distribution: {e}")))?;
    let data: Vec<f64> = with_rng(|rng| (0..n).map(|_| dist.sample(rng)).collect());
    autograd::parameter(Tensor::real(data, shape)?, None)
}

/// `U(-b, b)` with `b = sqrt(6 / (shape[0] + shape[1]))`. Requires a shape
/// with at least 2 dimensions.
pub fn xavier_uniform(shape: Shape) -> CgResult<Node> {
    let (fan_in, fan_out) = validate_fan(&shape)?;
    let b = (6.0 / (fan_in + fan_out) as f64).sqrt();
    let n = shape.numel();
    let data: Vec<f64> = with_rng(|rng| (0..n).map(|_| rng.gen_range(-b..=b)).collect());
    autograd::parameter(Tensor::real(data, shape)?, None)
}

/// `N(0, 2 / (shape[0] + shape[1]))`. Requires a shape with at least 2
/// dimensions.
pub fn xavier_gaussian(shape: Shape) -> CgResult<Node> {
    let (fan_in, fan_out) = validate_fan(&shape)?;
    let sd = (2.0 / (fan_in + fan_out) as f64).sqrt();
    let n = shape.numel();
    let dist = Normal::new(0.0, sd)
        .map_err(|e| CgError::InvalidArgument(format!("invalid normal distribution: {e}")))?;
    let data: Vec<f64> = with_rng(|rng| (0..n).map(|_| dist.sample(rng)).collect());
    autograd::parameter(Tensor::real(data, shape)?, None)
}
