//! Elementwise arithmetic kernels: pos, neg, add, sub, mul, div, pow, square.
//!
//! The binary kernels (add/sub/mul/div/pow) support implicit recycling of a
//! shorter operand (see [`crate::kernels::broadcast`]); their gradients
//! reduce back to each operand's own length via block-sum.

use crate::error::CgResult;
use crate::kernels::broadcast::{recycle, reduce_to, tile};
use crate::tensor::Tensor;

pub fn pos(x: &Tensor) -> CgResult<Tensor> {
    Ok(Tensor::with_shape_of(x.as_real(), x)?)
}

pub fn pos_grad(_x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    Ok(grad.duplicate())
}

pub fn neg(x: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = x.as_real().iter().map(|v| -v).collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

pub fn neg_grad(_x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = grad.as_real().iter().map(|v| -v).collect();
    Ok(Tensor::with_shape_of(data, grad)?)
}

fn binary_shape(a: &Tensor, b: &Tensor) -> (bool, Tensor) {
    // The output carries the shape of whichever operand is not being
    // recycled (the longer one); ties favor `a`.
    if a.len() >= b.len() {
        (true, a.duplicate())
    } else {
        (false, b.duplicate())
    }
}

pub fn add(a: &Tensor, b: &Tensor) -> CgResult<Tensor> {
    let (av, bv, _) = recycle(&a.as_real(), &b.as_real())?;
    let data: Vec<f64> = av.iter().zip(bv.iter()).map(|(x, y)| x + y).collect();
    let (a_is_long, shape_source) = binary_shape(a, b);
    let _ = a_is_long;
    Ok(Tensor::with_shape_of(data, &shape_source)?)
}

pub fn add_grad_a(a: &Tensor, _b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    Ok(Tensor::with_shape_of(reduce_to(&grad.as_real(), a.len()), a)?)
}

pub fn add_grad_b(_a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    Ok(Tensor::with_shape_of(reduce_to(&grad.as_real(), b.len()), b)?)
}

pub fn sub(a: &Tensor, b: &Tensor) -> CgResult<Tensor> {
    let (av, bv, _) = recycle(&a.as_real(), &b.as_real())?;
    let data: Vec<f64> = av.iter().zip(bv.iter()).map(|(x, y)| x - y).collect();
    let (_, shape_source) = binary_shape(a, b);
    Ok(Tensor::with_shape_of(data, &shape_source)?)
}

pub fn sub_grad_a(a: &Tensor, _b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    Ok(Tensor::with_shape_of(reduce_to(&grad.as_real(), a.len()), a)?)
}

pub fn sub_grad_b(_a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full: Vec<f64> = grad.as_real().iter().map(|v| -v).collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, b.len()), b)?)
}

pub fn mul(a: &Tensor, b: &Tensor) -> CgResult<Tensor> {
    let (av, bv, _) = recycle(&a.as_real(), &b.as_real())?;
    let data: Vec<f64> = av.iter().zip(bv.iter()).map(|(x, y)| x * y).collect();
    let (_, shape_source) = binary_shape(a, b);
    Ok(Tensor::with_shape_of(data, &shape_source)?)
}

pub fn mul_grad_a(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let b_full = tile(&b.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(b_full.iter())
        .map(|(g, bv)| g * bv)
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, a.len()), a)?)
}

pub fn mul_grad_b(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let a_full = tile(&a.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(a_full.iter())
        .map(|(g, av)| g * av)
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, b.len()), b)?)
}

pub fn div(a: &Tensor, b: &Tensor) -> CgResult<Tensor> {
    let (av, bv, _) = recycle(&a.as_real(), &b.as_real())?;
    let data: Vec<f64> = av.iter().zip(bv.iter()).map(|(x, y)| x / y).collect();
    let (_, shape_source) = binary_shape(a, b);
    Ok(Tensor::with_shape_of(data, &shape_source)?)
}

pub fn div_grad_a(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let b_full = tile(&b.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(b_full.iter())
        .map(|(g, bv)| g / bv)
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, a.len()), a)?)
}

pub fn div_grad_b(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let a_full = tile(&a.as_real(), full_len);
    let b_full = tile(&b.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(a_full.iter().zip(b_full.iter()))
        .map(|(g, (av, bv))| -g * av / (bv * bv))
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, b.len()), b)?)
}

pub fn pow(a: &Tensor, b: &Tensor) -> CgResult<Tensor> {
    let (av, bv, _) = recycle(&a.as_real(), &b.as_real())?;
    let data: Vec<f64> = av.iter().zip(bv.iter()).map(|(x, y)| x.powf(*y)).collect();
    let (_, shape_source) = binary_shape(a, b);
    Ok(Tensor::with_shape_of(data, &shape_source)?)
}

pub fn pow_grad_a(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let a_full = tile(&a.as_real(), full_len);
    let b_full = tile(&b.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(a_full.iter().zip(b_full.iter()))
        .map(|(g, (av, bv))| g * bv * av.powf(bv - 1.0))
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, a.len()), a)?)
}

pub fn pow_grad_b(a: &Tensor, b: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let full_len = grad.len();
    let a_full = tile(&a.as_real(), full_len);
    let b_full = tile(&b.as_real(), full_len);
    let full: Vec<f64> = grad
        .as_real()
        .iter()
        .zip(a_full.iter().zip(b_full.iter()))
        .map(|(g, (av, bv))| g * av.powf(*bv) * av.ln())
        .collect();
    Ok(Tensor::with_shape_of(reduce_to(&full, b.len()), b)?)
}

pub fn square(x: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = x.as_real().iter().map(|v| v * v).collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

pub fn square_grad(x: &Tensor, grad: &Tensor) -> CgResult<Tensor> {
    let data: Vec<f64> = x
        .as_real()
        .iter()
        .zip(grad.as_real().iter())
        .map(|(v, g)| 2.0 * v * g)
        .collect();
    Ok(Tensor::with_shape_of(data, x)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn t(data: Vec<f64>, shape: Vec<usize>) -> Tensor {
        Tensor::real(data, Shape::new(shape)).unwrap()
    }

    #[test]
    fn add_recycles_shorter_operand() {
        let x = t(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2]);
        let p = t(vec![1.0, 1.0], vec![2]);
        let y = add(&x, &p).unwrap();
        assert_eq!(y.as_real(), vec![2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(y.shape().dims(), &[3, 2]);
    }

    #[test]
    fn mul_grad_matches_product_rule() {
        let a = t(vec![2.0], vec![1]);
        let b = t(vec![3.0], vec![1]);
        let grad = t(vec![1.0], vec![1]);
        assert_eq!(mul_grad_a(&a, &b, &grad).unwrap().as_real(), vec![3.0]);
        assert_eq!(mul_grad_b(&a, &b, &grad).unwrap().as_real(), vec![2.0]);
    }
}
