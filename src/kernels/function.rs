//! Builders that wire the raw numeric kernels up as `Function` records,
//! the closed catalog of default operator functions. Users are free to
//! build their own `Function`s from other callables entirely; these just
//! cover the kernels this crate ships.

use std::rc::Rc;

use crate::autograd::function::{Arg, Function};
use crate::kernels::{arithmetic, sigmoid, transcendental};

fn unary(
    forward: fn(&crate::tensor::Tensor) -> crate::error::CgResult<crate::tensor::Tensor>,
    grad: fn(
        &crate::tensor::Tensor,
        &crate::tensor::Tensor,
    ) -> crate::error::CgResult<crate::tensor::Tensor>,
) -> Rc<Function> {
    Function::new(
        Box::new(move |args: &[Arg]| forward(args[0].value)),
        vec![Box::new(move |args: &[Arg], _value, g| grad(args[0].value, g))],
    )
}

pub fn pos_fn() -> Rc<Function> {
    unary(arithmetic::pos, arithmetic::pos_grad)
}

pub fn neg_fn() -> Rc<Function> {
    unary(arithmetic::neg, arithmetic::neg_grad)
}

pub fn square_fn() -> Rc<Function> {
    unary(arithmetic::square, arithmetic::square_grad)
}

pub fn sqrt_fn() -> Rc<Function> {
    unary(transcendental::sqrt, transcendental::sqrt_grad)
}

pub fn cbrt_fn() -> Rc<Function> {
    unary(transcendental::cbrt, transcendental::cbrt_grad)
}

pub fn exp_fn() -> Rc<Function> {
    unary(transcendental::exp, transcendental::exp_grad)
}

pub fn exp2_fn() -> Rc<Function> {
    unary(transcendental::exp2, transcendental::exp2_grad)
}

pub fn ln_fn() -> Rc<Function> {
    unary(transcendental::ln, transcendental::ln_grad)
}

pub fn log2_fn() -> Rc<Function> {
    unary(transcendental::log2, transcendental::log2_grad)
}

pub fn log10_fn() -> Rc<Function> {
    unary(transcendental::log10, transcendental::log10_grad)
}

pub fn abs_fn() -> Rc<Function> {
    unary(transcendental::abs, transcendental::abs_grad)
}

pub fn sin_fn() -> Rc<Function> {
    unary(transcendental::sin, transcendental::sin_grad)
}

/// Sigmoid's gradient callable receives the node's own cached output (`y`),
/// not `x`: `unary` passes `args[0].value` (the input) to every grad
/// closure, so sigmoid is wired up by hand instead of through it.
pub fn sigmoid_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| sigmoid::sigmoid(args[0].value)),
        vec![Box::new(|_args: &[Arg], value, grad| {
            sigmoid::sigmoid_grad(value, grad)
        })],
    )
}

pub fn add_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| arithmetic::add(args[0].value, args[1].value)),
        vec![
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::add_grad_a(args[0].value, args[1].value, grad)
            }),
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::add_grad_b(args[0].value, args[1].value, grad)
            }),
        ],
    )
}

pub fn sub_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| arithmetic::sub(args[0].value, args[1].value)),
        vec![
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::sub_grad_a(args[0].value, args[1].value, grad)
            }),
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::sub_grad_b(args[0].value, args[1].value, grad)
            }),
        ],
    )
}

pub fn mul_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| arithmetic::mul(args[0].value, args[1].value)),
        vec![
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::mul_grad_a(args[0].value, args[1].value, grad)
            }),
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::mul_grad_b(args[0].value, args[1].value, grad)
            }),
        ],
    )
}

pub fn div_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| arithmetic::div(args[0].value, args[1].value)),
        vec![
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::div_grad_a(args[0].value, args[1].value, grad)
            }),
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::div_grad_b(args[0].value, args[1].value, grad)
            }),
        ],
    )
}

pub fn pow_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| arithmetic::pow(args[0].value, args[1].value)),
        vec![
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::pow_grad_a(args[0].value, args[1].value, grad)
            }),
            Box::new(|args: &[Arg], _value, grad| {
                arithmetic::pow_grad_b(args[0].value, args[1].value, grad)
            }),
        ],
    )
}
