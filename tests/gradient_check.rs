//! Analytic gradients checked against central finite differences, including
//! the broadcast-reduction case where a parameter is implicitly recycled.

use std::rc::Rc;

use autodiff_core::autograd::check::check_gradients;
use autodiff_core::kernels::function::{add_fn, sigmoid_fn, square_fn};
use autodiff_core::shape::Shape;
use autodiff_core::tensor::Tensor;
use autodiff_core::{constant, operator, parameter, Arg, Function, Graph};

/// A "sum" `Function` built locally out of `block_sum`, since the crate's
/// kernel catalog stops at the primitives and leaves reductions like this to
/// be assembled on top of it.
fn sum_fn() -> Rc<Function> {
    Function::new(
        Box::new(|args: &[Arg]| {
            let total: f64 = autodiff_core::kernels::block_sum::block_sum(&args[0].value.as_real(), 1)
                .into_iter()
                .sum();
            Ok(Tensor::scalar(total))
        }),
        vec![Box::new(|args: &[Arg], _value: &Tensor, grad: &Tensor| {
            let n = args[0].value.len();
            let g = grad.as_real()[0];
            Ok(Tensor::with_shape_of(vec![g; n], args[0].value)?)
        })],
    )
}

#[test]
fn scalar_square_of_sum_matches_numeric_gradient() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.clone().into(), c.into()], Some("N")).unwrap();
    let m = operator(square_fn(), vec![n.into()], Some("M")).unwrap();

    g.forward(&m).unwrap();
    assert_eq!(m.value().unwrap().as_real(), vec![49.0]);

    check_gradients(&g, &m, &p, None, 1e-6, 1e-6, 1e-8).unwrap();
    assert_eq!(p.grad().unwrap().unwrap().as_real(), vec![14.0]);
}

#[test]
fn sigmoid_then_sum_matches_numeric_gradient() {
    let g = Graph::new(false);
    let p = parameter(
        Tensor::real(vec![0.2, -0.5, 1.3], Shape::new(vec![3])).unwrap(),
        Some("P"),
    )
    .unwrap();
    let s = operator(sigmoid_fn(), vec![p.clone().into()], Some("S")).unwrap();
    let m = operator(sum_fn(), vec![s.into()], Some("M")).unwrap();

    g.forward(&m).unwrap();
    check_gradients(&g, &m, &p, None, 1e-6, 1e-4, 1e-6).unwrap();
}

#[test]
fn broadcast_add_reduces_gradient_back_to_the_short_operand() {
    let g = Graph::new(false);
    // P recycles across the three rows of X; its gradient block-sums back
    // down to its own two elements.
    let p = parameter(Tensor::real(vec![1.0, 1.0], Shape::new(vec![1, 2])).unwrap(), Some("P"))
        .unwrap();
    let x = constant(
        Tensor::real(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(vec![3, 2])).unwrap(),
        Some("X"),
    )
    .unwrap();
    let y = operator(add_fn(), vec![x.into(), p.clone().into()], Some("Y")).unwrap();
    let m = operator(sum_fn(), vec![y.into()], Some("M")).unwrap();

    g.forward(&m).unwrap();
    g.backward(&m, None).unwrap();

    assert_eq!(p.grad().unwrap().unwrap().as_real(), vec![3.0, 3.0]);
    check_gradients(&g, &m, &p, None, 1e-6, 1e-4, 1e-6).unwrap();
}
