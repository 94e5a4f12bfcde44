//! One seed test per `CgError` variant that isn't already exercised by the
//! `InvalidArgument`-family boundary tests elsewhere in this tree.

use autodiff_core::shape::Shape;
use autodiff_core::tensor::Tensor;
use autodiff_core::{constant, operator, parameter, Arg, CgError, Function, Graph};

#[test]
fn constructing_a_node_with_no_active_graph_fails() {
    // A fresh test thread has no graph bound yet; calling a node
    // constructor before `Graph::new` hits the session's empty slot.
    let err = constant(Tensor::scalar(1.0), None).unwrap_err();
    assert!(matches!(err, CgError::NoActiveGraph));
}

#[test]
fn operator_with_no_gradient_callable_is_undifferentiable() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(2.0), Some("P")).unwrap();
    let identity_no_grad = Function::new(
        Box::new(|args: &[Arg]| Ok(args[0].value.duplicate())),
        vec![],
    );
    let m = operator(identity_no_grad, vec![p.into()], Some("M")).unwrap();

    g.forward(&m).unwrap();
    let err = g.backward(&m, None).unwrap_err();
    assert!(matches!(err, CgError::Undifferentiable { .. }));
}

#[test]
fn gradient_of_wrong_length_is_rejected() {
    let g = Graph::new(false);
    let p = parameter(
        Tensor::real(vec![1.0, 2.0, 3.0], Shape::new(vec![3])).unwrap(),
        Some("P"),
    )
    .unwrap();
    // Forward collapses to a scalar; the gradient callable always answers
    // with a single element, which can't conform to P's length of 3.
    let bad_fn = Function::new(
        Box::new(|args: &[Arg]| Ok(Tensor::scalar(args[0].value.as_real().iter().sum()))),
        vec![Box::new(|_args: &[Arg], _value: &Tensor, _grad: &Tensor| {
            Ok(Tensor::scalar(1.0))
        })],
    );
    let m = operator(bad_fn, vec![p.into()], Some("M")).unwrap();

    g.forward(&m).unwrap();
    let err = g.backward(&m, None).unwrap_err();
    assert!(matches!(err, CgError::NonConformingGradient { .. }));
}

#[test]
fn a_failing_forward_callable_is_reported_as_eval_failed() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(1.0), Some("P")).unwrap();
    let always_fails = Function::new(
        Box::new(|_args: &[Arg]| {
            Err(CgError::InvalidArgument("forward callable refuses to run".into()))
        }),
        vec![Box::new(|_args: &[Arg], _value: &Tensor, grad: &Tensor| {
            Ok(grad.duplicate())
        })],
    );
    let m = operator(always_fails, vec![p.into()], Some("M")).unwrap();

    let err = g.forward(&m).unwrap_err();
    assert!(matches!(err, CgError::EvalFailed { .. }));
}
