//! Structural properties of the graph: id assignment, name lookup, value and
//! gradient presence after forward/backward, and the boundary errors around
//! empty operator inputs and out-of-range backward indices.

use std::rc::Rc;

use autodiff_core::kernels::function::{add_fn, square_fn};
use autodiff_core::shape::Shape;
use autodiff_core::tensor::Tensor;
use autodiff_core::{
    backward, constant, forward, input, operator, parameter, CgError, Function, Graph, NodeKind,
};

#[test]
fn node_ids_assign_sequentially_from_one() {
    let _g = Graph::new(false);
    let a = constant(Tensor::scalar(1.0), None).unwrap();
    let b = constant(Tensor::scalar(2.0), None).unwrap();
    let c = constant(Tensor::scalar(3.0), None).unwrap();
    assert_eq!(a.id(), 1);
    assert_eq!(b.id(), 2);
    assert_eq!(c.id(), 3);
}

#[test]
fn get_returns_most_recently_named_node() {
    let g = Graph::new(false);
    let first = constant(Tensor::scalar(1.0), Some("x")).unwrap();
    let second = constant(Tensor::scalar(2.0), Some("x")).unwrap();
    let looked_up = g.get("x").unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(looked_up.id(), second.id());
}

#[test]
fn forward_populates_value_on_target_and_every_ancestor() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.clone().into(), c.clone().into()], Some("N")).unwrap();
    let m = operator(square_fn(), vec![n.clone().into()], Some("M")).unwrap();

    forward(&g, &m).unwrap();

    assert_eq!(n.value().unwrap().as_real(), vec![7.0]);
    assert_eq!(m.value().unwrap().as_real(), vec![49.0]);
}

#[test]
fn backward_accumulates_gradient_on_every_ancestor() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.clone().into(), c.into()], Some("N")).unwrap();
    let m = operator(square_fn(), vec![n.clone().into()], Some("M")).unwrap();

    forward(&g, &m).unwrap();
    backward(&g, &m, None).unwrap();

    let p_grad = p.grad().unwrap().unwrap();
    let n_grad = n.grad().unwrap().unwrap();
    assert_eq!(p_grad.len(), p.value().unwrap().len());
    assert_eq!(n_grad.len(), n.value().unwrap().len());
    assert_eq!(p_grad.as_real(), vec![14.0]);
    assert_eq!(n_grad.as_real(), vec![14.0]);
}

#[test]
fn backward_clears_previous_gradients_before_accumulating() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.clone().into(), c.into()], Some("N")).unwrap();
    let m = operator(square_fn(), vec![n.into()], Some("M")).unwrap();

    forward(&g, &m).unwrap();
    backward(&g, &m, None).unwrap();
    let first = p.grad().unwrap().unwrap().as_real();
    backward(&g, &m, None).unwrap();
    let second = p.grad().unwrap().unwrap().as_real();

    assert_eq!(first, second);
}

#[test]
fn eager_graph_evaluates_operators_on_construction() {
    let _g = Graph::new(true);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.into(), c.into()], Some("N")).unwrap();

    assert_eq!(n.value().unwrap().as_real(), vec![7.0]);
}

#[test]
fn eager_and_lazy_construction_agree_on_the_same_graph_shape() {
    let lazy_graph = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n = operator(add_fn(), vec![p.into(), c.into()], Some("N")).unwrap();
    let m = operator(square_fn(), vec![n.into()], Some("M")).unwrap();
    forward(&lazy_graph, &m).unwrap();
    let lazy_value = m.value().unwrap().as_real();

    let _eager_graph = Graph::new(true);
    let p2 = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let c2 = constant(Tensor::scalar(4.0), Some("C")).unwrap();
    let n2 = operator(add_fn(), vec![p2.into(), c2.into()], Some("N")).unwrap();
    let m2 = operator(square_fn(), vec![n2.into()], Some("M")).unwrap();

    assert_eq!(lazy_value, m2.value().unwrap().as_real());
}

#[test]
fn operator_with_no_inputs_is_rejected() {
    let _g = Graph::new(false);
    let result = operator(square_fn(), vec![], Some("bad"));
    assert!(result.is_err());
}

#[test]
fn backward_index_out_of_bounds_is_rejected() {
    let g = Graph::new(false);
    let p = parameter(Tensor::scalar(3.0), Some("P")).unwrap();
    let m = operator(square_fn(), vec![p.into()], Some("M")).unwrap();
    forward(&g, &m).unwrap();

    assert!(backward(&g, &m, Some(2)).is_err());
}

#[test]
fn slice_assign_round_trip_via_a_custom_function() {
    // Exercises a `Function` built outside the crate's closed catalog, as the
    // foreign callable contract promises.
    let g = Graph::new(false);
    let x = constant(
        Tensor::real(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2])).unwrap(),
        Some("X"),
    )
    .unwrap();

    let double_fn: Rc<Function> = Function::new(
        Box::new(|args: &[autodiff_core::Arg]| {
            let data: Vec<f64> = args[0].value.as_real().iter().map(|v| v * 2.0).collect();
            Ok(Tensor::with_shape_of(data, args[0].value)?)
        }),
        vec![Box::new(
            |_args: &[autodiff_core::Arg], _value: &Tensor, grad: &Tensor| {
                let data: Vec<f64> = grad.as_real().iter().map(|v| v * 2.0).collect();
                Ok(Tensor::with_shape_of(data, grad)?)
            },
        )],
    );
    let y = operator(double_fn, vec![x.into()], Some("Y")).unwrap();
    forward(&g, &y).unwrap();

    assert_eq!(y.value().unwrap().as_real(), vec![2.0, 4.0, 6.0, 8.0]);
    assert_eq!(y.kind(), NodeKind::Operator);
}

#[test]
fn unbound_input_fails_forward_with_no_value() {
    let g = Graph::new(false);
    let x = input(Some("X")).unwrap();
    let m = operator(square_fn(), vec![x.clone().into()], Some("M")).unwrap();

    let err = forward(&g, &m).unwrap_err();
    assert!(matches!(err, CgError::NoValue(name) if name == x.name()));

    x.bind_value(Tensor::scalar(5.0)).unwrap();
    forward(&g, &m).unwrap();
    assert_eq!(m.value().unwrap().as_real(), vec![25.0]);
}
