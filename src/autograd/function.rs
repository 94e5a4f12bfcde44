//! The foreign callable contract: a `Function` pairs a forward callable with
//! one gradient callable per input. Operator nodes hold a shared,
//! reference-counted `Function`; many nodes (every `add` in a graph, say)
//! typically point at the same one.

use std::rc::Rc;

use crate::error::{CgError, CgResult};
use crate::tensor::Tensor;

/// One positional (and optionally tagged) argument passed to a callable.
pub struct Arg<'a> {
    pub tag: Option<&'a str>,
    pub value: &'a Tensor,
}

pub type ForwardFn = Box<dyn Fn(&[Arg]) -> CgResult<Tensor>>;

/// `(inputs, node value, upstream grad) -> gradient w.r.t. this input`.
pub type GradFn = Box<dyn Fn(&[Arg], &Tensor, &Tensor) -> CgResult<Tensor>>;

struct GradEntry {
    tag: Option<String>,
    f: GradFn,
}

/// Pair of a forward callable and its per-input gradient callables.
pub struct Function {
    forward: ForwardFn,
    grads: Vec<GradEntry>,
}

impl Function {
    /// Build a function whose gradients are resolved positionally: the i-th
    /// entry of `grads` is the partial derivative w.r.t. the i-th input.
    pub fn new(forward: ForwardFn, grads: Vec<GradFn>) -> Rc<Function> {
        Rc::new(Function {
            forward,
            grads: grads.into_iter().map(|f| GradEntry { tag: None, f }).collect(),
        })
    }

    /// Build a function whose gradients are resolved by input tag instead of
    /// position. Fails with `InvalidArgument` if any tag is blank, since
    /// tag-based dispatch is meaningless without a real tag to match against.
    pub fn new_tagged(forward: ForwardFn, grads: Vec<(String, GradFn)>) -> CgResult<Rc<Function>> {
        if grads.is_empty() {
            return Err(CgError::InvalidArgument(
                "tagged function must declare at least one gradient".into(),
            ));
        }
        for (tag, _) in &grads {
            if tag.trim().is_empty() {
                return Err(CgError::InvalidArgument(
                    "tagged function gradient tags must be non-blank".into(),
                ));
            }
        }
        Ok(Rc::new(Function {
            forward,
            grads: grads
                .into_iter()
                .map(|(tag, f)| GradEntry { tag: Some(tag), f })
                .collect(),
        }))
    }

    pub(crate) fn call_forward(&self, args: &[Arg]) -> CgResult<Tensor> {
        (self.forward)(args)
    }

    /// Resolve the gradient callable for the i-th input. `input_tag` is the
    /// tag attached to that input, if any; when present, dispatch is by tag,
    /// otherwise by position.
    pub(crate) fn grad_for(&self, index: usize, input_tag: Option<&str>) -> Option<&GradFn> {
        match input_tag {
            Some(tag) => self
                .grads
                .iter()
                .find(|entry| entry.tag.as_deref() == Some(tag))
                .map(|entry| &entry.f),
            None => self.grads.get(index).map(|entry| &entry.f),
        }
    }
}
