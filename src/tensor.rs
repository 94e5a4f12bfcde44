//! Tensor: the opaque numeric container kernels and nodes pass around.
//!
//! A tensor is a flat, contiguous buffer plus a [`Shape`]. Storage comes in
//! two flavors, real (`f64`) and integer (`i64`), but only real storage
//! supports in-place mutation and only real tensors come out of a kernel.
//! No arithmetic lives here; that's [`crate::kernels`].

use crate::shape::{Shape, ShapeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
    #[error("tensor has integer storage and cannot be mutated in place")]
    NotReal,
}

pub type TensorResult<T> = Result<T, TensorError>;

/// The two element types a tensor can hold.
#[derive(Clone, Debug)]
enum Storage {
    Real(Vec<f64>),
    Int(Vec<i64>),
}

impl Storage {
    fn len(&self) -> usize {
        match self {
            Storage::Real(v) => v.len(),
            Storage::Int(v) => v.len(),
        }
    }
}

/// A uniform numeric buffer with a shape. Cheap to clone: cloning duplicates
/// the backing `Vec`, which is exactly the "value is duplicated on capture"
/// semantics a `Parameter` node needs.
#[derive(Clone)]
pub struct Tensor {
    storage: Storage,
    shape: Shape,
}

impl Tensor {
    /// Build a real-valued tensor. Fails if `data.len() != shape.numel()`.
    pub fn real(data: Vec<f64>, shape: Shape) -> TensorResult<Self> {
        if data.len() != shape.numel() {
            return Err(TensorError::Shape(ShapeError(format!(
                "data len {} != shape numel {}",
                data.len(),
                shape.numel()
            ))));
        }
        Ok(Tensor {
            storage: Storage::Real(data),
            shape,
        })
    }

    /// Build an integer-valued tensor. Fails if `data.len() != shape.numel()`.
    pub fn int(data: Vec<i64>, shape: Shape) -> TensorResult<Self> {
        if data.len() != shape.numel() {
            return Err(TensorError::Shape(ShapeError(format!(
                "data len {} != shape numel {}",
                data.len(),
                shape.numel()
            ))));
        }
        Ok(Tensor {
            storage: Storage::Int(data),
            shape,
        })
    }

    /// A real scalar tensor (shape `[1]`).
    pub fn scalar(value: f64) -> Self {
        Tensor {
            storage: Storage::Real(vec![value]),
            shape: Shape::scalar(),
        }
    }

    /// A real tensor of zeros with the given shape.
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.numel();
        Tensor {
            storage: Storage::Real(vec![0.0; n]),
            shape,
        }
    }

    /// Build a real tensor from `data`, carrying the shape of `source` onto
    /// it. This is the "shape-preserving attribute carry" operation kernels
    /// use to stamp their output with the primary input's shape.
    pub fn with_shape_of(data: Vec<f64>, source: &Tensor) -> TensorResult<Self> {
        Tensor::real(data, source.shape.clone())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of this tensor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_real(&self) -> bool {
        matches!(self.storage, Storage::Real(_))
    }

    /// Read every element as `f64`, coercing integer storage on the fly.
    /// This is how kernels accept "real OR integer storage for reads".
    pub fn as_real(&self) -> Vec<f64> {
        match &self.storage {
            Storage::Real(v) => v.clone(),
            Storage::Int(v) => v.iter().map(|&x| x as f64).collect(),
        }
    }

    /// Element at `index`, coerced to `f64`.
    pub fn get(&self, index: usize) -> Option<f64> {
        match &self.storage {
            Storage::Real(v) => v.get(index).copied(),
            Storage::Int(v) => v.get(index).map(|&x| x as f64),
        }
    }

    /// Mutable view over real storage, for in-place updates (optimizer
    /// steps). Fails with `NotReal` on integer-backed tensors.
    pub fn real_mut(&mut self) -> TensorResult<&mut [f64]> {
        match &mut self.storage {
            Storage::Real(v) => Ok(v),
            Storage::Int(_) => Err(TensorError::NotReal),
        }
    }

    /// Duplicate this tensor, preserving shape. Equivalent to [`Clone`] but
    /// named for the "shape-preserving duplication" requirement.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("len", &self.len())
            .field("real", &self.is_real())
            .finish()
    }
}
