//! Tensor slice / slice-assign along the leading dimension.

use crate::error::{CgError, CgResult};
use crate::shape::Shape;
use crate::tensor::Tensor;

fn leading_block_len(x: &Tensor) -> CgResult<(usize, usize)> {
    let dims = x.shape().dims();
    if dims.is_empty() {
        return Err(CgError::InvalidArgument(
            "cannot slice a tensor with no dimensions".into(),
        ));
    }
    Ok((dims[0], x.len() / dims[0]))
}

/// The contiguous block at position `index` along the leading dimension.
pub fn slice(x: &Tensor, index: usize) -> CgResult<Tensor> {
    let (n, block_len) = leading_block_len(x)?;
    if index >= n {
        return Err(CgError::InvalidArgument(format!(
            "slice index {index} out of bounds for leading dimension {n}"
        )));
    }
    let data = x.as_real();
    let start = index * block_len;
    let block = data[start..start + block_len].to_vec();
    let rest = &x.shape().dims()[1..];
    let shape = if rest.is_empty() {
        Shape::scalar()
    } else {
        Shape::new(rest.to_vec())
    };
    Ok(Tensor::real(block, shape)?)
}

/// Gradient of `slice`: scatter `grad` back into a zero tensor shaped like
/// `x`, at the same leading-dimension position.
pub fn slice_grad(x: &Tensor, index: usize, grad: &Tensor) -> CgResult<Tensor> {
    let (n, block_len) = leading_block_len(x)?;
    if grad.len() != block_len {
        return Err(CgError::InvalidArgument(format!(
            "slice gradient of length {} does not match block length {}",
            grad.len(),
            block_len
        )));
    }
    let _ = n;
    let mut data = vec![0.0; x.len()];
    let start = index * block_len;
    data[start..start + block_len].copy_from_slice(&grad.as_real());
    Ok(Tensor::with_shape_of(data, x)?)
}

/// Overwrite the block at `index` with `block`, returning a new tensor
/// shaped like `x`.
pub fn slice_assign(x: &Tensor, index: usize, block: &Tensor) -> CgResult<Tensor> {
    let (n, block_len) = leading_block_len(x)?;
    if index >= n {
        return Err(CgError::InvalidArgument(format!(
            "slice index {index} out of bounds for leading dimension {n}"
        )));
    }
    if block.len() != block_len {
        return Err(CgError::InvalidArgument(format!(
            "assigned block of length {} does not match block length {}",
            block.len(),
            block_len
        )));
    }
    let mut data = x.as_real();
    let start = index * block_len;
    data[start..start + block_len].copy_from_slice(&block.as_real());
    Ok(Tensor::with_shape_of(data, x)?)
}
