//! Shared recycling/reduction helpers used by the binary arithmetic kernels.

use crate::error::{CgError, CgResult};
use crate::kernels::block_sum::block_sum;

/// Repeat `x` cyclically until it has `len` elements.
pub(crate) fn tile(x: &[f64], len: usize) -> Vec<f64> {
    (0..len).map(|i| x[i % x.len()]).collect()
}

/// Reduce a full-length gradient back down to `target_len`, block-summing
/// when the operand was recycled going forward.
pub(crate) fn reduce_to(grad: &[f64], target_len: usize) -> Vec<f64> {
    if grad.len() == target_len {
        grad.to_vec()
    } else {
        block_sum(grad, target_len)
    }
}

/// Resolve the two operands of a binary kernel to a common "full" length via
/// R-style implicit recycling: the shorter operand repeats cyclically to
/// match the longer, whose length must be an exact multiple of the
/// shorter's. Returns `(a_full, b_full, full_len)`.
pub(crate) fn recycle(a: &[f64], b: &[f64]) -> CgResult<(Vec<f64>, Vec<f64>, usize)> {
    let full_len = a.len().max(b.len());
    let short_len = a.len().min(b.len());
    if short_len == 0 || full_len % short_len != 0 {
        return Err(CgError::InvalidArgument(format!(
            "cannot recycle operands of length {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok((tile(a, full_len), tile(b, full_len), full_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_repeats_cyclically() {
        assert_eq!(tile(&[1.0, 2.0], 5), vec![1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn recycle_rejects_non_divisible_lengths() {
        assert!(recycle(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_err());
    }
}
