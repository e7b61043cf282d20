//! Resampling a tape to a different length.
//!
//! Stretching duplicates every element `ceil(target / len)` times and then
//! truncates, so earlier elements may appear more often than later ones.
//! Compressing takes the source element at `floor(i * len / target)`.

use crate::error::{Result, TapeError};

/// Stretch or compress `elements` to exactly `target` items.
///
/// # Examples
/// ```
/// use tape_core::spread;
///
/// assert_eq!(spread(&[1, 2, 3], 6).unwrap(), vec![1, 1, 2, 2, 3, 3]);
/// assert_eq!(spread(&[1, 2, 3, 4], 2).unwrap(), vec![1, 3]);
/// ```
pub fn spread<T: Clone>(elements: &[T], target: usize) -> Result<Vec<T>> {
    if target == 0 {
        return Err(TapeError::zero_length("spread"));
    }

    let len = elements.len();
    if len == 0 {
        return Err(TapeError::empty_pattern("spread"));
    }

    if target == len {
        return Ok(elements.to_vec());
    }

    if target > len {
        let copies = target.div_ceil(len);
        return Ok(elements
            .iter()
            .flat_map(|e| std::iter::repeat(e).take(copies))
            .take(target)
            .cloned()
            .collect());
    }

    Ok((0..target).map(|i| elements[i * len / target].clone()).collect())
}
