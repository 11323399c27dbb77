// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Job kinds, partitioning and the member-invocation capability

use crate::error::{PoolError, Result};

/// Discriminant of a dispatched job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobKind {
    /// One function applied to every element
    Map = 1,
    /// Independent `(function, argument)` pairs
    Call = 2,
    /// `(object, member)` pairs, zero-argument member
    Member = 3,
    /// `(object, member, args)` triples
    MemberWithArgs = 4,
}

/// One `(function, argument)` element of a kind 2 job
pub type Call<T, R> = (fn(T) -> R, T);

/// Work shipped to a worker: its partition, already bound to the code that
/// processes it.
pub(crate) type Work<R> = Box<dyn FnOnce() -> Result<Vec<R>> + Send>;

/// Message body on a worker's inbound channel. `None` on the channel is the
/// stop sentinel.
pub(crate) struct Job<R> {
    pub kind: JobKind,
    pub len: usize,
    pub work: Work<R>,
}

/// Objects whose named operations can be invoked by kind 3 and 4 jobs.
///
/// The object is moved into the worker, so any state it mutates stays there;
/// only the returned output travels back.
pub trait Invoke: Send + 'static {
    type Args: Send + 'static;
    type Output: Send + 'static;

    /// Invoke the zero-argument operation `member`
    fn call(self, member: &str) -> Result<Self::Output>;

    /// Invoke `member` with explicit arguments
    fn call_with(self, member: &str, _args: Self::Args) -> Result<Self::Output>
    where
        Self: Sized,
    {
        Err(PoolError::UnknownMember {
            member: member.to_string(),
        })
    }
}

/// Split `data` into exactly `parts` contiguous slices of near-equal size.
///
/// Every slice holds `len / parts` elements; the first `len % parts` slices
/// hold one extra. Trailing slices are empty when `len < parts`.
/// Concatenating the slices in order reproduces `data`.
pub fn split_array<T>(data: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    if parts == 0 {
        return Vec::new();
    }
    let base = data.len() / parts;
    let extra = data.len() % parts;

    let mut items = data.into_iter();
    (0..parts)
        .map(|i| {
            let take = base + usize::from(i < extra);
            items.by_ref().take(take).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ten_into_three() {
        let parts = split_array((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
    }

    #[test]
    fn test_split_even() {
        let parts = split_array((0..9).collect::<Vec<_>>(), 3);
        assert!(parts.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn test_split_fewer_items_than_parts() {
        let parts = split_array(vec!['a', 'b'], 4);
        assert_eq!(parts, vec![vec!['a'], vec!['b'], vec![], vec![]]);
    }

    #[test]
    fn test_split_single_part() {
        assert_eq!(split_array(vec![1, 2, 3], 1), vec![vec![1, 2, 3]]);
        assert!(split_array(vec![1, 2, 3], 0).is_empty());
    }

    #[test]
    fn test_remainder_goes_to_earliest() {
        let sizes: Vec<usize> = split_array((0..11).collect::<Vec<_>>(), 4)
            .iter()
            .map(Vec::len)
            .collect();
        assert_eq!(sizes, vec![3, 3, 3, 2]);
    }
}
