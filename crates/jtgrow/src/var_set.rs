//! Small sorted id sets used for clique scopes, factor scopes and fill-in.
//!
//! Cliques in a bounded-width decomposition hold a handful of variables, so a
//! sorted inline vector beats a hash set on every operation that matters here:
//! merge-style union and difference are linear, membership is a binary search,
//! and nothing allocates until a set outgrows its inline capacity.

use serde::Serialize;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// Identifier of an MRF variable.
pub type VarId = u32;

/// Identifier of a factor (original or synthetic).
pub type FactorId = u32;

/// Inline capacity; sets larger than this spill to the heap.
const INLINE: usize = 16;

/// Sorted, duplicate-free set of integer ids.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IdSet(SmallVec<[u32; INLINE]>);

/// Set of variable ids.
pub type VarSet = IdSet;

/// Set of factor ids.
pub type FactorSet = IdSet;

impl IdSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Create a set from arbitrary (possibly unsorted, repeated) ids.
    pub fn from_slice(ids: &[u32]) -> Self {
        let mut v = SmallVec::from_slice(ids);
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    /// Create a set holding one id.
    pub fn singleton(id: u32) -> Self {
        let mut v = SmallVec::new();
        v.push(id);
        Self(v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Insert an id. Returns `true` if it was not already present.
    pub fn insert(&mut self, id: u32) -> bool {
        match self.0.binary_search(&id) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, id);
                true
            }
        }
    }

    /// Remove an id. Returns `true` if it was present.
    pub fn remove(&mut self, id: u32) -> bool {
        match self.0.binary_search(&id) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Smallest id in the set.
    pub fn first(&self) -> Option<u32> {
        self.0.first().copied()
    }

    /// Largest id in the set.
    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Merge-iterate the union of two sets in ascending order.
    pub fn union<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = u32> + 'a {
        let mut xs = self.0.iter().copied().peekable();
        let mut ys = other.0.iter().copied().peekable();
        std::iter::from_fn(move || match (xs.peek().copied(), ys.peek().copied()) {
            (None, None) => None,
            (Some(_), None) => xs.next(),
            (None, Some(_)) => ys.next(),
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Less => xs.next(),
                Ordering::Greater => ys.next(),
                Ordering::Equal => {
                    ys.next();
                    xs.next()
                }
            },
        })
    }

    /// Merge-iterate the intersection of two sets in ascending order.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = u32> + 'a {
        let mut ys = other.0.iter().copied();
        let mut maybe_y = ys.next();
        self.0.iter().copied().filter(move |x| {
            while let Some(y) = maybe_y {
                if y > *x {
                    break;
                }
                maybe_y = ys.next();
                if y == *x {
                    return true;
                }
            }
            false
        })
    }

    /// `self += other`.
    pub fn union_with(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.0.clone_from(&other.0);
            return;
        }
        let merged: SmallVec<[u32; INLINE]> = self.union(other).collect();
        self.0 = merged;
    }

    /// `self -= other`.
    pub fn difference_with(&mut self, other: &Self) {
        if other.is_empty() || self.is_empty() {
            return;
        }
        self.0.retain(|id| other.0.binary_search(id).is_err());
    }

    /// `self ∩ other` as a new set.
    pub fn intersect(&self, other: &Self) -> Self {
        Self(self.intersection(other).collect())
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.intersection(other).count() == self.len()
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<u32> for IdSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut v: SmallVec<[u32; INLINE]> = iter.into_iter().collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }
}

impl Extend<u32> for IdSet {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_sorts_and_dedups() {
        let set = IdSet::from_slice(&[5, 1, 3, 1, 5]);
        assert_eq!(set.as_slice(), &[1, 3, 5]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.first(), Some(1));
        assert_eq!(set.last(), Some(5));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = IdSet::new();
        assert!(set.insert(4));
        assert!(set.insert(2));
        assert!(!set.insert(4));
        assert!(set.contains(2));
        assert!(set.remove(2));
        assert!(!set.remove(2));
        assert_eq!(set.as_slice(), &[4]);
    }

    #[test]
    fn test_union_and_difference() {
        let mut a = IdSet::from_slice(&[1, 2, 5]);
        let b = IdSet::from_slice(&[2, 3, 7]);
        assert_eq!(a.union(&b).collect::<Vec<_>>(), vec![1, 2, 3, 5, 7]);

        a.union_with(&b);
        assert_eq!(a.as_slice(), &[1, 2, 3, 5, 7]);

        a.difference_with(&IdSet::from_slice(&[2, 7, 9]));
        assert_eq!(a.as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn test_intersection_and_subset() {
        let abc = IdSet::from_slice(&[1, 2, 3]);
        let bc = IdSet::from_slice(&[2, 3]);
        let cd = IdSet::from_slice(&[3, 4]);

        assert_eq!(abc.intersect(&cd).as_slice(), &[3]);
        assert_eq!(cd.intersect(&abc).as_slice(), &[3]);
        assert!(bc.is_subset_of(&abc));
        assert!(!cd.is_subset_of(&abc));
        assert!(IdSet::new().is_subset_of(&cd));
    }

    #[test]
    fn test_spills_past_inline_capacity() {
        let set: IdSet = (0..40).rev().collect();
        assert_eq!(set.len(), 40);
        assert_eq!(set.first(), Some(0));
        assert!(set.contains(39));
    }

    #[test]
    fn test_display() {
        assert_eq!(IdSet::from_slice(&[3, 1]).to_string(), "{1, 3}");
        assert_eq!(IdSet::new().to_string(), "{}");
    }
}
