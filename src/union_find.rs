use std::collections::HashMap;

use crate::error::{PercolationError, Result};

/// `vec![value; len]`, or `InvalidSize(size)` if the allocation is refused
pub(crate) fn try_filled<T: Clone>(len: usize, value: T, size: usize) -> Result<Vec<T>> {
    let mut filled = Vec::new();
    filled
        .try_reserve_exact(len)
        .map_err(|_| PercolationError::InvalidSize(size))?;
    filled.resize(len, value);
    Ok(filled)
}

/// Union-Find (Disjoint Sets) over `0..count`, merged by tree size
///
/// The forest lives in two flat vectors indexed by element. `find` walks the
/// parent chain without compressing it, so lookups only need `&self` and the
/// shape of the forest depends on nothing but the sequence of unions.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    tree_size: Vec<usize>,
    set_count: usize,
}

impl UnionFind {
    /// Create a new UnionFind with `count` singleton sets
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(PercolationError::InvalidSize(count));
        }
        let mut parent = Vec::new();
        parent
            .try_reserve_exact(count)
            .map_err(|_| PercolationError::InvalidSize(count))?;
        parent.extend(0..count);

        Ok(UnionFind {
            parent,
            tree_size: try_filled(count, 1, count)?,
            set_count: count,
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Always false: construction rejects an empty universe
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of disjoint sets remaining
    pub fn set_count(&self) -> usize {
        self.set_count
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.parent.len() {
            Ok(())
        } else {
            Err(PercolationError::IndexOutOfRange {
                index,
                count: self.parent.len(),
            })
        }
    }

    /// Root of `p` without a range check; callers own the index space.
    pub(crate) fn root(&self, mut p: usize) -> usize {
        while self.parent[p] != p {
            p = self.parent[p];
        }
        p
    }

    /// Find the root of element `p`
    pub fn find(&self, p: usize) -> Result<usize> {
        self.check(p)?;
        Ok(self.root(p))
    }

    /// Union the sets containing `p` and `q`.
    ///
    /// The smaller tree is hung under the root of the larger one. On a tie the
    /// root of `q` goes under the root of `p`. Returns `true` if two distinct
    /// sets were merged.
    pub fn union(&mut self, p: usize, q: usize) -> Result<bool> {
        self.check(p)?;
        self.check(q)?;

        let root_p = self.root(p);
        let root_q = self.root(q);
        if root_p == root_q {
            return Ok(false);
        }

        if self.tree_size[root_p] < self.tree_size[root_q] {
            self.parent[root_p] = root_q;
            self.tree_size[root_q] += self.tree_size[root_p];
        } else {
            self.parent[root_q] = root_p;
            self.tree_size[root_p] += self.tree_size[root_q];
        }
        self.set_count -= 1;
        Ok(true)
    }

    /// Check if two elements are in the same set
    pub fn connected(&self, p: usize, q: usize) -> Result<bool> {
        Ok(self.find(p)? == self.find(q)?)
    }

    /// Number of elements in the set containing `p`
    pub fn set_size(&self, p: usize) -> Result<usize> {
        let root = self.find(p)?;
        Ok(self.tree_size[root])
    }

    /// Get all sets as groups of indices, each group sorted, groups ordered by
    /// their smallest member
    pub fn sets(&self) -> Vec<Vec<usize>> {
        let mut root_to_group: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..self.parent.len() {
            root_to_group.entry(self.root(i)).or_default().push(i);
        }

        let mut groups: Vec<Vec<usize>> = root_to_group.into_values().collect();
        groups.sort_by_key(|group| group[0]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            UnionFind::new(0).unwrap_err(),
            PercolationError::InvalidSize(0)
        );
    }

    #[test]
    fn test_new_rejects_unallocatable_count() {
        assert_eq!(
            UnionFind::new(usize::MAX).unwrap_err(),
            PercolationError::InvalidSize(usize::MAX)
        );
    }

    #[test]
    fn test_singletons() {
        let uf = UnionFind::new(4).unwrap();
        assert_eq!(uf.len(), 4);
        assert_eq!(uf.set_count(), 4);
        for i in 0..4 {
            assert_eq!(uf.find(i).unwrap(), i);
            assert_eq!(uf.set_size(i).unwrap(), 1);
        }
    }

    #[test]
    fn test_union_counts_only_merges() {
        let mut uf = UnionFind::new(5).unwrap();
        assert!(uf.union(0, 1).unwrap());
        assert_eq!(uf.set_count(), 4);

        // Already connected: nothing changes
        assert!(!uf.union(1, 0).unwrap());
        assert_eq!(uf.set_count(), 4);
        assert_eq!(uf.set_size(0).unwrap(), 2);

        assert!(uf.union(2, 3).unwrap());
        assert!(uf.union(0, 3).unwrap());
        assert_eq!(uf.set_count(), 2);
        assert_eq!(uf.set_size(2).unwrap(), 4);
        assert!(uf.connected(1, 2).unwrap());
        assert!(!uf.connected(1, 4).unwrap());
    }

    #[test]
    fn test_tie_keeps_first_root() {
        let mut uf = UnionFind::new(4).unwrap();
        uf.union(2, 3).unwrap();
        assert_eq!(uf.find(3).unwrap(), 2);

        uf.union(0, 1).unwrap();
        // Two trees of size 2: q's root goes under p's root
        uf.union(3, 1).unwrap();
        assert_eq!(uf.find(0).unwrap(), 2);
    }

    #[test]
    fn test_smaller_tree_goes_under_larger() {
        let mut uf = UnionFind::new(4).unwrap();
        uf.union(1, 2).unwrap();
        uf.union(1, 3).unwrap();
        // p's tree (size 1) is smaller than q's (size 3)
        uf.union(0, 3).unwrap();
        assert_eq!(uf.find(0).unwrap(), 1);
        assert_eq!(uf.set_size(0).unwrap(), 4);
    }

    #[test]
    fn test_out_of_range_leaves_state_untouched() {
        let mut uf = UnionFind::new(3).unwrap();
        uf.union(0, 1).unwrap();

        let err = uf.union(2, 3).unwrap_err();
        assert_eq!(err, PercolationError::IndexOutOfRange { index: 3, count: 3 });
        assert_eq!(uf.set_count(), 2);
        assert!(!uf.connected(1, 2).unwrap());
        assert!(uf.find(7).is_err());
        assert!(uf.connected(0, 3).is_err());
    }

    #[test]
    fn test_sets() {
        let mut uf = UnionFind::new(6).unwrap();
        uf.union(4, 1).unwrap();
        uf.union(5, 3).unwrap();
        uf.union(3, 1).unwrap();
        assert_eq!(uf.sets(), vec![vec![0], vec![1, 3, 4, 5], vec![2]]);
    }
}
