//! Incremental disjoint-set structure backing equivalence classing.
//!
//! Tokens are interned to dense `usize` handles before classing, so the
//! union-find operates on integers rather than repeatedly hashing surface
//! text. Every handle starts in its own singleton class; unions are applied
//! as description references resolve.

/// Union-find over dense handles with path compression and union by size.
#[derive(Debug, Default)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Create a structure with `len` singleton classes, one per handle.
    pub(crate) fn with_len(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Number of handles (not classes).
    pub(crate) fn len(&self) -> usize {
        self.parent.len()
    }

    /// Representative handle of `x`'s class.
    pub(crate) fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while let Some(&p) = self.parent.get(root) {
            if p == root {
                break;
            }
            root = p;
        }
        // Path compression.
        let mut cursor = x;
        while let Some(p) = self.parent.get_mut(cursor) {
            if *p == root {
                break;
            }
            let next = *p;
            *p = root;
            cursor = next;
        }
        root
    }

    /// Merge the classes of `a` and `b`; a no-op when already merged.
    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let sa = self.size.get(ra).copied().unwrap_or(0);
        let sb = self.size.get(rb).copied().unwrap_or(0);
        let (small, large) = if sa < sb { (ra, rb) } else { (rb, ra) };
        if let Some(p) = self.parent.get_mut(small) {
            *p = large;
        }
        if let Some(s) = self.size.get_mut(large) {
            *s = sa.saturating_add(sb);
        }
    }

    /// The full partition: one `Vec` of member handles per class, members
    /// and classes in ascending handle order.
    pub(crate) fn classes(&mut self) -> Vec<Vec<usize>> {
        let len = self.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); len];
        for x in 0..len {
            let root = self.find(x);
            if let Some(class) = by_root.get_mut(root) {
                class.push(x);
            }
        }
        by_root.into_iter().filter(|c| !c.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_until_union() {
        let mut ds = DisjointSet::with_len(3);
        assert_eq!(ds.classes(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn union_is_transitive() {
        let mut ds = DisjointSet::with_len(4);
        ds.union(0, 1);
        ds.union(1, 2);
        assert_eq!(ds.find(0), ds.find(2));
        assert_ne!(ds.find(0), ds.find(3));
        let classes = ds.classes();
        assert_eq!(classes.len(), 2);
        assert!(classes.contains(&vec![0, 1, 2]));
        assert!(classes.contains(&vec![3]));
    }

    #[test]
    fn union_is_idempotent() {
        let mut ds = DisjointSet::with_len(2);
        ds.union(0, 1);
        ds.union(0, 1);
        ds.union(1, 0);
        assert_eq!(ds.classes(), vec![vec![0, 1]]);
    }

    #[test]
    fn partition_covers_every_handle() {
        let mut ds = DisjointSet::with_len(6);
        ds.union(0, 5);
        ds.union(2, 3);
        let mut seen: Vec<usize> = ds.classes().into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }
}
