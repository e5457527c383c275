//! Disjoint-set forest over dense indices
//!
//! Parent and rank pointers live in flat vectors indexed by element, so an
//! element is just its position in the caller's episode arena.

/// Union-find with path compression and union by rank
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    /// Create `n` singleton sets
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the forest has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Compress the path
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merge the sets containing `a` and `b`; returns false if already joined
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Whether `a` and `b` are in the same set
    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Partition of all elements, each component sorted and components
    /// ordered by their smallest element
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut slot_of_root = vec![usize::MAX; n];
        let mut components: Vec<Vec<usize>> = Vec::new();

        for x in 0..n {
            let root = self.find(x);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = components.len();
                components.push(Vec::new());
            }
            components[slot_of_root[root]].push(x);
        }

        components
    }
}
