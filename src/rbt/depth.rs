use std::{fmt, result};

/// Shape statistics of a red-black tree, sampled once per leaf-node by
/// [Index::validate].
///
/// Each sample is a root-to-leaf path, its depth in edges and the number
/// of black nodes on it. In a valid tree every path carries the same
/// number of blacks, and the deepest path stays within
/// [Depth::to_height_bound].
///
/// [Index::validate]: crate::rbt::Index::validate
#[derive(Clone, Default, PartialEq)]
pub struct Depth {
    samples: usize,
    total: usize,
    depth: Option<(usize, usize)>,  // (min, max) edges
    blacks: Option<(usize, usize)>, // (min, max) blacks per path
    max_reds: usize,
}

impl Depth {
    /// Record a leaf-node at `depth` edges from root, whose path from
    /// root has `blacks` black nodes, leaf included.
    pub fn sample(&mut self, depth: usize, blacks: usize) {
        self.samples += 1;
        self.total += depth;
        self.depth = Some(widen(self.depth, depth));
        self.blacks = Some(widen(self.blacks, blacks));
        self.max_reds = usize::max(self.max_reds, (depth + 1).saturating_sub(blacks));
    }

    /// Return number of leaf-nodes sampled.
    pub fn to_samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of leaf-node, ZERO when there are no samples.
    pub fn to_min(&self) -> usize {
        self.depth.map_or(0, |(min, _)| min)
    }

    /// Return maximum depth of leaf-node, ZERO when there are no samples.
    pub fn to_max(&self) -> usize {
        self.depth.map_or(0, |(_, max)| max)
    }

    /// Return the average depth of leaf-nodes, ZERO when there are no
    /// samples.
    pub fn to_mean(&self) -> usize {
        self.total.checked_div(self.samples).unwrap_or(0)
    }

    /// Return the (min, max) number of blacks seen on a root-to-leaf path.
    pub fn to_blacks(&self) -> Option<(usize, usize)> {
        self.blacks
    }

    /// Return the largest number of red nodes seen on a root-to-leaf path.
    pub fn to_max_reds(&self) -> usize {
        self.max_reds
    }

    /// Return the maximum height, in edges, of a red-black tree holding
    /// `n_count` nodes, that is `2 * log2(n_count + 1)`.
    pub fn to_height_bound(n_count: usize) -> usize {
        (2.0 * ((n_count + 1) as f64).log2()).floor() as usize
    }

    /// Return whether sampled paths have uniform black-height and the
    /// deepest path is within the height bound for `n_count` nodes.
    pub fn is_balanced(&self, n_count: usize) -> bool {
        let uniform = match self.blacks {
            Some((min, max)) => min == max,
            None => true,
        };
        uniform && self.to_max() <= Depth::to_height_bound(n_count)
    }
}

fn widen(range: Option<(usize, usize)>, val: usize) -> (usize, usize) {
    match range {
        Some((min, max)) => (usize::min(min, val), usize::max(max, val)),
        None => (val, val),
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        let (m, n, x) = (self.to_min(), self.to_mean(), self.to_max());
        let blacks = match self.blacks {
            Some((min, max)) if min == max => min.to_string(),
            Some((min, max)) => format!("{}..{}", min, max),
            None => "none".to_string(),
        };
        write!(
            f,
            concat!(
                "{{ samples={}, min={}, mean={}, max={}, ",
                "blacks={}, max_reds={} }}"
            ),
            self.samples, m, n, x, blacks, self.max_reds
        )
    }
}

impl fmt::Debug for Depth {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
#[path = "depth_test.rs"]
mod depth_test;
