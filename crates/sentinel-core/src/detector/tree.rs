//! Randomized isolation tree over one-dimensional samples

use rand::Rng;

/// Euler-Mascheroni constant used by the harmonic number approximation
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Redraws allowed when a split lands on the lower bound of the node range
const MAX_SPLIT_DRAWS: usize = 8;

/// Expected path length of an unsuccessful search in a binary search tree
/// built over `n` points, `c(n)`.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// A single isolation tree, immutable once built
#[derive(Debug, Clone)]
pub struct IsolationTree {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    Internal {
        split: f64,
        range: Range,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        range: Range,
    },
}

/// Observed value range and point count at a node
#[derive(Debug, Clone, Copy)]
struct Range {
    lo: f64,
    hi: f64,
    size: usize,
}

impl Range {
    fn of(points: &[f64]) -> Self {
        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Self {
            lo,
            hi,
            size: points.len(),
        }
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

impl Node {
    fn range(&self) -> &Range {
        match self {
            Node::Internal { range, .. } | Node::Leaf { range } => range,
        }
    }
}

impl IsolationTree {
    /// Build a tree over `points`, stopping at `max_depth`
    pub fn build<R: Rng + ?Sized>(points: &[f64], max_depth: usize, rng: &mut R) -> Self {
        Self {
            root: Self::build_node(points, 0, max_depth, rng),
        }
    }

    fn build_node<R: Rng + ?Sized>(
        points: &[f64],
        depth: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Node {
        let range = Range::of(points);

        if points.len() <= 1 || depth >= max_depth {
            return Node::Leaf { range };
        }

        // Zero-variance node: nothing left to separate
        let split = match draw_split(range.lo, range.hi, rng) {
            Some(split) => split,
            None => return Node::Leaf { range },
        };

        let (left, right): (Vec<f64>, Vec<f64>) = points.iter().partition(|&&v| v < split);

        Node::Internal {
            split,
            range,
            left: Box::new(Self::build_node(&left, depth + 1, max_depth, rng)),
            right: Box::new(Self::build_node(&right, depth + 1, max_depth, rng)),
        }
    }

    /// Path length of `value`: internal nodes traversed plus `c(leaf size)`.
    ///
    /// With `isolate_out_of_range`, a node holding two or more points whose
    /// observed range excludes `value` ends the descent at `depth + 1`.
    pub fn path_length(&self, value: f64, isolate_out_of_range: bool) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;

        loop {
            let range = node.range();
            if isolate_out_of_range && range.size >= 2 && !range.contains(value) {
                return depth as f64 + 1.0;
            }

            match node {
                Node::Leaf { range } => {
                    return depth as f64 + average_path_length(range.size);
                }
                Node::Internal {
                    split, left, right, ..
                } => {
                    node = if value < *split { left } else { right };
                    depth += 1;
                }
            }
        }
    }

    /// Depth of the deepest leaf
    pub fn height(&self) -> usize {
        fn height(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => 1 + height(left).max(height(right)),
            }
        }
        height(&self.root)
    }

    /// Number of training points the tree was built from
    pub fn size(&self) -> usize {
        self.root.range().size
    }
}

/// Draw a split strictly inside `(lo, hi)`, or `None` for a degenerate range
fn draw_split<R: Rng + ?Sized>(lo: f64, hi: f64, rng: &mut R) -> Option<f64> {
    if hi <= lo || !(hi - lo).is_finite() {
        return None;
    }

    (0..MAX_SPLIT_DRAWS)
        .map(|_| rng.gen_range(lo..hi))
        .find(|&split| split > lo)
}
