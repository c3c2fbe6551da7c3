//! Random and blank tree generation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::domain::arena::{GameTree, NodeId, Role};
use crate::domain::error::{DomainError, DomainResult};

/// Produces trees of a given depth and branching factor.
///
/// `depth` counts edges: the root sits at depth 0 and leaves at `depth`.
/// Ids are `node-<n>` assigned in pre-order.
#[derive(Debug, Clone)]
pub struct TreeGenerator {
    rng: SmallRng,
    min_value: i64,
    max_value: i64,
    keep_probability: f64,
    root_role: Role,
}

impl Default for TreeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeGenerator {
    pub const DEFAULT_MIN_VALUE: i64 = -50;
    pub const DEFAULT_MAX_VALUE: i64 = 50;
    pub const DEFAULT_KEEP_PROBABILITY: f64 = 0.9;

    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            min_value: Self::DEFAULT_MIN_VALUE,
            max_value: Self::DEFAULT_MAX_VALUE,
            keep_probability: Self::DEFAULT_KEEP_PROBABILITY,
            root_role: Role::Max,
        }
    }

    /// Leaf values are drawn from `min..max` (upper bound exclusive).
    pub fn with_value_range(mut self, min: i64, max: i64) -> DomainResult<Self> {
        if min >= max {
            return Err(DomainError::InvalidParameter {
                name: "value_range",
                reason: format!("empty range {min}..{max}"),
            });
        }
        self.min_value = min;
        self.max_value = max;
        Ok(self)
    }

    /// Probability that each child slot of a random tree is filled.
    pub fn with_keep_probability(mut self, p: f64) -> DomainResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DomainError::InvalidParameter {
                name: "keep_probability",
                reason: format!("{p} is not within [0, 1]"),
            });
        }
        self.keep_probability = p;
        Ok(self)
    }

    pub fn with_root_role(mut self, role: Role) -> Self {
        self.root_role = role;
        self
    }

    /// Random tree: each child slot survives with the keep probability, but an
    /// internal node always ends up with at least one child. Roles alternate
    /// from the root role.
    #[instrument(level = "debug", skip(self))]
    pub fn random(&mut self, depth: usize, branching: usize) -> DomainResult<GameTree> {
        check_branching(branching)?;
        let mut tree = GameTree::new();
        let mut counter = 0usize;
        let role = self.root_role;
        self.grow_random(&mut tree, &mut counter, None, 0, depth, branching, role);
        debug!("generated random tree with {} nodes", tree.len());
        Ok(tree)
    }

    #[allow(clippy::too_many_arguments)]
    fn grow_random(
        &mut self,
        tree: &mut GameTree,
        counter: &mut usize,
        parent: Option<generational_arena::Index>,
        level: usize,
        depth: usize,
        branching: usize,
        role: Role,
    ) {
        let id = next_id(counter);
        if level == depth {
            let value = self.rng.random_range(self.min_value..self.max_value) as f64;
            tree.insert_node(id, Some(value), role.is_max(), parent);
            return;
        }

        let idx = tree.insert_node(id, None, role.is_max(), parent);
        let mut added = 0;
        for _ in 0..branching {
            if self.rng.random_bool(self.keep_probability) {
                self.grow_random(tree, counter, Some(idx), level + 1, depth, branching, role.opposite());
                added += 1;
            }
        }
        if added == 0 {
            self.grow_random(tree, counter, Some(idx), level + 1, depth, branching, role.opposite());
        }
    }

    /// Complete tree with every leaf valued 0, ready to be filled in by hand.
    #[instrument(level = "debug", skip(self))]
    pub fn empty(&self, depth: usize, branching: usize) -> DomainResult<GameTree> {
        check_branching(branching)?;
        let mut tree = GameTree::new();
        let mut counter = 0usize;
        let mut stack = vec![(None, 0usize, self.root_role)];

        while let Some((parent, level, role)) = stack.pop() {
            let id = next_id(&mut counter);
            if level == depth {
                tree.insert_node(id, Some(0.0), role.is_max(), parent);
                continue;
            }
            let idx = tree.insert_node(id, None, role.is_max(), parent);
            for _ in 0..branching {
                stack.push((Some(idx), level + 1, role.opposite()));
            }
        }

        Ok(tree)
    }
}

fn check_branching(branching: usize) -> DomainResult<()> {
    if branching == 0 {
        return Err(DomainError::InvalidParameter {
            name: "branching",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn next_id(counter: &mut usize) -> NodeId {
    let id = NodeId::new(format!("node-{counter}"));
    *counter += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree_shape() {
        let tree = TreeGenerator::with_seed(1).empty(2, 3).unwrap();
        assert_eq!(tree.len(), 1 + 3 + 9);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.leaf_nodes().len(), 9);
        assert!(tree.roles_alternate());
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = TreeGenerator::with_seed(7).random(3, 2).unwrap();
        let b = TreeGenerator::with_seed(7).random(3, 2).unwrap();
        assert_eq!(a.to_spec().unwrap(), b.to_spec().unwrap());
    }
}
