//! Structural queries over the constraint graph.

use alloc::vec::Vec;

use hashbrown::HashSet;
use tracing::debug;

use crate::environment::{Environment, NodeId};
use crate::vector::Vector;

impl Environment {
    /// Whether a walkable path crosses the view.
    ///
    /// Walking only along collidable constraints (Beds and LandBeams), some
    /// node left of the view's left edge must reach a node at or beyond its
    /// right edge. Beams cannot be walked on.
    pub fn does_bridge_cover(&self, view_width: f64) -> bool {
        let view = self.viewport(view_width, 0.0);
        let (left, right) = (view.left(), view.right());

        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = Vec::new();

        let anchors = self
            .nodes
            .iter()
            .filter(|(_, n)| n.position().x <= left)
            .filter(|(id, _)| self.walkable_neighbors(*id).next().is_some())
            .map(|(id, _)| id);

        for anchor in anchors {
            if !seen.insert(anchor) {
                continue;
            }
            stack.push(anchor);
            while let Some(current) = stack.pop() {
                let Some(node) = self.nodes.get(current) else {
                    continue;
                };
                if node.position().x >= right {
                    debug!(?anchor, reached = ?current, "bridge covers the view");
                    return true;
                }
                for next in self.walkable_neighbors(current) {
                    if seen.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        false
    }

    /// Nodes across a collidable constraint from `id`.
    fn walkable_neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id)
            .map(|n| n.attachments())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |attachment| {
                let constraint = self.constraints.get(attachment.constraint)?;
                constraint
                    .is_collidable()
                    .then(|| constraint.node(attachment.end.other()))
            })
    }

    /// Free nodes carrying at least one Bed.
    pub fn bed_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| !n.is_fixed())
            .filter(|(_, n)| {
                n.attachments().iter().any(|a| {
                    self.constraints
                        .get(a.constraint)
                        .is_some_and(|c| c.kind().is_structural())
                })
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Spread a downward load of `total` newtons evenly over the deck.
    ///
    /// The force applies to the next tick only. Returns the number of nodes loaded.
    pub fn apply_deck_load(&mut self, total: f64) -> usize {
        let deck = self.bed_nodes();
        if deck.is_empty() {
            return 0;
        }
        let share = Vector::new(0.0, -total / deck.len() as f64);
        for id in deck.iter() {
            if let Some(node) = self.nodes.get_mut(*id) {
                node.body.add_force(share);
            }
        }
        deck.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::constraint::ConstraintKind;
    use crate::entity::Node;
    use crate::environment::Environment;
    use crate::vector::Vector;

    fn chain(kinds: &[ConstraintKind]) -> Environment {
        let mut env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
        let step = 20.0 / kinds.len() as f64;
        let mut prev = env.add_node(Node::fixed(Vector::new(0.0, 0.0), 1.0).unwrap());
        for (i, kind) in kinds.iter().enumerate() {
            let next = env.add_node(Node::fixed(Vector::new(step * (i + 1) as f64, 0.0), 1.0).unwrap());
            env.add_constraint(*kind, prev, next, 0.05).unwrap();
            prev = next;
        }
        env
    }

    #[test]
    fn beds_cover() {
        let env = chain(&[ConstraintKind::LandBeam, ConstraintKind::Bed, ConstraintKind::LandBeam]);
        assert!(env.does_bridge_cover(20.0));
    }

    #[test]
    fn beam_link_blocks_walk() {
        let env = chain(&[ConstraintKind::Bed, ConstraintKind::Beam, ConstraintKind::Bed]);
        assert!(!env.does_bridge_cover(20.0));
    }

    #[test]
    fn empty_environment_does_not_cover() {
        let env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
        assert!(!env.does_bridge_cover(20.0));
    }

    #[test]
    fn deck_load_ignores_fixed_and_beam_only_nodes() {
        let mut env = Environment::new(9.8, 1.0, 0.0, 100.0).unwrap();
        let a = env.add_node(Node::fixed(Vector::new(0.0, 0.0), 1.0).unwrap());
        let b = env.add_node(Node::new(Vector::new(1.0, 0.0), 1.0).unwrap());
        let c = env.add_node(Node::new(Vector::new(2.0, 0.0), 1.0).unwrap());
        let d = env.add_node(Node::new(Vector::new(2.0, 1.0), 1.0).unwrap());
        env.add_constraint(ConstraintKind::Bed, a, b, 0.05).unwrap();
        env.add_constraint(ConstraintKind::Bed, b, c, 0.05).unwrap();
        env.add_constraint(ConstraintKind::Beam, c, d, 0.05).unwrap();

        let mut deck = env.bed_nodes();
        deck.sort();
        let mut expected = [b, c];
        expected.sort();
        assert_eq!(deck, expected);

        assert_eq!(env.apply_deck_load(100.0), 2);
        assert_eq!(env.node(b).unwrap().body.force(), Vector::new(0.0, -50.0));
        assert_eq!(env.node(d).unwrap().body.force(), Vector::zero());
    }
}
