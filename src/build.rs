//! Construction helpers used by editors: one call per user gesture.

use tracing::debug;

use crate::constraint::{ConstraintKind, MIN_LENGTH};
use crate::entity::{ColorTag, Node};
use crate::environment::{ConstraintId, Environment, NodeId};
use crate::error::{PhysicsError, PhysicsResult};
use crate::vector::Vector;

/// What a build gesture places.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildKind {
    Beam,
    Bed,
    /// Terrain segment between fixed nodes.
    LandBeam,
    /// A fixed anchor node.
    Node,
}

impl BuildKind {
    pub fn constraint_kind(self) -> Option<ConstraintKind> {
        match self {
            BuildKind::Beam => Some(ConstraintKind::Beam),
            BuildKind::Bed => Some(ConstraintKind::Bed),
            BuildKind::LandBeam => Some(ConstraintKind::LandBeam),
            BuildKind::Node => None,
        }
    }

    /// Beams and Beds are limited by `max_beam_length`; terrain is not.
    pub fn is_length_limited(self) -> bool {
        matches!(self, BuildKind::Beam | BuildKind::Bed)
    }
}

/// Where a gesture starts or ends: on an existing node or at an empty point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BuildTarget {
    Node(NodeId),
    Point(Vector),
}

impl From<NodeId> for BuildTarget {
    fn from(id: NodeId) -> Self {
        BuildTarget::Node(id)
    }
}

impl From<Vector> for BuildTarget {
    fn from(point: Vector) -> Self {
        BuildTarget::Point(point)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    Link {
        constraint: ConstraintId,
        start: NodeId,
        end: NodeId,
    },
    Anchor(NodeId),
}

impl Environment {
    /// Place one piece of structure.
    ///
    /// Link kinds join `from` to `to`, creating nodes for any points. A Beam
    /// or Bed must be shorter than `max_beam_length`; nothing is added when
    /// it is not. `BuildKind::Node` ignores `to` and turns `from` into a fixed
    /// anchor.
    pub fn build(&mut self, kind: BuildKind, from: BuildTarget, to: BuildTarget) -> PhysicsResult<BuildOutcome> {
        let Some(constraint_kind) = kind.constraint_kind() else {
            return self.place_anchor(from).map(BuildOutcome::Anchor);
        };

        let start_pos = self.target_position(from)?;
        let end_pos = self.target_position(to)?;
        if from == to || start_pos.distance(end_pos) < MIN_LENGTH {
            return Err(PhysicsError::DegenerateConstraint);
        }
        let length = start_pos.distance(end_pos);
        let max = self.config.max_beam_length;
        if kind.is_length_limited() && length >= max {
            return Err(PhysicsError::BeamTooLong { length, max });
        }

        let terrain = kind == BuildKind::LandBeam;
        let start = self.target_node(from, terrain)?;
        let end = self.target_node(to, terrain)?;
        let break_ratio = self.config.break_ratio;
        let constraint = self.add_constraint(constraint_kind, start, end, break_ratio)?;
        debug!(?kind, length, ?constraint, "built");
        Ok(BuildOutcome::Link { constraint, start, end })
    }

    fn target_position(&self, target: BuildTarget) -> PhysicsResult<Vector> {
        match target {
            BuildTarget::Node(id) => self
                .node(id)
                .map(Node::position)
                .ok_or(PhysicsError::StaleHandle(id.into())),
            BuildTarget::Point(point) => Ok(point),
        }
    }

    /// New nodes are visible so the next gesture can start from them.
    fn target_node(&mut self, target: BuildTarget, fixed: bool) -> PhysicsResult<NodeId> {
        match target {
            BuildTarget::Node(id) => Ok(id),
            BuildTarget::Point(point) => {
                let node = Node::new(point, self.config.node_mass)?.with_fixed(fixed);
                Ok(self.add_node(node))
            }
        }
    }

    fn place_anchor(&mut self, target: BuildTarget) -> PhysicsResult<NodeId> {
        let id = match target {
            BuildTarget::Node(id) => {
                self.set_fixed(id, true)?;
                id
            }
            BuildTarget::Point(point) => {
                let node = Node::fixed(point, self.config.node_mass)?;
                self.add_node(node)
            }
        };
        self.set_color(id, ColorTag::Anchor)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Handle;

    fn env() -> Environment {
        Environment::new(9.8, 50.0, 0.0, 500.0).unwrap()
    }

    #[test]
    fn bed_from_anchor_to_point() {
        let mut env = env();
        let anchor = env.add_node(Node::fixed(Vector::zero(), 10.0).unwrap());
        let outcome = env
            .build(BuildKind::Bed, anchor.into(), Vector::new(2.0, 0.0).into())
            .unwrap();
        let BuildOutcome::Link { constraint, start, end } = outcome else {
            panic!("expected a link, got {:?}", outcome);
        };
        assert_eq!(start, anchor);
        let end = env.node(end).unwrap();
        assert!(!end.is_fixed());
        assert!(end.is_visible());
        assert_eq!(env.constraint(constraint).unwrap().rest_length(), 2.0);
        assert_eq!(env.validate(), Ok(()));
    }

    #[test]
    fn long_beam_is_rejected_without_side_effects() {
        let mut env = env();
        let anchor = env.add_node(Node::fixed(Vector::zero(), 10.0).unwrap());
        let err = env
            .build(BuildKind::Beam, anchor.into(), Vector::new(3.0, 0.0).into())
            .unwrap_err();
        assert_eq!(err, PhysicsError::BeamTooLong { length: 3.0, max: 3.0 });
        assert_eq!(env.node_count(), 1);
        assert_eq!(env.constraint_count(), 0);
    }

    #[test]
    fn land_beams_are_not_length_limited() {
        let mut env = env();
        let outcome = env
            .build(BuildKind::LandBeam, Vector::zero().into(), Vector::new(10.0, 0.0).into())
            .unwrap();
        let BuildOutcome::Link { start, end, .. } = outcome else {
            panic!("expected a link");
        };
        let (start, end) = (env.node(start).unwrap(), env.node(end).unwrap());
        assert!(start.is_fixed() && start.is_visible());
        assert!(end.is_fixed() && end.is_visible());
    }

    #[test]
    fn terrain_gestures_chain_through_picked_end_node() {
        let mut env = env();
        let first = env
            .build(BuildKind::LandBeam, Vector::new(1.0, 2.0).into(), Vector::new(5.0, 2.0).into())
            .unwrap();
        let BuildOutcome::Link { end, .. } = first else {
            panic!("expected a link");
        };

        let (sx, sy) = env.world_to_screen(Vector::new(5.0, 2.0));
        let picked = env.entity_at(sx, sy);
        assert_eq!(picked, Some(Handle::Node(end)));

        let from = env.node_id(picked.unwrap()).unwrap();
        let second = env
            .build(BuildKind::LandBeam, from.into(), Vector::new(9.0, 2.0).into())
            .unwrap();
        let BuildOutcome::Link { start, .. } = second else {
            panic!("expected a link");
        };
        assert_eq!(start, end);
        assert_eq!(env.node(end).unwrap().attachments().len(), 2);
        assert_eq!(env.node_count(), 3);
        assert_eq!(env.validate(), Ok(()));
    }

    #[test]
    fn same_node_is_degenerate() {
        let mut env = env();
        let a = env.add_node(Node::new(Vector::zero(), 10.0).unwrap());
        assert_eq!(
            env.build(BuildKind::Beam, a.into(), a.into()),
            Err(PhysicsError::DegenerateConstraint)
        );
    }

    #[test]
    fn node_kind_makes_anchor() {
        let mut env = env();
        let a = env.add_node(Node::new(Vector::new(1.0, 1.0), 10.0).unwrap());
        assert_eq!(
            env.build(BuildKind::Node, a.into(), a.into()),
            Ok(BuildOutcome::Anchor(a))
        );
        let node = env.node(a).unwrap();
        assert!(node.is_fixed());
        assert_eq!(node.color(), ColorTag::Anchor);

        let placed = env
            .build(BuildKind::Node, Vector::new(4.0, 0.0).into(), Vector::zero().into())
            .unwrap();
        let BuildOutcome::Anchor(id) = placed else {
            panic!("expected an anchor");
        };
        assert!(env.node(id).unwrap().is_fixed());
    }
}
