//! Breakable positional links between two nodes: Beam, Bed, LandBeam.

use slotmap::SlotMap;
use tracing::debug;

use crate::config::is_positive;
use crate::entity::{Endpoint, Node};
use crate::environment::{ConstraintId, EntityKind, NodeId};
use crate::error::{PhysicsError, PhysicsResult};
use crate::vector::Vector;

/// Lengths below this are treated as this when used as a denominator.
pub const MIN_LENGTH: f64 = 1e-9;

/// Constraint variants. They share all of the relaxation math and differ only
/// in how collisions and connectivity treat them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Structural member weights pass through.
    Beam,
    /// Road deck. Weights rest on it and its failure ends a test.
    Bed,
    /// Terrain.
    LandBeam,
}

impl ConstraintKind {
    pub fn is_collidable(self) -> bool {
        !matches!(self, ConstraintKind::Beam)
    }

    /// A break of this kind counts as structural failure.
    pub fn is_structural(self) -> bool {
        matches!(self, ConstraintKind::Bed)
    }

    pub fn entity_kind(self) -> EntityKind {
        match self {
            ConstraintKind::Beam => EntityKind::Beam,
            ConstraintKind::Bed => EntityKind::Bed,
            ConstraintKind::LandBeam => EntityKind::LandBeam,
        }
    }
}

/// A spring-like positional link that relaxes toward its rest length and
/// tears free when stretched or compressed past `break_ratio`.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub(crate) id: ConstraintId,
    kind: ConstraintKind,
    nodes: [NodeId; 2],
    rest_length: f64,
    break_ratio: f64,
    node_vector: Vector,
    current_length: f64,
    length_ratio: f64,
    tripped: bool,
    break_count: u32,
}

impl Constraint {
    pub(crate) fn new(
        kind: ConstraintKind,
        nodes: [NodeId; 2],
        break_ratio: f64,
    ) -> PhysicsResult<Self> {
        if nodes[0] == nodes[1] {
            return Err(PhysicsError::DegenerateConstraint);
        }
        if !is_positive(break_ratio) {
            return Err(PhysicsError::InvalidBreakRatio(break_ratio));
        }
        Ok(Constraint {
            id: ConstraintId::default(),
            kind,
            nodes,
            rest_length: 0.0,
            break_ratio,
            node_vector: Vector::zero(),
            current_length: 0.0,
            length_ratio: 0.0,
            tripped: false,
            break_count: 0,
        })
    }

    pub fn id(&self) -> ConstraintId {
        self.id
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn is_collidable(&self) -> bool {
        self.kind.is_collidable()
    }

    pub fn nodes(&self) -> [NodeId; 2] {
        self.nodes
    }

    pub fn node(&self, end: Endpoint) -> NodeId {
        self.nodes[end.index()]
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    pub fn break_ratio(&self) -> f64 {
        self.break_ratio
    }

    /// Length at the last measurement.
    pub fn current_length(&self) -> f64 {
        self.current_length
    }

    /// `(current - rest) / current` at the last measurement.
    pub fn length_ratio(&self) -> f64 {
        self.length_ratio
    }

    /// `length_ratio / break_ratio` clamped to [-1, 1]. ±1 means about to break.
    pub fn stress_ratio(&self) -> f64 {
        (self.length_ratio / self.break_ratio).clamp(-1.0, 1.0)
    }

    /// How many times this constraint has torn.
    pub fn break_count(&self) -> u32 {
        self.break_count
    }

    fn positions(&self, nodes: &SlotMap<NodeId, Node>) -> PhysicsResult<(Vector, Vector)> {
        let a = self.endpoint(nodes, Endpoint::A)?;
        let b = self.endpoint(nodes, Endpoint::B)?;
        Ok((a.position(), b.position()))
    }

    fn endpoint<'a>(&self, nodes: &'a SlotMap<NodeId, Node>, end: Endpoint) -> PhysicsResult<&'a Node> {
        let id = self.node(end);
        nodes
            .get(id)
            .ok_or(PhysicsError::DanglingNode { constraint: self.id, node: id })
    }

    fn measure(&mut self, a: Vector, b: Vector) {
        self.node_vector = b - a;
        self.current_length = self.node_vector.magnitude();
        let denom = self.current_length.max(MIN_LENGTH);
        self.length_ratio = (self.current_length - self.rest_length) / denom;
    }

    /// Refresh the derived geometry from the endpoint positions.
    pub(crate) fn update_info(&mut self, nodes: &SlotMap<NodeId, Node>) -> PhysicsResult<()> {
        let (a, b) = self.positions(nodes)?;
        self.measure(a, b);
        Ok(())
    }

    /// Take the current endpoint distance as the rest length.
    pub(crate) fn lock_rest_length(&mut self, nodes: &SlotMap<NodeId, Node>) -> PhysicsResult<()> {
        let (a, b) = self.positions(nodes)?;
        self.rest_length = a.distance(b);
        self.measure(a, b);
        Ok(())
    }

    /// One relaxation step: move the endpoints toward the rest length.
    ///
    /// Each free endpoint moves by half the correction. A fixed endpoint
    /// skips its half, so the link closes only halfway per pass.
    pub(crate) fn solve(&mut self, nodes: &mut SlotMap<NodeId, Node>) -> PhysicsResult<()> {
        self.update_info(nodes)?;
        let a_fixed = self.endpoint(nodes, Endpoint::A)?.is_fixed();
        let b_fixed = self.endpoint(nodes, Endpoint::B)?.is_fixed();
        let (a_share, b_share) = match (a_fixed, b_fixed) {
            (false, false) => (0.5, 0.5),
            (true, false) => (0.0, 0.5),
            (false, true) => (0.5, 0.0),
            (true, true) => return Ok(()),
        };

        let correction = self.node_vector.scale(self.length_ratio);
        if let Some(a) = nodes.get_mut(self.nodes[0]) {
            a.displace(correction.scale(a_share));
        }
        if let Some(b) = nodes.get_mut(self.nodes[1]) {
            b.displace(-correction.scale(b_share));
        }
        Ok(())
    }

    /// Measure and, on a new excursion past `break_ratio`, tear the link free.
    ///
    /// Returns true once per excursion; the constraint re-arms when it comes
    /// back within its break ratio.
    pub(crate) fn check_for_break(&mut self, nodes: &mut SlotMap<NodeId, Node>) -> PhysicsResult<bool> {
        self.update_info(nodes)?;
        if libm::fabs(self.length_ratio) <= self.break_ratio {
            self.tripped = false;
            return Ok(false);
        }
        if self.tripped {
            return Ok(false);
        }
        self.tripped = true;
        self.break_count += 1;
        self.sever(nodes)?;
        Ok(true)
    }

    /// Cut this link out of the structure.
    ///
    /// An endpoint that is fixed or still carries another constraint is
    /// swapped for a fresh free node at the same spot; other constraints keep
    /// the original node. An endpoint held only by this link stays attached.
    fn sever(&mut self, nodes: &mut SlotMap<NodeId, Node>) -> PhysicsResult<()> {
        for end in Endpoint::BOTH {
            let old_id = self.node(end);
            let node = nodes
                .get_mut(old_id)
                .ok_or(PhysicsError::DanglingNode { constraint: self.id, node: old_id })?;
            if !(node.is_fixed() || node.attachments().len() >= 2) {
                continue;
            }
            node.detach(self.id);
            let (position, mass) = (node.position(), node.mass());

            let mut replacement = Node::new(position, mass)?;
            replacement.attach(self.id, end);
            let new_id = nodes.insert_with_key(move |key| {
                replacement.id = key;
                replacement
            });
            self.nodes[end.index()] = new_id;
            debug!(constraint = ?self.id, ?end, old = ?old_id, new = ?new_id, "detached endpoint");
        }
        Ok(())
    }
}
