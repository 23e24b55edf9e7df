//! Sweep-and-prune collision between weights and collidable constraints.
//!
//! Every weight and collidable constraint contributes a left and a right
//! x-extent event. Events are swept in x order; when an object's left edge is
//! reached it is resolved against everything still open, so only pairs that
//! overlap along x are ever tested.

use alloc::vec::Vec;

use slotmap::SlotMap;
use tracing::trace;

use crate::constraint::{Constraint, MIN_LENGTH};
use crate::entity::{Node, Weight};
use crate::environment::{ConstraintId, NodeId, WeightId};
use crate::vector::Vector;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Collider {
    Weight(WeightId),
    Constraint(ConstraintId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Edge {
    pub x: f64,
    pub collider: Collider,
    pub side: Side,
}

/// Sorted x-extent events for every weight and collidable constraint.
pub(crate) fn build_edges(
    weights: &SlotMap<WeightId, Weight>,
    constraints: &SlotMap<ConstraintId, Constraint>,
    nodes: &SlotMap<NodeId, Node>,
) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(2 * (weights.len() + constraints.len()));

    for (id, weight) in weights.iter() {
        let x = weight.position().x;
        let collider = Collider::Weight(id);
        edges.push(Edge { x: x - weight.radius(), collider, side: Side::Left });
        edges.push(Edge { x: x + weight.radius(), collider, side: Side::Right });
    }

    for (id, constraint) in constraints.iter().filter(|(_, c)| c.is_collidable()) {
        let [a, b] = constraint.nodes();
        let (Some(a), Some(b)) = (nodes.get(a), nodes.get(b)) else {
            continue;
        };
        let (x0, x1) = (a.position().x, b.position().x);
        let collider = Collider::Constraint(id);
        edges.push(Edge { x: x0.min(x1), collider, side: Side::Left });
        edges.push(Edge { x: x0.max(x1), collider, side: Side::Right });
    }

    edges.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.side.cmp(&b.side)));
    edges
}

/// One full sweep pass. Returns the number of contacts resolved.
pub(crate) fn sweep(
    weights: &mut SlotMap<WeightId, Weight>,
    constraints: &SlotMap<ConstraintId, Constraint>,
    nodes: &mut SlotMap<NodeId, Node>,
    half_width: f64,
) -> usize {
    let edges = build_edges(weights, constraints, nodes);
    let mut active: Vec<Collider> = Vec::new();
    let mut contacts = 0;

    for edge in edges.iter() {
        match edge.side {
            Side::Left => {
                for other in active.iter() {
                    let hit = match (edge.collider, *other) {
                        (Collider::Weight(a), Collider::Weight(b)) => resolve_weights(weights, a, b),
                        (Collider::Weight(w), Collider::Constraint(c))
                        | (Collider::Constraint(c), Collider::Weight(w)) => {
                            resolve_weight_constraint(weights, w, constraints, c, nodes, half_width)
                        }
                        (Collider::Constraint(_), Collider::Constraint(_)) => false,
                    };
                    if hit {
                        contacts += 1;
                    }
                }
                active.push(edge.collider);
            }
            Side::Right => {
                if let Some(i) = active.iter().position(|c| *c == edge.collider) {
                    active.remove(i);
                }
            }
        }
    }
    contacts
}

/// Push two overlapping weights apart, half the overlap each.
pub(crate) fn resolve_weights(weights: &mut SlotMap<WeightId, Weight>, a: WeightId, b: WeightId) -> bool {
    let (Some(wa), Some(wb)) = (weights.get(a), weights.get(b)) else {
        return false;
    };
    let delta = wb.position() - wa.position();
    let dist = delta.magnitude();
    let reach = wa.radius() + wb.radius();
    if dist >= reach {
        return false;
    }

    let dir = if dist < MIN_LENGTH { Vector::new(1.0, 0.0) } else { delta.scale(1.0 / dist) };
    let push = dir.scale(0.5 * (reach - dist));
    if let Some(wa) = weights.get_mut(a) {
        wa.body.position -= push;
    }
    if let Some(wb) = weights.get_mut(b) {
        wb.body.position += push;
    }
    trace!(?a, ?b, overlap = reach - dist, "weight contact");
    true
}

/// Push a weight off a collidable constraint it overlaps.
///
/// Only applies while the weight's center projects onto the segment between
/// the endpoints. The weight takes `softness` of the overlap and the free
/// endpoints split the rest; with both endpoints fixed the weight takes all of it.
pub(crate) fn resolve_weight_constraint(
    weights: &mut SlotMap<WeightId, Weight>,
    weight: WeightId,
    constraints: &SlotMap<ConstraintId, Constraint>,
    constraint: ConstraintId,
    nodes: &mut SlotMap<NodeId, Node>,
    half_width: f64,
) -> bool {
    let (Some(w), Some(c)) = (weights.get(weight), constraints.get(constraint)) else {
        return false;
    };
    let [ia, ib] = c.nodes();
    let (Some(na), Some(nb)) = (nodes.get(ia), nodes.get(ib)) else {
        return false;
    };
    let (a, b) = (na.position(), nb.position());
    let free = [(ia, !na.is_fixed()), (ib, !nb.is_fixed())];
    let (center, radius, softness) = (w.position(), w.radius(), w.softness());

    let segment = b - a;
    if segment.cos_angle(center - a) <= 0.0 || (-segment).cos_angle(center - b) <= 0.0 {
        return false;
    }

    let offset = (center - a) - (center - a).proj_onto(segment);
    let dist = offset.magnitude();
    let reach = radius + half_width;
    if dist >= reach {
        return false;
    }

    let normal = if dist < MIN_LENGTH {
        let up = segment.perp().normalize();
        if up.y < 0.0 { -up } else { up }
    } else {
        offset.scale(1.0 / dist)
    };
    let overlap = reach - dist;
    let free_count = free.iter().filter(|(_, is_free)| *is_free).count();
    let weight_share = if free_count == 0 { 1.0 } else { softness };

    if let Some(w) = weights.get_mut(weight) {
        w.body.position += normal.scale(overlap * weight_share);
    }
    if free_count > 0 {
        let each = (1.0 - softness) * overlap / free_count as f64;
        for (id, is_free) in free {
            if let Some(node) = nodes.get_mut(id).filter(|_| is_free) {
                node.displace(-normal.scale(each));
            }
        }
    }
    trace!(?weight, ?constraint, overlap, "weight-beam contact");
    true
}
