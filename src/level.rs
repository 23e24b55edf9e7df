//! Ready-made structures: a Warren truss bridge and level terrain.

use alloc::vec::Vec;

use tracing::info;

use crate::config::is_positive;
use crate::constraint::ConstraintKind;
use crate::entity::Node;
use crate::environment::{ConstraintId, Environment, NodeId};
use crate::error::{PhysicsError, PhysicsResult};
use crate::vector::Vector;

/// Shape of a Warren truss.
///
/// ```
/// use girder::level::TrussConfig;
/// use girder::Vector;
///
/// let config = TrussConfig::new(Vector::new(10.0, 4.0)).with_panels(6);
/// assert_eq!(config.panels, 6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrussConfig {
    /// Midpoint of the deck.
    pub center: Vector,
    /// Deck segments. At least one.
    pub panels: usize,
    pub panel_width: f64,
    pub height: f64,
}

impl TrussConfig {
    /// Four 2 m panels, 2 m tall.
    pub fn new(center: Vector) -> Self {
        TrussConfig {
            center,
            panels: 4,
            panel_width: 2.0,
            height: 2.0,
        }
    }

    pub fn with_panels(mut self, panels: usize) -> Self {
        self.panels = panels;
        self
    }

    pub fn with_panel_size(mut self, width: f64, height: f64) -> Self {
        self.panel_width = width;
        self.height = height;
        self
    }
}

impl Default for TrussConfig {
    fn default() -> Self {
        Self::new(Vector::zero())
    }
}

/// Handles of a placed truss.
#[derive(Clone, Debug, Default)]
pub struct Truss {
    /// Deck nodes left to right. The two ends are fixed.
    pub deck: Vec<NodeId>,
    /// Top chord nodes left to right.
    pub top: Vec<NodeId>,
    pub beds: Vec<ConstraintId>,
    /// Diagonals first, then the top chord.
    pub beams: Vec<ConstraintId>,
}

/// Build a Warren truss: a deck of Beds between two fixed nodes, braced
/// by diagonal Beams up to a top chord of Beams.
pub fn place_truss(env: &mut Environment, config: &TrussConfig) -> PhysicsResult<Truss> {
    if config.panels == 0 {
        return Err(PhysicsError::IndexOutOfBounds { index: 0, count: 0 });
    }
    for size in [config.panel_width, config.height] {
        if !is_positive(size) {
            return Err(PhysicsError::InvalidScale(size));
        }
    }

    let mass = env.config().node_mass;
    let ratio = env.config().break_ratio;
    let panels = config.panels;
    let left = config.center.x - config.panel_width * panels as f64 / 2.0;
    let (deck_y, top_y) = (config.center.y, config.center.y + config.height);

    let mut truss = Truss::default();
    for i in 0..=panels {
        let x = left + config.panel_width * i as f64;
        let node = Node::new(Vector::new(x, deck_y), mass)?.with_fixed(i == 0 || i == panels);
        truss.deck.push(env.add_node(node));
    }
    for i in 0..panels {
        let x = left + config.panel_width * (i as f64 + 0.5);
        truss.top.push(env.add_node(Node::new(Vector::new(x, top_y), mass)?));
    }

    for pair in truss.deck.windows(2) {
        truss.beds.push(env.add_constraint(ConstraintKind::Bed, pair[0], pair[1], ratio)?);
    }
    for (i, top) in truss.top.iter().enumerate() {
        truss.beams.push(env.add_constraint(ConstraintKind::Beam, truss.deck[i], *top, ratio)?);
        truss.beams.push(env.add_constraint(ConstraintKind::Beam, *top, truss.deck[i + 1], ratio)?);
    }
    for pair in truss.top.windows(2) {
        truss.beams.push(env.add_constraint(ConstraintKind::Beam, pair[0], pair[1], ratio)?);
    }

    info!(panels, nodes = truss.deck.len() + truss.top.len(), "placed truss");
    Ok(truss)
}

/// Level ground: points joined by LandBeams, some marked as build anchors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Terrain {
    pub points: Vec<Vector>,
    /// Index pairs into `points`.
    pub segments: Vec<(usize, usize)>,
    /// Indices of points shown to the player as build anchors.
    pub start_nodes: Vec<usize>,
}

/// Handles of placed terrain, in the order of [`Terrain::points`] and [`Terrain::segments`].
#[derive(Clone, Debug, Default)]
pub struct PlacedTerrain {
    pub nodes: Vec<NodeId>,
    pub land_beams: Vec<ConstraintId>,
}

impl Terrain {
    fn check_index(&self, index: usize) -> PhysicsResult<()> {
        let count = self.points.len();
        if index >= count {
            return Err(PhysicsError::IndexOutOfBounds { index, count });
        }
        Ok(())
    }

    /// Add the terrain to `env`. Every node is fixed and hidden except the
    /// start nodes, which are visible.
    ///
    /// All indices are checked before anything is added.
    pub fn place(&self, env: &mut Environment) -> PhysicsResult<PlacedTerrain> {
        for (a, b) in self.segments.iter() {
            self.check_index(*a)?;
            self.check_index(*b)?;
            if a == b {
                return Err(PhysicsError::DegenerateConstraint);
            }
        }
        for index in self.start_nodes.iter() {
            self.check_index(*index)?;
        }

        let mass = env.config().node_mass;
        let ratio = env.config().break_ratio;
        let mut placed = PlacedTerrain::default();
        for (i, point) in self.points.iter().enumerate() {
            let node = Node::fixed(*point, mass)?.with_visible(self.start_nodes.contains(&i));
            placed.nodes.push(env.add_node(node));
        }
        for (a, b) in self.segments.iter() {
            let beam = env.add_constraint(ConstraintKind::LandBeam, placed.nodes[*a], placed.nodes[*b], ratio)?;
            placed.land_beams.push(beam);
        }

        info!(nodes = placed.nodes.len(), land_beams = placed.land_beams.len(), "placed terrain");
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_panel_truss_matches_classic_layout() {
        let mut env = Environment::new(9.8, 50.0, 0.0, 500.0).unwrap();
        let truss = place_truss(&mut env, &TrussConfig::new(Vector::new(10.0, 3.0))).unwrap();
        assert_eq!(truss.deck.len(), 5);
        assert_eq!(truss.top.len(), 4);
        assert_eq!(truss.beds.len(), 4);
        assert_eq!(truss.beams.len(), 11);

        let x: Vec<f64> = truss.deck.iter().map(|id| env.node(*id).unwrap().position().x).collect();
        assert_eq!(x, [6.0, 8.0, 10.0, 12.0, 14.0]);
        assert_eq!(env.node(truss.top[0]).unwrap().position(), Vector::new(7.0, 5.0));
        assert!(env.node(truss.deck[0]).unwrap().is_fixed());
        assert!(env.node(truss.deck[4]).unwrap().is_fixed());
        assert!(!env.node(truss.deck[2]).unwrap().is_fixed());
        assert_eq!(env.validate(), Ok(()));
    }

    #[test]
    fn terrain_rejects_bad_index_before_placing() {
        let mut env = Environment::new(9.8, 50.0, 0.0, 500.0).unwrap();
        let terrain = Terrain {
            points: alloc::vec![Vector::zero(), Vector::new(5.0, 0.0)],
            segments: alloc::vec![(0, 1)],
            start_nodes: alloc::vec![2],
        };
        assert_eq!(
            terrain.place(&mut env).err(),
            Some(PhysicsError::IndexOutOfBounds { index: 2, count: 2 })
        );
        assert_eq!(env.node_count(), 0);
    }
}
