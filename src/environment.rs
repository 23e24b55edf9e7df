//! The simulation arena and its per-tick pipeline.

use alloc::vec::Vec;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, error, info, warn};

use crate::collision;
use crate::config::EnvironmentConfig;
use crate::constraint::{Constraint, ConstraintKind};
use crate::entity::{Attachment, ColorTag, Endpoint, Node, Weight};
use crate::error::{PhysicsError, PhysicsResult};
use crate::mapping::{ScreenMapping, Viewport};
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::vector::Vector;

new_key_type! {
    /// Generation-checked handle to a [`Node`].
    pub struct NodeId;
    /// Generation-checked handle to a [`Weight`].
    pub struct WeightId;
    /// Generation-checked handle to a [`Constraint`].
    pub struct ConstraintId;
}

/// Handle to any entity in an [`Environment`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    Node(NodeId),
    Weight(WeightId),
    Constraint(ConstraintId),
}

impl From<NodeId> for Handle {
    fn from(id: NodeId) -> Self { Handle::Node(id) }
}

impl From<WeightId> for Handle {
    fn from(id: WeightId) -> Self { Handle::Weight(id) }
}

impl From<ConstraintId> for Handle {
    fn from(id: ConstraintId) -> Self { Handle::Constraint(id) }
}

/// What an entity is, for rendering and picking.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Weight,
    Beam,
    Bed,
    LandBeam,
}

/// An entity ready to be added with [`Environment::add`].
#[derive(Clone, Debug)]
pub enum Entity {
    Node(Node),
    Weight(Weight),
    Constraint {
        kind: ConstraintKind,
        nodes: [NodeId; 2],
        break_ratio: f64,
    },
}

/// Lifecycle of an environment. There is no terminal state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimulationState {
    NotStarted,
    Simulating,
    Paused,
}

/// Outcome of one [`Environment::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// A Bed tore this tick.
    pub structural_failure: bool,
    /// Constraints that tore this tick.
    pub broken: Vec<ConstraintId>,
    /// Weights that left the view and were removed.
    pub exited: Vec<WeightId>,
    /// Collision contacts resolved across all passes.
    pub contacts: usize,
}

/// Owns every node, weight and constraint and advances them together.
///
/// Cloning an environment deep-copies the whole structure, which is how a
/// build is snapshotted before testing it.
#[derive(Clone, Debug)]
pub struct Environment {
    pub(crate) config: EnvironmentConfig,
    pub(crate) mapping: ScreenMapping,
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) weights: SlotMap<WeightId, Weight>,
    pub(crate) constraints: SlotMap<ConstraintId, Constraint>,
    state: SimulationState,
}

impl Environment {
    /// An environment with default settings apart from gravity and screen mapping.
    pub fn new(gravity: f64, pixels_per_meter: f64, origin_x: f64, origin_y: f64) -> PhysicsResult<Self> {
        let config = EnvironmentConfig::new()
            .with_gravity(gravity)
            .with_pixels_per_meter(pixels_per_meter)
            .with_origin(origin_x, origin_y);
        Self::with_config(config)
    }

    pub fn with_config(config: EnvironmentConfig) -> PhysicsResult<Self> {
        config.validate()?;
        let mapping = ScreenMapping::new(config.pixels_per_meter, config.origin)?;
        Ok(Environment {
            config,
            mapping,
            nodes: SlotMap::with_key(),
            weights: SlotMap::with_key(),
            constraints: SlotMap::with_key(),
            state: SimulationState::NotStarted,
        })
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    pub fn mapping(&self) -> &ScreenMapping {
        &self.mapping
    }

    pub fn gravity(&self) -> f64 {
        self.config.gravity
    }

    pub fn resolve_iterations(&self) -> usize {
        self.config.resolve_iterations
    }

    pub fn set_resolve_iterations(&mut self, iterations: usize) -> PhysicsResult<()> {
        if iterations == 0 {
            return Err(PhysicsError::InvalidIterations);
        }
        self.config.resolve_iterations = iterations;
        Ok(())
    }

    pub fn screen_to_world(&self, px: f64, py: f64) -> Vector {
        self.mapping.screen_to_world(px, py)
    }

    pub fn world_to_screen(&self, position: Vector) -> (f64, f64) {
        self.mapping.world_to_screen(position)
    }

    /// World-space rectangle seen by a `width` × `height` pixel view.
    pub fn viewport(&self, width: f64, height: f64) -> Viewport {
        self.mapping.viewport(width, height)
    }

    // ---- lifecycle ----

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_simulating(&self) -> bool {
        self.state == SimulationState::Simulating
    }

    pub fn has_started(&self) -> bool {
        self.state != SimulationState::NotStarted
    }

    /// Begin or resume simulating.
    ///
    /// The first call locks every constraint's rest length to its current
    /// geometry, so edits made before testing become the unstressed shape.
    pub fn start(&mut self) {
        if self.state == SimulationState::NotStarted {
            for constraint in self.constraints.values_mut() {
                if let Err(err) = constraint.lock_rest_length(&self.nodes) {
                    invariant_violation(&err);
                }
            }
            info!(constraints = self.constraints.len(), "locked rest lengths");
        }
        if self.state != SimulationState::Simulating {
            info!(nodes = self.nodes.len(), weights = self.weights.len(), "simulation started");
        }
        self.state = SimulationState::Simulating;
    }

    pub fn pause(&mut self) {
        if self.state == SimulationState::Simulating {
            self.state = SimulationState::Paused;
            info!("simulation paused");
        }
    }

    /// Deep copy of the current structure and state.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    // ---- arena ----

    pub fn add(&mut self, entity: Entity) -> PhysicsResult<Handle> {
        match entity {
            Entity::Node(node) => Ok(self.add_node(node).into()),
            Entity::Weight(weight) => Ok(self.add_weight(weight).into()),
            Entity::Constraint { kind, nodes, break_ratio } => {
                self.add_constraint(kind, nodes[0], nodes[1], break_ratio).map(Handle::from)
            }
        }
    }

    /// Add a node. Attachments carried over from a cloned node are dropped.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        self.nodes.insert_with_key(move |key| {
            let mut node = node;
            node.id = key;
            node.clear_attachments();
            node
        })
    }

    pub fn add_weight(&mut self, weight: Weight) -> WeightId {
        self.weights.insert_with_key(move |key| {
            let mut weight = weight;
            weight.id = key;
            weight
        })
    }

    /// Link two live nodes. The rest length is their current distance.
    pub fn add_constraint(
        &mut self,
        kind: ConstraintKind,
        a: NodeId,
        b: NodeId,
        break_ratio: f64,
    ) -> PhysicsResult<ConstraintId> {
        for id in [a, b] {
            if !self.nodes.contains_key(id) {
                return Err(PhysicsError::StaleHandle(id.into()));
            }
        }
        let mut constraint = Constraint::new(kind, [a, b], break_ratio)?;
        constraint.lock_rest_length(&self.nodes)?;
        let id = self.constraints.insert_with_key(move |key| {
            constraint.id = key;
            constraint
        });
        for end in Endpoint::BOTH {
            let node_id = if end == Endpoint::A { a } else { b };
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.attach(id, end);
            }
        }
        Ok(id)
    }

    pub fn delete(&mut self, handle: Handle) -> PhysicsResult<()> {
        match handle {
            Handle::Node(id) => self.delete_node(id),
            Handle::Weight(id) => self.delete_weight(id),
            Handle::Constraint(id) => self.delete_constraint(id),
        }
    }

    /// Delete a node and, first, every constraint attached to it.
    pub fn delete_node(&mut self, id: NodeId) -> PhysicsResult<()> {
        let node = self.nodes.get(id).ok_or(PhysicsError::StaleHandle(id.into()))?;
        let attached: Vec<ConstraintId> = node.attachments().iter().map(|a| a.constraint).collect();
        for constraint in attached.iter() {
            self.delete_constraint(*constraint)?;
        }
        self.nodes.remove(id);
        debug!(node = ?id, cascaded = attached.len(), "deleted node");
        Ok(())
    }

    pub fn delete_weight(&mut self, id: WeightId) -> PhysicsResult<()> {
        self.weights
            .remove(id)
            .map(|_| ())
            .ok_or(PhysicsError::StaleHandle(id.into()))
    }

    /// Delete a constraint and drop it from its nodes' attachment lists.
    pub fn delete_constraint(&mut self, id: ConstraintId) -> PhysicsResult<()> {
        let constraint = self
            .constraints
            .remove(id)
            .ok_or(PhysicsError::StaleHandle(id.into()))?;
        for node_id in constraint.nodes() {
            if let Some(node) = self.nodes.get_mut(node_id) {
                node.detach(id);
            }
        }
        Ok(())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        match handle {
            Handle::Node(id) => self.nodes.contains_key(id),
            Handle::Weight(id) => self.weights.contains_key(id),
            Handle::Constraint(id) => self.constraints.contains_key(id),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn weight(&self, id: WeightId) -> Option<&Weight> {
        self.weights.get(id)
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn weights(&self) -> impl Iterator<Item = (WeightId, &Weight)> {
        self.weights.iter()
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints.iter()
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn weight_count(&self) -> usize { self.weights.len() }
    pub fn constraint_count(&self) -> usize { self.constraints.len() }

    // ---- per-entity accessors ----

    pub fn kind(&self, handle: Handle) -> Option<EntityKind> {
        match handle {
            Handle::Node(id) => self.nodes.get(id).map(|_| EntityKind::Node),
            Handle::Weight(id) => self.weights.get(id).map(|_| EntityKind::Weight),
            Handle::Constraint(id) => self.constraints.get(id).map(|c| c.kind().entity_kind()),
        }
    }

    /// Position of a node or weight; the midpoint of a constraint.
    pub fn position(&self, handle: Handle) -> Option<Vector> {
        match handle {
            Handle::Node(id) => self.nodes.get(id).map(Node::position),
            Handle::Weight(id) => self.weights.get(id).map(Weight::position),
            Handle::Constraint(id) => {
                let [a, b] = self.constraints.get(id)?.nodes();
                let (a, b) = (self.nodes.get(a)?.position(), self.nodes.get(b)?.position());
                Some((a + b).scale(0.5))
            }
        }
    }

    /// Weights and constraints are always drawn; nodes can be hidden.
    pub fn is_visible(&self, handle: Handle) -> Option<bool> {
        match handle {
            Handle::Node(id) => self.nodes.get(id).map(Node::is_visible),
            _ => self.contains(handle).then_some(true),
        }
    }

    pub fn stress_ratio(&self, id: ConstraintId) -> Option<f64> {
        self.constraints.get(id).map(Constraint::stress_ratio)
    }

    /// Narrow a handle to a live node.
    pub fn node_id(&self, handle: Handle) -> PhysicsResult<NodeId> {
        match handle {
            Handle::Node(id) if self.nodes.contains_key(id) => Ok(id),
            Handle::Node(_) => Err(PhysicsError::StaleHandle(handle)),
            other => {
                let found = self.kind(other).ok_or(PhysicsError::StaleHandle(other))?;
                Err(PhysicsError::InvalidEntityKind { expected: "node", found })
            }
        }
    }

    // ---- direct manipulation ----

    /// Add an external force to a node or weight for the next tick.
    pub fn apply_force(&mut self, handle: Handle, force: Vector) -> PhysicsResult<()> {
        let body = match handle {
            Handle::Node(id) => self.nodes.get_mut(id).map(|n| &mut n.body),
            Handle::Weight(id) => self.weights.get_mut(id).map(|w| &mut w.body),
            Handle::Constraint(id) => {
                let found = self.kind(handle).ok_or(PhysicsError::StaleHandle(id.into()))?;
                return Err(PhysicsError::InvalidEntityKind { expected: "node or weight", found });
            }
        };
        body.ok_or(PhysicsError::StaleHandle(handle))?.add_force(force);
        Ok(())
    }

    /// Drag a node to `position`, fixed or not. It restarts at rest.
    pub fn move_node(&mut self, id: NodeId, position: Vector) -> PhysicsResult<()> {
        self.node_mut(id)?.body.reset_to(position);
        Ok(())
    }

    pub fn set_fixed(&mut self, id: NodeId, fixed: bool) -> PhysicsResult<()> {
        self.node_mut(id)?.set_fixed(fixed);
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> PhysicsResult<()> {
        self.node_mut(id)?.set_visible(visible);
        Ok(())
    }

    pub fn set_color(&mut self, id: NodeId, color: ColorTag) -> PhysicsResult<()> {
        self.node_mut(id)?.set_color(color);
        Ok(())
    }

    fn node_mut(&mut self, id: NodeId) -> PhysicsResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(PhysicsError::StaleHandle(id.into()))
    }

    /// Drop a default weight at a screen position.
    pub fn drop_weight(&mut self, screen_x: f64, screen_y: f64) -> PhysicsResult<WeightId> {
        let position = self.screen_to_world(screen_x, screen_y);
        let weight = Weight::new(position, self.config.weight_mass, self.config.weight_radius)?
            .with_softness(self.config.collision_softness)?;
        Ok(self.add_weight(weight))
    }

    // ---- constraints ----

    /// Run a single relaxation step on one constraint.
    pub fn resolve_constraint(&mut self, id: ConstraintId) -> PhysicsResult<()> {
        let constraint = self
            .constraints
            .get_mut(id)
            .ok_or(PhysicsError::StaleHandle(id.into()))?;
        constraint.solve(&mut self.nodes)
    }

    /// Break check for one constraint; performs the detachment when it tears.
    pub fn check_for_break(&mut self, id: ConstraintId) -> PhysicsResult<bool> {
        let constraint = self
            .constraints
            .get_mut(id)
            .ok_or(PhysicsError::StaleHandle(id.into()))?;
        let broke = constraint.check_for_break(&mut self.nodes)?;
        if broke {
            debug!(
                constraint = ?id,
                kind = ?constraint.kind(),
                ratio = constraint.length_ratio(),
                "constraint broke"
            );
        }
        Ok(broke)
    }

    fn resolve_constraints(&mut self) {
        for constraint in self.constraints.values_mut() {
            if let Err(err) = constraint.solve(&mut self.nodes) {
                invariant_violation(&err);
            }
        }
    }

    fn integrate(&mut self, dt: f64, view: &Viewport) {
        let gravity = Vector::new(0.0, -self.config.gravity);
        for node in self.nodes.values_mut() {
            if !node.is_fixed() {
                let weight_force = gravity.scale(node.mass());
                node.body.add_force(weight_force);
            }
            node.integrate(dt);
        }
        for weight in self.weights.values_mut() {
            let weight_force = gravity.scale(weight.body.mass());
            weight.body.add_force(weight_force);
            weight.integrate(dt);
            weight.check_exit(view);
        }
    }

    // ---- tick ----

    /// Advance one tick. Returns true iff a Bed broke.
    pub fn update(&mut self, dt: f64, view_width: f64, view_height: f64) -> bool {
        self.step(dt, view_width, view_height, &mut NoOpStepObserver)
            .structural_failure
    }

    /// Advance one tick, reporting each phase to `observer`.
    ///
    /// Collision sweeps and constraint relaxation alternate for
    /// `resolve_iterations` passes, then every free body is integrated.
    /// Weights that left the view are removed in one batch afterwards, and
    /// finally each constraint is checked for breakage.
    pub fn step<O: StepObserver>(
        &mut self,
        dt: f64,
        view_width: f64,
        view_height: f64,
        observer: &mut O,
    ) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_simulating() {
            return report;
        }
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "ignoring tick with a non-positive time step");
            return report;
        }

        for i in 0..self.config.resolve_iterations {
            report.contacts += collision::sweep(
                &mut self.weights,
                &self.constraints,
                &mut self.nodes,
                self.config.beam_half_width,
            );
            observer.on_collision_pass(i);
            self.resolve_constraints();
            observer.on_constraint_iteration(i);
        }

        let view = self.viewport(view_width, view_height);
        self.integrate(dt, &view);
        observer.on_integrate();

        let exited: Vec<WeightId> = self
            .weights
            .iter()
            .filter(|(_, w)| w.has_exited())
            .map(|(id, _)| id)
            .collect();
        for id in exited.iter() {
            self.weights.remove(*id);
            observer.on_weight_exit(*id);
            debug!(weight = ?id, "weight left the view");
        }
        report.exited = exited;

        for (id, constraint) in self.constraints.iter_mut() {
            match constraint.check_for_break(&mut self.nodes) {
                Ok(false) => {}
                Ok(true) => {
                    let kind = constraint.kind();
                    debug!(constraint = ?id, ?kind, ratio = constraint.length_ratio(), "constraint broke");
                    observer.on_constraint_break(id, kind);
                    report.broken.push(id);
                    report.structural_failure |= kind.is_structural();
                }
                Err(err) => invariant_violation(&err),
            }
        }

        observer.on_step_complete();
        debug!(
            contacts = report.contacts,
            broken = report.broken.len(),
            exited = report.exited.len(),
            failure = report.structural_failure,
            "tick complete"
        );
        report
    }

    // ---- queries ----

    /// Topmost clickable entity under a screen point.
    ///
    /// Visible nodes are drawn above constraints, and later arena slots above
    /// earlier ones. Weights are not clickable.
    pub fn entity_at(&self, screen_x: f64, screen_y: f64) -> Option<Handle> {
        let point = self.screen_to_world(screen_x, screen_y);
        let reach = self.mapping.to_world_length(self.config.pick_radius_px);

        let node = self
            .nodes
            .iter()
            .filter(|(_, n)| n.is_visible() && n.position().distance(point) <= reach)
            .map(|(id, _)| id)
            .last();
        if let Some(id) = node {
            return Some(Handle::Node(id));
        }

        self.constraints
            .iter()
            .filter(|(_, c)| {
                let [a, b] = c.nodes();
                match (self.nodes.get(a), self.nodes.get(b)) {
                    (Some(a), Some(b)) => distance_to_segment(point, a.position(), b.position()) <= reach,
                    _ => false,
                }
            })
            .map(|(id, _)| Handle::Constraint(id))
            .last()
    }

    /// Check the arena's cross-references.
    ///
    /// Every entity records its own handle, every constraint endpoint is
    /// live, and node attachment lists match the constraints exactly.
    pub fn validate(&self) -> PhysicsResult<()> {
        for (key, node) in self.nodes.iter() {
            if node.id != key {
                return Err(PhysicsError::HandleMismatch(key.into()));
            }
            for attachment in node.attachments() {
                let mismatch = PhysicsError::AttachmentMismatch { node: key, constraint: attachment.constraint };
                let constraint = self.constraints.get(attachment.constraint).ok_or(mismatch.clone())?;
                if constraint.node(attachment.end) != key {
                    return Err(mismatch);
                }
            }
        }
        for (key, weight) in self.weights.iter() {
            if weight.id != key {
                return Err(PhysicsError::HandleMismatch(key.into()));
            }
        }
        for (key, constraint) in self.constraints.iter() {
            if constraint.id != key {
                return Err(PhysicsError::HandleMismatch(key.into()));
            }
            for end in Endpoint::BOTH {
                let node_id = constraint.node(end);
                let node = self
                    .nodes
                    .get(node_id)
                    .ok_or(PhysicsError::DanglingNode { constraint: key, node: node_id })?;
                let expected = Attachment { constraint: key, end };
                if node.attachments().iter().filter(|a| **a == expected).count() != 1 {
                    return Err(PhysicsError::AttachmentMismatch { node: node_id, constraint: key });
                }
            }
        }
        Ok(())
    }
}

fn distance_to_segment(point: Vector, a: Vector, b: Vector) -> f64 {
    let segment = b - a;
    let len_sq = segment.magnitude_sq();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(segment) / len_sq).clamp(0.0, 1.0);
    point.distance(a + segment.scale(t))
}

/// A broken cross-reference is a bug, not a simulation outcome.
fn invariant_violation(err: &PhysicsError) {
    error!(%err, "structure invariant violated");
    debug_assert!(false, "structure invariant violated: {}", err);
}
