//! Point masses: constrained nodes and free-falling weights.

use alloc::vec::Vec;

use crate::config::is_positive;
use crate::environment::{ConstraintId, NodeId, WeightId};
use crate::error::{PhysicsError, PhysicsResult};
use crate::mapping::Viewport;
use crate::vector::Vector;

/// Position-Verlet state shared by every point mass.
///
/// There is no velocity field: velocity is implied by the difference between
/// the current and previous positions, so constraint relaxation can move
/// `position` directly and the integrator picks the change up next step.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vector,
    /// `None` until the first integration step.
    pub previous_position: Option<Vector>,
    mass: f64,
    inv_mass: f64,
    force: Vector,
}

impl Body {
    pub fn new(position: Vector, mass: f64) -> PhysicsResult<Self> {
        if !is_positive(mass) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        Ok(Body {
            position,
            previous_position: None,
            mass,
            inv_mass: 1.0 / mass,
            force: Vector::zero(),
        })
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Force accumulated since the last integration step.
    pub fn force(&self) -> Vector {
        self.force
    }

    pub fn add_force(&mut self, force: Vector) {
        self.force += force;
    }

    pub fn clear_force(&mut self) {
        self.force = Vector::zero();
    }

    /// Advance one step and clear the accumulated force.
    ///
    /// The first step starts from rest: `x' = x + ½·a·dt²`. Later steps use
    /// `x' = 2x − x_prev + a·dt²`.
    pub fn integrate(&mut self, dt: f64) {
        let accel = self.force.scale(self.inv_mass);
        let dt2 = dt * dt;
        let next = match self.previous_position {
            None => self.position + accel.scale(0.5 * dt2),
            Some(previous) => self.position.scale(2.0) - previous + accel.scale(dt2),
        };
        self.previous_position = Some(self.position);
        self.position = next;
        self.force = Vector::zero();
    }

    /// Implied velocity over the last step.
    pub fn velocity(&self, dt: f64) -> Vector {
        match self.previous_position {
            Some(previous) if dt > 0.0 => (self.position - previous).scale(1.0 / dt),
            _ => Vector::zero(),
        }
    }

    /// Teleport and forget the implied velocity.
    pub fn reset_to(&mut self, position: Vector) {
        self.position = position;
        self.previous_position = None;
        self.force = Vector::zero();
    }
}

/// Which end of a constraint a node sits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    A,
    B,
}

impl Endpoint {
    pub const BOTH: [Endpoint; 2] = [Endpoint::A, Endpoint::B];

    pub fn index(self) -> usize {
        match self {
            Endpoint::A => 0,
            Endpoint::B => 1,
        }
    }

    pub fn other(self) -> Endpoint {
        match self {
            Endpoint::A => Endpoint::B,
            Endpoint::B => Endpoint::A,
        }
    }
}

/// Back-reference from a node to a constraint that uses it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub constraint: ConstraintId,
    pub end: Endpoint,
}

/// Display hint carried for the UI layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorTag {
    #[default]
    Plain,
    /// Fixed build anchor.
    Anchor,
}

/// A point mass that constraints attach to.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub body: Body,
    fixed: bool,
    visible: bool,
    color: ColorTag,
    attachments: Vec<Attachment>,
}

impl Node {
    /// A free, visible node.
    pub fn new(position: Vector, mass: f64) -> PhysicsResult<Self> {
        Ok(Node {
            id: NodeId::default(),
            body: Body::new(position, mass)?,
            fixed: false,
            visible: true,
            color: ColorTag::Plain,
            attachments: Vec::new(),
        })
    }

    /// A node pinned in place.
    pub fn fixed(position: Vector, mass: f64) -> PhysicsResult<Self> {
        Ok(Node::new(position, mass)?.with_fixed(true))
    }

    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_color(mut self, color: ColorTag) -> Self {
        self.color = color;
        self
    }

    /// Arena handle. Null until the node is added to an environment.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Vector {
        self.body.position
    }

    pub fn mass(&self) -> f64 {
        self.body.mass()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn color(&self) -> ColorTag {
        self.color
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
        if fixed {
            self.body.reset_to(self.body.position);
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_color(&mut self, color: ColorTag) {
        self.color = color;
    }

    /// Nudge the node during relaxation. Fixed nodes ignore corrections.
    pub(crate) fn displace(&mut self, delta: Vector) {
        if !self.fixed {
            self.body.position += delta;
        }
    }

    pub(crate) fn attach(&mut self, constraint: ConstraintId, end: Endpoint) {
        self.attachments.push(Attachment { constraint, end });
    }

    pub(crate) fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    /// Drop every attachment to `constraint`. Returns true if one was removed.
    pub(crate) fn detach(&mut self, constraint: ConstraintId) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.constraint != constraint);
        self.attachments.len() != before
    }

    /// Fixed nodes never integrate; their force is discarded.
    pub fn integrate(&mut self, dt: f64) {
        if self.fixed {
            self.body.clear_force();
            return;
        }
        self.body.integrate(dt);
    }
}

/// A collidable circular mass dropped into the scene. Never fixed.
#[derive(Clone, Debug)]
pub struct Weight {
    pub(crate) id: WeightId,
    pub body: Body,
    radius: f64,
    softness: f64,
    exited: bool,
}

impl Weight {
    /// A weight with collision softness 0.5.
    pub fn new(position: Vector, mass: f64, radius: f64) -> PhysicsResult<Self> {
        if !is_positive(radius) {
            return Err(PhysicsError::InvalidRadius(radius));
        }
        Ok(Weight {
            id: WeightId::default(),
            body: Body::new(position, mass)?,
            radius,
            softness: 0.5,
            exited: false,
        })
    }

    /// Share of a weight–beam overlap this weight absorbs, in [0, 1].
    pub fn with_softness(mut self, softness: f64) -> PhysicsResult<Self> {
        if !(0.0..=1.0).contains(&softness) {
            return Err(PhysicsError::InvalidSoftness(softness));
        }
        self.softness = softness;
        Ok(self)
    }

    pub fn id(&self) -> WeightId {
        self.id
    }

    pub fn position(&self) -> Vector {
        self.body.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn softness(&self) -> f64 {
        self.softness
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn integrate(&mut self, dt: f64) {
        self.body.integrate(dt);
    }

    /// Flag the weight once its circle is entirely outside `view`.
    pub fn check_exit(&mut self, view: &Viewport) -> bool {
        self.exited = view.excludes_circle(self.body.position, self.radius);
        self.exited
    }
}
