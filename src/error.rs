//! Error types for physics operations.

use thiserror::Error;

use crate::environment::{ConstraintId, EntityKind, Handle, NodeId};

/// Errors that can occur while building or simulating a structure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A vector was divided by exactly zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Mass must be positive and finite.
    #[error("mass must be positive and finite (got {0})")]
    InvalidMass(f64),

    /// Break ratio must be positive and finite.
    #[error("break ratio must be positive and finite (got {0})")]
    InvalidBreakRatio(f64),

    /// Radius must be positive and finite.
    #[error("radius must be positive and finite (got {0})")]
    InvalidRadius(f64),

    /// Collision softness must lie in [0, 1].
    #[error("collision softness must be in [0, 1] (got {0})")]
    InvalidSoftness(f64),

    /// Screen scale must be positive and finite.
    #[error("pixels per meter must be positive and finite (got {0})")]
    InvalidScale(f64),

    /// At least one relaxation pass is required per tick.
    #[error("resolve iterations must be at least 1")]
    InvalidIterations,

    /// A handle of one kind was used where another kind is required.
    #[error("expected a {expected} handle, found {found:?}")]
    InvalidEntityKind { expected: &'static str, found: EntityKind },

    /// The handle refers to an entity that no longer exists.
    #[error("stale handle {0:?}")]
    StaleHandle(Handle),

    /// A constraint references a node that is not in the arena.
    #[error("constraint {constraint:?} references missing node {node:?}")]
    DanglingNode { constraint: ConstraintId, node: NodeId },

    /// Both constraint endpoints are the same node.
    #[error("constraint endpoints must be distinct nodes")]
    DegenerateConstraint,

    /// A built beam is longer than the configured maximum.
    #[error("beam length {length} exceeds the maximum of {max}")]
    BeamTooLong { length: f64, max: f64 },

    /// An index into a layout list is out of bounds.
    #[error("index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// A node's attachment list disagrees with the constraint arena.
    #[error("node {node:?} and constraint {constraint:?} disagree about their attachment")]
    AttachmentMismatch { node: NodeId, constraint: ConstraintId },

    /// An entity's stored handle differs from its arena key.
    #[error("entity stored under {0:?} records a different handle")]
    HandleMismatch(Handle),
}

/// Result type for physics operations.
pub type PhysicsResult<T> = core::result::Result<T, PhysicsError>;
