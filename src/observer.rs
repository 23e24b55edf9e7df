//! Step observer trait for monitoring a simulation tick.

use crate::constraint::ConstraintKind;
use crate::environment::{ConstraintId, WeightId};

/// Hooks into each phase of [`Environment::step`](crate::Environment::step).
///
/// Implement this trait to monitor solver progress (e.g., for debugging,
/// visualization, or scoring). All methods have default no-op implementations.
pub trait StepObserver {
    /// Called after each collision sweep pass.
    fn on_collision_pass(&mut self, _iteration: usize) {}

    /// Called after each constraint relaxation pass.
    fn on_constraint_iteration(&mut self, _iteration: usize) {}

    /// Called after all nodes and weights have been integrated (Verlet step).
    fn on_integrate(&mut self) {}

    /// Called when a weight has left the view and was removed.
    fn on_weight_exit(&mut self, _weight: WeightId) {}

    /// Called when a constraint tears.
    fn on_constraint_break(&mut self, _constraint: ConstraintId, _kind: ConstraintKind) {}

    /// Called when a tick is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
