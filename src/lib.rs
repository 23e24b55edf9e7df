//! Breakable truss physics for bridge-building games.
//!
//! `girder` simulates a 2D network of point masses joined by breakable
//! positional constraints, loaded by gravity and by dropped weights. Each tick
//! alternates collision sweeps with constraint relaxation, then advances every
//! free body with position Verlet integration.
//!
//! # Features
//!
//! - **Verlet integration**: Position-based dynamics with implicit velocity
//! - **Breakable constraints**: Beams, deck Beds and terrain LandBeams that tear when over-stressed
//! - **Sweep-and-prune collisions**: Weights against weights and against walkable constraints
//! - **Connectivity query**: Can the deck be walked across the view?
//! - **Generation-checked handles**: Stale ids are detected, never aliased
//! - **Observable**: Monitor each phase of a tick via the `StepObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments
//!
//! ```
//! use girder::{Environment, ConstraintKind, Node, Vector};
//!
//! let mut env = Environment::new(9.8, 50.0, 0.0, 500.0).unwrap();
//! let anchor = env.add_node(Node::fixed(Vector::new(0.0, 5.0), 10.0).unwrap());
//! let end = env.add_node(Node::new(Vector::new(2.0, 5.0), 10.0).unwrap());
//! env.add_constraint(ConstraintKind::Beam, anchor, end, 0.5).unwrap();
//!
//! env.start();
//! let failed = env.update(1.0 / 60.0, 800.0, 500.0);
//! assert!(!failed);
//! ```

#![no_std]

extern crate alloc;

pub mod vector;
pub mod entity;
pub mod constraint;
mod collision;
pub mod environment;
pub mod connectivity;
pub mod mapping;
pub mod build;
pub mod level;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use vector::Vector;
pub use entity::{Body, Node, Weight, Attachment, Endpoint, ColorTag};
pub use constraint::{Constraint, ConstraintKind};
pub use environment::{Environment, Entity, EntityKind, Handle, NodeId, WeightId, ConstraintId, SimulationState, TickReport};
pub use mapping::{ScreenMapping, Viewport};
pub use build::{BuildKind, BuildTarget, BuildOutcome};
pub use level::{place_truss, Terrain, TrussConfig};
pub use config::EnvironmentConfig;
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::{PhysicsError, PhysicsResult};
