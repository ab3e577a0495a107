//! Relay placement simulation core.
//!
//! This module turns a candidate relay placement into a cost. It integrates:
//! - Body zone geometry and classification
//! - Radio path loss and per-packet energy
//! - Per-sensor energy-optimal routing and network-level aggregation
//!
//! ## Module Organization
//!
//! - `types`: Core data structures (points, zones, sensors, metrics, errors)
//! - `geometry`: Placement zones, landmarks and point classification
//! - `signal_calculations`: Path loss, power control, energy and link budget
//! - `sensors`: Reference and generated sensor sets
//! - `network`: The cost model (decoding, constraints, routing, fitness)
//! - `objective`: Trait boundary used by external search algorithms
//!
//! ## Public API
//!
//! The main entry point is `NetworkCostModel`, built from a `ModelConfig`
//! and queried with flat `[x1, y1, x2, y2, ...]` solution vectors.

pub mod geometry;
pub mod network;
pub mod objective;
pub mod sensors;
pub mod signal_calculations;
pub mod types;

// Re-export the cost model for convenience
pub use network::{CostParameters, ModelConfig, NetworkCostModel};

// Re-export commonly used types
pub use types::{Evaluation, EvaluationError, NetworkMetrics, Point, PropagationClass, Sensor};
