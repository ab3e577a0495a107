//! Energy-aware relay placement for Wireless Body Area Networks.
//!
//! Given body-worn sensors and a hub, the cost model scores a placement of K
//! relays on an unfolded 2D body map by transmission energy, latency, worst
//! link margin and relay load balance. Search algorithms drive it through
//! [`simulation::objective::Objective`].

pub mod common;
pub mod simulation;

pub use common::scene::{Scene, SceneLoadError, load_scene};
pub use simulation::{ModelConfig, NetworkCostModel};
