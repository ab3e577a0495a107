//! Type definitions for the cost model.
//!
//! Contains all data structures shared across the simulation including:
//! - Body coordinates, zones and propagation classes
//! - Sensors and the per-sensor route outcome
//! - The metrics bundle and the tagged evaluation result
//! - The error type for caller contract violations

use serde::{Deserialize, Serialize};

/// Simple 2D point on the unfolded body map, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Propagation environment of a link, selecting the path loss exponent.
///
/// Serialized with the names used by the IEEE 802.15.6 CM3 channel tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropagationClass {
    /// Line of sight along the back.
    #[serde(rename = "LOS")]
    Los,
    /// Non line of sight, limbs.
    #[serde(rename = "NLOS")]
    Nlos,
    /// Through or along the trunk.
    #[serde(rename = "Torso")]
    Torso,
    /// Fallback used for points outside every zone.
    #[serde(rename = "General")]
    General,
}

impl std::fmt::Display for PropagationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropagationClass::Los => write!(f, "LOS"),
            PropagationClass::Nlos => write!(f, "NLOS"),
            PropagationClass::Torso => write!(f, "Torso"),
            PropagationClass::General => write!(f, "General"),
        }
    }
}

/// Named axis-aligned placement rectangle with its propagation class.
///
/// Bounds are inclusive on all four edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    #[serde(rename = "type")]
    pub propagation_class: PropagationClass,
}

impl Zone {
    pub fn new(name: &str, x_min: f64, x_max: f64, y_min: f64, y_max: f64, propagation_class: PropagationClass) -> Self {
        Zone {
            name: name.to_string(),
            x_min,
            x_max,
            y_min,
            y_max,
            propagation_class,
        }
    }
}

/// Fixed body-worn data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub name: String,
    pub position: Point,
    /// Packets generated per cycle.
    pub data_rate: f64,
}

impl Sensor {
    pub fn new(name: &str, position: Point, data_rate: f64) -> Self {
        Sensor {
            name: name.to_string(),
            position,
            data_rate,
        }
    }
}

/// Energy-optimal route chosen for a single sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteCost {
    /// Energy for one packet along the route (J).
    pub energy_j: f64,
    /// End-to-end delay for one packet (s).
    pub delay_s: f64,
    /// Worst per-hop link margin (dB).
    pub margin_db: f64,
    /// Relay used, `None` for a direct transmission to the hub.
    pub relay_index: Option<usize>,
}

/// Kind of a reconstructed path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Direct,
    Relayed { relay_index: usize },
}

/// One hop of a winning route, used for visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub sensor: String,
    pub from: Point,
    pub to: Point,
    pub route_type: RouteType,
}

/// Raw physical quantities of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkMetrics {
    /// Network energy per cycle, Σ route energy × data rate (J).
    pub energy_j: f64,
    /// Sum of per-sensor route delays (s).
    pub delay_s: f64,
    /// Smallest route margin over all sensors (dB).
    pub min_margin_db: f64,
    /// Population standard deviation of per-relay selection counts.
    pub load_std: f64,
}

impl NetworkMetrics {
    /// Marker returned to the analysis layer for constraint-violating placements.
    pub fn invalid() -> Self {
        NetworkMetrics {
            energy_j: f64::NAN,
            delay_s: f64::NAN,
            min_margin_db: 0.0,
            load_std: f64::NAN,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.energy_j.is_finite() && self.delay_s.is_finite()
    }
}

/// Soft constraint broken by a candidate placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintViolation {
    /// Relay lies outside every placement zone.
    OffBody { relay_index: usize, position: Point },
    /// Relay is closer than the minimum separation to another device.
    Collision { relay_index: usize, other: Obstruction, distance_cm: f64 },
}

/// Device a relay collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstruction {
    Relay(usize),
    Sensor(usize),
    Hub,
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintViolation::OffBody { relay_index, position } => {
                write!(f, "relay {} at ({:.1}, {:.1}) is off-body", relay_index, position.x, position.y)
            }
            ConstraintViolation::Collision {
                relay_index,
                other,
                distance_cm,
            } => {
                let other = match other {
                    Obstruction::Relay(i) => format!("relay {}", i),
                    Obstruction::Sensor(i) => format!("sensor {}", i),
                    Obstruction::Hub => "hub".to_string(),
                };
                write!(f, "relay {} is {:.2} cm from {}", relay_index, distance_cm, other)
            }
        }
    }
}

/// Outcome of simulating one candidate: metrics, or the violated constraint.
///
/// Projected to a plain scalar only at the optimizer boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Valid(NetworkMetrics),
    Violation(ConstraintViolation),
}

/// Caller broke the dimensional contract of the solution vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    MalformedSolution { expected: usize, found: usize },
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationError::MalformedSolution { expected, found } => {
                write!(f, "Malformed solution vector: expected {} coordinates, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for EvaluationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_metrics_marker_is_not_valid() {
        let m = NetworkMetrics::invalid();
        assert!(!m.is_valid());
        assert!(m.energy_j.is_nan());
        assert_eq!(m.min_margin_db, 0.0);
    }

    #[test]
    fn propagation_class_uses_channel_table_names() {
        let json = serde_json::to_string(&PropagationClass::Los).unwrap();
        assert_eq!(json, "\"LOS\"");
        let parsed: PropagationClass = serde_json::from_str("\"Torso\"").unwrap();
        assert_eq!(parsed, PropagationClass::Torso);
        assert_eq!(PropagationClass::Nlos.to_string(), "NLOS");
    }

    #[test]
    fn malformed_solution_message_names_both_lengths() {
        let err = EvaluationError::MalformedSolution { expected: 4, found: 3 };
        assert_eq!(err.to_string(), "Malformed solution vector: expected 4 coordinates, found 3");
    }
}
