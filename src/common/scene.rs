//! Scene loading, parsing, and validation logic.
//!
//! A scene bundles one problem instance: the number of relays, overrides for
//! the radio and cost parameters, the body zone table and the sensor set.
//! Every section is optional; anything a file omits keeps its reference value.
//! Scenes are read from JSON or TOML, chosen by file extension.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::simulation::geometry::BodyGeometry;
use crate::simulation::network::{CostParameters, ModelConfig, NetworkCostModel};
use crate::simulation::sensors::{default_sensors, generate_sensor_set};
use crate::simulation::signal_calculations::RadioParameters;
use crate::simulation::types::Sensor;

/// Error type for scene loading failures.
#[derive(Debug)]
pub enum SceneLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            SceneLoadError::ParseError(msg) => write!(f, "Failed to parse scene: {}", msg),
            SceneLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Request for a synthesized sensor set (reference sensors plus random fillers).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeneratedSensors {
    pub count: usize,
    pub seed: u64,
}

/// Root structure representing one problem instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Number of relays to place.
    pub n_relays: usize,
    /// Radio and channel constants.
    pub radio: RadioParameters,
    /// Constraint, penalty and scoring parameters.
    pub cost: CostParameters,
    /// Zone table, hub landmark and search envelope.
    pub body: BodyGeometry,
    /// Explicit sensor set; the reference set is used when absent.
    pub sensors: Option<Vec<Sensor>>,
    /// Synthesized sensor set, mutually exclusive with `sensors`.
    pub generated_sensors: Option<GeneratedSensors>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            n_relays: 2,
            radio: RadioParameters::default(),
            cost: CostParameters::default(),
            body: BodyGeometry::default(),
            sensors: None,
            generated_sensors: None,
        }
    }
}

impl Scene {
    /// Parse and validate a JSON scene.
    pub fn from_json_str(data: &str) -> Result<Scene, SceneLoadError> {
        let scene: Scene = serde_json::from_str(data)
            .context("Invalid JSON format")
            .map_err(|e| SceneLoadError::ParseError(format!("{:#}", e)))?;
        scene.validated()
    }

    /// Parse and validate a TOML scene.
    pub fn from_toml_str(data: &str) -> Result<Scene, SceneLoadError> {
        let scene: Scene = toml::from_str(data)
            .context("Invalid TOML format")
            .map_err(|e| SceneLoadError::ParseError(format!("{:#}", e)))?;
        scene.validated()
    }

    fn validated(self) -> Result<Scene, SceneLoadError> {
        validate_scene(&self).map_err(SceneLoadError::ValidationError)?;
        for (a, b) in self.body.overlapping_zones() {
            log::warn!("Zones {} and {} overlap; {} takes precedence", a, b, a);
        }
        Ok(self)
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            radio: self.radio.clone(),
            cost: self.cost.clone(),
            body: self.body.clone(),
        }
    }

    /// Sensor set of this scene: explicit, generated, or the reference set.
    pub fn sensor_set(&self) -> Vec<Sensor> {
        match (&self.sensors, self.generated_sensors) {
            (Some(sensors), _) => sensors.clone(),
            (None, Some(generated)) => generate_sensor_set(&self.body, generated.count, generated.seed),
            (None, None) => default_sensors(),
        }
    }

    pub fn build_model(&self) -> NetworkCostModel {
        NetworkCostModel::new(self.n_relays, self.model_config()).with_sensors(self.sensor_set())
    }
}

/// Load and parse a scene from a file.
///
/// # Parameters
///
/// * `path` - Path to the scene file; `.toml` files are parsed as TOML,
///   anything else as JSON
///
/// # Returns
///
/// Parsed and validated Scene or an error.
pub fn load_scene(path: &str) -> Result<Scene, SceneLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))
        .map_err(|e| SceneLoadError::FileReadError(e.to_string()))?;

    let is_toml = Path::new(path).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml { Scene::from_toml_str(&data) } else { Scene::from_json_str(&data) }
}

/// Validate scene configuration.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description otherwise.
pub fn validate_scene(scene: &Scene) -> Result<(), String> {
    const MAX_RELAYS: usize = 64;
    const MAX_SENSORS: usize = 10000;

    if scene.n_relays > MAX_RELAYS {
        return Err(format!("n_relays {} exceeds maximum of {}", scene.n_relays, MAX_RELAYS));
    }

    // Radio parameters
    let radio = &scene.radio;
    let radio_scalars = [
        radio.voltage,
        radio.bit_rate,
        radio.packet_size_bits,
        radio.rx_sensitivity_dbm,
        radio.system_margin_db,
        radio.tx_power_min_dbm,
        radio.tx_power_max_dbm,
        radio.base_current_ma,
        radio.current_slope_ma_per_db,
        radio.reference_distance_m,
        radio.path_loss_at_reference_distance,
        radio.min_distance_m,
        radio.sensitivity_threshold_db,
    ];
    if radio_scalars.iter().any(|v| !v.is_finite()) {
        return Err("Radio parameters must be finite".to_string());
    }
    if radio.voltage <= 0.0 || radio.bit_rate <= 0.0 || radio.packet_size_bits <= 0.0 {
        return Err("voltage, bit_rate and packet_size_bits must be positive".to_string());
    }
    if radio.tx_power_min_dbm >= radio.tx_power_max_dbm {
        return Err(format!(
            "Invalid transmit power range: min {} dBm must be below max {} dBm",
            radio.tx_power_min_dbm, radio.tx_power_max_dbm
        ));
    }
    if radio.reference_distance_m <= 0.0 || radio.min_distance_m <= 0.0 {
        return Err("reference_distance_m and min_distance_m must be positive".to_string());
    }
    if radio.base_current_ma < 0.0 || radio.current_slope_ma_per_db < 0.0 {
        return Err("Current model coefficients must be non-negative".to_string());
    }
    if radio.path_loss_exponents.values().iter().any(|n| !(*n > 0.0) || !n.is_finite()) {
        return Err("Invalid path_loss_exponents, must be positive".to_string());
    }
    if radio.shadowing_sigmas.values().iter().any(|s| !(*s >= 0.0) || !s.is_finite()) {
        return Err("Invalid shadowing_sigmas, must be non-negative".to_string());
    }

    // Cost parameters
    let cost = &scene.cost;
    if [cost.min_separation_cm, cost.relay_processing_delay_s, cost.quality_reference_db, cost.penalty_off_body, cost.penalty_collision]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err("Cost parameters must be finite".to_string());
    }
    if cost.min_separation_cm < 0.0 || cost.relay_processing_delay_s < 0.0 {
        return Err("min_separation_cm and relay_processing_delay_s must be non-negative".to_string());
    }
    if !(cost.penalty_off_body > 0.0) || !(cost.penalty_collision > 0.0) {
        return Err("Penalties must be positive".to_string());
    }
    if cost.penalty_off_body == cost.penalty_collision {
        return Err(format!("Off-body and collision penalties must differ, both are {}", cost.penalty_off_body));
    }
    let w = &cost.weights;
    if [w.energy, w.delay, w.quality, w.load].iter().any(|v| !(*v >= 0.0) || !v.is_finite()) {
        return Err("Fitness weights must be non-negative".to_string());
    }
    let n = &cost.normalization;
    if [n.energy_j, n.delay_s, n.quality, n.load].iter().any(|v| !(*v > 0.0) || !v.is_finite()) {
        return Err("Normalization divisors must be positive".to_string());
    }

    // Body geometry
    if scene.body.zones.is_empty() {
        return Err("Body must define at least one placement zone".to_string());
    }
    for zone in &scene.body.zones {
        if [zone.x_min, zone.x_max, zone.y_min, zone.y_max].iter().any(|v| !v.is_finite()) {
            return Err(format!("Zone {} has non-finite bounds", zone.name));
        }
        if !(zone.x_min <= zone.x_max) || !(zone.y_min <= zone.y_max) {
            return Err(format!(
                "Zone {} has invalid geometry: x [{}, {}], y [{}, {}]",
                zone.name, zone.x_min, zone.x_max, zone.y_min, zone.y_max
            ));
        }
    }
    let bounds = scene.body.search_bounds;
    if [bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max].iter().any(|v| !v.is_finite()) {
        return Err("Search bounds must be finite".to_string());
    }
    if !(bounds.x_min < bounds.x_max) || !(bounds.y_min < bounds.y_max) {
        return Err("Search bounds must have positive width and height".to_string());
    }
    if !scene.body.hub.x.is_finite() || !scene.body.hub.y.is_finite() {
        return Err("Hub position must be finite".to_string());
    }

    // Sensors
    if scene.sensors.is_some() && scene.generated_sensors.is_some() {
        return Err("Specify either 'sensors' or 'generated_sensors', not both".to_string());
    }
    if let Some(generated) = scene.generated_sensors {
        if generated.count > MAX_SENSORS {
            return Err(format!("Generated sensor count {} exceeds maximum of {}", generated.count, MAX_SENSORS));
        }
    }
    if let Some(sensors) = &scene.sensors {
        if sensors.len() > MAX_SENSORS {
            return Err(format!("Sensor count {} exceeds maximum of {}", sensors.len(), MAX_SENSORS));
        }
        for sensor in sensors {
            if !sensor.position.x.is_finite() || !sensor.position.y.is_finite() {
                return Err(format!("Sensor {} has a non-finite position", sensor.name));
            }
            if !(sensor.data_rate >= 0.0) || !sensor.data_rate.is_finite() {
                return Err(format!("Sensor {} data_rate {} must be non-negative", sensor.name, sensor.data_rate));
            }
        }
    }

    Ok(())
}
