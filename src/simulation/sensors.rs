//! Fixed sensor sets.
//!
//! The reference scenario carries four medical sensors. Larger scenarios used
//! in scalability studies keep those four and add generic sensors at random
//! on-body positions drawn from a seeded generator, so every algorithm sees the
//! same layout for a given (count, seed) pair.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::geometry::{ANKLE_L, BACK, BodyGeometry, CHEST, WRIST_L};
use super::types::Sensor;

/// Data rate of generated filler sensors (packets per cycle).
pub const GENERATED_SENSOR_DATA_RATE: f64 = 100.0;

/// The reference medical sensor set.
pub fn default_sensors() -> Vec<Sensor> {
    vec![
        Sensor::new("ECG_Monitor", CHEST, 500.0),
        Sensor::new("Activity_L", WRIST_L, 100.0),
        Sensor::new("Activity_Leg", ANKLE_L, 100.0),
        Sensor::new("Temp_Sensor", BACK, 10.0),
    ]
}

/// Build a sensor set of `count` sensors.
///
/// The first `min(count, 4)` entries are the reference sensors; the rest are
/// named `S_<n>` (1-based position in the set) and placed with
/// [`BodyGeometry::random_valid_point`].
pub fn generate_sensor_set(geometry: &BodyGeometry, count: usize, seed: u64) -> Vec<Sensor> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sensors: Vec<Sensor> = default_sensors().into_iter().take(count).collect();

    while sensors.len() < count {
        let Some(position) = geometry.random_valid_point(&mut rng) else {
            log::warn!("No placement zones available, sensor set truncated to {} of {}", sensors.len(), count);
            break;
        };
        let name = format!("S_{}", sensors.len() + 1);
        sensors.push(Sensor::new(&name, position, GENERATED_SENSOR_DATA_RATE));
    }
    sensors
}
