//! Network cost model: turns a candidate relay placement into a cost.
//!
//! High-level flow of one evaluation:
//! 1) Decode the flat `[x1, y1, x2, y2, ...]` vector into relay positions.
//! 2) Reject off-body relays, then relays closer than the minimum separation
//!    to another relay, a sensor or the hub. Both are soft violations carried
//!    as values and projected to distinct penalty scalars.
//! 3) For every sensor pick the minimum-energy route: direct to the hub, or
//!    sensor → relay → hub through one of the relays.
//! 4) Aggregate energy, delay, worst link margin and relay load balance, and
//!    combine them into one weighted, normalized fitness value.
//!
//! The model owns only read-only configuration, so a single instance can be
//! shared by reference across threads evaluating a whole population.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::geometry::{BodyGeometry, distance_cm};
use super::sensors::default_sensors;
use super::signal_calculations::{RadioParameters, calculate_link_budget, calculate_link_margin_db, transmission_time_s};
use super::types::{
    ConstraintViolation, Evaluation, EvaluationError, NetworkMetrics, Obstruction, Point, PropagationClass, RouteCost, RouteSegment, RouteType, Sensor,
};

/// Relative importance of the four fitness terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub energy: f64,
    pub delay: f64,
    pub quality: f64,
    pub load: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        FitnessWeights {
            energy: 0.6,
            delay: 0.1,
            quality: 0.2,
            load: 0.1,
        }
    }
}

/// Divisors bringing each fitness term close to 1.0 for a typical good placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    pub energy_j: f64,
    pub delay_s: f64,
    pub quality: f64,
    pub load: f64,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization {
            energy_j: 0.01,
            delay_s: 0.01,
            quality: 60.0,
            load: 1.0,
        }
    }
}

/// Routing, constraint and scoring parameters of the cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    /// Minimum distance between a relay and any other device (cm).
    pub min_separation_cm: f64,
    /// Store-and-forward time added by a relay (s).
    pub relay_processing_delay_s: f64,
    /// Fitness returned when a relay is outside every placement zone.
    pub penalty_off_body: f64,
    /// Fitness returned when a relay violates the minimum separation.
    pub penalty_collision: f64,
    /// Margin the quality term is measured from: quality = reference − min margin.
    pub quality_reference_db: f64,
    pub weights: FitnessWeights,
    pub normalization: Normalization,
}

impl Default for CostParameters {
    fn default() -> Self {
        CostParameters {
            min_separation_cm: 10.0,
            relay_processing_delay_s: 0.005,
            penalty_off_body: 1000.0,
            penalty_collision: 800.0,
            quality_reference_db: 100.0,
            weights: FitnessWeights::default(),
            normalization: Normalization::default(),
        }
    }
}

/// Complete immutable configuration of one problem instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub radio: RadioParameters,
    pub cost: CostParameters,
    pub body: BodyGeometry,
}

/// Per-relay placement description for reports.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySummary {
    pub index: usize,
    pub position: Point,
    pub zone: Option<String>,
    pub propagation_class: PropagationClass,
    pub distance_to_hub_cm: f64,
}

/// Multi-objective cost of placing `n_relays` relays around a fixed sensor set.
#[derive(Debug, Clone)]
pub struct NetworkCostModel {
    n_relays: usize,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    sensors: Vec<Sensor>,
    config: ModelConfig,
}

impl NetworkCostModel {
    /// Build a model over the reference sensor set.
    ///
    /// Search bounds repeat the body's bounding box once per relay:
    /// `lb = [x_min, y_min, ...]`, `ub = [x_max, y_max, ...]`.
    pub fn new(n_relays: usize, config: ModelConfig) -> Self {
        let bounds = config.body.search_bounds();
        let lower_bounds = [bounds.x_min, bounds.y_min].repeat(n_relays);
        let upper_bounds = [bounds.x_max, bounds.y_max].repeat(n_relays);
        NetworkCostModel {
            n_relays,
            lower_bounds,
            upper_bounds,
            sensors: default_sensors(),
            config,
        }
    }

    /// Replace the sensor set, e.g. with a generated scalability scenario.
    pub fn with_sensors(mut self, sensors: Vec<Sensor>) -> Self {
        self.sensors = sensors;
        self
    }

    pub fn n_relays(&self) -> usize {
        self.n_relays
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    /// Length of a valid solution vector.
    pub fn dimensions(&self) -> usize {
        2 * self.n_relays
    }

    /// Split the flat solution vector into relay positions.
    ///
    /// # Parameters
    ///
    /// * `vector` - Flat `[x1, y1, x2, y2, ...]` coordinates in centimetres;
    ///   indices 2i and 2i+1 belong to relay i
    ///
    /// # Returns
    ///
    /// One point per relay, or `MalformedSolution` when the length is odd or
    /// differs from [`Self::dimensions`].
    pub fn decode(&self, vector: &[f64]) -> Result<Vec<Point>, EvaluationError> {
        if vector.len() % 2 != 0 || vector.len() != self.dimensions() {
            return Err(EvaluationError::MalformedSolution {
                expected: self.dimensions(),
                found: vector.len(),
            });
        }
        Ok(vector.chunks_exact(2).map(|pair| Point { x: pair[0], y: pair[1] }).collect())
    }

    /// First relay lying outside every placement zone, if any.
    pub fn check_geometric_validity(&self, relays: &[Point]) -> Option<ConstraintViolation> {
        relays
            .iter()
            .enumerate()
            .find(|(_, relay)| !self.config.body.is_valid(relay))
            .map(|(relay_index, relay)| ConstraintViolation::OffBody {
                relay_index,
                position: *relay,
            })
    }

    /// First relay closer than the minimum separation to another relay, a
    /// sensor or the hub, if any.
    pub fn check_separation(&self, relays: &[Point]) -> Option<ConstraintViolation> {
        let min_distance = self.config.cost.min_separation_cm;
        let hub = self.config.body.hub_position();

        for (relay_index, relay) in relays.iter().enumerate() {
            let others = relays
                .iter()
                .enumerate()
                .skip(relay_index + 1)
                .map(|(j, other)| (Obstruction::Relay(j), *other))
                .chain(self.sensors.iter().enumerate().map(|(j, sensor)| (Obstruction::Sensor(j), sensor.position)))
                .chain(std::iter::once((Obstruction::Hub, hub)));

            for (other, position) in others {
                let distance = distance_cm(relay, &position);
                if distance < min_distance {
                    return Some(ConstraintViolation::Collision {
                        relay_index,
                        other,
                        distance_cm: distance,
                    });
                }
            }
        }
        None
    }

    /// Minimum-energy route for one sensor.
    ///
    /// The direct option is the initial best; a relay replaces it only when
    /// strictly cheaper, so ties keep the direct or the leftmost relay route.
    /// Sensor-side hops use the sensor's zone class, the relay → hub hop uses
    /// the relay's zone class.
    ///
    /// # Parameters
    ///
    /// * `sensor` - Source of the traffic
    /// * `relays` - Decoded relay positions, in solution-vector order
    ///
    /// # Returns
    ///
    /// Per-packet energy, end-to-end delay and worst hop margin of the chosen
    /// route, with `relay_index == None` for the direct route.
    pub fn route_cost(&self, sensor: &Sensor, relays: &[Point]) -> RouteCost {
        let radio = &self.config.radio;
        let body = &self.config.body;
        let bits = radio.packet_size_bits;
        let hop_time = transmission_time_s(bits, radio);
        let hub = body.hub_position();
        let sensor_class = body.propagation_class_at(&sensor.position);

        let direct = calculate_link_budget(&sensor.position, &hub, sensor_class, bits, radio);
        let mut best = RouteCost {
            energy_j: direct.energy_j,
            delay_s: hop_time,
            margin_db: calculate_link_margin_db(direct.path_loss_db, radio),
            relay_index: None,
        };

        for (relay_index, relay) in relays.iter().enumerate() {
            let uplink = calculate_link_budget(&sensor.position, relay, sensor_class, bits, radio);
            let downlink = calculate_link_budget(relay, &hub, body.propagation_class_at(relay), bits, radio);
            let energy_j = uplink.energy_j + downlink.energy_j;
            if energy_j < best.energy_j {
                best = RouteCost {
                    energy_j,
                    delay_s: 2.0 * hop_time + self.config.cost.relay_processing_delay_s,
                    margin_db: calculate_link_margin_db(uplink.path_loss_db, radio).min(calculate_link_margin_db(downlink.path_loss_db, radio)),
                    relay_index: Some(relay_index),
                };
            }
        }

        log::trace!("{} routed {:?} at {:.3e} J", sensor.name, best.relay_index, best.energy_j);
        best
    }

    /// Simulate a candidate and return either its metrics or the violated constraint.
    ///
    /// The off-body check runs before the separation check, so a placement
    /// breaking both is reported as off-body.
    ///
    /// # Parameters
    ///
    /// * `vector` - Flat relay coordinates, see [`Self::decode`]
    ///
    /// # Returns
    ///
    /// `Evaluation::Valid` with the aggregated metrics, `Evaluation::Violation`
    /// with the first violated constraint, or an error for a malformed vector.
    pub fn evaluate(&self, vector: &[f64]) -> Result<Evaluation, EvaluationError> {
        let relays = self.decode(vector)?;

        if let Some(violation) = self.check_geometric_validity(&relays).or_else(|| self.check_separation(&relays)) {
            log::debug!("Constraint violation: {}", violation);
            return Ok(Evaluation::Violation(violation));
        }

        Ok(Evaluation::Valid(self.aggregate(&relays)))
    }

    /// Scalar objective for a black-box optimizer; lower is better.
    ///
    /// Constraint violations map to their penalty sentinels, a malformed
    /// vector is an error.
    pub fn fitness(&self, vector: &[f64]) -> Result<f64, EvaluationError> {
        Ok(self.scalarize(&self.evaluate(vector)?))
    }

    /// Project an evaluation to the scalar the optimizer sees.
    pub fn scalarize(&self, evaluation: &Evaluation) -> f64 {
        match evaluation {
            Evaluation::Valid(metrics) => self.weighted_cost(metrics),
            Evaluation::Violation(violation) => self.penalty(violation),
        }
    }

    pub fn penalty(&self, violation: &ConstraintViolation) -> f64 {
        match violation {
            ConstraintViolation::OffBody { .. } => self.config.cost.penalty_off_body,
            ConstraintViolation::Collision { .. } => self.config.cost.penalty_collision,
        }
    }

    /// Whether a fitness value returned by [`Self::fitness`] is a penalty sentinel.
    pub fn is_penalized(&self, fitness: f64) -> bool {
        let cost = &self.config.cost;
        fitness >= cost.penalty_off_body.min(cost.penalty_collision)
    }

    /// Raw physical metrics for reporting; the invalid marker on violations.
    pub fn metrics(&self, vector: &[f64]) -> Result<NetworkMetrics, EvaluationError> {
        Ok(match self.evaluate(vector)? {
            Evaluation::Valid(metrics) => metrics,
            Evaluation::Violation(_) => NetworkMetrics::invalid(),
        })
    }

    /// Winning path segments per sensor, for visualization.
    ///
    /// Routes are reconstructed even for constraint-violating placements so a
    /// rejected candidate can still be drawn.
    pub fn routing_details(&self, vector: &[f64]) -> Result<Vec<RouteSegment>, EvaluationError> {
        let relays = self.decode(vector)?;
        let hub = self.config.body.hub_position();
        let mut segments = Vec::with_capacity(self.sensors.len() * 2);

        for sensor in &self.sensors {
            match self.route_cost(sensor, &relays).relay_index {
                None => segments.push(RouteSegment {
                    sensor: sensor.name.clone(),
                    from: sensor.position,
                    to: hub,
                    route_type: RouteType::Direct,
                }),
                Some(relay_index) => {
                    let route_type = RouteType::Relayed { relay_index };
                    let relay = relays[relay_index];
                    segments.push(RouteSegment {
                        sensor: sensor.name.clone(),
                        from: sensor.position,
                        to: relay,
                        route_type,
                    });
                    segments.push(RouteSegment {
                        sensor: sensor.name.clone(),
                        from: relay,
                        to: hub,
                        route_type,
                    });
                }
            }
        }
        Ok(segments)
    }

    /// Zone, class and hub distance of every decoded relay.
    pub fn summarize_relays(&self, vector: &[f64]) -> Result<Vec<RelaySummary>, EvaluationError> {
        let body = &self.config.body;
        let hub = body.hub_position();
        Ok(self
            .decode(vector)?
            .into_iter()
            .enumerate()
            .map(|(index, position)| {
                let classified = body.classify(&position);
                RelaySummary {
                    index,
                    position,
                    zone: classified.map(|(name, _)| name.to_string()),
                    propagation_class: classified.map(|(_, class)| class).unwrap_or(PropagationClass::General),
                    distance_to_hub_cm: distance_cm(&position, &hub),
                }
            })
            .collect())
    }

    /// Fitness of a whole population, evaluated in parallel.
    ///
    /// Results keep the population order; the first malformed vector fails the batch.
    pub fn evaluate_batch(&self, population: &[Vec<f64>]) -> Result<Vec<f64>, EvaluationError> {
        population.par_iter().map(|vector| self.fitness(vector)).collect()
    }

    fn aggregate(&self, relays: &[Point]) -> NetworkMetrics {
        let mut loads = vec![0usize; relays.len()];
        let mut energy_j = 0.0;
        let mut delay_s = 0.0;
        let mut min_margin_db = f64::INFINITY;

        for sensor in &self.sensors {
            let route = self.route_cost(sensor, relays);
            energy_j += route.energy_j * sensor.data_rate;
            delay_s += route.delay_s;
            min_margin_db = min_margin_db.min(route.margin_db);
            if let Some(index) = route.relay_index {
                loads[index] += 1;
            }
        }

        // No sensor constrains the margin
        if self.sensors.is_empty() {
            min_margin_db = self.config.radio.sensitivity_threshold_db;
        }

        NetworkMetrics {
            energy_j,
            delay_s,
            min_margin_db,
            load_std: relay_load_std(&loads),
        }
    }

    fn weighted_cost(&self, metrics: &NetworkMetrics) -> f64 {
        let cost = &self.config.cost;
        let w = &cost.weights;
        let n = &cost.normalization;
        let quality = cost.quality_reference_db - metrics.min_margin_db;

        w.energy * metrics.energy_j / n.energy_j + w.delay * metrics.delay_s / n.delay_s + w.quality * quality / n.quality + w.load * metrics.load_std / n.load
    }
}

/// Population standard deviation of per-relay selection counts, 0 when no
/// sensor uses any relay.
pub fn relay_load_std(loads: &[usize]) -> f64 {
    let total: usize = loads.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let count = loads.len() as f64;
    let mean = total as f64 / count;
    let variance = loads.iter().map(|&l| (l as f64 - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::geometry::{ANKLE_L, BACK, CHEST, NAVEL, WRIST_L};

    fn model(n_relays: usize) -> NetworkCostModel {
        NetworkCostModel::new(n_relays, ModelConfig::default())
    }

    /// Radio without idle current: energy scales only with transmit power above
    /// the minimum, which makes short two-hop routes competitive.
    fn zero_base_current_model(n_relays: usize) -> NetworkCostModel {
        let mut config = ModelConfig::default();
        config.radio.base_current_ma = 0.0;
        NetworkCostModel::new(n_relays, config)
    }

    #[test]
    fn bounds_follow_body_envelope() {
        let m = model(2);
        assert_eq!(m.dimensions(), 4);
        assert_eq!(m.lower_bounds(), &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.upper_bounds(), &[100.0, 180.0, 100.0, 180.0]);
    }

    #[test]
    fn decode_preserves_positions() {
        let relays = model(2).decode(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(relays, vec![Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }]);
    }

    #[test]
    fn decode_rejects_wrong_lengths() {
        let m = model(2);
        assert_eq!(m.decode(&[1.0, 2.0, 3.0]), Err(EvaluationError::MalformedSolution { expected: 4, found: 3 }));
        assert_eq!(m.decode(&[1.0; 6]), Err(EvaluationError::MalformedSolution { expected: 4, found: 6 }));
        assert!(m.fitness(&[]).is_err());
        assert!(m.metrics(&[1.0]).is_err());
    }

    #[test]
    fn off_body_relay_yields_off_body_penalty() {
        let m = model(1);
        assert_eq!(m.fitness(&[150.0, 150.0]).unwrap(), 1000.0);
        match m.evaluate(&[150.0, 150.0]).unwrap() {
            Evaluation::Violation(ConstraintViolation::OffBody { relay_index, .. }) => assert_eq!(relay_index, 0),
            other => panic!("expected off-body violation, got {:?}", other),
        }
    }

    #[test]
    fn off_body_check_precedes_separation() {
        assert_eq!(model(2).fitness(&[150.0, 150.0, 150.0, 150.0]).unwrap(), 1000.0);
    }

    #[test]
    fn coincident_relays_yield_collision_penalty() {
        let m = model(2);
        let fitness = m.fitness(&[45.0, 45.0, 45.0, 45.0]).unwrap();
        assert_eq!(fitness, 800.0);
        assert_ne!(fitness, m.config().cost.penalty_off_body);
        assert!(m.is_penalized(fitness));
    }

    #[test]
    fn relay_next_to_hub_collides() {
        // (40, 50) is 4 cm from the navel hub
        match model(1).evaluate(&[40.0, 50.0]).unwrap() {
            Evaluation::Violation(ConstraintViolation::Collision { other, distance_cm, .. }) => {
                assert_eq!(other, Obstruction::Hub);
                assert!((distance_cm - 4.0).abs() < 1e-12);
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn relay_next_to_sensor_collides() {
        let m = model(1);
        let violation = m.check_separation(&[Point { x: CHEST.x + 3.0, y: CHEST.y }]);
        assert!(matches!(violation, Some(ConstraintViolation::Collision { other: Obstruction::Sensor(0), .. })));
    }

    #[test]
    fn valid_placement_scores_below_penalties() {
        let m = model(1);
        let fitness = m.fitness(&[45.0, 45.0]).unwrap();
        assert!(fitness.is_finite());
        assert!(fitness > 0.0);
        assert!(fitness < m.config().cost.penalty_collision);
        assert!(!m.is_penalized(fitness));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let m = model(2);
        let vector = [45.0, 45.0, 20.0, 100.0];
        let first = m.fitness(&vector).unwrap();
        for _ in 0..10 {
            assert_eq!(m.fitness(&vector).unwrap(), first);
        }
    }

    #[test]
    fn batch_matches_sequential_evaluation() {
        let m = model(2);
        let population: Vec<Vec<f64>> = (0..64).map(|i| vec![30.0 + (i % 10) as f64, 25.0 + i as f64 * 0.5, 70.0, 50.0 + (i % 7) as f64]).collect();
        let sequential: Vec<f64> = population.iter().map(|v| m.fitness(v).unwrap()).collect();
        assert_eq!(m.evaluate_batch(&population).unwrap(), sequential);
        assert!(m.evaluate_batch(&[vec![1.0]]).is_err());
    }

    #[test]
    fn reference_radio_sends_everything_direct() {
        let m = model(1);
        let metrics = m.metrics(&[45.0, 45.0]).unwrap();
        assert!(metrics.is_valid());
        assert!((metrics.delay_s - 4.0 * 0.0015).abs() < 1e-12);
        assert_eq!(metrics.load_std, 0.0);
        assert!(m.routing_details(&[45.0, 45.0]).unwrap().iter().all(|s| s.route_type == RouteType::Direct));
    }

    #[test]
    fn metrics_marks_violations_invalid() {
        let metrics = model(1).metrics(&[150.0, 150.0]).unwrap();
        assert!(metrics.energy_j.is_nan());
        assert!(metrics.delay_s.is_nan());
        assert_eq!(metrics.min_margin_db, 0.0);
    }

    #[test]
    fn route_prefers_strictly_cheaper_relay() {
        let m = zero_base_current_model(1);
        let relays = [Point { x: 26.0, y: 59.0 }];
        let ankle = &m.sensors()[2];
        let route = m.route_cost(ankle, &relays);
        assert_eq!(route.relay_index, Some(0));
        assert!((route.delay_s - (2.0 * 0.0015 + 0.005)).abs() < 1e-12);

        let direct = m.route_cost(ankle, &[]);
        assert_eq!(direct.relay_index, None);
        assert!(route.energy_j < direct.energy_j);
        assert!(route.margin_db > 0.0);
    }

    #[test]
    fn energy_ties_keep_direct_route() {
        // Both options sit at minimum power, so relaying costs exactly the same.
        let m = zero_base_current_model(1);
        let route = m.route_cost(&Sensor::new("chest", CHEST, 1.0), &[Point { x: 45.0, y: 45.0 }]);
        assert_eq!(route.energy_j, 0.0);
        assert_eq!(route.relay_index, None);
    }

    #[test]
    fn routing_details_reconstruct_two_hop_paths() {
        let m = zero_base_current_model(1);
        let vector = [26.0, 59.0];
        let relay = Point { x: 26.0, y: 59.0 };
        let segments = m.routing_details(&vector).unwrap();

        assert_eq!(segments.len(), 6);
        assert_eq!(segments[0].route_type, RouteType::Direct);
        assert_eq!((segments[0].from, segments[0].to), (CHEST, NAVEL));
        assert_eq!((segments[1].from, segments[1].to), (WRIST_L, relay));
        assert_eq!((segments[2].from, segments[2].to), (relay, NAVEL));
        assert_eq!((segments[3].from, segments[3].to), (ANKLE_L, relay));
        assert_eq!(segments[4].route_type, RouteType::Relayed { relay_index: 0 });
        assert_eq!((segments[5].from, segments[5].to), (BACK, NAVEL));

        let metrics = m.metrics(&vector).unwrap();
        assert!((metrics.delay_s - (2.0 * 0.0015 + 2.0 * 0.008)).abs() < 1e-12);
        assert_eq!(metrics.load_std, 0.0);
    }

    #[test]
    fn fitness_is_weighted_sum_of_normalized_metrics() {
        let m = model(2);
        let vector = [45.0, 45.0, 70.0, 50.0];
        let metrics = m.metrics(&vector).unwrap();
        let expected = 0.6 * metrics.energy_j / 0.01 + 0.1 * metrics.delay_s / 0.01 + 0.2 * (100.0 - metrics.min_margin_db) / 60.0 + 0.1 * metrics.load_std / 1.0;
        assert!((m.fitness(&vector).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn weights_and_divisors_shift_fitness() {
        let vector = [45.0, 45.0];
        let metrics = model(1).metrics(&vector).unwrap();
        let reference = model(1).fitness(&vector).unwrap();

        let mut config = ModelConfig::default();
        config.cost.weights = FitnessWeights {
            energy: 1.0,
            delay: 0.0,
            quality: 0.0,
            load: 0.0,
        };
        let energy_only = NetworkCostModel::new(1, config).fitness(&vector).unwrap();
        assert!((energy_only - metrics.energy_j / 0.01).abs() < 1e-12);

        let mut config = ModelConfig::default();
        config.cost.normalization.energy_j = 0.02;
        let halved_energy = NetworkCostModel::new(1, config).fitness(&vector).unwrap();
        let energy_term = 0.6 * metrics.energy_j / 0.01;
        assert!((halved_energy - (reference - energy_term / 2.0)).abs() < 1e-12);

        let mut config = ModelConfig::default();
        config.cost.quality_reference_db = 110.0;
        let stricter = NetworkCostModel::new(1, config).fitness(&vector).unwrap();
        assert!((stricter - (reference + 0.2 * 10.0 / 60.0)).abs() < 1e-12);
    }

    #[test]
    fn energy_ties_between_relays_keep_lowest_index() {
        // Mirror-image relays give bit-identical two-hop energies.
        let m = zero_base_current_model(2);
        let sensor = Sensor::new("sternum", Point { x: 40.0, y: 20.0 }, 1.0);
        let left = Point { x: 35.0, y: 37.0 };
        let right = Point { x: 45.0, y: 37.0 };

        assert!(m.route_cost(&sensor, &[]).energy_j > 0.0);
        assert_eq!(m.route_cost(&sensor, &[left, right]).relay_index, Some(0));
        assert_eq!(m.route_cost(&sensor, &[right, left]).relay_index, Some(0));
    }

    #[test]
    fn relays_exactly_at_minimum_separation_are_allowed() {
        let m = model(2);
        let vector = [65.0, 50.0, 75.0, 50.0];
        assert_eq!(m.check_separation(&m.decode(&vector).unwrap()), None);
        let fitness = m.fitness(&vector).unwrap();
        assert!(!m.is_penalized(fitness));
    }

    #[test]
    fn relays_just_inside_minimum_separation_collide() {
        let m = model(2);
        let vector = [65.0, 50.0, 74.99, 50.0];
        match m.evaluate(&vector).unwrap() {
            Evaluation::Violation(ConstraintViolation::Collision { relay_index, other, distance_cm }) => {
                assert_eq!(relay_index, 0);
                assert_eq!(other, Obstruction::Relay(1));
                assert!(distance_cm > 9.98 && distance_cm < 10.0);
            }
            other => panic!("expected relay collision, got {:?}", other),
        }
        assert_eq!(m.fitness(&vector).unwrap(), 800.0);
    }

    #[test]
    fn load_std_is_population_deviation() {
        assert_eq!(relay_load_std(&[]), 0.0);
        assert_eq!(relay_load_std(&[0, 0]), 0.0);
        assert_eq!(relay_load_std(&[1, 1]), 0.0);
        assert_eq!(relay_load_std(&[2, 0]), 1.0);
        assert!((relay_load_std(&[3, 1, 2]) - (2.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn penalties_are_configurable() {
        let mut config = ModelConfig::default();
        config.cost.penalty_off_body = 5000.0;
        config.cost.penalty_collision = 4000.0;
        let m = NetworkCostModel::new(2, config);
        assert_eq!(m.fitness(&[150.0, 0.0, 45.0, 45.0]).unwrap(), 5000.0);
        assert_eq!(m.fitness(&[45.0, 45.0, 45.0, 45.0]).unwrap(), 4000.0);
    }

    #[test]
    fn custom_sensor_sets_replace_reference_set() {
        let m = model(1).with_sensors(vec![Sensor::new("only", ANKLE_L, 1.0)]);
        assert_eq!(m.sensors().len(), 1);
        let energy_one = m.metrics(&[70.0, 45.0]).unwrap().energy_j;

        let doubled = model(1).with_sensors(vec![Sensor::new("only", ANKLE_L, 2.0)]);
        let energy_two = doubled.metrics(&[70.0, 45.0]).unwrap().energy_j;
        assert!((energy_two - 2.0 * energy_one).abs() < 1e-15);
    }

    #[test]
    fn empty_sensor_set_has_full_margin() {
        let m = model(1).with_sensors(Vec::new());
        let metrics = m.metrics(&[45.0, 45.0]).unwrap();
        assert_eq!(metrics.energy_j, 0.0);
        assert_eq!(metrics.min_margin_db, 96.0);
    }

    #[test]
    fn relay_summary_reports_zone_and_hub_distance() {
        let summary = model(2).summarize_relays(&[70.0, 40.0, 95.0, 5.0]).unwrap();
        assert_eq!(summary[0].zone.as_deref(), Some("BACK_ZONE"));
        assert_eq!(summary[0].propagation_class, PropagationClass::Los);
        assert!((summary[0].distance_to_hub_cm - (900.0_f64 + 196.0).sqrt()).abs() < 1e-12);
        assert_eq!(summary[1].zone, None);
        assert_eq!(summary[1].propagation_class, PropagationClass::General);
    }
}
