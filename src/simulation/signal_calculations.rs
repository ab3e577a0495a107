//! Radio signal and energy calculations.
//!
//! Contains helpers for:
//! - Log-distance path loss per propagation class (IEEE 802.15.6 CM3 exponents)
//! - Transmit power control clamped to the radio's hardware range
//! - Per-packet transmit energy from a linear current model (nRF52840-like)
//! - Link margin and link budget for reachability analysis
//! - Optional log-normal shadowing for Monte Carlo outage estimates
//!
//! Units:
//! - Power: dBm, loss and margin: dB
//! - Distance: centimetres on the body map, meters inside the physical model
//! - Time: seconds, energy: joules, current: milliamperes
//!
//! The fitness path is deterministic: shadowing is only sampled by the
//! analysis helpers at the bottom of this module.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::geometry::distance_cm;
use super::types::{Point, PropagationClass};

/// One value per propagation class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassTable {
    #[serde(rename = "LOS")]
    pub los: f64,
    #[serde(rename = "NLOS")]
    pub nlos: f64,
    #[serde(rename = "Torso")]
    pub torso: f64,
    #[serde(rename = "General")]
    pub general: f64,
}

impl ClassTable {
    pub fn get(&self, class: PropagationClass) -> f64 {
        match class {
            PropagationClass::Los => self.los,
            PropagationClass::Nlos => self.nlos,
            PropagationClass::Torso => self.torso,
            PropagationClass::General => self.general,
        }
    }

    pub fn values(&self) -> [f64; 4] {
        [self.los, self.nlos, self.torso, self.general]
    }
}

/// Physical constants of the radio and channel model.
///
/// Defaults reproduce a Nordic nRF52840-class transceiver at 1 Mbps with the
/// IEEE 802.15.6 CM3 on-body path loss exponents [Chavez et al. 2013].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioParameters {
    /// Supply voltage (V).
    pub voltage: f64,
    /// Air data rate (bit/s).
    pub bit_rate: f64,
    /// Receiver sensitivity (dBm).
    pub rx_sensitivity_dbm: f64,
    /// Fading margin added on top of the sensitivity (dB).
    pub system_margin_db: f64,
    /// Lowest transmit power setting (dBm).
    pub tx_power_min_dbm: f64,
    /// Highest transmit power setting (dBm).
    pub tx_power_max_dbm: f64,
    /// Current draw at `tx_power_min_dbm` (mA).
    pub base_current_ma: f64,
    /// Current increase per dB of transmit power above the minimum (mA/dB).
    pub current_slope_ma_per_db: f64,
    /// Reference distance d₀ of the path loss law (m).
    pub reference_distance_m: f64,
    /// Path loss at d₀ (dB), 2.4 GHz.
    pub path_loss_at_reference_distance: f64,
    /// Smallest physically meaningful antenna separation (m).
    pub min_distance_m: f64,
    /// Loss budget the link margin is measured against (dB).
    pub sensitivity_threshold_db: f64,
    /// Packet length used by the cost model (bits).
    pub packet_size_bits: f64,
    /// Path loss exponent n per propagation class.
    pub path_loss_exponents: ClassTable,
    /// Log-normal shadowing σ per propagation class (dB), analysis only.
    pub shadowing_sigmas: ClassTable,
}

impl Default for RadioParameters {
    fn default() -> Self {
        RadioParameters {
            voltage: 3.0,
            bit_rate: 1_000_000.0,
            rx_sensitivity_dbm: -96.0,
            system_margin_db: 10.0,
            tx_power_min_dbm: -40.0,
            tx_power_max_dbm: 4.0,
            base_current_ma: 3.0,
            current_slope_ma_per_db: 0.1,
            reference_distance_m: 0.1,
            path_loss_at_reference_distance: 35.0,
            min_distance_m: 0.01,
            sensitivity_threshold_db: 96.0,
            packet_size_bits: 1500.0,
            path_loss_exponents: ClassTable {
                los: 2.18,
                nlos: 3.35,
                torso: 3.23,
                general: 3.11,
            },
            shadowing_sigmas: ClassTable {
                los: 5.6,
                nlos: 4.1,
                torso: 6.1,
                general: 5.9,
            },
        }
    }
}

/// Full link budget of a single transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkBudget {
    pub distance_m: f64,
    pub path_loss_db: f64,
    /// Transmit power the link would need (dBm), before clamping.
    pub required_tx_dbm: f64,
    /// Transmit power actually used after clamping to the hardware range (dBm).
    pub tx_power_dbm: f64,
    /// Whether the required power fits under the hardware maximum.
    pub connected: bool,
    pub current_ma: f64,
    pub energy_j: f64,
}

/// Distance between two body points in meters, floored at `min_distance_m`.
pub fn calculate_distance_m(p1: &Point, p2: &Point, params: &RadioParameters) -> f64 {
    (distance_cm(p1, p2) / 100.0).max(params.min_distance_m)
}

/// Calculate the path loss (in dB) at a given distance using the log-distance model.
///
/// # Formula
///
/// ```text
/// PL(d) = PL(d₀) + 10 × n × log₁₀(d/d₀)    for d > d₀
/// PL(d) = PL(d₀)                            otherwise
/// ```
///
/// `n` is taken from `params.path_loss_exponents` for the given class. No
/// shadowing term is sampled, so repeated calls return identical values.
pub fn calculate_path_loss_db(distance_m: f64, class: PropagationClass, params: &RadioParameters) -> f64 {
    let d0 = params.reference_distance_m;
    if distance_m <= d0 {
        return params.path_loss_at_reference_distance;
    }
    let n = params.path_loss_exponents.get(class);
    params.path_loss_at_reference_distance + 10.0 * n * (distance_m / d0).log10()
}

/// Path loss with a log-normal shadowing sample `X_σ ~ Normal(0, σ_class)` added.
///
/// Each call samples a new shadowing value. A σ of 0 disables shadowing.
pub fn calculate_shadowed_path_loss_db<R: Rng + ?Sized>(distance_m: f64, class: PropagationClass, params: &RadioParameters, rng: &mut R) -> f64 {
    let path_loss = calculate_path_loss_db(distance_m, class, params);
    let sigma = params.shadowing_sigmas.get(class);
    // Scene validation keeps σ finite and non-negative, the only inputs
    // `Normal::new` rejects, so the fallback is never taken for a loaded scene.
    let shadowing = if sigma > 0.0 {
        Normal::new(0.0_f64, sigma).map(|normal| normal.sample(rng)).unwrap_or(0.0)
    } else {
        0.0
    };
    path_loss + shadowing
}

/// Headroom between the sensitivity threshold and the path loss, never negative.
pub fn calculate_link_margin_db(path_loss_db: f64, params: &RadioParameters) -> f64 {
    (params.sensitivity_threshold_db - path_loss_db).max(0.0)
}

/// On-air time of one packet (s).
pub fn transmission_time_s(packet_size_bits: f64, params: &RadioParameters) -> f64 {
    packet_size_bits / params.bit_rate
}

/// Required transmit power for a given loss: sensitivity + loss + system margin.
pub fn required_tx_power_dbm(path_loss_db: f64, params: &RadioParameters) -> f64 {
    params.rx_sensitivity_dbm + path_loss_db + params.system_margin_db
}

/// Linear current approximation over the transmit power range.
///
/// ```text
/// I(mA) = I_base + slope × (P_tx − P_min)      e.g. 3.0 + 0.1 × (P + 40)
/// ```
pub fn tx_current_ma(tx_power_dbm: f64, params: &RadioParameters) -> f64 {
    params.base_current_ma + params.current_slope_ma_per_db * (tx_power_dbm - params.tx_power_min_dbm)
}

/// Evaluate the whole link: loss, power control, current and energy.
///
/// Power above the hardware maximum is clamped, not rejected: an unreachable
/// link still reports the (maximum) energy and `connected == false`.
///
/// # Parameters
///
/// * `p1` - Transmitter position (cm)
/// * `p2` - Receiver position (cm)
/// * `class` - Propagation class of the link
/// * `packet_size_bits` - Size of one packet
/// * `params` - Radio constants
///
/// # Returns
///
/// The full [`LinkBudget`]: distance, path loss, required and clamped
/// transmit power, reachability, current draw and energy per packet.
pub fn calculate_link_budget(p1: &Point, p2: &Point, class: PropagationClass, packet_size_bits: f64, params: &RadioParameters) -> LinkBudget {
    let distance_m = calculate_distance_m(p1, p2, params);
    let path_loss_db = calculate_path_loss_db(distance_m, class, params);
    let required_tx_dbm = required_tx_power_dbm(path_loss_db, params);
    let tx_power_dbm = required_tx_dbm.max(params.tx_power_min_dbm).min(params.tx_power_max_dbm);
    let current_ma = tx_current_ma(tx_power_dbm, params);
    let energy_j = params.voltage * (current_ma / 1000.0) * transmission_time_s(packet_size_bits, params);

    LinkBudget {
        distance_m,
        path_loss_db,
        required_tx_dbm,
        tx_power_dbm,
        connected: required_tx_dbm <= params.tx_power_max_dbm,
        current_ma,
        energy_j,
    }
}

/// Transmit energy (J) spent by the sender of one packet from `p1` to `p2`.
pub fn calculate_energy_j(p1: &Point, p2: &Point, class: PropagationClass, packet_size_bits: f64, params: &RadioParameters) -> f64 {
    calculate_link_budget(p1, p2, class, packet_size_bits, params).energy_j
}

/// Monte Carlo estimate of the fraction of shadowed channel realizations in
/// which the link needs more than the maximum transmit power.
pub fn estimate_outage_probability<R: Rng + ?Sized>(
    p1: &Point,
    p2: &Point,
    class: PropagationClass,
    trials: usize,
    params: &RadioParameters,
    rng: &mut R,
) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    let distance_m = calculate_distance_m(p1, p2, params);
    let outages = (0..trials)
        .filter(|_| {
            let path_loss = calculate_shadowed_path_loss_db(distance_m, class, params, rng);
            required_tx_power_dbm(path_loss, params) > params.tx_power_max_dbm
        })
        .count();
    outages as f64 / trials as f64
}
