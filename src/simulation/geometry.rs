//! Body geometry: placement zones on the unfolded body map.
//!
//! Contains helper functions for:
//! - Point-in-zone tests (inclusive axis-aligned rectangles)
//! - Zone classification in declaration order
//! - Uniform sampling of valid on-body positions
//! - Distance calculations in world units (centimetres)
//!
//! The map is a 2D unfolding of the body: x spans front (x < 50) and back
//! (x > 50), y grows from the shoulders towards the feet.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::types::{Point, PropagationClass, Zone};

/// Chest landmark, front torso.
pub const CHEST: Point = Point::new(36.0, 35.0);
/// Navel landmark, default hub position.
pub const NAVEL: Point = Point::new(40.0, 54.0);
/// Left wrist, drawn away from the torso on the map.
pub const WRIST_L: Point = Point::new(15.0, 54.0);
/// Left ankle.
pub const ANKLE_L: Point = Point::new(21.0, 109.0);
/// Back, mirrored +34 cm in x from the chest.
pub const BACK: Point = Point::new(70.0, 35.0);

/// Rectangle the optimizer samples relay coordinates from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for SearchBounds {
    fn default() -> Self {
        SearchBounds {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 180.0,
        }
    }
}

/// Immutable zone table plus the hub landmark.
///
/// Zones are scanned linearly in declaration order; the first match wins,
/// so the order of `zones` defines tie-breaks for overlapping rectangles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyGeometry {
    pub zones: Vec<Zone>,
    pub hub: Point,
    pub search_bounds: SearchBounds,
}

impl Default for BodyGeometry {
    fn default() -> Self {
        BodyGeometry {
            zones: vec![
                Zone::new("TORSO_FRONT", 25.0, 50.0, 20.0, 60.0, PropagationClass::Torso),
                Zone::new("BACK_ZONE", 60.0, 85.0, 20.0, 60.0, PropagationClass::Los),
                Zone::new("ARM_LEFT", 5.0, 20.0, 40.0, 70.0, PropagationClass::Nlos),
                Zone::new("LEG_LEFT", 10.0, 30.0, 80.0, 120.0, PropagationClass::Nlos),
            ],
            hub: NAVEL,
            search_bounds: SearchBounds::default(),
        }
    }
}

impl BodyGeometry {
    /// Name and propagation class of the first zone containing `point`.
    ///
    /// Returns `None` when the point lies outside every zone (e.g. in the air
    /// next to the body, or a non-finite coordinate).
    pub fn classify(&self, point: &Point) -> Option<(&str, PropagationClass)> {
        self.zones
            .iter()
            .find(|zone| point_in_zone(point, zone))
            .map(|zone| (zone.name.as_str(), zone.propagation_class))
    }

    pub fn is_valid(&self, point: &Point) -> bool {
        self.classify(point).is_some()
    }

    /// Propagation class for links originating at `point`, `General` when off-body.
    pub fn propagation_class_at(&self, point: &Point) -> PropagationClass {
        self.classify(point).map(|(_, class)| class).unwrap_or(PropagationClass::General)
    }

    /// Pick a zone uniformly, then a point uniformly inside it.
    ///
    /// Used to synthesize sensor sets; the optimizer samples the full search
    /// bounds instead. `None` only if the zone table is empty.
    pub fn random_valid_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let zone = self.zones.choose(rng)?;
        let x = rng.gen_range(zone.x_min..=zone.x_max);
        let y = rng.gen_range(zone.y_min..=zone.y_max);
        Some(Point { x, y })
    }

    pub fn hub_position(&self) -> Point {
        self.hub
    }

    pub fn search_bounds(&self) -> SearchBounds {
        self.search_bounds
    }

    /// Names of zone pairs whose rectangles intersect.
    ///
    /// Non-overlap is an assumed property of the table, not enforced; this is
    /// only used to warn at load time.
    pub fn overlapping_zones(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.zones.iter().enumerate() {
            for b in &self.zones[i + 1..] {
                if rectangles_overlap(a, b) {
                    pairs.push((a.name.clone(), b.name.clone()));
                }
            }
        }
        pairs
    }
}

/// Euclidean distance in world units (centimetres).
///
/// # Parameters
///
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
///
/// `sqrt(dx² + dy²)`; NaN when either point has a NaN coordinate.
pub fn distance_cm(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Inclusive point-in-zone test.
pub fn point_in_zone(p: &Point, zone: &Zone) -> bool {
    p.x >= zone.x_min && p.x <= zone.x_max && p.y >= zone.y_min && p.y <= zone.y_max
}

/// Inclusive rectangle intersection; shared edges count as overlap.
pub fn rectangles_overlap(a: &Zone, b: &Zone) -> bool {
    a.x_min <= b.x_max && b.x_min <= a.x_max && a.y_min <= b.y_max && b.y_min <= a.y_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn p(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn classify_landmarks_into_expected_zones() {
        let body = BodyGeometry::default();
        assert_eq!(body.classify(&CHEST), Some(("TORSO_FRONT", PropagationClass::Torso)));
        assert_eq!(body.classify(&BACK), Some(("BACK_ZONE", PropagationClass::Los)));
        assert_eq!(body.classify(&WRIST_L), Some(("ARM_LEFT", PropagationClass::Nlos)));
        assert_eq!(body.classify(&ANKLE_L), Some(("LEG_LEFT", PropagationClass::Nlos)));
        assert_eq!(body.classify(&body.hub_position()), Some(("TORSO_FRONT", PropagationClass::Torso)));
    }

    #[test]
    fn zone_bounds_are_inclusive() {
        let body = BodyGeometry::default();
        assert!(body.is_valid(&p(25.0, 20.0)));
        assert!(body.is_valid(&p(50.0, 60.0)));
        assert!(!body.is_valid(&p(50.01, 60.0)));
        assert!(!body.is_valid(&p(55.0, 40.0)));
    }

    #[test]
    fn off_body_points_classify_as_none() {
        let body = BodyGeometry::default();
        assert_eq!(body.classify(&p(150.0, 150.0)), None);
        assert_eq!(body.classify(&p(f64::NAN, 30.0)), None);
        assert_eq!(body.propagation_class_at(&p(150.0, 150.0)), PropagationClass::General);
    }

    #[test]
    fn first_declared_zone_wins_on_overlap() {
        let body = BodyGeometry {
            zones: vec![
                Zone::new("A", 0.0, 10.0, 0.0, 10.0, PropagationClass::Los),
                Zone::new("B", 5.0, 15.0, 5.0, 15.0, PropagationClass::Nlos),
            ],
            ..BodyGeometry::default()
        };
        assert_eq!(body.classify(&p(7.0, 7.0)), Some(("A", PropagationClass::Los)));
        assert_eq!(body.classify(&p(12.0, 12.0)), Some(("B", PropagationClass::Nlos)));
        assert_eq!(body.overlapping_zones(), vec![("A".to_string(), "B".to_string())]);
    }

    #[test]
    fn default_table_has_no_overlaps() {
        assert!(BodyGeometry::default().overlapping_zones().is_empty());
    }

    #[test]
    fn random_points_are_always_valid() {
        let body = BodyGeometry::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let point = body.random_valid_point(&mut rng).unwrap();
            assert!(body.is_valid(&point));
        }
    }

    #[test]
    fn random_point_requires_a_zone() {
        let body = BodyGeometry {
            zones: Vec::new(),
            ..BodyGeometry::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(body.random_valid_point(&mut rng).is_none());
    }

    #[test]
    fn distance_is_euclidean_in_centimetres() {
        assert!((distance_cm(&p(0.0, 0.0), &p(30.0, 40.0)) - 50.0).abs() < 1e-12);
        assert_eq!(distance_cm(&p(3.0, 3.0), &p(3.0, 3.0)), 0.0);
    }
}
