use crate::anchor::LatLng;
use crate::geodesy::haversine_distance;

pub const DEFAULT_THRESHOLD_METERS: f64 = 1000.0;

/// True iff the great-circle distance is at most `threshold_meters`.
pub fn is_visible(anchor: &LatLng, camera: &LatLng, threshold_meters: f64) -> bool {
    haversine_distance(anchor, camera) <= threshold_meters
}

/// Visibility gate for anchors; `None` threshold lets everything through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityFilter {
    threshold_meters: Option<f64>,
}

impl ProximityFilter {
    pub fn new(threshold_meters: f64) -> ProximityFilter {
        ProximityFilter {
            threshold_meters: Some(threshold_meters),
        }
    }

    pub fn disabled() -> ProximityFilter {
        ProximityFilter {
            threshold_meters: None,
        }
    }

    pub fn from_option(threshold_meters: Option<f64>) -> ProximityFilter {
        ProximityFilter { threshold_meters }
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold_meters
    }

    pub fn admits(&self, anchor: &LatLng, camera: &LatLng) -> bool {
        match self.threshold_meters {
            Some(threshold) => is_visible(anchor, camera, threshold),
            None => true,
        }
    }
}

impl Default for ProximityFilter {
    fn default() -> Self {
        ProximityFilter::new(DEFAULT_THRESHOLD_METERS)
    }
}
