use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::error::{AnchorError, Result};

/// Unit quaternion stored component-wise, in the East-Up-South frame at the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation {
        qx: 0.0,
        qy: 0.0,
        qz: 0.0,
        qw: 1.0,
    };

    pub fn to_quat(&self) -> Quat {
        Quat::from_xyzw(self.qx, self.qy, self.qz, self.qw).normalize()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Quat> for Orientation {
    fn from(q: Quat) -> Self {
        Orientation {
            qx: q.x,
            qy: q.y,
            qz: q.z,
            qw: q.w,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> LatLng {
        LatLng {
            latitude,
            longitude,
        }
    }
}

/// A geospatial anchor as placed by the user and as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Assigned by the store on insert, `None` until persisted.
    #[serde(default)]
    pub id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(default)]
    pub orientation: Orientation,
    /// Degrees, used as the spin of the drawn model about its up axis.
    #[serde(default)]
    pub heading_angle: f32,
}

impl Anchor {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Anchor {
        Anchor {
            id: None,
            latitude,
            longitude,
            altitude,
            orientation: Orientation::IDENTITY,
            heading_angle: 0.0,
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Anchor {
        self.orientation = orientation;
        self
    }

    pub fn with_heading(mut self, heading_angle: f32) -> Anchor {
        self.heading_angle = heading_angle;
        self
    }

    pub fn latlng(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()) {
            return Err(AnchorError::InvalidAnchor(
                "coordinates must be finite".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AnchorError::InvalidAnchor(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AnchorError::InvalidAnchor(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        let o = &self.orientation;
        let norm_sq = o.qx * o.qx + o.qy * o.qy + o.qz * o.qz + o.qw * o.qw;
        if !norm_sq.is_finite() || norm_sq < 1e-12 {
            return Err(AnchorError::InvalidAnchor(
                "orientation quaternion has zero length".to_string(),
            ));
        }
        if !self.heading_angle.is_finite() {
            return Err(AnchorError::InvalidAnchor(
                "heading angle must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Geospatial camera pose reported by the tracking source each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    /// Degrees clockwise from north.
    pub heading: f64,
}

impl CameraPose {
    pub fn new(latitude: f64, longitude: f64, heading: f64) -> CameraPose {
        CameraPose {
            latitude,
            longitude,
            altitude: 0.0,
            heading,
        }
    }

    pub fn latlng(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Releases platform resources held by a ring slot occupant when it is evicted.
pub trait Detach {
    fn detach(self);

    fn anchor_id(&self) -> Option<i64> {
        None
    }
}

impl Detach for Anchor {
    fn detach(self) {
        log::trace!("detached anchor {:?}", self.id);
    }

    fn anchor_id(&self) -> Option<i64> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitude() {
        let a = Anchor::new(91.0, 0.0, 0.0);
        assert!(matches!(a.validate(), Err(AnchorError::InvalidAnchor(_))));
    }

    #[test]
    fn rejects_zero_quaternion() {
        let a = Anchor::new(10.0, 10.0, 0.0).with_orientation(Orientation {
            qx: 0.0,
            qy: 0.0,
            qz: 0.0,
            qw: 0.0,
        });
        assert!(a.validate().is_err());
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let a: Anchor =
            serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0, "altitude": 3.0}"#)
                .unwrap();
        assert_eq!(a.id, None);
        assert_eq!(a.orientation, Orientation::IDENTITY);
        assert!(a.validate().is_ok());
    }
}
