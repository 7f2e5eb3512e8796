use glam::{Quat, Vec3};
use nalgebra as na;

use crate::anchor::{Anchor, CameraPose, LatLng};
use crate::pose::Pose;

/// Mean earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_009.0;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Great-circle distance in meters (haversine).
pub fn haversine_distance(a: &LatLng, b: &LatLng) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

pub fn geodetic_to_ecef(latitude: f64, longitude: f64, altitude: f64) -> na::Vector3<f64> {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let lat = latitude.to_radians();
    let lon = longitude.to_radians();
    let n = WGS84_A / (1.0 - e2 * lat.sin().powi(2)).sqrt();
    na::Vector3::new(
        (n + altitude) * lat.cos() * lon.cos(),
        (n + altitude) * lat.cos() * lon.sin(),
        (n * (1.0 - e2) + altitude) * lat.sin(),
    )
}

/// Rotation taking ECEF deltas into East-Up-South at the given location.
fn ecef_to_eus(latitude: f64, longitude: f64) -> na::Matrix3<f64> {
    let (slat, clat) = latitude.to_radians().sin_cos();
    let (slon, clon) = longitude.to_radians().sin_cos();
    na::Matrix3::new(
        -slon, clon, 0.0, //
        clat * clon, clat * slon, slat, //
        slat * clon, slat * slon, -clat,
    )
}

/// Position of `target` relative to `origin` in meters, East-Up-South.
pub fn eus_offset(
    origin: (f64, f64, f64),
    target: (f64, f64, f64),
) -> na::Vector3<f64> {
    let o = geodetic_to_ecef(origin.0, origin.1, origin.2);
    let t = geodetic_to_ecef(target.0, target.1, target.2);
    ecef_to_eus(origin.0, origin.1) * (t - o)
}

/// Places a geodetic anchor in the GL world frame.
///
/// The world frame is taken as gravity aligned with its -Z axis along the
/// camera heading at `camera_translation`.
pub fn resolve_anchor_pose(camera: &CameraPose, camera_translation: Vec3, anchor: &Anchor) -> Pose {
    let eus = eus_offset(
        (camera.latitude, camera.longitude, camera.altitude),
        (anchor.latitude, anchor.longitude, anchor.altitude),
    );
    let yaw = Quat::from_rotation_y(camera.heading.to_radians() as f32);
    let local = Vec3::new(eus.x as f32, eus.y as f32, eus.z as f32);
    Pose::new(
        yaw * local + camera_translation,
        (yaw * anchor.orientation.to_quat()).normalize(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_distance(&LatLng::new(0.0, 0.0), &LatLng::new(1.0, 0.0));
        assert!((d - 111_195.08).abs() < 1.0, "{}", d);
    }

    #[test]
    fn north_is_negative_z_in_eus() {
        let v = eus_offset((45.0, 7.0, 0.0), (45.001, 7.0, 0.0));
        assert!(v.x.abs() < 1e-3);
        assert!(v.z < -100.0);
    }

    #[test]
    fn east_is_positive_x_in_eus() {
        let v = eus_offset((45.0, 7.0, 0.0), (45.0, 7.001, 0.0));
        assert!(v.x > 70.0);
        assert!(v.z.abs() < 1e-2);
    }

    #[test]
    fn anchor_straight_ahead_lands_on_negative_z() {
        // camera faces east, anchor is east of it
        let camera = CameraPose::new(45.0, 7.0, 90.0);
        let anchor = Anchor::new(45.0, 7.0005, 0.0);
        let pose = resolve_anchor_pose(&camera, Vec3::ZERO, &anchor);
        assert!(pose.translation.z < -30.0);
        assert!(pose.translation.x.abs() < 0.1);
    }
}
