use geo_anchor_ring::CameraPose;
use geo_anchor_ring::pose::{ModelAdjust, Pose, PoseCompositor, model_view_projection};
use glam::{Mat4, Quat, Vec3, Vec4};

fn assert_mat_close(a: &Mat4, b: &Mat4) {
    assert!(a.abs_diff_eq(*b, 1e-5), "\n{:?}\n!=\n{:?}", a, b);
}

#[test]
fn test_identity_compose() {
    let compositor = PoseCompositor::default();
    for camera in [
        CameraPose::new(0.0, 0.0, 0.0),
        CameraPose::new(37.422, -122.084, 271.5),
        CameraPose::new(-33.86, 151.2, 90.0),
    ] {
        let mvp = compositor.compose(&camera, &Pose::IDENTITY, &Mat4::IDENTITY, &Mat4::IDENTITY);
        assert_eq!(mvp, Mat4::IDENTITY);
    }
}

#[test]
fn test_multiplication_order() {
    let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    let view = Mat4::from_rotation_y(0.3);
    let projection = Mat4::perspective_rh_gl(1.0, 1.5, 0.1, 100.0);
    let mvp = model_view_projection(&model, &view, &projection);
    assert_mat_close(&mvp, &(projection * (view * model)));
    // not the reversed product
    assert!(!mvp.abs_diff_eq(model * view * projection, 1e-3));
}

#[test]
fn test_compose_places_origin_at_anchor() {
    let pose = Pose::new(Vec3::new(0.0, 0.0, -2.0), Quat::from_rotation_y(0.7));
    let compositor = PoseCompositor::default();
    let camera = CameraPose::new(10.0, 20.0, 45.0);
    let mvp = compositor.compose(&camera, &pose, &Mat4::IDENTITY, &Mat4::IDENTITY);
    let origin = mvp * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!((origin.truncate() - pose.translation).length() < 1e-6);
}

#[test]
fn test_augmented_image_adjust() {
    let adjust = ModelAdjust::augmented_image(0.4, 0.2);
    // factor = 0.4 / 20 = 0.02
    assert!((adjust.offset.y - 0.002).abs() < 1e-6);
    assert_eq!(adjust.tilt_x_degrees, 270.0);

    let compositor = PoseCompositor::new(adjust);
    let model = compositor.model_matrix(&Pose::IDENTITY, 0.0);
    // model origin is lifted by the offset
    let origin = model * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!((origin.y - 0.002).abs() < 1e-6);
    // 270 degrees about x takes local +y to -z
    let up = model.transform_vector3(Vec3::Y);
    assert!((up + Vec3::Z).length() < 1e-5, "{:?}", up);
}

#[test]
fn test_spin_applied_after_tilt() {
    let adjust = ModelAdjust {
        tilt_x_degrees: 90.0,
        ..ModelAdjust::IDENTITY
    };
    let compositor = PoseCompositor::new(adjust);
    let model = compositor.model_matrix(&Pose::IDENTITY, 90.0);
    let expected = Mat4::from_rotation_x(90f32.to_radians()) * Mat4::from_rotation_y(90f32.to_radians());
    assert_mat_close(&model, &expected);
}

#[test]
fn test_pose_compose() {
    let a = Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
    let b = Pose::from_translation(Vec3::new(1.0, 0.0, 0.0));
    let c = a.compose(&b);
    assert!((c.translation - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    assert_mat_close(&c.to_matrix(), &(a.to_matrix() * b.to_matrix()));
}
