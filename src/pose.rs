use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::anchor::CameraPose;

/// Rigid transform in the GL world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Pose {
        Pose {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Pose {
        Pose::new(translation, Quat::IDENTITY)
    }

    /// `self * other`: `other` expressed in this pose's local frame.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose::new(
            self.translation + self.rotation * other.translation,
            (self.rotation * other.rotation).normalize(),
        )
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// Local placement of the drawn model relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelAdjust {
    pub offset: Vec3,
    pub tilt_x_degrees: f32,
    pub scale: Vec3,
}

/// Model edge size the augmented image preset scales against.
const AUGMENTED_MODEL_EDGE: f32 = 20.0;

impl ModelAdjust {
    pub const IDENTITY: ModelAdjust = ModelAdjust {
        offset: Vec3::ZERO,
        tilt_x_degrees: 0.0,
        scale: Vec3::ONE,
    };

    /// Placement used for models drawn on a detected image of the given extents:
    /// lifted by a tenth of the scale factor and tipped over onto the image plane.
    pub fn augmented_image(extent_x: f32, extent_z: f32) -> ModelAdjust {
        let factor = extent_x.max(extent_z) / AUGMENTED_MODEL_EDGE;
        ModelAdjust {
            offset: Vec3::new(0.0, 0.1 * factor, 0.0),
            tilt_x_degrees: 270.0,
            scale: Vec3::ONE,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == ModelAdjust::IDENTITY
    }
}

impl Default for ModelAdjust {
    fn default() -> Self {
        ModelAdjust::IDENTITY
    }
}

/// Builds model and model-view-projection matrices for anchored models.
///
/// Matrices are column-major and multiplied right to left, the same layout
/// as `android.opengl.Matrix`: `mvp = projection * (view * model)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseCompositor {
    adjust: ModelAdjust,
}

impl PoseCompositor {
    pub fn new(adjust: ModelAdjust) -> PoseCompositor {
        PoseCompositor { adjust }
    }

    pub fn adjust(&self) -> &ModelAdjust {
        &self.adjust
    }

    /// `T(anchor) · T(offset) · Rx(tilt) · Ry(spin) · S(scale)`
    pub fn model_matrix(&self, anchor_pose: &Pose, spin_degrees: f32) -> Mat4 {
        let placed = anchor_pose.compose(&Pose::from_translation(self.adjust.offset));
        let mut model = placed.to_matrix();
        if self.adjust.tilt_x_degrees != 0.0 {
            model *= Mat4::from_rotation_x(self.adjust.tilt_x_degrees.to_radians());
        }
        if spin_degrees != 0.0 {
            model *= Mat4::from_rotation_y(spin_degrees.to_radians());
        }
        if self.adjust.scale != Vec3::ONE {
            model *= Mat4::from_scale(self.adjust.scale);
        }
        model
    }

    /// Model-view-projection for a model at `anchor_pose`.
    ///
    /// `anchor_pose` is already in the world frame of `view`; the camera pose
    /// does not enter the product.
    pub fn compose(
        &self,
        _camera: &CameraPose,
        anchor_pose: &Pose,
        view: &Mat4,
        projection: &Mat4,
    ) -> Mat4 {
        self.compose_spun(anchor_pose, 0.0, view, projection)
    }

    pub fn compose_spun(
        &self,
        anchor_pose: &Pose,
        spin_degrees: f32,
        view: &Mat4,
        projection: &Mat4,
    ) -> Mat4 {
        let model = self.model_matrix(anchor_pose, spin_degrees);
        model_view_projection(&model, view, projection)
    }
}

pub fn model_view_projection(model: &Mat4, view: &Mat4, projection: &Mat4) -> Mat4 {
    let model_view = *view * *model;
    *projection * model_view
}

const TINT_INTENSITY: f32 = 0.1;
const TINT_ALPHA: f32 = 1.0;
const TINT_COLORS_HEX: [u32; 16] = [
    0x000000, 0xF44336, 0xE91E63, 0x9C27B0, 0x673AB7, 0x3F51B5, 0x2196F3, 0x03A9F4, 0x00BCD4,
    0x009688, 0x4CAF50, 0x8BC34A, 0xCDDC39, 0xFFEB3B, 0xFFC107, 0xFF9800,
];

/// Faint RGBA tint for the model drawn at `index`.
pub fn tint_for_index(index: usize) -> [f32; 4] {
    let hex = TINT_COLORS_HEX[index % TINT_COLORS_HEX.len()];
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0 * TINT_INTENSITY;
    [channel(16), channel(8), channel(0), TINT_ALPHA]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_is_scaled_by_intensity() {
        let t = tint_for_index(1); // 0xF44336
        assert!((t[0] - 0xF4 as f32 / 255.0 * 0.1).abs() < 1e-6);
        assert!((t[2] - 0x36 as f32 / 255.0 * 0.1).abs() < 1e-6);
        assert_eq!(t[3], 1.0);
        assert_eq!(tint_for_index(0), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(tint_for_index(17), tint_for_index(1));
    }
}
