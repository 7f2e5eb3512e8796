use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::{RecordingStream, TimeCell};

use crate::scene::FrameOutput;

pub fn id_to_color(id: usize) -> (u8, u8, u8, u8) {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

/// Logs the world positions of the anchors drawn in one frame.
pub fn log_frame(
    recording: &RecordingStream,
    topic: &str,
    frame_idx: usize,
    output: &FrameOutput,
) -> Result<(), Box<dyn std::error::Error>> {
    recording.set_time("frame", TimeCell::from_sequence(frame_idx as i64));
    let (pts, colors_labels): (Vec<_>, Vec<_>) = output
        .draws
        .iter()
        .map(|d| {
            let t = d.world_pose.translation;
            let color = id_to_color(d.anchor_id.unwrap_or(d.slot as i64) as usize);
            let label = match d.anchor_id {
                Some(id) => format!("#{} slot {}", id, d.slot),
                None => format!("slot {}", d.slot),
            };
            ((t.x, t.y, t.z), (color, label))
        })
        .unzip();
    let (colors, labels): (Vec<_>, Vec<_>) = colors_labels.into_iter().unzip();
    recording.log(
        format!("{}/anchors", topic),
        &rerun::Points3D::new(pts)
            .with_colors(colors)
            .with_labels(labels)
            .with_radii([rerun::Radius::new_ui_points(5.0)]),
    )?;
    Ok(())
}
