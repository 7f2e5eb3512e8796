//! Per-frame driver for the anchor ring.
//!
//! The host calls [`AnchorScene::on_place`] on a placement gesture and
//! [`AnchorScene::on_frame`] once per render tick, on the render thread.
//! Store snapshots are applied with [`AnchorScene::refresh`] whenever the
//! host's subscription yields one.

use crossbeam_channel::Receiver;
use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, CameraPose, Detach, LatLng};
use crate::config::SceneConfig;
use crate::error::{AnchorError, Result};
use crate::geodesy::resolve_anchor_pose;
use crate::pose::{Pose, PoseCompositor, model_view_projection, tint_for_index};
use crate::proximity::ProximityFilter;
use crate::ring::{AnchorRing, RefreshOutcome, SharedRing};
use crate::store::PersistenceWorker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInputs {
    /// `None` when tracking is lost for this frame.
    pub camera: Option<CameraPose>,
    /// Camera position in the GL world frame.
    #[serde(default)]
    pub camera_translation: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub slot: usize,
    pub anchor_id: Option<i64>,
    pub world_pose: Pose,
    pub model: Mat4,
    pub mvp: Mat4,
    pub tint_rgba: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKey {
    Camera,
    Slot(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerIcon {
    Camera,
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub key: MarkerKey,
    pub latitude: f64,
    pub longitude: f64,
    pub visible: bool,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    pub tracking: bool,
    pub draws: Vec<DrawCommand>,
    pub markers: Vec<MarkerUpdate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionEvent {
    /// Slot the new anchor was written to.
    pub slot: usize,
    pub had_occupant: bool,
    pub evicted_id: Option<i64>,
}

#[derive(Debug)]
pub struct PlaceOutcome {
    pub event: EvictionEvent,
    /// Set when the anchor is live in the ring but could not be queued for storage.
    pub persistence_error: Option<AnchorError>,
}

pub struct AnchorScene {
    ring: SharedRing,
    compositor: PoseCompositor,
    filter: ProximityFilter,
    persistence: Option<PersistenceWorker>,
    /// Where the camera marker was last shown, so it can be hidden in place.
    last_camera: Mutex<Option<LatLng>>,
}

impl AnchorScene {
    pub fn new(config: &SceneConfig) -> AnchorScene {
        AnchorScene {
            ring: AnchorRing::new().into_shared(),
            compositor: PoseCompositor::new(config.model_adjust),
            filter: ProximityFilter::from_option(config.proximity_threshold_meters),
            persistence: None,
            last_camera: Mutex::new(None),
        }
    }

    pub fn with_persistence(mut self, worker: PersistenceWorker) -> AnchorScene {
        self.persistence = Some(worker);
        self
    }

    /// Handle to the ring for hosts that insert from another thread.
    pub fn ring(&self) -> SharedRing {
        self.ring.clone()
    }

    pub fn persistence(&self) -> Option<&PersistenceWorker> {
        self.persistence.as_ref()
    }

    pub fn take_persistence(&mut self) -> Option<PersistenceWorker> {
        self.persistence.take()
    }

    /// Inserts `anchor` into the ring and queues it for storage.
    ///
    /// The store submit happens under the ring guard so that concurrent
    /// placements reach the store in ring order and keep their slots when a
    /// snapshot is applied.
    pub fn on_place(&self, anchor: Anchor) -> Result<PlaceOutcome> {
        anchor.validate()?;
        let (event, persistence_error) = {
            let mut ring = self.ring.lock();
            let (slot, previous) = ring.swap_in(anchor.clone());
            let event = EvictionEvent {
                slot,
                had_occupant: previous.is_some(),
                evicted_id: previous.as_ref().and_then(|p| p.id),
            };
            if let Some(previous) = previous {
                previous.detach();
            }
            let persistence_error = match &self.persistence {
                Some(worker) => worker.submit(anchor.clone()).err(),
                None => None,
            };
            (event, persistence_error)
        };
        log::debug!(
            "placed anchor at ({:.6}, {:.6}) in slot {}",
            anchor.latitude,
            anchor.longitude,
            event.slot
        );
        if let Some(e) = &persistence_error {
            log::warn!("anchor in slot {} not persisted: {}", event.slot, e);
        }
        Ok(PlaceOutcome {
            event,
            persistence_error,
        })
    }

    pub fn on_frame(&self, inputs: &FrameInputs) -> FrameOutput {
        let live: Vec<(usize, Anchor)> = {
            let ring = self.ring.lock();
            ring.iter().map(|(slot, a)| (slot, a.clone())).collect()
        };

        let Some(camera) = inputs.camera else {
            log::trace!("tracking lost, skipping {} anchors", live.len());
            let last = (*self.last_camera.lock()).unwrap_or(LatLng::new(0.0, 0.0));
            let mut markers = Vec::with_capacity(live.len() + 1);
            markers.push(MarkerUpdate {
                key: MarkerKey::Camera,
                latitude: last.latitude,
                longitude: last.longitude,
                visible: false,
                icon: MarkerIcon::Camera,
            });
            markers.extend(
                live.iter().map(|(slot, anchor)| anchor_marker(*slot, anchor, true)),
            );
            return FrameOutput {
                tracking: false,
                draws: Vec::new(),
                markers,
            };
        };

        let camera_latlng = camera.latlng();
        *self.last_camera.lock() = Some(camera_latlng);
        let mut output = FrameOutput {
            tracking: true,
            draws: Vec::with_capacity(live.len()),
            markers: Vec::with_capacity(live.len() + 1),
        };
        output.markers.push(MarkerUpdate {
            key: MarkerKey::Camera,
            latitude: camera.latitude,
            longitude: camera.longitude,
            visible: true,
            icon: MarkerIcon::Camera,
        });

        for (slot, anchor) in &live {
            let visible = self.filter.admits(&anchor.latlng(), &camera_latlng);
            output.markers.push(anchor_marker(*slot, anchor, visible));
            if !visible {
                continue;
            }
            let world_pose = resolve_anchor_pose(&camera, inputs.camera_translation, anchor);
            let model = self.compositor.model_matrix(&world_pose, anchor.heading_angle);
            let mvp = model_view_projection(&model, &inputs.view, &inputs.projection);
            output.draws.push(DrawCommand {
                slot: *slot,
                anchor_id: anchor.id,
                world_pose,
                model,
                mvp,
                tint_rgba: tint_for_index(*slot),
            });
        }
        output
    }

    pub fn refresh(&self, snapshot: Vec<Anchor>) -> RefreshOutcome {
        self.ring.lock().rebuild_from(snapshot)
    }

    /// Applies the newest snapshot waiting on `subscription`, if any.
    pub fn drain_refreshes(&self, subscription: &Receiver<Vec<Anchor>>) -> Option<RefreshOutcome> {
        subscription
            .try_iter()
            .last()
            .map(|snapshot| self.refresh(snapshot))
    }
}

fn anchor_marker(slot: usize, anchor: &Anchor, visible: bool) -> MarkerUpdate {
    MarkerUpdate {
        key: MarkerKey::Slot(slot),
        latitude: anchor.latitude,
        longitude: anchor.longitude,
        visible,
        icon: MarkerIcon::Anchor,
    }
}
