pub mod anchor;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod io;
pub mod pose;
pub mod proximity;
pub mod ring;
pub mod scene;
pub mod store;
pub mod visualization;

pub use anchor::{Anchor, CameraPose, Detach, LatLng, Orientation};
pub use config::SceneConfig;
pub use error::{AnchorError, Result};
pub use pose::{ModelAdjust, Pose, PoseCompositor};
pub use proximity::{ProximityFilter, is_visible};
pub use ring::{AnchorRing, RING_CAPACITY, RefreshOutcome, SharedRing};
pub use scene::{AnchorScene, DrawCommand, EvictionEvent, FrameInputs, FrameOutput, MarkerUpdate};
