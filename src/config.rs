use serde::{Deserialize, Serialize};

use crate::pose::ModelAdjust;
use crate::proximity::DEFAULT_THRESHOLD_METERS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// `None` draws every live anchor regardless of distance.
    pub proximity_threshold_meters: Option<f64>,
    pub model_adjust: ModelAdjust,
    /// Capacity of the channel feeding the persistence worker.
    pub persistence_queue_depth: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_meters: Some(DEFAULT_THRESHOLD_METERS),
            model_adjust: ModelAdjust::IDENTITY,
            persistence_queue_depth: 16,
        }
    }
}
