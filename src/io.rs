use std::io::Write;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::scene::FrameOutput;

/// Serializes an object to a JSON file.
///
/// The file is written next to its destination first and then renamed over
/// it, so readers never observe a partial document.
pub fn object_to_json<T: Serialize>(output_path: impl AsRef<Path>, object: &T) -> Result<()> {
    let output_path = output_path.as_ref();
    let j = serde_json::to_string_pretty(object)?;
    let mut tmp = output_path.as_os_str().to_owned();
    tmp.push(".tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(j.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, output_path)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[derive(serde::Serialize)]
struct ReplayReport<'a> {
    timestamp: String,
    frames: usize,
    placements: usize,
    persistence_failures: usize,
    outputs: &'a [FrameOutput],
}

/// Writes the per-frame outputs of a replay run.
pub fn write_replay_report(
    output_path: impl AsRef<Path>,
    placements: usize,
    persistence_failures: usize,
    outputs: &[FrameOutput],
) -> Result<()> {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let report = ReplayReport {
        timestamp: now.to_string(),
        frames: outputs.len(),
        placements,
        persistence_failures,
        outputs,
    };
    object_to_json(output_path, &report)
}
