// Clipforge - Export Module
// Ranks finished clips, combines them, and renders file-backed artifacts
// through FFmpeg.

pub mod ranker;
pub mod ffmpeg_builder;

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{ClipforgeError, Result};
use crate::segment::MediaRange;
use crate::tools::ffmpeg_path;

pub use ffmpeg_builder::{build_export_command, ExportOptions};
pub use ranker::{combine, rank, CombinedArtifact};

/// Render a combined artifact of source ranges into `output_path`.
/// Writes to a temp file next to the output and renames on success.
pub fn run_export(
    artifact: &CombinedArtifact<MediaRange>,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<()> {
    let tmp_path = output_path.with_extension("tmp.mp4");
    let args = build_export_command(artifact, &tmp_path, options)?;

    log::info!(
        "exporting {} clips to {}",
        artifact.len(),
        output_path.display()
    );

    let output = Command::new(ffmpeg_path())
        .args(&args)
        .stdout(Stdio::null())
        .output()
        .map_err(|e| ClipforgeError::FFmpeg(format!("Failed to start FFmpeg: {}", e)))?;

    if !output.status.success() {
        let _ = std::fs::remove_file(&tmp_path);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail = stderr.lines().rev().take(5).collect::<Vec<_>>();
        let msg = format!(
            "FFmpeg exited with code {}: {}",
            output.status.code().unwrap_or(-1),
            tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
        );
        return Err(ClipforgeError::FFmpeg(msg));
    }

    std::fs::rename(&tmp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        ClipforgeError::Io(e)
    })?;

    Ok(())
}
