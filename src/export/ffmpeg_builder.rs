// Clipforge - FFmpeg Command Builder
// Cuts each ranked MediaRange out of its source and concatenates the pieces
// into one output file.

use std::path::Path;

use crate::constants::{EXPORT_AUDIO_CODEC, EXPORT_CRF, EXPORT_PRESET, EXPORT_VIDEO_CODEC};
use crate::error::{ClipforgeError, Result};
use crate::segment::MediaRange;
use super::CombinedArtifact;

/// Encoding options for the combined output
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub include_audio: bool,
    pub video_codec: String,
    pub preset: String,
    pub crf: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_audio: true,
            video_codec: EXPORT_VIDEO_CODEC.to_string(),
            preset: EXPORT_PRESET.to_string(),
            crf: EXPORT_CRF,
        }
    }
}

/// Build the full FFmpeg args list for a combined artifact.
/// Returns a Vec of string args to pass to Command.
pub fn build_export_command(
    artifact: &CombinedArtifact<MediaRange>,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<Vec<String>> {
    if artifact.is_empty() {
        return Err(ClipforgeError::Export("No clips to export".to_string()));
    }

    if artifact.len() == 1 {
        return build_single_range_command(&artifact.parts()[0], output_path, options);
    }

    build_multi_range_command(artifact.parts(), output_path, options)
}

/// Single range: input seek + duration, no filtergraph needed
fn build_single_range_command(
    range: &MediaRange,
    output_path: &Path,
    options: &ExportOptions,
) -> Result<Vec<String>> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-ss".into(), secs(range.start),
        "-t".into(), secs(range.duration),
        "-i".into(), path_str(&range.source)?,
    ];

    if !options.include_audio {
        args.push("-an".into());
    }

    args.extend(output_encoding_args(options));
    args.push(path_str(output_path)?);
    Ok(args)
}

/// Several ranges: trim each one from its input, then concat in order
fn build_multi_range_command(
    ranges: &[MediaRange],
    output_path: &Path,
    options: &ExportOptions,
) -> Result<Vec<String>> {
    let mut args: Vec<String> = vec!["-y".into()];

    // One input per distinct source, in order of first use
    let mut sources: Vec<&Path> = Vec::new();
    let mut input_of: Vec<usize> = Vec::with_capacity(ranges.len());
    for range in ranges {
        let idx = match sources.iter().position(|s| *s == range.source.as_path()) {
            Some(idx) => idx,
            None => {
                sources.push(range.source.as_path());
                args.extend_from_slice(&["-i".into(), path_str(&range.source)?]);
                sources.len() - 1
            }
        };
        input_of.push(idx);
    }

    let mut filter_parts: Vec<String> = Vec::new();
    let mut concat_inputs = String::new();

    for (i, (range, input)) in ranges.iter().zip(&input_of).enumerate() {
        filter_parts.push(format!(
            "[{input}:v]trim=start={start}:duration={dur},setpts=PTS-STARTPTS[v{i}]",
            input = input,
            start = secs(range.start),
            dur = secs(range.duration),
            i = i,
        ));
        concat_inputs.push_str(&format!("[v{}]", i));

        if options.include_audio {
            filter_parts.push(format!(
                "[{input}:a]atrim=start={start}:duration={dur},asetpts=PTS-STARTPTS[a{i}]",
                input = input,
                start = secs(range.start),
                dur = secs(range.duration),
                i = i,
            ));
            concat_inputs.push_str(&format!("[a{}]", i));
        }
    }

    let n = ranges.len();
    if options.include_audio {
        filter_parts.push(format!("{}concat=n={}:v=1:a=1[outv][outa]", concat_inputs, n));
    } else {
        filter_parts.push(format!("{}concat=n={}:v=1:a=0[outv]", concat_inputs, n));
    }

    args.extend_from_slice(&["-filter_complex".into(), filter_parts.join(";")]);
    args.extend_from_slice(&["-map".into(), "[outv]".into()]);
    if options.include_audio {
        args.extend_from_slice(&["-map".into(), "[outa]".into()]);
    } else {
        args.push("-an".into());
    }

    args.extend(output_encoding_args(options));
    args.push(path_str(output_path)?);
    Ok(args)
}

/// Output encoding args for H.264 MP4
fn output_encoding_args(options: &ExportOptions) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-c:v".into(), options.video_codec.clone(),
        "-preset".into(), options.preset.clone(),
        "-crf".into(), options.crf.to_string(),
    ];
    if options.include_audio {
        args.extend_from_slice(&["-c:a".into(), EXPORT_AUDIO_CODEC.into()]);
    }
    args.extend_from_slice(&["-movflags".into(), "+faststart".into()]);
    args
}

fn secs(value: f64) -> String {
    format!("{:.3}", value)
}

/// Convert a Path to a String, failing on non-UTF8
fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| ClipforgeError::Export(format!("Path contains non-UTF8 characters: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::combine;
    use crate::segment::{ClipSegment, CloseReason};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn artifact(ranges: &[(&str, f64, f64)]) -> CombinedArtifact<MediaRange> {
        let clips: Vec<ClipSegment<MediaRange>> = ranges
            .iter()
            .map(|(source, start, duration)| ClipSegment {
                id: Uuid::new_v4(),
                start_time: *start,
                duration: *duration,
                peak_importance: 50.0,
                close_reason: CloseReason::Settled,
                media: MediaRange {
                    source: PathBuf::from(source),
                    start: *start,
                    duration: *duration,
                },
            })
            .collect();
        combine(&clips)
    }

    #[test]
    fn test_empty_artifact_rejected() {
        let result = build_export_command(&artifact(&[]), Path::new("out.mp4"), &ExportOptions::default());
        assert!(matches!(result, Err(ClipforgeError::Export(_))));
    }

    #[test]
    fn test_single_range_uses_seek() {
        let args = build_export_command(
            &artifact(&[("match.mp4", 12.5, 6.0)]),
            Path::new("out.mp4"),
            &ExportOptions::default(),
        )
        .unwrap();

        assert_eq!(&args[..7], &["-y", "-ss", "12.500", "-t", "6.000", "-i", "match.mp4"]);
        assert!(!args.iter().any(|a| a == "-filter_complex"));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_multi_range_concat_in_order() {
        let args = build_export_command(
            &artifact(&[("match.mp4", 30.0, 5.0), ("match.mp4", 2.0, 4.0)]),
            Path::new("out.mp4"),
            &ExportOptions::default(),
        )
        .unwrap();

        // Shared source is only opened once
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);

        let graph_idx = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[graph_idx + 1];
        assert!(graph.starts_with("[0:v]trim=start=30.000:duration=5.000,setpts=PTS-STARTPTS[v0]"));
        assert!(graph.contains("[0:a]atrim=start=2.000:duration=4.000,asetpts=PTS-STARTPTS[a1]"));
        assert!(graph.ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[outv][outa]"));
        assert!(args.contains(&"[outa]".to_string()));
    }

    #[test]
    fn test_multi_source_inputs_indexed() {
        let args = build_export_command(
            &artifact(&[("a.mp4", 0.0, 3.0), ("b.mp4", 1.0, 3.0), ("a.mp4", 9.0, 3.0)]),
            Path::new("out.mp4"),
            &ExportOptions::default(),
        )
        .unwrap();

        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        let graph_idx = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[graph_idx + 1];
        assert!(graph.contains("[1:v]trim=start=1.000"));
        assert!(graph.contains("[0:v]trim=start=9.000"));
    }

    #[test]
    fn test_audio_disabled() {
        let options = ExportOptions { include_audio: false, ..ExportOptions::default() };
        let args = build_export_command(
            &artifact(&[("a.mp4", 0.0, 3.0), ("a.mp4", 5.0, 3.0)]),
            Path::new("out.mp4"),
            &options,
        )
        .unwrap();

        let graph_idx = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[graph_idx + 1];
        assert!(!graph.contains("atrim"));
        assert!(graph.ends_with("[v0][v1]concat=n=2:v=1:a=0[outv]"));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
    }
}
