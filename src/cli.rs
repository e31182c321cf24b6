// Clipforge CLI binary

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use clipforge_lib::constants::ENGINE_VERSION;
use clipforge_lib::export::{self, ExportOptions};
use clipforge_lib::sampler::open_samples;
use clipforge_lib::segment::{ClipSegment, CloseReason, MediaRange, RangeCapture};
use clipforge_lib::{pipeline, tools, EngineConfig, RunReport};

#[derive(Parser)]
#[command(name = "clipforge")]
#[command(about = "Clipforge - extract highlight clips from per-frame importance signals", long_about = None)]
#[command(version)]
struct Cli {
    /// Log every clip boundary
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a frame sample stream and list the ranked clips
    Segment {
        /// Frame samples (JSON Lines, one sample per line)
        samples: PathBuf,
        /// Engine config file (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Source video the samples were taken from
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Keep only the N best clips
        #[arg(long)]
        top: Option<usize>,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Segment, rank and render the highlights into one video
    Export {
        /// Frame samples (JSON Lines, one sample per line)
        samples: PathBuf,
        /// Source video the samples were taken from
        #[arg(short, long)]
        source: PathBuf,
        /// Output video path
        #[arg(short, long)]
        output: PathBuf,
        /// Engine config file (JSON); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Keep only the N best clips
        #[arg(long)]
        top: Option<usize>,
        /// Drop the audio track
        #[arg(long)]
        no_audio: bool,
        /// Print the FFmpeg command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the default engine configuration as JSON
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Segment { samples, config, source, top, json } => {
            cmd_segment(&samples, config.as_deref(), source, top, json)
        }
        Commands::Export { samples, source, output, config, top, no_audio, dry_run } => {
            cmd_export(&samples, &source, &output, config.as_deref(), top, no_audio, dry_run)
        }
        Commands::Config => cmd_config(),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Run one segmentation pass over a sample file and rank the result
fn segment_file(
    samples: &Path,
    config: &EngineConfig,
    source: PathBuf,
    top: Option<usize>,
) -> Result<(RunReport<MediaRange>, Vec<ClipSegment<MediaRange>>)> {
    let reader = open_samples(samples, config.sample_interval)
        .map_err(|e| anyhow::anyhow!("Cannot open samples {}: {}", samples.display(), e))?;

    let report = pipeline::run_stream(reader, config, RangeCapture::new(source))?;

    let mut ranked = export::rank(&report.clips);
    if let Some(n) = top {
        ranked.truncate(n);
    }
    Ok((report, ranked))
}

fn cmd_segment(
    samples: &Path,
    config_path: Option<&Path>,
    source: Option<PathBuf>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = EngineConfig::load_or_default(config_path)?;
    let (report, ranked) = segment_file(samples, &config, source.unwrap_or_default(), top)?;

    if json {
        let out = serde_json::json!({
            "engineVersion": ENGINE_VERSION,
            "samplesProcessed": report.samples_processed,
            "discardedShort": report.discarded_short,
            "peakSmoothed": report.peak_smoothed,
            "clips": ranked,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "Processed {} samples ({} of timeline)",
        report.samples_processed,
        report.last_timestamp.map(format_time).unwrap_or_else(|| "-".to_string())
    );
    println!();

    if ranked.is_empty() {
        println!("No highlights found. Try lowering segmenter.openThreshold in the config.");
        return Ok(());
    }

    println!("{:>4}  {:>9}  {:>9}  {:>8}  {}", "Rank", "Start", "Duration", "Peak", "Closed by");
    println!("{}", "-".repeat(50));

    for (i, clip) in ranked.iter().enumerate() {
        println!(
            "{:>4}  {:>9}  {:>8.1}s  {:>8.1}  {}",
            i + 1,
            format_time(clip.start_time),
            clip.duration,
            clip.peak_importance,
            close_label(clip.close_reason)
        );
    }

    if report.discarded_short > 0 {
        println!();
        println!(
            "{} clip(s) shorter than {:.1}s were dropped.",
            report.discarded_short, config.min_segment_duration
        );
    }

    Ok(())
}

fn cmd_export(
    samples: &Path,
    source: &Path,
    output: &Path,
    config_path: Option<&Path>,
    top: Option<usize>,
    no_audio: bool,
    dry_run: bool,
) -> Result<()> {
    let config = EngineConfig::load_or_default(config_path)?;
    let (_, ranked) = segment_file(samples, &config, source.to_path_buf(), top)?;

    if ranked.is_empty() {
        println!("No highlights found; nothing to export.");
        return Ok(());
    }

    let artifact = export::combine(&ranked);
    let options = ExportOptions {
        include_audio: !no_audio,
        ..ExportOptions::default()
    };

    if dry_run {
        let args = export::build_export_command(&artifact, output, &options)?;
        println!("{} {}", tools::ffmpeg_path().display(), args.join(" "));
        return Ok(());
    }

    if !tools::is_ffmpeg_available() {
        anyhow::bail!("ffmpeg not found; set CLIPFORGE_FFMPEG_PATH or add it to PATH");
    }

    export::run_export(&artifact, output, &options)?;

    let total: f64 = ranked.iter().map(|c| c.duration).sum();
    println!(
        "Exported {} clips ({}) to {}",
        ranked.len(),
        format_time(total),
        output.display()
    );

    Ok(())
}

fn cmd_config() -> Result<()> {
    println!("{}", EngineConfig::default().to_json_pretty()?);
    Ok(())
}

fn close_label(reason: CloseReason) -> &'static str {
    match reason {
        CloseReason::Settled => "quiet",
        CloseReason::MaxDuration => "max length",
        CloseReason::EndOfStream => "end of stream",
    }
}

fn format_time(secs: f64) -> String {
    let total = secs.max(0.0);
    let minutes = (total / 60.0).floor() as u64;
    let seconds = total - minutes as f64 * 60.0;
    format!("{}:{:04.1}", minutes, seconds)
}
