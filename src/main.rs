mod core;
mod decoder;
mod renderer;
mod shared;
mod utils;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::slicer::{InputUnavailable, RunReport, Slicer};
use crate::decoder::VideoSource;
use crate::renderer::{GrayMode, HeadlessPreview, HighGuiPreview, Preview};
use crate::shared::constants;
use crate::utils::file_utils::PgmWriter;
use crate::utils::logger;

/// Slice a color video into grayscale PGM frames, one pass per color channel.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the video file to process
    video: PathBuf,

    /// How each frame is reduced to one band
    #[arg(short, long, value_enum, default_value_t = GrayMode::Luma)]
    mode: GrayMode,

    /// Run without preview windows
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Shrink the preview windows by this factor
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    preview_scale: u32,

    /// Create the frames_out_chan_<c> directories if they are missing
    #[arg(long, default_value_t = false)]
    create_dirs: bool,

    /// Print a JSON report of every pass when done
    #[arg(long, default_value_t = false)]
    summary: bool,
}

fn main() {
    let log_dir = std::env::current_dir().unwrap_or_default();
    let cli = parse_args(std::env::args_os(), &log_dir).unwrap_or_else(|e| e.exit());
    print_banner();

    match run(&cli) {
        Ok(report) => {
            if cli.summary {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => logger::error(&format!("Failed to serialize report: {}", e)),
                }
            }
            println!(">> Exiting!");
        }
        Err(e) => {
            logger::error(&format!("{:#}", e));
            eprintln!("Error: {:#}", e);
            if e.downcast_ref::<InputUnavailable>().is_some() {
                std::process::exit(constants::SYSTEM_ERROR);
            }
            std::process::exit(1);
        }
    }
}

/// Logs are only started once the arguments are valid, so `--help` and typos
/// leave an earlier run's logs in place.
fn parse_args<I, T>(args: I, log_dir: &Path) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    logger::init_in(log_dir);
    Ok(cli)
}

fn print_banner() {
    let mut cmd = Cli::command();
    println!("{}", cmd.render_usage());
    println!(
        "The program will process each frame of the video given, and output it as a PGM file \
         under ./{}<c>/{}<N>.{}",
        constants::CHANNEL_DIR_PREFIX,
        constants::FRAME_FILE_PREFIX,
        constants::FRAME_FILE_EXTENSION
    );
    println!("Press 'ESC' at any moment to stop the current channel pass.");
}

fn run(cli: &Cli) -> Result<RunReport> {
    let stop = Arc::new(AtomicBool::new(false));
    let s = stop.clone();
    ctrlc::set_handler(move || {
        s.store(true, Ordering::SeqCst);
    })?;

    let sink = PgmWriter::new(constants::OUTPUT_ROOT, cli.create_dirs);
    logger::info(&format!(
        "Start: video={} mode={:?} headless={} output_root={}",
        cli.video.display(),
        cli.mode,
        cli.headless,
        sink.root().display()
    ));

    let report = if cli.headless {
        slice(cli, HeadlessPreview, sink, stop)?
    } else {
        slice(cli, HighGuiPreview::new(cli.preview_scale), sink, stop)?
    };

    for pass in &report.passes {
        let state = if pass.interrupted() { "interrupted" } else { "complete" };
        println!(
            "\t    chan={}: {} frames, {} written ({})",
            pass.channel,
            pass.frames_processed,
            pass.frames_written(),
            state
        );
    }
    if report.aborted {
        println!(">> Stopped by Ctrl-C, remaining channels skipped");
    }

    Ok(report)
}

fn slice<P: Preview>(cli: &Cli, preview: P, sink: PgmWriter, stop: Arc<AtomicBool>) -> Result<RunReport> {
    let mut slicer = Slicer::new(cli.mode, preview, sink, stop);
    slicer.run(&cli.video, VideoSource::open)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_and_bad_args_leave_logs_alone() {
        let dir = tempfile::tempdir().unwrap();
        let debug_log = dir.path().join(constants::DEBUG_LOG_FILE);
        std::fs::write(&debug_log, "previous run\n").unwrap();

        assert!(parse_args(["chanslice", "--help"], dir.path()).is_err());
        assert!(parse_args(["chanslice", "clip.mp4", "--mode", "sepia"], dir.path()).is_err());
        assert!(parse_args(["chanslice"], dir.path()).is_err());

        assert_eq!(std::fs::read_to_string(&debug_log).unwrap(), "previous run\n");
        assert!(!dir.path().join(constants::ERROR_LOG_FILE).exists());
    }

    #[test]
    fn test_preview_scale_must_be_positive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(parse_args(["chanslice", "clip.mp4", "--preview-scale", "0"], dir.path()).is_err());
    }
}
