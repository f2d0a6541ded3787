use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::channel::Channel;
use crate::decoder::FrameSource;
use crate::renderer::{GrayConverter, GrayMode, Preview};
use crate::shared::constants;
use crate::utils::file_utils::FrameSink;
use crate::utils::logger;

/// Why a pass stopped streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassEnd {
    /// Source ran out of frames.
    Exhausted,
    /// ESC in a preview window.
    EscapePressed,
    /// Ctrl-C: the whole run is stopping.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub channel: Channel,
    /// Frames decoded and converted; also the next frame number.
    pub frames_processed: u64,
    /// Frames whose file could not be written.
    pub write_failures: u64,
    pub end: PassEnd,
    /// Dimensions of the last frame written, if any.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl PassReport {
    pub fn frames_written(&self) -> u64 {
        self.frames_processed - self.write_failures
    }

    pub fn interrupted(&self) -> bool {
        self.end != PassEnd::Exhausted
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: String,
    pub mode: GrayMode,
    pub passes: Vec<PassReport>,
    pub aborted: bool,
}

/// Context attached when the input video cannot be opened; the only fatal condition.
#[derive(Debug)]
pub struct InputUnavailable(pub String);

impl std::fmt::Display for InputUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cannot open input video {}", self.0)
    }
}

/// Drives the decode → convert → preview → write loop, one pass per channel.
pub struct Slicer<P: Preview, W: FrameSink> {
    converter: GrayConverter,
    preview: P,
    sink: W,
    stop: Arc<AtomicBool>,
}

impl<P: Preview, W: FrameSink> Slicer<P, W> {
    pub fn new(mode: GrayMode, preview: P, sink: W, stop: Arc<AtomicBool>) -> Self {
        Self {
            converter: GrayConverter::new(mode),
            preview,
            sink,
            stop,
        }
    }

    #[cfg(test)]
    pub fn preview(&self) -> &P {
        &self.preview
    }

    /// Run all three channel passes over `input`, reopening it for each pass.
    pub fn run<S, F>(&mut self, input: &Path, mut open: F) -> Result<RunReport>
    where
        S: FrameSource,
        F: FnMut(&Path, Channel) -> Result<S>,
    {
        if self.converter.mode() == GrayMode::Luma {
            logger::warn("Luma conversion ignores the pass channel; all passes produce the same frames");
        }

        let mut report = RunReport {
            input: input.display().to_string(),
            mode: self.converter.mode(),
            passes: Vec::with_capacity(Channel::ALL.len()),
            aborted: false,
        };

        for channel in Channel::ALL {
            if self.stop.load(Ordering::SeqCst) {
                report.aborted = true;
                break;
            }

            println!(
                "\t >> Processing GRAY_SCALE: based on {} channel only(chan={})",
                channel.label(),
                channel
            );

            let mut source =
                open(input, channel).with_context(|| InputUnavailable(input.display().to_string()))?;
            let pass = self.run_pass(&mut source, channel)?;

            logger::info(&format!(
                "Pass chan={} finished: {} frames, {:?}",
                channel, pass.frames_processed, pass.end
            ));
            if pass.end == PassEnd::Stopped {
                report.aborted = true;
            }
            report.passes.push(pass);
            if report.aborted {
                break;
            }
        }

        Ok(report)
    }

    /// One channel pass. The frame counter starts at zero on every call.
    /// The source is released and the preview closed even when streaming fails.
    pub fn run_pass<S: FrameSource>(&mut self, source: &mut S, channel: Channel) -> Result<PassReport> {
        let mut report = PassReport {
            channel,
            frames_processed: 0,
            write_failures: 0,
            end: PassEnd::Exhausted,
            width: None,
            height: None,
        };

        let streamed = self.open_and_stream(source, channel, &mut report);

        if let Err(e) = source.release() {
            logger::error(&format!("Failed to release source: {}", e));
        }
        if let Err(e) = self.preview.close() {
            logger::error(&format!("Failed to close preview: {}", e));
        }

        streamed.map(|_| report)
    }

    fn open_and_stream<S: FrameSource>(
        &mut self,
        source: &mut S,
        channel: Channel,
        report: &mut PassReport,
    ) -> Result<()> {
        self.preview.open()?;
        if let Err(e) = self.sink.begin_pass(channel) {
            logger::error(&format!("Output setup for chan={} failed: {:#}", channel, e));
        }
        self.stream(source, channel, report)
    }

    fn stream<S: FrameSource>(&mut self, source: &mut S, channel: Channel, report: &mut PassReport) -> Result<()> {
        let mut frame_num: u64 = 0;

        loop {
            if self.stop.load(Ordering::SeqCst) {
                report.end = PassEnd::Stopped;
                break;
            }

            let Some(frame) = source.read_frame()? else {
                report.end = PassEnd::Exhausted;
                break;
            };

            if self.preview.poll_key()? == Some(constants::ESCAPE_KEY) {
                logger::info(&format!("ESC pressed, stopping chan={} at frame {}", channel, frame_num));
                report.end = PassEnd::EscapePressed;
                break;
            }

            let gray = self.converter.convert(&frame, channel)?;
            self.preview.show(&frame, &gray, channel, frame_num)?;

            // A failed write does not stop the pass
            match self.sink.write_frame(channel, frame_num, &gray) {
                Ok(path) => {
                    logger::debug(&format!("Wrote {}", path.display()));
                    report.width = Some(gray.width());
                    report.height = Some(gray.height());
                }
                Err(e) => {
                    logger::error(&format!("{:#}", e));
                    report.write_failures += 1;
                }
            }

            frame_num += 1;
            report.frames_processed = frame_num;
        }

        Ok(())
    }
}
