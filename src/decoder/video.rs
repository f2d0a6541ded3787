use anyhow::{anyhow, bail, Context, Result};
use opencv::{core, prelude::*, videoio};
use std::path::Path;

use super::{FrameData, FrameSource};
use crate::core::channel::Channel;
use crate::utils::logger;

/// OpenCV-backed video file reader.
pub struct VideoSource {
    capture: videoio::VideoCapture,
    released: bool,
}

impl VideoSource {
    pub fn open(path: &Path, channel: Channel) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Video path is not valid UTF-8: {:?}", path))?;

        logger::debug(&format!("Opening video with OpenCV: {}", path_str));

        // CAP_ANY lets OpenCV pick the backend (FFmpeg/GStreamer/AVFoundation/MSMF)
        let mut capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .with_context(|| format!("Failed to create capture for {}", path_str))?;

        if !capture.is_opened()? {
            let err_msg = format!("Failed to open video file: {}", path_str);
            logger::error(&err_msg);
            return Err(anyhow!(err_msg));
        }

        // File backends usually ignore this; only live multi-input devices honour it.
        match capture.set(videoio::CAP_PROP_CHANNEL, channel.index() as f64) {
            Ok(true) => {}
            Ok(false) => logger::debug("Capture backend ignored CAP_PROP_CHANNEL"),
            Err(e) => logger::debug(&format!("CAP_PROP_CHANNEL not supported: {}", e)),
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
        logger::info(&format!(
            "Capture opened: {}x{} @ {:.2} fps, ~{} frames (chan={})",
            width, height, fps, frame_count as i64, channel
        ));

        Ok(Self {
            capture,
            released: false,
        })
    }
}

impl FrameSource for VideoSource {
    fn read_frame(&mut self) -> Result<Option<FrameData>> {
        let mut frame = Mat::default();
        if self.released || !self.capture.read(&mut frame)? {
            return Ok(None); // EOF
        }
        if frame.empty() {
            return Ok(None);
        }

        if frame.depth() != core::CV_8U {
            bail!("Unsupported frame depth {} (expected 8-bit)", frame.depth());
        }

        Ok(Some(FrameData::new(frame)))
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.capture.release()?;
            self.released = true;
            logger::debug("Capture released");
        }
        Ok(())
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            logger::error(&format!("Failed to release capture: {}", e));
        }
    }
}
