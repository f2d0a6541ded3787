use anyhow::Result;
use opencv::{
    core::{Point, Scalar},
    highgui, imgproc,
    prelude::*,
};

use crate::core::channel::Channel;
use crate::decoder::FrameData;
use crate::shared::constants;
use crate::utils::logger;

/// Live view of the frames being sliced.
pub trait Preview {
    fn open(&mut self) -> Result<()>;

    /// Wait up to the poll interval for a key press. `None` when no key arrived.
    fn poll_key(&mut self) -> Result<Option<i32>>;

    fn show(&mut self, source: &FrameData, gray: &FrameData, channel: Channel, frame_num: u64) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

/// Two OpenCV HighGUI windows: the source frame (with overlay) and the gray frame.
pub struct HighGuiPreview {
    scale_down: u32,
    sized: bool,
}

impl HighGuiPreview {
    pub fn new(scale_down: u32) -> Self {
        Self {
            scale_down: scale_down.max(1),
            sized: false,
        }
    }

    fn resize_windows(&mut self, width: u32, height: u32) -> Result<()> {
        let w = (width / self.scale_down).max(1) as i32;
        let h = (height / self.scale_down).max(1) as i32;
        highgui::resize_window(constants::WIN_TITLE_SOURCE, w, h)?;
        highgui::resize_window(constants::WIN_TITLE_GRAY, w, h)?;
        self.sized = true;
        Ok(())
    }
}

impl Preview for HighGuiPreview {
    fn open(&mut self) -> Result<()> {
        highgui::named_window(constants::WIN_TITLE_SOURCE, highgui::WINDOW_NORMAL)?;
        highgui::named_window(constants::WIN_TITLE_GRAY, highgui::WINDOW_NORMAL)?;
        self.sized = false;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<i32>> {
        let key = highgui::wait_key(constants::KEY_POLL_MS)?;
        // Some backends report modifier state in the upper bits
        Ok(if key < 0 { None } else { Some(key & 0xFF) })
    }

    fn show(&mut self, source: &FrameData, gray: &FrameData, channel: Channel, frame_num: u64) -> Result<()> {
        if !self.sized {
            self.resize_windows(source.width(), source.height())?;
        }

        // Overlay goes on a copy so the frame handed to the sink stays clean
        let mut annotated = source.mat.try_clone()?;
        draw_overlay(&mut annotated, channel, frame_num)?;
        highgui::imshow(constants::WIN_TITLE_SOURCE, &annotated)?;
        highgui::imshow(constants::WIN_TITLE_GRAY, &gray.mat)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        highgui::destroy_window(constants::WIN_TITLE_SOURCE)?;
        highgui::destroy_window(constants::WIN_TITLE_GRAY)?;
        Ok(())
    }
}

/// Preview for runs without a display. Never reports a key.
pub struct HeadlessPreview;

impl Preview for HeadlessPreview {
    fn open(&mut self) -> Result<()> {
        logger::debug("Headless preview: no windows opened");
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<i32>> {
        Ok(None)
    }

    fn show(&mut self, _source: &FrameData, _gray: &FrameData, _channel: Channel, _frame_num: u64) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

fn draw_overlay(mat: &mut Mat, channel: Channel, frame_num: u64) -> Result<()> {
    let (b, g, r) = constants::BGR_WHITE;
    let color = Scalar::new(b, g, r, 0.0);
    let lines = [
        (constants::TEXT_1_LOCATION, format!("chan={} ({})", channel, channel.label())),
        (constants::TEXT_2_LOCATION, format!("frame={}", frame_num)),
    ];
    for ((x, y), text) in lines {
        imgproc::put_text(
            mat,
            &text,
            Point::new(x, y),
            imgproc::FONT_HERSHEY_SIMPLEX,
            constants::TEXT_LINE_SCALE_FACTOR,
            color,
            constants::TEXT_LINE_THICKNESS,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_never_reports_key() {
        let mut preview = HeadlessPreview;
        preview.open().unwrap();
        for _ in 0..3 {
            assert_eq!(preview.poll_key().unwrap(), None);
        }
        preview.close().unwrap();
    }

    #[test]
    fn test_scale_down_is_at_least_one() {
        assert_eq!(HighGuiPreview::new(0).scale_down, 1);
        assert_eq!(HighGuiPreview::new(6).scale_down, 6);
    }

    #[test]
    fn test_overlay_draws_on_copy_only() {
        let frame = FrameData::from_bytes(&[0u8; 64 * 48 * 3], 64, 48, 3).unwrap();
        let mut annotated = frame.mat.try_clone().unwrap();
        draw_overlay(&mut annotated, Channel::Green, 7).unwrap();

        assert!(annotated.data_bytes().unwrap().iter().any(|&v| v > 0));
        assert!(frame.bytes().unwrap().iter().all(|&v| v == 0));
    }
}
