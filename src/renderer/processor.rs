use anyhow::{bail, Result};
use opencv::{core, imgproc, prelude::*};

use crate::core::channel::Channel;
use crate::decoder::FrameData;

/// How a color frame is reduced to one band.
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrayMode {
    /// BT.601 luma; the pass channel does not affect the result.
    Luma,
    /// Keep only the pass channel's samples.
    Band,
}

pub struct GrayConverter {
    mode: GrayMode,
}

impl GrayConverter {
    pub fn new(mode: GrayMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> GrayMode {
        self.mode
    }

    pub fn convert(&self, frame: &FrameData, channel: Channel) -> Result<FrameData> {
        let src = &frame.mat;
        let mut gray = Mat::default();

        match (frame.channels(), self.mode) {
            (1, _) => gray = src.try_clone()?,
            (3 | 4, GrayMode::Band) => core::extract_channel(src, &mut gray, channel.index() as i32)?,
            (3, GrayMode::Luma) => cvt_gray(src, &mut gray, imgproc::COLOR_BGR2GRAY)?,
            (4, GrayMode::Luma) => cvt_gray(src, &mut gray, imgproc::COLOR_BGRA2GRAY)?,
            (other, _) => bail!("Cannot convert a {}-channel frame to grayscale", other),
        }

        Ok(FrameData::new(gray))
    }
}

fn cvt_gray(src: &Mat, dst: &mut Mat, code: i32) -> Result<()> {
    #[cfg(target_os = "macos")]
    imgproc::cvt_color(src, dst, code, 0, core::AlgorithmHint::ALGO_HINT_DEFAULT)?;

    #[cfg(not(target_os = "macos"))]
    imgproc::cvt_color(src, dst, code, 0)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgr_frame() -> FrameData {
        // 2x2: blue, green, red, white
        let buffer = [
            255, 0, 0, //
            0, 255, 0, //
            0, 0, 255, //
            255, 255, 255,
        ];
        FrameData::from_bytes(&buffer, 2, 2, 3).unwrap()
    }

    fn gray_bytes(frame: &FrameData, mode: GrayMode, channel: Channel) -> Vec<u8> {
        let gray = GrayConverter::new(mode).convert(frame, channel).unwrap();
        assert!(gray.is_single_channel());
        assert_eq!((gray.width(), gray.height()), (frame.width(), frame.height()));
        gray.bytes().unwrap().to_vec()
    }

    #[test]
    fn test_luma_matches_bt601_weights() {
        // 0.114*255, 0.587*255, 0.299*255, 255
        assert_eq!(gray_bytes(&bgr_frame(), GrayMode::Luma, Channel::Blue), vec![29, 150, 76, 255]);
    }

    #[test]
    fn test_luma_ignores_channel() {
        let frame = bgr_frame();
        assert_eq!(
            gray_bytes(&frame, GrayMode::Luma, Channel::Blue),
            gray_bytes(&frame, GrayMode::Luma, Channel::Red)
        );
    }

    #[test]
    fn test_band_extracts_selected_channel() {
        let frame = bgr_frame();
        assert_eq!(gray_bytes(&frame, GrayMode::Band, Channel::Blue), vec![255, 0, 0, 255]);
        assert_eq!(gray_bytes(&frame, GrayMode::Band, Channel::Green), vec![0, 255, 0, 255]);
        assert_eq!(gray_bytes(&frame, GrayMode::Band, Channel::Red), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_bgra_skips_alpha() {
        let frame = FrameData::from_bytes(&[0, 0, 255, 7, 255, 255, 255, 0], 2, 1, 4).unwrap();
        assert_eq!(gray_bytes(&frame, GrayMode::Luma, Channel::Blue), vec![76, 255]);
    }

    #[test]
    fn test_single_channel_passthrough() {
        let frame = FrameData::from_bytes(&[1, 2, 3], 3, 1, 1).unwrap();
        assert_eq!(gray_bytes(&frame, GrayMode::Band, Channel::Red), vec![1, 2, 3]);
    }

    #[test]
    fn test_two_channel_frame_is_rejected() {
        let frame = FrameData::from_bytes(&[0; 4], 2, 1, 2).unwrap();
        assert!(GrayConverter::new(GrayMode::Luma).convert(&frame, Channel::Blue).is_err());
    }
}
