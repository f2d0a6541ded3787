use anyhow::{bail, Result};
use opencv::prelude::*;

/// One decoded or converted raster. Color frames are BGR, as OpenCV decodes them.
pub struct FrameData {
    pub mat: Mat,
}

impl FrameData {
    pub fn new(mat: Mat) -> Self {
        Self { mat }
    }

    /// Build a frame from interleaved 8-bit samples.
    #[cfg(test)]
    pub fn from_bytes(buffer: &[u8], width: u32, height: u32, channels: u8) -> Result<Self> {
        let rows = height as i32;
        let flat = Mat::new_rows_cols_with_data(rows, (width * channels as u32) as i32, buffer)?;
        let shaped = flat.reshape(channels as i32, rows)?;
        Ok(Self::new(shaped.try_clone()?))
    }

    pub fn width(&self) -> u32 {
        self.mat.cols() as u32
    }

    pub fn height(&self) -> u32 {
        self.mat.rows() as u32
    }

    pub fn channels(&self) -> u8 {
        self.mat.channels() as u8
    }

    pub fn is_single_channel(&self) -> bool {
        self.channels() == 1
    }

    /// Raw interleaved samples, row-major.
    pub fn bytes(&self) -> Result<&[u8]> {
        if !self.mat.is_continuous() {
            bail!("Frame is not continuous");
        }
        Ok(self.mat.data_bytes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_keeps_geometry() {
        let buffer: Vec<u8> = (0..24).collect();
        let frame = FrameData::from_bytes(&buffer, 4, 2, 3).unwrap();
        assert_eq!((frame.width(), frame.height(), frame.channels()), (4, 2, 3));
        assert_eq!(frame.mat.typ(), opencv::core::CV_8UC3);
        assert_eq!(frame.bytes().unwrap(), buffer.as_slice());
    }
}
