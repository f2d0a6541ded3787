use anyhow::{bail, Context, Result};
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::channel::Channel;
use crate::decoder::FrameData;
use crate::shared::constants;

/// Destination for converted frames.
pub trait FrameSink {
    /// Called once before the first frame of a pass.
    fn begin_pass(&mut self, _channel: Channel) -> Result<()> {
        Ok(())
    }

    fn write_frame(&mut self, channel: Channel, frame_num: u64, gray: &FrameData) -> Result<PathBuf>;
}

/// `<root>/frames_out_chan_<c>/frame_out<N>.pgm`
pub fn frame_path(root: &Path, channel: Channel, frame_num: u64) -> PathBuf {
    root.join(channel.dir_name()).join(format!(
        "{}{}.{}",
        constants::FRAME_FILE_PREFIX,
        frame_num,
        constants::FRAME_FILE_EXTENSION
    ))
}

/// Writes gray frames as binary PGM (P5) files.
pub struct PgmWriter {
    root: PathBuf,
    create_dirs: bool,
}

impl PgmWriter {
    pub fn new(root: impl Into<PathBuf>, create_dirs: bool) -> Self {
        Self {
            root: root.into(),
            create_dirs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameSink for PgmWriter {
    fn begin_pass(&mut self, channel: Channel) -> Result<()> {
        if self.create_dirs {
            let dir = self.root.join(channel.dir_name());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        }
        Ok(())
    }

    fn write_frame(&mut self, channel: Channel, frame_num: u64, gray: &FrameData) -> Result<PathBuf> {
        if !gray.is_single_channel() {
            bail!("PGM output needs a single-channel frame, got {} channels", gray.channels());
        }
        let samples = gray.bytes()?;

        let path = frame_path(&self.root, channel, frame_num);
        let file = File::create(&path).with_context(|| format!("Failed to create frame file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        PnmEncoder::new(&mut writer)
            .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
            .write_image(samples, gray.width(), gray.height(), ExtendedColorType::L8)
            .with_context(|| format!("Failed to encode frame: {:?}", path))?;
        writer.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_path_layout() {
        let path = frame_path(Path::new("."), Channel::Green, 12);
        assert_eq!(path, PathBuf::from("./frames_out_chan_1/frame_out12.pgm"));
    }

    #[test]
    fn test_writes_binary_pgm() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PgmWriter::new(dir.path(), true);
        writer.begin_pass(Channel::Blue).unwrap();

        let samples = [0u8, 64, 128, 255, 10, 20];
        let gray = FrameData::from_bytes(&samples, 3, 2, 1).unwrap();
        let path = writer.write_frame(Channel::Blue, 0, &gray).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P5"));
        assert!(bytes.ends_with(&samples));

        let loaded = image::open(&path).unwrap().to_luma8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.into_raw(), samples.to_vec());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PgmWriter::new(dir.path(), false);
        writer.begin_pass(Channel::Red).unwrap();

        let gray = FrameData::from_bytes(&[0; 4], 2, 2, 1).unwrap();
        assert!(writer.write_frame(Channel::Red, 0, &gray).is_err());
        assert!(!dir.path().join("frames_out_chan_2").exists());
    }

    #[test]
    fn test_rejects_color_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = PgmWriter::new(dir.path(), true);
        let color = FrameData::from_bytes(&[0; 12], 2, 2, 3).unwrap();
        assert!(writer.write_frame(Channel::Blue, 0, &color).is_err());
    }
}
