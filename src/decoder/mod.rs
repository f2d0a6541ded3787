pub mod frame_data;
pub mod video;

use anyhow::Result;

pub use frame_data::FrameData;
pub use video::VideoSource;

/// Sequential frame producer. `Ok(None)` marks the end of the stream.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Option<FrameData>>;

    /// Free decoder resources. Called once when a pass ends.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
