pub mod display;
pub mod processor;

pub use display::{HeadlessPreview, HighGuiPreview, Preview};
pub use processor::{GrayConverter, GrayMode};
