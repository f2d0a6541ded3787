pub mod channel;
pub mod slicer;
