pub const APP_NAME: &str = "chanslice";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

/// Process exit status when the input cannot be opened.
pub const SYSTEM_ERROR: i32 = -1;

// Output layout: <root>/frames_out_chan_<c>/frame_out<N>.pgm
pub const OUTPUT_ROOT: &str = ".";
pub const CHANNEL_DIR_PREFIX: &str = "frames_out_chan_";
pub const FRAME_FILE_PREFIX: &str = "frame_out";
pub const FRAME_FILE_EXTENSION: &str = "pgm";

// Preview windows
pub const WIN_TITLE_SOURCE: &str = "source frame";
pub const WIN_TITLE_GRAY: &str = "gray frame";
pub const ESCAPE_KEY: i32 = 27;
pub const KEY_POLL_MS: i32 = 10;

// Overlay drawn on the source preview only
pub const TEXT_1_LOCATION: (i32, i32) = (20, 20);
pub const TEXT_2_LOCATION: (i32, i32) = (20, 40);
pub const TEXT_LINE_THICKNESS: i32 = 1;
pub const TEXT_LINE_SCALE_FACTOR: f64 = 1.2;
pub const BGR_WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);
