use serde::Serialize;

use crate::shared::constants;

/// One color band of a BGR frame. The discriminant is both the pass index and
/// the band's offset inside an interleaved BGR pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Blue = 0,
    Green = 1,
    Red = 2,
}

impl Channel {
    /// Pass order used by the entry point.
    pub const ALL: [Channel; 3] = [Channel::Blue, Channel::Green, Channel::Red];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Blue => "BLUE",
            Channel::Green => "GREEN",
            Channel::Red => "RED",
        }
    }

    /// Directory that receives this channel's frames, relative to the output root.
    pub fn dir_name(self) -> String {
        format!("{}{}", constants::CHANNEL_DIR_PREFIX, self.index())
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order_is_zero_one_two() {
        let indices: Vec<usize> = Channel::ALL.iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_display_is_index() {
        assert_eq!(Channel::Red.to_string(), "2");
        assert_eq!(Channel::Green.label(), "GREEN");
    }

    #[test]
    fn test_dir_names_are_distinct() {
        let dirs: Vec<String> = Channel::ALL.iter().map(|c| c.dir_name()).collect();
        assert_eq!(
            dirs,
            vec!["frames_out_chan_0", "frames_out_chan_1", "frames_out_chan_2"]
        );
    }
}
