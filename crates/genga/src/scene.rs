//! Scene request: everything the user has entered
use crate::image_data::EncodedImage;
use crate::style::{ArtStyle, ScenePreset};
use serde::{Deserialize, Serialize};

/// Number of key frames in a text-to-image sequence, 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct FrameCount(u8);

impl FrameCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const ONE: FrameCount = FrameCount(1);

    pub fn new(count: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for FrameCount {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for FrameCount {
    type Error = String;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        Self::new(count).ok_or_else(|| {
            format!(
                "frame count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )
        })
    }
}

impl From<FrameCount> for u8 {
    fn from(count: FrameCount) -> u8 {
        count.0
    }
}

/// User inputs of the studio
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRequest {
    pub description: String,
    pub style: ArtStyle,
    /// Preferred count; ignored while a reference image is present
    pub frame_count: FrameCount,
    pub reference_image: Option<EncodedImage>,
}

impl SceneRequest {
    /// Count that will actually be requested: one frame when continuing a reference image
    pub fn effective_frame_count(&self) -> FrameCount {
        if self.reference_image.is_some() {
            FrameCount::ONE
        } else {
            self.frame_count
        }
    }

    pub fn frame_count_locked(&self) -> bool {
        self.reference_image.is_some()
    }

    /// Overwrite description and style, drop the reference image
    pub fn apply_preset(&mut self, preset: &ScenePreset) {
        self.description = preset.description.to_string();
        self.style = preset.style;
        self.reference_image = None;
    }
}
