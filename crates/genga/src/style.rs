//! Art styles and scene presets
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Art style applied to every generation prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtStyle {
    /// Bold, high-energy battle look
    #[default]
    ShonenFlame,
    /// Soft, delicate romance look
    ShojoGrace,
    /// Painterly feature-film look
    StudioMagic,
    /// Neon, mechanical sci-fi look
    CyberFuture,
    /// Dynamic camera, widescreen action
    CinematicAction,
    /// Dark, heavy-shadow horror look
    GothicHorror,
}

impl ArtStyle {
    pub const ALL: [ArtStyle; 6] = [
        ArtStyle::ShonenFlame,
        ArtStyle::ShojoGrace,
        ArtStyle::StudioMagic,
        ArtStyle::CyberFuture,
        ArtStyle::CinematicAction,
        ArtStyle::GothicHorror,
    ];

    /// Human-readable label, also the text embedded in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShonenFlame => "Shonen Flame",
            Self::ShojoGrace => "Shojo Grace",
            Self::StudioMagic => "Studio Magic",
            Self::CyberFuture => "Cyber Future",
            Self::CinematicAction => "Cinematic Action",
            Self::GothicHorror => "Gothic Horror",
        }
    }
}

impl std::fmt::Display for ArtStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown art style '{0}'")]
pub struct UnknownStyle(pub String);

impl FromStr for ArtStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|style| normalize_label(style.label()) == wanted)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

fn normalize_label(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Example scene that fills the whole request in one click
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenePreset {
    pub name: &'static str,
    pub description: &'static str,
    pub style: ArtStyle,
}

pub const PRESETS: [ScenePreset; 3] = [
    ScenePreset {
        name: "Samurai Duel",
        description: "A samurai draws his katana at lightning speed, ready to face his opponent under the moonlight.",
        style: ArtStyle::CinematicAction,
    },
    ScenePreset {
        name: "Magical Girl",
        description: "A young witch flies on her broom above a glittering city at night, her hair streaming behind her.",
        style: ArtStyle::StudioMagic,
    },
    ScenePreset {
        name: "Future Robot",
        description: "A giant robot walks through the rainy neon-lit streets of Tokyo, steam rising from its joints.",
        style: ArtStyle::CyberFuture,
    },
];

pub fn preset(index: usize) -> Option<&'static ScenePreset> {
    PRESETS.get(index)
}
