//! Presentation model
//!
//! [`StudioView::from_session`] is a pure function of the session; every front end
//! (HTML page, JSON API, CLI) renders from it.
use crate::scene::FrameCount;
use crate::session::{RequestStatus, Session};
use crate::style::{ArtStyle, PRESETS};
use serde::Serialize;

/// Caption prefix of each result frame ("original drawing")
pub const FRAME_CAPTION_PREFIX: &str = "原画";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleOption {
    pub value: ArtStyle,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameCountControl {
    pub value: u8,
    pub min: u8,
    pub max: u8,
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateButton {
    pub label: &'static str,
    pub enabled: bool,
    pub busy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetChip {
    pub index: usize,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameTile {
    pub number: usize,
    pub src: String,
    pub caption: String,
}

/// The single panel shown in the output area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", content = "content", rename_all = "snake_case")]
pub enum OutputPanel {
    Loading,
    Error(String),
    Empty,
    Results(Vec<FrameTile>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudioView {
    pub status: RequestStatus,
    pub description: String,
    pub description_label: &'static str,
    pub description_placeholder: &'static str,
    pub styles: Vec<StyleOption>,
    pub frame_count: FrameCountControl,
    /// Data URL of the reference image preview
    pub reference_image: Option<String>,
    pub analyzing: bool,
    /// Suggestion chips; hidden while analyzing
    pub suggestions: Vec<String>,
    pub generate_button: GenerateButton,
    pub presets: Vec<PresetChip>,
    pub output: OutputPanel,
}

impl StudioView {
    pub fn from_session(session: &Session) -> Self {
        let request = session.request();
        let status = session.status();
        let has_image = request.reference_image.is_some();
        let analyzing = status == RequestStatus::Analyzing;
        let generating = status == RequestStatus::Generating;

        let frame_count = if has_image {
            FrameCountControl {
                value: request.effective_frame_count().get(),
                min: FrameCount::MIN,
                max: FrameCount::MAX,
                enabled: false,
                label: "Number of frames (1 when modifying)".to_string(),
            }
        } else {
            FrameCountControl {
                value: request.frame_count.get(),
                min: FrameCount::MIN,
                max: FrameCount::MAX,
                enabled: true,
                label: format!("Number of key frames ({})", request.frame_count.get()),
            }
        };

        let generate_button = GenerateButton {
            label: match (generating, has_image) {
                (true, _) => "Drawing...",
                (false, true) => "Modify scene",
                (false, false) => "Generate frames",
            },
            enabled: !status.is_busy(),
            busy: generating,
        };

        let output = if generating {
            OutputPanel::Loading
        } else if let Some(error) = session.last_error() {
            OutputPanel::Error(error.to_string())
        } else if !session.frames().is_empty() {
            OutputPanel::Results(
                session
                    .frames()
                    .iter()
                    .map(|frame| FrameTile {
                        number: frame.position,
                        src: frame.image.as_str().to_string(),
                        caption: format!("{} #{}", FRAME_CAPTION_PREFIX, frame.position),
                    })
                    .collect(),
            )
        } else {
            OutputPanel::Empty
        };

        Self {
            status,
            description: request.description.clone(),
            description_label: if has_image {
                "Describe the next modification"
            } else {
                "Scene description"
            },
            description_placeholder: if has_image {
                "Example: raises his sword, ready to attack..."
            } else {
                "Example: a swordsman blocks a fire dragon's attack..."
            },
            styles: ArtStyle::ALL
                .into_iter()
                .map(|style| StyleOption {
                    value: style,
                    label: style.label(),
                    selected: style == request.style,
                })
                .collect(),
            frame_count,
            reference_image: request
                .reference_image
                .as_ref()
                .map(|image| image.as_str().to_string()),
            analyzing,
            suggestions: if analyzing {
                Vec::new()
            } else {
                session.suggestions().to_vec()
            },
            generate_button,
            presets: PRESETS
                .iter()
                .enumerate()
                .map(|(index, preset)| PresetChip {
                    index,
                    name: preset.name,
                })
                .collect(),
            output,
        }
    }
}
