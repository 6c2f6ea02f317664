//! In-process backend
//!
//! Serves two purposes: offline demos (placeholder frames drawn locally) and tests
//! (scripted answers, scripted failures, a gate to hold calls in flight, and a call log).
use super::{BackendType, GenAiBackend, ImageParams};
use crate::image_data::InlineImage;
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Analyze { mime_type: String, instruction: String },
    Edit { mime_type: String, instruction: String },
    Generate { instruction: String, count: u8 },
}

#[derive(Debug, Clone)]
enum Script {
    /// Draw placeholder frames
    Placeholder,
    /// Return exactly these values
    Fixed {
        analysis: String,
        edits: Vec<InlineImage>,
        images: Option<Vec<InlineImage>>,
    },
}

/// Mock backend
pub struct MockBackend {
    script: Mutex<Script>,
    failure: Mutex<Option<String>>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    /// Backend answering with canned suggestions and grey placeholder frames
    pub fn placeholder() -> Self {
        Self::with_script(Script::Placeholder)
    }

    /// Backend answering with an empty suggestion list and no images
    pub fn new() -> Self {
        Self::with_script(Script::Fixed {
            analysis: r#"{"suggestions": []}"#.to_string(),
            edits: Vec::new(),
            images: Some(Vec::new()),
        })
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            failure: Mutex::new(None),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Raw JSON text the analysis call answers with
    pub fn with_analysis(self, json: impl Into<String>) -> Self {
        self.update_fixed(|analysis, _, _| *analysis = json.into());
        self
    }

    /// Images every edit call answers with
    pub fn with_edit_images(self, images: Vec<InlineImage>) -> Self {
        self.update_fixed(|_, edits, _| *edits = images);
        self
    }

    /// Images every text-to-image call answers with; `None` echoes the requested count
    pub fn with_generated_images(self, images: Option<Vec<InlineImage>>) -> Self {
        self.update_fixed(|_, _, generated| *generated = images);
        self
    }

    /// Make every call fail with a transport error
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.lock() = Some(message.into());
        self
    }

    /// Hold every call until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn update_fixed(&self, f: impl FnOnce(&mut String, &mut Vec<InlineImage>, &mut Option<Vec<InlineImage>>)) {
        let mut script = self.script.lock();
        if let Script::Placeholder = *script {
            *script = Script::Fixed {
                analysis: r#"{"suggestions": []}"#.to_string(),
                edits: Vec::new(),
                images: Some(Vec::new()),
            };
        }
        if let Script::Fixed {
            analysis,
            edits,
            images,
        } = &mut *script
        {
            f(analysis, edits, images);
        }
    }

    async fn enter(&self, call: BackendCall) -> Result<Script> {
        self.calls.lock().push(call);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(message) = self.failure.lock().clone() {
            anyhow::bail!(message);
        }

        Ok(self.script.lock().clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Solid-color PNG standing in for a generated frame
pub fn placeholder_frame(index: usize, width: u32, height: u32) -> Result<InlineImage> {
    let shade = 96 + ((index * 40) % 128) as u8;
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([shade, shade, shade + 16]));

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img).write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )?;

    Ok(InlineImage::from_bytes("image/png", &bytes))
}

#[async_trait::async_trait]
impl GenAiBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mock
    }

    async fn analyze_image(
        &self,
        image: &InlineImage,
        instruction: &str,
        _response_schema: &serde_json::Value,
    ) -> Result<String> {
        let script = self
            .enter(BackendCall::Analyze {
                mime_type: image.mime_type.clone(),
                instruction: instruction.to_string(),
            })
            .await?;

        Ok(match script {
            Script::Placeholder => {
                r#"{"suggestions": ["raises his sword higher", "takes a step back", "his eyes glow with anger"]}"#
                    .to_string()
            }
            Script::Fixed { analysis, .. } => analysis,
        })
    }

    async fn edit_image(&self, image: &InlineImage, instruction: &str) -> Result<Vec<InlineImage>> {
        let script = self
            .enter(BackendCall::Edit {
                mime_type: image.mime_type.clone(),
                instruction: instruction.to_string(),
            })
            .await?;

        match script {
            Script::Placeholder => Ok(vec![placeholder_frame(0, 320, 180)?]),
            Script::Fixed { edits, .. } => Ok(edits),
        }
    }

    async fn generate_images(&self, instruction: &str, params: &ImageParams) -> Result<Vec<InlineImage>> {
        let script = self
            .enter(BackendCall::Generate {
                instruction: instruction.to_string(),
                count: params.count,
            })
            .await?;

        match script {
            Script::Fixed {
                images: Some(images),
                ..
            } => Ok(images),
            Script::Placeholder | Script::Fixed { images: None, .. } => (0..params.count as usize)
                .map(|index| placeholder_frame(index, 320, 180))
                .collect(),
        }
    }
}
