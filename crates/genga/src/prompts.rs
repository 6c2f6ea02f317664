//! Instruction templates sent to the generative models
use crate::style::ArtStyle;

/// Number of follow-up phrases the analysis model is asked for
pub const SUGGESTION_COUNT: usize = 3;

/// Instruction for the key-frame analysis call
pub fn analysis_instruction(language: &str) -> String {
    format!(
        "Analyze this anime key frame (genga).\n\
         Suggest {SUGGESTION_COUNT} possible modifications or next movements that describe the next frame in the sequence.\n\
         Suggestions must be short and suitable as prompts for an image AI.\n\
         Examples: \"raises his sword higher\", \"takes a step back\", \"his eyes glow with anger\".\n\
         Respond in {language} only."
    )
}

/// JSON schema the analysis model must answer with
pub fn suggestion_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "STRING",
                    "description": "Suggested next movement"
                }
            }
        }
    })
}

/// Instruction for continuing a reference frame
pub fn edit_instruction(style: ArtStyle, modification: &str) -> String {
    format!(
        "Draw the next anime key frame (genga) in the sequence based on the image and the description.\n\
         Style: {style}.\n\
         Requested modification: {}.\n\
         The resulting drawing must have clean lines and be a direct continuation of the input image.",
        modification.trim()
    )
}

/// Instruction for a fresh sequence of key frames
pub fn sequence_instruction(style: ArtStyle, description: &str, frames: u8) -> String {
    format!(
        "Create {frames} sequential animation key frames (genga) for an anime scene.\n\
         Style: {style}.\n\
         Scene description: {}.\n\
         Each frame must show a clear progression of the motion. The drawing must use clean lines suitable for animation production. \
         Do not include any numbers or text on the images themselves.",
        description.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_instruction_language() {
        let text = analysis_instruction("Arabic");
        assert!(text.contains("Respond in Arabic only."));
        assert!(text.contains("Suggest 3 possible"));
    }

    #[test]
    fn test_edit_instruction_embeds_style_and_text() {
        let text = edit_instruction(ArtStyle::GothicHorror, "  step back ");
        assert!(text.contains("Style: Gothic Horror."));
        assert!(text.contains("Requested modification: step back."));
        assert!(text.contains("direct continuation"));
    }

    #[test]
    fn test_sequence_instruction() {
        let text = sequence_instruction(ArtStyle::CinematicAction, "dragon fight", 3);
        assert!(text.starts_with("Create 3 sequential"));
        assert!(text.contains("Scene description: dragon fight."));
        assert!(text.contains("Do not include any numbers or text"));
    }

    #[test]
    fn test_schema_declares_suggestions_array() {
        let schema = suggestion_schema();
        assert_eq!(schema["properties"]["suggestions"]["type"], "ARRAY");
    }
}
