//! Content payloads pushed to displays

use serde::{Deserialize, Serialize};

/// A piece of content assigned to a single display
///
/// Serialized with an internal `type` tag so the wire form matches the
/// display client contract: `{"type": "image", "src": "..."}` and so on.
/// `src` is required for image/video, `value` for color/text; `duration`
/// is optional and only meaningful for video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Full-screen image by URL
    Image { src: String },

    /// Full-screen looping or timed video by URL
    Video {
        src: String,
        /// Playback duration in milliseconds
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },

    /// Solid color fill (CSS color value)
    Color { value: String },

    /// Full-screen text
    Text { value: String },
}

impl Content {
    /// The wire name of this content kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Image { .. } => "image",
            Content::Video { .. } => "video",
            Content::Color { .. } => "color",
            Content::Text { .. } => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_serialization() {
        let content = Content::Image {
            src: "/assets/intro.png".into(),
        };

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["src"], "/assets/intro.png");
    }

    #[test]
    fn test_video_duration_is_optional() {
        let json = r#"{"type":"video","src":"/assets/loop.mp4"}"#;
        let content: Content = serde_json::from_str(json).unwrap();
        assert_eq!(
            content,
            Content::Video {
                src: "/assets/loop.mp4".into(),
                duration: None,
            }
        );

        // Omitted duration must not reappear on the wire
        let out = serde_json::to_value(&content).unwrap();
        assert!(out.get("duration").is_none());
    }

    #[test]
    fn test_video_with_duration_roundtrip() {
        let json = r#"{"type":"video","src":"/assets/clip.mp4","duration":12000}"#;
        let content: Content = serde_json::from_str(json).unwrap();
        assert_eq!(
            content,
            Content::Video {
                src: "/assets/clip.mp4".into(),
                duration: Some(12_000),
            }
        );
    }

    #[test]
    fn test_color_and_text() {
        let color: Content = serde_json::from_str(r##"{"type":"color","value":"#ff0000"}"##).unwrap();
        assert_eq!(color.kind(), "color");

        let text: Content = serde_json::from_str(r#"{"type":"text","value":"Bienvenue"}"#).unwrap();
        assert_eq!(text.kind(), "text");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_str::<Content>(r#"{"type":"hologram","src":"x"}"#);
        assert!(result.is_err());
    }
}
