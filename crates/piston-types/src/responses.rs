//! Outbound interaction response schema

use serde::{Deserialize, Serialize};

/// Interaction response `type` values used by this bot.
pub mod response_type {
    /// Liveness acknowledgement for a Ping interaction.
    pub const PONG: u8 = 1;
    /// Immediate message reply.
    pub const CHANNEL_MESSAGE: u8 = 4;
    /// Deferred reply: "processing" acknowledgement, real answer follows
    /// via the webhook edit/follow-up API.
    pub const DEFERRED_CHANNEL_MESSAGE: u8 = 5;
    /// Open a modal.
    pub const MODAL: u8 = 9;
}

/// Message flag bits.
pub mod flags {
    /// Response visible only to the invoking user.
    pub const EPHEMERAL: u64 = 1 << 6;
}

/// Wire response to an interaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: response_type::PONG,
            data: None,
        }
    }

    pub fn message(data: ResponseData) -> Self {
        Self {
            kind: response_type::CHANNEL_MESSAGE,
            data: Some(data),
        }
    }

    /// Ephemeral plain-text reply.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::message(ResponseData {
            content: Some(content.into()),
            flags: Some(flags::EPHEMERAL),
            ..Default::default()
        })
    }

    pub fn deferred(ephemeral: bool) -> Self {
        Self {
            kind: response_type::DEFERRED_CHANNEL_MESSAGE,
            data: Some(ResponseData {
                flags: if ephemeral { Some(flags::EPHEMERAL) } else { Some(0) },
                ..Default::default()
            }),
        }
    }

    pub fn modal(data: ResponseData) -> Self {
        Self {
            kind: response_type::MODAL,
            data: Some(data),
        }
    }
}

/// Response payload, also reused as the `payload_json` body of webhook
/// edit/follow-up calls, where the irrelevant fields stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    /// Modal responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
}

/// Component type discriminants.
pub mod component_type {
    pub const ACTION_ROW: u8 = 1;
    pub const TEXT_INPUT: u8 = 4;
}

/// Text input style.
pub mod text_input_style {
    pub const SHORT: u8 = 1;
    pub const PARAGRAPH: u8 = 2;
}

/// An action row wrapping modal components.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<TextInput>,
}

impl ActionRow {
    /// A row holding a single text input, the only layout modals accept.
    pub fn text_input(input: TextInput) -> Self {
        Self {
            kind: component_type::ACTION_ROW,
            components: vec![input],
        }
    }
}

/// A modal text input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextInput {
    #[serde(rename = "type")]
    pub kind: u8,
    pub custom_id: String,
    pub style: u8,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub required: bool,
}

impl TextInput {
    pub fn new(custom_id: &str, style: u8, label: &str, required: bool) -> Self {
        Self {
            kind: component_type::TEXT_INPUT,
            custom_id: custom_id.to_string(),
            style,
            label: label.to_string(),
            placeholder: None,
            value: None,
            required,
        }
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn value(mut self, text: &str) -> Self {
        self.value = Some(text.to_string());
        self
    }
}

/// A file part attached to a response or follow-up message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileAttachment {
    pub name: String,
    pub data: String,
}

impl FileAttachment {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pong_serializes_as_type_1() {
        let json = serde_json::to_string(&InteractionResponse::pong()).unwrap();
        assert_eq!(json, r#"{"type":1}"#);
    }

    #[test]
    fn test_ephemeral_message_sets_flag() {
        let resp = InteractionResponse::ephemeral("not supported");
        assert_eq!(resp.kind, response_type::CHANNEL_MESSAGE);
        let data = resp.data.unwrap();
        assert_eq!(data.content.as_deref(), Some("not supported"));
        assert_eq!(data.flags, Some(flags::EPHEMERAL));
    }

    #[test]
    fn test_deferred_flags() {
        let hidden = InteractionResponse::deferred(true);
        assert_eq!(hidden.kind, response_type::DEFERRED_CHANNEL_MESSAGE);
        assert_eq!(hidden.data.unwrap().flags, Some(flags::EPHEMERAL));

        let visible = InteractionResponse::deferred(false);
        assert_eq!(visible.data.unwrap().flags, Some(0));
    }

    #[test]
    fn test_modal_wire_shape() {
        let resp = InteractionResponse::modal(ResponseData {
            custom_id: Some("run:rust:::".to_string()),
            title: Some("Execute rust program".to_string()),
            components: vec![ActionRow::text_input(
                TextInput::new("code", text_input_style::PARAGRAPH, "Script", true)
                    .placeholder("Code used for execution"),
            )],
            ..Default::default()
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["type"], 9);
        assert_eq!(json["data"]["custom_id"], "run:rust:::");
        assert_eq!(json["data"]["components"][0]["type"], 1);
        assert_eq!(json["data"]["components"][0]["components"][0]["type"], 4);
        assert_eq!(json["data"]["components"][0]["components"][0]["style"], 2);
        // Unset optional fields must be omitted entirely.
        assert!(json["data"].get("content").is_none());
        assert!(
            json["data"]["components"][0]["components"][0]
                .get("value")
                .is_none()
        );
    }

    #[test]
    fn test_response_data_roundtrip() {
        let data = ResponseData {
            content: Some("output below".to_string()),
            flags: Some(flags::EPHEMERAL),
            ..Default::default()
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: ResponseData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
