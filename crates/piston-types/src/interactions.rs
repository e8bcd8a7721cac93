//! Inbound Discord interaction schema
//!
//! Only the fields the dispatcher and command handlers read are
//! modelled; everything else in the platform payload is ignored on
//! deserialization.

use serde::{Deserialize, Serialize};

/// Interaction kind, decoded from the numeric `type` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
    Unknown,
}

impl InteractionType {
    /// Derive the kind from the raw wire discriminant.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            _ => Self::Unknown,
        }
    }
}

/// A single inbound interaction event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Raw wire discriminant, see [`InteractionType::from_raw`].
    #[serde(rename = "type")]
    pub kind: u8,
    /// Opaque credential for follow-up calls within the platform's
    /// follow-up validity window.
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionData>,
    /// Present on message-component interactions: the message the
    /// component is attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<SourceMessage>,
}

impl Interaction {
    pub fn interaction_type(&self) -> InteractionType {
        InteractionType::from_raw(self.kind)
    }
}

/// Kind-specific interaction payload.
///
/// Deliberately loose: slash commands populate `name`/`options`,
/// components and modals populate `custom_id`, modal submissions add
/// `components`, message commands add `target_id`/`resolved`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<SubmittedRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<serde_json::Value>,
}

impl InteractionData {
    /// Value of a string option, if present.
    pub fn str_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_str())
    }

    /// Value of a boolean option, if present.
    pub fn bool_option(&self, name: &str) -> Option<bool> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_bool())
    }

    /// Value of a modal text input, looked up by the input's custom id.
    pub fn modal_value(&self, custom_id: &str) -> Option<&str> {
        self.components
            .iter()
            .flat_map(|row| row.components.iter())
            .find(|field| field.custom_id == custom_id)
            .map(|field| field.value.as_str())
    }
}

/// Slash command argument as submitted by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub value: serde_json::Value,
}

/// One action row in a modal submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedRow {
    #[serde(default)]
    pub components: Vec<SubmittedField>,
}

/// One submitted text input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmittedField {
    pub custom_id: String,
    #[serde(default)]
    pub value: String,
}

/// The message a component interaction originated from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceMessage {
    /// The command invocation that produced the message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<MessageInteraction>,
}

/// Reference to the command invocation behind a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageInteraction {
    pub name: String,
}
