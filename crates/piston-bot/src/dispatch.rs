//! Interaction dispatcher
//!
//! State machine over the interaction kind: answer pings directly,
//! route everything else through the registry, and convert handler
//! results, or their absence, into a wire reply. Handler errors are
//! absorbed here; nothing a handler does may crash the process.

#[path = "dispatch_tests.rs"]
mod dispatch_tests;

use axum::http::StatusCode;
use piston_types::{Interaction, InteractionResponse, InteractionType};
use tracing::{error, warn};

use crate::registry::{Registry, Reply};

/// Outcome of dispatching one verified request body.
#[derive(Debug)]
pub enum WireReply {
    /// 200 with a JSON or multipart payload.
    Reply(Reply),
    /// Bare status, no user-visible body.
    Status(StatusCode),
}

/// Dispatch a verified raw body. Signature checking has already
/// happened; this is the first point where the JSON is trusted.
pub async fn dispatch(registry: &Registry, body: &[u8]) -> WireReply {
    let interaction: Interaction = match serde_json::from_slice(body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!(error = %e, "Unparseable interaction body");
            return WireReply::Status(StatusCode::BAD_REQUEST);
        }
    };

    match interaction.interaction_type() {
        InteractionType::Ping => WireReply::Reply(Reply::json(InteractionResponse::pong())),

        InteractionType::ApplicationCommand => {
            let Some(name) = interaction.data.as_ref().and_then(|d| d.name.clone()) else {
                warn!("Application command without a name");
                return WireReply::Status(StatusCode::BAD_REQUEST);
            };
            let Some(command) = registry.by_name(&name) else {
                warn!(command = %name, "No handler registered for command");
                return WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR);
            };
            finish(command.run(&interaction).await, &name)
        }

        InteractionType::MessageComponent => {
            let Some(custom_id) = interaction.data.as_ref().and_then(|d| d.custom_id.clone())
            else {
                warn!("Component interaction without a custom id");
                return WireReply::Status(StatusCode::BAD_REQUEST);
            };
            let Some(source_name) = interaction
                .message
                .as_ref()
                .and_then(|m| m.interaction.as_ref())
                .map(|i| i.name.clone())
            else {
                warn!(custom_id = %custom_id, "Component without an originating command");
                return WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR);
            };
            let Some(command) = registry.for_component_source(&source_name) else {
                warn!(source = %source_name, "No command owns this component");
                return WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR);
            };
            match command.component(&custom_id, &interaction).await {
                Some(result) => finish(result, command.name()),
                None => {
                    warn!(custom_id = %custom_id, command = command.name(), "Unhandled component id");
                    WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }

        InteractionType::ModalSubmit => {
            let Some(custom_id) = interaction.data.as_ref().and_then(|d| d.custom_id.clone())
            else {
                warn!("Modal submission without a custom id");
                return WireReply::Status(StatusCode::BAD_REQUEST);
            };
            let Some(command) = registry.for_modal(&custom_id) else {
                warn!(custom_id = %custom_id, "No command owns this modal");
                return WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR);
            };
            match command.modal(&interaction).await {
                Some(result) => finish(result, command.name()),
                None => {
                    warn!(custom_id = %custom_id, command = command.name(), "Command has no modal handler");
                    WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR)
                }
            }
        }

        // Autocomplete is not served by this bot.
        InteractionType::Autocomplete => WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR),

        InteractionType::Unknown => {
            warn!(kind = interaction.kind, "Unknown interaction type");
            WireReply::Status(StatusCode::BAD_REQUEST)
        }
    }
}

fn finish(result: anyhow::Result<Reply>, command: &str) -> WireReply {
    match result {
        Ok(reply) => WireReply::Reply(reply),
        Err(e) => {
            error!(command = %command, error = %e, "Handler failed");
            WireReply::Status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
