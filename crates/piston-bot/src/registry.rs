//! Command registry
//!
//! A string-keyed lookup table from command name to handler record,
//! built once at startup and read-only afterwards. Modal and component
//! custom ids are namespaced with the owning command's name so the
//! dispatcher can recover the owner from the id alone.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use piston_types::{FileAttachment, Interaction, InteractionResponse};
use tracing::warn;

/// What a handler hands back: a wire response plus any file parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub response: InteractionResponse,
    pub files: Vec<FileAttachment>,
}

impl Reply {
    pub fn json(response: InteractionResponse) -> Self {
        Self {
            response,
            files: Vec::new(),
        }
    }

    pub fn with_files(response: InteractionResponse, files: Vec<FileAttachment>) -> Self {
        Self { response, files }
    }
}

/// A registered application command.
///
/// `run` serves the slash invocation. `modal` and `component` serve
/// interactions routed back to this command by custom-id namespace;
/// the defaults declare "no such handler", which the dispatcher turns
/// into a routing failure.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, interaction: &Interaction) -> Result<Reply>;

    async fn modal(&self, _interaction: &Interaction) -> Option<Result<Reply>> {
        None
    }

    async fn component(
        &self,
        _custom_id: &str,
        _interaction: &Interaction,
    ) -> Option<Result<Reply>> {
        None
    }
}

/// Name → command lookup table.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. Names must be unique; a duplicate replaces
    /// the earlier registration and is logged.
    pub fn register(&mut self, command: Arc<dyn Command>) {
        let name = command.name().to_string();
        if self.commands.insert(name.clone(), command).is_some() {
            warn!(command = %name, "Duplicate command registration replaced earlier handler");
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// Owner of a modal submission: the `custom_id` prefix up to the
    /// first `:` is the command name.
    pub fn for_modal(&self, custom_id: &str) -> Option<&Arc<dyn Command>> {
        let name = custom_id.split(':').next().unwrap_or(custom_id);
        self.commands.get(name)
    }

    /// Owner of a component interaction: the first whitespace token of
    /// the source message's originating command name (supports renamed
    /// and sub-command invocations).
    pub fn for_component_source(&self, command_name: &str) -> Option<&Arc<dyn Command>> {
        let name = command_name.split_whitespace().next()?;
        self.commands.get(name)
    }
}
