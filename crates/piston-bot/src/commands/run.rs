//! The `run` command: execute arbitrary code via the Piston backend
//!
//! Three-stage lifecycle: the slash invocation validates the language
//! and opens a modal; the modal submission answers with a deferred
//! acknowledgement and detaches the real work; the detached task runs
//! the job through the execution queue, encodes the result, and edits
//! the acknowledgement (plus one mobile follow-up when requested).

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use piston_types::{
    text_input_style, ActionRow, ExecRequest, Interaction, InteractionResponse, ResponseData,
    TextInput,
};
use tracing::error;

use crate::encode::{encode, EncodeOptions};
use crate::error::Error;
use crate::followup::WebhookClient;
use crate::languages::LanguageCatalog;
use crate::queue::ExecQueue;
use crate::registry::{Command, Reply};
use crate::runner;

const NAME: &str = "run";
const UNSUPPORTED_LANGUAGE: &str = "The language provided is not supported.";
const BACKEND_UNREACHABLE: &str = "The execution service could not be reached.";

pub struct RunCommand {
    catalog: Arc<LanguageCatalog>,
    queue: Arc<ExecQueue>,
    webhook: Arc<WebhookClient>,
}

impl RunCommand {
    pub fn new(
        catalog: Arc<LanguageCatalog>,
        queue: Arc<ExecQueue>,
        webhook: Arc<WebhookClient>,
    ) -> Self {
        Self {
            catalog,
            queue,
            webhook,
        }
    }

    fn modal_response(language: &str, file: bool, mobile: bool, hide: bool) -> Reply {
        let flag = |b: bool| if b { "1" } else { "" };
        Reply::json(InteractionResponse::modal(ResponseData {
            custom_id: Some(format!(
                "{NAME}:{language}:{}:{}:{}",
                flag(file),
                flag(mobile),
                flag(hide)
            )),
            title: Some(format!("Execute {language} program")),
            components: vec![
                ActionRow::text_input(
                    TextInput::new("code", text_input_style::PARAGRAPH, "Script", true)
                        .placeholder("Code used for execution"),
                ),
                ActionRow::text_input(
                    TextInput::new("stdin", text_input_style::PARAGRAPH, "Stdin", false)
                        .placeholder("Text to pass as standard input to the program"),
                ),
                ActionRow::text_input(
                    TextInput::new("args", text_input_style::SHORT, "Args", false)
                        .placeholder("Arguments to pass to the program"),
                ),
            ],
            ..Default::default()
        }))
    }
}

#[async_trait]
impl Command for RunCommand {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self, interaction: &Interaction) -> Result<Reply> {
        let data = interaction.data.as_ref().context("missing command data")?;
        let language = data
            .str_option("language")
            .context("missing language option")?
            .to_lowercase();
        let file = data.bool_option("file-output").unwrap_or(false);
        let mobile = data.bool_option("mobile-source-output").unwrap_or(false);
        let hide = data.bool_option("hide").unwrap_or(false);

        // Pre-check: unsupported languages never reach the queue.
        if !self.catalog.supports(&language).await {
            return Ok(Reply::json(InteractionResponse::ephemeral(
                UNSUPPORTED_LANGUAGE,
            )));
        }

        Ok(Self::modal_response(&language, file, mobile, hide))
    }

    async fn modal(&self, interaction: &Interaction) -> Option<Result<Reply>> {
        let data = interaction.data.as_ref()?;
        let custom_id = data.custom_id.as_deref()?;

        let parts: Vec<&str> = custom_id.split(':').collect();
        let language = parts.get(1).copied().unwrap_or_default().to_string();
        let options = EncodeOptions {
            file_output: parts.get(2).is_some_and(|p| !p.is_empty()),
            mobile: parts.get(3).is_some_and(|p| !p.is_empty()),
            hide: parts.get(4).is_some_and(|p| !p.is_empty()),
        };

        let code = data.modal_value("code").unwrap_or_default().to_string();
        let stdin = data.modal_value("stdin").unwrap_or_default().to_string();
        let args = split_args(data.modal_value("args").unwrap_or_default());

        let request = ExecRequest::new(&language, &code, args, &stdin);
        runner::spawn(deliver(
            self.queue.clone(),
            self.webhook.clone(),
            interaction.token.clone(),
            request,
            code,
            stdin,
            options,
        ));

        Some(Ok(Reply::json(InteractionResponse::deferred(options.hide))))
    }
}

/// The deferred half: exactly one edit of the acknowledgement (plus the
/// optional mobile follow-up) once the queue yields a terminal outcome.
async fn deliver(
    queue: Arc<ExecQueue>,
    webhook: Arc<WebhookClient>,
    token: String,
    request: ExecRequest,
    code: String,
    stdin: String,
    options: EncodeOptions,
) -> crate::error::Result<()> {
    match queue.submit(&request).await {
        Ok(success) => {
            let encoded = encode(&success, &code, &stdin, options);
            webhook
                .edit_original(&token, &encoded.primary.body, &encoded.primary.files)
                .await?;
            if let Some(followup) = encoded.followup {
                webhook
                    .create_followup(&token, &followup.body, &followup.files)
                    .await?;
            }
            Ok(())
        }
        Err(Error::Backend(message)) => {
            webhook
                .edit_original(&token, &plain_message(message), &[])
                .await
        }
        Err(e) => {
            error!(error = %e, "Execution pipeline failed");
            webhook
                .edit_original(&token, &plain_message(BACKEND_UNREACHABLE.to_string()), &[])
                .await
        }
    }
}

fn plain_message(content: String) -> ResponseData {
    ResponseData {
        content: Some(content),
        ..Default::default()
    }
}

/// Split a command-line string into arguments: whitespace-delimited
/// tokens, with double-quoted segments (delimited by whitespace or the
/// string boundary) taken whole and `\"` unescaped inside them.
fn split_args(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut args = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        if chars[i] == '"' {
            if let Some(end) = closing_quote(&chars, i) {
                let inner: String = chars[i + 1..end].iter().collect();
                args.push(inner.replace("\\\"", "\""));
                i = end + 1;
                continue;
            }
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        args.push(chars[start..i].iter().collect());
    }

    args
}

/// Index of the quote closing the one at `open`: unescaped, and
/// followed by whitespace or the end of input.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let mut escaped = false;
    for (offset, &c) in chars[open + 1..].iter().enumerate() {
        let index = open + 1 + offset;
        if c == '"' && !escaped {
            let at_boundary = chars.get(index + 1).is_none_or(|next| next.is_whitespace());
            if at_boundary {
                return Some(index);
            }
        }
        escaped = c == '\\' && !escaped;
    }
    None
}
