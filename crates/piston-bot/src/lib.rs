//! # piston-bot
//!
//! Discord bot that executes code through the Piston API, driven
//! entirely by interaction webhooks.
//!
//! ## How it works
//!
//! 1. Discord sends `POST /` with `X-Signature-Ed25519` and
//!    `X-Signature-Timestamp` headers plus a JSON interaction payload.
//! 2. The server verifies the detached Ed25519 signature over
//!    `timestamp ++ body` against the application's public key.
//! 3. Verified interactions are routed through the command registry:
//!    slash invocations by command name, modal submissions by the
//!    custom-id prefix, components by the source message's originating
//!    command.
//! 4. The `run` command opens a modal collecting code, stdin, and
//!    arguments, answers the submission with a deferred
//!    acknowledgement, and delivers the execution result through the
//!    webhook follow-up API.
//! 5. All backend calls go through a serializing queue that enforces a
//!    minimum spacing between requests and retries throttled jobs.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod followup;
pub mod languages;
pub mod multipart;
pub mod piston;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod server;
pub mod signature;

pub use config::Config;
pub use server::{serve, AppState};
