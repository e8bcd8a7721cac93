//! `multipart/form-data` encoding for interaction responses
//!
//! Replies that carry file attachments must go back to Discord as form
//! data with a `payload_json` part plus one named binary part per file.
//! Follow-up calls use `reqwest::multipart`; this module covers the
//! initial webhook response, which axum has no form-data builder for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use piston_types::FileAttachment;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// An encoded form-data body plus its Content-Type header value.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Build a form-data body with each file as a named part and the JSON
/// metadata as the trailing `payload_json` part.
pub fn encode(payload_json: &str, files: &[FileAttachment]) -> MultipartBody {
    let boundary = boundary();
    let mut body = Vec::new();

    for file in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{0}\"; filename=\"{0}\"\r\n",
                file.name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(file.data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"payload_json\"\r\n");
    body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
    body.extend_from_slice(payload_json.as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        body,
    }
}

/// Unique-enough boundary: wall clock nanos plus a process counter.
fn boundary() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("piston-bot-{nanos:x}-{n:x}")
}
