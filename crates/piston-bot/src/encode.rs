//! Output encoder
//!
//! Converts an execution result plus the submitted source and stdin
//! into one or two message parts, diverting anything that would push
//! `content` past Discord's 2000-character ceiling into file parts.
//! Lengths are counted in Unicode scalar values throughout.

#[path = "encode_tests.rs"]
mod encode_tests;

use piston_types::{flags, ExecSuccess, FileAttachment, ResponseData};

use crate::languages::extension;

/// Discord's hard message-content ceiling.
pub const MESSAGE_CEILING: usize = 2000;
/// Appended to truncated output; never dropped silently.
pub const TRUNCATION_MARKER: &str = "[…]";

/// Fence scaffolding: ```` ``` ```` + `\n` + ```` ``` ````, excluding
/// the language tag.
const FENCE_OVERHEAD: usize = 7;

/// Display options carried through the modal custom id.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Send the output as `output.txt` instead of inlining it.
    pub file_output: bool,
    /// Mobile-friendly mode: deliver the source as a second,
    /// fenced-text part instead of a file.
    pub mobile: bool,
    /// Ephemeral visibility was requested.
    pub hide: bool,
}

/// One outbound message: payload JSON plus file parts.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePart {
    pub body: ResponseData,
    pub files: Vec<FileAttachment>,
}

/// Encoder output: the edit of the original acknowledgement, plus an
/// optional mobile follow-up delivered after it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedReply {
    pub primary: MessagePart,
    pub followup: Option<MessagePart>,
}

/// Encode a successful execution.
pub fn encode(success: &ExecSuccess, code: &str, stdin: &str, options: EncodeOptions) -> EncodedReply {
    let joined = success.joined_output();
    let trimmed = joined.trim();

    let mut reply = format!(
        "Executed your {} ({}) program; {}",
        success.language,
        success.version,
        if joined.is_empty() {
            "no output received"
        } else {
            "output is below"
        }
    );

    let mut files = Vec::new();
    if !joined.is_empty() {
        if options.file_output {
            files.push(FileAttachment::new("output.txt", trimmed));
        } else {
            let used = reply.chars().count();
            reply.push_str(&fenced_block(trimmed, used, ""));
        }
    }

    let source_name = format!("source.{}", extension(&success.language));
    files.push(FileAttachment::new(source_name, code));

    let stdin_file = (!stdin.is_empty()).then(|| FileAttachment::new("stdin.txt", stdin));
    if let Some(file) = &stdin_file {
        files.push(file.clone());
    }

    let primary_files = if options.mobile {
        if options.file_output {
            files.first().cloned().into_iter().collect()
        } else {
            Vec::new()
        }
    } else {
        files
    };

    let primary = MessagePart {
        body: ResponseData {
            content: Some(reply),
            ..Default::default()
        },
        files: primary_files,
    };

    // The mobile part renders the source inline; only stdin remains
    // worth attaching (the source would be redundant, the output is
    // already in the primary part).
    let followup = options.mobile.then(|| MessagePart {
        body: ResponseData {
            content: Some(fenced_block(code, 0, &success.language)),
            flags: Some(if options.hide { flags::EPHEMERAL } else { 0 }),
            ..Default::default()
        },
        files: stdin_file.into_iter().collect(),
    });

    EncodedReply { primary, followup }
}

/// Render `body` as a fenced code block within the character budget
/// left after `used` characters of committed content.
///
/// An empty body renders as a single space; the platform rejects an
/// empty fence. Overflow is truncated to a true prefix and marked with
/// [`TRUNCATION_MARKER`]; the combined content length lands exactly on
/// [`MESSAGE_CEILING`].
pub fn fenced_block(body: &str, used: usize, lang: &str) -> String {
    let budget = MESSAGE_CEILING
        .saturating_sub(used)
        .saturating_sub(FENCE_OVERHEAD)
        .saturating_sub(lang.chars().count());

    let rendered = if body.chars().count() > budget {
        let kept = take_chars(body, budget.saturating_sub(TRUNCATION_MARKER.chars().count()));
        format!("{kept}{TRUNCATION_MARKER}")
    } else if body.is_empty() {
        " ".to_string()
    } else {
        body.to_string()
    };

    format!("```{lang}\n{rendered}```")
}

/// Prefix of `s` holding at most `n` characters.
fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}
