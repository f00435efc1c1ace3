//! Text detection for the sampling decision.
//!
//! Text files are hashed in full: small edits in the middle of a text file
//! are common and sampling would miss them.

/// Bytes inspected when deciding whether a file looks like text
pub const PEEK_SIZE: usize = 1024;

/// Returns true if `prefix` looks like human-readable text.
///
/// The prefix must be valid UTF-8 (a multi-byte sequence cut off by the end
/// of the window is tolerated) and contain no control characters other than
/// tab, newline, carriage return and form feed.
pub fn looks_like_text(prefix: &[u8]) -> bool {
    let prefix = &prefix[..prefix.len().min(PEEK_SIZE)];
    let valid = match std::str::from_utf8(prefix) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => {
            // Truncated trailing sequence
            match std::str::from_utf8(&prefix[..e.valid_up_to()]) {
                Ok(s) => s,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    valid
        .chars()
        .all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r' | '\x0c'))
}
