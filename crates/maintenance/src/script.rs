//! Helpers for the `bash -c` scripts embedded in plans.

use sha2::{Digest, Sha256};

/// Number of hex digits of a digest shown in descriptions and log lines.
pub const DIGEST_PREFIX_LEN: usize = 16;

/// Lowercase hex SHA-256 of `data`, as printed by `sha256sum`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Short form of a hex digest for human-facing text.
pub fn digest_prefix(digest: &str) -> &str {
    &digest[..DIGEST_PREFIX_LEN.min(digest.len())]
}

/// Pick a heredoc terminator that cannot appear inside `content`.
///
/// Starts from `base` and appends `_1`, `_2`, ... until the token no longer
/// occurs anywhere in the content, so the content is embedded untouched.
pub fn heredoc_terminator(content: &str, base: &str) -> String {
    let mut token = base.to_string();
    let mut suffix = 0usize;
    while content.contains(&token) {
        suffix += 1;
        token = format!("{base}_{suffix}");
    }
    token
}

/// Heredoc body: `content` followed by the terminator on its own line.
pub fn heredoc_body(content: &str, terminator: &str) -> String {
    let mut body = String::with_capacity(content.len() + terminator.len() + 2);
    body.push_str(content);
    if !content.ends_with('\n') {
        body.push('\n');
    }
    body.push_str(terminator);
    body
}
