//! Text sanitation applied before text reaches an engine and after it comes back.
//!
//! Both engines take text through C-string style APIs: an embedded NUL either truncates the
//! value (SQLite) or is rejected outright (PostgreSQL), and ill-formed UTF-8 stored in a SQLite
//! TEXT column would otherwise poison the decoded row. Sanitizing drops offending bytes instead
//! of substituting U+FFFD, so the output only ever contains characters the caller supplied.

use std::borrow::Cow;

/// True when `bytes` is well-formed UTF-8 with no NUL bytes.
#[must_use]
pub fn is_clean(bytes: &[u8]) -> bool {
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}

/// Return `bytes` as text with invalid UTF-8 sequences and NUL bytes removed.
///
/// Borrows when nothing had to be removed.
#[must_use]
pub fn sanitize_text(bytes: &[u8]) -> Cow<'_, str> {
    if !bytes.contains(&0)
        && let Ok(text) = std::str::from_utf8(bytes)
    {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.extend(chunk.valid().chars().filter(|c| *c != '\0'));
    }
    Cow::Owned(out)
}

/// Owned variant used where the engine needs to take the buffer.
#[must_use]
pub fn sanitize_owned(bytes: &[u8]) -> String {
    sanitize_text(bytes).into_owned()
}
