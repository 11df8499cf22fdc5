//! SYM is an external collaborator format: this crate recognizes it and
//! enforces the version gate, but carries no grammar for it. Only SYM 6.0
//! is recognized as "this crate could have a parser for this, someday";
//! anything else is rejected outright as an unsupported SYM version.

use crate::error::{Error, Result};

const SUPPORTED_VERSION: &str = "6.0";

/// Confirm `source` looks like a PCAN-View `.sym` file declaring version
/// 6.0. Other declared versions are rejected with a version-specific
/// message rather than silently accepted.
pub fn sniff(source: &str) -> Result<()> {
    let version = source
        .lines()
        .find_map(|line| line.trim().strip_prefix("FormatVersion="))
        .ok_or_else(|| Error::parse_bare("missing FormatVersion= header"))?;
    if version.trim() == SUPPORTED_VERSION {
        Ok(())
    } else {
        Err(Error::parse_bare(format!(
            "unsupported SYM version '{}': only {SUPPORTED_VERSION} is recognized",
            version.trim()
        )))
    }
}
