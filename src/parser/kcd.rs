//! KCD is an external collaborator format: this crate recognizes it but
//! carries no grammar for it. `sniff` exists only so [`crate::database::Database::add_kcd_file`]
//! can distinguish "this isn't KCD" parse errors from "KCD isn't bundled".

use crate::error::{Error, Result};

/// Confirm `source` looks like a KCD (XML) network definition.
pub fn sniff(source: &str) -> Result<()> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('<') {
        Ok(())
    } else {
        Err(Error::parse_bare("not a KCD document"))
    }
}
