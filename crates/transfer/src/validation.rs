use crate::TransferError;

/// Validates a destination folder name.
///
/// The store creates folders directly under its root, so a name must be a
/// single non-empty component made of ASCII letters, digits, `_`, `-`, or
/// CJK unified ideographs (U+4E00–U+9FA5). Anything else (separators, `..`,
/// whitespace, drive prefixes) is rejected.
pub fn validate_folder_name(name: &str) -> Result<(), TransferError> {
    if name.is_empty() {
        return Err(TransferError::InvalidFolder("empty folder name".into()));
    }

    if let Some(bad) = name.chars().find(|c| !is_allowed(*c)) {
        return Err(TransferError::InvalidFolder(format!(
            "character {bad:?} not allowed in folder name: {name}"
        )));
    }

    Ok(())
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}
