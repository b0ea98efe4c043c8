//! Rendering of the title assignment injected into a page.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

const PREFIX: &str = "document.title = ";
const SUFFIX: &str = ";";

// ============================================================================
// Script Rendering
// ============================================================================

/// Renders the statement that sets `document.title` to `title`.
///
/// The title is embedded as a JSON string literal, which is also a valid
/// JavaScript string literal, so quotes, backslashes and control
/// characters cannot escape the statement.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the title cannot be
/// serialized.
pub fn set_title_script(title: &str) -> Result<String> {
    let literal = serde_json::to_string(title)?;
    Ok(format!("{PREFIX}{literal}{SUFFIX}"))
}

/// Recovers the title from a statement produced by [`set_title_script`].
///
/// Returns `None` for any other script.
#[must_use]
pub fn parse_set_title_script(code: &str) -> Option<String> {
    let literal = code.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    serde_json::from_str(literal).ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_title() {
        let script = set_title_script("¹Example").expect("render");
        assert_eq!(script, r#"document.title = "¹Example";"#);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let script = set_title_script(r#"²Say "hi"; alert(1)//"#).expect("render");
        assert_eq!(script, r#"document.title = "²Say \"hi\"; alert(1)//";"#);
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let script = set_title_script("³line\nbreak\\").expect("render");
        assert_eq!(script, r#"document.title = "³line\nbreak\\";"#);
    }

    #[test]
    fn test_parse_recovers_title() {
        let title = "⁴Tricky \"title\" with \\ and \t tab";
        let script = set_title_script(title).expect("render");
        assert_eq!(parse_set_title_script(&script).as_deref(), Some(title));
    }

    #[test]
    fn test_parse_rejects_foreign_script() {
        assert_eq!(parse_set_title_script("window.close();"), None);
        assert_eq!(parse_set_title_script("document.title = 1;"), None);
    }
}
