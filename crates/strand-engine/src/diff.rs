//! Textual change descriptions

use similar::TextDiff;

/// Render a unified diff for a full-content edit. This is the opaque
/// per-resource description the session surfaces to clients.
pub(crate) fn unified_diff(path: &str, old: &str, new: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_carries_headers_and_hunks() {
        let rendered = unified_diff("mod.py", "x = 1\n", "x = 2\n");
        assert!(rendered.contains("--- a/mod.py"));
        assert!(rendered.contains("+++ b/mod.py"));
        assert!(rendered.contains("-x = 1"));
        assert!(rendered.contains("+x = 2"));
    }
}
