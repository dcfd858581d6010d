//! Cross-platform base-name sanitization.

/// Characters rejected by at least one of Windows, macOS or Linux.
fn is_illegal(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Sanitizes a candidate base name (no extension).
///
/// - Replaces illegal characters and control characters with a space
/// - Collapses whitespace runs into one space and trims both ends
/// - Limits length to `max_len` chars, trimming again after the cut
pub fn sanitize_base_name(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for c in name.chars() {
        if is_illegal(c) || c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    match out.char_indices().nth(max_len) {
        Some((cut, _)) => out[..cut].trim_end().to_string(),
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_illegal_characters_with_single_spaces() {
        assert_eq!(
            sanitize_base_name(r#"a\b/c:d*e?f"g<h>i|j"#, 120),
            "a b c d e f g h i j"
        );
        assert_eq!(sanitize_base_name("What?  Really?!", 120), "What Really !");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(sanitize_base_name("  Chocolate \t\n Cake  ", 120), "Chocolate Cake");
        assert_eq!(sanitize_base_name(" :: ", 120), "");
        assert_eq!(sanitize_base_name("line\u{0}break", 120), "line break");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_base_name(&long, 120);
        assert_eq!(out.chars().count(), 120);

        let spaced = format!("{} tail", "a".repeat(119));
        assert_eq!(sanitize_base_name(&spaced, 120), "a".repeat(119));
    }

    #[test]
    fn never_contains_illegal_or_double_spaces() {
        let nasty = r#"<<Best|||Recipes>> ?? for "2024": a/b\c ** ever"#.repeat(10);
        let out = sanitize_base_name(&nasty, 120);
        assert!(out.chars().count() <= 120);
        assert!(!out.contains("  "));
        assert!(!out.chars().any(|c| r#"\/:*?"<>|"#.contains(c)));
        assert_eq!(out, out.trim());
    }
}
