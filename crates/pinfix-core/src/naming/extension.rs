//! File extension from an image URL path.

/// Lowercased extension of the URL path's last segment when it is 2–5 ASCII
/// alphanumerics (e.g. `jpg`, `webp`). `None` if the URL cannot be parsed or has none.
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if (2..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            extension_from_url("https://i.pinimg.com/originals/ab/cd/ef123456.jpg").as_deref(),
            Some("jpg")
        );
        assert_eq!(
            extension_from_url("https://i.pinimg.com/736x/a/b.WEBP").as_deref(),
            Some("webp")
        );
    }

    #[test]
    fn with_query() {
        assert_eq!(
            extension_from_url("https://i.pinimg.com/a/b.png?fit=crop").as_deref(),
            Some("png")
        );
    }

    #[test]
    fn missing_or_odd_extensions() {
        assert_eq!(extension_from_url("https://i.pinimg.com/736x/a/b"), None);
        assert_eq!(extension_from_url("https://i.pinimg.com/a.b/c"), None);
        assert_eq!(extension_from_url("https://i.pinimg.com/a/b.toolong"), None);
        assert_eq!(extension_from_url("https://i.pinimg.com/a/b.j"), None);
        assert_eq!(extension_from_url("https://i.pinimg.com/a/b.j-g"), None);
        assert_eq!(extension_from_url("not a url"), None);
    }
}
