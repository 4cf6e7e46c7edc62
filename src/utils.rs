/// Shared utility functions

/// Shorten `s` to at most `limit` characters, marking the cut with "..."
pub fn truncate_ellipsis(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    let keep = limit.saturating_sub(3);
    let cut = s.char_indices().nth(keep).map(|(i, _)| i).unwrap_or(s.len());
    format!("{}...", &s[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ellipsis() {
        assert_eq!(truncate_ellipsis("short", 25), "short");
        assert_eq!(truncate_ellipsis("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_ellipsis("abcdefghijk", 10), "abcdefg...");
        let uuid = "3f0c2a4e-91b2-4d7e-8f3a-0d2c5e6b7a81";
        let cut = truncate_ellipsis(uuid, 25);
        assert_eq!(cut, "3f0c2a4e-91b2-4d7e-8f3...");
        assert_eq!(cut.chars().count(), 25);
    }

    #[test]
    fn test_truncate_ellipsis_counts_chars() {
        let s = "ééééééééééé"; // 11 chars, 22 bytes
        assert_eq!(truncate_ellipsis(s, 11), s);
        assert_eq!(truncate_ellipsis(s, 10), "ééééééé...");
    }

    #[test]
    fn test_truncate_ellipsis_mixed_widths() {
        // 1, 2, 3 and 4 byte characters; the cut lands after the 3-byte one
        assert_eq!(truncate_ellipsis("aé€😀bcd", 6), "aé€...");
        assert_eq!(truncate_ellipsis("😀😀😀😀", 3), "...");
    }
}
