//! Greedy word wrap against host-measured text widths.

/// Wrap `text` so every line measures at most `max_width`. Words are
/// accumulated greedily; explicit newlines always break; a single word
/// wider than `max_width` gets its own line rather than being split.
pub fn wrap_text(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line = word.to_owned();
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure(&candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line = word.to_owned();
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10px per character keeps the arithmetic obvious.
    fn measure(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn test_wraps_at_max_width() {
        let lines = wrap_text("one two three four", 90.0, measure);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_explicit_newlines_kept() {
        let lines = wrap_text("alpha\n\nbeta gamma", 200.0, measure);
        assert_eq!(lines, vec!["alpha", "", "beta gamma"]);
    }

    #[test]
    fn test_overlong_word_gets_own_line() {
        let lines = wrap_text("hi incomprehensibilities yo", 80.0, measure);
        assert_eq!(lines, vec!["hi", "incomprehensibilities", "yo"]);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(wrap_text("", 100.0, measure), vec![String::new()]);
    }
}
