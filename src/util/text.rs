const MARKDOWN_SPECIAL: &[char] = &[
    '*', '_', '`', '[', ']', '(', ')', '#', '+', '-', '.', '!', '|',
];

pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Cut `text` to at most `max_chars` characters. When a cut happens and the
/// budget allows it, the last three characters become `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }

    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Wrap each label in backticks, space separated.
pub fn format_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|l| format!("`{}`", l.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
