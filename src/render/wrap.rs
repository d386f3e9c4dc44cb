//! Greedy word wrap.
//!
//! Used both to pre-measure the canvas height and to draw, so the two
//! always agree on the line count.

/// Split `text` into lines no wider than `max_width`.
///
/// Words are accumulated until appending the next one would overflow; a
/// single word wider than `max_width` takes a line of its own. Runs of
/// whitespace collapse to one space.
pub fn wrap_words(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
