use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Shortens `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn short_label(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some(_) => {
            let keep = max_chars.saturating_sub(1);
            let cut = text
                .char_indices()
                .nth(keep)
                .map(|(index, _)| index)
                .unwrap_or(text.len());
            Cow::Owned(format!("{}…", text[..cut].trim_end()))
        }
    }
}

/// Two values in `[-1, 1]` derived from a hash of `id`; stable across runs.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_label_keeps_short_text() {
        assert_eq!(short_label("Fall of Rome", 20), "Fall of Rome");
        assert_eq!(short_label("Fall of Rome", 8), "Fall of…");
        assert_eq!(short_label("Ægir", 3), "Æg…");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x, y) = stable_pair("Politics");
        assert_eq!((x, y), stable_pair("Politics"));
        assert!((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y));
    }
}
