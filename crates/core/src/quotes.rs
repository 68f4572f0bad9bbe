//! Rotating header quotes.

/// Motivational lines cycled through the header panel.
pub const QUOTES: &[&str] = &[
    "Every step you take brings peace to your mind and strength to your soul.",
    "Walking is the best possible exercise. Habituate yourself to walk very far.",
    "An early-morning walk is a blessing for the whole day.",
    "All truly great thoughts are conceived while walking.",
    "The journey of a thousand miles begins with a single step.",
];

/// Quote for the given rotation index, wrapping around the list.
pub fn rotating(index: usize) -> &'static str {
    QUOTES[index % QUOTES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps() {
        assert_eq!(rotating(0), QUOTES[0]);
        assert_eq!(rotating(QUOTES.len()), QUOTES[0]);
        assert_eq!(rotating(QUOTES.len() + 2), QUOTES[2]);
    }
}
