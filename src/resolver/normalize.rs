//! Lexical normalization for open-domain queries

/// Wake word and filler phrases removed before a knowledge lookup
const FILLER_PHRASES: &[&str] = &[
    "jarvis",
    "what is",
    "who is",
    "tell me about",
    "explain",
    "define",
    "how to",
];

/// Lower-case the text, strip every filler phrase and trim
pub fn normalize_query(text: &str) -> String {
    let mut query = text.to_lowercase();
    for phrase in FILLER_PHRASES {
        query = query.replace(phrase, "");
    }
    query.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fillers() {
        assert_eq!(normalize_query("Jarvis what is Rust"), "rust");
        assert_eq!(normalize_query("tell me about alan turing"), "alan turing");
        assert_eq!(normalize_query("  who is Ada Lovelace  "), "ada lovelace");
    }

    #[test]
    fn test_only_fillers_becomes_empty() {
        assert_eq!(normalize_query("jarvis explain"), "");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(normalize_query("photosynthesis"), "photosynthesis");
    }
}
