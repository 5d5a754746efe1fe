//! Text normalization for lexical indexing.

/// Split text into lowercased index terms.
///
/// A term is a maximal run of word characters (alphanumerics and underscore);
/// punctuation and whitespace act as separators. Pure and deterministic, and
/// applied identically at index time and query time -- any divergence between
/// the two silently degrades lexical recall.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            terms.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        terms.push(current);
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Hello, World! It's BM25."),
            vec!["hello", "world", "it", "s", "bm25"]
        );
    }

    #[test]
    fn test_underscore_is_a_word_character() {
        assert_eq!(tokenize("snake_case value"), vec!["snake_case", "value"]);
    }

    #[test]
    fn test_digits_are_kept() {
        assert_eq!(tokenize("section 4.2 page 19"), vec!["section", "4", "2", "page", "19"]);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("... --- !!!").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "Grace periods for premium payment";
        assert_eq!(tokenize(text), tokenize(text));
    }
}
