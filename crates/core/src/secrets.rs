//! Easter-egg keyword responder: free text that matched nothing else is
//! normalized and looked up in a configured phrase table.

use async_trait::async_trait;

use crate::errors::StoreError;

/// Lowercase the phrase and strip trailing `?`, `!`, `.` (and surrounding
/// whitespace) so "Hello??" matches a "hello" table entry.
pub fn normalize_phrase(text: &str) -> String {
    text.trim().trim_end_matches(['?', '!', '.']).trim_end().to_lowercase()
}

#[async_trait]
pub trait SecretPhrases: Send + Sync {
    /// Lookup against an already-normalized phrase.
    async fn response_for(&self, phrase: &str) -> Result<Option<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::normalize_phrase;

    #[test]
    fn strips_trailing_punctuation_and_lowercases() {
        assert_eq!(normalize_phrase("Hello??"), "hello");
        assert_eq!(normalize_phrase("  Who Is The Brain?! "), "who is the brain");
        assert_eq!(normalize_phrase("plain"), "plain");
    }

    #[test]
    fn interior_punctuation_is_preserved() {
        assert_eq!(normalize_phrase("what?! now."), "what?! now");
    }
}
