use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier issued by the remote catalog service.
///
/// Opaque: numbers and strings are both accepted and written back in the
/// form they were read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookId {
    Number(i64),
    Text(String),
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookId::Number(n) => write!(f, "{}", n),
            BookId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        BookId::Number(id)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        BookId::Text(id.to_string())
    }
}

impl BookId {
    /// Id for a URL path segment with no catalog entry to resolve against
    pub fn from_key(key: &str) -> Self {
        key.parse::<i64>()
            .map(BookId::Number)
            .unwrap_or_else(|_| BookId::Text(key.to_string()))
    }
}

// Catalog entry as returned by GET /books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl CatalogItem {
    /// Case-insensitive match against title, author or subject.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self.subject.to_lowercase().contains(needle)
    }
}

/// Static "discover" suggestion, not tied to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoverSuggestion {
    pub title: &'static str,
    pub author: &'static str,
}

pub const DISCOVER_SUGGESTIONS: [DiscoverSuggestion; 2] = [
    DiscoverSuggestion {
        title: "Database System Concepts",
        author: "Abraham Silberschatz",
    },
    DiscoverSuggestion {
        title: "Operating System Concepts",
        author: "Abraham Silberschatz",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, author: &str, subject: &str) -> CatalogItem {
        CatalogItem {
            id: BookId::from(1),
            title: title.to_string(),
            author: author.to_string(),
            subject: subject.to_string(),
            available: true,
        }
    }

    #[test]
    fn test_matches_any_descriptive_field() {
        let book = item("Dune", "Frank Herbert", "Science Fiction");
        assert!(book.matches("dune"));
        assert!(book.matches("herbert"));
        assert!(book.matches("fiction"));
        assert!(!book.matches("tolkien"));
    }

    #[test]
    fn test_deserialize_catalog_payload() {
        let raw = r#"{"id": 3, "title": "SICP", "author": "Abelson", "subject": "CS", "available": false}"#;
        let book: CatalogItem = serde_json::from_str(raw).unwrap();
        assert_eq!(book.id, BookId::from(3));
        assert!(!book.available);

        // Missing availability defaults to available
        let raw = r#"{"id": 4, "title": "TAOCP", "author": "Knuth", "subject": "CS"}"#;
        let book: CatalogItem = serde_json::from_str(raw).unwrap();
        assert!(book.available);
    }

    #[test]
    fn test_string_ids_are_kept_as_strings() {
        let raw = r#"[{"id": "a1", "title": "Dune", "author": "Frank Herbert", "subject": "SF", "available": true},
                      {"id": 2, "title": "Emma", "author": "Jane Austen", "subject": "Romance"}]"#;
        let books: Vec<CatalogItem> = serde_json::from_str(raw).unwrap();

        assert_eq!(books[0].id, BookId::from("a1"));
        assert_eq!(books[1].id, BookId::from(2));
        assert_eq!(books[0].id.to_string(), "a1");

        let written = serde_json::to_value(&books).unwrap();
        assert_eq!(written[0]["id"], "a1");
        assert_eq!(written[1]["id"], 2);
    }

    #[test]
    fn test_from_key() {
        assert_eq!(BookId::from_key("7"), BookId::from(7));
        assert_eq!(BookId::from_key("a1"), BookId::from("a1"));
    }
}
