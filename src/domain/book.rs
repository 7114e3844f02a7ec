use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{KitabakError, Result};

/// Reference to a piece of reading material, used to resume reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub url: String,
    pub title: String,
}

impl BookRef {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Build a reference from a URL or a local file path.
    ///
    /// Without an explicit title, one is derived from the last path segment.
    pub fn parse(location: &str, title: Option<&str>) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(KitabakError::InvalidBook("empty book location".into()));
        }

        let url = match Url::parse(location) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let path = std::path::absolute(Path::new(location))?;
                Url::from_file_path(&path).map_err(|_| {
                    KitabakError::InvalidBook(format!("not a usable path: {}", location))
                })?
            }
            Err(e) => return Err(e.into()),
        };

        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => Self::title_from_url(&url),
        };

        Ok(Self {
            url: url.to_string(),
            title,
        })
    }

    /// Rebuild from persisted columns; a reference needs at least a URL.
    pub fn from_parts(url: Option<String>, title: Option<String>) -> Option<Self> {
        let url = url.filter(|u| !u.is_empty())?;
        let title = title.filter(|t| !t.is_empty()).unwrap_or_else(|| url.clone());
        Some(Self { url, title })
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    fn title_from_url(url: &Url) -> String {
        url.path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|segment| {
                let segment = urlencoding::decode(segment)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| segment.to_string());
                match segment.rsplit_once('.') {
                    Some((stem, _)) if !stem.is_empty() => stem.to_string(),
                    _ => segment,
                }
            })
            .unwrap_or_else(|| url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_with_title() {
        let book = BookRef::parse("https://example.com/books/dune.pdf", Some("Dune")).unwrap();
        assert_eq!(book.url, "https://example.com/books/dune.pdf");
        assert_eq!(book.title, "Dune");
    }

    #[test]
    fn test_parse_url_derives_title() {
        let book = BookRef::parse("https://example.com/books/the%20hobbit.pdf", None).unwrap();
        assert_eq!(book.title, "the hobbit");

        let book = BookRef::parse("https://example.com/books/notes", Some("  ")).unwrap();
        assert_eq!(book.title, "notes");
    }

    #[test]
    fn test_derived_title_is_percent_decoded() {
        let book =
            BookRef::parse("https://example.com/books/%D9%83%D8%AA%D8%A7%D8%A8.pdf", None).unwrap();
        assert_eq!(book.title, "كتاب");

        let book = BookRef::parse("https://example.com/books/War%2C%20Peace.pdf", None).unwrap();
        assert_eq!(book.title, "War, Peace");
    }

    #[test]
    fn test_non_ascii_path_keeps_readable_title() {
        let book = BookRef::parse("كتاب.pdf", None).unwrap();
        assert!(book.url.starts_with("file://"));
        assert_eq!(book.title, "كتاب");
    }

    #[test]
    fn test_parse_relative_path_becomes_file_url() {
        let book = BookRef::parse("library/kitab.pdf", None).unwrap();
        assert!(book.url.starts_with("file://"));
        assert!(book.url.ends_with("/library/kitab.pdf"));
        assert_eq!(book.title, "kitab");
    }

    #[test]
    fn test_parse_rejects_empty_and_broken() {
        assert!(matches!(
            BookRef::parse("  ", None),
            Err(KitabakError::InvalidBook(_))
        ));
        assert!(matches!(
            BookRef::parse("http://", None),
            Err(KitabakError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_parts() {
        assert!(BookRef::from_parts(None, Some("Title".into())).is_none());
        assert!(BookRef::from_parts(Some(String::new()), None).is_none());

        let book = BookRef::from_parts(Some("https://example.com/a.pdf".into()), None).unwrap();
        assert_eq!(book.display_title(), "https://example.com/a.pdf");

        let book = BookRef::from_parts(
            Some("https://example.com/a.pdf".into()),
            Some("A".into()),
        )
        .unwrap();
        assert_eq!(book.display_title(), "A");
    }
}
