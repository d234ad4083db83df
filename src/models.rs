use serde::{Deserialize, Serialize};

/// One entry of the Top 250 list.
///
/// Keys are written in the cache file's PascalCase; the camelCase aliases are
/// what the remote API sends.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MovieRecord {
    #[serde(rename = "IsWatched", alias = "isWatched", default)]
    pub is_watched: bool,
    #[serde(rename = "Id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Rank", alias = "rank", default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(rename = "Title", alias = "title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "FullTitle",
        alias = "fullTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub full_title: Option<String>,
    #[serde(rename = "Year", alias = "year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Image", alias = "image", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "Crew", alias = "crew", default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<String>,
    #[serde(
        rename = "IMDbRating",
        alias = "imDbRating",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub imdb_rating: Option<String>,
    #[serde(
        rename = "IMDbRatingCount",
        alias = "imDbRatingCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub imdb_rating_count: Option<String>,
}

impl MovieRecord {
    pub fn has_id(&self) -> bool {
        self.id.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
    }
}

/// Shape shared by the API response and the on-disk cache.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    #[serde(rename = "Items", alias = "items", default)]
    pub items: Vec<MovieRecord>,
    #[serde(
        rename = "ErrorMessage",
        alias = "errorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl CatalogSnapshot {
    /// Error reported by the remote side, if any.
    pub fn remote_error(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_api_camel_case_payload() {
        let value = json!({
            "items": [{
                "id": "tt0111161",
                "rank": "1",
                "title": "The Shawshank Redemption",
                "fullTitle": "The Shawshank Redemption (1994)",
                "year": "1994",
                "image": "https://example.org/shawshank.jpg",
                "crew": "Frank Darabont (dir.), Tim Robbins, Morgan Freeman",
                "imDbRating": "9.2",
                "imDbRatingCount": "2600000"
            }],
            "errorMessage": ""
        });
        let snapshot: CatalogSnapshot = serde_json::from_value(value).expect("snapshot decode");
        assert_eq!(snapshot.items.len(), 1);
        let movie = &snapshot.items[0];
        assert_eq!(movie.id.as_deref(), Some("tt0111161"));
        assert_eq!(movie.imdb_rating.as_deref(), Some("9.2"));
        assert!(!movie.is_watched);
        assert_eq!(snapshot.remote_error(), None);
    }

    #[test]
    fn writes_pascal_case_and_omits_nulls() {
        let snapshot = CatalogSnapshot {
            items: vec![MovieRecord {
                id: Some("tt1".to_string()),
                title: Some("Only Title".to_string()),
                ..Default::default()
            }],
            error_message: None,
        };
        let value = serde_json::to_value(&snapshot).expect("encode");
        assert_eq!(
            value,
            json!({
                "Items": [{ "IsWatched": false, "Id": "tt1", "Title": "Only Title" }]
            })
        );
    }

    #[test]
    fn missing_items_decode_as_empty() {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(r#"{"errorMessage":"Invalid API Key"}"#).expect("decode");
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.remote_error(), Some("Invalid API Key"));
    }

    #[test]
    fn blank_error_message_is_not_an_error() {
        let snapshot = CatalogSnapshot {
            items: Vec::new(),
            error_message: Some("   ".to_string()),
        };
        assert_eq!(snapshot.remote_error(), None);
    }

    #[test]
    fn has_id_rejects_blank_identifiers() {
        let mut movie = MovieRecord::default();
        assert!(!movie.has_id());
        movie.id = Some(" ".to_string());
        assert!(!movie.has_id());
        movie.id = Some("tt42".to_string());
        assert!(movie.has_id());
    }
}
