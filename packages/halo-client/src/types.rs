use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Envelope wrapping every Halo admin API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Error body returned alongside non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub rpp: i64,
}

/// Entry of the admin post listing. Only the title is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A post as returned by import and accepted by update.
///
/// Fields this crate does not interpret are kept in `extra` and sent back
/// verbatim on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePost {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Uploaded attachment metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server environment, used for version checks.
#[derive(Debug, Clone, Deserialize)]
pub struct Environment {
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_post_keeps_unknown_fields_on_update() {
        let body = r#"{
            "id": 42,
            "title": "World",
            "status": "PUBLISHED",
            "slug": "world",
            "originalContent": "![a](images/cover.jpg)",
            "thumbnail": null,
            "categoryIds": [1, 2]
        }"#;

        let mut post: RemotePost = serde_json::from_str(body).unwrap();
        assert_eq!(post.id, 42);
        assert_eq!(post.thumbnail, None);
        assert_eq!(post.content, None);

        post.content = Some("rewritten".into());
        post.thumbnail = Some("/upload/cover.jpg".into());

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["status"], "PUBLISHED");
        assert_eq!(json["categoryIds"], serde_json::json!([1, 2]));
        assert_eq!(json["content"], "rewritten");
        assert_eq!(json["thumbnail"], "/upload/cover.jpg");
    }

    #[test]
    fn test_category_parent_defaults_to_root() {
        let body = r#"{"id": 3, "name": "Rust", "slug": "rust", "description": ""}"#;
        let category: RemoteCategory = serde_json::from_str(body).unwrap();

        assert_eq!(category.parent_id, 0);
        assert!(category.extra.contains_key("description"));

        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["parentId"], 0);
    }

    #[test]
    fn test_post_listing_envelope() {
        let body = r#"{
            "status": 200,
            "message": "OK",
            "data": {"content": [{"title": "Hello", "id": 1}], "total": 1, "page": 0, "rpp": 1000}
        }"#;
        let resp: ApiResponse<Page<PostSummary>> = serde_json::from_str(body).unwrap();

        assert_eq!(resp.data.content.len(), 1);
        assert_eq!(resp.data.content[0].title, "Hello");
    }
}
