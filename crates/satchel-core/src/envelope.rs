//! Envelope data model.
//!
//! Every outbound response body is rewritten into an [`Envelope`]:
//!
//! ```json
//! {
//!   "meta": {
//!     "code": 200,
//!     "status": "success",
//!     "message": "OK",
//!     "pagination": { "records": 2, "page": 1, "pages": 1, "limit": 15 }
//!   },
//!   "data": [ ... ]
//! }
//! ```
//!
//! The `meta`, `data` and `pagination` tags are configurable through
//! [`FieldNames`].

use crate::error::SatchelResult;
use crate::meta::MetaAccumulator;
use crate::status::{reason_phrase, ResponseStatus};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys of the meta block that caller metadata may never overwrite.
pub const RESERVED_META_KEYS: [&str; 3] = ["code", "status", "message"];

/// Human-readable message: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    /// A single message.
    Single(String),
    /// Several messages, e.g. one per validation failure.
    Multiple(Vec<String>),
}

impl From<&str> for Message {
    fn from(message: &str) -> Self {
        Self::Single(message.to_string())
    }
}

impl From<String> for Message {
    fn from(message: String) -> Self {
        Self::Single(message)
    }
}

impl From<Vec<String>> for Message {
    fn from(messages: Vec<String>) -> Self {
        Self::Multiple(messages)
    }
}

impl From<Vec<&str>> for Message {
    fn from(messages: Vec<&str>) -> Self {
        Self::Multiple(messages.into_iter().map(str::to_string).collect())
    }
}

/// Names of the envelope's top-level and pagination tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    /// Tag of the meta block.
    pub meta: String,
    /// Tag of the data block.
    pub data: String,
    /// Tag of the pagination block inside meta.
    pub pagination: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            meta: "meta".to_string(),
            data: "data".to_string(),
            pagination: "pagination".to_string(),
        }
    }
}

/// Page navigation URLs; any of them may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationLinks {
    /// URL of the current page.
    pub current: Option<String>,
    /// URL of the previous page.
    pub previous: Option<String>,
    /// URL of the next page.
    pub next: Option<String>,
    /// URL of the last page.
    pub last: Option<String>,
}

/// Summary of a paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationBlock {
    /// Total number of records across all pages.
    pub records: u64,
    /// Current page, 1-based.
    pub page: u64,
    /// Number of pages.
    pub pages: u64,
    /// Page size.
    pub limit: u64,
    /// Navigation links, when link emission is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginationLinks>,
}

/// The `meta` section of an envelope.
///
/// `status` and `message` are derived from `code` and recomputed by
/// [`MetaBlock::set_code`], which is the only way to change the code.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaBlock {
    code: u16,
    status: ResponseStatus,
    message: Message,
    pagination: Option<PaginationBlock>,
    extra: MetaAccumulator,
}

impl MetaBlock {
    /// Creates a meta block for `code` with the registry's reason phrase.
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self {
            code,
            status: ResponseStatus::from_code(code),
            message: Message::from(reason_phrase(code)),
            pagination: None,
            extra: MetaAccumulator::new(),
        }
    }

    /// Returns the numeric code.
    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Returns the derived status.
    #[must_use]
    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns the pagination block, if any.
    #[must_use]
    pub fn pagination(&self) -> Option<&PaginationBlock> {
        self.pagination.as_ref()
    }

    /// Returns the caller-supplied metadata.
    #[must_use]
    pub fn extra(&self) -> &MetaAccumulator {
        &self.extra
    }

    /// Changes the code, recomputing status and message.
    pub fn set_code(&mut self, code: u16) {
        self.code = code;
        self.status = ResponseStatus::from_code(code);
        self.message = Message::from(reason_phrase(code));
    }

    /// Overrides the message.
    pub fn set_message(&mut self, message: impl Into<Message>) {
        self.message = message.into();
    }

    /// Sets the pagination block.
    pub fn set_pagination(&mut self, pagination: PaginationBlock) {
        self.pagination = Some(pagination);
    }

    /// Deep-merges caller metadata into the block.
    pub fn merge_extra(&mut self, extra: &MetaAccumulator) {
        self.extra.absorb(extra.clone());
    }

    /// Renders the block as a JSON map.
    ///
    /// Key order is `code`, `status`, `message`, pagination, then caller
    /// metadata. Caller metadata deep-merges into the pagination block but
    /// never replaces the three reserved keys.
    #[must_use]
    pub fn to_map(&self, names: &FieldNames) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("code".to_string(), Value::from(self.code));
        map.insert("status".to_string(), Value::from(self.status.as_str()));
        map.insert(
            "message".to_string(),
            match &self.message {
                Message::Single(message) => Value::from(message.clone()),
                Message::Multiple(messages) => Value::from(messages.clone()),
            },
        );
        if let Some(pagination) = &self.pagination {
            map.insert(names.pagination.clone(), pagination_value(pagination));
        }
        self.extra.merge_into(&mut map, &RESERVED_META_KEYS);
        map
    }
}

fn pagination_value(block: &PaginationBlock) -> Value {
    let mut map = Map::new();
    map.insert("records".to_string(), Value::from(block.records));
    map.insert("page".to_string(), Value::from(block.page));
    map.insert("pages".to_string(), Value::from(block.pages));
    map.insert("limit".to_string(), Value::from(block.limit));
    if let Some(links) = &block.links {
        let mut link_map = Map::new();
        for (name, link) in [
            ("current", &links.current),
            ("previous", &links.previous),
            ("next", &links.next),
            ("last", &links.last),
        ] {
            link_map.insert(name.to_string(), link.clone().map_or(Value::Null, Value::from));
        }
        map.insert("links".to_string(), Value::Object(link_map));
    }
    Value::Object(map)
}

/// A complete response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    meta: MetaBlock,
    data: Option<Value>,
}

impl Envelope {
    /// Creates an envelope from its parts.
    #[must_use]
    pub fn new(meta: MetaBlock, data: Option<Value>) -> Self {
        Self { meta, data }
    }

    /// Returns the meta block.
    #[must_use]
    pub fn meta(&self) -> &MetaBlock {
        &self.meta
    }

    /// Returns the data block, if present.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Renders the envelope as a JSON value using the given tag names.
    #[must_use]
    pub fn to_value(&self, names: &FieldNames) -> Value {
        let mut root = Map::new();
        root.insert(names.meta.clone(), Value::Object(self.meta.to_map(names)));
        if let Some(data) = &self.data {
            root.insert(names.data.clone(), data.clone());
        }
        Value::Object(root)
    }

    /// Serializes the envelope to JSON bytes.
    pub fn to_bytes(&self, names: &FieldNames) -> SatchelResult<Bytes> {
        let body = serde_json::to_vec(&self.to_value(names))?;
        Ok(Bytes::from(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_meta_defaults_from_code() {
        let meta = MetaBlock::new(200);
        assert_eq!(meta.code(), 200);
        assert_eq!(meta.status(), ResponseStatus::Success);
        assert_eq!(meta.message(), &Message::from("OK"));
    }

    #[test]
    fn test_set_code_recomputes_status_and_message() {
        let mut meta = MetaBlock::new(200);
        meta.set_message("custom");
        meta.set_code(404);
        assert_eq!(meta.status(), ResponseStatus::Error);
        assert_eq!(meta.message(), &Message::from("Not Found"));
    }

    #[test]
    fn test_message_serializes_untagged() {
        assert_eq!(serde_json::to_value(Message::from("one")).unwrap(), json!("one"));
        assert_eq!(
            serde_json::to_value(Message::from(vec!["a", "b"])).unwrap(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_meta_key_order() {
        let mut meta = MetaBlock::new(201);
        let mut extra = MetaAccumulator::new();
        extra.set("request_id", "abc");
        meta.merge_extra(&extra);

        let keys: Vec<String> = meta.to_map(&FieldNames::default()).keys().cloned().collect();
        assert_eq!(keys, vec!["code", "status", "message", "request_id"]);
    }

    #[test]
    fn test_reserved_keys_survive_extra() {
        let mut meta = MetaBlock::new(200);
        let mut extra = MetaAccumulator::new();
        extra.set("status", "hijacked");
        extra.set("message", "hijacked");
        meta.merge_extra(&extra);

        let map = meta.to_map(&FieldNames::default());
        assert_eq!(map["status"], json!("success"));
        assert_eq!(map["message"], json!("OK"));
    }

    #[test]
    fn test_pagination_links_render_nulls() {
        let mut meta = MetaBlock::new(200);
        meta.set_pagination(PaginationBlock {
            records: 2,
            page: 1,
            pages: 1,
            limit: 15,
            links: Some(PaginationLinks {
                current: Some("/items?page=1".to_string()),
                previous: None,
                next: None,
                last: Some("/items?page=1".to_string()),
            }),
        });

        let map = meta.to_map(&FieldNames::default());
        assert_eq!(
            map["pagination"],
            json!({
                "records": 2, "page": 1, "pages": 1, "limit": 15,
                "links": {
                    "current": "/items?page=1",
                    "previous": null,
                    "next": null,
                    "last": "/items?page=1"
                }
            })
        );
    }

    #[test]
    fn test_custom_field_names() {
        let names = FieldNames {
            meta: "_meta".to_string(),
            data: "payload".to_string(),
            pagination: "paging".to_string(),
        };
        let mut meta = MetaBlock::new(200);
        meta.set_pagination(PaginationBlock { records: 0, page: 1, pages: 1, limit: 10, links: None });

        let envelope = Envelope::new(meta, Some(json!([])));
        assert_eq!(
            envelope.to_value(&names),
            json!({
                "_meta": {
                    "code": 200, "status": "success", "message": "OK",
                    "paging": { "records": 0, "page": 1, "pages": 1, "limit": 10 }
                },
                "payload": []
            })
        );
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope = Envelope::new(MetaBlock::new(204), None);
        let bytes = envelope.to_bytes(&FieldNames::default()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("data").is_none());
        assert_eq!(value["meta"]["message"], json!("No Content"));
    }
}
