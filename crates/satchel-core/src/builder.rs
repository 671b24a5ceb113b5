//! Envelope construction.
//!
//! [`EnvelopeBuilder`] turns a status code, a classified [`Payload`] and the
//! request's [`Annotations`] into an [`Envelope`]. It is pure: reading and
//! rewriting the HTTP response is the middleware stage's job.

use crate::envelope::{Envelope, FieldNames, MetaBlock, PaginationBlock, PaginationLinks};
use crate::meta::Annotations;
use crate::mutate::KeyMutator;
use crate::payload::{Paginator, Payload};
use crate::status::is_success_range;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options controlling envelope shape.
///
/// The three omission toggles are independent; `data` is dropped when any of
/// them applies. A `null` payload never produces a `data` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeOptions {
    /// Emit `pagination.links`.
    pub include_pagination_links: bool,
    /// Omit `data` when it is an empty object.
    pub omit_empty_object: bool,
    /// Omit `data` when it is an empty array.
    pub omit_empty_array: bool,
    /// Omit `data` when the final code is outside 200-299.
    pub omit_data_on_error: bool,
    /// Envelope tag names.
    pub fields: FieldNames,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            include_pagination_links: false,
            omit_empty_object: false,
            omit_empty_array: true,
            omit_data_on_error: false,
            fields: FieldNames::default(),
        }
    }
}

/// Builds envelopes from classified payloads.
///
/// # Example
///
/// ```
/// use satchel_core::builder::EnvelopeBuilder;
/// use satchel_core::meta::Annotations;
/// use satchel_core::payload::Payload;
/// use serde_json::json;
///
/// let builder = EnvelopeBuilder::default();
/// let envelope = builder.build(200, Payload::Plain(json!({ "custom": "payload" })), &Annotations::new());
///
/// assert_eq!(
///     envelope.to_value(builder.fields()),
///     json!({
///         "meta": { "code": 200, "status": "success", "message": "OK" },
///         "data": { "custom": "payload" }
///     })
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvelopeBuilder {
    options: EnvelopeOptions,
    mutator: KeyMutator,
}

impl EnvelopeBuilder {
    /// Creates a builder with the given options and no key renaming.
    #[must_use]
    pub fn new(options: EnvelopeOptions) -> Self {
        Self {
            options,
            mutator: KeyMutator::identity(),
        }
    }

    /// Sets the key mutator applied to `data`.
    #[must_use]
    pub fn with_mutator(mut self, mutator: KeyMutator) -> Self {
        self.mutator = mutator;
        self
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &EnvelopeOptions {
        &self.options
    }

    /// Returns the configured tag names.
    #[must_use]
    pub fn fields(&self) -> &FieldNames {
        &self.options.fields
    }

    /// Builds an envelope.
    ///
    /// `code` is the response's status. An error code flagged in
    /// `annotations` replaces it, and an annotated message replaces the
    /// reason phrase. Key mutation applies to `data` only.
    #[must_use]
    pub fn build(&self, code: u16, payload: Payload, annotations: &Annotations) -> Envelope {
        let mut meta = MetaBlock::new(code);
        if let Some(flagged) = annotations.code() {
            meta.set_code(flagged);
        }
        if let Some(message) = annotations.message() {
            meta.set_message(message.clone());
        }

        let data = match payload {
            Payload::Raw => None,
            Payload::Paginated(page) => {
                meta.set_pagination(self.pagination_block(&page));
                Some(Value::Array(page.into_items()))
            }
            Payload::PaginatedCollection(collection) => {
                meta.set_pagination(self.pagination_block(collection.resource()));
                Some(Value::Array(collection.into_items()))
            }
            Payload::Plain(value) => Some(value),
        }
        .map(|value| self.mutator.mutate(value));

        meta.merge_extra(annotations.meta());

        let data = data.filter(|value| !self.should_omit(meta.code(), value));
        Envelope::new(meta, data)
    }

    /// Computes the pagination block for a paginator.
    #[must_use]
    pub fn pagination_block(&self, paginator: &dyn Paginator) -> PaginationBlock {
        let links = self.options.include_pagination_links.then(|| PaginationLinks {
            current: paginator.url(paginator.current_page()),
            previous: paginator.previous_page_url(),
            next: paginator.next_page_url(),
            last: paginator.url(paginator.last_page()),
        });

        PaginationBlock {
            records: paginator.total(),
            page: paginator.current_page(),
            pages: paginator.last_page(),
            limit: paginator.per_page(),
            links,
        }
    }

    fn should_omit(&self, code: u16, data: &Value) -> bool {
        match data {
            Value::Null => return true,
            Value::Array(items) if items.is_empty() && self.options.omit_empty_array => return true,
            Value::Object(map) if map.is_empty() && self.options.omit_empty_object => return true,
            _ => {}
        }
        self.options.omit_data_on_error && !is_success_range(code)
    }
}
