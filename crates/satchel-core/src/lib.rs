//! # Satchel Core
//!
//! Envelope data model and the pure transformations behind the Satchel
//! pipeline:
//!
//! - [`status`] - status code registry and `success`/`error` derivation
//! - [`mutate`] - recursive key renaming ([`KeyMutator`])
//! - [`meta`] - dot-path metadata accumulation ([`MetaAccumulator`], [`Annotations`])
//! - [`payload`] - payload shape classification ([`Payload`], [`classify`])
//! - [`builder`] - envelope construction ([`EnvelopeBuilder`])
//! - [`envelope`] - the `{meta, data}` model ([`Envelope`])
//!
//! Nothing in this crate touches I/O; the middleware crate wires these pieces
//! into the request/response chain.

#![doc(html_root_url = "https://docs.rs/satchel-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod envelope;
mod error;
pub mod meta;
pub mod mutate;
pub mod payload;
pub mod status;

pub use builder::{EnvelopeBuilder, EnvelopeOptions};
pub use envelope::{Envelope, FieldNames, Message, MetaBlock, PaginationBlock, PaginationLinks};
pub use error::{SatchelError, SatchelResult};
pub use meta::{Annotations, MetaAccumulator};
pub use mutate::{KeyCase, KeyMutator, KeyRename};
pub use payload::{classify, Page, Paginator, Payload, ResourceCollection, ResponseKind};
pub use status::{reason_phrase, status_code, ResponseStatus};
