//! # Satchel
//!
//! **Canonical JSON envelopes and key normalization for HTTP services**
//!
//! Satchel sits between an HTTP host and its handlers:
//!
//! - **Response envelope** – every JSON or plain response becomes
//!   `{ "meta": { "code", "status", "message", ... }, "data": ... }`
//! - **Pagination** – paginated payloads get a `meta.pagination` block
//! - **Key normalization** – inbound and outbound keys can be renamed to
//!   independent case conventions
//! - **Annotations** – handlers add metadata, messages and error flags while
//!   they run
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use satchel::prelude::*;
//! use satchel::config::ConfigLoader;
//!
//! # async fn run(request: Request) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("satchel.toml")?
//!     .with_env_prefix("SATCHEL")
//!     .load()?;
//! satchel::init_from_config(&config)?;
//!
//! let pipeline = satchel::pipeline_from_config(&config);
//! let _response = pipeline
//!     .process(MiddlewareContext::new(), request, |ctx, _req| {
//!         Box::pin(async move {
//!             ctx.with_message("User created");
//!             Response::empty(http::StatusCode::CREATED)
//!         })
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → ResponseEnvelope → RequestNormalizer → Handler
//!                                                     ↓
//! Response ← ResponseEnvelope ←──────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/satchel/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod setup;

// Re-export envelope model types
pub use satchel_core as core;

// Re-export pipeline types
pub use satchel_middleware as middleware;

// Re-export configuration types
pub use satchel_config as config;

// Re-export logging setup
pub use satchel_telemetry as telemetry;

pub use setup::{
    envelope_from_config, init_from_config, log_config, normalizer_from_config,
    pipeline_from_config,
};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use satchel::prelude::*;
/// ```
pub mod prelude {
    pub use satchel_core::{
        Annotations, EnvelopeBuilder, EnvelopeOptions, KeyCase, KeyMutator, Page, ResourceCollection,
        ResponseKind, SatchelError, SatchelResult,
    };

    pub use satchel_middleware::stages::{
        RequestHook, RequestNormalizerMiddleware, ResponseEnvelopeMiddleware, ResponseHook,
    };
    pub use satchel_middleware::{
        HookError, Middleware, MiddlewareContext, Next, Pipeline, Request, Response, ResponseExt,
    };

    pub use satchel_config::{ConfigError, SatchelConfig};
}
