//! # Simbi Imaging
//!
//! Derives named size variants from a source image and publishes them to
//! durable object storage under deterministic keys, updating the owning
//! record's status and resulting URLs. Invoked in-process by the job
//! dispatcher for three call sites: processing a fresh image upload,
//! replacing a user's avatar, and re-encoding an existing image for
//! delivery efficiency.
//!
//! # Architecture: Resolve → Publish → Persist
//!
//! Every operation is the same short pipeline around an immutable byte
//! buffer:
//!
//! ```text
//! 1. Resolve   request shape        →  source bytes
//! 2. Publish   bytes × variant plan →  {variant: public URL}
//! 3. Persist   URL map + terminal status on the owning record
//! ```
//!
//! Each variant is derived independently from the original source bytes
//! (decode → resize → flatten → encode → upload), so variants can run on a
//! small worker pool with no shared mutable state, and quality loss never
//! compounds across sizes. Failure composition is all-or-nothing: one failed
//! variant fails the operation, the owning record is marked `failed`, and a
//! well-formed unsuccessful [`ops::Outcome`] — never a panic or stray `Err` —
//! goes back to the dispatcher.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pure-Rust pixel work: decode, alpha flatten, resize, crop, JPEG encode |
//! | [`plan`] | Fixed variant tables per entity kind and the deterministic key scheme |
//! | [`publish`] | The per-variant transform→encode→upload loop on a bounded pool |
//! | [`source`] | Avatar source resolution: upload record, data URI, or crop-of-current |
//! | [`store`] | Collaborator traits (object store, DB, notifier, HTTP) + `ureq` fetcher |
//! | [`ops`] | Upload / AvatarUpdate / Optimize orchestrators and the `Outcome` contract |
//! | [`config`] | Env-level options: bucket, CDN base, fetch timeout |
//!
//! # Design Decisions
//!
//! ## Fixed Delivery Format
//!
//! Every published object is JPEG at quality 85. A single fixed format keeps
//! storage keys (`{prefix}/{variant}.jpg`) deterministic, which makes
//! re-running an operation an idempotent overwrite rather than an
//! accumulation — the pipeline's concurrency-safety mechanism is
//! last-writer-wins on stable keys, not locks.
//!
//! ## Capability Traits Over Clients
//!
//! The database, object storage, upload staging area, and notification
//! channel are modeled as the small traits in [`store`]. Production wires in
//! real clients; tests wire in recording fakes. The pipeline itself never
//! sees a connection string.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling) and
//! `jpeg-encoder` — both pure Rust, statically linked, no ImageMagick or
//! libjpeg to install on worker hosts.

pub mod config;
pub mod imaging;
pub mod ops;
pub mod plan;
pub mod publish;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::PipelineConfig;
pub use ops::{ImageWorker, Outcome};
