//! Pasteburn one-time secret store.
//!
//! Encrypts documents with AES-256-CBC under caller-supplied keys, persists
//! the ciphertext in an embedded transactional store, and deletes each copy
//! in the same transaction that reads it.
//!
//! # Architecture
//!
//! ```text
//! api (validated request bodies)
//!   │
//!   ▼
//! DocumentService ──► Document / MultiDoc ──► pasteburn_crypto
//!   │
//!   ▼
//! Storage (RedbStorage | MemoryStorage | ChaoticStorage)
//! ```
//!
//! # Components
//!
//! - [`DocumentService`]: create/read façade, implements [`SecretStore`]
//! - [`Document`], [`MultiDoc`]: the document model
//! - [`Storage`]: read-and-delete persistence contract
//! - [`Environment`]: injectable randomness ([`SystemEnv`] in production)
//!
//! Keys are never persisted and never logged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
mod document;
mod env;
mod error;
mod service;
mod sharing;
pub mod storage;

pub use document::{Document, MultiDoc, Share};
pub use env::{Environment, SystemEnv};
pub use error::DocumentError;
pub use pasteburn_crypto::SecretKey;
pub use service::{DocumentService, SecretStore};
pub use storage::{ChaoticStorage, MemoryStorage, RedbStorage, Storage, StorageError};
