//! Terraform Module Registry Protocol.
//!
//! Archives live on disk at
//! `<storage_dir>/modules/<namespace>/<name>/<system>/<version>.zip`; the
//! directory tree is the only index. The REST layer exposes discovery,
//! version listing, download redirection, archive retrieval and upload.

pub mod config;
pub mod module;

pub use config::RegistryConfig;
pub use module::{MODULE_NAME, ModuleRegistry};

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
