//! Service manifest model

mod event;
mod manifest;

pub use event::{Event, HttpEvent, StorageEvent};
pub use manifest::{FunctionDef, Manifest, PackageConfig, ProviderConfig};
