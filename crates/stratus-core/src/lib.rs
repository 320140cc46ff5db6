//! Stratus core: manifest model and resource graph compiler
//!
//! Compiles a declarative service manifest into two logical graphs: the
//! *create* graph of long-lived bootstrap resources (log pipeline, exec
//! role, service, artifact bucket) and the *update* graph re-applied on
//! every deploy (artifact object, functions, invoke role, API routes,
//! triggers). The reconciler in `stratus-deploy` walks these graphs.

pub mod compiler;
pub mod error;
pub mod graph;
pub mod loader;
pub mod model;
pub mod store;

pub use compiler::{compile, compile_at, Naming};
pub use error::{CoreError, Result};
pub use graph::{GraphPair, LogicalGraph};
pub use loader::{find_project_root, load_manifest, MANIFEST_FILE};
pub use model::{Event, FunctionDef, HttpEvent, Manifest, PackageConfig, ProviderConfig, StorageEvent};
pub use store::GraphStore;
