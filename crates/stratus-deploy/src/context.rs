//! Per-run reconciliation state

use std::collections::HashMap;
use std::time::Duration;
use stratus_cloud::{RemoteApi, RemoteApiGroup, RemoteRole, RemoteTrigger};

/// Caches of remote objects resolved during one reconciliation run.
///
/// Owned exclusively by the run that created it and discarded at run end;
/// nothing here is persisted or shared. The maps avoid redundant lookups
/// and carry resolved references (role ARNs, API ids) into dependent
/// creates.
#[derive(Debug, Default)]
pub struct ReconcileContext {
    /// Resolved exec role, set by the service phase
    pub exec_role: Option<RemoteRole>,
    /// Resolved invoke role, set by the event phase
    pub invoke_role: Option<RemoteRole>,
    /// Resolved API group, set by the event phase
    pub api_group: Option<RemoteApiGroup>,
    /// API name -> remote object; `None` records a confirmed absence so
    /// later steps know which names are new
    pub api_map: HashMap<String, Option<RemoteApi>>,
    /// Function name -> existence, filled by the concurrent fan-out
    pub function_exists: HashMap<String, bool>,
    /// Trigger name -> remote object, `None` for confirmed absence
    pub trigger_map: HashMap<String, Option<RemoteTrigger>>,
    /// Artifact bucket the object-storage client is pointed at
    pub bucket: Option<String>,
}

impl ReconcileContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// How long to wait after a role/policy mutation before dependent calls.
///
/// Role changes propagate asynchronously in the underlying providers; the
/// reconciler bridges that window with a flat wait, applied through
/// `Provider::sleep`. Zero in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyDelay(pub Duration);

impl ConsistencyDelay {
    pub fn none() -> Self {
        Self(Duration::ZERO)
    }
}

impl Default for ConsistencyDelay {
    fn default() -> Self {
        Self(Duration::from_secs(10))
    }
}
