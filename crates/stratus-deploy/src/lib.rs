//! Stratus reconciliation engine
//!
//! Given a compiled [`GraphPair`](stratus_core::GraphPair) and a
//! [`Provider`](stratus_cloud::Provider), converge remote state towards the
//! graphs: create what is missing, overwrite what is mutable, attach what
//! is detached, and report every action as a progress line. Teardown is
//! the mirror image, tolerant of already-missing resources.
//!
//! Execution is single-threaded cooperative: one resource's call is
//! awaited before the next begins, except two read/attach fan-outs that
//! touch disjoint resources (function existence checks, policy
//! attachment). There are no retries and no rollback; a failed run is
//! fixed by re-running, which converges because every step re-checks
//! remote state first.

pub mod context;
pub mod deployer;
pub mod error;
pub mod event;
pub mod function;
pub mod report;
pub mod role;
pub mod service;
pub mod teardown;

pub use context::{ConsistencyDelay, ReconcileContext};
pub use deployer::Deployer;
pub use error::{DeployError, Result};
pub use event::EventReconciler;
pub use function::FunctionReconciler;
pub use report::{ConsoleReporter, Reporter, SilentReporter};
pub use role::RoleReconciler;
pub use service::ServiceReconciler;
pub use teardown::{Teardown, TeardownFlags};
