//! Local provider backed by a state file
//!
//! Emulates the full provider surface against `.stratus/cloud-state.json`
//! in the project root. Useful for trying out deployments, demoing the CLI
//! and exercising the reconcilers end to end without an account.

mod provider;
mod state;

pub use provider::{LocalProvider, PROVIDER_NAME};
pub use state::{AccountState, StateStore};
