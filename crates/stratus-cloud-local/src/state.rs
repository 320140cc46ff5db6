//! On-disk account state
//!
//! The local provider keeps its entire simulated account in
//! `.stratus/cloud-state.json`. The document is versioned, and every save
//! first rotates the previous file to a `.backup` so a crashed write never
//! loses the last good state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stratus_cloud::{AttachedPolicy, CloudError, LogLine, Result};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".stratus";
const STATE_FILE: &str = "cloud-state.json";
const STATE_BACKUP: &str = "cloud-state.json.backup";

/// Everything the simulated account contains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountState {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub log_projects: BTreeMap<String, LogProjectRecord>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleRecord>,
    /// Custom policy documents, by policy name
    #[serde(default)]
    pub custom_policies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceRecord>,
    /// Keyed by "service/function"
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionRecord>,
    #[serde(default)]
    pub buckets: BTreeMap<String, BucketRecord>,
    #[serde(default)]
    pub api_groups: BTreeMap<String, ApiGroupRecord>,
    /// Keyed by "service/function/trigger"
    #[serde(default)]
    pub triggers: BTreeMap<String, TriggerRecord>,
    #[serde(default)]
    pub logs: Vec<LogLine>,
    #[serde(default)]
    next_id: u64,
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            log_projects: BTreeMap::new(),
            roles: BTreeMap::new(),
            custom_policies: BTreeMap::new(),
            services: BTreeMap::new(),
            functions: BTreeMap::new(),
            buckets: BTreeMap::new(),
            api_groups: BTreeMap::new(),
            triggers: BTreeMap::new(),
            logs: Vec::new(),
            next_id: 0,
        }
    }
}

impl AccountState {
    pub fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{:08}", prefix, self.next_id)
    }

    pub fn function_key(service: &str, function: &str) -> String {
        format!("{}/{}", service, function)
    }

    pub fn trigger_key(service: &str, function: &str, name: &str) -> String {
        format!("{}/{}/{}", service, function, name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogProjectRecord {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stores: BTreeMap<String, LogStoreRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStoreRecord {
    pub ttl_days: u32,
    pub shard_count: u32,
    /// Whether a full-text index has been created on this store
    #[serde(default)]
    pub indexed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub arn: String,
    pub assume_role_policy: serde_json::Value,
    #[serde(default)]
    pub attached: Vec<AttachedPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub role_arn: String,
    pub log_project: String,
    pub log_store: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub handler: String,
    pub runtime: String,
    pub memory_size: u32,
    pub timeout: u32,
    pub code_bucket: String,
    pub code_key: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRecord {
    pub region: String,
    /// Object key -> byte size
    #[serde(default)]
    pub objects: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGroupRecord {
    pub id: String,
    pub sub_domain: String,
    /// API name -> route record
    #[serde(default)]
    pub apis: BTreeMap<String, ApiRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRecord {
    pub id: String,
    pub method: String,
    pub path: String,
    pub service: String,
    pub function: String,
    /// Routes only serve traffic once deployed
    #[serde(default)]
    pub deployed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub role_arn: String,
    pub bucket: String,
    pub events: Vec<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Reads and writes the account state file under a project root
pub struct StateStore {
    root: PathBuf,
}

impl StateStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    pub async fn load(&self) -> Result<AccountState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("no account state file, starting empty");
            return Ok(AccountState::default());
        }

        let content = fs::read_to_string(&path).await?;
        let state: AccountState = serde_json::from_str(&content)?;
        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "account state version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }
        Ok(state)
    }

    pub async fn save(&self, state: &AccountState) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        let path = self.state_path();
        let backup = self.backup_path();
        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;
        tracing::debug!("saved account state to {}", path.display());
        Ok(())
    }
}
