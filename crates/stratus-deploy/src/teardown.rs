//! Teardown: creation mirrored in reverse dependency order
//!
//! Every phase checks existence before deleting, so a teardown tolerates
//! both an empty account and a half-finished previous teardown. Each
//! guarded resource ends in exactly one of two states: deleted, or skipped
//! with its own log line. Empty phases say so ("No X to remove") instead
//! of silently no-op-ing; operators rely on those lines.

use crate::error::{DeployError, Result};
use crate::report::{check, Reporter};
use stratus_cloud::{Provider, RoleSpec};
use stratus_core::GraphPair;

/// Gates for the long-lived resources `remove` keeps by default
#[derive(Debug, Clone, Copy, Default)]
pub struct TeardownFlags {
    /// Also detach and delete the exec and invoke roles
    pub remove_roles: bool,
    /// Also delete the log index, store and project
    pub remove_logstore: bool,
}

pub struct Teardown<'a> {
    provider: &'a dyn Provider,
    reporter: &'a dyn Reporter,
}

impl<'a> Teardown<'a> {
    pub fn new(provider: &'a dyn Provider, reporter: &'a dyn Reporter) -> Self {
        Self { provider, reporter }
    }

    pub async fn run(&self, pair: &GraphPair, flags: TeardownFlags) -> Result<()> {
        self.remove_apis(pair).await?;
        self.remove_triggers(pair).await?;

        if flags.remove_roles {
            if let Some(spec) = pair.update.roles().into_iter().next() {
                self.remove_role(spec).await?;
            }
        }

        self.remove_functions_and_service(pair).await?;

        if flags.remove_roles {
            if let Some(spec) = pair.create.roles().into_iter().next() {
                self.remove_role(spec).await?;
            }
        }

        self.remove_artifacts(pair).await?;

        if flags.remove_logstore {
            self.remove_log_pipeline(pair).await?;
        }

        Ok(())
    }

    /// Abolish every deployed API, delete every API, then the group.
    async fn remove_apis(&self, pair: &GraphPair) -> Result<()> {
        let Some(group_spec) = pair.update.api_group() else {
            self.reporter.line("No apis to remove");
            return Ok(());
        };

        let group = check(
            self.reporter,
            self.provider.get_api_group(&group_spec.name).await,
            "look up",
            "api group",
            &group_spec.name,
        )?;
        let Some(group) = group else {
            self.reporter.line("No apis to remove");
            self.reporter
                .line(&format!("Skip removing api group {}", group_spec.name));
            return Ok(());
        };

        let apis = check(
            self.reporter,
            self.provider.list_apis(&group.id).await,
            "list apis in",
            "api group",
            &group.name,
        )?;
        if apis.is_empty() {
            self.reporter.line("No apis to remove");
        } else {
            for api in &apis {
                self.reporter
                    .line(&format!("Abolishing api {}...", api.name));
                check(
                    self.reporter,
                    self.provider.abolish_api(&group.id, &api.id).await,
                    "abolish",
                    "api",
                    &api.name,
                )?;
                self.reporter.line(&format!("Abolished api {}", api.name));
            }
            for api in &apis {
                self.reporter
                    .line(&format!("Removing api {}...", api.name));
                check(
                    self.reporter,
                    self.provider.delete_api(&group.id, &api.id).await,
                    "remove",
                    "api",
                    &api.name,
                )?;
                self.reporter.line(&format!("Removed api {}", api.name));
            }
        }

        self.reporter
            .line(&format!("Removing api group {}...", group.name));
        check(
            self.reporter,
            self.provider.delete_api_group(&group.name).await,
            "remove",
            "api group",
            &group.name,
        )?;
        self.reporter
            .line(&format!("Removed api group {}", group.name));
        Ok(())
    }

    async fn remove_triggers(&self, pair: &GraphPair) -> Result<()> {
        let mut found = Vec::new();
        for spec in pair.update.triggers() {
            let existing = check(
                self.reporter,
                self.provider
                    .get_trigger(&spec.service, &spec.function, &spec.name)
                    .await,
                "look up",
                "trigger",
                &spec.name,
            )?;
            if existing.is_some() {
                found.push(spec);
            }
        }

        if found.is_empty() {
            self.reporter.line("No triggers to remove");
            return Ok(());
        }
        for spec in found {
            self.reporter
                .line(&format!("Removing trigger {}...", spec.name));
            check(
                self.reporter,
                self.provider
                    .delete_trigger(&spec.service, &spec.function, &spec.name)
                    .await,
                "remove",
                "trigger",
                &spec.name,
            )?;
            self.reporter
                .line(&format!("Removed trigger {}", spec.name));
        }
        Ok(())
    }

    /// Detach every attached policy, then delete the role. Skipped entirely
    /// if the role does not exist.
    async fn remove_role(&self, spec: &RoleSpec) -> Result<()> {
        let existing = check(
            self.reporter,
            self.provider.get_role(&spec.name).await,
            "look up",
            "role",
            &spec.name,
        )?;
        if existing.is_none() {
            self.reporter
                .line(&format!("Skip removing role {}", spec.name));
            return Ok(());
        }

        let attached = check(
            self.reporter,
            self.provider.list_role_policies(&spec.name).await,
            "list policies for",
            "role",
            &spec.name,
        )?;
        for policy in &attached {
            self.reporter.line(&format!(
                "Detaching policy {} from role {}...",
                policy.name, spec.name
            ));
            check(
                self.reporter,
                self.provider
                    .detach_policy(&spec.name, &policy.name, policy.kind)
                    .await,
                "detach",
                "policy",
                &policy.name,
            )?;
            self.reporter.line(&format!(
                "Detached policy {} from role {}",
                policy.name, spec.name
            ));
        }

        self.reporter
            .line(&format!("Removing role {}...", spec.name));
        check(
            self.reporter,
            self.provider.delete_role(&spec.name).await,
            "remove",
            "role",
            &spec.name,
        )?;
        self.reporter.line(&format!("Removed role {}", spec.name));
        Ok(())
    }

    async fn remove_functions_and_service(&self, pair: &GraphPair) -> Result<()> {
        let service = pair
            .create
            .service()
            .ok_or(DeployError::MissingResource("service"))?;

        let functions = check(
            self.reporter,
            self.provider.list_functions(&service.name).await,
            "list functions of",
            "service",
            &service.name,
        )?;
        if functions.is_empty() {
            self.reporter.line("No functions to remove");
        } else {
            for function in &functions {
                self.reporter
                    .line(&format!("Removing function {}...", function.name));
                check(
                    self.reporter,
                    self.provider
                        .delete_function(&service.name, &function.name)
                        .await,
                    "remove",
                    "function",
                    &function.name,
                )?;
                self.reporter
                    .line(&format!("Removed function {}", function.name));
            }
        }

        let existing = check(
            self.reporter,
            self.provider.get_service(&service.name).await,
            "look up",
            "service",
            &service.name,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Removing service {}...", service.name));
            check(
                self.reporter,
                self.provider.delete_service(&service.name).await,
                "remove",
                "service",
                &service.name,
            )?;
            self.reporter
                .line(&format!("Removed service {}", service.name));
        } else {
            self.reporter
                .line(&format!("Skip removing service {}", service.name));
        }
        Ok(())
    }

    /// Empty the deployment's artifact prefix, then delete the bucket.
    async fn remove_artifacts(&self, pair: &GraphPair) -> Result<()> {
        let bucket = pair
            .create
            .bucket()
            .ok_or(DeployError::MissingResource("bucket"))?;
        let service = pair
            .create
            .service()
            .ok_or(DeployError::MissingResource("service"))?;

        let existing = check(
            self.reporter,
            self.provider.get_bucket(&bucket.name).await,
            "look up",
            "bucket",
            &bucket.name,
        )?;
        let Some(_) = existing else {
            self.reporter.line("No artifact objects to remove");
            self.reporter
                .line(&format!("Skip removing bucket {}", bucket.name));
            return Ok(());
        };

        let prefix = format!("artifacts/{}/", service.name);
        let keys = check(
            self.reporter,
            self.provider.list_objects(&bucket.name, &prefix).await,
            "list objects in",
            "bucket",
            &bucket.name,
        )?;
        if keys.is_empty() {
            self.reporter.line("No artifact objects to remove");
        } else {
            self.reporter
                .line(&format!("Removing {} artifact objects...", keys.len()));
            check(
                self.reporter,
                self.provider.delete_objects(&bucket.name, &keys).await,
                "remove objects from",
                "bucket",
                &bucket.name,
            )?;
            self.reporter
                .line(&format!("Removed {} artifact objects", keys.len()));
        }

        self.reporter
            .line(&format!("Removing bucket {}...", bucket.name));
        check(
            self.reporter,
            self.provider.delete_bucket(&bucket.name).await,
            "remove",
            "bucket",
            &bucket.name,
        )?;
        self.reporter
            .line(&format!("Removed bucket {}", bucket.name));
        Ok(())
    }

    /// Index, then store, then project: children before parents.
    async fn remove_log_pipeline(&self, pair: &GraphPair) -> Result<()> {
        let index = pair
            .create
            .log_index()
            .ok_or(DeployError::MissingResource("log index"))?;
        let existing = check(
            self.reporter,
            self.provider.get_log_index(&index.project, &index.store).await,
            "look up",
            "log index",
            &index.store,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Removing log index {}...", index.store));
            check(
                self.reporter,
                self.provider.delete_log_index(&index.project, &index.store).await,
                "remove",
                "log index",
                &index.store,
            )?;
            self.reporter
                .line(&format!("Removed log index {}", index.store));
        } else {
            self.reporter
                .line(&format!("Skip removing log index {}", index.store));
        }

        let store = pair
            .create
            .log_store()
            .ok_or(DeployError::MissingResource("log store"))?;
        let existing = check(
            self.reporter,
            self.provider.get_log_store(&store.project, &store.name).await,
            "look up",
            "log store",
            &store.name,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Removing log store {}...", store.name));
            check(
                self.reporter,
                self.provider.delete_log_store(&store.project, &store.name).await,
                "remove",
                "log store",
                &store.name,
            )?;
            self.reporter
                .line(&format!("Removed log store {}", store.name));
        } else {
            self.reporter
                .line(&format!("Skip removing log store {}", store.name));
        }

        let project = pair
            .create
            .log_project()
            .ok_or(DeployError::MissingResource("log project"))?;
        let existing = check(
            self.reporter,
            self.provider.get_log_project(&project.name).await,
            "look up",
            "log project",
            &project.name,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Removing log project {}...", project.name));
            check(
                self.reporter,
                self.provider.delete_log_project(&project.name).await,
                "remove",
                "log project",
                &project.name,
            )?;
            self.reporter
                .line(&format!("Removed log project {}", project.name));
        } else {
            self.reporter
                .line(&format!("Skip removing log project {}", project.name));
        }
        Ok(())
    }
}
