//! Top-level deploy/remove orchestration
//!
//! A [`Deployer`] wires the sub-reconcilers together by explicit
//! composition: bootstrap graph first, then artifact upload, then
//! functions, then events. Teardown walks the same resources in reverse.

use crate::context::{ConsistencyDelay, ReconcileContext};
use crate::error::{DeployError, Result};
use crate::event::EventReconciler;
use crate::function::FunctionReconciler;
use crate::report::{check, Reporter};
use crate::service::ServiceReconciler;
use crate::teardown::{Teardown, TeardownFlags};
use std::sync::Arc;
use stratus_cloud::{Provider, Resource};
use stratus_core::{GraphPair, LogicalGraph};

pub struct Deployer {
    provider: Arc<dyn Provider>,
    reporter: Arc<dyn Reporter>,
    delay: ConsistencyDelay,
}

impl Deployer {
    pub fn new(provider: Arc<dyn Provider>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            provider,
            reporter,
            delay: ConsistencyDelay::default(),
        }
    }

    pub fn with_delay(mut self, delay: ConsistencyDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Reconcile the full graph pair: bootstrap resources, artifact,
    /// functions, events, in that order.
    pub async fn deploy(&self, pair: &GraphPair) -> Result<()> {
        let mut ctx = ReconcileContext::new();

        ServiceReconciler::new(&*self.provider, &*self.reporter, self.delay)
            .reconcile(&pair.create, &mut ctx)
            .await?;
        self.upload_artifact(&pair.update).await?;
        FunctionReconciler::new(&*self.provider, &*self.reporter)
            .reconcile(&pair.update.functions(), &mut ctx)
            .await?;
        EventReconciler::new(&*self.provider, &*self.reporter, self.delay)
            .reconcile(&pair.update, &mut ctx)
            .await?;

        tracing::info!(
            create = pair.create.len(),
            update = pair.update.len(),
            "deploy reconciliation complete"
        );
        Ok(())
    }

    /// Reconcile a single function and its routes/triggers. The bootstrap
    /// graph is still walked: it is idempotent, and the run needs the
    /// bucket selected and the roles resolved.
    pub async fn deploy_function(&self, pair: &GraphPair, name: &str) -> Result<()> {
        let update = filter_update_graph(&pair.update, name)?;
        let filtered = GraphPair {
            create: pair.create.clone(),
            update,
        };
        self.deploy(&filtered).await
    }

    /// Tear down in reverse dependency order. Roles and the log pipeline
    /// survive unless the flags say otherwise.
    pub async fn remove(&self, pair: &GraphPair, flags: TeardownFlags) -> Result<()> {
        Teardown::new(&*self.provider, &*self.reporter)
            .run(pair, flags)
            .await
    }

    async fn upload_artifact(&self, update: &LogicalGraph) -> Result<()> {
        let Some(object) = update.object() else {
            return Ok(());
        };
        self.reporter
            .line(&format!("Uploading artifact {}...", object.key));
        check(
            &*self.reporter,
            self.provider.upload_object(object).await,
            "upload",
            "artifact",
            &object.key,
        )?;
        self.reporter
            .line(&format!("Uploaded artifact {}", object.key));
        Ok(())
    }
}

/// Keep only the named function plus the resources its events need. The
/// invoke role and API group stay only if a kept route or trigger still
/// references them.
fn filter_update_graph(update: &LogicalGraph, name: &str) -> Result<LogicalGraph> {
    if !update.functions().iter().any(|f| f.name == name) {
        return Err(DeployError::UnknownFunction(name.to_string()));
    }

    let keeps_events = update.apis().iter().any(|a| a.function == name)
        || update.triggers().iter().any(|t| t.function == name);

    let mut filtered = LogicalGraph::new();
    for (id, resource) in update.iter() {
        let keep = match resource {
            Resource::Object(_) => true,
            Resource::Function(f) => f.name == name,
            Resource::Api(a) => a.function == name,
            Resource::Trigger(t) => t.function == name,
            Resource::Role(_) | Resource::ApiGroup(_) => keeps_events,
            _ => false,
        };
        if keep {
            filtered.insert(id, resource.clone());
        }
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_cloud::{ApiGroupSpec, ApiSpec, FunctionSpec, PolicyKind, PolicySpec, RoleSpec};

    fn function(name: &str) -> Resource {
        Resource::Function(FunctionSpec {
            name: name.to_string(),
            service: "svc-dev".to_string(),
            handler: "index.handler".to_string(),
            runtime: "nodejs10".to_string(),
            memory_size: 128,
            timeout: 30,
            code_bucket: "svc-dev-artifacts".to_string(),
            code_key: "artifacts/svc-dev/x/code.zip".to_string(),
        })
    }

    fn api(function: &str) -> Resource {
        Resource::Api(ApiSpec {
            name: format!("svc_dev_{function}_get"),
            group: "svc_dev_api".to_string(),
            method: "GET".to_string(),
            path: "/x".to_string(),
            role: "svc-dev-invoke-role".to_string(),
            service: "svc-dev".to_string(),
            function: function.to_string(),
        })
    }

    fn graph_with_two_functions() -> LogicalGraph {
        let mut update = LogicalGraph::new();
        update.insert("svc-dev-function-a", function("a"));
        update.insert("svc-dev-function-b", function("b"));
        update.insert(
            "svc-dev-invoke-role",
            Resource::Role(RoleSpec {
                name: "svc-dev-invoke-role".to_string(),
                assume_role_policy: serde_json::json!({}),
                policies: vec![PolicySpec {
                    name: "ApiGatewayInvocationAccess".to_string(),
                    kind: PolicyKind::System,
                    document: None,
                }],
            }),
        );
        update.insert(
            "svc-dev-api-group",
            Resource::ApiGroup(ApiGroupSpec {
                name: "svc_dev_api".to_string(),
                description: None,
            }),
        );
        update.insert("svc-dev-api-a-get", api("a"));
        update
    }

    #[test]
    fn filter_keeps_only_named_function_and_its_events() {
        let update = graph_with_two_functions();

        let for_a = filter_update_graph(&update, "a").unwrap();
        assert_eq!(for_a.functions().len(), 1);
        assert_eq!(for_a.functions()[0].name, "a");
        assert_eq!(for_a.apis().len(), 1);
        assert!(for_a.api_group().is_some());
        assert_eq!(for_a.roles().len(), 1);

        // b has no events: role and group drop out too
        let for_b = filter_update_graph(&update, "b").unwrap();
        assert_eq!(for_b.functions().len(), 1);
        assert!(for_b.apis().is_empty());
        assert!(for_b.api_group().is_none());
        assert!(for_b.roles().is_empty());
    }

    #[test]
    fn filter_rejects_unknown_function() {
        let update = graph_with_two_functions();
        assert!(matches!(
            filter_update_graph(&update, "nope"),
            Err(DeployError::UnknownFunction(_))
        ));
    }
}
