//! Event reconciliation: API routes and event-source triggers

use crate::context::{ConsistencyDelay, ReconcileContext};
use crate::error::{DeployError, Result};
use crate::report::{check, Reporter};
use crate::role::RoleReconciler;
use stratus_cloud::{ApiSpec, Provider, RemoteApiGroup, TriggerSpec};
use stratus_core::LogicalGraph;

/// Reconciles the event surface of the update graph: the invoke role,
/// the shared API group, each HTTP route, and each trigger.
///
/// APIs are deployed (published) after create-or-update, every time:
/// writing a route does not make it live.
pub struct EventReconciler<'a> {
    provider: &'a dyn Provider,
    reporter: &'a dyn Reporter,
    delay: ConsistencyDelay,
}

impl<'a> EventReconciler<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        reporter: &'a dyn Reporter,
        delay: ConsistencyDelay,
    ) -> Self {
        Self {
            provider,
            reporter,
            delay,
        }
    }

    pub async fn reconcile(
        &self,
        update: &LogicalGraph,
        ctx: &mut ReconcileContext,
    ) -> Result<()> {
        let apis = update.apis();
        let triggers = update.triggers();
        if apis.is_empty() && triggers.is_empty() {
            return Ok(());
        }

        // The invoke role comes first: routes and triggers both reference
        // its ARN. Its declared policies already reflect which event
        // sources the compiler saw.
        let role_spec = update
            .roles()
            .into_iter()
            .next()
            .ok_or(DeployError::MissingResource("invoke role"))?;
        let invoke_role = RoleReconciler::new(self.provider, self.reporter, self.delay)
            .reconcile(role_spec)
            .await?;
        ctx.invoke_role = Some(invoke_role);

        if !apis.is_empty() {
            self.reconcile_apis(update, &apis, ctx).await?;
        }
        if !triggers.is_empty() {
            self.reconcile_triggers(&triggers, ctx).await?;
        }
        Ok(())
    }

    async fn reconcile_apis(
        &self,
        update: &LogicalGraph,
        apis: &[&ApiSpec],
        ctx: &mut ReconcileContext,
    ) -> Result<()> {
        let invoke_arn = ctx
            .invoke_role
            .as_ref()
            .map(|role| role.arn.clone())
            .ok_or(DeployError::MissingResource("invoke role"))?;

        let group_spec = update
            .api_group()
            .ok_or(DeployError::MissingResource("api group"))?;
        let group = match check(
            self.reporter,
            self.provider.get_api_group(&group_spec.name).await,
            "look up",
            "api group",
            &group_spec.name,
        )? {
            Some(group) => {
                self.reporter
                    .line(&format!("Api group {} already exists", group_spec.name));
                group
            }
            None => {
                self.reporter
                    .line(&format!("Creating api group {}...", group_spec.name));
                let group = check(
                    self.reporter,
                    self.provider.create_api_group(group_spec).await,
                    "create",
                    "api group",
                    &group_spec.name,
                )?;
                self.reporter
                    .line(&format!("Created api group {}", group_spec.name));
                group
            }
        };

        // One listing, then a name map with confirmed absences recorded as
        // None so the write loop knows which names are new.
        let existing = check(
            self.reporter,
            self.provider.list_apis(&group.id).await,
            "list apis in",
            "api group",
            &group.name,
        )?;
        for spec in apis {
            let found = existing.iter().find(|api| api.name == spec.name).cloned();
            ctx.api_map.insert(spec.name.clone(), found);
        }

        for spec in apis {
            match ctx.api_map.get(&spec.name).cloned().flatten() {
                Some(remote) => {
                    self.reporter
                        .line(&format!("Updating api {}...", spec.name));
                    let updated = check(
                        self.reporter,
                        self.provider
                            .update_api(&group, &remote.id, &invoke_arn, spec)
                            .await,
                        "update",
                        "api",
                        &spec.name,
                    )?;
                    self.reporter.line(&format!("Updated api {}", spec.name));
                    ctx.api_map.insert(spec.name.clone(), Some(updated));
                }
                None => {
                    self.reporter
                        .line(&format!("Creating api {}...", spec.name));
                    let created = check(
                        self.reporter,
                        self.provider.create_api(&group, &invoke_arn, spec).await,
                        "create",
                        "api",
                        &spec.name,
                    )?;
                    self.reporter.line(&format!("Created api {}", spec.name));
                    ctx.api_map.insert(spec.name.clone(), Some(created));
                }
            }
        }

        // Deployment is unconditional: an updated-but-undeployed API would
        // keep serving the old route.
        for spec in apis {
            let remote = ctx
                .api_map
                .get(&spec.name)
                .cloned()
                .flatten()
                .ok_or(DeployError::MissingResource("api"))?;
            self.reporter
                .line(&format!("Deploying api {}...", spec.name));
            check(
                self.reporter,
                self.provider.deploy_api(&group, &remote.id).await,
                "deploy",
                "api",
                &spec.name,
            )?;
            self.reporter.line(&format!("Deployed api {}", spec.name));
            self.reporter.line(&route_line(&group, spec));
        }

        ctx.api_group = Some(group);
        Ok(())
    }

    async fn reconcile_triggers(
        &self,
        triggers: &[&TriggerSpec],
        ctx: &mut ReconcileContext,
    ) -> Result<()> {
        let invoke_arn = ctx
            .invoke_role
            .as_ref()
            .map(|role| role.arn.clone())
            .ok_or(DeployError::MissingResource("invoke role"))?;

        for spec in triggers {
            let existing = check(
                self.reporter,
                self.provider
                    .get_trigger(&spec.service, &spec.function, &spec.name)
                    .await,
                "look up",
                "trigger",
                &spec.name,
            )?;
            ctx.trigger_map.insert(spec.name.clone(), existing.clone());

            if existing.is_some() {
                self.reporter
                    .line(&format!("Updating trigger {}...", spec.name));
                let updated = check(
                    self.reporter,
                    self.provider.update_trigger(spec, &invoke_arn).await,
                    "update",
                    "trigger",
                    &spec.name,
                )?;
                self.reporter
                    .line(&format!("Updated trigger {}", spec.name));
                ctx.trigger_map.insert(spec.name.clone(), Some(updated));
            } else {
                self.reporter
                    .line(&format!("Creating trigger {}...", spec.name));
                let created = check(
                    self.reporter,
                    self.provider.create_trigger(spec, &invoke_arn).await,
                    "create",
                    "trigger",
                    &spec.name,
                )?;
                self.reporter
                    .line(&format!("Created trigger {}", spec.name));
                ctx.trigger_map.insert(spec.name.clone(), Some(created));
            }
        }
        Ok(())
    }
}

/// The live-route line logged after deployment
fn route_line(group: &RemoteApiGroup, spec: &ApiSpec) -> String {
    format!(
        "{} http://{}{} -> {}.{}",
        spec.method, group.sub_domain, spec.path, spec.service, spec.function
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_line_format() {
        let group = RemoteApiGroup {
            name: "my_service_dev_api".to_string(),
            id: "g-1".to_string(),
            sub_domain: "my_service_dev_api.gateway.example".to_string(),
        };
        let spec = ApiSpec {
            name: "my_service_dev_postTest_post".to_string(),
            group: "my_service_dev_api".to_string(),
            method: "POST".to_string(),
            path: "/baz".to_string(),
            role: "my-service-dev-invoke-role".to_string(),
            service: "my-service-dev".to_string(),
            function: "postTest".to_string(),
        };
        assert_eq!(
            route_line(&group, &spec),
            "POST http://my_service_dev_api.gateway.example/baz -> my-service-dev.postTest"
        );
    }
}
