//! Role and policy reconciliation

use crate::context::ConsistencyDelay;
use crate::error::Result;
use crate::report::{check, Reporter};
use futures_util::future::try_join_all;
use stratus_cloud::{PolicyKind, Provider, RemoteRole, RoleSpec};

/// Ensures a role and its declared policies exist and are attached.
///
/// System policies are assumed pre-existing and only attached; custom
/// policies are created on first sight. An existing role is accepted
/// as-is: the assume-role document is not diffed against the spec.
pub struct RoleReconciler<'a> {
    provider: &'a dyn Provider,
    reporter: &'a dyn Reporter,
    delay: ConsistencyDelay,
}

impl<'a> RoleReconciler<'a> {
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

    /// Reconcile one role spec, returning the resolved remote role for
    /// dependent resources (service creation needs the ARN).
    pub async fn reconcile(&self, spec: &RoleSpec) -> Result<RemoteRole> {
        let role = match check(
            self.reporter,
            self.provider.get_role(&spec.name).await,
            "look up",
            "role",
            &spec.name,
        )? {
            Some(role) => {
                self.reporter
                    .line(&format!("Role {} already exists", spec.name));
                role
            }
            None => {
                self.reporter
                    .line(&format!("Creating role {}...", spec.name));
                let role = check(
                    self.reporter,
                    self.provider.create_role(spec).await,
                    "create",
                    "role",
                    &spec.name,
                )?;
                self.reporter.line(&format!("Created role {}", spec.name));
                role
            }
        };

        // Custom policies are created if absent. System policies already
        // exist provider-side and are only ever attached below.
        for policy in &spec.policies {
            if policy.kind != PolicyKind::Custom {
                continue;
            }
            let existing = check(
                self.reporter,
                self.provider.get_policy(&policy.name, policy.kind).await,
                "look up",
                "policy",
                &policy.name,
            )?;
            if existing.is_some() {
                self.reporter
                    .line(&format!("Policy {} already exists", policy.name));
            } else {
                self.reporter
                    .line(&format!("Creating policy {}...", policy.name));
                check(
                    self.reporter,
                    self.provider.create_policy(policy).await,
                    "create",
                    "policy",
                    &policy.name,
                )?;
                self.reporter
                    .line(&format!("Created policy {}", policy.name));
            }
        }

        // Role and policy mutations are not immediately visible downstream.
        self.provider.sleep(self.delay.0).await;

        let attached = check(
            self.reporter,
            self.provider.list_role_policies(&spec.name).await,
            "list policies for",
            "role",
            &spec.name,
        )?;

        let mut missing = Vec::new();
        for policy in &spec.policies {
            if attached.iter().any(|a| a.name == policy.name) {
                self.reporter.line(&format!(
                    "Policy {} has been attached to role {}",
                    policy.name, spec.name
                ));
            } else {
                missing.push(policy);
            }
        }

        // Attachments target disjoint policies, so they can fan out. Lines
        // are emitted before and after the join to keep output ordered.
        for policy in &missing {
            self.reporter.line(&format!(
                "Attaching policy {} to role {}...",
                policy.name, spec.name
            ));
        }
        let attach_all = try_join_all(missing.iter().map(|policy| {
            self.provider
                .attach_policy(&spec.name, &policy.name, policy.kind)
        }));
        check(
            self.reporter,
            attach_all.await.map(|_| ()),
            "attach policies to",
            "role",
            &spec.name,
        )?;
        for policy in &missing {
            self.reporter.line(&format!(
                "Attached policy {} to role {}",
                policy.name, spec.name
            ));
        }

        tracing::debug!(role = %spec.name, arn = %role.arn, "role reconciled");
        Ok(role)
    }
}
