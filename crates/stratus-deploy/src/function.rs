//! Function reconciliation

use crate::context::ReconcileContext;
use crate::error::Result;
use crate::report::{check, Reporter};
use futures_util::future::try_join_all;
use stratus_cloud::{FunctionSpec, Provider};

/// Create-or-overwrite for every declared function.
///
/// Existence is queried concurrently (each check hits a distinct function
/// name), then writes run sequentially so progress output stays ordered.
/// An existing function is unconditionally overwritten, never diffed.
pub struct FunctionReconciler<'a> {
    provider: &'a dyn Provider,
    reporter: &'a dyn Reporter,
}

impl<'a> FunctionReconciler<'a> {
    pub fn new(provider: &'a dyn Provider, reporter: &'a dyn Reporter) -> Self {
        Self { provider, reporter }
    }

    pub async fn reconcile(
        &self,
        functions: &[&FunctionSpec],
        ctx: &mut ReconcileContext,
    ) -> Result<()> {
        let checks = functions.iter().map(|spec| async move {
            self.provider
                .get_function(&spec.service, &spec.name)
                .await
                .map(|remote| (spec.name.clone(), remote.is_some()))
        });
        let results = check(
            self.reporter,
            try_join_all(checks).await,
            "look up",
            "functions of",
            functions
                .first()
                .map(|f| f.service.as_str())
                .unwrap_or("service"),
        )?;
        ctx.function_exists = results.into_iter().collect();

        for spec in functions {
            let exists = ctx.function_exists.get(&spec.name).copied().unwrap_or(false);
            if exists {
                self.reporter
                    .line(&format!("Updating function {}...", spec.name));
                check(
                    self.reporter,
                    self.provider.update_function(spec).await,
                    "update",
                    "function",
                    &spec.name,
                )?;
                self.reporter
                    .line(&format!("Updated function {}", spec.name));
            } else {
                self.reporter
                    .line(&format!("Creating function {}...", spec.name));
                check(
                    self.reporter,
                    self.provider.create_function(spec).await,
                    "create",
                    "function",
                    &spec.name,
                )?;
                self.reporter
                    .line(&format!("Created function {}", spec.name));
            }
        }

        Ok(())
    }
}
