//! Service, storage and log pipeline reconciliation

use crate::context::{ConsistencyDelay, ReconcileContext};
use crate::error::{DeployError, Result};
use crate::report::{check, Reporter};
use crate::role::RoleReconciler;
use stratus_cloud::Provider;
use stratus_core::LogicalGraph;

/// Walks the bootstrap (create) graph in its fixed order: log project ->
/// log store -> log index -> exec role -> service -> bucket.
///
/// The sequence is load-bearing: the index needs project and store, and
/// service creation needs the resolved exec role ARN.
pub struct ServiceReconciler<'a> {
    provider: &'a dyn Provider,
    reporter: &'a dyn Reporter,
    delay: ConsistencyDelay,
}

impl<'a> ServiceReconciler<'a> {
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
        create: &LogicalGraph,
        ctx: &mut ReconcileContext,
    ) -> Result<()> {
        self.reconcile_logs(create).await?;

        let role_spec = create
            .roles()
            .into_iter()
            .next()
            .ok_or(DeployError::MissingResource("exec role"))?;
        let exec_role = RoleReconciler::new(self.provider, self.reporter, self.delay)
            .reconcile(role_spec)
            .await?;

        // The service create call uses the role ARN; wait out propagation
        // before issuing it.
        self.provider.sleep(self.delay.0).await;

        let service = create
            .service()
            .ok_or(DeployError::MissingResource("service"))?;
        let existing = check(
            self.reporter,
            self.provider.get_service(&service.name).await,
            "look up",
            "service",
            &service.name,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Service {} already exists", service.name));
        } else {
            self.reporter
                .line(&format!("Creating service {}...", service.name));
            check(
                self.reporter,
                self.provider.create_service(service, &exec_role.arn).await,
                "create",
                "service",
                &service.name,
            )?;
            self.reporter
                .line(&format!("Created service {}", service.name));
        }
        ctx.exec_role = Some(exec_role);

        let bucket = create
            .bucket()
            .ok_or(DeployError::MissingResource("bucket"))?;
        let existing = check(
            self.reporter,
            self.provider.get_bucket(&bucket.name).await,
            "look up",
            "bucket",
            &bucket.name,
        )?;
        if existing.is_some() {
            self.reporter
                .line(&format!("Bucket {} already exists", bucket.name));
        } else {
            self.reporter
                .line(&format!("Creating bucket {}...", bucket.name));
            check(
                self.reporter,
                self.provider.create_bucket(bucket).await,
                "create",
                "bucket",
                &bucket.name,
            )?;
            self.reporter
                .line(&format!("Created bucket {}", bucket.name));
        }
        // Point the object-storage client at the bucket whether or not it
        // was just created; uploads address it from here on.
        check(
            self.reporter,
            self.provider.select_bucket(&bucket.name).await,
            "select",
            "bucket",
            &bucket.name,
        )?;
        ctx.bucket = Some(bucket.name.clone());

        Ok(())
    }

    /// Strict order: project, then store, then index. Each step is
    /// get-by-name, skip if present, else create.
    async fn reconcile_logs(&self, create: &LogicalGraph) -> Result<()> {
        let project = create
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
                .line(&format!("Log project {} already exists", project.name));
        } else {
            self.reporter
                .line(&format!("Creating log project {}...", project.name));
            check(
                self.reporter,
                self.provider.create_log_project(project).await,
                "create",
                "log project",
                &project.name,
            )?;
            self.reporter
                .line(&format!("Created log project {}", project.name));
        }

        let store = create
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
                .line(&format!("Log store {} already exists", store.name));
        } else {
            self.reporter
                .line(&format!("Creating log store {}...", store.name));
            check(
                self.reporter,
                self.provider.create_log_store(store).await,
                "create",
                "log store",
                &store.name,
            )?;
            self.reporter
                .line(&format!("Created log store {}", store.name));
        }

        // Reached only once project and store are confirmed present or
        // just created; an index cannot exist without both.
        let index = create
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
                .line(&format!("Log index {} already exists", index.store));
        } else {
            self.reporter
                .line(&format!("Creating log index {}...", index.store));
            check(
                self.reporter,
                self.provider.create_log_index(index).await,
                "create",
                "log index",
                &index.store,
            )?;
            self.reporter
                .line(&format!("Created log index {}", index.store));
        }

        Ok(())
    }
}
