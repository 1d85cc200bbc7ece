use async_trait::async_trait;
use std::future::Future;
use std::time::Instant;
use tracing::{field, Instrument};

use oauth2_core::{ApiResource, IdentityResource, OAuth2Error};
use oauth2_ports::{DynResourceStore, ResourceStore};

use crate::metrics::ResourceStoreMetrics;
use crate::telemetry::annotate_span_with_trace_ids;

/// A thin wrapper around a `DynResourceStore` that creates a tracing span for
/// each store call and, when configured, records Prometheus metrics.
pub struct ObservedResourceStore {
    inner: DynResourceStore,
    db_system: String,
    metrics: Option<ResourceStoreMetrics>,
}

impl ObservedResourceStore {
    pub fn new(inner: DynResourceStore, db_system: String) -> Self {
        Self {
            inner,
            db_system,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: ResourceStoreMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn db_system(&self) -> &str {
        &self.db_system
    }

    fn span(&self, operation: &'static str, scope_count: usize) -> tracing::Span {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = operation,
            scope_count = scope_count
        );
        annotate_span_with_trace_ids(&span);
        span
    }

    async fn observe<T, F>(
        &self,
        operation: &'static str,
        span: tracing::Span,
        call: F,
    ) -> Result<T, OAuth2Error>
    where
        F: Future<Output = Result<T, OAuth2Error>>,
    {
        let started = Instant::now();
        let result = call.instrument(span).await;

        if let Some(metrics) = &self.metrics {
            metrics.observe(operation, result.is_ok(), started.elapsed());
        }
        if let Err(err) = &result {
            tracing::warn!(db_operation = operation, error = %err, "resource store call failed");
        }

        result
    }
}

#[async_trait]
impl ResourceStore for ObservedResourceStore {
    async fn init(&self) -> Result<(), OAuth2Error> {
        let span = self.span("init", 0);
        self.observe("init", span, self.inner.init()).await
    }

    async fn save_identity_resource(
        &self,
        resource: &IdentityResource,
    ) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_identity_resource",
            resource_name = %resource.name
        );
        annotate_span_with_trace_ids(&span);
        self.observe(
            "save_identity_resource",
            span,
            self.inner.save_identity_resource(resource),
        )
        .await
    }

    async fn save_api_resource(&self, resource: &ApiResource) -> Result<(), OAuth2Error> {
        let span = tracing::info_span!(
            "db",
            trace_id = field::Empty,
            span_id = field::Empty,
            db_system = %self.db_system,
            db_operation = "save_api_resource",
            resource_name = %resource.name,
            scope_count = resource.scopes.len()
        );
        annotate_span_with_trace_ids(&span);
        self.observe(
            "save_api_resource",
            span,
            self.inner.save_api_resource(resource),
        )
        .await
    }

    async fn find_identity_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<IdentityResource>, OAuth2Error> {
        let span = self.span("find_identity_resources_by_scope_name", scope_names.len());
        self.observe(
            "find_identity_resources_by_scope_name",
            span,
            self.inner.find_identity_resources_by_scope_name(scope_names),
        )
        .await
    }

    async fn find_api_resources_by_scope_name(
        &self,
        scope_names: &[String],
    ) -> Result<Vec<ApiResource>, OAuth2Error> {
        let span = self.span("find_api_resources_by_scope_name", scope_names.len());
        self.observe(
            "find_api_resources_by_scope_name",
            span,
            self.inner.find_api_resources_by_scope_name(scope_names),
        )
        .await
    }

    async fn get_all_identity_resources(&self) -> Result<Vec<IdentityResource>, OAuth2Error> {
        let span = self.span("get_all_identity_resources", 0);
        self.observe(
            "get_all_identity_resources",
            span,
            self.inner.get_all_identity_resources(),
        )
        .await
    }

    async fn get_all_api_resources(&self) -> Result<Vec<ApiResource>, OAuth2Error> {
        let span = self.span("get_all_api_resources", 0);
        self.observe(
            "get_all_api_resources",
            span,
            self.inner.get_all_api_resources(),
        )
        .await
    }

    async fn healthcheck(&self) -> Result<(), OAuth2Error> {
        let span = self.span("healthcheck", 0);
        self.observe("healthcheck", span, self.inner.healthcheck())
            .await
    }
}
