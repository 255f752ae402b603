use std::thread;

use jobcast_core::error::AppError;
use jobcast_core::models::PublishBatch;
use jobcast_core::traits::{Payload, Transport};

use crate::config::PublishConfig;
use crate::session::HttpSession;

/// Pushes a batch of records to every configured catalog API version,
/// then reports the record count to the stats endpoint.
///
/// Per version, the sequence is strict: clear the company's existing
/// records, pause for the clear to propagate, then push the replacement
/// set. Versions are independent targets (one failing does not stop
/// the others from being attempted) but any failure propagates to the
/// caller once the remaining versions have run. There are no retries
/// and no partial-success bookkeeping; the caller decides whether to
/// re-publish the whole batch.
pub struct PublishPipeline<T: Transport = HttpSession> {
    transport: T,
    config: PublishConfig,
}

impl PublishPipeline<HttpSession> {
    pub fn new(config: PublishConfig) -> Result<Self, AppError> {
        Ok(Self::with_transport(HttpSession::new()?, config))
    }
}

impl<T: Transport> PublishPipeline<T> {
    pub fn with_transport(transport: T, config: PublishConfig) -> Self {
        Self { transport, config }
    }

    pub fn publish(&self, batch: &PublishBatch) -> Result<(), AppError> {
        let records = serde_json::to_value(batch.records())?;
        let mut first_failure = None;

        for &version in &self.config.versions {
            if let Err(e) = self.publish_version(version, batch.company(), &records) {
                tracing::warn!(
                    version,
                    company = batch.company(),
                    "Catalog v{version} publish failed: {e}"
                );
                first_failure.get_or_insert(e);
            }
        }
        if let Some(e) = first_failure {
            return Err(e);
        }

        self.report_stats(batch.company(), batch.len())
    }

    fn publish_version(
        &self,
        version: u8,
        company: &str,
        records: &serde_json::Value,
    ) -> Result<(), AppError> {
        let headers = [("apikey", self.config.api_key.as_str())];

        let clear_url = format!("{}/v{}/clean/", self.config.api_base_url, version);
        let response = self.transport.post(
            &clear_url,
            &headers,
            Payload::Form(vec![("company".to_string(), company.to_string())]),
        )?;
        if !response.is_success() {
            tracing::warn!(status = response.status, "Clear returned non-2xx for {clear_url}");
        }

        thread::sleep(self.config.propagation_delay);

        let update_url = format!("{}/v{}/update/", self.config.api_base_url, version);
        let response = self
            .transport
            .post(&update_url, &headers, Payload::Json(records.clone()))?;
        if !response.is_success() {
            tracing::warn!(status = response.status, "Update returned non-2xx for {update_url}");
        }
        Ok(())
    }

    fn report_stats(&self, company: &str, count: usize) -> Result<(), AppError> {
        let url = format!(
            "{}/dataset/{}/{}/",
            self.config.stats_base_url,
            self.config.runner_id,
            company.to_lowercase()
        );
        self.transport
            .post(&url, &[], Payload::Json(serde_json::json!({ "data": count })))?;
        tracing::info!(company, "Published {count} records");
        Ok(())
    }
}
