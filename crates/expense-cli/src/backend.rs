//! HTTP client for the expense backend and the connectivity probe.

use std::future::Future;

use anyhow::{Context, Result};
use expense_engine::entry::NewEntry;
use expense_engine::record::parse_records;
use expense_engine::{ExpenseRecord, ReportError};
use tracing::{debug, info, warn};

use crate::cache::RecordSource;
use crate::config::Config;

/// Everything a command needs from the backend besides reading records.
pub trait ExpenseBackend: RecordSource {
    /// `Ok` when the internet is reachable at all.
    fn check_connectivity(&self) -> impl Future<Output = Result<(), ReportError>> + Send;

    /// Store a new entry; resolves to the backend's reply text.
    fn submit_entry(&self, entry: &NewEntry) -> impl Future<Output = Result<String, ReportError>> + Send;
}

/// Shared reqwest clients: one bounded by the backend timeout, one by the
/// (shorter) probe timeout.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    url: String,
    probe_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.backend_timeout)
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to create HTTP client")?;
        let probe_client = reqwest::Client::builder()
            .timeout(config.probe_timeout)
            .build()
            .context("Failed to create connectivity probe client")?;

        Ok(Self {
            client,
            probe_client,
            url: config.backend_url.clone(),
            probe_url: config.probe_url.clone(),
        })
    }

    /// `GET {url}?action=getData`, parsed as a JSON array of records.
    pub async fn fetch(&self) -> Result<Vec<ExpenseRecord>, ReportError> {
        let url = data_url(&self.url);
        info!(url = %url, "fetching records");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "backend returned an error status");
            return Err(ReportError::Network(format!("HTTP {}", response.status())));
        }

        let body = response.text().await.map_err(classify)?;
        let records = parse_records(&body).map_err(|e| {
            warn!(error = %e, "backend payload is not a record array");
            ReportError::Network(format!("invalid JSON from backend: {e}"))
        })?;

        info!(count = records.len(), "records fetched");
        Ok(records)
    }
}

impl RecordSource for HttpBackend {
    async fn fetch_records(&self) -> Result<Vec<ExpenseRecord>, ReportError> {
        self.fetch().await
    }
}

impl ExpenseBackend for HttpBackend {
    /// `Ok` if the probe URL answers at all; the status code does not matter.
    async fn check_connectivity(&self) -> Result<(), ReportError> {
        match self.probe_client.get(&self.probe_url).send().await {
            Ok(response) => {
                debug!(url = %self.probe_url, status = %response.status(), "connectivity probe answered");
                Ok(())
            }
            Err(e) => {
                warn!(url = %self.probe_url, error = %e, "connectivity probe failed");
                Err(ReportError::Offline)
            }
        }
    }

    /// POST a new entry; the backend answers with a human-readable text.
    async fn submit_entry(&self, entry: &NewEntry) -> Result<String, ReportError> {
        let response = self.client.post(&self.url).json(entry).send().await.map_err(classify)?;

        if !response.status().is_success() {
            return Err(ReportError::Network(format!("HTTP {}", response.status())));
        }

        let text = response.text().await.map_err(classify)?;
        info!(nominal = %entry.nominal, kategori = %entry.kategori, "entry submitted");
        Ok(text)
    }
}

fn classify(e: reqwest::Error) -> ReportError {
    if e.is_timeout() {
        warn!(error = %e, "backend request timed out");
        ReportError::Timeout
    } else {
        warn!(error = %e, "backend request failed");
        ReportError::Network(e.to_string())
    }
}

/// The read endpoint: `action=getData` appended as a query parameter.
pub fn data_url(base: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}action=getData")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(
            data_url("https://script.example.com/macros/s/abc/exec"),
            "https://script.example.com/macros/s/abc/exec?action=getData"
        );
        assert_eq!(data_url("http://localhost/exec?key=1"), "http://localhost/exec?key=1&action=getData");
    }
}
