use crate::core::fetcher::classify_transport;
use crate::core::resolver;
use crate::domain::ports::FetchConfig;
use crate::utils::error::{ClientError, FetchFailure, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// `GET /health` 的回應，僅供診斷顯示，不會進到產品解析流程
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// 從產品端點推導 /health 位址（同主機、固定路徑）
pub fn health_url(endpoint: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| ClientError::InvalidConfigValueError {
        field: "api_endpoint".to_string(),
        value: endpoint.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    url.set_path("/health");
    url.set_query(None);
    Ok(url)
}

pub async fn check_health<C: FetchConfig>(client: &Client, config: &C) -> Result<HealthReport> {
    let url = health_url(config.endpoint())?;
    tracing::debug!("📡 Checking service health at: {}", url);

    let response = client
        .get(url)
        .timeout(Duration::from_secs(config.timeout_seconds()))
        .send()
        .await
        .map_err(|e| classify_transport(&e))?;

    let status = response.status().as_u16();
    if let Some(failure) = resolver::classify_status(status) {
        return Err(failure.into());
    }

    let body = response.text().await.map_err(|e| classify_transport(&e))?;
    let report: HealthReport = serde_json::from_str(&body)
        .map_err(|e| FetchFailure::malformed_json(&e.to_string(), &body))?;

    Ok(report)
}
