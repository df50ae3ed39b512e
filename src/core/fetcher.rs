use crate::core::resolver;
use crate::domain::model::{CatalogPage, Product};
use crate::domain::ports::FetchConfig;
use crate::utils::error::FetchFailure;
use reqwest::Client;
use std::time::Duration;

/// 顯示層狀態：唯一的寫入者是 FetchOrchestrator
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    pub loading: bool,
    pub products: Vec<Product>,
    pub count: i64,
    pub skipped: usize,
    pub error: Option<FetchFailure>,
}

impl CatalogView {
    // 三個 reducer 對應 loading / success / failure 轉移；
    // 每次 fetch 都從乾淨狀態開始，不保留上一輪的清單
    fn begin_loading(&mut self) {
        self.loading = true;
        self.products.clear();
        self.count = 0;
        self.skipped = 0;
        self.error = None;
    }

    fn apply_success(&mut self, page: CatalogPage) {
        self.loading = false;
        self.products = page.products;
        self.count = page.count;
        self.skipped = page.skipped;
        self.error = None;
    }

    fn apply_failure(&mut self, failure: FetchFailure) {
        self.loading = false;
        self.error = Some(failure);
    }
}

/// 單次 fetch 嘗試的憑據；提交結果時用來辨識已被取代的回應
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// 一次只允許一個進行中的請求；新的 fetch（含 retry）會取代前一個，
/// 遲到的回應在 commit 時被丟棄，不會覆寫較新的狀態
pub struct FetchOrchestrator<C: FetchConfig> {
    config: C,
    client: Client,
    generation: u64,
    view: CatalogView,
}

impl<C: FetchConfig> FetchOrchestrator<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
            generation: 0,
            view: CatalogView::default(),
        }
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    /// 開始新的一輪 fetch，先前任何進行中的請求從此視為被取代
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.view.begin_loading();
        FetchTicket(self.generation)
    }

    /// 執行請求並解析；超時在這裡合成 Timeout 失敗，不會進到 resolver
    pub async fn perform(&self) -> Result<CatalogPage, FetchFailure> {
        let mut request = self
            .client
            .get(self.config.endpoint())
            .timeout(Duration::from_secs(self.config.timeout_seconds()));

        if let Some(headers) = self.config.headers() {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        tracing::debug!("📡 Making API request to: {}", self.config.endpoint());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(classify_transport(&e)),
        };

        let status = response.status().as_u16();
        tracing::debug!("📡 API response status: {}", status);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Err(classify_transport(&e)),
        };

        resolver::resolve(&body, status)
    }

    /// 套用結果；憑據過期（已有更新的 fetch）時丟棄，回傳 false
    pub fn commit(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<CatalogPage, FetchFailure>,
    ) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(
                "🔶 Discarding superseded response (attempt {} overtaken by {})",
                ticket.0,
                self.generation
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                if page.skipped > 0 {
                    tracing::warn!(
                        "🔶 Skipped {} malformed element(s) out of {}",
                        page.skipped,
                        page.skipped + page.products.len()
                    );
                }
                tracing::info!("📡 Fetched {} products", page.products.len());
                self.view.apply_success(page);
            }
            Err(failure) => {
                tracing::error!("❌ Fetch failed: {} ({:?})", failure.message, failure.kind);
                self.view.apply_failure(failure);
            }
        }
        true
    }

    pub async fn fetch(&mut self) -> &CatalogView {
        let ticket = self.begin();
        let outcome = self.perform().await;
        self.commit(ticket, outcome);
        &self.view
    }

    /// 手動重試：重複同一個請求一次，沒有退避、不會自動觸發
    pub async fn retry(&mut self) -> &CatalogView {
        tracing::info!("🔄 Manual retry requested");
        self.fetch().await
    }
}

/// 連線層失敗的分類：拿到任何狀態碼之前就斷掉的請求
pub(crate) fn classify_transport(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::timeout()
    } else {
        FetchFailure::network_unreachable(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;
    use crate::utils::error::FailureKind;
    use httpmock::prelude::*;
    use std::collections::HashMap;

    struct MockConfig {
        endpoint: String,
        timeout_seconds: u64,
        headers: Option<HashMap<String, String>>,
    }

    impl MockConfig {
        fn new(endpoint: String) -> Self {
            Self {
                endpoint,
                timeout_seconds: 5,
                headers: None,
            }
        }
    }

    impl FetchConfig for MockConfig {
        fn endpoint(&self) -> &str {
            &self.endpoint
        }

        fn timeout_seconds(&self) -> u64 {
            self.timeout_seconds
        }

        fn headers(&self) -> Option<&HashMap<String, String>> {
            self.headers.as_ref()
        }
    }

    fn sample_page() -> CatalogPage {
        CatalogPage {
            products: vec![Product {
                id: 1,
                name: "Laptop".to_string(),
                price: 1200.5,
                stock: 25,
                category: Category {
                    id: 1,
                    name: "Electronics".to_string(),
                    description: "Electronic devices and gadgets".to_string(),
                },
            }],
            count: 1,
            skipped: 0,
        }
    }

    #[tokio::test]
    async fn test_fetch_success_updates_view() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            {"id": 1, "name": "Laptop", "price": 1200.5, "stock": 25,
             "category": {"id": 1, "name": "Electronics", "description": "Electronic devices and gadgets"}}
        ]);

        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let config = MockConfig::new(server.url("/api/products"));
        let mut orchestrator = FetchOrchestrator::new(config);

        let view = orchestrator.fetch().await;

        api_mock.assert();
        assert!(!view.loading);
        assert!(view.error.is_none());
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.products[0].name, "Laptop");
        assert_eq!(view.count, 1);
    }

    #[tokio::test]
    async fn test_fetch_applies_configured_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/products")
                .header("X-Client", "catalog-fetch");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"data": [], "count": 0}));
        });

        let mut headers = HashMap::new();
        headers.insert("X-Client".to_string(), "catalog-fetch".to_string());
        let mut config = MockConfig::new(server.url("/api/products"));
        config.headers = Some(headers);

        let mut orchestrator = FetchOrchestrator::new(config);
        let view = orchestrator.fetch().await;

        api_mock.assert();
        assert!(view.error.is_none());
        assert_eq!(view.count, 0);
    }

    #[tokio::test]
    async fn test_fetch_404_reports_not_found() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(404).body("ignored body");
        });

        let config = MockConfig::new(server.url("/api/products"));
        let mut orchestrator = FetchOrchestrator::new(config);

        let view = orchestrator.fetch().await;

        api_mock.assert();
        let failure = view.error.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert!(view.products.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout_synthesizes_timeout_failure() {
        let server = MockServer::start();
        let _slow_mock = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("[]")
                .delay(std::time::Duration::from_millis(1500));
        });

        let mut config = MockConfig::new(server.url("/api/products"));
        config.timeout_seconds = 1;
        let mut orchestrator = FetchOrchestrator::new(config);

        let view = orchestrator.fetch().await;

        let failure = view.error.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.message, "request was cancelled due to timeout");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_unreachable() {
        // Nothing listens on the discard port
        let config = MockConfig::new("http://127.0.0.1:1/api/products".to_string());
        let mut orchestrator = FetchOrchestrator::new(config);

        let view = orchestrator.fetch().await;

        let failure = view.error.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::NetworkUnreachable);
        assert!(failure.message.starts_with("unable to reach the server: "));
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let config = MockConfig::new("http://127.0.0.1:1/api/products".to_string());
        let mut orchestrator = FetchOrchestrator::new(config);

        let stale_ticket = orchestrator.begin();
        let fresh_ticket = orchestrator.begin();

        // The stale attempt resolves late with a success; it must not land
        assert!(!orchestrator.commit(stale_ticket, Ok(sample_page())));
        assert!(orchestrator.view().loading);
        assert!(orchestrator.view().products.is_empty());

        // The current attempt still applies normally
        assert!(orchestrator.commit(fresh_ticket, Err(FetchFailure::timeout())));
        assert!(!orchestrator.view().loading);
        assert_eq!(
            orchestrator.view().error.as_ref().unwrap().kind,
            FailureKind::Timeout
        );
    }

    #[tokio::test]
    async fn test_begin_resets_view_state() {
        let config = MockConfig::new("http://127.0.0.1:1/api/products".to_string());
        let mut orchestrator = FetchOrchestrator::new(config);

        let ticket = orchestrator.begin();
        orchestrator.commit(ticket, Ok(sample_page()));
        assert_eq!(orchestrator.view().products.len(), 1);

        // A new fetch attempt discards the previous list immediately
        orchestrator.begin();
        assert!(orchestrator.view().loading);
        assert!(orchestrator.view().products.is_empty());
        assert!(orchestrator.view().error.is_none());
    }

    #[tokio::test]
    async fn test_retry_repeats_the_same_request() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(500);
        });

        let config = MockConfig::new(server.url("/api/products"));
        let mut orchestrator = FetchOrchestrator::new(config);

        orchestrator.fetch().await;
        orchestrator.retry().await;

        api_mock.assert_hits(2);
        let failure = orchestrator.view().error.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::ServerError);
        assert_eq!(failure.message, "500: server reported an internal error");
    }

    #[tokio::test]
    async fn test_skipped_elements_are_surfaced_not_fatal() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/products");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "data": [
                        {"id": 1, "name": "Ok", "price": 2.5, "stock": 1,
                         "category": {"id": 1, "name": "X", "description": ""}},
                        {"id": 2, "name": "Broken"}
                    ],
                    "count": 2
                }));
        });

        let config = MockConfig::new(server.url("/api/products"));
        let mut orchestrator = FetchOrchestrator::new(config);

        let view = orchestrator.fetch().await;

        api_mock.assert();
        assert!(view.error.is_none());
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.count, 2);
        assert_eq!(view.skipped, 1);
    }
}
