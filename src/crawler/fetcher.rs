//! HTTP fetch gateway
//!
//! This module retrieves page text for the crawler, including:
//! - Building the shared HTTP client with a proper user agent string
//! - Direct requests and relay (proxy) requests behind one strategy trait
//! - Trying strategies in order with linear backoff between failures
//! - Bounding every attempt with an explicit timeout
//! - A final direct fallback once every strategy is exhausted

use crate::config::{FetchConfig, StrategyOrder};
use crate::url::is_web_url;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed by a single request
const MAX_REDIRECTS: usize = 10;

/// Why a single strategy attempt failed
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to read body: {0}")]
    Body(String),
}

/// Every strategy for one URL failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("All {attempts} fetch attempts failed for {url}: {last}")]
    Exhausted {
        url: String,
        attempts: usize,
        #[source]
        last: StrategyError,
    },

    #[error("No fetch strategies configured for {url}")]
    NoStrategies { url: String },

    #[error("Cannot fetch {url}: unsupported scheme '{scheme}'")]
    UnsupportedScheme { url: String, scheme: String },
}

/// One way of retrieving a URL's text
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    /// Makes a single attempt; no retries inside
    async fn attempt(&self, url: &Url) -> Result<String, StrategyError>;
}

/// Source of page text consumed by the crawl engine
///
/// `FetchGateway` is the production implementation; anything that can turn a
/// URL into document text (a fixture map, a cache) can drive a crawl.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use linkweave::config::FetchConfig;
/// use linkweave::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.attempt_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Requests the URL itself
pub struct DirectStrategy {
    client: Client,
}

impl DirectStrategy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> &str {
        "direct"
    }

    async fn attempt(&self, url: &Url) -> Result<String, StrategyError> {
        get_text(&self.client, url.as_str()).await
    }
}

/// Requests the URL through a relay endpoint
///
/// The relay is addressed as `prefix + percent-encoded target`, e.g.
/// `https://relay.example/raw?url=https%3A%2F%2Fexample.com%2F`.
pub struct RelayStrategy {
    client: Client,
    prefix: String,
    label: String,
}

impl RelayStrategy {
    pub fn new(client: Client, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let label = format!("relay {}", prefix);
        Self {
            client,
            prefix,
            label,
        }
    }

    /// The relay request URL for a target
    pub fn relay_target(&self, url: &Url) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(url.as_str()))
    }
}

#[async_trait]
impl FetchStrategy for RelayStrategy {
    fn name(&self) -> &str {
        &self.label
    }

    async fn attempt(&self, url: &Url) -> Result<String, StrategyError> {
        get_text(&self.client, &self.relay_target(url)).await
    }
}

/// Issues one GET and classifies the failure
async fn get_text(client: &Client, target: &str) -> Result<String, StrategyError> {
    let response = client.get(target).send().await.map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(StrategyError::Status {
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| StrategyError::Body(e.to_string()))
}

fn classify_error(e: reqwest::Error) -> StrategyError {
    if e.is_timeout() {
        StrategyError::Timeout
    } else if e.is_connect() {
        StrategyError::Connect(e.to_string())
    } else {
        StrategyError::Transport(e.to_string())
    }
}

/// Delay after the failure of attempt `attempt_index` (zero-based)
///
/// Linear: `base * (attempt_index + 1)`.
pub fn backoff_delay(base: Duration, attempt_index: usize) -> Duration {
    let factor = u32::try_from(attempt_index.saturating_add(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Multi-strategy fetcher
///
/// No single endpoint is trusted: strategies are tried in order until one
/// returns a successful body, waiting `backoff_delay` after every failure.
/// If all of them fail, the optional fallback gets exactly one attempt.
pub struct FetchGateway {
    strategies: Vec<Box<dyn FetchStrategy>>,
    fallback: Option<Box<dyn FetchStrategy>>,
    base_delay: Duration,
    attempt_timeout: Duration,
}

impl FetchGateway {
    /// Creates a gateway over an ordered strategy list
    pub fn new(
        strategies: Vec<Box<dyn FetchStrategy>>,
        base_delay: Duration,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            fallback: None,
            base_delay,
            attempt_timeout,
        }
    }

    /// Sets the strategy tried once after every other strategy failed
    pub fn with_fallback(mut self, fallback: Box<dyn FetchStrategy>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Builds the gateway described by the configuration
    ///
    /// | Order | Strategies | Final fallback |
    /// |-------|------------|----------------|
    /// | `relays-first` | relays in list order | direct |
    /// | `direct-first` | direct, then relays | none |
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;

        let relays = config.relays.iter().map(|prefix| {
            Box::new(RelayStrategy::new(client.clone(), prefix.as_str())) as Box<dyn FetchStrategy>
        });
        let direct: Box<dyn FetchStrategy> = Box::new(DirectStrategy::new(client.clone()));

        let base_delay = Duration::from_millis(config.base_delay_ms);
        let attempt_timeout = Duration::from_secs(config.attempt_timeout_secs);

        let gateway = match config.strategy_order {
            StrategyOrder::RelaysFirst => {
                Self::new(relays.collect(), base_delay, attempt_timeout).with_fallback(direct)
            }
            StrategyOrder::DirectFirst => {
                let strategies = std::iter::once(direct).chain(relays).collect();
                Self::new(strategies, base_delay, attempt_timeout)
            }
        };

        Ok(gateway)
    }

    /// Strategy labels in the order they are tried, fallback last
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .chain(self.fallback.iter())
            .map(|s| s.name())
            .collect()
    }

    /// Fetches the text content of a URL
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body of the first successful attempt
    /// * `Err(FetchError)` - Every strategy and the fallback failed; carries
    ///   the last underlying failure. Non-HTTP(S) URLs fail up front without
    ///   any request.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if !is_web_url(url) {
            return Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
                scheme: url.scheme().to_string(),
            });
        }

        let mut attempts = 0;
        let mut last_error = None;
        let final_index = self.strategies.len().saturating_sub(1);

        for (index, strategy) in self.strategies.iter().enumerate() {
            attempts += 1;
            match self.attempt(strategy.as_ref(), url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} via {}", url, strategy.name());
                    return Ok(body);
                }
                Err(e) if index == final_index && self.fallback.is_none() => {
                    tracing::debug!("{} failed for {}: {}", strategy.name(), url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    let delay = backoff_delay(self.base_delay, index);
                    tracing::debug!(
                        "{} failed for {}: {} (next attempt in {:?})",
                        strategy.name(),
                        url,
                        e,
                        delay
                    );
                    last_error = Some(e);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            attempts += 1;
            match self.attempt(fallback.as_ref(), url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} via fallback {}", url, fallback.name());
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!("Fallback {} failed for {}: {}", fallback.name(), url, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts,
                last,
            }),
            None => Err(FetchError::NoStrategies {
                url: url.to_string(),
            }),
        }
    }

    async fn attempt(
        &self,
        strategy: &dyn FetchStrategy,
        url: &Url,
    ) -> Result<String, StrategyError> {
        match tokio::time::timeout(self.attempt_timeout, strategy.attempt(url)).await {
            Ok(result) => result,
            Err(_) => Err(StrategyError::Timeout),
        }
    }
}

#[async_trait]
impl PageSource for FetchGateway {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        self.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    /// Strategy with a scripted outcome that records when it was called
    struct ScriptedStrategy {
        name: String,
        body: Option<&'static str>,
        hang: bool,
        calls: Arc<Mutex<Vec<(String, Instant)>>>,
    }

    impl ScriptedStrategy {
        fn failing(name: &str, calls: &Arc<Mutex<Vec<(String, Instant)>>>) -> Box<dyn FetchStrategy> {
            Box::new(Self {
                name: name.to_string(),
                body: None,
                hang: false,
                calls: Arc::clone(calls),
            })
        }

        fn succeeding(
            name: &str,
            body: &'static str,
            calls: &Arc<Mutex<Vec<(String, Instant)>>>,
        ) -> Box<dyn FetchStrategy> {
            Box::new(Self {
                name: name.to_string(),
                body: Some(body),
                hang: false,
                calls: Arc::clone(calls),
            })
        }

        fn hanging(name: &str, calls: &Arc<Mutex<Vec<(String, Instant)>>>) -> Box<dyn FetchStrategy> {
            Box::new(Self {
                name: name.to_string(),
                body: None,
                hang: true,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl FetchStrategy for ScriptedStrategy {
        fn name(&self) -> &str {
            &self.name
        }

        async fn attempt(&self, _url: &Url) -> Result<String, StrategyError> {
            self.calls
                .lock()
                .unwrap()
                .push((self.name.clone(), Instant::now()));
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            match self.body {
                Some(body) => Ok(body.to_string()),
                None => Err(StrategyError::Status { status: 503 }),
            }
        }
    }

    fn target() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn call_log() -> Arc<Mutex<Vec<(String, Instant)>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[test]
    fn test_backoff_is_linear() {
        let base = Duration::from_millis(200);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(400));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_through_failing_strategies() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::failing("a", &calls),
                ScriptedStrategy::failing("b", &calls),
                ScriptedStrategy::failing("c", &calls),
                ScriptedStrategy::succeeding("d", "<html>ok</html>", &calls),
            ],
            Duration::from_millis(100),
            Duration::from_secs(5),
        );

        let body = gateway.fetch(&target()).await.unwrap();
        assert_eq!(body, "<html>ok</html>");

        let calls = calls.lock().unwrap();
        let names: Vec<&str> = calls.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);

        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1].1 - w[0].1).collect();
        assert_eq!(gaps.len(), 3);
        for (index, gap) in gaps.iter().enumerate() {
            assert!(*gap >= backoff_delay(Duration::from_millis(100), index));
        }
        assert!(gaps[0] < gaps[1] && gaps[1] < gaps[2], "gaps: {:?}", gaps);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_stops_iteration() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::succeeding("a", "first", &calls),
                ScriptedStrategy::succeeding("b", "second", &calls),
            ],
            Duration::from_millis(100),
            Duration::from_secs(5),
        )
        .with_fallback(ScriptedStrategy::succeeding("direct", "third", &calls));

        assert_eq!(gateway.fetch(&target()).await.unwrap(), "first");
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_used_after_exhaustion() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::failing("a", &calls),
                ScriptedStrategy::failing("b", &calls),
            ],
            Duration::from_millis(50),
            Duration::from_secs(5),
        )
        .with_fallback(ScriptedStrategy::succeeding("direct", "direct body", &calls));

        assert_eq!(gateway.fetch(&target()).await.unwrap(), "direct body");

        let names: Vec<String> = calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["a", "b", "direct"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_reports_attempts_and_last_error() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::failing("a", &calls),
                ScriptedStrategy::failing("b", &calls),
            ],
            Duration::from_millis(10),
            Duration::from_secs(5),
        )
        .with_fallback(ScriptedStrategy::failing("direct", &calls));

        let err = gateway.fetch(&target()).await.unwrap_err();
        match err {
            FetchError::Exhausted { url, attempts, last } => {
                assert_eq!(url, "https://example.com/page");
                assert_eq!(attempts, 3);
                assert!(matches!(last, StrategyError::Status { status: 503 }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_strategy_times_out() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::hanging("slow", &calls),
                ScriptedStrategy::succeeding("fast", "done", &calls),
            ],
            Duration::from_millis(10),
            Duration::from_secs(2),
        );

        let started = Instant::now();
        assert_eq!(gateway.fetch(&target()).await.unwrap(), "done");
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_backoff_after_final_failure() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![
                ScriptedStrategy::failing("direct", &calls),
                ScriptedStrategy::failing("relay", &calls),
            ],
            Duration::from_millis(100),
            Duration::from_secs(5),
        );

        let started = Instant::now();
        let err = gateway.fetch(&target()).await.unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100), "elapsed: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(200), "elapsed: {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_before_fallback_is_kept() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![ScriptedStrategy::failing("relay", &calls)],
            Duration::from_millis(100),
            Duration::from_secs(5),
        )
        .with_fallback(ScriptedStrategy::failing("direct", &calls));

        let started = Instant::now();
        gateway.fetch(&target()).await.unwrap_err();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(100), "elapsed: {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(200), "elapsed: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_non_web_url_is_not_requested() {
        let calls = call_log();
        let gateway = FetchGateway::new(
            vec![ScriptedStrategy::succeeding("relay", "body", &calls)],
            Duration::ZERO,
            Duration::from_secs(1),
        );
        let url = Url::parse("mailto:someone@example.com").unwrap();

        let err = gateway.fetch(&url).await.unwrap_err();

        match err {
            FetchError::UnsupportedScheme { scheme, .. } => assert_eq!(scheme, "mailto"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_strategies() {
        let gateway = FetchGateway::new(vec![], Duration::ZERO, Duration::from_secs(1));
        let err = gateway.fetch(&target()).await.unwrap_err();
        assert!(matches!(err, FetchError::NoStrategies { .. }));
    }

    #[test]
    fn test_relay_target_encodes_url() {
        let client = Client::new();
        let relay = RelayStrategy::new(client, "https://relay.example.com/raw?url=");
        let url = Url::parse("https://example.com/a b?x=1&y=2").unwrap();
        assert_eq!(
            relay.relay_target(&url),
            "https://relay.example.com/raw?url=https%3A%2F%2Fexample.com%2Fa%2520b%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_relays_first_order() {
        let config = FetchConfig {
            relays: vec![
                "https://one.example/?u=".to_string(),
                "https://two.example/?u=".to_string(),
            ],
            ..FetchConfig::default()
        };
        let gateway = FetchGateway::from_config(&config).unwrap();
        assert_eq!(
            gateway.strategy_names(),
            vec!["relay https://one.example/?u=", "relay https://two.example/?u=", "direct"]
        );
        assert!(gateway.fallback.is_some());
    }

    #[test]
    fn test_direct_first_order() {
        let config = FetchConfig {
            strategy_order: StrategyOrder::DirectFirst,
            relays: vec!["https://one.example/?u=".to_string()],
            ..FetchConfig::default()
        };
        let gateway = FetchGateway::from_config(&config).unwrap();
        assert_eq!(
            gateway.strategy_names(),
            vec!["direct", "relay https://one.example/?u="]
        );
        assert!(gateway.fallback.is_none());
    }
}
