//! Domain-name resolution: mapping `name.crypto` to a literal address for a ticker.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::DomainName;
use crate::types::Ticker;

/// Default endpoint of the Unstoppable Domains resolution API.
pub const DEFAULT_ENDPOINT: &str = "https://api.unstoppabledomains.com/resolve";

/// Why a name could not be turned into an address. None of these are fatal to the field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("domain '{domain}' is not registered")]
    UnknownName { domain: String },
    #[error("domain '{domain}' has no {ticker} address record")]
    NoRecord { domain: String, ticker: String },
    #[error("resolution transport error: {0}")]
    Transport(String),
    #[error("resolution timed out after {ms} ms")]
    Timeout { ms: u64 },
    #[error("resolution service returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl ResolutionError {
    /// Stable short code for JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownName { .. } => "unknown_name",
            Self::NoRecord { .. } => "no_record",
            Self::Transport(_) => "transport",
            Self::Timeout { .. } => "timeout",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// External collaborator that resolves names; implementations must be shareable across tasks.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// Human-readable provider name for logs and output.
    fn name(&self) -> &str;

    async fn resolve(&self, domain: &DomainName, ticker: &Ticker)
        -> Result<String, ResolutionError>;
}

/// In-memory records, keyed by lowercase domain then upper-case ticker.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    records: HashMap<String, HashMap<String, String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(
        mut self,
        domain: impl AsRef<str>,
        ticker: impl AsRef<str>,
        address: impl Into<String>,
    ) -> Self {
        self.insert(domain, ticker, address);
        self
    }

    pub fn insert(
        &mut self,
        domain: impl AsRef<str>,
        ticker: impl AsRef<str>,
        address: impl Into<String>,
    ) {
        self.records
            .entry(domain.as_ref().trim().to_ascii_lowercase())
            .or_default()
            .insert(Ticker::new(ticker).as_str().to_string(), address.into());
    }

    /// Register a name with no address records at all.
    pub fn insert_empty(&mut self, domain: impl AsRef<str>) {
        self.records
            .entry(domain.as_ref().trim().to_ascii_lowercase())
            .or_default();
    }
}

#[async_trait]
impl DomainResolver for StaticResolver {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve(
        &self,
        domain: &DomainName,
        ticker: &Ticker,
    ) -> Result<String, ResolutionError> {
        let records = self
            .records
            .get(&domain.normalized())
            .ok_or_else(|| ResolutionError::UnknownName {
                domain: domain.to_string(),
            })?;

        records
            .get(ticker.as_str())
            .cloned()
            .ok_or_else(|| ResolutionError::NoRecord {
                domain: domain.to_string(),
                ticker: ticker.to_string(),
            })
    }
}

#[derive(Debug, Default, Deserialize)]
struct DomainMeta {
    #[serde(default)]
    owner: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DomainRecordsResponse {
    #[serde(default)]
    meta: DomainMeta,
    #[serde(default)]
    records: HashMap<String, String>,
}

fn address_from_response(
    domain: &DomainName,
    ticker: &Ticker,
    response: DomainRecordsResponse,
) -> Result<String, ResolutionError> {
    let registered = response
        .meta
        .owner
        .as_deref()
        .is_some_and(|owner| !owner.trim().is_empty());
    if !registered {
        return Err(ResolutionError::UnknownName {
            domain: domain.to_string(),
        });
    }

    response
        .records
        .get(&ticker.address_record_key())
        .map(|address| address.trim())
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ResolutionError::NoRecord {
            domain: domain.to_string(),
            ticker: ticker.to_string(),
        })
}

/// HTTP client for the Unstoppable Domains resolution API.
#[derive(Debug, Clone)]
pub struct UnstoppableResolver {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl UnstoppableResolver {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ResolutionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ResolutionError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport(&self, err: reqwest::Error) -> ResolutionError {
        if err.is_timeout() {
            ResolutionError::Timeout {
                ms: self.timeout.as_millis() as u64,
            }
        } else {
            ResolutionError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl DomainResolver for UnstoppableResolver {
    fn name(&self) -> &str {
        "unstoppable"
    }

    async fn resolve(
        &self,
        domain: &DomainName,
        ticker: &Ticker,
    ) -> Result<String, ResolutionError> {
        let url = format!("{}/domains/{}", self.endpoint, domain.normalized());
        debug!(%url, ticker = %ticker, "requesting domain records");

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| self.map_transport(err))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolutionError::UnknownName {
                domain: domain.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ResolutionError::Transport(format!(
                "resolution service answered HTTP {status}"
            )));
        }

        let body: DomainRecordsResponse = response
            .json()
            .await
            .map_err(|err| ResolutionError::InvalidResponse(err.to_string()))?;

        address_from_response(domain, ticker, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainSuffixSet;

    const LTC_ADDR: &str = "ltc1qg82tmtnh9zf3fg0qzzyl4hfxaj7rytxmncuwmd";

    fn name(input: &str) -> DomainName {
        DomainSuffixSet::default()
            .match_domain(input)
            .expect("test input should be domain-shaped")
    }

    #[tokio::test]
    async fn static_resolver_finds_record_case_insensitively() {
        let resolver = StaticResolver::new().with_record("IHateFiat.crypto", "ltc", LTC_ADDR);
        let address = resolver
            .resolve(&name("ihatefiat.CRYPTO"), &Ticker::new("LTC"))
            .await
            .unwrap();
        assert_eq!(address, LTC_ADDR);
    }

    #[tokio::test]
    async fn static_resolver_reports_unknown_and_missing_records() {
        let mut resolver = StaticResolver::new().with_record("ihatefiat.crypto", "btc", "bc1q");
        resolver.insert_empty("empty.crypto");

        let err = resolver
            .resolve(&name("nobody.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unknown_name");

        let err = resolver
            .resolve(&name("ihatefiat.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::NoRecord {
                domain: "ihatefiat.crypto".to_string(),
                ticker: "LTC".to_string()
            }
        );

        let err = resolver
            .resolve(&name("empty.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "no_record");
    }

    #[test]
    fn response_with_record_yields_address() {
        let body: DomainRecordsResponse = serde_json::from_str(&format!(
            r#"{{"meta":{{"domain":"ihatefiat.crypto","owner":"0xabc"}},
                "records":{{"crypto.LTC.address":" {LTC_ADDR} ","crypto.BTC.address":"bc1q"}}}}"#
        ))
        .unwrap();
        let address =
            address_from_response(&name("ihatefiat.crypto"), &Ticker::default(), body).unwrap();
        assert_eq!(address, LTC_ADDR);
    }

    #[test]
    fn response_without_owner_is_unknown() {
        let body: DomainRecordsResponse =
            serde_json::from_str(r#"{"meta":{"owner":null},"records":{}}"#).unwrap();
        let err = address_from_response(&name("ihatefiat.crypto"), &Ticker::default(), body)
            .unwrap_err();
        assert_eq!(err.code(), "unknown_name");
    }

    #[test]
    fn response_without_ticker_record_is_no_record() {
        let body: DomainRecordsResponse = serde_json::from_str(
            r#"{"meta":{"owner":"0xabc"},"records":{"crypto.BTC.address":"bc1q","crypto.LTC.address":""}}"#,
        )
        .unwrap();
        let err = address_from_response(&name("ihatefiat.crypto"), &Ticker::default(), body)
            .unwrap_err();
        assert_eq!(err.code(), "no_record");
    }

    /// Serves one canned HTTP response on a loopback port and hands back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/resolve", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (endpoint, server)
    }

    fn http_resolver(endpoint: &str, api_key: Option<&str>) -> UnstoppableResolver {
        UnstoppableResolver::new(
            endpoint,
            api_key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn http_resolver_reads_record_and_sends_bearer_key() {
        let body = r#"{"meta":{"owner":"0xabc"},"records":{"crypto.LTC.address":"ltc1qg82tmtnh9zf3fg0qzzyl4hfxaj7rytxmncuwmd"}}"#;
        let (endpoint, server) = serve_once("200 OK", body).await;

        let address = http_resolver(&endpoint, Some("secret-key"))
            .resolve(&name("IHateFiat.crypto"), &Ticker::default())
            .await
            .unwrap();
        assert_eq!(address, LTC_ADDR);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(
            request.starts_with("get /resolve/domains/ihatefiat.crypto "),
            "{request}"
        );
        assert!(request.contains("authorization: bearer secret-key"), "{request}");
    }

    #[tokio::test]
    async fn http_resolver_omits_authorization_without_key() {
        let (endpoint, server) = serve_once("200 OK", r#"{"meta":{"owner":"0xabc"},"records":{}}"#).await;

        let err = http_resolver(&endpoint, None)
            .resolve(&name("ihatefiat.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "no_record");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(!request.contains("authorization:"), "{request}");
    }

    #[tokio::test]
    async fn http_not_found_is_unknown_name() {
        let (endpoint, server) = serve_once("404 Not Found", "{}").await;

        let err = http_resolver(&endpoint, None)
            .resolve(&name("nobody.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::UnknownName {
                domain: "nobody.crypto".to_string()
            }
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn http_server_error_is_transport() {
        let (endpoint, server) = serve_once("503 Service Unavailable", "{}").await;

        let err = http_resolver(&endpoint, None)
            .resolve(&name("ihatefiat.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Transport(ref msg) if msg.contains("503")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn http_undecodable_body_is_invalid_response() {
        let (endpoint, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = http_resolver(&endpoint, None)
            .resolve(&name("ihatefiat.crypto"), &Ticker::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_response");
        server.await.unwrap();
    }

    #[test]
    fn unstoppable_resolver_trims_endpoint() {
        let resolver = UnstoppableResolver::new(
            "https://resolve.example.com/",
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(resolver.endpoint(), "https://resolve.example.com");
        assert_eq!(resolver.name(), "unstoppable");
    }
}
