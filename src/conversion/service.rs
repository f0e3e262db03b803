// HTTP client for the local conversion backend
use crate::models::ConversionRequest;
use log::debug;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const PING_TIMEOUT: Duration = Duration::from_millis(800);
const PING_PATH: &str = "/ping";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid backend URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request never got an HTTP answer
    #[error("{0}")]
    Unreachable(String),
}

/// Raw answer from the backend, before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl ServiceReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend's `error` field, or a generic message when it sent none
    pub fn error_message(&self) -> String {
        self.body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(|error| error.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Backend returned status {}", self.status))
    }
}

pub trait ConversionService: Send + Sync {
    /// Post one conversion job to the endpoint of its mode
    fn submit(&self, request: &ConversionRequest) -> Result<ServiceReply, TransportError>;

    /// Whether the backend reports itself as up
    fn ping(&self) -> Result<bool, TransportError>;
}

#[derive(Clone)]
pub struct HttpConversionService {
    base_url: Url,
    agent: ureq::Agent,
    ping_agent: ureq::Agent,
}

impl HttpConversionService {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, TransportError> {
        let mut parsed = Url::parse(base_url).map_err(|source| TransportError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        // Keep any path prefix when joining endpoint paths
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(request_timeout)
            .build();
        let ping_agent = ureq::AgentBuilder::new().timeout(PING_TIMEOUT).build();

        Ok(Self {
            base_url: parsed,
            agent,
            ping_agent,
        })
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| TransportError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                source,
            })
    }
}

fn into_reply(response: ureq::Response) -> ServiceReply {
    let status = response.status();
    let body = response.into_json::<serde_json::Value>().ok();
    ServiceReply { status, body }
}

impl ConversionService for HttpConversionService {
    fn submit(&self, request: &ConversionRequest) -> Result<ServiceReply, TransportError> {
        let url = self.endpoint_url(request.mode.endpoint())?;
        debug!("POST {} ({} bytes of source)", url, request.source_code.len());

        match self.agent.post(url.as_str()).send_json(request) {
            Ok(response) => Ok(into_reply(response)),
            Err(ureq::Error::Status(_, response)) => Ok(into_reply(response)),
            Err(other) => Err(TransportError::Unreachable(other.to_string())),
        }
    }

    fn ping(&self) -> Result<bool, TransportError> {
        let url = self.endpoint_url(PING_PATH)?;

        match self.ping_agent.get(url.as_str()).call() {
            Ok(response) => {
                let reply = into_reply(response);
                let status_ok = reply
                    .body
                    .as_ref()
                    .and_then(|body| body.get("status"))
                    .and_then(|status| status.as_str())
                    == Some("ok");
                Ok(reply.is_success() && status_ok)
            }
            Err(ureq::Error::Status(_, _)) => Ok(false),
            Err(other) => Err(TransportError::Unreachable(other.to_string())),
        }
    }
}
