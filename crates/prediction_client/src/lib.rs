// Rust guideline compliant 2026-10-14

//! HTTP adapter for the `domain::Predictor` port.
//!
//! [`HttpPredictor`] re-serializes normalized rows as CSV and uploads them as
//! a multipart form to `POST {base_url}/predict`. The whole exchange runs
//! under a single timeout; when it expires the in-flight request is dropped.
//! There are no retries.
//!
//! Configuration via [`PredictorConfig::builder`].

mod encode;

pub use encode::encode_csv;

use domain::{NormalizedRow, PredictionError, PredictionResponse, Predictor};
use reqwest::multipart::{Form, Part};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

/// Errors raised while constructing an [`HttpPredictor`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The supplied configuration is invalid.
    #[error("invalid predictor configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// The HTTP client could not be initialized.
    #[error("failed to build HTTP client: {source}")]
    Http {
        /// The underlying client error.
        #[from]
        source: reqwest::Error,
    },
}

// ---------------------------------------------------------------------------
// PredictorConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for an [`HttpPredictor`].
///
/// Construct via [`PredictorConfig::builder`].
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Service root, e.g. `https://fraud.example.com`.
    pub base_url: String,
    /// Upper bound on the whole request/response exchange.
    pub timeout: Duration,
    /// File name attached to the uploaded multipart part.
    pub file_name: String,
}

/// Builder for [`PredictorConfig`].
///
/// Obtain via [`PredictorConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct PredictorConfigBuilder {
    base_url: String,
    timeout: Duration,
    file_name: String,
}

impl PredictorConfig {
    /// Create a builder. `base_url` is the only required parameter.
    ///
    /// Default values: `timeout = 120 s`, `file_name = "processed_transactions.csv"`.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> PredictorConfigBuilder {
        PredictorConfigBuilder {
            base_url: base_url.into(),
            // Hosted models can take well over a minute to wake up.
            timeout: Duration::from_secs(120),
            file_name: "processed_transactions.csv".to_owned(),
        }
    }

    /// Full URL of the prediction endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }
}

impl PredictorConfigBuilder {
    /// Override the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the uploaded file name.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when the base URL is not an
    /// `http(s)://` URL, the timeout is zero, or the file name is empty.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<PredictorConfig, ClientError> {
        let base_url = self.base_url.trim().to_owned();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig {
                reason: format!("base_url must start with http:// or https://, got {base_url:?}"),
            });
        }
        if self.timeout.is_zero() {
            return Err(ClientError::InvalidConfig {
                reason: "timeout must be > 0".to_owned(),
            });
        }
        if self.file_name.trim().is_empty() {
            return Err(ClientError::InvalidConfig {
                reason: "file_name must not be empty".to_owned(),
            });
        }
        Ok(PredictorConfig {
            base_url,
            timeout: self.timeout,
            file_name: self.file_name,
        })
    }
}

// ---------------------------------------------------------------------------
// HttpPredictor
// ---------------------------------------------------------------------------

/// `domain::Predictor` adapter backed by the remote prediction service.
#[derive(Debug)]
pub struct HttpPredictor {
    config: PredictorConfig,
    http: reqwest::Client,
}

impl HttpPredictor {
    /// Create a predictor from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] when the HTTP client cannot be built.
    pub fn new(config: PredictorConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { config, http })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    fn upload_form(&self, body: Vec<u8>) -> Result<Form, PredictionError> {
        let part = Part::bytes(body)
            .file_name(self.config.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| PredictionError::Encode {
                reason: e.to_string(),
            })?;
        Ok(Form::new().part("file", part))
    }
}

impl Predictor for HttpPredictor {
    /// Upload `rows` and parse the bucketed response.
    ///
    /// # Errors
    ///
    /// - [`PredictionError::Timeout`] when no complete response arrives in time.
    /// - [`PredictionError::Network`] when the request cannot be sent or read.
    /// - [`PredictionError::Status`] on a non-2xx response.
    /// - [`PredictionError::InvalidResponse`] when a 2xx body is not a
    ///   prediction object.
    async fn predict(&self, rows: &[NormalizedRow]) -> Result<PredictionResponse, PredictionError> {
        let body = encode_csv(rows)?;
        let url = self.config.endpoint();
        log::info!(
            "prediction_client.request: url={url} rows={} bytes={}",
            rows.len(),
            body.len()
        );
        let form = self.upload_form(body)?;

        let exchange = async {
            let response = self
                .http
                .post(&url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| network_error(&e))?;
            let status = response.status();
            let text = response.text().await.map_err(|e| network_error(&e))?;
            Ok::<_, PredictionError>((status, text))
        };
        let (status, text) = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_elapsed| PredictionError::Timeout {
                timeout: self.config.timeout,
            })??;

        log::debug!(
            "prediction_client.response: status={} bytes={}",
            status.as_u16(),
            text.len()
        );
        if !status.is_success() {
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_response(&text)
    }
}

fn network_error(err: &reqwest::Error) -> PredictionError {
    PredictionError::Network {
        reason: err.to_string(),
    }
}

/// Parse a 2xx body. Anything but a JSON object is rejected.
fn parse_response(text: &str) -> Result<PredictionResponse, PredictionError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| PredictionError::InvalidResponse {
            reason: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(PredictionError::InvalidResponse {
            reason: "expected a JSON object".to_owned(),
        });
    }
    serde_json::from_value(value).map_err(|e| PredictionError::InvalidResponse {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{ClientError, HttpPredictor, PredictorConfig, parse_response};
    use domain::{Category, DerivedTime, NormalizedRow, PredictionError, Predictor, RiskLevel, UsState};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // ------------------------------------------------------------------
    // Mock server
    // ------------------------------------------------------------------

    /// What the mock server does after reading one request.
    enum Reply {
        Respond { status: &'static str, body: &'static str },
        Stall,
    }

    /// Accept one connection, read one request and reply.
    /// Resolves to the raw request text.
    async fn serve_once(reply: Reply) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            match reply {
                Reply::Respond { status, body } => {
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    socket.write_all(response.as_bytes()).await.unwrap();
                    socket.shutdown().await.unwrap();
                }
                Reply::Stall => tokio::time::sleep(Duration::from_secs(5)).await,
            }
            request
        });
        (addr, handle)
    }

    /// Read headers plus a `Content-Length` or chunked body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            let Some(head_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let head = text[..head_end].to_ascii_lowercase();
            let body_len = buf.len() - head_end - 4;
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            let complete = match content_length {
                Some(len) => body_len >= len,
                None => text.ends_with("0\r\n\r\n"),
            };
            if complete {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn predictor(addr: SocketAddr, timeout: Duration) -> HttpPredictor {
        let config = PredictorConfig::builder(format!("http://{addr}/"))
            .timeout(timeout)
            .build()
            .unwrap();
        HttpPredictor::new(config).unwrap()
    }

    fn row(id: &str) -> NormalizedRow {
        NormalizedRow {
            id: id.to_owned(),
            cc_num: None,
            amount: 42.0,
            date: Some("2019-01-01".to_owned()),
            time: DerivedTime::default(),
            category: Category::DEFAULT,
            gender_m: true,
            state: UsState::DEFAULT,
            age: 30.0,
            extra: [("merchant", "Acme")].into_iter().collect(),
        }
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    #[test]
    fn builder_defaults_and_endpoint() {
        let config = PredictorConfig::builder("https://api.example.com/").build().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.file_name, "processed_transactions.csv");
        assert_eq!(config.endpoint(), "https://api.example.com/predict");
    }

    #[test]
    fn builder_rejects_bad_values() {
        for url in ["", "ftp://x", "localhost:8000"] {
            let err = PredictorConfig::builder(url).build().unwrap_err();
            assert!(matches!(err, ClientError::InvalidConfig { .. }), "{url}");
        }
        let err = PredictorConfig::builder("http://x")
            .timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig { .. }));
        let err = PredictorConfig::builder("http://x").file_name(" ").build().unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig { .. }));
    }

    // ------------------------------------------------------------------
    // Response parsing
    // ------------------------------------------------------------------

    #[test]
    fn non_object_bodies_are_invalid() {
        for body in ["[]", "[[], [], []]", "\"ok\"", "not json", ""] {
            let err = parse_response(body).unwrap_err();
            assert!(matches!(err, PredictionError::InvalidResponse { .. }), "{body}");
        }
    }

    #[test]
    fn wrongly_typed_bucket_is_invalid() {
        let err = parse_response(r#"{"highRiskTransactions": 5}"#).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidResponse { .. }));
    }

    // ------------------------------------------------------------------
    // Round trips against the mock server
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn success_uploads_csv_and_parses_buckets() {
        let body = r#"{"highRiskTransactions":[{"id":"T1","fraud_probability":0.93}],
                       "mediumRiskTransactions":[],"lowRiskTransactions":[{"id":"T2"}]}"#;
        let (addr, server) = serve_once(Reply::Respond { status: "200 OK", body }).await;

        let resp = predictor(addr, Duration::from_secs(5))
            .predict(&[row("T1"), row("T2")])
            .await
            .unwrap();
        assert_eq!(resp.bucket(RiskLevel::High).len(), 1);
        assert_eq!(resp.bucket(RiskLevel::Low).len(), 1);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /predict HTTP/1.1"), "{request}");
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains("name=\"file\"; filename=\"processed_transactions.csv\""));
        assert!(request.contains("text/csv"));
        assert!(request.contains("merchant,id,trans_num,amt,amount,date,category_1"));
        assert!(request.contains("Acme,T2,T2,42,42,2019-01-01,1"));
    }

    #[tokio::test]
    async fn non_2xx_is_status_error_with_body() {
        let (addr, server) = serve_once(Reply::Respond {
            status: "503 Service Unavailable",
            body: "model is waking up",
        })
        .await;
        let err = predictor(addr, Duration::from_secs(5))
            .predict(&[row("T1")])
            .await
            .unwrap_err();
        match err {
            PredictionError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model is waking up");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn html_success_body_is_invalid_response() {
        let (addr, server) = serve_once(Reply::Respond {
            status: "200 OK",
            body: "<html>gateway</html>",
        })
        .await;
        let err = predictor(addr, Duration::from_secs(5))
            .predict(&[row("T1")])
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::InvalidResponse { .. }), "{err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn stalled_server_times_out() {
        let (addr, server) = serve_once(Reply::Stall).await;
        let err = predictor(addr, Duration::from_millis(200))
            .predict(&[row("T1")])
            .await
            .unwrap_err();
        assert!(
            matches!(err, PredictionError::Timeout { timeout } if timeout == Duration::from_millis(200)),
            "{err:?}"
        );
        assert!(err.to_string().ends_with("200ms"), "{err}");
        server.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let err = predictor(addr, Duration::from_secs(5))
            .predict(&[row("T1")])
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Network { .. }), "{err:?}");
    }
}
