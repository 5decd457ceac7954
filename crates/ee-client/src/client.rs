//! Imagery service client.
//!
//! Requests are sent one at a time and failures are returned as reported
//! by the service. There is no retry or backoff: the caller decides what to
//! do with a failed call.

use std::time::Duration;

use async_trait::async_trait;
use ee_common::{EeError, EeResult};
use ee_expr::Expression;
use metrics::counter;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::map::{FileFormat, MapId, MapOptions};

/// The operations the pipeline needs from the imagery service.
#[async_trait]
pub trait ImageryService: Send + Sync {
    /// Evaluate an expression and return its JSON result.
    async fn compute_value(&self, expression: &Expression) -> EeResult<Value>;

    /// Register an expression as a tiled map.
    async fn create_map(&self, expression: &Expression, options: &MapOptions) -> EeResult<MapId>;
}

#[derive(Serialize)]
struct ComputeValueRequest<'a> {
    expression: &'a Expression,
}

#[derive(Deserialize)]
struct ComputeValueResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMapRequest<'a> {
    expression: &'a Expression,
    file_format: FileFormat,
}

#[derive(Deserialize)]
struct CreateMapResponse {
    name: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// REST client for the imagery service.
pub struct EarthEngineClient {
    client: Client,
    config: ClientConfig,
}

impl EarthEngineClient {
    /// Build a client for an authenticated session.
    ///
    /// No request is made here; an invalid token is reported by the first call.
    pub fn initialize(config: ClientConfig) -> EeResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EeError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            project = %config.project,
            base_url = %config.root(),
            "Initialized imagery service session"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn post<B, R>(&self, endpoint: &'static str, url: &str, body: &B) -> EeResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        counter!("ee_requests_total", "endpoint" => endpoint).increment(1);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .header("x-goog-user-project", &self.config.project)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                counter!("ee_request_errors_total", "endpoint" => endpoint).increment(1);
                EeError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            counter!("ee_request_errors_total", "endpoint" => endpoint).increment(1);
            let err = service_error(response).await;
            warn!(endpoint = endpoint, error = %err, "Imagery service rejected request");
            return Err(err);
        }

        response
            .json::<R>()
            .await
            .map_err(|e| EeError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ImageryService for EarthEngineClient {
    #[instrument(skip(self, expression), fields(project = %self.config.project, values = expression.len()))]
    async fn compute_value(&self, expression: &Expression) -> EeResult<Value> {
        let url = format!("{}/value:compute", self.config.project_url());
        let reply: ComputeValueResponse = self
            .post("value:compute", &url, &ComputeValueRequest { expression })
            .await?;
        Ok(reply.result)
    }

    #[instrument(skip(self, expression, options), fields(project = %self.config.project, values = expression.len()))]
    async fn create_map(&self, expression: &Expression, options: &MapOptions) -> EeResult<MapId> {
        let url = format!("{}/maps", self.config.project_url());
        let body = CreateMapRequest {
            expression,
            file_format: options.file_format,
        };
        let reply: CreateMapResponse = self.post("maps", &url, &body).await?;
        Ok(MapId::new(reply.name, self.config.root()))
    }
}

/// Turn a non-2xx reply into an error, keeping the service's own wording.
async fn service_error(response: Response) -> EeError {
    let status = response.status();
    let text = match response.text().await {
        Ok(t) => t,
        Err(e) => return EeError::Transport(e.to_string()),
    };
    parse_service_error(status.as_u16(), status.canonical_reason(), &text)
}

fn parse_service_error(code: u16, reason: Option<&str>, body: &str) -> EeError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => EeError::Service {
            code: env.error.code,
            status: env.error.status,
            message: env.error.message,
        },
        Err(_) => EeError::Service {
            code,
            status: reason.unwrap_or("UNKNOWN").to_string(),
            message: body.trim().to_string(),
        },
    }
}
