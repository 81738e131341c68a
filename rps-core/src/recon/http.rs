use crate::config::ReconConfig;
use crate::error::{CoreError, Result};
use crate::recon::{ReconRequest, ReconResponse, ReconstructionClient};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

/// Invoke envelope routed to a fixed service and channel.
#[derive(Debug, Serialize)]
struct InvokeEnvelope<'a> {
    service: &'a str,
    channel: &'a str,
    function: &'a str,
    args: [&'a str; 2],
}

pub struct HttpReconClient {
    http: reqwest::Client,
    invoke_url: String,
    service: String,
    channel: String,
}

impl HttpReconClient {
    pub fn new(endpoint: &str, service: &str, channel: &str) -> Result<Self> {
        if endpoint.is_empty() {
            return Err(CoreError::config("Reconstruction endpoint cannot be empty"));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            invoke_url: format!("{}/invoke", endpoint.trim_end_matches('/')),
            service: service.to_string(),
            channel: channel.to_string(),
        })
    }

    pub fn from_config(config: &ReconConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| CoreError::config("No reconstruction endpoint configured"))?;
        Self::new(endpoint, &config.service, &config.channel)
    }

    pub fn invoke_url(&self) -> &str {
        &self.invoke_url
    }
}

#[async_trait]
impl ReconstructionClient for HttpReconClient {
    async fn init_recon(&self, request: &ReconRequest) -> Result<ReconResponse> {
        let envelope = InvokeEnvelope {
            service: &self.service,
            channel: &self.channel,
            function: &request.function,
            args: [request.reference.as_str(), request.namespace.as_str()],
        };

        tracing::debug!(
            "POST {} {} {}",
            self.invoke_url,
            request.function,
            request.reference
        );

        let response = self.http.post(&self.invoke_url).json(&envelope).send().await?;
        let http_status = response.status();
        let body = response.text().await?;

        response_from(http_status, &body)
    }
}

/// Map an HTTP reply onto the service's `{status, message}` answer.
///
/// A non-2xx reply carries the HTTP status and the raw body. A 2xx reply must
/// be the JSON answer itself, except an empty body, which takes the HTTP status.
fn response_from(http_status: StatusCode, body: &str) -> Result<ReconResponse> {
    if !http_status.is_success() || body.trim().is_empty() {
        return Ok(ReconResponse {
            status: http_status.as_u16(),
            message: body.to_string(),
        });
    }

    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_url_normalised() {
        let client = HttpReconClient::new("http://localhost:7050/", "honeybadgerscc", "mychannel")
            .unwrap();
        assert_eq!(client.invoke_url(), "http://localhost:7050/invoke");
    }

    #[test]
    fn test_envelope_shape() {
        let request = ReconRequest::init_recon("rpsalicecell", "rps");
        let envelope = InvokeEnvelope {
            service: "honeybadgerscc",
            channel: "mychannel",
            function: &request.function,
            args: [request.reference.as_str(), request.namespace.as_str()],
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["function"], "initRecon");
        assert_eq!(json["args"][0], "rpsalicecell");
        assert_eq!(json["args"][1], "rps");
        assert_eq!(json["channel"], "mychannel");
    }

    #[test]
    fn test_error_status_keeps_body() {
        let response =
            response_from(StatusCode::SERVICE_UNAVAILABLE, "peer pool exhausted").unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.message, "peer pool exhausted");
        assert!(!response.is_ok());

        let response = response_from(StatusCode::NOT_FOUND, "").unwrap();
        assert_eq!(response.status, 404);
        assert!(response.message.is_empty());
    }

    #[test]
    fn test_success_body_is_the_answer() {
        let response =
            response_from(StatusCode::OK, r#"{"status":200,"message":"recon started"}"#).unwrap();
        assert_eq!(
            response,
            ReconResponse {
                status: 200,
                message: "recon started".to_string()
            }
        );

        let response = response_from(StatusCode::OK, r#"{"status":500}"#).unwrap();
        assert_eq!(response.status, 500);
        assert!(response.message.is_empty());
        assert!(!response.is_ok());

        assert!(response_from(StatusCode::OK, "  ").unwrap().is_ok());
    }

    #[test]
    fn test_success_with_garbage_body_is_an_error() {
        let err = response_from(StatusCode::OK, "<html>gateway</html>").unwrap_err();
        assert!(matches!(err, CoreError::Encoding(_)));
    }

    #[test]
    fn test_requires_endpoint() {
        assert!(HttpReconClient::from_config(&ReconConfig::default()).is_err());
    }
}
