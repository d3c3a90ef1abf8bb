use anyhow::{Result, anyhow};
use reqwest::{
    Client, Method, Response, Url,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

/// REST client for the Docere appointment backend.
///
/// Requests carry no authentication; the backend is addressed by a fixed origin
/// taken from [`AppConfig::backend_url`].
#[derive(Clone)]
pub struct DocereClient {
    client: Client,
    base_url: String,
}

impl DocereClient {
    pub fn new(config: &AppConfig) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().unwrap_or_else(|e| {
            warn!("Failed to build configured HTTP client ({}), using defaults", e);
            Client::new()
        });

        Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Joins `segments` onto the base url, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| anyhow!("Invalid backend url '{}': {}", self.base_url, e))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("Backend url '{}' cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Response> {
        let url = self.url(segments)?;
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, url)
            .headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn request<T>(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, segments, body).await?;
        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Sends a request whose response body is not needed.
    pub async fn execute(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<()> {
        self.send(method, segments, body).await?;
        Ok(())
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Value> {
        self.request(Method::GET, &["api", "doctors", doctor_id], None).await
    }

    pub async fn get_appointments(&self, doctor_id: &str) -> Result<Vec<Value>> {
        self.request(Method::GET, &["api", "appointments", doctor_id], None).await
    }

    pub async fn update_appointment_status(&self, appointment_id: &str, body: &Value) -> Result<()> {
        self.execute(Method::PUT, &["api", "appointments", "status", appointment_id], Some(body)).await
    }

    pub async fn update_appointment(&self, appointment_id: &str, body: &Value) -> Result<()> {
        self.execute(Method::PUT, &["api", "appointments", appointment_id], Some(body)).await
    }

    pub async fn delete_appointment(&self, appointment_id: &str) -> Result<()> {
        self.execute(Method::DELETE, &["api", "appointments", appointment_id], None).await
    }
}
