//! HTTP client for a Confluent-compatible schema registry

use super::{subject_name, SchemaFormat, SchemaHandle, SchemaResolver};
use crate::error::{EventError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REGISTRY_MEDIA_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Connection settings for the registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL (e.g., "http://localhost:8081")
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            username: None,
            password: None,
            request_timeout_secs: 30,
        }
    }
}

/// Schema registration request
#[derive(Debug, Serialize)]
struct RegisterSchemaRequest<'a> {
    schema: &'a str,

    #[serde(rename = "schemaType")]
    schema_type: &'a str,
}

/// Schema registration response
#[derive(Debug, Deserialize)]
struct RegisterSchemaResponse {
    id: u32,
}

/// Subject version as returned by `GET /subjects/{subject}/versions/latest`
#[derive(Debug, Deserialize)]
struct SubjectVersionResponse {
    subject: String,
    id: u32,
    version: u32,
    schema: String,

    /// Absent for Avro, which is the registry default
    #[serde(rename = "schemaType", default)]
    schema_type: Option<SchemaFormat>,
}

/// HTTP schema registry client
pub struct HttpSchemaRegistry {
    base_url: String,
    http_client: reqwest::Client,
    credentials: Option<(String, Option<String>)>,
}

impl HttpSchemaRegistry {
    /// Create a registry client
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EventError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let credentials = config.username.map(|user| (user, config.password));

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http_client,
            credentials,
        })
    }

    /// Registry base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, REGISTRY_MEDIA_TYPE);

        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_ref()),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        builder.send().await.map_err(|e| {
            EventError::RegistryUnavailable(format!("{} request failed: {}", what, e))
        })
    }

    async fn delete_step(&self, subject: &str, path: &str) -> Result<()> {
        let response = self
            .send(self.request(reqwest::Method::DELETE, path), "Subject delete")
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::NotFound(format!("Subject '{}': {}", subject, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::RegistryUnavailable(format!(
                "Deleting subject '{}' failed with status {}: {}",
                subject, status, body
            )));
        }
        Ok(())
    }

    /// Find the version under which `definition` is registered in `subject`
    async fn lookup_version(
        &self,
        subject: &str,
        definition: &str,
        format: SchemaFormat,
    ) -> Result<SchemaHandle> {
        let body = serde_json::to_vec(&RegisterSchemaRequest {
            schema: definition,
            schema_type: format.as_str(),
        })?;

        let response = self
            .send(
                self.request(reqwest::Method::POST, &format!("/subjects/{}", subject))
                    .header(CONTENT_TYPE, REGISTRY_MEDIA_TYPE)
                    .body(body),
                "Schema lookup",
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::RegistryUnavailable(format!(
                "Schema lookup in '{}' failed with status {}: {}",
                subject, status, body
            )));
        }

        let found: SubjectVersionResponse = response.json().await.map_err(|e| {
            EventError::RegistryUnavailable(format!("Failed to parse lookup response: {}", e))
        })?;

        SchemaHandle::new(
            found.id,
            found.subject,
            found.version,
            found.schema,
            found.schema_type.unwrap_or(format),
        )
    }

    async fn fetch_latest(&self, subject: &str) -> Result<Option<SchemaHandle>> {
        let response = self
            .send(
                self.request(
                    reqwest::Method::GET,
                    &format!("/subjects/{}/versions/latest", subject),
                ),
                "Latest schema lookup",
            )
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(subject = subject, "No schema registered for subject");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::RegistryUnavailable(format!(
                "Latest schema lookup for '{}' failed with status {}: {}",
                subject, status, body
            )));
        }

        let latest: SubjectVersionResponse = response.json().await.map_err(|e| {
            EventError::RegistryUnavailable(format!("Failed to parse schema response: {}", e))
        })?;

        tracing::debug!(
            subject = %latest.subject,
            schema_id = latest.id,
            version = latest.version,
            "Schema retrieved"
        );

        SchemaHandle::new(
            latest.id,
            latest.subject,
            latest.version,
            latest.schema,
            latest.schema_type.unwrap_or_default(),
        )
        .map(Some)
    }
}

#[async_trait]
impl SchemaResolver for HttpSchemaRegistry {
    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()> {
        let path = format!("/subjects/{}", subject);

        // An already soft-deleted subject answers 404 here but can still be
        // hard deleted
        let soft = self.delete_step(subject, &path).await;
        match soft {
            Err(EventError::NotFound(_)) if permanent => {
                tracing::debug!(subject = subject, "Subject already soft deleted");
            }
            other => other?,
        }

        if permanent {
            self.delete_step(subject, &format!("{}?permanent=true", path))
                .await?;
        }

        tracing::info!(subject = subject, permanent = permanent, "Subject deleted");
        Ok(())
    }

    async fn get_latest_schema(
        &self,
        subject_base: &str,
        is_key: bool,
    ) -> Result<Option<SchemaHandle>> {
        self.fetch_latest(&subject_name(subject_base, is_key)).await
    }

    async fn create_schema(
        &self,
        subject_base: &str,
        definition: &str,
        format: SchemaFormat,
        is_key: bool,
    ) -> Result<SchemaHandle> {
        let subject = subject_name(subject_base, is_key);

        let body = serde_json::to_vec(&RegisterSchemaRequest {
            schema: definition,
            schema_type: format.as_str(),
        })?;

        let response = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/subjects/{}/versions", subject),
                )
                .header(CONTENT_TYPE, REGISTRY_MEDIA_TYPE)
                .body(body),
                "Schema registration",
            )
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::SchemaRejected {
                subject,
                reason: format!("status {}: {}", status, body),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventError::RegistryUnavailable(format!(
                "Schema registration for '{}' failed with status {}: {}",
                subject, status, body
            )));
        }

        let registered: RegisterSchemaResponse = response.json().await.map_err(|e| {
            EventError::RegistryUnavailable(format!(
                "Failed to parse registration response: {}",
                e
            ))
        })?;

        tracing::debug!(
            schema_id = registered.id,
            subject = %subject,
            format = ?format,
            "Schema registered"
        );

        // Registration only answers with the id; the version comes from the subject
        match self.fetch_latest(&subject).await? {
            Some(handle) if handle.id() == registered.id => Ok(handle),
            Some(handle) => {
                // The definition already existed under an older version
                tracing::debug!(
                    subject = %subject,
                    registered_id = registered.id,
                    latest_id = handle.id(),
                    "Latest version belongs to another schema, looking up registered version"
                );
                let found = self.lookup_version(&subject, definition, format).await?;
                if found.id() != registered.id {
                    return Err(EventError::RegistryUnavailable(format!(
                        "Schema {} registered under '{}' but lookup returned schema {}",
                        registered.id,
                        subject,
                        found.id()
                    )));
                }
                Ok(found)
            }
            None => Err(EventError::RegistryUnavailable(format!(
                "Schema {} registered under '{}' but the subject has no versions",
                registered.id, subject
            ))),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
