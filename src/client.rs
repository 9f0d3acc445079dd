//! HTTP client for the Crowdin project API
//!
//! Pure protocol adapter: builds query-authenticated URLs of the form
//! `{base}/project/{project}/{path}?json[&params]&key={key}` and performs the
//! five calls the sync pipeline needs. It makes no decisions beyond turning
//! responses into [`ExportStatus`] values or errors.

use crate::config::SyncOptions;
use crate::error::{Error, Result};
use crate::types::{ExportStatus, upstream_message};
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Connect timeout for every request. Whole-request time is bounded by the command deadline.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Streamed body of the export archive
pub type ArchiveStream = BoxStream<'static, Result<Bytes>>;

/// Client bound to one project and API key
#[derive(Clone, Debug)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    project: String,
    api_key: String,
}

impl RemoteClient {
    /// Create a client for the project named in `options`
    pub fn new(options: &SyncOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_http_client(http, options))
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_http_client(http: reqwest::Client, options: &SyncOptions) -> Self {
        Self {
            http,
            base_url: options.api_base_url.trim_end_matches('/').to_string(),
            project: options.project.clone(),
            api_key: options.api_key.clone(),
        }
    }

    /// Build the URL for a project-scoped API path
    ///
    /// `params` are appended after `json` in order; a parameter with an empty value
    /// is emitted as a bare flag. The API key always comes last.
    pub fn project_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let relative = collapse_slashes(&format!(
            "project/{}/{}",
            urlencoding::encode(&self.project),
            path
        ));

        let mut url = format!(
            "{}/{}?json",
            self.base_url,
            relative.trim_start_matches('/')
        );
        for (name, value) in params {
            url.push('&');
            url.push_str(name);
            if !value.is_empty() {
                url.push('=');
                url.push_str(&urlencoding::encode(value));
            }
        }
        url.push_str("&key=");
        url.push_str(&urlencoding::encode(&self.api_key));
        url
    }

    /// Fetch project info, failing early if the project or API key is wrong
    ///
    /// The API answers misconfiguration with an `error` payload (often with a 4xx
    /// status), so the body decides, not the status alone.
    pub async fn check_project_setup(&self) -> Result<Value> {
        let url = self.project_url("info", &[]);
        debug!(project = %self.project, "checking project setup");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => return Err(Error::Serialization(e)),
            Err(_) => {
                return Err(Error::Config {
                    message: format!(
                        "It seems your project is not correctly setup - please double check the \"project\" and \"apiKey\" settings. Error: HTTP {}",
                        status
                    ),
                    key: None,
                });
            }
        };

        if let Some(error) = error_payload(&body) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(Error::Config {
                message: format!(
                    "It seems your project is not correctly setup - please double check the \"project\" and \"apiKey\" settings. Error: {}",
                    message
                ),
                key: None,
            });
        }

        debug!(project = %self.project, "project setup ok");
        Ok(body)
    }

    /// Ask the service to start rendering the export archive
    ///
    /// The response body carries nothing the pipeline needs; only transport errors fail.
    pub async fn trigger_export(&self) -> Result<()> {
        let url = self.project_url("export", &[("async", "1")]);
        debug!(project = %self.project, "triggering export");

        let response = self.http.get(&url).send().await?;
        debug!(status = %response.status(), "export triggered");
        Ok(())
    }

    /// Poll the export job once
    pub async fn poll_export_status(&self) -> Result<ExportStatus> {
        let url = self.project_url("export-status", &[]);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let export_status = match serde_json::from_str::<Value>(&text) {
            Ok(body) => ExportStatus::from_response(&body),
            Err(_) => ExportStatus::Failed(fallback_message(status, &text)),
        };

        debug!(%status, export_status = %export_status, "polled export status");
        Ok(export_status)
    }

    /// Start downloading the export archive
    ///
    /// Transport failures and non-success statuses are extraction errors.
    pub async fn download_archive(&self) -> Result<ArchiveStream> {
        let url = self.project_url("download/all.zip", &[]);
        debug!(project = %self.project, "downloading translations archive");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Extraction(format!("failed to download archive: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Extraction(format!(
                "archive download failed: {}",
                failure_message(status, &text)
            )));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| Error::Extraction(format!("archive download interrupted: {}", e)))
            })
            .boxed())
    }

    /// Upload a file as one multipart field, streaming it from disk
    ///
    /// A non-success response becomes [`Error::Upload`] with the upstream message.
    pub async fn upload_file(
        &self,
        field_name: &str,
        file_name: &str,
        file: tokio::fs::File,
    ) -> Result<()> {
        let url = self.project_url("update-file", &[("update_option", "update_as_unapproved")]);

        let length = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length).file_name(file_name.to_string());
        let form = Form::new().part(field_name.to_string(), part);

        debug!(field_name, file_name, length, "uploading file");

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(%status, "upload accepted");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(Error::Upload(failure_message(status, &text)))
    }
}

/// The `error` member of a response, unless it is absent or falsy
fn error_payload(body: &Value) -> Option<&Value> {
    body.get("error").filter(|error| match error {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Collapse runs of `/` into one
fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                collapsed.push(c);
            }
            previous_slash = true;
        } else {
            collapsed.push(c);
            previous_slash = false;
        }
    }
    collapsed
}

/// Message for a failed response: structured upstream message, else the raw body, else the status
fn failure_message(status: reqwest::StatusCode, text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(body) => upstream_message(&body),
        Err(_) => fallback_message(status, text),
    }
}

fn fallback_message(status: reqwest::StatusCode, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}
