// src/client.rs

use async_trait::async_trait;
use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use url::Url;

use crate::{
    config::Config,
    error::AppError,
    models::{
        payload::SubmissionPayload,
        schedule::{ErrorBody, ScheduleResponse},
        survey::SavedPreferences,
    },
};

/// The scheduling service as seen from the form.
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    /// Sends one submission. No retries.
    async fn generate_schedule(&self, payload: &SubmissionPayload) -> Result<ScheduleResponse, AppError>;

    /// Looks up saved answers for an email. `Ok(None)` when there are none.
    async fn fetch_preferences(&self, email: &str) -> Result<Option<SavedPreferences>, AppError>;
}

/// `ScheduleBackend` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    submit_url: Url,
    preferences_url: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Self::with_client(client, &config.api_base_url, &config.submit_path, &config.preferences_path)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        submit_path: &str,
        preferences_path: &str,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)?;
        let submit_url = base_url.join(submit_path)?;
        let preferences_url = base_url.join(preferences_path)?;
        Ok(Self {
            client,
            base_url,
            submit_url,
            preferences_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute form of a link returned by the server.
    pub fn resolve(&self, link: &str) -> String {
        self.base_url
            .join(link)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| link.to_string())
    }
}

/// Multipart body: `data`, `pdf_count`, then every attachment part.
pub fn build_form(payload: &SubmissionPayload) -> Result<Form, AppError> {
    let mut form = Form::new()
        .text("data", payload.data_json()?)
        .text("pdf_count", payload.pdf_count.to_string());

    for attachment in &payload.attachments {
        let part = Part::bytes(attachment.file.bytes.clone())
            .file_name(attachment.file.file_name.clone())
            .mime_str(&attachment.file.content_type)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        form = form.part(attachment.field.clone(), part);
    }

    Ok(form)
}

#[async_trait]
impl ScheduleBackend for HttpBackend {
    async fn generate_schedule(&self, payload: &SubmissionPayload) -> Result<ScheduleResponse, AppError> {
        let form = build_form(payload)?;

        tracing::info!(
            "Submitting {} course(s), {} attachment(s) to {}",
            payload.request.courses.len(),
            payload.attachments.len(),
            self.submit_url
        );

        let response = self
            .client
            .post(self.submit_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach scheduling service: {:?}", e);
                AppError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AppError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            tracing::warn!("Schedule request failed with {}: {:?}", status, message);
            return Err(AppError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let mut parsed: ScheduleResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Failed to parse schedule response: {:?}", e);
            AppError::InvalidResponse(e.to_string())
        })?;

        if let Some(link) = parsed.ics_url.take() {
            parsed.ics_url = Some(self.resolve(&link));
        }

        Ok(parsed)
    }

    async fn fetch_preferences(&self, email: &str) -> Result<Option<SavedPreferences>, AppError> {
        let response = self
            .client
            .get(self.preferences_url.clone())
            .query(&[("email", email)])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let saved = response.json::<SavedPreferences>().await?;
                Ok(Some(saved))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                tracing::debug!("Preferences lookup returned {}", status);
                Ok(None)
            }
        }
    }
}
