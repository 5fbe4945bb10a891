use crate::core::report::REPORT_PDF_FILENAME;
use crate::domain::model::ReportDelivery;
use crate::domain::ports::{ConfigProvider, ReportSender};
use crate::utils::error::{EstimatorError, Result};
use crate::utils::validation::validate_required_field;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_SUBJECT: &str = "Your Carbon Footprint Report";

/// 以 multipart/form-data 把 PDF 報告送到寄送端點
#[derive(Debug, Clone)]
pub struct ReportClient {
    client: Client,
    endpoint: String,
    subject: String,
    timeout: Option<Duration>,
}

impl ReportClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            subject: DEFAULT_SUBJECT.to_string(),
            timeout: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let endpoint = config.delivery_endpoint().map(str::to_string);
        let endpoint = validate_required_field("delivery.endpoint", &endpoint)?;

        let mut client = Self::new(endpoint.clone()).with_subject(config.report_subject());
        if let Some(seconds) = config.request_timeout_seconds() {
            client = client.with_timeout(Duration::from_secs(seconds));
        }
        Ok(client)
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, delivery: &ReportDelivery) -> Result<Form> {
        let pdf = Part::bytes(delivery.pdf.clone())
            .file_name(REPORT_PDF_FILENAME)
            .mime_str("application/pdf")?;

        let mut form = Form::new()
            .text("email", delivery.email.clone())
            .part("pdf", pdf)
            .text(
                "totalEmissions",
                format!("{:.2}", delivery.total_emissions_kg),
            )
            .text("subject", self.subject.clone());

        if let Some(first_name) = &delivery.first_name {
            form = form.text("firstName", first_name.clone());
        }
        if let Some(last_name) = &delivery.last_name {
            form = form.text("lastName", last_name.clone());
        }

        Ok(form)
    }
}

#[async_trait::async_trait]
impl ReportSender for ReportClient {
    async fn send(&self, delivery: &ReportDelivery) -> Result<()> {
        let form = self.build_form(delivery)?;

        tracing::debug!(
            "Posting report ({} bytes) for {} to: {}",
            delivery.pdf.len(),
            delivery.email,
            self.endpoint
        );

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Report endpoint response status: {}", status);

        if status.is_success() {
            tracing::info!("📧 Report sent to {}", delivery.email);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Report endpoint rejected the request: {}", status);
            Err(EstimatorError::DeliveryRejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn delivery() -> ReportDelivery {
        ReportDelivery {
            email: "ada@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            total_emissions_kg: 354.149_999_999,
            pdf: b"%PDF-1.4 test".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_multipart_form() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/send-report")
                .header_exists("content-type")
                .body_contains("name=\"email\"")
                .body_contains("ada@example.com")
                .body_contains("filename=\"carbon-footprint-report.pdf\"")
                .body_contains("%PDF-1.4 test")
                .body_contains("name=\"totalEmissions\"")
                .body_contains("354.15")
                .body_contains("Your Carbon Footprint Report")
                .body_contains("name=\"firstName\"");
            then.status(200);
        });

        let client = ReportClient::new(server.url("/send-report"));
        client.send(&delivery()).await.unwrap();

        api_mock.assert();
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/send-report");
            then.status(503).body("mail relay down");
        });

        let client = ReportClient::new(server.url("/send-report"));
        let err = client.send(&delivery()).await.unwrap_err();

        api_mock.assert();
        match err {
            EstimatorError::DeliveryRejected { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "mail relay down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_failure_is_api_error() {
        // 沒有服務在聽的埠
        let client = ReportClient::new("http://127.0.0.1:9/send-report")
            .with_timeout(Duration::from_secs(2));
        let err = client.send(&delivery()).await.unwrap_err();

        assert!(matches!(err, EstimatorError::ApiError(_)));
    }
}
