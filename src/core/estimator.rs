use crate::core::wizard::delivery_field_errors;
use crate::domain::model::{ContactDetails, EmissionResult, ReportDelivery};
use crate::domain::ports::{ReportSender, SnapshotRenderer};
use crate::utils::error::{EstimatorError, Result};
use tokio::sync::oneshot;

/// 報告寄送流程：先產生快照，完成後才送出
pub struct EstimatorEngine<R: SnapshotRenderer, S: ReportSender> {
    renderer: R,
    sender: S,
}

impl<R: SnapshotRenderer, S: ReportSender> EstimatorEngine<R, S> {
    pub fn new(renderer: R, sender: S) -> Self {
        Self { renderer, sender }
    }

    /// 姓名可留空，留空時不送出
    pub async fn deliver(&self, contact: &ContactDetails, result: &EmissionResult) -> Result<()> {
        if let Some(err) = delivery_field_errors(contact).into_iter().next() {
            return Err(err);
        }

        tracing::info!("📄 Generating report snapshot...");
        let pdf = self.renderer.render(result).await.map_err(|e| match e {
            EstimatorError::SnapshotError { .. } => e,
            other => EstimatorError::SnapshotError {
                message: other.to_string(),
            },
        })?;
        tracing::info!("📄 Snapshot ready ({} bytes)", pdf.len());

        let delivery = ReportDelivery::from_contact(contact, result, pdf);

        tracing::info!("📧 Sending report to {}...", delivery.email);
        self.sender.send(&delivery).await
    }

    /// 與 `deliver` 相同，但收到取消訊號時中止送出。
    /// 傳送端被丟棄不算取消
    pub async fn deliver_with_cancel(
        &self,
        contact: &ContactDetails,
        result: &EmissionResult,
        cancel: oneshot::Receiver<()>,
    ) -> Result<()> {
        tokio::select! {
            outcome = self.deliver(contact, result) => outcome,
            Ok(()) = cancel => {
                tracing::warn!("Report delivery cancelled");
                Err(EstimatorError::Cancelled)
            }
        }
    }
}
