use crate::domain::model::{EmissionResult, ReportDelivery};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn delivery_endpoint(&self) -> Option<&str>;
    fn report_subject(&self) -> &str;
    fn request_timeout_seconds(&self) -> Option<u64>;
    fn output_path(&self) -> &str;
}

/// 將計算結果轉成報告文件（PDF）的位元組
#[async_trait]
pub trait SnapshotRenderer: Send + Sync {
    async fn render(&self, result: &EmissionResult) -> Result<Vec<u8>>;
}

/// 把報告送到寄送端點
#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send(&self, delivery: &ReportDelivery) -> Result<()>;
}
