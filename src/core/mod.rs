pub mod calculator;
pub mod delivery;
pub mod estimator;
pub mod report;
pub mod wizard;

pub use crate::domain::model::{CalculatorInput, EmissionResult, ReportDelivery};
pub use crate::domain::ports::{ConfigProvider, ReportSender, SnapshotRenderer, Storage};
pub use crate::utils::error::Result;
