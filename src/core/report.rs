use crate::domain::model::{CalculatorInput, EmissionResult};
use crate::domain::ports::Storage;
use crate::utils::error::{EstimatorError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_PDF_FILENAME: &str = "carbon-footprint-report.pdf";
pub const REPORT_BUNDLE_FILENAME: &str = "carbon-footprint-report.zip";

pub const RECOMMENDATIONS: [&str; 4] = [
    "Switch to renewable energy sources",
    "Use public transportation when possible",
    "Improve home insulation",
    "Consider energy-efficient appliances",
];

/// 結果畫面的純文字版本，數值取兩位小數
pub fn render_text(result: &EmissionResult) -> String {
    let mut lines = vec![
        "Your Carbon Footprint".to_string(),
        String::new(),
        format!("{:.2} kg CO₂", result.total_emissions_kg),
        "Monthly Carbon Emissions".to_string(),
        String::new(),
        "Breakdown".to_string(),
    ];

    for entry in &result.breakdown {
        lines.push(format!(
            "  {:<18}{:>12.2} kg CO₂",
            entry.category.label(),
            entry.emissions_kg
        ));
    }

    lines.push(String::new());
    lines.push("Recommendations".to_string());
    for recommendation in RECOMMENDATIONS {
        lines.push(format!("  • {}", recommendation));
    }

    lines.join("\n")
}

pub fn breakdown_csv(result: &EmissionResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["category", "emissions_kg"])?;
    for entry in &result.breakdown {
        writer.write_record([
            entry.category.label().to_string(),
            format!("{:.2}", entry.emissions_kg),
        ])?;
    }
    writer.write_record(["Total".to_string(), format!("{:.2}", result.total_emissions_kg)])?;

    let data = writer
        .into_inner()
        .map_err(|e| EstimatorError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    input: &'a CalculatorInput,
    result: &'a EmissionResult,
}

/// 產生可直接下載的報告壓縮檔：report.txt、breakdown.csv、result.json
pub fn build_bundle(
    input: &CalculatorInput,
    result: &EmissionResult,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let text = render_text(result);
    let csv = breakdown_csv(result)?;

    // 聯絡資料不放進下載檔
    let mut public_input = input.clone();
    public_input.contact = None;
    let document = ReportDocument {
        generated_at,
        input: &public_input,
        result,
    };
    let json = serde_json::to_string_pretty(&document)?;

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("report.txt", FileOptions::default())?;
    zip.write_all(text.as_bytes())?;

    zip.start_file::<_, ()>("breakdown.csv", FileOptions::default())?;
    zip.write_all(csv.as_bytes())?;

    zip.start_file::<_, ()>("result.json", FileOptions::default())?;
    zip.write_all(json.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// 把報告壓縮檔寫入儲存空間，回傳寫入的相對路徑
pub async fn export_bundle<S: Storage>(
    storage: &S,
    input: &CalculatorInput,
    result: &EmissionResult,
) -> Result<String> {
    let data = build_bundle(input, result, Utc::now())?;
    tracing::debug!("Writing report bundle ({} bytes) to storage", data.len());
    storage.write_file(REPORT_BUNDLE_FILENAME, &data).await?;
    Ok(REPORT_BUNDLE_FILENAME.to_string())
}
