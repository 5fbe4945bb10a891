use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectricityUnit {
    #[default]
    #[serde(rename = "kWh", alias = "kwh")]
    Kwh,
    #[serde(rename = "MWh", alias = "mwh")]
    Mwh,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingType {
    #[default]
    NaturalGas,
    Electric,
    Oil,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Electricity {
    pub usage: f64,
    pub unit: ElectricityUnit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transportation {
    pub car_mileage_km: f64,
    pub fuel_type: FuelType,
    pub public_transport_km: f64,
    pub flight_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Housing {
    pub heating_usage_kwh: f64,
    pub heating_type: HeatingType,
    pub household_size: u32,
}

impl Default for Housing {
    fn default() -> Self {
        Self {
            heating_usage_kwh: 0.0,
            heating_type: HeatingType::default(),
            household_size: 1,
        }
    }
}

/// 寄送報告前必須填寫的聯絡資料
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub country: String,
    pub consent: bool,
}

/// 精靈各步驟累積的輸入。所有數值欄位預設為 0，永遠是完整的結構
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalculatorInput {
    pub electricity: Electricity,
    pub transportation: Transportation,
    pub housing: Housing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissionCategory {
    Electricity,
    #[serde(rename = "Car Travel")]
    CarTravel,
    Heating,
    Flights,
    #[serde(rename = "Public Transport")]
    PublicTransport,
}

impl EmissionCategory {
    /// 報告中的固定順序
    pub const ALL: [EmissionCategory; 5] = [
        EmissionCategory::Electricity,
        EmissionCategory::CarTravel,
        EmissionCategory::Heating,
        EmissionCategory::Flights,
        EmissionCategory::PublicTransport,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmissionCategory::Electricity => "Electricity",
            EmissionCategory::CarTravel => "Car Travel",
            EmissionCategory::Heating => "Heating",
            EmissionCategory::Flights => "Flights",
            EmissionCategory::PublicTransport => "Public Transport",
        }
    }
}

impl fmt::Display for EmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub category: EmissionCategory,
    pub emissions_kg: f64,
}

/// 計算結果，產生後不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionResult {
    pub total_emissions_kg: f64,
    pub breakdown: Vec<BreakdownEntry>,
}

impl EmissionResult {
    pub fn emissions_for(&self, category: EmissionCategory) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.emissions_kg)
    }
}

/// 一次報告寄送所需的資料：收件人、總量與已產生的 PDF 快照
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDelivery {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub total_emissions_kg: f64,
    pub pdf: Vec<u8>,
}

impl ReportDelivery {
    pub fn from_contact(contact: &ContactDetails, result: &EmissionResult, pdf: Vec<u8>) -> Self {
        let non_empty = |value: &str| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Self {
            email: contact.email.trim().to_string(),
            first_name: non_empty(&contact.first_name),
            last_name: non_empty(&contact.last_name),
            total_emissions_kg: result.total_emissions_kg,
            pdf,
        }
    }
}
