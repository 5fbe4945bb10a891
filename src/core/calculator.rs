use crate::domain::model::{
    BreakdownEntry, CalculatorInput, ElectricityUnit, EmissionCategory, EmissionResult, FuelType,
    HeatingType,
};
use serde::{Deserialize, Serialize};

/// 排放係數（kg CO2 / 單位）
pub mod factors {
    /// per kWh
    pub const ELECTRICITY: f64 = 0.233;
    pub const PETROL: f64 = 2.31;
    pub const DIESEL: f64 = 2.68;
    /// per kWh
    pub const NATURAL_GAS: f64 = 0.185;
    pub const HEATING_OIL: f64 = 2.68;
    /// per km
    pub const FLIGHT: f64 = 0.115;
    /// per km
    pub const PUBLIC_TRANSPORT: f64 = 0.05;
}

const KWH_PER_MWH: f64 = 1000.0;

/// 零排放的類別是否保留在明細中
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownPolicy {
    #[default]
    KeepAll,
    DropZero,
}

/// 用電量單位的處理方式。
///
/// `AsEntered` 直接把輸入值乘上 kWh 係數，不論單位為何（MWh 不換算）。
/// `NormalizeToKwh` 會先把 MWh 乘以 1000，屬於明確選用的修正。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricityUnits {
    #[default]
    AsEntered,
    NormalizeToKwh,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calculator {
    breakdown_policy: BreakdownPolicy,
    electricity_units: ElectricityUnits,
}

impl Calculator {
    pub fn new(breakdown_policy: BreakdownPolicy, electricity_units: ElectricityUnits) -> Self {
        Self {
            breakdown_policy,
            electricity_units,
        }
    }

    pub fn breakdown_policy(&self) -> BreakdownPolicy {
        self.breakdown_policy
    }

    pub fn electricity_units(&self) -> ElectricityUnits {
        self.electricity_units
    }

    pub fn calculate(&self, input: &CalculatorInput) -> EmissionResult {
        let electricity_kwh = match (self.electricity_units, input.electricity.unit) {
            (ElectricityUnits::NormalizeToKwh, ElectricityUnit::Mwh) => {
                input.electricity.usage * KWH_PER_MWH
            }
            _ => input.electricity.usage,
        };
        let electricity = electricity_kwh * factors::ELECTRICITY;

        let transport = &input.transportation;
        let car = transport.car_mileage_km * fuel_factor(transport.fuel_type);

        let heating = input.housing.heating_usage_kwh * heating_factor(input.housing.heating_type);

        let flights = transport.flight_km * factors::FLIGHT;
        let public_transport = transport.public_transport_km * factors::PUBLIC_TRANSPORT;

        let total = electricity + car + heating + flights + public_transport;

        let terms = [electricity, car, heating, flights, public_transport];
        let breakdown = EmissionCategory::ALL
            .iter()
            .zip(terms)
            .filter(|(_, emissions_kg)| {
                self.breakdown_policy == BreakdownPolicy::KeepAll || *emissions_kg != 0.0
            })
            .map(|(category, emissions_kg)| BreakdownEntry {
                category: *category,
                emissions_kg,
            })
            .collect();

        tracing::debug!(
            "Calculated {:.2} kg CO2 (electricity {:.2}, car {:.2}, heating {:.2}, flights {:.2}, public transport {:.2})",
            total,
            electricity,
            car,
            heating,
            flights,
            public_transport
        );

        EmissionResult {
            total_emissions_kg: total,
            breakdown,
        }
    }
}

/// 以預設策略計算（保留全部類別、用電量不換算單位）
pub fn calculate(input: &CalculatorInput) -> EmissionResult {
    Calculator::default().calculate(input)
}

fn fuel_factor(fuel_type: FuelType) -> f64 {
    match fuel_type {
        FuelType::Petrol => factors::PETROL,
        FuelType::Diesel => factors::DIESEL,
        // 電動車不計直接排放
        FuelType::Electric => 0.0,
    }
}

fn heating_factor(heating_type: HeatingType) -> f64 {
    match heating_type {
        HeatingType::NaturalGas => factors::NATURAL_GAS,
        HeatingType::Electric => factors::ELECTRICITY,
        HeatingType::Oil => factors::HEATING_OIL,
    }
}
