use crate::core::calculator::Calculator;
use crate::domain::model::{
    CalculatorInput, ContactDetails, ElectricityUnit, EmissionResult, FuelType, HeatingType,
};
use crate::utils::error::{EstimatorError, Result};
use crate::utils::validation::{
    coerce_household_size, coerce_number, sanitize_amount, validate_email,
    validate_non_empty_string, Validate,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Electricity,
    Transportation,
    Housing,
    ContactDetails,
    Results,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Electricity => "Electricity",
            Step::Transportation => "Transportation",
            Step::Housing => "Housing",
            Step::ContactDetails => "Contact Details",
            Step::Results => "Results",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// 可由文字輸入更新的數值欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    ElectricityUsage,
    CarMileageKm,
    PublicTransportKm,
    FlightKm,
    HeatingUsageKwh,
    HouseholdSize,
}

impl Validate for ContactDetails {
    fn validate(&self) -> Result<()> {
        match contact_field_errors(self).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// 收集聯絡資料所有不合格的欄位，供畫面逐欄顯示
pub fn contact_field_errors(contact: &ContactDetails) -> Vec<EstimatorError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_non_empty_string("firstName", &contact.first_name) {
        errors.push(e);
    }
    if let Err(e) = validate_non_empty_string("lastName", &contact.last_name) {
        errors.push(e);
    }
    errors.extend(delivery_field_errors(contact));

    errors
}

/// 寄送報告只需要收件 email 與同意；姓名可省略
pub fn delivery_field_errors(contact: &ContactDetails) -> Vec<EstimatorError> {
    let mut errors = Vec::new();

    if let Err(e) = validate_email("email", &contact.email) {
        errors.push(e);
    }
    if !contact.consent {
        errors.push(EstimatorError::ValidationError {
            field: "consent".to_string(),
            message: "Consent is required to receive the report".to_string(),
        });
    }

    errors
}

/// 線性的多步驟輸入流程：
/// Electricity → Transportation → Housing → [ContactDetails] → Results
#[derive(Debug, Clone)]
pub struct Wizard {
    calculator: Calculator,
    contact_step: bool,
    step: Step,
    input: CalculatorInput,
    result: Option<EmissionResult>,
}

impl Wizard {
    pub fn new(calculator: Calculator, contact_step: bool) -> Self {
        Self {
            calculator,
            contact_step,
            step: Step::Electricity,
            input: CalculatorInput::default(),
            result: None,
        }
    }

    pub fn steps(&self) -> Vec<Step> {
        let mut steps = vec![Step::Electricity, Step::Transportation, Step::Housing];
        if self.contact_step {
            steps.push(Step::ContactDetails);
        }
        steps.push(Step::Results);
        steps
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn has_contact_step(&self) -> bool {
        self.contact_step
    }

    pub fn input(&self) -> &CalculatorInput {
        &self.input
    }

    pub fn result(&self) -> Option<&EmissionResult> {
        self.result.as_ref()
    }

    /// (目前步驟編號, 總步驟數)，編號從 1 開始
    pub fn progress(&self) -> (usize, usize) {
        let steps = self.steps();
        let index = steps
            .iter()
            .position(|step| *step == self.step)
            .unwrap_or(0);
        (index + 1, steps.len())
    }

    fn last_entry_step(&self) -> Step {
        if self.contact_step {
            Step::ContactDetails
        } else {
            Step::Housing
        }
    }

    /// 在結果頁修改輸入時，舊結果作廢並回到最後一個輸入步驟
    fn reopen(&mut self) {
        if self.step == Step::Results {
            self.result = None;
            self.step = self.last_entry_step();
            tracing::debug!("Input edited after calculation, wizard back at {}", self.step);
        }
    }

    /// 前進一步。最後一個輸入步驟會觸發計算並進入 Results；
    /// 聯絡資料不完整時回傳驗證錯誤，步驟不變
    pub fn next(&mut self) -> Result<Step> {
        if self.step == Step::Results {
            return Ok(self.step);
        }

        if self.step == Step::ContactDetails {
            match &self.input.contact {
                Some(contact) => contact.validate()?,
                None => {
                    return Err(EstimatorError::ValidationError {
                        field: "firstName".to_string(),
                        message: "Contact details are required".to_string(),
                    })
                }
            }
        }

        if self.step == self.last_entry_step() {
            let result = self.calculator.calculate(&self.input);
            tracing::info!(
                "🧮 Calculated footprint: {:.2} kg CO₂",
                result.total_emissions_kg
            );
            self.result = Some(result);
            self.step = Step::Results;
            return Ok(self.step);
        }

        let steps = self.steps();
        if let Some(index) = steps.iter().position(|step| *step == self.step) {
            self.step = steps[index + 1];
        }
        tracing::debug!("Wizard advanced to {}", self.step);
        Ok(self.step)
    }

    /// 回上一步，第一步時不動作
    pub fn back(&mut self) -> Step {
        let steps = self.steps();
        if let Some(index) = steps.iter().position(|step| *step == self.step) {
            if index > 0 {
                if self.step == Step::Results {
                    self.result = None;
                }
                self.step = steps[index - 1];
            }
        }
        self.step
    }

    /// 「重新計算」：回到第一步並清空所有輸入
    pub fn reset(&mut self) {
        self.input = CalculatorInput::default();
        self.result = None;
        self.step = Step::Electricity;
        tracing::debug!("Wizard reset");
    }

    pub fn set_numeric(&mut self, field: NumericField, raw: &str) {
        self.reopen();
        match field {
            NumericField::HouseholdSize => {
                self.input.housing.household_size = coerce_household_size(raw)
            }
            other => self.set_amount(other, coerce_number(raw)),
        }
    }

    pub fn set_amount(&mut self, field: NumericField, value: f64) {
        self.reopen();
        let value = sanitize_amount(value);
        match field {
            NumericField::ElectricityUsage => self.input.electricity.usage = value,
            NumericField::CarMileageKm => self.input.transportation.car_mileage_km = value,
            NumericField::PublicTransportKm => {
                self.input.transportation.public_transport_km = value
            }
            NumericField::FlightKm => self.input.transportation.flight_km = value,
            NumericField::HeatingUsageKwh => self.input.housing.heating_usage_kwh = value,
            NumericField::HouseholdSize => {
                self.input.housing.household_size = (value as u32).max(1)
            }
        }
    }

    pub fn set_electricity_unit(&mut self, unit: ElectricityUnit) {
        self.reopen();
        self.input.electricity.unit = unit;
    }

    pub fn set_fuel_type(&mut self, fuel_type: FuelType) {
        self.reopen();
        self.input.transportation.fuel_type = fuel_type;
    }

    pub fn set_heating_type(&mut self, heating_type: HeatingType) {
        self.reopen();
        self.input.housing.heating_type = heating_type;
    }

    pub fn contact_mut(&mut self) -> &mut ContactDetails {
        self.reopen();
        self.input.contact.get_or_insert_with(ContactDetails::default)
    }

    /// 以整份輸入取代目前內容（例如從答案檔載入），數值會重新正規化
    pub fn load_input(&mut self, input: CalculatorInput) {
        self.reopen();
        self.input = input;
        let amounts = [
            (NumericField::ElectricityUsage, self.input.electricity.usage),
            (NumericField::CarMileageKm, self.input.transportation.car_mileage_km),
            (
                NumericField::PublicTransportKm,
                self.input.transportation.public_transport_km,
            ),
            (NumericField::FlightKm, self.input.transportation.flight_km),
            (NumericField::HeatingUsageKwh, self.input.housing.heating_usage_kwh),
        ];
        for (field, value) in amounts {
            self.set_amount(field, value);
        }
        if self.input.housing.household_size == 0 {
            self.input.housing.household_size = 1;
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(Calculator::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EmissionCategory;

    fn fill_valid_contact(wizard: &mut Wizard) {
        let contact = wizard.contact_mut();
        contact.first_name = "Ada".to_string();
        contact.last_name = "Lovelace".to_string();
        contact.email = "ada@example.com".to_string();
        contact.consent = true;
    }

    #[test]
    fn test_linear_flow_without_contact_step() {
        let mut wizard = Wizard::default();
        assert_eq!(wizard.step(), Step::Electricity);
        assert_eq!(wizard.progress(), (1, 4));

        wizard.set_numeric(NumericField::ElectricityUsage, "300");
        assert_eq!(wizard.next().unwrap(), Step::Transportation);
        wizard.set_numeric(NumericField::CarMileageKm, "100");
        assert_eq!(wizard.next().unwrap(), Step::Housing);
        assert!(wizard.result().is_none());

        assert_eq!(wizard.next().unwrap(), Step::Results);
        let result = wizard.result().unwrap();
        assert!((result.total_emissions_kg - 300.9).abs() < 1e-9);
        assert_eq!(wizard.progress(), (4, 4));
    }

    #[test]
    fn test_back_is_noop_on_first_step() {
        let mut wizard = Wizard::default();
        assert_eq!(wizard.back(), Step::Electricity);

        wizard.next().unwrap();
        assert_eq!(wizard.back(), Step::Electricity);
    }

    #[test]
    fn test_back_from_results_clears_result() {
        let mut wizard = Wizard::default();
        wizard.next().unwrap();
        wizard.next().unwrap();
        wizard.next().unwrap();
        assert!(wizard.result().is_some());

        assert_eq!(wizard.back(), Step::Housing);
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_next_on_results_is_noop() {
        let mut wizard = Wizard::default();
        for _ in 0..3 {
            wizard.next().unwrap();
        }
        let before = wizard.result().cloned();
        assert_eq!(wizard.next().unwrap(), Step::Results);
        assert_eq!(wizard.result().cloned(), before);
    }

    #[test]
    fn test_contact_step_blocks_results_until_valid() {
        let mut wizard = Wizard::new(Calculator::default(), true);
        assert_eq!(wizard.progress(), (1, 5));
        wizard.next().unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.next().unwrap(), Step::ContactDetails);

        assert!(wizard.next().is_err());
        assert_eq!(wizard.step(), Step::ContactDetails);
        assert!(wizard.result().is_none());

        wizard.contact_mut().first_name = "Ada".to_string();
        wizard.contact_mut().last_name = "Lovelace".to_string();
        wizard.contact_mut().email = "not-an-email".to_string();
        wizard.contact_mut().consent = true;
        let err = wizard.next().unwrap_err();
        assert!(matches!(err, EstimatorError::ValidationError { ref field, .. } if field == "email"));
        assert_eq!(wizard.step(), Step::ContactDetails);

        fill_valid_contact(&mut wizard);
        assert_eq!(wizard.next().unwrap(), Step::Results);
        assert!(wizard.result().is_some());
    }

    #[test]
    fn test_consent_is_required() {
        let mut wizard = Wizard::new(Calculator::default(), true);
        for _ in 0..3 {
            wizard.next().unwrap();
        }
        fill_valid_contact(&mut wizard);
        wizard.contact_mut().consent = false;

        assert!(wizard.next().is_err());
        assert_eq!(wizard.step(), Step::ContactDetails);
    }

    #[test]
    fn test_contact_field_errors_lists_every_field() {
        let errors = contact_field_errors(&ContactDetails::default());
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut wizard = Wizard::new(Calculator::default(), true);
        wizard.set_numeric(NumericField::ElectricityUsage, "120");
        wizard.set_fuel_type(FuelType::Diesel);
        wizard.set_numeric(NumericField::HouseholdSize, "4");
        fill_valid_contact(&mut wizard);
        for _ in 0..4 {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.step(), Step::Results);

        wizard.reset();
        assert_eq!(wizard.step(), Step::Electricity);
        assert_eq!(wizard.input(), &CalculatorInput::default());
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_invalid_text_is_coerced() {
        let mut wizard = Wizard::default();
        wizard.set_numeric(NumericField::FlightKm, "lots");
        wizard.set_numeric(NumericField::PublicTransportKm, "-20");
        wizard.set_numeric(NumericField::HouseholdSize, "");

        assert_eq!(wizard.input().transportation.flight_km, 0.0);
        assert_eq!(wizard.input().transportation.public_transport_km, 0.0);
        assert_eq!(wizard.input().housing.household_size, 1);
    }

    #[test]
    fn test_load_input_sanitizes_amounts() {
        let mut input = CalculatorInput::default();
        input.transportation.flight_km = -5.0;
        input.housing.household_size = 0;
        input.electricity.usage = f64::NAN;

        let mut wizard = Wizard::default();
        wizard.load_input(input);
        assert_eq!(wizard.input().transportation.flight_km, 0.0);
        assert_eq!(wizard.input().electricity.usage, 0.0);
        assert_eq!(wizard.input().housing.household_size, 1);

        for _ in 0..3 {
            wizard.next().unwrap();
        }
        assert_eq!(
            wizard.result().unwrap().emissions_for(EmissionCategory::Flights),
            Some(0.0)
        );
    }

    #[test]
    fn test_editing_on_results_discards_stale_result() {
        let mut wizard = Wizard::default();
        wizard.set_numeric(NumericField::ElectricityUsage, "300");
        for _ in 0..3 {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.step(), Step::Results);

        wizard.set_numeric(NumericField::ElectricityUsage, "999");
        assert_eq!(wizard.step(), Step::Housing);
        assert!(wizard.result().is_none());

        assert_eq!(wizard.next().unwrap(), Step::Results);
        let expected = crate::core::calculator::calculate(wizard.input());
        assert_eq!(
            wizard.result().unwrap().total_emissions_kg,
            expected.total_emissions_kg
        );
        assert!((expected.total_emissions_kg - 232.767).abs() < 1e-9);
    }

    #[test]
    fn test_contact_edit_on_results_requires_revalidation() {
        let mut wizard = Wizard::new(Calculator::default(), true);
        fill_valid_contact(&mut wizard);
        for _ in 0..4 {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.step(), Step::Results);

        wizard.contact_mut().email = "broken".to_string();
        assert_eq!(wizard.step(), Step::ContactDetails);
        assert!(wizard.result().is_none());
        assert!(wizard.next().is_err());
    }

    #[test]
    fn test_delivery_field_errors_ignore_names() {
        let contact = ContactDetails {
            email: "ada@example.com".to_string(),
            consent: true,
            ..ContactDetails::default()
        };
        assert!(delivery_field_errors(&contact).is_empty());
        assert_eq!(contact_field_errors(&contact).len(), 2);
    }
}
