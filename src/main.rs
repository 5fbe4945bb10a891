use carbon_estimator::config::load_answers;
use carbon_estimator::core::report::{export_bundle, render_text};
use carbon_estimator::core::wizard::{contact_field_errors, NumericField};
use carbon_estimator::domain::model::{ElectricityUnit, FuelType, HeatingType};
use carbon_estimator::domain::ports::ConfigProvider;
use carbon_estimator::utils::{logger, validation::Validate};
use carbon_estimator::{
    CliConfig, EstimatorEngine, EstimatorError, FileSnapshot, LocalStorage, ReportClient, Step,
    TomlConfig, Wizard,
};
use clap::Parser;
use std::io::{BufRead, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting carbon-estimator");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail(&e);
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => TomlConfig::default(),
    };

    cli.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        fail(&e);
    }
    tracing::info!("✅ Configuration loaded and validated successfully");

    let mut wizard = Wizard::new(config.calculator(), config.contact_step_enabled());

    if let Some(path) = &cli.input {
        tracing::info!("📋 Loading answers from: {}", path);
        match load_answers(path) {
            Ok(input) => wizard.load_input(input),
            Err(e) => fail(&e),
        }
    }
    apply_contact_flags(&cli, &mut wizard);

    if cli.interactive {
        if let Err(e) = run_interactive(&mut wizard) {
            fail(&e);
        }
    } else {
        while wizard.step() != Step::Results {
            if let Err(e) = wizard.next() {
                fail(&e);
            }
        }
    }

    let Some(result) = wizard.result().cloned() else {
        anyhow::bail!("calculation did not produce a result");
    };

    println!("{}", render_text(&result));

    if config.export.enabled {
        let output_path = config.output_path();
        let storage = LocalStorage::new(output_path.to_string());
        match export_bundle(&storage, wizard.input(), &result).await {
            Ok(file_name) => {
                let full_path = std::path::Path::new(output_path).join(file_name);
                tracing::info!("📁 Report bundle saved to: {}", full_path.display());
                println!("📁 Report saved to: {}", full_path.display());
            }
            Err(e) => fail(&e),
        }
    }

    if cli.send {
        let contact = wizard.input().contact.clone().unwrap_or_default();
        let snapshot_path = cli.snapshot.clone().unwrap_or_default();

        let sender = match ReportClient::from_config(&config) {
            Ok(sender) => sender,
            Err(e) => fail(&e),
        };
        let renderer = FileSnapshot::new(LocalStorage::new(".".to_string()), snapshot_path);
        let engine = EstimatorEngine::new(renderer, sender);

        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = cancel_tx.send(());
            }
        });

        match engine.deliver_with_cancel(&contact, &result, cancel_rx).await {
            Ok(()) => {
                println!("📧 Report sent to {}", contact.email.trim());
            }
            Err(e) => fail(&e),
        }
    }

    Ok(())
}

fn apply_contact_flags(cli: &CliConfig, wizard: &mut Wizard) {
    let provided = cli.email.is_some()
        || cli.first_name.is_some()
        || cli.last_name.is_some()
        || cli.consent;
    if !provided {
        return;
    }

    let contact = wizard.contact_mut();
    if let Some(email) = &cli.email {
        contact.email = email.clone();
    }
    if let Some(first_name) = &cli.first_name {
        contact.first_name = first_name.clone();
    }
    if let Some(last_name) = &cli.last_name {
        contact.last_name = last_name.clone();
    }
    if cli.consent {
        contact.consent = true;
    }
}

fn fail(e: &EstimatorError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}

fn prompt(label: &str, current: &str) -> carbon_estimator::Result<String> {
    print!("{} [{}]: ", label, current);
    std::io::stdout().flush()?;

    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(EstimatorError::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed before the calculation finished",
        )));
    }

    let answer = line.trim();
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    })
}

fn run_interactive(wizard: &mut Wizard) -> carbon_estimator::Result<()> {
    while wizard.step() != Step::Results {
        let (index, total) = wizard.progress();
        println!("\n== Step {}/{}: {} ==", index, total, wizard.step());

        match wizard.step() {
            Step::Electricity => {
                let current = wizard.input().electricity.clone();
                let usage = prompt("Monthly electricity usage", &current.usage.to_string())?;
                wizard.set_numeric(NumericField::ElectricityUsage, &usage);
                let unit = prompt("Unit (kWh/MWh)", unit_label(current.unit))?;
                if let Some(unit) = parse_unit(&unit) {
                    wizard.set_electricity_unit(unit);
                }
            }
            Step::Transportation => {
                let current = wizard.input().transportation.clone();
                let mileage = prompt("Monthly car mileage (km)", &current.car_mileage_km.to_string())?;
                wizard.set_numeric(NumericField::CarMileageKm, &mileage);
                let fuel = prompt("Fuel type (petrol/diesel/electric)", fuel_label(current.fuel_type))?;
                if let Some(fuel) = parse_fuel(&fuel) {
                    wizard.set_fuel_type(fuel);
                }
                let public = prompt(
                    "Monthly public transport (km)",
                    &current.public_transport_km.to_string(),
                )?;
                wizard.set_numeric(NumericField::PublicTransportKm, &public);
                let flights = prompt("Monthly flight distance (km)", &current.flight_km.to_string())?;
                wizard.set_numeric(NumericField::FlightKm, &flights);
            }
            Step::Housing => {
                let current = wizard.input().housing.clone();
                let heating = prompt(
                    "Monthly heating usage (kWh)",
                    &current.heating_usage_kwh.to_string(),
                )?;
                wizard.set_numeric(NumericField::HeatingUsageKwh, &heating);
                let heating_type = prompt(
                    "Heating type (natural_gas/electric/oil)",
                    heating_label(current.heating_type),
                )?;
                if let Some(heating_type) = parse_heating(&heating_type) {
                    wizard.set_heating_type(heating_type);
                }
                let size = prompt("Household size", &current.household_size.to_string())?;
                wizard.set_numeric(NumericField::HouseholdSize, &size);
            }
            Step::ContactDetails => {
                let current = wizard.input().contact.clone().unwrap_or_default();
                let first_name = prompt("First name", &current.first_name)?;
                let last_name = prompt("Last name", &current.last_name)?;
                let email = prompt("Email", &current.email)?;
                let phone = prompt("Phone", &current.phone)?;
                let company = prompt("Company", &current.company)?;
                let country = prompt("Country", &current.country)?;
                let consent = prompt(
                    "I agree to receive my report by email (y/n)",
                    if current.consent { "y" } else { "n" },
                )?;

                let contact = wizard.contact_mut();
                contact.first_name = first_name;
                contact.last_name = last_name;
                contact.email = email;
                contact.phone = phone;
                contact.company = company;
                contact.country = country;
                contact.consent = matches!(consent.to_ascii_lowercase().as_str(), "y" | "yes");
            }
            Step::Results => break,
        }

        if wizard.step() == Step::ContactDetails {
            let errors = wizard
                .input()
                .contact
                .as_ref()
                .map(contact_field_errors)
                .unwrap_or_default();
            if !errors.is_empty() {
                for e in errors {
                    println!("  ⚠️  {}", e.user_friendly_message());
                }
                continue;
            }
        }

        wizard.next()?;
    }

    Ok(())
}

fn unit_label(unit: ElectricityUnit) -> &'static str {
    match unit {
        ElectricityUnit::Kwh => "kWh",
        ElectricityUnit::Mwh => "MWh",
    }
}

fn parse_unit(raw: &str) -> Option<ElectricityUnit> {
    match raw.to_ascii_lowercase().as_str() {
        "kwh" => Some(ElectricityUnit::Kwh),
        "mwh" => Some(ElectricityUnit::Mwh),
        _ => None,
    }
}

fn fuel_label(fuel: FuelType) -> &'static str {
    match fuel {
        FuelType::Petrol => "petrol",
        FuelType::Diesel => "diesel",
        FuelType::Electric => "electric",
    }
}

fn parse_fuel(raw: &str) -> Option<FuelType> {
    match raw.to_ascii_lowercase().as_str() {
        "petrol" => Some(FuelType::Petrol),
        "diesel" => Some(FuelType::Diesel),
        "electric" => Some(FuelType::Electric),
        _ => None,
    }
}

fn heating_label(heating: HeatingType) -> &'static str {
    match heating {
        HeatingType::NaturalGas => "natural_gas",
        HeatingType::Electric => "electric",
        HeatingType::Oil => "oil",
    }
}

fn parse_heating(raw: &str) -> Option<HeatingType> {
    match raw.to_ascii_lowercase().as_str() {
        "natural_gas" | "gas" => Some(HeatingType::NaturalGas),
        "electric" => Some(HeatingType::Electric),
        "oil" => Some(HeatingType::Oil),
        _ => None,
    }
}
