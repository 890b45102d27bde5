use crate::infra::Services;
use chrono::{Local, NaiveDate};
use clap::Args;
use provider_rules::config::RulesConfig;
use provider_rules::error::AppError;
use provider_rules::providers::{
    LicensePayload, LicenseStatus, PracticeLocationPayload, ProviderPayload, ProviderRecord,
    ProviderServiceError, VerificationStatus,
};
use provider_rules::roster::{RosterImporter, RosterReport};
use provider_rules::rules::{EvaluationRequest, EvaluationResponse};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full JSON response for every provider.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding an evaluation request (`{"provider": {...}}`).
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Overrides the request's `today`.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Comma-separated rule names to run instead of every rule.
    #[arg(long)]
    pub(crate) rule_set: Option<String>,
    /// Compare against the sample providers when checking for duplicates.
    #[arg(long)]
    pub(crate) with_samples: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RosterArgs {
    /// Roster CSV export to evaluate.
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the full report as JSON instead of a summary.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Outcome of a seeding attempt.
#[derive(Debug)]
pub(crate) enum SeedOutcome {
    Created(Vec<ProviderRecord>),
    AlreadySeeded(Vec<ProviderRecord>),
}

/// Store the sample providers unless the store already holds providers.
pub(crate) fn seed_samples(services: &Services) -> Result<SeedOutcome, ProviderServiceError> {
    let existing = services.providers.list()?;
    if !existing.is_empty() {
        return Ok(SeedOutcome::AlreadySeeded(existing));
    }

    let created = services.providers.create_bulk(sample_providers())?;
    Ok(SeedOutcome::Created(created))
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let services = Services::in_memory(&RulesConfig::default());
    services.rules.initialize()?;

    println!("Provider rule engine demo ({today})");
    println!("Loaded rules: {}", services.rules.loaded_rules().join(", "));

    let records = match seed_samples(&services)? {
        SeedOutcome::Created(records) | SeedOutcome::AlreadySeeded(records) => records,
    };
    println!("Seeded {} sample providers", records.len());

    for record in &records {
        let request = EvaluationRequest::new(ProviderPayload::from(&record.provider)).on(today);
        let response = services.rules.evaluate(request)?;
        println!(
            "\n{} (NPI {}) -> {}",
            record.provider.full_name(),
            record.provider.npi,
            response.message
        );
        render_results(&response);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    let mut applicant = sample_providers().remove(0);
    applicant.npi = "9876543210".to_string();
    applicant.first_name = " john ".to_string();
    println!("\nNew applicant matching a stored provider (NPI {})", applicant.npi);
    let response = services
        .rules
        .evaluate(EvaluationRequest::new(applicant).on(today))?;
    println!("  {}", response.message);
    render_results(&response);

    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        file,
        today,
        rule_set,
        with_samples,
    } = args;

    let raw = std::fs::read_to_string(file)?;
    let mut request: EvaluationRequest = serde_json::from_str(&raw)?;
    if today.is_some() {
        request.today = today;
    }
    if rule_set.is_some() {
        request.rule_set = rule_set;
    }

    let services = Services::in_memory(&RulesConfig::default());
    services.rules.initialize()?;
    if with_samples {
        seed_samples(&services)?;
    }

    let response = services.rules.evaluate(request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub(crate) fn run_roster(args: RosterArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let payloads = RosterImporter::from_path(&args.csv)?;

    let services = Services::in_memory(&RulesConfig::default());
    services.rules.initialize()?;
    let report = RosterReport::build(payloads, &services.providers, &services.rules, today)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Roster evaluation for {} ({today})", args.csv.display());
    println!(
        "- {} providers | {} flagged | {} rules fired",
        report.entries.len(),
        report.flagged_count(),
        report.rules_fired()
    );
    for (rule, count) in report.fired_by_rule() {
        println!("  - {rule}: {count}");
    }
    for entry in report.entries.iter().filter(|entry| entry.flagged()) {
        println!("\n{} (NPI {})", entry.full_name, entry.npi);
        render_results(&entry.response);
    }
    for entry in report.entries.iter().filter(|entry| !entry.response.success) {
        println!("\n{} (NPI {}): {}", entry.full_name, entry.npi, entry.response.message);
    }

    Ok(())
}

fn render_results(response: &EvaluationResponse) {
    if response.results.is_empty() {
        println!("  No rules fired");
        return;
    }
    for result in &response.results {
        println!("  [{}] {}", result.severity, result.message);
        for fact in &result.facts {
            println!("    - {fact}");
        }
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Three sample providers: one current, one with a lapsed license, one with two locations.
pub(crate) fn sample_providers() -> Vec<ProviderPayload> {
    vec![
        ProviderPayload {
            npi: "1234567890".to_string(),
            first_name: "John".to_string(),
            middle_name: Some("Michael".to_string()),
            last_name: "Smith".to_string(),
            email: Some("john.smith@example.com".to_string()),
            phone: Some("555-123-4567".to_string()),
            date_of_birth: date(1980, 5, 15),
            specialty: Some("Internal Medicine".to_string()),
            taxonomy_code: Some("207R00000X".to_string()),
            verification_status: Some(VerificationStatus::Verified),
            licenses: vec![LicensePayload {
                license_number: "MD123456".to_string(),
                state: "CA".to_string(),
                license_type: "Medical Doctor".to_string(),
                issue_date: date(2010, 6, 1),
                expiry_date: date(2025, 6, 1),
                status: Some(LicenseStatus::Active),
            }],
            practice_locations: vec![location(
                "Smith Medical Center",
                "123 Main St",
                "San Francisco",
                "CA",
                "94102",
                "555-123-4567",
                "207R00000X",
                true,
            )],
            ..ProviderPayload::default()
        },
        ProviderPayload {
            npi: "2345678901".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane.doe@example.com".to_string()),
            phone: Some("555-234-5678".to_string()),
            date_of_birth: date(1975, 8, 22),
            specialty: Some("Cardiology".to_string()),
            taxonomy_code: Some("207RC0000X".to_string()),
            verification_status: Some(VerificationStatus::Pending),
            licenses: vec![LicensePayload {
                license_number: "MD234567".to_string(),
                state: "NY".to_string(),
                license_type: "Medical Doctor".to_string(),
                issue_date: date(2015, 3, 1),
                expiry_date: date(2020, 3, 1),
                status: Some(LicenseStatus::Expired),
            }],
            practice_locations: vec![location(
                "Doe Cardiology Clinic",
                "456 Oak Ave",
                "New York",
                "NY",
                "10001",
                "555-234-5678",
                "207RC0000X",
                true,
            )],
            ..ProviderPayload::default()
        },
        ProviderPayload {
            npi: "3456789012".to_string(),
            first_name: "Robert".to_string(),
            last_name: "Johnson".to_string(),
            email: Some("robert.johnson@example.com".to_string()),
            phone: Some("555-345-6789".to_string()),
            date_of_birth: date(1982, 12, 10),
            specialty: Some("Family Medicine".to_string()),
            taxonomy_code: Some("207Q00000X".to_string()),
            verification_status: Some(VerificationStatus::Verified),
            licenses: vec![LicensePayload {
                license_number: "MD345678".to_string(),
                state: "TX".to_string(),
                license_type: "Medical Doctor".to_string(),
                issue_date: date(2012, 1, 15),
                expiry_date: date(2026, 1, 15),
                status: Some(LicenseStatus::Active),
            }],
            practice_locations: vec![
                location(
                    "Johnson Family Medicine",
                    "789 Pine St",
                    "Houston",
                    "TX",
                    "77001",
                    "555-345-6789",
                    "207Q00000X",
                    true,
                ),
                location(
                    "Johnson Family Medicine - Branch",
                    "321 Elm St",
                    "Austin",
                    "TX",
                    "73301",
                    "555-345-6790",
                    "207Q00000X",
                    false,
                ),
            ],
            ..ProviderPayload::default()
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn location(
    name: &str,
    address_line1: &str,
    city: &str,
    state: &str,
    zip_code: &str,
    phone: &str,
    taxonomy_code: &str,
    is_primary: bool,
) -> PracticeLocationPayload {
    PracticeLocationPayload {
        name: name.to_string(),
        address_line1: address_line1.to_string(),
        address_line2: None,
        city: city.to_string(),
        state: state.to_string(),
        zip_code: zip_code.to_string(),
        phone: Some(phone.to_string()),
        taxonomy_code: Some(taxonomy_code.to_string()),
        is_primary,
    }
}
