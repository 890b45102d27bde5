use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{
    License, LicenseStatus, PracticeLocation, ProviderId, VerificationStatus,
};
use super::repository::ProviderRecord;
use crate::rules::RuleResult;

/// Outward representation of a stored provider with derived license state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderView {
    pub id: Option<ProviderId>,
    pub npi: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_code: Option<String>,
    pub verification_status: VerificationStatus,
    pub licenses: Vec<LicenseView>,
    pub practice_locations: Vec<PracticeLocationView>,
    pub rule_evaluations: Vec<RuleResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseView {
    pub license_number: String,
    pub state: String,
    pub license_type: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: LicenseStatus,
    pub expired: bool,
    pub expiring_soon: bool,
    pub days_until_expiry: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeLocationView {
    pub name: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_code: Option<String>,
    pub is_primary: bool,
    pub full_address: String,
}

impl ProviderView {
    pub fn from_record(record: &ProviderRecord, today: NaiveDate, expiring_soon_days: i64) -> Self {
        let provider = &record.provider;
        Self {
            id: provider.id,
            npi: provider.npi.clone(),
            first_name: provider.first_name.clone(),
            middle_name: provider.middle_name.clone(),
            last_name: provider.last_name.clone(),
            full_name: provider.full_name(),
            email: provider.email.clone(),
            phone: provider.phone.clone(),
            date_of_birth: provider.date_of_birth,
            specialty: provider.specialty.clone(),
            taxonomy_code: provider.taxonomy_code.clone(),
            verification_status: provider.verification_status,
            licenses: provider
                .licenses
                .iter()
                .map(|license| LicenseView::new(license, today, expiring_soon_days))
                .collect(),
            practice_locations: provider
                .practice_locations
                .iter()
                .map(PracticeLocationView::from)
                .collect(),
            rule_evaluations: record.rule_evaluations.clone(),
        }
    }
}

impl LicenseView {
    pub fn new(license: &License, today: NaiveDate, expiring_soon_days: i64) -> Self {
        Self {
            license_number: license.license_number.clone(),
            state: license.state.clone(),
            license_type: license.license_type.clone(),
            issue_date: license.issue_date,
            expiry_date: license.expiry_date,
            status: license.status,
            expired: license.is_expired_on(today),
            expiring_soon: license.is_expiring_soon_on(today, expiring_soon_days),
            days_until_expiry: license.days_until_expiry(today),
        }
    }
}

impl From<&PracticeLocation> for PracticeLocationView {
    fn from(location: &PracticeLocation) -> Self {
        Self {
            name: location.name.clone(),
            address_line1: location.address_line1.clone(),
            address_line2: location.address_line2.clone(),
            city: location.city.clone(),
            state: location.state.clone(),
            zip_code: location.zip_code.clone(),
            phone: location.phone.clone(),
            taxonomy_code: location.taxonomy_code.clone(),
            is_primary: location.is_primary,
            full_address: location.full_address(),
        }
    }
}
