use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::providers::{normalize_npi, LicensePayload, ProviderPayload};

/// Parse a roster export, merging rows that share an NPI into one provider.
pub(crate) fn parse_roster<R: Read>(reader: R) -> Result<Vec<ProviderPayload>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut providers: Vec<ProviderPayload> = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record?;
        let key = normalize_npi(&row.npi);
        let license = row.license();

        match providers
            .iter_mut()
            .find(|provider| normalize_npi(&provider.npi) == key && !key.is_empty())
        {
            Some(existing) => existing.licenses.extend(license),
            None => {
                let mut provider = row.into_payload();
                provider.licenses.extend(license);
                providers.push(provider);
            }
        }
    }

    Ok(providers)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "NPI", default)]
    npi: String,
    #[serde(rename = "First Name", default)]
    first_name: String,
    #[serde(
        rename = "Middle Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    middle_name: Option<String>,
    #[serde(rename = "Last Name", default)]
    last_name: String,
    #[serde(
        rename = "Date of Birth",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    date_of_birth: Option<String>,
    #[serde(rename = "Specialty", default, deserialize_with = "empty_string_as_none")]
    specialty: Option<String>,
    #[serde(
        rename = "License Number",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    license_number: Option<String>,
    #[serde(
        rename = "License State",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    license_state: Option<String>,
    #[serde(
        rename = "License Type",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    license_type: Option<String>,
    #[serde(rename = "Issue Date", default, deserialize_with = "empty_string_as_none")]
    issue_date: Option<String>,
    #[serde(
        rename = "Expiry Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    expiry_date: Option<String>,
}

impl RosterRow {
    /// A row without any license columns describes a provider with no license.
    fn license(&self) -> Option<LicensePayload> {
        if self.license_number.is_none()
            && self.license_state.is_none()
            && self.license_type.is_none()
            && self.expiry_date.is_none()
        {
            return None;
        }

        Some(LicensePayload {
            license_number: self.license_number.clone().unwrap_or_default(),
            state: self.license_state.clone().unwrap_or_default(),
            license_type: self.license_type.clone().unwrap_or_default(),
            issue_date: self.issue_date.as_deref().and_then(parse_date),
            expiry_date: self.expiry_date.as_deref().and_then(parse_date),
            status: None,
        })
    }

    fn into_payload(self) -> ProviderPayload {
        ProviderPayload {
            date_of_birth: self.date_of_birth.as_deref().and_then(parse_date),
            npi: self.npi,
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            specialty: self.specialty,
            ..ProviderPayload::default()
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts ISO dates and US-style `MM/DD/YYYY`. Unparseable dates read as missing.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}
