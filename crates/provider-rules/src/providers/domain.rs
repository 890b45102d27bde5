use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::normalize::normalize_npi;

/// Identifier assigned by the provider store once a record is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentialing state of a provider record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Flagged,
    Rejected,
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Verified => "VERIFIED",
            VerificationStatus::Flagged => "FLAGGED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "VERIFIED" => Some(Self::Verified),
            "FLAGGED" => Some(Self::Flagged),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Administrative status recorded by the issuing board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    #[default]
    Active,
    Expired,
    Suspended,
    Revoked,
}

/// State license held by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub license_number: String,
    pub state: String,
    pub license_type: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: LicenseStatus,
}

impl License {
    /// Strictly after the expiry date; a license expiring today is still current.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        today > self.expiry_date
    }

    pub fn is_expiring_soon_on(&self, today: NaiveDate, within_days: i64) -> bool {
        if self.is_expired_on(today) {
            return false;
        }

        let horizon = match u64::try_from(within_days) {
            Ok(days) => today.checked_add_days(Days::new(days)),
            Err(_) => today.checked_sub_days(Days::new(within_days.unsigned_abs())),
        };
        match horizon {
            Some(horizon) => horizon >= self.expiry_date,
            // The window reaches past the last representable date.
            None => within_days > 0,
        }
    }

    /// Signed day count; negative once the license has lapsed.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }
}

/// Address where the provider sees patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeLocation {
    pub name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: Option<String>,
    pub taxonomy_code: Option<String>,
    pub is_primary: bool,
}

impl PracticeLocation {
    pub fn full_address(&self) -> String {
        let mut address = self.address_line1.clone();
        if let Some(line2) = self
            .address_line2
            .as_deref()
            .filter(|line| !line.trim().is_empty())
        {
            address.push_str(", ");
            address.push_str(line2);
        }
        format!("{address}, {}, {} {}", self.city, self.state, self.zip_code)
    }
}

/// Typed provider fact. Built from a [`ProviderPayload`] after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Option<ProviderId>,
    pub npi: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: NaiveDate,
    pub specialty: Option<String>,
    pub taxonomy_code: Option<String>,
    pub verification_status: VerificationStatus,
    pub licenses: Vec<License>,
    pub practice_locations: Vec<PracticeLocation>,
}

impl Provider {
    pub fn full_name(&self) -> String {
        match self
            .middle_name
            .as_deref()
            .filter(|middle| !middle.trim().is_empty())
        {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn has_expired_license(&self, today: NaiveDate) -> bool {
        self.licenses
            .iter()
            .any(|license| license.is_expired_on(today))
    }

    pub fn has_valid_license(&self, today: NaiveDate) -> bool {
        self.licenses
            .iter()
            .any(|license| !license.is_expired_on(today))
    }
}

/// Inbound provider shape used by the HTTP layer, the CLI, and roster imports.
///
/// Required values are optional here so a missing field surfaces as a
/// [`FactError`] naming the field rather than an opaque decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPayload {
    #[serde(default)]
    pub id: Option<ProviderId>,
    #[serde(default)]
    pub npi: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub taxonomy_code: Option<String>,
    #[serde(default)]
    pub verification_status: Option<VerificationStatus>,
    #[serde(default)]
    pub licenses: Vec<LicensePayload>,
    #[serde(default)]
    pub practice_locations: Vec<PracticeLocationPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicensePayload {
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub license_type: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<LicenseStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeLocationPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub taxonomy_code: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// A provider fact that cannot be assembled from its payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    #[error("provider is missing required field `{0}`")]
    MissingProviderField(&'static str),
    #[error("license #{index} is missing required field `{field}`")]
    MissingLicenseField { index: usize, field: &'static str },
    #[error("practice location #{index} is missing required field `{field}`")]
    MissingLocationField { index: usize, field: &'static str },
    #[error("NPI '{0}' contains no digits")]
    InvalidNpi(String),
}

fn required(value: String, field: &'static str) -> Result<String, FactError> {
    if value.trim().is_empty() {
        Err(FactError::MissingProviderField(field))
    } else {
        Ok(value)
    }
}

impl TryFrom<ProviderPayload> for Provider {
    type Error = FactError;

    fn try_from(payload: ProviderPayload) -> Result<Self, Self::Error> {
        let npi = required(payload.npi, "npi")?;
        if normalize_npi(&npi).is_empty() {
            return Err(FactError::InvalidNpi(npi));
        }

        let first_name = required(payload.first_name, "first_name")?;
        let last_name = required(payload.last_name, "last_name")?;
        let date_of_birth = payload
            .date_of_birth
            .ok_or(FactError::MissingProviderField("date_of_birth"))?;

        let licenses = payload
            .licenses
            .into_iter()
            .enumerate()
            .map(|(index, license)| license.into_license(index))
            .collect::<Result<Vec<_>, _>>()?;

        let practice_locations = payload
            .practice_locations
            .into_iter()
            .enumerate()
            .map(|(index, location)| location.into_location(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Provider {
            id: payload.id,
            npi,
            first_name,
            middle_name: payload.middle_name,
            last_name,
            email: payload.email,
            phone: payload.phone,
            date_of_birth,
            specialty: payload.specialty,
            taxonomy_code: payload.taxonomy_code,
            verification_status: payload.verification_status.unwrap_or_default(),
            licenses,
            practice_locations,
        })
    }
}

impl LicensePayload {
    fn into_license(self, index: usize) -> Result<License, FactError> {
        let missing = |field| FactError::MissingLicenseField { index, field };
        let text = |value: String, field| {
            if value.trim().is_empty() {
                Err(missing(field))
            } else {
                Ok(value)
            }
        };

        Ok(License {
            license_number: text(self.license_number, "license_number")?,
            state: text(self.state, "state")?,
            license_type: text(self.license_type, "license_type")?,
            issue_date: self.issue_date.ok_or_else(|| missing("issue_date"))?,
            expiry_date: self.expiry_date.ok_or_else(|| missing("expiry_date"))?,
            status: self.status.unwrap_or_default(),
        })
    }
}

impl PracticeLocationPayload {
    fn into_location(self, index: usize) -> Result<PracticeLocation, FactError> {
        let text = |value: String, field| {
            if value.trim().is_empty() {
                Err(FactError::MissingLocationField { index, field })
            } else {
                Ok(value)
            }
        };

        Ok(PracticeLocation {
            name: text(self.name, "name")?,
            address_line1: text(self.address_line1, "address_line1")?,
            address_line2: self.address_line2,
            city: text(self.city, "city")?,
            state: text(self.state, "state")?,
            zip_code: text(self.zip_code, "zip_code")?,
            phone: self.phone,
            taxonomy_code: self.taxonomy_code,
            is_primary: self.is_primary,
        })
    }
}

impl From<&Provider> for ProviderPayload {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            npi: provider.npi.clone(),
            first_name: provider.first_name.clone(),
            middle_name: provider.middle_name.clone(),
            last_name: provider.last_name.clone(),
            email: provider.email.clone(),
            phone: provider.phone.clone(),
            date_of_birth: Some(provider.date_of_birth),
            specialty: provider.specialty.clone(),
            taxonomy_code: provider.taxonomy_code.clone(),
            verification_status: Some(provider.verification_status),
            licenses: provider
                .licenses
                .iter()
                .map(|license| LicensePayload {
                    license_number: license.license_number.clone(),
                    state: license.state.clone(),
                    license_type: license.license_type.clone(),
                    issue_date: Some(license.issue_date),
                    expiry_date: Some(license.expiry_date),
                    status: Some(license.status),
                })
                .collect(),
            practice_locations: provider
                .practice_locations
                .iter()
                .map(|location| PracticeLocationPayload {
                    name: location.name.clone(),
                    address_line1: location.address_line1.clone(),
                    address_line2: location.address_line2.clone(),
                    city: location.city.clone(),
                    state: location.state.clone(),
                    zip_code: location.zip_code.clone(),
                    phone: location.phone.clone(),
                    taxonomy_code: location.taxonomy_code.clone(),
                    is_primary: location.is_primary,
                })
                .collect(),
        }
    }
}
