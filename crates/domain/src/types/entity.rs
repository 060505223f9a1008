//! Entity types and their REST endpoints
//!
//! Every known entity has a static row (name, endpoint, default TTL).
//! Unrecognized names become [`EntityType::Custom`] and resolve through the
//! fallback rule: `/` + lowercase name + `s`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_TTL_MS, TEMPLATE_CACHE_TTL_MS};
use crate::errors::ClinicError;

/// Kind of domain record addressed by the API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityType {
    Patient,
    Appointment,
    User,
    Organization,
    Encounter,
    Prescription,
    LabOrder,
    Billing,
    ConsultationTemplate,
    MedicalDocumentTemplate,
    Consultation,
    Medication,
    Diagnosis,
    VitalSigns,
    /// Any other entity name; endpoint follows the pluralization fallback
    Custom(String),
}

/// Static data associated with a known entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRow {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub default_ttl_ms: u64,
}

const fn standard(name: &'static str, endpoint: &'static str) -> EntityRow {
    EntityRow { name, endpoint, default_ttl_ms: DEFAULT_CACHE_TTL_MS }
}

const fn template(name: &'static str, endpoint: &'static str) -> EntityRow {
    EntityRow { name, endpoint, default_ttl_ms: TEMPLATE_CACHE_TTL_MS }
}

impl EntityType {
    /// All known entity types, in declaration order
    pub const KNOWN: [EntityType; 14] = [
        EntityType::Patient,
        EntityType::Appointment,
        EntityType::User,
        EntityType::Organization,
        EntityType::Encounter,
        EntityType::Prescription,
        EntityType::LabOrder,
        EntityType::Billing,
        EntityType::ConsultationTemplate,
        EntityType::MedicalDocumentTemplate,
        EntityType::Consultation,
        EntityType::Medication,
        EntityType::Diagnosis,
        EntityType::VitalSigns,
    ];

    /// Static row for a known type; `None` for [`EntityType::Custom`]
    pub const fn row(&self) -> Option<EntityRow> {
        let row = match self {
            Self::Patient => standard("Patient", "/patients"),
            Self::Appointment => standard("Appointment", "/appointments"),
            Self::User => standard("User", "/users"),
            Self::Organization => standard("Organization", "/organizations"),
            Self::Encounter => standard("Encounter", "/encounters"),
            Self::Prescription => standard("Prescription", "/prescriptions"),
            Self::LabOrder => standard("LabOrder", "/lab-orders"),
            Self::Billing => standard("Billing", "/billing"),
            Self::ConsultationTemplate => {
                template("ConsultationTemplate", "/consultation-templates")
            }
            Self::MedicalDocumentTemplate => {
                template("MedicalDocumentTemplate", "/medical-document-templates")
            }
            Self::Consultation => standard("Consultation", "/consultations"),
            Self::Medication => standard("Medication", "/medications"),
            Self::Diagnosis => standard("Diagnosis", "/diagnoses"),
            Self::VitalSigns => standard("VitalSigns", "/vital-signs"),
            Self::Custom(_) => return None,
        };
        Some(row)
    }

    /// Name used in cache keys and on the wire
    pub fn name(&self) -> &str {
        match self {
            Self::Custom(name) => name.as_str(),
            known => known.row().map_or("", |row| row.name),
        }
    }

    /// REST path segment, always starting with `/`
    pub fn endpoint(&self) -> Cow<'static, str> {
        match self.row() {
            Some(row) => Cow::Borrowed(row.endpoint),
            None => Cow::Owned(format!("/{}s", self.name().to_lowercase())),
        }
    }

    /// Path for a single record: `<endpoint>/<id>`
    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint(), id)
    }

    /// Freshness window used when the caller does not set `cache_ttl`
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.row().map_or(DEFAULT_CACHE_TTL_MS, |row| row.default_ttl_ms))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityType {
    type Err = ClinicError;

    /// Known names match case-insensitively; anything else is `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ClinicError::InvalidInput("entity type must not be empty".into()));
        }

        let known = Self::KNOWN
            .iter()
            .find(|entity| entity.name().eq_ignore_ascii_case(name))
            .cloned();

        Ok(known.unwrap_or_else(|| Self::Custom(name.to_string())))
    }
}

impl TryFrom<String> for EntityType {
    type Error = ClinicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityType> for String {
    fn from(entity: EntityType) -> Self {
        match entity {
            EntityType::Custom(name) => name,
            known => known.name().to_string(),
        }
    }
}
