//! Users of the care platform and their role-specific profiles.
//!
//! A user is either a patient or a provider. The role decides which profile
//! fields exist, so the profile is a tagged enum rather than a bag of
//! optional columns.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const NAME_MAX: usize = 120;
const SPECIALIZATION_MAX: usize = 120;

/// Validation errors raised while building user primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The name was blank once trimmed.
    #[error("name must not be empty")]
    EmptyName,
    /// The name exceeded the allowed length.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum permitted characters.
        max: usize,
    },
    /// The email address is not plausibly deliverable.
    #[error("email address is invalid")]
    InvalidEmail,
    /// Provider specialization was blank once trimmed.
    #[error("specialization must not be empty")]
    EmptySpecialization,
    /// Provider specialization exceeded the allowed length.
    #[error("specialization must be at most {max} characters")]
    SpecializationTooLong {
        /// Maximum permitted characters.
        max: usize,
    },
}

/// Stable user identifier.
///
/// # Examples
/// ```
/// use careline::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(raw.as_ref().trim())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two roles a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Logs health metrics and messages their provider.
    Patient,
    /// Looks after a roster of assigned patients.
    Provider,
}

impl Role {
    /// Lowercase wire and storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Self::Patient),
            "provider" => Ok(Self::Provider),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Lowercased, trimmed email address.
///
/// Uniqueness is enforced case-insensitively by storing only the normalised
/// form.
///
/// # Examples
/// ```
/// use careline::domain::Email;
///
/// let email = Email::new("  Alice@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain
            .split('.')
            .all(|label| !label.is_empty())
            && domain.contains('.');
        if local.is_empty()
            || !domain_ok
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the inner text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human-readable person name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the inner text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider specialty such as "Endocrinology".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Specialization(String);

impl Specialization {
    /// Trim and validate a specialization.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptySpecialization);
        }
        if trimmed.chars().count() > SPECIALIZATION_MAX {
            return Err(UserValidationError::SpecializationTooLong {
                max: SPECIALIZATION_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the inner text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Specialization {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Patient-only profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// Known conditions.
    pub conditions: Vec<String>,
    /// Known allergies.
    pub allergies: Vec<String>,
    /// Current medications.
    pub medications: Vec<String>,
    /// Assigned provider, if any.
    pub provider_id: Option<UserId>,
}

impl PatientDetails {
    /// Fresh patient details with empty medical lists and no provider.
    #[must_use]
    pub const fn new(date_of_birth: NaiveDate) -> Self {
        Self {
            date_of_birth,
            conditions: Vec::new(),
            allergies: Vec::new(),
            medications: Vec::new(),
            provider_id: None,
        }
    }
}

/// Provider-only profile fields.
///
/// `patients` is always derived from the patients' `provider_id` edges by
/// the repository, so it mirrors them exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDetails {
    /// Provider specialty.
    pub specialization: Specialization,
    /// Patients currently assigned to this provider.
    pub patients: BTreeSet<UserId>,
}

/// Role-tagged profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserProfile {
    /// Patient profile.
    Patient(PatientDetails),
    /// Provider profile.
    Provider(ProviderDetails),
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
    /// Normalised email address.
    pub email: Email,
    /// Role-specific profile.
    pub profile: UserProfile,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Role derived from the profile variant.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self.profile {
            UserProfile::Patient(_) => Role::Patient,
            UserProfile::Provider(_) => Role::Provider,
        }
    }

    /// Provider assigned to this user when it is a patient.
    #[must_use]
    pub const fn assigned_provider(&self) -> Option<&UserId> {
        match &self.profile {
            UserProfile::Patient(details) => details.provider_id.as_ref(),
            UserProfile::Provider(_) => None,
        }
    }

    /// Whether this user is a provider with `patient` on their roster.
    #[must_use]
    pub fn has_patient(&self, patient: &UserId) -> bool {
        match &self.profile {
            UserProfile::Provider(details) => details.patients.contains(patient),
            UserProfile::Patient(_) => false,
        }
    }

    /// Whether this user is a patient.
    #[must_use]
    pub const fn is_patient(&self) -> bool {
        matches!(self.profile, UserProfile::Patient(_))
    }

    /// Whether this user is a provider.
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self.profile, UserProfile::Provider(_))
    }
}
