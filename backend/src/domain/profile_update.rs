//! Self-service profile edits.
//!
//! Only descriptive fields are editable. Role, email, credentials, and the
//! patient/provider relationship are deliberately absent, so an update can
//! never touch the assignment graph.

use chrono::NaiveDate;

use super::{PersonName, Specialization, UserValidationError};

const LIST_MAX_ITEMS: usize = 50;
const LIST_ITEM_MAX: usize = 200;

/// Validation failures for profile edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileUpdateError {
    /// Nothing to change.
    #[error("at least one field must be provided")]
    Empty,
    /// A list held too many entries.
    #[error("{field} must contain at most {max} entries")]
    TooManyEntries {
        /// Offending field.
        field: &'static str,
        /// Maximum entries.
        max: usize,
    },
    /// A list entry was too long.
    #[error("{field} entries must be at most {max} characters")]
    EntryTooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum characters.
        max: usize,
    },
    /// A user primitive failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
}

impl ProfileUpdateError {
    /// Request field the failure relates to, when there is one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::TooManyEntries { field, .. } | Self::EntryTooLong { field, .. } => Some(field),
            Self::User(
                UserValidationError::EmptySpecialization
                | UserValidationError::SpecializationTooLong { .. },
            ) => Some("specialization"),
            Self::User(_) => Some("name"),
        }
    }
}

/// Trim entries, drop blanks, and bound the list.
fn clean_list(field: &'static str, items: Vec<String>) -> Result<Vec<String>, ProfileUpdateError> {
    let cleaned: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect();
    if cleaned.len() > LIST_MAX_ITEMS {
        return Err(ProfileUpdateError::TooManyEntries {
            field,
            max: LIST_MAX_ITEMS,
        });
    }
    if cleaned.iter().any(|item| item.chars().count() > LIST_ITEM_MAX) {
        return Err(ProfileUpdateError::EntryTooLong {
            field,
            max: LIST_ITEM_MAX,
        });
    }
    Ok(cleaned)
}

/// Raw patient edit prior to validation.
#[derive(Debug, Clone, Default)]
pub struct PatientProfileDraft {
    /// New display name.
    pub name: Option<String>,
    /// New date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Replacement conditions list.
    pub conditions: Option<Vec<String>>,
    /// Replacement allergies list.
    pub allergies: Option<Vec<String>>,
    /// Replacement medications list.
    pub medications: Option<Vec<String>>,
}

/// Validated patient edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatientProfileUpdate {
    /// New display name.
    pub name: Option<PersonName>,
    /// New date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Replacement conditions list.
    pub conditions: Option<Vec<String>>,
    /// Replacement allergies list.
    pub allergies: Option<Vec<String>>,
    /// Replacement medications list.
    pub medications: Option<Vec<String>>,
}

impl PatientProfileUpdate {
    /// Validate a draft.
    pub fn try_from_draft(draft: PatientProfileDraft) -> Result<Self, ProfileUpdateError> {
        let PatientProfileDraft {
            name,
            date_of_birth,
            conditions,
            allergies,
            medications,
        } = draft;
        let update = Self {
            name: name.map(PersonName::new).transpose()?,
            date_of_birth,
            conditions: conditions
                .map(|items| clean_list("conditions", items))
                .transpose()?,
            allergies: allergies
                .map(|items| clean_list("allergies", items))
                .transpose()?,
            medications: medications
                .map(|items| clean_list("medications", items))
                .transpose()?,
        };
        if update == Self::default() {
            return Err(ProfileUpdateError::Empty);
        }
        Ok(update)
    }
}

/// Validated provider edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProviderProfileUpdate {
    /// New display name.
    pub name: Option<PersonName>,
    /// New specialty.
    pub specialization: Option<Specialization>,
}

impl ProviderProfileUpdate {
    /// Validate raw fields.
    pub fn try_from_parts(
        name: Option<&str>,
        specialization: Option<&str>,
    ) -> Result<Self, ProfileUpdateError> {
        let update = Self {
            name: name.map(PersonName::new).transpose()?,
            specialization: specialization.map(Specialization::new).transpose()?,
        };
        if update == Self::default() {
            return Err(ProfileUpdateError::Empty);
        }
        Ok(update)
    }
}
