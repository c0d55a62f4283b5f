//! Authentication primitives: login credentials, registration, and the
//! authenticated caller.
//!
//! Inbound adapters build these from raw strings; every constructor
//! validates so services only ever see well-formed values.

use std::fmt;

use chrono::NaiveDate;
use zeroize::Zeroizing;

use super::{Email, PersonName, Role, Specialization, User, UserId, UserValidationError};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Errors raised while validating login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was not a valid address.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is invalid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace and is wiped on drop.
///
/// # Examples
/// ```
/// use careline::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Alice@Example.com", "hunter22").unwrap();
/// assert_eq!(creds.email().as_str(), "alice@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let parsed = Email::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: parsed,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for lookup.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors raised while validating a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Consent to data processing was not given.
    #[error("consent is required to register")]
    ConsentRequired,
    /// Password was shorter than [`PASSWORD_MIN_LEN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length.
        min: usize,
    },
    /// Patient registrations need a date of birth.
    #[error("dateOfBirth is required for patients")]
    MissingDateOfBirth,
    /// Date of birth lies in the future.
    #[error("dateOfBirth must not be in the future")]
    DateOfBirthInFuture,
    /// Provider registrations need a specialization.
    #[error("specialization is required for providers")]
    MissingSpecialization,
    /// A user primitive failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
}

impl RegistrationValidationError {
    /// Request field the failure relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::ConsentRequired => "consent",
            Self::PasswordTooShort { .. } => "password",
            Self::MissingDateOfBirth | Self::DateOfBirthInFuture => "dateOfBirth",
            Self::MissingSpecialization
            | Self::User(
                UserValidationError::EmptySpecialization
                | UserValidationError::SpecializationTooLong { .. },
            ) => "specialization",
            Self::User(UserValidationError::InvalidEmail) => "email",
            Self::User(_) => "name",
        }
    }
}

/// Role-specific registration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationProfile {
    /// New patient.
    Patient {
        /// Date of birth.
        date_of_birth: NaiveDate,
    },
    /// New provider.
    Provider {
        /// Specialty.
        specialization: Specialization,
    },
}

/// Raw registration input prior to validation.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft<'a> {
    /// Display name.
    pub name: &'a str,
    /// Email address.
    pub email: &'a str,
    /// Plain-text password.
    pub password: &'a str,
    /// Requested role.
    pub role: Option<Role>,
    /// Patient date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Provider specialty.
    pub specialization: Option<&'a str>,
    /// Data-processing consent flag.
    pub consent: bool,
}

/// Validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: PersonName,
    email: Email,
    password: Zeroizing<String>,
    profile: RegistrationProfile,
}

impl Registration {
    /// Validate a draft. `today` bounds the date of birth.
    ///
    /// # Examples
    /// ```
    /// use careline::domain::{Registration, RegistrationDraft, Role};
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    /// let draft = RegistrationDraft {
    ///     name: "Alice",
    ///     email: "alice@example.com",
    ///     password: "correct horse",
    ///     role: Some(Role::Patient),
    ///     date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1),
    ///     specialization: None,
    ///     consent: true,
    /// };
    /// let registration = Registration::try_from_draft(&draft, today).unwrap();
    /// assert_eq!(registration.role(), Role::Patient);
    /// ```
    pub fn try_from_draft(
        draft: &RegistrationDraft<'_>,
        today: NaiveDate,
    ) -> Result<Self, RegistrationValidationError> {
        if !draft.consent {
            return Err(RegistrationValidationError::ConsentRequired);
        }
        let name = PersonName::new(draft.name)?;
        let email = Email::new(draft.email)?;
        if draft.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(RegistrationValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        let profile = match draft.role.unwrap_or(Role::Patient) {
            Role::Patient => {
                let date_of_birth = draft
                    .date_of_birth
                    .ok_or(RegistrationValidationError::MissingDateOfBirth)?;
                if date_of_birth > today {
                    return Err(RegistrationValidationError::DateOfBirthInFuture);
                }
                RegistrationProfile::Patient { date_of_birth }
            }
            Role::Provider => {
                let raw = draft
                    .specialization
                    .ok_or(RegistrationValidationError::MissingSpecialization)?;
                RegistrationProfile::Provider {
                    specialization: Specialization::new(raw)?,
                }
            }
        };
        Ok(Self {
            name,
            email,
            password: Zeroizing::new(draft.password.to_owned()),
            profile,
        })
    }

    /// Display name.
    #[must_use]
    pub const fn name(&self) -> &PersonName {
        &self.name
    }

    /// Normalised email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role-specific fields.
    #[must_use]
    pub const fn profile(&self) -> &RegistrationProfile {
        &self.profile
    }

    /// Role being registered.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self.profile {
            RegistrationProfile::Patient { .. } => Role::Patient,
            RegistrationProfile::Provider { .. } => Role::Provider,
        }
    }
}

/// Encoded password hash as stored by the persistence layer.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// The authenticated principal resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Authenticated user.
    pub id: UserId,
    /// Role asserted at token issue time.
    pub role: Role,
}

impl Caller {
    /// Build a caller for `user`.
    #[must_use]
    pub const fn for_user(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role(),
        }
    }
}

/// Opaque signed bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token for subsequent requests.
    pub token: SessionToken,
    /// The authenticated user.
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
    }

    fn patient_draft() -> RegistrationDraft<'static> {
        RegistrationDraft {
            name: "Alice",
            email: "alice@example.com",
            password: "longenough",
            role: Some(Role::Patient),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1),
            specialization: None,
            consent: true,
        }
    }

    fn provider_draft() -> RegistrationDraft<'static> {
        RegistrationDraft {
            name: "Dr Bob",
            email: "bob@example.com",
            password: "longenough",
            role: Some(Role::Provider),
            date_of_birth: None,
            specialization: Some("Endocrinology"),
            consent: true,
        }
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::InvalidEmail)]
    #[case("not-an-email", "pw", LoginValidationError::InvalidEmail)]
    #[case("alice@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn credentials_keep_password_verbatim() {
        let creds = LoginCredentials::try_from_parts(" ALICE@example.com", " pass word ")
            .expect("valid credentials");
        assert_eq!(creds.email().as_str(), "alice@example.com");
        assert_eq!(creds.password(), " pass word ");
    }

    #[rstest]
    fn patient_registration_validates(today: NaiveDate) {
        let registration =
            Registration::try_from_draft(&patient_draft(), today).expect("valid patient");
        assert_eq!(registration.role(), Role::Patient);
        assert_eq!(registration.email().as_str(), "alice@example.com");
    }

    #[rstest]
    fn provider_registration_validates(today: NaiveDate) {
        let registration =
            Registration::try_from_draft(&provider_draft(), today).expect("valid provider");
        assert_eq!(registration.role(), Role::Provider);
    }

    #[rstest]
    fn consent_is_required(today: NaiveDate) {
        let draft = RegistrationDraft {
            consent: false,
            ..patient_draft()
        };
        assert_eq!(
            Registration::try_from_draft(&draft, today),
            Err(RegistrationValidationError::ConsentRequired)
        );
    }

    #[rstest]
    fn short_passwords_are_rejected(today: NaiveDate) {
        let draft = RegistrationDraft {
            password: "short",
            ..patient_draft()
        };
        let err = Registration::try_from_draft(&draft, today).expect_err("too short");
        assert_eq!(err.field(), "password");
    }

    #[rstest]
    fn patients_need_a_past_birth_date(today: NaiveDate) {
        let missing = RegistrationDraft {
            date_of_birth: None,
            ..patient_draft()
        };
        assert_eq!(
            Registration::try_from_draft(&missing, today),
            Err(RegistrationValidationError::MissingDateOfBirth)
        );

        let future = RegistrationDraft {
            date_of_birth: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..patient_draft()
        };
        assert_eq!(
            Registration::try_from_draft(&future, today),
            Err(RegistrationValidationError::DateOfBirthInFuture)
        );
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   "))]
    fn providers_need_a_specialization(today: NaiveDate, #[case] specialization: Option<&'static str>) {
        let draft = RegistrationDraft {
            specialization,
            ..provider_draft()
        };
        let err = Registration::try_from_draft(&draft, today).expect_err("missing specialization");
        assert_eq!(err.field(), "specialization");
    }

    #[rstest]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("$argon2id$secret");
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }
}
