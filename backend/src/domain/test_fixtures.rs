//! Shared fixtures for domain unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::{
    Caller, Email, PatientDetails, PersonName, ProviderDetails, Specialization, User, UserId,
    UserProfile,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn patient(name: &str, provider: Option<UserId>) -> User {
    let mut details = PatientDetails::new(
        NaiveDate::from_ymd_opt(1988, 6, 2).expect("valid date of birth"),
    );
    details.provider_id = provider;
    User {
        id: UserId::random(),
        name: PersonName::new(name).expect("valid name"),
        email: Email::new(format!("{}@example.com", name.to_lowercase()))
            .expect("valid email"),
        profile: UserProfile::Patient(details),
        created_at: fixture_timestamp(),
    }
}

pub(crate) fn provider(name: &str, patients: &[UserId]) -> User {
    User {
        id: UserId::random(),
        name: PersonName::new(name).expect("valid name"),
        email: Email::new(format!("{}@clinic.example", name.to_lowercase().replace(' ', ".")))
            .expect("valid email"),
        profile: UserProfile::Provider(ProviderDetails {
            specialization: Specialization::new("Endocrinology").expect("valid specialization"),
            patients: patients.iter().copied().collect::<BTreeSet<_>>(),
        }),
        created_at: fixture_timestamp(),
    }
}

/// An assigned pair: the patient points at the provider and the provider's
/// roster contains the patient.
pub(crate) fn assigned_pair() -> (User, User) {
    let mut dr_bob = provider("Dr Bob", &[]);
    let alice = patient("Alice", Some(dr_bob.id));
    if let UserProfile::Provider(details) = &mut dr_bob.profile {
        details.patients.insert(alice.id);
    }
    (alice, dr_bob)
}

pub(crate) fn caller(user: &User) -> Caller {
    Caller::for_user(user)
}
