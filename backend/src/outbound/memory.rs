//! In-process store implementing every repository port.
//!
//! Used when no database is configured and by the behaviour tests. All state
//! sits behind one mutex, so each port call is a single critical section and
//! assignment changes are atomic with respect to every other call.
//!
//! Only the patient side of the care relationship is stored. Provider
//! rosters are derived from the patients' `provider_id` edges on every read.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    AssignmentOutcome, HealthMetricRepository, HealthMetricRepositoryError, MessageRepository,
    MessageRepositoryError, NewUser, StoredCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Email, HealthMetric, Message, MessageId, MetricQuery, PasswordHash, PatientDetails,
    PatientProfileUpdate, ProviderDetails, ProviderProfileUpdate, RegistrationProfile, User,
    UserId, UserProfile,
};

const POISONED: &str = "memory store lock poisoned";

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Default)]
struct StoreState {
    users: BTreeMap<UserId, UserRecord>,
    emails: HashMap<String, UserId>,
    metrics: Vec<HealthMetric>,
    messages: BTreeMap<MessageId, Message>,
}

impl StoreState {
    fn roster(&self, provider_id: &UserId) -> BTreeSet<UserId> {
        self.users
            .values()
            .filter(|record| record.user.assigned_provider() == Some(provider_id))
            .map(|record| record.user.id)
            .collect()
    }

    /// Clone a user, filling in a provider's derived roster.
    fn hydrate(&self, user: &User) -> User {
        let mut hydrated = user.clone();
        if let UserProfile::Provider(details) = &mut hydrated.profile {
            details.patients = self.roster(&hydrated.id);
        }
        hydrated
    }

    fn find(&self, id: &UserId) -> Option<User> {
        self.users.get(id).map(|record| self.hydrate(&record.user))
    }

    fn patient_details_mut(&mut self, id: &UserId) -> Result<&mut PatientDetails, AssignmentOutcome> {
        let record = self
            .users
            .get_mut(id)
            .ok_or(AssignmentOutcome::PatientNotFound)?;
        match &mut record.user.profile {
            UserProfile::Patient(details) => Ok(details),
            UserProfile::Provider(_) => Err(AssignmentOutcome::NotAPatient),
        }
    }

    fn relink(
        &mut self,
        patient_id: &UserId,
        edit: impl FnOnce(&mut Option<UserId>),
    ) -> AssignmentOutcome {
        match self.patient_details_mut(patient_id) {
            Ok(details) => edit(&mut details.provider_id),
            Err(outcome) => return outcome,
        }
        self.find(patient_id)
            .map_or(AssignmentOutcome::PatientNotFound, AssignmentOutcome::Applied)
    }
}

/// Mutex-guarded store backing the user, metric, and message ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, String> {
        self.state.lock().map_err(|_| POISONED.to_owned())
    }

    fn lock_users(&self) -> Result<MutexGuard<'_, StoreState>, UserRepositoryError> {
        self.lock().map_err(UserRepositoryError::connection)
    }
}

fn profile_for(registration: &RegistrationProfile) -> UserProfile {
    match registration {
        RegistrationProfile::Patient { date_of_birth } => {
            UserProfile::Patient(PatientDetails::new(*date_of_birth))
        }
        RegistrationProfile::Provider { specialization } => {
            UserProfile::Provider(ProviderDetails {
                specialization: specialization.clone(),
                patients: BTreeSet::new(),
            })
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, new_user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.lock_users()?;
        let email_key = new_user.email.as_str().to_owned();
        if state.emails.contains_key(&email_key) {
            return Err(UserRepositoryError::duplicate_email(email_key));
        }
        let user = User {
            id: new_user.id,
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            profile: profile_for(&new_user.profile),
            created_at: new_user.created_at,
        };
        state.emails.insert(email_key, user.id);
        state.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: new_user.password_hash.clone(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock_users()?.find(id))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let state = self.lock_users()?;
        let credentials = state
            .emails
            .get(email.as_str())
            .and_then(|id| state.users.get(id))
            .map(|record| StoredCredentials {
                user: state.hydrate(&record.user),
                password_hash: record.password_hash.clone(),
            });
        Ok(credentials)
    }

    async fn update_patient_profile(
        &self,
        id: &UserId,
        update: &PatientProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock_users()?;
        let Some(record) = state.users.get_mut(id) else {
            return Ok(None);
        };
        let UserProfile::Patient(details) = &mut record.user.profile else {
            return Ok(None);
        };
        if let Some(date_of_birth) = update.date_of_birth {
            details.date_of_birth = date_of_birth;
        }
        if let Some(conditions) = &update.conditions {
            details.conditions.clone_from(conditions);
        }
        if let Some(allergies) = &update.allergies {
            details.allergies.clone_from(allergies);
        }
        if let Some(medications) = &update.medications {
            details.medications.clone_from(medications);
        }
        if let Some(name) = &update.name {
            record.user.name = name.clone();
        }
        Ok(state.find(id))
    }

    async fn update_provider_profile(
        &self,
        id: &UserId,
        update: &ProviderProfileUpdate,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock_users()?;
        let Some(record) = state.users.get_mut(id) else {
            return Ok(None);
        };
        let UserProfile::Provider(details) = &mut record.user.profile else {
            return Ok(None);
        };
        if let Some(specialization) = &update.specialization {
            details.specialization = specialization.clone();
        }
        if let Some(name) = &update.name {
            record.user.name = name.clone();
        }
        Ok(state.find(id))
    }

    async fn list_patients(&self, provider_id: &UserId) -> Result<Vec<User>, UserRepositoryError> {
        let state = self.lock_users()?;
        Ok(state
            .roster(provider_id)
            .iter()
            .filter_map(|id| state.find(id))
            .collect())
    }

    async fn assign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError> {
        let mut state = self.lock_users()?;
        Ok(state.relink(patient_id, |edge| *edge = Some(*provider_id)))
    }

    async fn unassign_patient(
        &self,
        provider_id: &UserId,
        patient_id: &UserId,
    ) -> Result<AssignmentOutcome, UserRepositoryError> {
        let mut state = self.lock_users()?;
        Ok(state.relink(patient_id, |edge| {
            if edge.as_ref() == Some(provider_id) {
                *edge = None;
            }
        }))
    }
}

#[async_trait]
impl HealthMetricRepository for InMemoryStore {
    async fn insert(&self, metric: &HealthMetric) -> Result<(), HealthMetricRepositoryError> {
        let mut state = self.lock().map_err(HealthMetricRepositoryError::connection)?;
        state.metrics.push(metric.clone());
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &UserId,
        query: &MetricQuery,
    ) -> Result<Vec<HealthMetric>, HealthMetricRepositoryError> {
        let state = self.lock().map_err(HealthMetricRepositoryError::connection)?;
        let mut metrics: Vec<HealthMetric> = state
            .metrics
            .iter()
            .filter(|metric| metric.patient_id == *patient_id)
            .filter(|metric| query.metric_type.is_none_or(|kind| metric.metric_type == kind))
            .cloned()
            .collect();
        metrics.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        metrics.truncate(query.limit);
        Ok(metrics)
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn insert(&self, message: &Message) -> Result<(), MessageRepositoryError> {
        let mut state = self.lock().map_err(MessageRepositoryError::connection)?;
        state.messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let state = self.lock().map_err(MessageRepositoryError::connection)?;
        Ok(state.messages.get(id).cloned())
    }

    async fn list_for_participant(
        &self,
        user: &UserId,
    ) -> Result<Vec<Message>, MessageRepositoryError> {
        let state = self.lock().map_err(MessageRepositoryError::connection)?;
        let mut messages: Vec<Message> = state
            .messages
            .values()
            .filter(|message| message.involves(user))
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages)
    }

    async fn mark_read(&self, id: &MessageId) -> Result<Option<Message>, MessageRepositoryError> {
        let mut state = self.lock().map_err(MessageRepositoryError::connection)?;
        Ok(state.messages.get_mut(id).map(|message| {
            message.read = true;
            message.clone()
        }))
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, MessageRepositoryError> {
        let mut state = self.lock().map_err(MessageRepositoryError::connection)?;
        Ok(state.messages.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{MessageContent, MetricReading, MetricType, PersonName, Specialization};

    fn new_user(name: &str, profile: RegistrationProfile) -> NewUser {
        NewUser {
            id: UserId::random(),
            name: PersonName::new(name).expect("valid name"),
            email: Email::new(format!("{}@example.com", name.to_lowercase().replace(' ', ".")))
                .expect("valid email"),
            password_hash: PasswordHash::new("$argon2id$stub"),
            profile,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    fn patient_profile() -> RegistrationProfile {
        RegistrationProfile::Patient {
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date"),
        }
    }

    fn provider_profile() -> RegistrationProfile {
        RegistrationProfile::Provider {
            specialization: Specialization::new("Cardiology").expect("valid specialization"),
        }
    }

    struct Seeded {
        store: Arc<InMemoryStore>,
        alice: User,
        dr_bob: User,
        dr_eve: User,
    }

    #[fixture]
    async fn seeded() -> Seeded {
        let store = Arc::new(InMemoryStore::new());
        let alice = UserRepository::insert(store.as_ref(), &new_user("Alice", patient_profile()))
            .await
            .expect("alice stored");
        let dr_bob =
            UserRepository::insert(store.as_ref(), &new_user("Dr Bob", provider_profile()))
                .await
                .expect("dr bob stored");
        let dr_eve =
            UserRepository::insert(store.as_ref(), &new_user("Dr Eve", provider_profile()))
                .await
                .expect("dr eve stored");
        Seeded {
            store,
            alice,
            dr_bob,
            dr_eve,
        }
    }

    async fn reload(store: &InMemoryStore, id: &UserId) -> User {
        UserRepository::find_by_id(store, id)
            .await
            .expect("lookup succeeds")
            .expect("user exists")
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected(#[future] seeded: Seeded) {
        let seeded = seeded.await;
        let error = UserRepository::insert(seeded.store.as_ref(), &new_user("Alice", patient_profile()))
            .await
            .expect_err("duplicate email");
        assert!(matches!(error, UserRepositoryError::DuplicateEmail { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn assignment_updates_both_sides(#[future] seeded: Seeded) {
        let Seeded {
            store,
            alice,
            dr_bob,
            ..
        } = seeded.await;

        for _ in 0..2 {
            let outcome = store
                .assign_patient(&dr_bob.id, &alice.id)
                .await
                .expect("assign succeeds");
            assert!(matches!(outcome, AssignmentOutcome::Applied(_)));
        }

        let patient = reload(&store, &alice.id).await;
        let provider = reload(&store, &dr_bob.id).await;
        assert_eq!(patient.assigned_provider(), Some(&dr_bob.id));
        assert!(provider.has_patient(&alice.id));
        assert_eq!(
            store.list_patients(&dr_bob.id).await.expect("roster").len(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn reassignment_moves_the_edge(#[future] seeded: Seeded) {
        let Seeded {
            store,
            alice,
            dr_bob,
            dr_eve,
        } = seeded.await;
        store
            .assign_patient(&dr_bob.id, &alice.id)
            .await
            .expect("first assign");
        store
            .assign_patient(&dr_eve.id, &alice.id)
            .await
            .expect("second assign");

        assert!(!reload(&store, &dr_bob.id).await.has_patient(&alice.id));
        assert!(reload(&store, &dr_eve.id).await.has_patient(&alice.id));
    }

    #[rstest]
    #[tokio::test]
    async fn unassign_only_clears_own_edge(#[future] seeded: Seeded) {
        let Seeded {
            store,
            alice,
            dr_bob,
            dr_eve,
        } = seeded.await;
        store
            .assign_patient(&dr_bob.id, &alice.id)
            .await
            .expect("assign");

        store
            .unassign_patient(&dr_eve.id, &alice.id)
            .await
            .expect("foreign unassign is a no-op");
        assert_eq!(
            reload(&store, &alice.id).await.assigned_provider(),
            Some(&dr_bob.id)
        );

        store
            .unassign_patient(&dr_bob.id, &alice.id)
            .await
            .expect("unassign");
        assert!(reload(&store, &alice.id).await.assigned_provider().is_none());
        assert!(!reload(&store, &dr_bob.id).await.has_patient(&alice.id));
    }

    #[rstest]
    #[tokio::test]
    async fn assignment_rejects_missing_and_provider_targets(#[future] seeded: Seeded) {
        let Seeded {
            store,
            dr_bob,
            dr_eve,
            ..
        } = seeded.await;
        let missing = store
            .assign_patient(&dr_bob.id, &UserId::random())
            .await
            .expect("lookup succeeds");
        let provider = store
            .assign_patient(&dr_bob.id, &dr_eve.id)
            .await
            .expect("lookup succeeds");
        assert_eq!(missing, AssignmentOutcome::PatientNotFound);
        assert_eq!(provider, AssignmentOutcome::NotAPatient);
    }

    #[rstest]
    #[tokio::test]
    async fn metrics_are_filtered_newest_first_and_limited(#[future] seeded: Seeded) {
        let Seeded { store, alice, .. } = seeded.await;
        let base = Utc
            .with_ymd_and_hms(2026, 2, 1, 7, 0, 0)
            .single()
            .expect("valid timestamp");
        let readings = [
            (MetricType::Weight, 70.0),
            (MetricType::BloodSugar, 71.0),
            (MetricType::Weight, 72.0),
            (MetricType::BloodSugar, 73.0),
        ];
        for (hour, (kind, value)) in (0_i64..).zip(readings) {
            let metric = MetricReading::try_new(kind, value, "kg", None)
                .expect("valid reading")
                .into_metric(alice.id, base + Duration::hours(hour));
            HealthMetricRepository::insert(store.as_ref(), &metric)
                .await
                .expect("metric stored");
        }

        let weights = store
            .list_for_patient(
                &alice.id,
                &MetricQuery {
                    metric_type: Some(MetricType::Weight),
                    limit: 1,
                },
            )
            .await
            .expect("listed");

        assert_eq!(weights.len(), 1);
        let newest = weights.first().expect("one metric");
        assert_eq!(newest.timestamp, base + Duration::hours(2));
    }

    #[rstest]
    #[tokio::test]
    async fn message_lifecycle(#[future] seeded: Seeded) {
        let Seeded {
            store,
            alice,
            dr_bob,
            ..
        } = seeded.await;
        let message = Message::new(
            alice.id,
            dr_bob.id,
            MessageContent::new("hello").expect("valid content"),
            Utc::now(),
        );
        MessageRepository::insert(store.as_ref(), &message)
            .await
            .expect("stored");

        let read = store
            .mark_read(&message.id)
            .await
            .expect("update succeeds")
            .expect("message exists");
        assert!(read.read);
        assert_eq!(
            store
                .list_for_participant(&dr_bob.id)
                .await
                .expect("listed")
                .len(),
            1
        );
        assert!(store.delete(&message.id).await.expect("delete succeeds"));
        assert!(!store.delete(&message.id).await.expect("delete succeeds"));
        assert!(
            MessageRepository::find_by_id(store.as_ref(), &message.id)
                .await
                .expect("lookup")
                .is_none()
        );
    }
}
