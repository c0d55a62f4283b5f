//! Access & relationship policy.
//!
//! Pure decision functions over the patient/provider relationship graph.
//! Services load the current users, ask the policy, and translate
//! [`AccessDecision::Deny`] into a forbidden error. Nothing here touches a
//! store, so every rule is testable in isolation.
//!
//! The graph has one edge per assigned patient (`provider_id`). A provider's
//! `patients` set is derived from those edges, so consulting either side
//! yields the same answer.

use super::{Caller, Error, Message, Role, User, UserId, UserProfile};

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AccessDecision {
    /// The action may proceed.
    Allow,
    /// The action is not permitted.
    Deny,
}

impl AccessDecision {
    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }

    /// Whether the decision permits the action.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert a denial into a forbidden error carrying `reason`.
    ///
    /// # Examples
    /// ```
    /// use careline::domain::{AccessDecision, ErrorCode};
    ///
    /// assert!(AccessDecision::Allow.require("nope").is_ok());
    /// let err = AccessDecision::Deny.require("nope").unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require(self, reason: &str) -> Result<(), Error> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny => Err(Error::forbidden(reason)),
        }
    }
}

/// Mutations a participant may attempt on an existing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// Flag the message as read.
    MarkRead,
    /// Remove the message.
    Delete,
}

/// Roster changes and listings: only the provider named in the route, acting
/// as themselves.
pub fn can_manage_roster(caller: &Caller, provider_id: &UserId) -> AccessDecision {
    AccessDecision::from_bool(caller.role == Role::Provider && caller.id == *provider_id)
}

/// Profile updates: only the owner, and only through the endpoint for their
/// own role.
pub fn can_update_profile(caller: &Caller, target: &UserId, role: Role) -> AccessDecision {
    AccessDecision::from_bool(caller.id == *target && caller.role == role)
}

/// Metric reads: the patient themselves, or the provider the patient is
/// assigned to.
///
/// Decided from the caller's side of the edge so a missing patient is
/// indistinguishable from an unassigned one.
pub fn can_view_metrics(caller: &User, patient_id: &UserId) -> AccessDecision {
    AccessDecision::from_bool(caller.id == *patient_id || caller.has_patient(patient_id))
}

/// Metric writes: a patient recording for themselves.
pub fn can_record_metric(caller: &Caller, patient_id: &UserId) -> AccessDecision {
    AccessDecision::from_bool(caller.role == Role::Patient && caller.id == *patient_id)
}

/// Messaging is limited to an assigned patient/provider pair, in either
/// direction.
pub fn can_send_message(sender: &User, receiver: &User) -> AccessDecision {
    let allowed = match (&sender.profile, &receiver.profile) {
        (UserProfile::Patient(patient), UserProfile::Provider(_)) => {
            patient.provider_id == Some(receiver.id)
        }
        (UserProfile::Provider(_), UserProfile::Patient(patient)) => {
            patient.provider_id == Some(sender.id)
        }
        _ => false,
    };
    AccessDecision::from_bool(allowed)
}

/// Only the receiver marks a message read; either participant may delete it.
pub fn can_mutate_message(
    caller: &UserId,
    message: &Message,
    action: MessageAction,
) -> AccessDecision {
    let allowed = match action {
        MessageAction::MarkRead => message.receiver_id == *caller,
        MessageAction::Delete => message.involves(caller),
    };
    AccessDecision::from_bool(allowed)
}

/// Profile reads.
///
/// Everyone may read their own profile. Any provider may read any patient
/// profile. A provider profile is readable by that provider's assigned
/// patients.
pub fn can_view_profile(viewer: &User, target: &User) -> AccessDecision {
    if viewer.id == target.id {
        return AccessDecision::Allow;
    }
    let allowed = match &target.profile {
        UserProfile::Patient(_) => viewer.is_provider(),
        UserProfile::Provider(_) => viewer.assigned_provider() == Some(&target.id),
    };
    AccessDecision::from_bool(allowed)
}
