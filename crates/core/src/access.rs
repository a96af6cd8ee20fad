//! Access gate decision vocabulary.
//!
//! Policy denials are first-class outcomes the hosting application must
//! branch on, not errors. Each denial carries a machine-readable reason
//! code so the caller can present the right remediation step.

use serde::Serialize;

/// Machine-readable reason a device was denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// No active binding exists; the caller should register this device.
    DeviceNotRegistered,
    /// The account has been blocked by remediation; not user-actionable.
    AccountBlocked,
}

impl DenialReason {
    /// The wire code for this reason.
    pub fn as_code(self) -> &'static str {
        match self {
            DenialReason::DeviceNotRegistered => "DEVICE_NOT_REGISTERED",
            DenialReason::AccountBlocked => "ACCOUNT_BLOCKED",
        }
    }

    /// The remediation message shown to the end user.
    pub fn user_message(self) -> &'static str {
        match self {
            DenialReason::DeviceNotRegistered => {
                "This device is not registered for this content. Register it to continue."
            }
            DenialReason::AccountBlocked => {
                "This account has been blocked. Contact support."
            }
        }
    }
}

/// Outcome of an access gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }

    /// The denial reason, if any.
    pub fn reason(self) -> Option<DenialReason> {
        match self {
            AccessDecision::Allowed => None,
            AccessDecision::Denied(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(
            DenialReason::DeviceNotRegistered.as_code(),
            "DEVICE_NOT_REGISTERED"
        );
        assert_eq!(DenialReason::AccountBlocked.as_code(), "ACCOUNT_BLOCKED");
    }

    #[test]
    fn only_registration_denial_is_user_actionable() {
        assert!(DenialReason::DeviceNotRegistered
            .user_message()
            .contains("Register"));
        assert!(DenialReason::AccountBlocked
            .user_message()
            .contains("support"));
    }

    #[test]
    fn decision_accessors() {
        assert!(AccessDecision::Allowed.is_allowed());
        assert_eq!(AccessDecision::Allowed.reason(), None);

        let denied = AccessDecision::Denied(DenialReason::AccountBlocked);
        assert!(!denied.is_allowed());
        assert_eq!(denied.reason(), Some(DenialReason::AccountBlocked));
    }
}
