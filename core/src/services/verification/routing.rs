//! Where a verified session leads next

use serde::{Deserialize, Serialize};

use crate::domain::entities::VerificationPurpose;

use super::types::VerificationReceipt;

/// Next screen after a successful verification, keyed by purpose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum PostVerificationRoute {
    /// Finish creating the account
    CompleteRegistration {
        phone_number: String,
        user_id: Option<String>,
    },
    /// Choose a new password; the verified code authorizes the change
    SetNewPassword { phone_number: String, code: String },
    /// The account now uses the new number
    PhoneChangeCompleted { phone_number: String, user_id: String },
}

impl PostVerificationRoute {
    pub fn purpose(&self) -> VerificationPurpose {
        match self {
            PostVerificationRoute::CompleteRegistration { .. } => VerificationPurpose::Registration,
            PostVerificationRoute::SetNewPassword { .. } => VerificationPurpose::PasswordReset,
            PostVerificationRoute::PhoneChangeCompleted { .. } => VerificationPurpose::PhoneChange,
        }
    }

    pub fn phone_number(&self) -> &str {
        match self {
            PostVerificationRoute::CompleteRegistration { phone_number, .. }
            | PostVerificationRoute::SetNewPassword { phone_number, .. }
            | PostVerificationRoute::PhoneChangeCompleted { phone_number, .. } => phone_number,
        }
    }
}

impl From<&VerificationReceipt> for PostVerificationRoute {
    fn from(receipt: &VerificationReceipt) -> Self {
        match receipt.purpose {
            VerificationPurpose::Registration => PostVerificationRoute::CompleteRegistration {
                phone_number: receipt.phone_number.clone(),
                user_id: receipt.user_id.clone(),
            },
            VerificationPurpose::PasswordReset => PostVerificationRoute::SetNewPassword {
                phone_number: receipt.phone_number.clone(),
                code: receipt.code.clone(),
            },
            // Sessions for this purpose cannot be opened without a user id
            VerificationPurpose::PhoneChange => PostVerificationRoute::PhoneChangeCompleted {
                phone_number: receipt.phone_number.clone(),
                user_id: receipt.user_id.clone().unwrap_or_default(),
            },
        }
    }
}
