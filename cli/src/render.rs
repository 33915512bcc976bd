//! Terminal rendering of session state

use otp_core::services::verification::{PostVerificationRoute, SessionSnapshot};
use otp_core::SessionStatus;
use otp_shared::phone::mask_phone_number;

/// One-line view of the code slots, e.g. `[4 8 _ _ _ _]`
pub fn render_digits(digits: &[Option<char>]) -> String {
    let slots: Vec<String> = digits
        .iter()
        .map(|slot| slot.map(String::from).unwrap_or_else(|| "_".to_string()))
        .collect();
    format!("[{}]", slots.join(" "))
}

/// Human readable session summary, possibly spanning several lines
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut lines = Vec::new();

    let resend = if snapshot.can_resend {
        "resend available".to_string()
    } else if snapshot.cooldown_seconds_remaining > 0 {
        format!("resend in {}s", snapshot.cooldown_seconds_remaining)
    } else {
        "resend unavailable".to_string()
    };

    lines.push(format!(
        "{}  {}  attempts left: {}  {}",
        render_digits(&snapshot.digits),
        status_label(snapshot.status),
        snapshot.remaining_attempts,
        resend
    ));

    if let Some(error) = &snapshot.last_error {
        lines.push(format!("  ! {}", error.message));
    }

    if snapshot.status == SessionStatus::Locked {
        lines.push("  Type `resend` to get a new code or `cancel` to stop.".to_string());
    }

    lines.join("\n")
}

/// What the host would navigate to after verification
pub fn describe_route(route: &PostVerificationRoute) -> String {
    match route {
        PostVerificationRoute::CompleteRegistration { phone_number, .. } => format!(
            "Phone {} verified. Continue to complete your registration.",
            mask_phone_number(phone_number)
        ),
        PostVerificationRoute::SetNewPassword { phone_number, .. } => format!(
            "Phone {} verified. Continue to choose a new password.",
            mask_phone_number(phone_number)
        ),
        PostVerificationRoute::PhoneChangeCompleted {
            phone_number,
            user_id,
        } => format!(
            "Account {} now uses phone {}.",
            user_id,
            mask_phone_number(phone_number)
        ),
    }
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::AwaitingInput => "enter code",
        SessionStatus::Verifying => "verifying...",
        SessionStatus::Verified => "verified",
        SessionStatus::ResendInFlight => "sending new code...",
        SessionStatus::Locked => "locked",
        SessionStatus::Aborted => "cancelled",
    }
}
