//! Post-verification routing over a channel

use tokio::sync::mpsc;
use tracing::{info, warn};

use otp_core::services::verification::{PostVerificationRoute, RoutingResolver, VerificationReceipt};
use otp_shared::phone::mask_phone_number;

/// Forwards each verified session's route to the host
///
/// The resolver runs inside the session machine's event handler, so it only
/// enqueues; the host performs the navigation when it drains the receiver.
#[derive(Debug, Clone)]
pub struct ChannelRoutingResolver {
    sender: mpsc::UnboundedSender<PostVerificationRoute>,
}

impl ChannelRoutingResolver {
    /// Create a resolver and the receiver its routes arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PostVerificationRoute>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl RoutingResolver for ChannelRoutingResolver {
    fn resolve(&self, receipt: &VerificationReceipt) {
        let route = PostVerificationRoute::from(receipt);
        info!(
            phone = %mask_phone_number(&receipt.phone_number),
            purpose = %receipt.purpose,
            event = "otp_routed",
            "Routing verified session"
        );

        if self.sender.send(route).is_err() {
            warn!(
                purpose = %receipt.purpose,
                "Route receiver dropped; verified session was not routed"
            );
        }
    }
}
