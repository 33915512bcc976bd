//! Integration tests for running an OTP session inside an async host loop

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    use otp_core::errors::GatewayError;
    use otp_core::services::verification::{
        CooldownTicker, GatewayResponse, OtpSessionConfig, OtpSessionMachine,
        PostVerificationRoute, ResendRequest, RoutingResolver, SessionEvent, VerificationGateway,
        VerificationReceipt, VerificationRequest,
    };
    use otp_core::{SessionStatus, VerificationTarget};

    // Gateway that takes a while to answer and accepts a single code
    struct SlowGateway {
        expected_code: String,
        latency: Duration,
        verify_calls: AtomicUsize,
    }

    impl SlowGateway {
        fn new(expected_code: &str) -> Self {
            Self {
                expected_code: expected_code.to_string(),
                latency: Duration::from_secs(3),
                verify_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VerificationGateway for SlowGateway {
        async fn submit_verification(
            &self,
            request: &VerificationRequest,
        ) -> Result<GatewayResponse, GatewayError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            if request.code == self.expected_code {
                Ok(GatewayResponse::accepted("Verified"))
            } else {
                Ok(GatewayResponse::rejected("Invalid verification code"))
            }
        }

        async fn request_resend(
            &self,
            _request: &ResendRequest,
        ) -> Result<GatewayResponse, GatewayError> {
            tokio::time::sleep(self.latency).await;
            Ok(GatewayResponse::accepted("Verification code sent"))
        }
    }

    // Resolver that records the route it was asked to take
    #[derive(Default)]
    struct RouteRecorder {
        routes: Mutex<Vec<PostVerificationRoute>>,
    }

    impl RoutingResolver for RouteRecorder {
        fn resolve(&self, receipt: &VerificationReceipt) {
            self.routes
                .lock()
                .unwrap()
                .push(PostVerificationRoute::from(receipt));
        }
    }

    /// Runs the session until it reaches a terminal state, spawning every
    /// gateway call so input and ticks keep flowing while it is in flight
    async fn run_host_loop(
        machine: &mut OtpSessionMachine<SlowGateway, RouteRecorder>,
        tx: mpsc::UnboundedSender<SessionEvent>,
        mut rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Vec<JoinHandle<()>> {
        let mut ticker = CooldownTicker::from_config(machine.config());
        let mut in_flight = Vec::new();

        loop {
            let event = tokio::select! {
                Some(event) = rx.recv() => event,
                tick = ticker.next_tick() => tick,
            };

            if let Some(command) = machine.handle(event) {
                let completion = machine.dispatch(command);
                let tx = tx.clone();
                in_flight.push(tokio::spawn(async move {
                    let _ = tx.send(completion.await);
                }));
            }

            if machine.status().is_terminal() {
                return in_flight;
            }
        }
    }

    fn open_session(
        target: VerificationTarget,
    ) -> (
        OtpSessionMachine<SlowGateway, RouteRecorder>,
        Arc<SlowGateway>,
        Arc<RouteRecorder>,
    ) {
        let gateway = Arc::new(SlowGateway::new("482913"));
        let resolver = Arc::new(RouteRecorder::default());
        let machine = OtpSessionMachine::new(
            gateway.clone(),
            resolver.clone(),
            OtpSessionConfig::default(),
            target,
        )
        .unwrap();
        (machine, gateway, resolver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_loop_keeps_ticking_while_verifying() {
        let (mut machine, gateway, resolver) =
            open_session(VerificationTarget::password_reset("0712345678"));
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(SessionEvent::PasteIngested {
            text: "Your code is 482913".to_string(),
        })
        .unwrap();
        // Autofill firing twice must not produce a second call
        tx.send(SessionEvent::PasteIngested {
            text: "482913".to_string(),
        })
        .unwrap();

        run_host_loop(&mut machine, tx, rx).await;

        assert_eq!(machine.status(), SessionStatus::Verified);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);
        assert!(machine.session().cooldown_seconds_remaining() <= 58);

        let routes = resolver.routes.lock().unwrap();
        assert_eq!(
            routes.as_slice(),
            &[PostVerificationRoute::SetNewPassword {
                phone_number: "0712345678".to_string(),
                code: "482913".to_string(),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_verifying_drops_result() {
        let (mut machine, gateway, resolver) =
            open_session(VerificationTarget::phone_change("+254712345678", "user-42"));
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(SessionEvent::PasteIngested {
            text: "482913".to_string(),
        })
        .unwrap();
        tx.send(SessionEvent::Cancel).unwrap();

        let (late_tx, mut late_rx) = mpsc::unbounded_channel();
        let handles = run_host_loop(&mut machine, late_tx, rx).await;
        assert_eq!(machine.status(), SessionStatus::Aborted);

        for handle in handles {
            handle.await.unwrap();
        }
        while let Ok(event) = late_rx.try_recv() {
            assert!(machine.handle(event).is_none());
        }

        assert_eq!(machine.status(), SessionStatus::Aborted);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);
        assert!(resolver.routes.lock().unwrap().is_empty());
        drop(tx);
    }
}
