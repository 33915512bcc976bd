//! otp-verify - terminal host for OTP phone verification
//!
//! Plays the part of the mobile verification screen: reads digits and
//! commands from stdin, ticks the resend cooldown, runs gateway calls in the
//! background, and prints where the user goes once verified.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use otp_core::services::verification::{
    CooldownTicker, OtpSessionConfig, OtpSessionMachine, SessionEvent, SessionSnapshot,
};
use otp_core::{SessionStatus, VerificationPurpose, VerificationTarget};
use otp_infra::{create_gateway, ChannelRoutingResolver};
use otp_shared::phone::{mask_phone_number, normalize_phone_number};
use otp_shared::{init_tracing, AppConfig, Environment};

mod input;
mod render;

use input::{parse_line, HostCommand, InputError, HELP};
use render::{describe_route, render_snapshot};

/// otp-verify - verify a phone number with a one-time code
#[derive(Parser, Debug)]
#[command(name = "otp-verify")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Phone number the code was sent to (local 07xxxxxxxx or E.164)
    #[arg(long)]
    phone: String,

    /// Why the number is being verified (registration, password-reset, phone-change)
    #[arg(long, default_value = "registration")]
    purpose: VerificationPurpose,

    /// Account id, required for phone-change
    #[arg(long)]
    user_id: Option<String>,

    /// Print session snapshots as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment-specific file first, then a plain .env
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        provider = ?config.gateway.provider,
        "Starting OTP verification host"
    );

    run(cli, config).await
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let target = VerificationTarget {
        phone_number: normalize_phone_number(&cli.phone),
        purpose: cli.purpose,
        user_id: cli.user_id,
    };
    let session_config = OtpSessionConfig::from(&config.otp);

    let gateway = Arc::new(
        create_gateway(&config.gateway, session_config.code_length)
            .context("Failed to create verification gateway")?,
    );
    let (resolver, mut routes) = ChannelRoutingResolver::new();

    // With no real backend, stand in for the SMS that would carry the code
    if let Some(mock) = gateway.as_mock() {
        let code = mock.issue_code(&target.phone_number).await;
        println!(
            "[mock] Code sent to {}: {}",
            mask_phone_number(&target.phone_number),
            code
        );
    }

    let mut machine = OtpSessionMachine::new(
        gateway.clone(),
        Arc::new(resolver),
        session_config,
        target,
    )
    .context("Failed to open verification session")?;

    let (completion_tx, mut completions) = mpsc::unbounded_channel::<SessionEvent>();
    let mut ticker = CooldownTicker::from_config(machine.config());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    print_snapshot(&machine.snapshot(), cli.json)?;

    loop {
        let event = tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read input")? {
                    Some(line) => match parse_line(&line) {
                        Ok(HostCommand::Event(event)) => event,
                        Ok(HostCommand::Status) => {
                            print_snapshot(&machine.snapshot(), cli.json)?;
                            continue;
                        }
                        Ok(HostCommand::Help) => {
                            println!("{}", HELP);
                            continue;
                        }
                        Err(InputError::Empty) => continue,
                        Err(e) => {
                            println!("  ! {}", e);
                            continue;
                        }
                    },
                    // Closing stdin abandons the session
                    None => SessionEvent::Cancel,
                }
            }
            Some(completion) = completions.recv() => completion,
            tick = ticker.next_tick() => tick,
        };

        let is_tick = matches!(event, SessionEvent::CooldownTick);
        let is_resend_completion = matches!(event, SessionEvent::ResendCompleted { .. });
        let cooldown_before = machine.session().cooldown_seconds_remaining();

        if let Some(command) = machine.handle(event) {
            let completion = machine.dispatch(command);
            let tx = completion_tx.clone();
            tokio::spawn(async move {
                // The receiver only goes away once the session is over
                let _ = tx.send(completion.await);
            });
        }

        if is_resend_completion && machine.status() == SessionStatus::AwaitingInput {
            if let Some(mock) = gateway.as_mock() {
                if let Some(code) = mock.issued_code(machine.session().phone_number()).await {
                    println!("[mock] New code: {}", code);
                }
            }
        }

        // Ticks only matter to the user when the resend control becomes available
        let cooldown_finished =
            cooldown_before > 0 && machine.session().cooldown_seconds_remaining() == 0;
        if !is_tick || cooldown_finished {
            print_snapshot(&machine.snapshot(), cli.json)?;
        }

        if machine.status().is_terminal() {
            break;
        }
    }

    match machine.status() {
        SessionStatus::Verified => {
            if let Ok(route) = routes.try_recv() {
                println!("{}", describe_route(&route));
            }
        }
        _ => println!("Verification cancelled."),
    }

    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(snapshot).context("Failed to serialize session")?;
        println!("{}", line);
    } else {
        println!("{}", render_snapshot(snapshot));
    }
    Ok(())
}
