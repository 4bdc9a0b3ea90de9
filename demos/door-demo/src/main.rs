//! Timed Door Demo
//!
//! Walks a door through its states:
//! - closed after construction
//! - opened and closed again before the grace period ends
//! - opened and left open until the grace period is exceeded
//!
//! Usage: `door-demo [grace-period-seconds]` (default 5).
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::time::Duration;

use door_core::DoorError;
use door_runtime::{ArmedTimeout, TimedDoor};
use tracing_subscriber::EnvFilter;

const DEFAULT_GRACE_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let grace_secs = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_GRACE_SECS,
    };
    let grace_period = Duration::from_secs(grace_secs);

    println!("Creating a TimedDoor with {}s grace period...", grace_secs);
    let door = TimedDoor::new(grace_period);

    println!("Locking the door...");
    door.close();
    println!("Door is {}", door.state());

    // Round 1: close in time
    println!("Unlocking the door...");
    let armed = door.open();
    println!("Door is {}", door.state());
    tokio::time::sleep(grace_period / 2).await;
    println!("Locking the door before the grace period ends...");
    door.close();
    report(await_timeout(armed).await);

    // Round 2: overstay
    println!("Unlocking the door again...");
    let armed = door.open();
    println!("Door is {}", door.state());
    println!(
        "The timer will trigger after {:?} if the door remains open...",
        door.grace_period()
    );
    report(await_timeout(armed).await);

    println!(
        "Door is {} ({} violation(s) recorded)",
        door.state(),
        door.violation_count()
    );
    Ok(())
}

/// Wait for an armed timeout without blocking the runtime
async fn await_timeout(armed: ArmedTimeout) -> Result<(), DoorError> {
    tokio::task::spawn_blocking(move || armed.join())
        .await
        .map_err(|e| DoorError::TimerThread(e.to_string()))?
}

fn report(result: Result<(), DoorError>) {
    match result {
        Ok(()) => println!("Timer fired, door was closed: nothing to report"),
        Err(e) if e.is_violation() => println!("Exception caught: {}", e),
        Err(e) => tracing::error!(error = %e, "timer failed"),
    }
}
