//! Timer-driven transmission loop.
//!
//! Every transmit command is armed on its own logical timer; all deadlines
//! feed a single `sleep_until` readiness wait, so the loop is one
//! cooperative task that only suspends between fires.

use nf_common::ForgeError;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::{debug, error};

use crate::command::TransmitCommand;

struct Armed {
    cmd: TransmitCommand,
    deadline: Instant,
    period: Option<Duration>,
    /// Sends left; `None` repeats forever.
    remaining: Option<u64>,
}

fn arm(cmd: TransmitCommand, now: Instant) -> Armed {
    if (0..=1).contains(&cmd.repeat) {
        // One shot, optionally delayed
        let delay = Duration::from_secs(cmd.timeout_secs.max(0) as u64);
        Armed {
            deadline: now + delay,
            period: None,
            remaining: Some(1),
            cmd,
        }
    } else {
        // First fire is immediate, then every timeout_secs
        let period = Duration::from_secs(cmd.timeout_secs.max(0) as u64);
        let remaining = if cmd.repeat < 0 {
            None
        } else {
            Some(cmd.repeat as u64)
        };
        Armed {
            deadline: now,
            period: Some(period),
            remaining,
            cmd,
        }
    }
}

/// Run every transmit command to completion. Exits when all commands are
/// retired; any send failure aborts the whole loop.
pub async fn run(commands: Vec<TransmitCommand>) -> Result<(), ForgeError> {
    let now = Instant::now();
    let mut armed: Vec<Armed> = commands.into_iter().map(|cmd| arm(cmd, now)).collect();

    while let Some(next) = armed.iter().map(|entry| entry.deadline).min() {
        sleep_until(next).await;
        let now = Instant::now();

        let mut i = 0;
        while i < armed.len() {
            if armed[i].deadline > now {
                i += 1;
                continue;
            }
            let entry = &mut armed[i];
            let frame = entry.cmd.packet.to_wire().map_err(|err| {
                error!(error = %err, "refusing to serialize packet");
                ForgeError::Invalid
            })?;
            if let Err(err) = entry.cmd.sender.transmit(&frame) {
                error!(
                    sender = %entry.cmd.sender,
                    error = %err,
                    "send failed, aborting transmission loop"
                );
                return Err(err);
            }
            debug!(sender = %entry.cmd.sender, len = frame.len(), "sent frame");

            if let Some(remaining) = entry.remaining.as_mut() {
                *remaining -= 1;
            }
            let retire = match (entry.remaining, entry.period) {
                (Some(0), _) | (_, None) => true,
                (_, Some(period)) => {
                    entry.deadline = now + period;
                    false
                }
            };
            if retire {
                armed.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
    Ok(())
}
