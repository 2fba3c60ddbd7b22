//! Translate parsed option sets into commands on the transmit/listen lists.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use nf_common::ForgeError;
use nf_engine::CommandLists;
use nf_net::{Sender, SenderRegistry};

use crate::cli::Cmd;
use crate::{hd, na, ra};

/// Append whatever `cmd` describes to the command lists. A failure leaves
/// the lists unchanged.
pub fn append(cmd: &Cmd, registry: &mut SenderRegistry, lists: &mut CommandLists) -> Result<()> {
    match cmd {
        Cmd::NeighborAdvert(opts) => na::append(opts, registry, lists)
            .context("could not create forged neighbor advert"),
        Cmd::RouterAdvert(opts) => {
            ra::append(opts, registry, lists).context("could not create forged router advert")
        }
        Cmd::Hd(opts) => hd::append(opts, lists).context("could not install hijack listener"),
    }
}

/// Resolve an interface to an open sender, turning the common failure modes
/// into actionable messages.
pub fn open_sender(registry: &mut SenderRegistry, name: &str) -> Result<Arc<Sender>> {
    registry.get_or_open(name).map_err(|err| match err {
        ForgeError::PermissionDenied => anyhow!(
            "{err} This program makes heavy use of raw sockets which require \
             uid=0 or CAP_NET_RAW."
        ),
        ForgeError::NoDevice => anyhow!("{err} Could not find the device \"{name}\""),
        other => anyhow!(other),
    })
}

/// Repeat counts follow the convention that -1 repeats forever; any other
/// negative value is a typo, not a request.
pub fn check_cadence(repeat: i64, timeout: i64) -> Result<()> {
    if repeat < -1 {
        bail!("repeat must be a positive count or exactly -1, got {repeat}");
    }
    if timeout < 0 {
        bail!("timeout must be a number of seconds, got {timeout}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_bounds() {
        assert!(check_cadence(0, 0).is_ok());
        assert!(check_cadence(-1, 10).is_ok());
        assert!(check_cadence(17, 1).is_ok());
        assert!(check_cadence(-2, 0).is_err());
        assert!(check_cadence(1, -1).is_err());
    }
}
