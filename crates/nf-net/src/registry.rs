use std::sync::Arc;

use nf_common::ForgeError;
use tracing::debug;

use crate::sender::Sender;

/// All senders opened so far, at most one per interface, kept sorted by
/// interface index. Senders own their socket for the registry's lifetime.
#[derive(Default)]
pub struct SenderRegistry {
    senders: Vec<Arc<Sender>>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sender for `name`, opening a socket on first use.
    pub fn get_or_open(&mut self, name: &str) -> Result<Arc<Sender>, ForgeError> {
        if let Some(sender) = self.senders.iter().find(|s| s.name() == name) {
            return Ok(sender.clone());
        }
        let sender = Arc::new(Sender::open(name)?);
        debug!(sender = %sender, "opened raw link socket");
        self.insert(sender.clone());
        Ok(sender)
    }

    /// Insert keeping the index order; a handle with a duplicate index
    /// replaces the previous one.
    pub fn insert(&mut self, sender: Arc<Sender>) {
        match self
            .senders
            .binary_search_by_key(&sender.index(), |s| s.index())
        {
            Ok(pos) => self.senders[pos] = sender,
            Err(pos) => self.senders.insert(pos, sender),
        }
    }

    pub fn by_index(&self, index: u32) -> Option<Arc<Sender>> {
        self.senders
            .binary_search_by_key(&index, |s| s.index())
            .ok()
            .map(|pos| self.senders[pos].clone())
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
