use chrono::{DateTime, Utc};

use crate::transport::ClientError;

/// A dismissible error advisory.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub diagnostic: String,
    pub raised_at: DateTime<Utc>,
}

/// Running list of open advisories. Any number may be open at once; each is
/// closed on its own.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: u64,
    open: Vec<Notification>,
}

impl NotificationCenter {
    pub fn push(&mut self, error: &ClientError) -> u64 {
        self.next_id = self.next_id.wrapping_add(1);
        let id = self.next_id;
        self.open.push(Notification {
            id,
            message: error.to_string(),
            diagnostic: error.diagnostic().to_string(),
            raised_at: Utc::now(),
        });
        id
    }

    /// Close one advisory. Returns `false` if it was already closed.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.open.len();
        self.open.retain(|n| n.id != id);
        self.open.len() != before
    }

    pub fn open(&self) -> &[Notification] {
        &self.open
    }
}
