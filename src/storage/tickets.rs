//! Ticket store access for the `tickets` scan mode.
//!
//! Only read access is needed: the scanner asks for the addresses of every
//! ticket that is still open and rescans them.

use crate::error::{StorageError, StorageResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    Open,
    Closed,
}

/// A previously reported abuse case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    /// Address the ticket was raised for. Not validated here.
    pub ip: String,
    pub status: TicketStatus,
}

impl Ticket {
    pub fn is_open(&self) -> bool {
        self.status == TicketStatus::Open
    }
}

/// Source of open tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All tickets whose status is `OPEN`.
    async fn open_tickets(&self) -> StorageResult<Vec<Ticket>>;
}

/// Ticket store backed by a JSON export (an array of tickets).
pub struct JsonTicketStore {
    path: PathBuf,
}

impl JsonTicketStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every ticket in the export, whatever its status.
    pub async fn load_all(&self) -> StorageResult<Vec<Ticket>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorageError::LoadFailed(format!("{}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| StorageError::InvalidFormat(e.to_string()))
    }
}

#[async_trait]
impl TicketStore for JsonTicketStore {
    async fn open_tickets(&self) -> StorageResult<Vec<Ticket>> {
        let tickets: Vec<Ticket> = self
            .load_all()
            .await?
            .into_iter()
            .filter(Ticket::is_open)
            .collect();

        tracing::debug!(
            path = %self.path.display(),
            open = tickets.len(),
            "loaded open tickets"
        );

        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_only_open_tickets_returned() {
        let file = write_export(
            r#"[
                {"id": 1, "ip": "198.51.100.7", "status": "OPEN"},
                {"id": 2, "ip": "198.51.100.8", "status": "CLOSED"},
                {"id": 3, "ip": "203.0.113.9", "status": "OPEN"}
            ]"#,
        );

        let store = JsonTicketStore::new(file.path());
        let open = store.open_tickets().await.unwrap();
        let ips: Vec<&str> = open.iter().map(|t| t.ip.as_str()).collect();
        assert_eq!(ips, vec!["198.51.100.7", "203.0.113.9"]);
        assert_eq!(store.load_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let store = JsonTicketStore::new("/nonexistent/tickets.json");
        let result = store.open_tickets().await;
        assert!(matches!(result, Err(StorageError::LoadFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_status() {
        let file = write_export(r#"[{"id": 1, "ip": "198.51.100.7", "status": "PENDING"}]"#);
        let result = JsonTicketStore::new(file.path()).open_tickets().await;
        assert!(matches!(result, Err(StorageError::InvalidFormat(_))));
    }
}
