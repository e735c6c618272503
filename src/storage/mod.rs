//! Ticket storage access.
//!
//! Provides the read-only ticket store used by the `tickets` scan mode.

mod tickets;

pub use tickets::{JsonTicketStore, Ticket, TicketStatus, TicketStore};
