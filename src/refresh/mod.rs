//! Coordinated credential refresh.
//!
//! At most one refresh episode runs at a time. The first caller to hit an
//! authorization failure leads the episode and performs the single exchange;
//! everyone arriving while it runs parks on a [`Waiter`] and receives the
//! leader's outcome verbatim.

pub mod coordinator;
pub mod exchange;

pub use coordinator::{Episode, RefreshCoordinator, RefreshOutcome, Ticket, Waiter};
pub use exchange::{HttpRefresher, TokenRefresher};
