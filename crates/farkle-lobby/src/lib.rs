//! Session registry and lobby actors for the Farkle engine.
//!
//! Each session runs as an isolated Tokio task (actor model) owning its
//! roster, host designation, and — once started — a
//! [`Game`](farkle_game::Game). Participant intents for one session are
//! drained from a single command channel, so no two intents for the same
//! session are ever applied concurrently and no locking is needed inside
//! a session. Sessions share no mutable state with each other.
//!
//! # Key types
//!
//! - [`LobbyRegistry`] — the process-wide map of session codes to live
//!   sessions; the only entry point for joins, leaves, and intent routing
//! - [`PlayerProfile`] / [`JoinReceipt`] — what a participant joins with
//!   and what a successful join tells them
//! - [`LobbyError`] — admission and routing failures

mod code;
mod error;
mod lobby;
mod registry;

pub use error::LobbyError;
pub use lobby::{EventSender, JoinReceipt, LobbyInfo, MAX_PLAYERS, MIN_PLAYERS, PlayerProfile};
pub use registry::{DiceFactory, LobbyRegistry};
