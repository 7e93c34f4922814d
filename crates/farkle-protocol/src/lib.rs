//! The contract between the Farkle engine and its synchronization layer.
//!
//! The engine exposes no wire format of its own; whatever transport the
//! surrounding application uses, it speaks to the engine in the types
//! defined here:
//!
//! - **Inbound** ([`Intent`]) — one closed variant per participant
//!   action. An unrecognized discriminant fails to deserialize, so
//!   unknown intents are rejected at the boundary.
//! - **Outbound** ([`ServerEvent`], [`SessionSnapshot`]) — the full
//!   session + turn view broadcast after every visible transition, plus
//!   targeted rejections and terminal teardown notices.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes at the boundary.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Die, GameMode, Intent, LobbyCode, PlayerId, PlayerSnapshot, ServerEvent, SessionSnapshot,
    TurnPhase, TurnSnapshot,
};
