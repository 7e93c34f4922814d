//! Error types for the session registry.

use farkle_protocol::{LobbyCode, PlayerId};

/// Admission and routing failures. These are returned synchronously to
/// the requesting participant and never change session state.
///
/// Rule violations inside a started game are not represented here — the
/// lobby reports those back to the violating participant as
/// [`ServerEvent::Rejected`](farkle_protocol::ServerEvent) events.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// No active session has this code.
    #[error("session {0} not found")]
    NotFound(LobbyCode),

    /// The session already seats the maximum number of players.
    #[error("session {0} is full")]
    Full(LobbyCode),

    /// The session's game is already in progress.
    #[error("session {0} already started")]
    AlreadyStarted(LobbyCode),

    /// The player is already in a session.
    #[error("player {0} is already in session {1}")]
    AlreadyJoined(PlayerId, LobbyCode),

    /// The player is not in any session.
    #[error("player {0} is not in any session")]
    NotJoined(PlayerId),

    /// The session's command channel is closed or full.
    #[error("session {0} is unavailable")]
    Unavailable(LobbyCode),
}
