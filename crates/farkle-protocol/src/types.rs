//! Message and identity types shared by the engine and its callers.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique, connection-scoped identifier for a participant.
///
/// Newtype over `u64` so a player id can never be confused with a die id
/// or a score. `#[serde(transparent)]` keeps the wire form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short human-shareable session code, used by joining participants
/// instead of network addressing.
///
/// Codes are six uppercase alphanumeric characters. The constructor
/// normalizes case and surrounding whitespace so a code typed as
/// `" kx9q2f "` resolves the session created as `KX9Q2F`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyCode(String);

impl LobbyCode {
    /// Creates a code, uppercasing and trimming the input.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// The canonical (uppercase) form of the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LobbyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ---------------------------------------------------------------------------
// Game configuration
// ---------------------------------------------------------------------------

/// Win-condition preset, chosen by the host before start and fixed for
/// the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// First to 1000.
    Rush,
    /// First to 2000.
    #[default]
    Standard,
    /// First to 4000.
    Marathon,
}

impl GameMode {
    /// The total score a player must reach to win under this mode.
    pub fn winning_score(&self) -> u32 {
        match self {
            Self::Rush => 1000,
            Self::Standard => 2000,
            Self::Marathon => 4000,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rush => write!(f, "rush"),
            Self::Standard => write!(f, "standard"),
            Self::Marathon => write!(f, "marathon"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dice and turn views
// ---------------------------------------------------------------------------

/// One live die as participants see it.
///
/// Ids are small integers unique within the current roll (reallocated
/// fresh on every roll). `selected` is the participant's uncommitted
/// selection flag — it carries no score until a Keep commits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    pub id: u8,
    /// Face value in `1..=6`.
    pub face: u8,
    pub selected: bool,
}

/// The phase of the turn state machine.
///
/// A session that has not started yet has no turn at all
/// ([`SessionSnapshot::turn`] is `None`), so "not started" needs no
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The active player may roll (or bank what the turn has earned).
    PlayerTurn,
    /// A roll is on the table awaiting selection.
    DiceRolled,
    /// The last roll had no scoring dice; awaiting acknowledgement.
    Farkled,
    /// A player reached the winning score. Terminal.
    GameOver,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerTurn => write!(f, "PlayerTurn"),
            Self::DiceRolled => write!(f, "DiceRolled"),
            Self::Farkled => write!(f, "Farkled"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One roster entry in a session snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub nickname: String,
    pub avatar: String,
    /// Banked total score.
    pub score: u32,
}

/// The live turn as broadcast to every participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub active_player: PlayerId,
    /// Dice on the table, available for selection.
    pub dice: Vec<Die>,
    /// Dice already committed toward the turn score.
    pub kept: Vec<Die>,
    /// Accumulated score of committed batches this turn.
    pub turn_score: u32,
    pub phase: TurnPhase,
}

/// The full session + turn view, broadcast after any transition that
/// changes visible state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub code: LobbyCode,
    pub host: PlayerId,
    /// Roster in turn-rotation order.
    pub players: Vec<PlayerSnapshot>,
    pub mode: GameMode,
    pub started: bool,
    /// `None` until the host starts the session.
    pub turn: Option<TurnSnapshot>,
    pub winner: Option<PlayerId>,
}

// ---------------------------------------------------------------------------
// Intents (inbound)
// ---------------------------------------------------------------------------

/// A participant action, as delivered by the synchronization layer.
///
/// This is a closed tagged union: one variant per action kind, with a
/// strongly-typed payload. Internally tagged JSON
/// (`{ "type": "Select", "die": 3 }`) so clients never build positional
/// payloads, and an unknown `type` fails to deserialize outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intent {
    /// Join the session identified by `code`, or create a fresh session
    /// (becoming its host) when `code` is omitted.
    Join {
        nickname: String,
        avatar: String,
        #[serde(default)]
        code: Option<LobbyCode>,
    },

    /// Host only: lock the roster and begin play under the given mode.
    Start { mode: GameMode },

    /// Roll the dice not yet kept this turn.
    Roll,

    /// Toggle one live die's selection flag.
    Select { die: u8 },

    /// Commit the current selection toward the turn score.
    Keep,

    /// Bank the turn's score (plus any uncommitted selection) and end
    /// the turn.
    Bank,

    /// Concede a farkled roll and pass the turn on.
    AcknowledgeFarkle,

    /// Leave the session.
    Leave,
}

// ---------------------------------------------------------------------------
// Server events (outbound)
// ---------------------------------------------------------------------------

/// An engine-originated message for the synchronization layer to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Full state view; broadcast to every session participant.
    Snapshot { session: SessionSnapshot },

    /// An intent was rejected with no state change; delivered to the
    /// violating participant only, never broadcast.
    Rejected { message: String },

    /// The session was torn down; terminal notice to remaining
    /// participants.
    SessionClosed { reason: String },
}

// =========================================================================
// Tests
// =========================================================================
