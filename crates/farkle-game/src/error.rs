//! Error types for the turn state machine.

use farkle_protocol::{PlayerId, TurnPhase};

/// A rejected game transition. The triggering intent leaves state
/// unchanged; nothing is retried or corrected by the engine.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The actor is not the active player.
    #[error("player {0} acted out of turn")]
    OutOfTurn(PlayerId),

    /// The transition is not admissible in the current phase.
    #[error("action not allowed in phase {0}")]
    WrongPhase(TurnPhase),

    /// No die with this id is on the table.
    #[error("no die {0} in the current roll")]
    UnknownDie(u8),

    /// Keep was attempted on a selection with no scoring combination.
    #[error("selection scores nothing")]
    WorthlessSelection,

    /// Bank was attempted with neither turn score nor a scoring selection.
    #[error("nothing to bank")]
    NothingToBank,

    /// The game has already been won.
    #[error("the game is over")]
    GameOver,

    /// The player is not seated at this game.
    #[error("player {0} is not seated at this game")]
    UnknownPlayer(PlayerId),
}
