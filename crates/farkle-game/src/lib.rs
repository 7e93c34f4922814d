//! One session's live Farkle game.
//!
//! [`Game`] owns the ordered roster, the current [`Turn`], and the dice
//! source, and exposes the only legal transitions between turn phases:
//! roll, select, keep, bank, and farkle acknowledgement. Every transition
//! is a synchronous, non-blocking method that validates its guards and
//! either applies the change atomically or returns a [`GameError`] with
//! state untouched.
//!
//! # Key types
//!
//! - [`Game`] — the turn state machine for one started session
//! - [`Turn`] — the per-turn record, replaced wholesale at turn boundaries
//! - [`DiceSource`] — where die faces come from ([`StdDice`] for live
//!   play, [`ScriptedDice`] for tests and replays)

mod dice;
mod error;
mod game;
mod turn;

pub use dice::{DICE_PER_TURN, DiceSource, ScriptedDice, StdDice};
pub use error::GameError;
pub use game::{Game, Removal, Seat};
pub use turn::Turn;
