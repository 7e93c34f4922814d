//! The per-turn record.

use farkle_protocol::{Die, PlayerId, TurnPhase, TurnSnapshot};

use crate::dice::DICE_PER_TURN;

/// One player's turn: the live roll, the kept pile, and the accumulated
/// turn score.
///
/// A `Turn` belongs to exactly one game and is replaced wholesale at the
/// start of each player's turn — it is never partially carried across a
/// turn boundary. `score` only ever reflects committed (kept) batches,
/// never an uncommitted selection.
#[derive(Debug, Clone)]
pub struct Turn {
    pub active_player: PlayerId,
    /// Dice on the table, available for selection.
    pub dice: Vec<Die>,
    /// Dice committed toward `score` this turn.
    pub kept: Vec<Die>,
    pub score: u32,
    pub phase: TurnPhase,
}

impl Turn {
    /// A fresh turn for `active_player`: no dice out, nothing kept,
    /// waiting on the first roll.
    pub fn new(active_player: PlayerId) -> Self {
        Self {
            active_player,
            dice: Vec::new(),
            kept: Vec::new(),
            score: 0,
            phase: TurnPhase::PlayerTurn,
        }
    }

    /// How many dice the next roll puts on the table.
    pub fn dice_to_roll(&self) -> usize {
        DICE_PER_TURN - self.kept.len()
    }

    /// Faces of the currently selected live dice.
    pub fn selected_faces(&self) -> Vec<u8> {
        self.dice
            .iter()
            .filter(|die| die.selected)
            .map(|die| die.face)
            .collect()
    }

    pub(crate) fn die_mut(&mut self, id: u8) -> Option<&mut Die> {
        self.dice.iter_mut().find(|die| die.id == id)
    }

    /// The wire view of this turn.
    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            active_player: self.active_player,
            dice: self.dice.clone(),
            kept: self.kept.clone(),
            turn_score: self.score,
            phase: self.phase,
        }
    }
}
