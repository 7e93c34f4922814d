//! The turn state machine for one started session.

use farkle_protocol::{GameMode, PlayerId, TurnPhase, TurnSnapshot};
use farkle_rules::{is_farkle, selection_score};

use crate::GameError;
use crate::dice::{DICE_PER_TURN, DiceSource, table_dice};
use crate::turn::Turn;

/// One roster entry: identity plus banked total.
#[derive(Debug, Clone)]
pub struct Seat {
    pub id: PlayerId,
    pub score: u32,
}

/// What a roster removal left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Play continues with the shrunk roster.
    Continues,
    /// No players remain; the session should be torn down.
    Empty,
}

/// One session's live game.
///
/// Owns the ordered roster (rotation order, fixed at start), the current
/// [`Turn`], and the dice source. All transitions validate that the actor
/// is the active player and that the phase admits the action before any
/// state changes; a failed guard returns an error and mutates nothing.
pub struct Game {
    seats: Vec<Seat>,
    mode: GameMode,
    turn: Turn,
    winner: Option<PlayerId>,
    dice: Box<dyn DiceSource>,
}

impl Game {
    /// Starts a game over the given roster, pointed at roster index 0.
    ///
    /// The caller (the lobby) guarantees at least two players.
    pub fn new(roster: &[PlayerId], mode: GameMode, dice: Box<dyn DiceSource>) -> Self {
        let seats = roster.iter().map(|&id| Seat { id, score: 0 }).collect();
        Self {
            seats,
            mode,
            turn: Turn::new(roster[0]),
            winner: None,
            dice,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Roster in rotation order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Banked total for one player.
    pub fn score_of(&self, player: PlayerId) -> Option<u32> {
        self.seats.iter().find(|s| s.id == player).map(|s| s.score)
    }

    /// The wire view of the current turn.
    pub fn turn_snapshot(&self) -> TurnSnapshot {
        self.turn.snapshot()
    }

    // -- Transitions --------------------------------------------------------

    /// Rolls every die not yet kept this turn and runs farkle detection
    /// on the result before it is exposed for selection.
    pub fn roll(&mut self, actor: PlayerId) -> Result<(), GameError> {
        self.require_active(actor)?;
        self.require_phase(TurnPhase::PlayerTurn)?;

        let faces = self.dice.faces(self.turn.dice_to_roll());
        let farkled = is_farkle(&faces);
        self.turn.dice = table_dice(faces);

        if farkled {
            // The dead roll stays visible; everything earned this turn is gone.
            self.turn.score = 0;
            self.turn.kept.clear();
            self.turn.phase = TurnPhase::Farkled;
            tracing::debug!(player = %actor, "roll farkled");
        } else {
            self.turn.phase = TurnPhase::DiceRolled;
        }
        Ok(())
    }

    /// Toggles one live die's selection flag. Carries no score until a
    /// keep commits the selection.
    pub fn toggle_select(&mut self, actor: PlayerId, die: u8) -> Result<(), GameError> {
        self.require_active(actor)?;
        self.require_phase(TurnPhase::DiceRolled)?;

        let die = self.turn.die_mut(die).ok_or(GameError::UnknownDie(die))?;
        die.selected = !die.selected;
        Ok(())
    }

    /// Commits the current selection: moves it to the kept pile, adds its
    /// score to the turn score, and clears the rest of the roll.
    ///
    /// A selection that scores zero — including one mixing scoring and
    /// dead dice — is rejected whole.
    pub fn keep(&mut self, actor: PlayerId) -> Result<(), GameError> {
        self.require_active(actor)?;
        self.require_phase(TurnPhase::DiceRolled)?;

        let score = selection_score(&self.turn.selected_faces());
        if score == 0 {
            return Err(GameError::WorthlessSelection);
        }

        for mut die in std::mem::take(&mut self.turn.dice) {
            if die.selected {
                die.selected = false;
                self.turn.kept.push(die);
            }
        }
        self.turn.score += score;

        if self.turn.kept.len() == DICE_PER_TURN {
            // Hot dice: all six committed — fresh full roll, score carried.
            self.turn.kept.clear();
            tracing::debug!(player = %actor, score = self.turn.score, "hot dice");
        }
        self.turn.phase = TurnPhase::PlayerTurn;
        Ok(())
    }

    /// Banks the turn score — plus the score of any currently selected,
    /// not-yet-kept dice — into the actor's total, then either ends the
    /// game or hands the turn to the next seat.
    pub fn bank(&mut self, actor: PlayerId) -> Result<(), GameError> {
        self.require_active(actor)?;

        let pending = match self.turn.phase {
            TurnPhase::PlayerTurn => 0,
            // Banking straight off a roll includes the uncommitted selection.
            TurnPhase::DiceRolled => selection_score(&self.turn.selected_faces()),
            phase => return Err(GameError::WrongPhase(phase)),
        };
        let total = self.turn.score + pending;
        if total == 0 {
            return Err(GameError::NothingToBank);
        }

        let winning_score = self.mode.winning_score();
        let seat = self
            .seats
            .iter_mut()
            .find(|s| s.id == actor)
            .ok_or(GameError::UnknownPlayer(actor))?;
        seat.score += total;
        let banked_total = seat.score;
        tracing::info!(player = %actor, banked = total, total = banked_total, "score banked");

        if banked_total >= winning_score {
            self.winner = Some(actor);
            self.turn.phase = TurnPhase::GameOver;
            tracing::info!(player = %actor, total = banked_total, "game over");
        } else {
            self.advance_turn();
        }
        Ok(())
    }

    /// Concedes a farkled roll: advances rotation exactly like a bank,
    /// but with no score credit. Only reachable immediately after a
    /// farkled roll.
    pub fn acknowledge_farkle(&mut self, actor: PlayerId) -> Result<(), GameError> {
        self.require_active(actor)?;
        self.require_phase(TurnPhase::Farkled)?;
        self.advance_turn();
        Ok(())
    }

    /// Removes a player from the roster.
    ///
    /// If it was the departing player's turn, the departed slot index —
    /// modulo the shrunk roster — addresses the successor, and a fresh
    /// turn starts with no score credit.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<Removal, GameError> {
        let idx = self
            .seats
            .iter()
            .position(|s| s.id == player)
            .ok_or(GameError::UnknownPlayer(player))?;
        let was_active = self.turn.active_player == player;
        self.seats.remove(idx);

        if self.seats.is_empty() {
            return Ok(Removal::Empty);
        }
        if was_active && self.winner.is_none() {
            let next = self.seats[idx % self.seats.len()].id;
            self.turn = Turn::new(next);
            tracing::info!(player = %player, next = %next, "active player left, turn advanced");
        }
        Ok(Removal::Continues)
    }

    // -- Internals ----------------------------------------------------------

    fn require_active(&self, actor: PlayerId) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if actor != self.turn.active_player {
            return Err(GameError::OutOfTurn(actor));
        }
        Ok(())
    }

    fn require_phase(&self, phase: TurnPhase) -> Result<(), GameError> {
        if self.turn.phase != phase {
            return Err(GameError::WrongPhase(self.turn.phase));
        }
        Ok(())
    }

    /// Hands the turn to the next seat in roster order.
    fn advance_turn(&mut self) {
        let next = self.next_seat(self.turn.active_player);
        self.turn = Turn::new(next);
        tracing::debug!(player = %next, "turn advanced");
    }

    /// Round-robin successor of `player`, recomputed from identity so a
    /// roster change can never leave the index pointing past the end.
    fn next_seat(&self, player: PlayerId) -> PlayerId {
        match self.seats.iter().position(|s| s.id == player) {
            Some(idx) => self.seats[(idx + 1) % self.seats.len()].id,
            // The active player is always seated; removals re-target the
            // turn before rotation runs again.
            None => self.seats[0].id,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    /// A two-player game fed from a scripted face queue.
    fn game(faces: &[u8]) -> Game {
        Game::new(
            &[pid(1), pid(2)],
            GameMode::Standard,
            Box::new(ScriptedDice::new(faces.to_vec())),
        )
    }

    /// Selects the dice with the given ids (phase must be DiceRolled).
    fn select(game: &mut Game, actor: PlayerId, ids: &[u8]) {
        for &id in ids {
            game.toggle_select(actor, id).expect("select should succeed");
        }
    }

    // =====================================================================
    // roll()
    // =====================================================================

    #[test]
    fn test_roll_puts_six_dice_on_the_table() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();

        let turn = g.turn_snapshot();
        assert_eq!(turn.phase, TurnPhase::DiceRolled);
        assert_eq!(turn.dice.len(), 6);
        assert!(turn.kept.is_empty());
    }

    #[test]
    fn test_roll_out_of_turn_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        let result = g.roll(pid(2));
        assert!(matches!(result, Err(GameError::OutOfTurn(p)) if p == pid(2)));
        assert_eq!(g.phase(), TurnPhase::PlayerTurn);
    }

    #[test]
    fn test_roll_twice_without_keep_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        let result = g.roll(pid(1));
        assert!(matches!(
            result,
            Err(GameError::WrongPhase(TurnPhase::DiceRolled))
        ));
    }

    #[test]
    fn test_roll_farkle_discards_turn_score_and_kept_dice() {
        // Keep 1+5 (150), then the four remaining dice come up dead.
        let mut g = game(&[1, 5, 2, 3, 4, 6, 2, 3, 4, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1]);
        g.keep(pid(1)).unwrap();
        assert_eq!(g.turn_snapshot().turn_score, 150);

        g.roll(pid(1)).unwrap();

        let turn = g.turn_snapshot();
        assert_eq!(turn.phase, TurnPhase::Farkled);
        assert_eq!(turn.turn_score, 0);
        assert!(turn.kept.is_empty());
        assert_eq!(turn.dice.len(), 4, "the dead roll stays visible");
    }

    #[test]
    fn test_roll_size_is_dice_not_yet_kept() {
        let mut g = game(&[1, 5, 2, 3, 4, 6, 1, 1, 1, 5]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1]);
        g.keep(pid(1)).unwrap();

        g.roll(pid(1)).unwrap();
        assert_eq!(g.turn_snapshot().dice.len(), 4);
    }

    // =====================================================================
    // toggle_select()
    // =====================================================================

    #[test]
    fn test_toggle_select_flips_the_flag_both_ways() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();

        g.toggle_select(pid(1), 0).unwrap();
        assert!(g.turn_snapshot().dice[0].selected);
        g.toggle_select(pid(1), 0).unwrap();
        assert!(!g.turn_snapshot().dice[0].selected);
    }

    #[test]
    fn test_toggle_select_does_not_change_turn_score() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        g.toggle_select(pid(1), 0).unwrap();
        assert_eq!(g.turn_snapshot().turn_score, 0);
    }

    #[test]
    fn test_toggle_select_unknown_die_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        let result = g.toggle_select(pid(1), 9);
        assert!(matches!(result, Err(GameError::UnknownDie(9))));
    }

    #[test]
    fn test_toggle_select_before_rolling_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        let result = g.toggle_select(pid(1), 0);
        assert!(matches!(
            result,
            Err(GameError::WrongPhase(TurnPhase::PlayerTurn))
        ));
    }

    // =====================================================================
    // keep()
    // =====================================================================

    #[test]
    fn test_keep_commits_selection_and_clears_the_rest() {
        let mut g = game(&[1, 5, 2, 3, 4, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1]);

        g.keep(pid(1)).unwrap();

        let turn = g.turn_snapshot();
        assert_eq!(turn.phase, TurnPhase::PlayerTurn);
        assert_eq!(turn.turn_score, 150);
        assert_eq!(turn.kept.len(), 2);
        assert!(turn.kept.iter().all(|d| !d.selected));
        assert!(turn.dice.is_empty());
    }

    #[test]
    fn test_keep_worthless_selection_is_rejected_without_state_change() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[1]); // a lone 2 scores nothing

        let result = g.keep(pid(1));

        assert!(matches!(result, Err(GameError::WorthlessSelection)));
        let turn = g.turn_snapshot();
        assert_eq!(turn.phase, TurnPhase::DiceRolled);
        assert_eq!(turn.dice.len(), 6);
        assert!(turn.dice[1].selected, "selection is left for correction");
    }

    #[test]
    fn test_keep_mixed_selection_is_rejected_whole() {
        let mut g = game(&[1, 1, 1, 2, 3, 4]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1, 2, 3]); // triple ones plus a dead 2

        let result = g.keep(pid(1));
        assert!(matches!(result, Err(GameError::WorthlessSelection)));
    }

    #[test]
    fn test_keep_with_nothing_selected_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        let result = g.keep(pid(1));
        assert!(matches!(result, Err(GameError::WorthlessSelection)));
    }

    #[test]
    fn test_keep_all_six_triggers_hot_dice() {
        let mut g = game(&[1, 1, 1, 5, 5, 5]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1, 2, 3, 4, 5]);

        g.keep(pid(1)).unwrap();

        let turn = g.turn_snapshot();
        assert_eq!(turn.turn_score, 1500);
        assert!(turn.kept.is_empty(), "kept pile resets on hot dice");
        assert_eq!(turn.phase, TurnPhase::PlayerTurn);
        // The next roll is a fresh full six.
        g.roll(pid(1)).unwrap();
        assert_eq!(g.turn_snapshot().dice.len(), 6);
    }

    // =====================================================================
    // bank()
    // =====================================================================

    #[test]
    fn test_bank_with_nothing_earned_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        let result = g.bank(pid(1));
        assert!(matches!(result, Err(GameError::NothingToBank)));
    }

    #[test]
    fn test_bank_after_keep_credits_total_and_rotates() {
        let mut g = game(&[1, 5, 2, 3, 4, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1]);
        g.keep(pid(1)).unwrap();

        g.bank(pid(1)).unwrap();

        assert_eq!(g.score_of(pid(1)), Some(150));
        assert_eq!(g.active_player(), pid(2));
        let turn = g.turn_snapshot();
        assert_eq!(turn.phase, TurnPhase::PlayerTurn);
        assert_eq!(turn.turn_score, 0);
        assert!(turn.kept.is_empty());
    }

    #[test]
    fn test_bank_from_rolled_phase_includes_uncommitted_selection() {
        // Keep 1 (100), roll again, select the 5, bank without keeping.
        let mut g = game(&[1, 2, 3, 4, 4, 6, 5, 2, 3, 6, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0]);
        g.keep(pid(1)).unwrap();
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0]);

        g.bank(pid(1)).unwrap();

        assert_eq!(g.score_of(pid(1)), Some(150));
    }

    #[test]
    fn test_bank_from_rolled_phase_with_worthless_selection_and_no_score() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[1]); // lone 2 adds nothing

        let result = g.bank(pid(1));
        assert!(matches!(result, Err(GameError::NothingToBank)));
    }

    #[test]
    fn test_bank_reaching_winning_score_ends_the_game() {
        let mut g = Game::new(
            &[pid(1), pid(2)],
            GameMode::Rush,
            Box::new(ScriptedDice::new([1, 1, 1, 1, 2, 3])),
        );
        g.roll(pid(1)).unwrap();
        select(&mut g, pid(1), &[0, 1, 2, 3]); // four ones: 2000
        g.keep(pid(1)).unwrap();

        g.bank(pid(1)).unwrap();

        assert_eq!(g.mode(), GameMode::Rush);
        assert_eq!(g.winner(), Some(pid(1)));
        assert!(g.is_over());
        assert_eq!(g.phase(), TurnPhase::GameOver);
        // Terminal: nobody can act anymore.
        assert!(matches!(g.roll(pid(2)), Err(GameError::GameOver)));
        assert!(matches!(g.bank(pid(1)), Err(GameError::GameOver)));
    }

    #[test]
    fn test_bank_while_farkled_is_rejected() {
        let mut g = game(&[2, 3, 4, 6, 2, 3]);
        g.roll(pid(1)).unwrap();
        assert_eq!(g.phase(), TurnPhase::Farkled);
        let result = g.bank(pid(1));
        assert!(matches!(
            result,
            Err(GameError::WrongPhase(TurnPhase::Farkled))
        ));
    }

    // =====================================================================
    // acknowledge_farkle()
    // =====================================================================

    #[test]
    fn test_acknowledge_farkle_passes_the_turn() {
        let mut g = game(&[2, 3, 4, 6, 2, 3]);
        g.roll(pid(1)).unwrap();

        g.acknowledge_farkle(pid(1)).unwrap();

        assert_eq!(g.active_player(), pid(2));
        assert_eq!(g.phase(), TurnPhase::PlayerTurn);
        assert_eq!(g.score_of(pid(1)), Some(0));
    }

    #[test]
    fn test_acknowledge_farkle_outside_farkled_phase_is_rejected() {
        let mut g = game(&[1, 2, 3, 4, 4, 6]);
        let result = g.acknowledge_farkle(pid(1));
        assert!(matches!(
            result,
            Err(GameError::WrongPhase(TurnPhase::PlayerTurn))
        ));
    }

    // =====================================================================
    // Rotation and roster changes
    // =====================================================================

    #[test]
    fn test_rotation_wraps_around_the_roster() {
        let mut g = Game::new(
            &[pid(1), pid(2), pid(3)],
            GameMode::Standard,
            Box::new(ScriptedDice::new([
                2, 3, 4, 6, 2, 3, // P1 farkles
                2, 3, 4, 6, 2, 3, // P2 farkles
                2, 3, 4, 6, 2, 3, // P3 farkles
            ])),
        );
        for player in [1, 2, 3] {
            assert_eq!(g.active_player(), pid(player));
            g.roll(pid(player)).unwrap();
            g.acknowledge_farkle(pid(player)).unwrap();
        }
        assert_eq!(g.active_player(), pid(1));
    }

    #[test]
    fn test_remove_active_player_advances_by_slot_index() {
        let mut g = Game::new(
            &[pid(1), pid(2), pid(3)],
            GameMode::Standard,
            Box::new(ScriptedDice::new([1, 2, 3, 4, 4, 6])),
        );
        g.roll(pid(1)).unwrap();

        let removal = g.remove_player(pid(1)).unwrap();

        assert_eq!(removal, Removal::Continues);
        assert_eq!(g.active_player(), pid(2));
        assert_eq!(g.phase(), TurnPhase::PlayerTurn, "fresh turn, no credit");
        assert_eq!(g.seats().len(), 2);
    }

    #[test]
    fn test_remove_last_slot_active_player_wraps_to_first() {
        let mut g = Game::new(
            &[pid(1), pid(2), pid(3)],
            GameMode::Standard,
            Box::new(ScriptedDice::new([
                2, 3, 4, 6, 2, 3, // P1 farkles
                2, 3, 4, 6, 2, 3, // P2 farkles
            ])),
        );
        g.roll(pid(1)).unwrap();
        g.acknowledge_farkle(pid(1)).unwrap();
        g.roll(pid(2)).unwrap();
        g.acknowledge_farkle(pid(2)).unwrap();
        assert_eq!(g.active_player(), pid(3));

        g.remove_player(pid(3)).unwrap();

        // Slot 2 modulo the two remaining seats wraps to slot 0.
        assert_eq!(g.active_player(), pid(1));
    }

    #[test]
    fn test_remove_inactive_player_keeps_the_turn_in_place() {
        let mut g = Game::new(
            &[pid(1), pid(2), pid(3)],
            GameMode::Standard,
            Box::new(ScriptedDice::new([1, 2, 3, 4, 4, 6])),
        );
        g.roll(pid(1)).unwrap();

        g.remove_player(pid(3)).unwrap();

        assert_eq!(g.active_player(), pid(1));
        assert_eq!(g.phase(), TurnPhase::DiceRolled, "turn in flight survives");
    }

    #[test]
    fn test_remove_everyone_reports_empty() {
        let mut g = game(&[]);
        assert_eq!(g.remove_player(pid(1)).unwrap(), Removal::Continues);
        assert_eq!(g.remove_player(pid(2)).unwrap(), Removal::Empty);
    }

    #[test]
    fn test_remove_unknown_player_is_rejected() {
        let mut g = game(&[]);
        let result = g.remove_player(pid(9));
        assert!(matches!(result, Err(GameError::UnknownPlayer(p)) if p == pid(9)));
    }
}
