//! Die-face generation.

use std::collections::VecDeque;

use farkle_protocol::Die;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Every turn plays with six dice.
pub const DICE_PER_TURN: usize = 6;

/// Source of die faces for the roll pipeline.
///
/// The engine rolls through this trait so live sessions draw from a PRNG
/// while tests and replays script the exact faces a scenario needs.
pub trait DiceSource: Send + 'static {
    /// Produces `count` faces, each in `1..=6`.
    fn faces(&mut self, count: usize) -> Vec<u8>;
}

/// PRNG-backed source used by live sessions.
pub struct StdDice {
    rng: StdRng,
}

impl StdDice {
    /// A source seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A source with a fixed seed, for reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for StdDice {
    fn faces(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.rng.random_range(1..=6)).collect()
    }
}

/// Yields faces from a fixed queue, in order. A drained script yields
/// ones.
pub struct ScriptedDice {
    queue: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            queue: faces.into_iter().collect(),
        }
    }
}

impl DiceSource for ScriptedDice {
    fn faces(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.queue.pop_front().unwrap_or(1)).collect()
    }
}

/// Builds the on-table dice for a fresh roll: ids `0..count`, unselected.
pub(crate) fn table_dice(faces: Vec<u8>) -> Vec<Die> {
    faces
        .into_iter()
        .enumerate()
        .map(|(id, face)| Die {
            id: id as u8,
            face,
            selected: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dice_faces_stay_in_range() {
        let mut dice = StdDice::seeded(7);
        for face in dice.faces(1000) {
            assert!((1..=6).contains(&face), "face {face} out of range");
        }
    }

    #[test]
    fn test_std_dice_same_seed_same_faces() {
        let mut a = StdDice::seeded(42);
        let mut b = StdDice::seeded(42);
        assert_eq!(a.faces(12), b.faces(12));
    }

    #[test]
    fn test_scripted_dice_yields_queue_in_order() {
        let mut dice = ScriptedDice::new([3, 1, 4]);
        assert_eq!(dice.faces(2), vec![3, 1]);
        assert_eq!(dice.faces(2), vec![4, 1]); // drained script yields ones
    }

    #[test]
    fn test_table_dice_assigns_fresh_small_ids() {
        let dice = table_dice(vec![6, 2, 5]);
        assert_eq!(dice.len(), 3);
        assert_eq!(dice[0], Die { id: 0, face: 6, selected: false });
        assert_eq!(dice[2], Die { id: 2, face: 5, selected: false });
    }
}
