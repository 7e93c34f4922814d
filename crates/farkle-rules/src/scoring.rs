//! Selection scoring: maps a multiset of die faces to a point value.

/// Per-face occurrence counts, indexed by face value (index 0 unused).
pub(crate) fn face_counts(faces: &[u8]) -> [u8; 7] {
    let mut counts = [0u8; 7];
    for &face in faces {
        counts[face as usize] += 1;
    }
    counts
}

/// Six dice covering every face exactly once.
pub(crate) fn is_full_straight(counts: &[u8; 7], len: usize) -> bool {
    len == 6 && (1..=6).all(|f| counts[f] == 1)
}

/// Five dice forming 1-2-3-4-5.
pub(crate) fn is_low_straight(counts: &[u8; 7], len: usize) -> bool {
    len == 5 && (1..=5).all(|f| counts[f] == 1)
}

/// Five dice forming 2-3-4-5-6.
pub(crate) fn is_high_straight(counts: &[u8; 7], len: usize) -> bool {
    len == 5 && (2..=6).all(|f| counts[f] == 1)
}

/// Scores a selection of die faces.
///
/// Combination checks run in priority order: a full straight (1500), then
/// a partial straight (500 for 1-5, 750 for 2-6), then three-or-more of a
/// kind per face (ones base 1000, other faces `face × 100`, doubling for
/// each die past the third), then leftover single 1s (100) and 5s (50).
///
/// If any die in the selection is consumed by none of the rules, the whole
/// selection is worth 0 — there is no partial credit for a selection that
/// mixes scoring and dead dice.
pub fn selection_score(faces: &[u8]) -> u32 {
    if faces.is_empty() {
        return 0;
    }

    let mut counts = face_counts(faces);

    // Straights take priority over any multiple counting.
    if is_full_straight(&counts, faces.len()) {
        return 1500;
    }
    if is_low_straight(&counts, faces.len()) {
        return 500;
    }
    if is_high_straight(&counts, faces.len()) {
        return 750;
    }

    let mut score = 0u32;
    let mut consumed = 0usize;

    for face in 1..=6u32 {
        let count = counts[face as usize];
        if count >= 3 {
            let base = if face == 1 { 1000 } else { face * 100 };
            // 3-of-a-kind scores the base, each extra die doubles it.
            score += base << (count - 3);
            consumed += count as usize;
            counts[face as usize] = 0;
        }
    }

    score += u32::from(counts[1]) * 100;
    consumed += counts[1] as usize;
    score += u32::from(counts[5]) * 50;
    consumed += counts[5] as usize;

    if consumed != faces.len() {
        return 0;
    }
    score
}

/// Reports whether a particular face, in the context of the whole roll it
/// came from, belongs to at least one scoring combination.
///
/// A lone 2, 3, 4, or 6 is only live when the rest of the roll supplies a
/// triple or a straight around it, so the predicate takes the full roll,
/// not just the candidate die.
pub fn is_scoring_face(face: u8, roll: &[u8]) -> bool {
    if face == 1 || face == 5 {
        return true;
    }

    let counts = face_counts(roll);
    if counts[face as usize] >= 3 {
        return true;
    }

    if is_full_straight(&counts, roll.len()) {
        return true;
    }
    if is_low_straight(&counts, roll.len()) && (1..=5).contains(&face) {
        return true;
    }
    if is_high_straight(&counts, roll.len()) && (2..=6).contains(&face) {
        return true;
    }

    false
}

// =========================================================================
// Tests
// =========================================================================
