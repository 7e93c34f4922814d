//! Session code generation.

use farkle_protocol::LobbyCode;
use rand::Rng;

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One random six-character code. Uniqueness among active sessions is the
/// registry's job (it re-rolls on collision).
pub(crate) fn random_code(rng: &mut impl Rng) -> LobbyCode {
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    LobbyCode::new(code)
}
