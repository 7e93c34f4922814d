//! The session registry: code-addressed discovery and per-player routing.
//!
//! This is the only process-wide mutable structure in the engine. It is
//! an explicit object handed to whatever drives it — never a module-level
//! global — so tests (and multi-tenant hosts) can run independent
//! registries side by side.

use std::collections::HashMap;
use std::sync::Arc;

use farkle_game::{DiceSource, StdDice};
use farkle_protocol::{Intent, LobbyCode, PlayerId};

use crate::LobbyError;
use crate::code::random_code;
use crate::lobby::{
    EventSender, JoinReceipt, LeaveOutcome, LobbyHandle, LobbyInfo, PlayerProfile, spawn_lobby,
};

/// Builds one dice source per started session. Swap in a scripted factory
/// to make whole sessions deterministic.
pub type DiceFactory = Arc<dyn Fn() -> Box<dyn DiceSource> + Send + Sync>;

/// Default command channel size for lobby actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks all active sessions and which player is in which one.
pub struct LobbyRegistry {
    /// Active sessions, keyed by their shareable code.
    lobbies: HashMap<LobbyCode, LobbyHandle>,

    /// Maps each player to the session they're currently in.
    /// A player can be in at most ONE session at a time (key invariant).
    player_lobbies: HashMap<PlayerId, LobbyCode>,

    dice: DiceFactory,
}

impl LobbyRegistry {
    /// A registry whose sessions roll entropy-seeded dice.
    pub fn new() -> Self {
        Self::with_dice(Arc::new(|| Box::new(StdDice::new())))
    }

    /// A registry with a custom dice factory.
    pub fn with_dice(dice: DiceFactory) -> Self {
        Self {
            lobbies: HashMap::new(),
            player_lobbies: HashMap::new(),
            dice,
        }
    }

    /// Joins a session, creating it first when no code is given.
    ///
    /// With `code: None` a fresh session is allocated under a new unique
    /// code and the caller becomes its host. With a code, the session
    /// must exist, not be full, and not have started.
    pub async fn create_or_join(
        &mut self,
        player: PlayerId,
        profile: PlayerProfile,
        code: Option<LobbyCode>,
        sender: EventSender,
    ) -> Result<JoinReceipt, LobbyError> {
        if let Some(current) = self.player_lobbies.get(&player) {
            return Err(LobbyError::AlreadyJoined(player, current.clone()));
        }

        let code = match code {
            Some(code) => {
                if !self.lobbies.contains_key(&code) {
                    return Err(LobbyError::NotFound(code));
                }
                code
            }
            None => {
                let code = self.allocate_code();
                let handle = spawn_lobby(
                    code.clone(),
                    player,
                    (self.dice)(),
                    DEFAULT_CHANNEL_SIZE,
                );
                self.lobbies.insert(code.clone(), handle);
                tracing::info!(%code, host = %player, "session created");
                code
            }
        };

        let handle = self
            .lobbies
            .get(&code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;
        let receipt = handle.join(player, profile, sender).await?;
        self.player_lobbies.insert(player, code);
        Ok(receipt)
    }

    /// Routes a game intent to the player's session.
    ///
    /// Delivery errors surface here; rule violations come back to the
    /// acting player as `Rejected` events.
    pub async fn dispatch(
        &self,
        player: PlayerId,
        intent: Intent,
    ) -> Result<(), LobbyError> {
        let code = self
            .player_lobbies
            .get(&player)
            .ok_or(LobbyError::NotJoined(player))?;
        let handle = self
            .lobbies
            .get(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;
        handle.send_intent(player, intent).await
    }

    /// Removes the player from their session.
    ///
    /// If the session dissolves — its host left before it started, or it
    /// emptied out — the remaining players are unmapped and the session
    /// is destroyed.
    pub async fn leave(&mut self, player: PlayerId) -> Result<(), LobbyError> {
        let code = self
            .player_lobbies
            .get(&player)
            .cloned()
            .ok_or(LobbyError::NotJoined(player))?;

        let outcome = match self.lobbies.get(&code) {
            Some(handle) => handle.leave(player).await?,
            None => LeaveOutcome::Continues,
        };

        self.player_lobbies.remove(&player);
        if let LeaveOutcome::Dissolved { remaining } = outcome {
            for orphan in remaining {
                self.player_lobbies.remove(&orphan);
            }
            self.lobbies.remove(&code);
            tracing::info!(%code, "session destroyed");
        }
        Ok(())
    }

    /// Shuts down a session outright, unmapping all of its players.
    pub async fn destroy_session(&mut self, code: &LobbyCode) -> Result<(), LobbyError> {
        let handle = self
            .lobbies
            .remove(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;
        let _ = handle.shutdown().await;
        self.player_lobbies.retain(|_, c| c != code);
        tracing::info!(%code, "session destroyed");
        Ok(())
    }

    /// Metadata for one session.
    pub async fn session_info(&self, code: &LobbyCode) -> Result<LobbyInfo, LobbyError> {
        let handle = self
            .lobbies
            .get(code)
            .ok_or_else(|| LobbyError::NotFound(code.clone()))?;
        handle.get_info().await
    }

    /// The session a player is currently in, if any.
    pub fn session_of(&self, player: &PlayerId) -> Option<&LobbyCode> {
        self.player_lobbies.get(player)
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.lobbies.len()
    }

    /// A code no active session is using.
    fn allocate_code(&self) -> LobbyCode {
        let mut rng = rand::rng();
        loop {
            let code = random_code(&mut rng);
            if !self.lobbies.contains_key(&code) {
                return code;
            }
        }
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
