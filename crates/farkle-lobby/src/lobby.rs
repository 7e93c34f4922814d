//! Lobby actor: an isolated Tokio task that owns one session.
//!
//! Each session runs in its own task, communicating with the registry
//! through an mpsc channel. Intents are applied strictly in arrival
//! order; guard evaluation and state mutation happen atomically inside
//! one synchronous `Game` call, so the session needs no locks.

use std::collections::HashMap;

use farkle_game::{DiceSource, Game, Removal};
use farkle_protocol::{
    GameMode, Intent, LobbyCode, PlayerId, PlayerSnapshot, ServerEvent, SessionSnapshot,
};
use tokio::sync::{mpsc, oneshot};

use crate::LobbyError;

/// Minimum roster size required to start a session.
pub const MIN_PLAYERS: usize = 2;

/// Maximum roster size of any session.
pub const MAX_PLAYERS: usize = 4;

/// Channel for delivering engine events to one participant's connection
/// handler.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// The presentation profile a participant joins with. Opaque to the
/// engine; echoed back in snapshots for clients to render.
#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub nickname: String,
    pub avatar: String,
}

/// What a successful join tells the caller.
#[derive(Debug, Clone)]
pub struct JoinReceipt {
    pub code: LobbyCode,
    pub is_host: bool,
}

/// Metadata about one session (not the game view).
#[derive(Debug, Clone)]
pub struct LobbyInfo {
    pub code: LobbyCode,
    pub host: PlayerId,
    pub player_count: usize,
    pub started: bool,
}

/// What a leave left behind; the registry uses this for its bookkeeping.
pub(crate) enum LeaveOutcome {
    /// The session continues; only the leaver needs unmapping.
    Continues,
    /// The session dissolved; these players were still in it when it did.
    Dissolved { remaining: Vec<PlayerId> },
}

/// Commands sent to a lobby actor through its channel.
pub(crate) enum LobbyCommand {
    Join {
        player: PlayerId,
        profile: PlayerProfile,
        sender: EventSender,
        reply: oneshot::Sender<Result<JoinReceipt, LobbyError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<LeaveOutcome, LobbyError>>,
    },
    /// A participant intent. Fire-and-forget: rule violations go back to
    /// the violating participant as `Rejected` events, never to the
    /// caller.
    Intent { actor: PlayerId, intent: Intent },
    GetInfo {
        reply: oneshot::Sender<LobbyInfo>,
    },
    Shutdown,
}

/// Handle to a running lobby actor. Cheap to clone; the registry holds
/// one per session.
#[derive(Clone)]
pub(crate) struct LobbyHandle {
    code: LobbyCode,
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    pub(crate) async fn join(
        &self,
        player: PlayerId,
        profile: PlayerProfile,
        sender: EventSender,
    ) -> Result<JoinReceipt, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Join {
                player,
                profile,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?
    }

    pub(crate) async fn leave(
        &self,
        player: PlayerId,
    ) -> Result<LeaveOutcome, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Leave {
                player,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?
    }

    pub(crate) async fn send_intent(
        &self,
        actor: PlayerId,
        intent: Intent,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Intent { actor, intent })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }

    pub(crate) async fn get_info(&self) -> Result<LobbyInfo, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }

    pub(crate) async fn shutdown(&self) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| LobbyError::Unavailable(self.code.clone()))
    }
}

/// The internal lobby actor state. Runs inside a Tokio task.
struct LobbyActor {
    code: LobbyCode,
    host: PlayerId,
    /// Roster in join order — which is also turn-rotation order at start.
    seats: Vec<(PlayerId, PlayerProfile)>,
    senders: HashMap<PlayerId, EventSender>,
    mode: GameMode,
    game: Option<Game>,
    /// Consumed when the game starts.
    dice: Option<Box<dyn DiceSource>>,
    receiver: mpsc::Receiver<LobbyCommand>,
    /// Set on teardown; ends the actor loop.
    dissolved: bool,
}

impl LobbyActor {
    async fn run(mut self) {
        tracing::info!(code = %self.code, "lobby started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Join {
                    player,
                    profile,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, profile, sender);
                    let _ = reply.send(result);
                }
                LobbyCommand::Leave { player, reply } => {
                    let result = self.handle_leave(player);
                    let _ = reply.send(result);
                    if self.dissolved {
                        break;
                    }
                }
                LobbyCommand::Intent { actor, intent } => {
                    self.handle_intent(actor, intent);
                }
                LobbyCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                LobbyCommand::Shutdown => {
                    tracing::info!(code = %self.code, "lobby shutting down");
                    break;
                }
            }
        }

        tracing::info!(code = %self.code, "lobby stopped");
    }

    fn handle_join(
        &mut self,
        player: PlayerId,
        profile: PlayerProfile,
        sender: EventSender,
    ) -> Result<JoinReceipt, LobbyError> {
        if self.game.is_some() {
            return Err(LobbyError::AlreadyStarted(self.code.clone()));
        }
        if self.seats.iter().any(|(id, _)| *id == player) {
            return Err(LobbyError::AlreadyJoined(player, self.code.clone()));
        }
        if self.seats.len() >= MAX_PLAYERS {
            return Err(LobbyError::Full(self.code.clone()));
        }

        self.seats.push((player, profile));
        self.senders.insert(player, sender);
        tracing::info!(
            code = %self.code,
            %player,
            players = self.seats.len(),
            "player joined"
        );

        self.broadcast_snapshot();

        Ok(JoinReceipt {
            code: self.code.clone(),
            is_host: player == self.host,
        })
    }

    fn handle_leave(&mut self, player: PlayerId) -> Result<LeaveOutcome, LobbyError> {
        let Some(idx) = self.seats.iter().position(|(id, _)| *id == player) else {
            return Err(LobbyError::NotJoined(player));
        };
        self.seats.remove(idx);
        self.senders.remove(&player);
        tracing::info!(
            code = %self.code,
            %player,
            players = self.seats.len(),
            "player left"
        );

        // An unresolved session dies with its host.
        if self.game.is_none() && player == self.host {
            let remaining: Vec<PlayerId> =
                self.seats.iter().map(|(id, _)| *id).collect();
            self.broadcast(ServerEvent::SessionClosed {
                reason: "the host left the session".into(),
            });
            self.dissolved = true;
            tracing::info!(code = %self.code, "host left, session dissolved");
            return Ok(LeaveOutcome::Dissolved { remaining });
        }

        if let Some(game) = &mut self.game {
            if matches!(game.remove_player(player), Ok(Removal::Empty)) {
                self.dissolved = true;
                return Ok(LeaveOutcome::Dissolved {
                    remaining: Vec::new(),
                });
            }
        }
        if self.seats.is_empty() {
            self.dissolved = true;
            return Ok(LeaveOutcome::Dissolved {
                remaining: Vec::new(),
            });
        }

        self.broadcast_snapshot();
        Ok(LeaveOutcome::Continues)
    }

    fn handle_intent(&mut self, actor: PlayerId, intent: Intent) {
        if !self.senders.contains_key(&actor) {
            tracing::warn!(
                code = %self.code,
                %actor,
                "intent from non-member, ignoring"
            );
            return;
        }

        match intent {
            Intent::Join { .. } | Intent::Leave => {
                // Membership changes go through the registry, not the
                // intent lane.
                self.reject(actor, "join and leave are registry operations");
            }
            Intent::Start { mode } => self.handle_start(actor, mode),
            Intent::Roll => self.apply(actor, |game, actor| game.roll(actor)),
            Intent::Select { die } => {
                self.apply(actor, move |game, actor| game.toggle_select(actor, die));
            }
            Intent::Keep => self.apply(actor, |game, actor| game.keep(actor)),
            Intent::Bank => self.apply(actor, |game, actor| game.bank(actor)),
            Intent::AcknowledgeFarkle => {
                self.apply(actor, |game, actor| game.acknowledge_farkle(actor));
            }
        }
    }

    fn handle_start(&mut self, actor: PlayerId, mode: GameMode) {
        if self.game.is_some() {
            self.reject(actor, "the session has already started");
            return;
        }
        if actor != self.host {
            self.reject(actor, "only the host may start the session");
            return;
        }
        if self.seats.len() < MIN_PLAYERS {
            self.reject(actor, "need at least 2 players to start");
            return;
        }
        let Some(dice) = self.dice.take() else {
            self.reject(actor, "the session has already started");
            return;
        };

        self.mode = mode;
        let roster: Vec<PlayerId> = self.seats.iter().map(|(id, _)| *id).collect();
        self.game = Some(Game::new(&roster, mode, dice));
        tracing::info!(
            code = %self.code,
            %mode,
            players = roster.len(),
            "session started"
        );

        self.broadcast_snapshot();
    }

    /// Runs one game transition; success broadcasts a snapshot, a rule
    /// violation goes back to the violating actor only.
    fn apply(
        &mut self,
        actor: PlayerId,
        op: impl FnOnce(&mut Game, PlayerId) -> Result<(), farkle_game::GameError>,
    ) {
        let Some(game) = &mut self.game else {
            self.reject(actor, "the session has not started");
            return;
        };
        match op(game, actor) {
            Ok(()) => self.broadcast_snapshot(),
            Err(err) => {
                tracing::debug!(code = %self.code, %actor, %err, "intent rejected");
                self.reject(actor, &err.to_string());
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let players = self
            .seats
            .iter()
            .map(|(id, profile)| PlayerSnapshot {
                id: *id,
                nickname: profile.nickname.clone(),
                avatar: profile.avatar.clone(),
                score: self
                    .game
                    .as_ref()
                    .and_then(|game| game.score_of(*id))
                    .unwrap_or(0),
            })
            .collect();

        SessionSnapshot {
            code: self.code.clone(),
            host: self.host,
            players,
            mode: self.mode,
            started: self.game.is_some(),
            turn: self.game.as_ref().map(Game::turn_snapshot),
            winner: self.game.as_ref().and_then(Game::winner),
        }
    }

    fn broadcast_snapshot(&self) {
        self.broadcast(ServerEvent::Snapshot {
            session: self.snapshot(),
        });
    }

    fn broadcast(&self, event: ServerEvent) {
        for (player, _) in &self.seats {
            self.send_to(*player, event.clone());
        }
    }

    fn reject(&self, player: PlayerId, message: &str) {
        self.send_to(
            player,
            ServerEvent::Rejected {
                message: message.to_string(),
            },
        );
    }

    /// Sends an event to a single participant. Silently drops if the
    /// receiver is gone.
    fn send_to(&self, player: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> LobbyInfo {
        LobbyInfo {
            code: self.code.clone(),
            host: self.host,
            player_count: self.seats.len(),
            started: self.game.is_some(),
        }
    }
}

/// Spawns a new lobby actor task and returns a handle to it. `host` is
/// the player whose create request brought the session into being; they
/// still join through the handle like everyone else.
pub(crate) fn spawn_lobby(
    code: LobbyCode,
    host: PlayerId,
    dice: Box<dyn DiceSource>,
    channel_size: usize,
) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = LobbyActor {
        code: code.clone(),
        host,
        seats: Vec::new(),
        senders: HashMap::new(),
        mode: GameMode::default(),
        game: None,
        dice: Some(dice),
        receiver: rx,
        dissolved: false,
    };

    tokio::spawn(actor.run());

    LobbyHandle { code, sender: tx }
}
