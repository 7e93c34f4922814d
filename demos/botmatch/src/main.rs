//! Two greedy bots play a full Farkle session through the engine.
//!
//! Exercises the whole stack end to end: registry join, host start, and
//! every turn transition, driven purely off broadcast snapshots the way a
//! real synchronization layer would drive it. The bot previews die
//! liveness with the same `farkle-rules` functions the engine scores
//! with, so its selections never come back rejected.
//!
//! Run with `RUST_LOG=info cargo run -p botmatch`.

use farkle_lobby::{LobbyRegistry, PlayerProfile};
use farkle_protocol::{
    Codec, GameMode, Intent, JsonCodec, PlayerId, ServerEvent, SessionSnapshot, TurnPhase,
};
use farkle_rules::is_scoring_face;
use tokio::sync::mpsc;

/// Bank once a turn has earned at least this much.
const BANK_AT: u32 = 300;

fn profile(nickname: &str, avatar: &str) -> PlayerProfile {
    PlayerProfile {
        nickname: nickname.into(),
        avatar: avatar.into(),
    }
}

/// The greedy policy: select every live die, keep, re-roll while the
/// turn is worth less than [`BANK_AT`], bank otherwise.
fn next_intent(snapshot: &SessionSnapshot) -> Option<(PlayerId, Intent)> {
    if snapshot.winner.is_some() {
        return None;
    }
    let turn = snapshot.turn.as_ref()?;
    let actor = turn.active_player;

    match turn.phase {
        TurnPhase::PlayerTurn => {
            if turn.turn_score >= BANK_AT {
                Some((actor, Intent::Bank))
            } else {
                Some((actor, Intent::Roll))
            }
        }
        TurnPhase::DiceRolled => {
            let roll: Vec<u8> = turn.dice.iter().map(|d| d.face).collect();
            // Same liveness predicate the engine scores with.
            let unselected_live = turn
                .dice
                .iter()
                .find(|d| !d.selected && is_scoring_face(d.face, &roll));
            match unselected_live {
                Some(die) => Some((actor, Intent::Select { die: die.id })),
                None => Some((actor, Intent::Keep)),
            }
        }
        TurnPhase::Farkled => Some((actor, Intent::AcknowledgeFarkle)),
        TurnPhase::GameOver => None,
    }
}

async fn recv_snapshot(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
) -> Result<SessionSnapshot, Box<dyn std::error::Error>> {
    loop {
        match rx.recv().await {
            Some(ServerEvent::Snapshot { session }) => return Ok(session),
            Some(ServerEvent::Rejected { message }) => {
                tracing::warn!(%message, "bot intent rejected");
            }
            Some(ServerEvent::SessionClosed { reason }) => {
                return Err(format!("session closed: {reason}").into());
            }
            None => return Err("event channel closed".into()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut registry = LobbyRegistry::new();
    let nova = PlayerId(1);
    let juno = PlayerId(2);

    // Nova opens a session; Juno joins it by code.
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let receipt = registry
        .create_or_join(nova, profile("nova", "owl"), None, tx1)
        .await?;
    tracing::info!(code = %receipt.code, "session open");
    registry
        .create_or_join(juno, profile("juno", "fox"), Some(receipt.code.clone()), tx2)
        .await?;

    registry
        .dispatch(nova, Intent::Start { mode: GameMode::Rush })
        .await?;

    // Drive play off Nova's inbox (every broadcast lands there too).
    let mut snapshot = recv_snapshot(&mut rx1).await?;
    while let Some((actor, intent)) = next_intent(&snapshot) {
        registry.dispatch(actor, intent).await?;
        snapshot = recv_snapshot(&mut rx1).await?;
    }

    let winner = snapshot.winner.ok_or("game ended without a winner")?;
    let name = snapshot
        .players
        .iter()
        .find(|p| p.id == winner)
        .map(|p| p.nickname.as_str())
        .unwrap_or("?");
    tracing::info!(%winner, name, "game over");
    for player in &snapshot.players {
        tracing::info!(player = %player.id, nickname = %player.nickname, score = player.score, "final score");
    }

    // The final snapshot, as a synchronization layer would put it on the wire.
    let codec = JsonCodec;
    let bytes = codec.encode(&ServerEvent::Snapshot { session: snapshot })?;
    println!("{}", String::from_utf8(bytes)?);

    // Juno's inbox is only drained at the end; the bots share one driver.
    while rx2.try_recv().is_ok() {}

    Ok(())
}
