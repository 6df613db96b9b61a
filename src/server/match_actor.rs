//! One task per match, applying intents in arrival order.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

use crate::core::{
    common::Side,
    game::{Event, Intent, Match},
};
use crate::domain::{Audience, Snapshot};
use crate::protocol::Message;

/// Queue depth per match. Senders wait when it is full.
const COMMAND_QUEUE: usize = 64;

/// Outbound queue of one connected session.
pub type Outbox = mpsc::UnboundedSender<Message>;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchCommand {
    Intent {
        side: Side,
        seq: u64,
        intent: Intent,
    },
    RequestState {
        side: Side,
    },
}

/// Cheap handle to a running match. The actor stops when every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    tx: mpsc::Sender<MatchCommand>,
}

impl MatchHandle {
    pub async fn send(&self, cmd: MatchCommand) -> anyhow::Result<()> {
        self.tx
            .send(cmd)
            .await
            .map_err(|_| anyhow::anyhow!("Match has ended"))
    }
}

/// Start the actor. Both sides immediately receive `GameStarted`.
///
/// With a `turn_limit`, the side to act is timed out after that long
/// without a valid action.
pub fn spawn(game: Match, outboxes: [Outbox; 2], turn_limit: Option<Duration>) -> MatchHandle {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let actor = MatchActor {
        game,
        outboxes,
        turn_limit,
        deadline: None,
    };
    tokio::spawn(actor.run(rx));
    MatchHandle { tx }
}

struct MatchActor {
    game: Match,
    outboxes: [Outbox; 2],
    turn_limit: Option<Duration>,
    deadline: Option<Instant>,
}

impl MatchActor {
    async fn run(mut self, mut rx: mpsc::Receiver<MatchCommand>) {
        for side in Side::ALL {
            self.send(side, Message::GameStarted(Snapshot::of(&self.game, side)));
        }
        self.arm_timer();
        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.expire();
                }
            }
        }
        log::debug!("match actor stopped");
    }

    fn send(&self, side: Side, msg: Message) {
        // A closed outbox means the session is gone; it will resync on return.
        let _ = self.outboxes[side.index()].send(msg);
    }

    fn arm_timer(&mut self) {
        self.deadline = match (self.turn_limit, self.game.winner()) {
            (Some(limit), None) => Some(Instant::now() + limit),
            _ => None,
        };
    }

    fn handle(&mut self, cmd: MatchCommand) {
        match cmd {
            MatchCommand::Intent { side, seq, intent } => {
                let audiences = Audience::both(&self.game, side);
                match self.game.apply(side, intent) {
                    Ok(events) => {
                        self.arm_timer();
                        self.publish(audiences, side, Some(seq), &events);
                    }
                    Err(e) => self.send(
                        side,
                        Message::Error {
                            seq: Some(seq),
                            message: e.to_string(),
                        },
                    ),
                }
            }
            MatchCommand::RequestState { side } => {
                self.send(side, Message::StateUpdate(Snapshot::of(&self.game, side)));
            }
        }
    }

    fn expire(&mut self) {
        let actor = self.game.side_to_act();
        log::info!("turn timer expired for {}", actor);
        let audiences = Audience::both(&self.game, actor);
        let events = self.game.expire_turn();
        self.arm_timer();
        self.publish(audiences, actor, None, &events);
    }

    /// Snapshot first, then the results, so a client holds the new state by
    /// the time it sees its action acknowledged. Each side only hears about
    /// units it could identify before or after the change.
    fn publish(&self, audiences: [Audience; 2], actor: Side, seq: Option<u64>, events: &[Event]) {
        for mut audience in audiences {
            let side = audience.recipient();
            audience.settle(&self.game);
            self.send(side, Message::StateUpdate(Snapshot::of(&self.game, side)));
            self.send(
                side,
                Message::ActionResult {
                    seq: if side == actor { seq } else { None },
                    actor,
                    events: audience.filter(events),
                },
            );
        }
        if let Some(winner) = self.game.winner() {
            log::info!("match over, {} wins", winner);
        }
    }
}
