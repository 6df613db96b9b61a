use crate::core::{
    common::Side,
    game::Intent,
    turn::Phase,
};
use crate::domain::Snapshot;
use crate::protocol::MatchApi;

use super::Controller;

/// Consecutive rejections tolerated before the node gives up on a turn.
const MAX_REJECTIONS: u32 = 3;

/// Drives one side: waits for its turn, asks the controller for intents
/// and submits them until the turn passes.
pub struct PlayerNode<A: MatchApi> {
    side: Side,
    controller: Box<dyn Controller>,
    api: A,
}

/// An intent that is legal in any phase and always makes progress.
fn fallback(snapshot: &Snapshot) -> Intent {
    match snapshot.phase {
        Some(Phase::Capturing { unit }) => Intent::Capture { unit, throw: None },
        Some(Phase::Evolving { unit }) => Intent::ConfirmEvolution { unit },
        _ => Intent::EndTurn,
    }
}

impl<A: MatchApi> PlayerNode<A> {
    pub fn new(side: Side, controller: Box<dyn Controller>, api: A) -> Self {
        Self {
            side,
            controller,
            api,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Play intents until it is no longer this side's turn.
    pub async fn play_turn(&mut self) -> anyhow::Result<()> {
        let mut rejections = 0;
        loop {
            let snap = self.api.state(self.side).await?;
            if !snap.is_my_turn() {
                return Ok(());
            }
            let intent = if rejections == 0 {
                self.controller.choose(&snap)
            } else {
                fallback(&snap)
            };
            match self.api.submit(self.side, intent).await {
                Ok(events) => {
                    self.controller.observe(self.side, &events);
                    rejections = 0;
                }
                Err(e) => {
                    rejections += 1;
                    log::debug!("{} intent {:?} rejected: {}", self.side, intent, e);
                    if rejections >= MAX_REJECTIONS {
                        return Err(anyhow::anyhow!(
                            "{} could not make progress: {}",
                            self.side,
                            e
                        ));
                    }
                }
            }
        }
    }

    /// Play until the match ends or, with `max_turns`, the turn counter
    /// passes it. Returns the winner, if any.
    pub async fn run(&mut self, max_turns: Option<u32>) -> anyhow::Result<Option<Side>> {
        loop {
            let snap = self.api.wait_turn(self.side).await?;
            if let Some(winner) = snap.winner() {
                log::info!("{} sees the match won by {}", self.side, winner);
                return Ok(Some(winner));
            }
            if max_turns.is_some_and(|max| snap.turn > max) {
                return Ok(None);
            }
            self.play_turn().await?;
        }
    }
}
