//! Hot-seat play: both sides drive one in-process engine.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::{
    common::Side,
    game::{Event, Intent, Match},
};
use crate::domain::{Audience, Snapshot};
use crate::protocol::MatchApi;

/// Shared handle to a local match. Clones drive the same engine, one per
/// seat.
#[derive(Debug, Clone)]
pub struct LocalMatch {
    game: Arc<Mutex<Match>>,
}

impl LocalMatch {
    pub fn new(game: Match) -> Self {
        Self {
            game: Arc::new(Mutex::new(game)),
        }
    }

    /// Random board and teams from `seed`.
    pub fn quick(seed: u64) -> anyhow::Result<Self> {
        let game = Match::quick(seed).map_err(|e| anyhow::anyhow!(e))?;
        Ok(Self::new(game))
    }

    /// Force the current turn to end as if its timer ran out.
    pub async fn expire_turn(&self) -> Vec<Event> {
        self.game.lock().await.expire_turn()
    }

    pub async fn winner(&self) -> Option<Side> {
        self.game.lock().await.winner()
    }

    pub async fn turn(&self) -> u32 {
        self.game.lock().await.turn()
    }

    /// Copy of the full engine state.
    pub async fn engine(&self) -> Match {
        self.game.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl MatchApi for LocalMatch {
    async fn submit(&mut self, side: Side, intent: Intent) -> anyhow::Result<Vec<Event>> {
        let mut game = self.game.lock().await;
        let mut audience = Audience::new(&game, side, side);
        let events = game
            .apply(side, intent)
            .map_err(|e| anyhow::anyhow!(e))?;
        audience.settle(&game);
        Ok(audience.filter(&events))
    }

    async fn state(&mut self, side: Side) -> anyhow::Result<Snapshot> {
        Ok(Snapshot::of(&*self.game.lock().await, side))
    }

    /// Polls, yielding to the other seat between checks.
    async fn wait_turn(&mut self, side: Side) -> anyhow::Result<Snapshot> {
        loop {
            {
                let game = self.game.lock().await;
                if game.side_to_act() == side || game.winner().is_some() {
                    return Ok(Snapshot::of(&game, side));
                }
            }
            tokio::task::yield_now().await;
        }
    }
}
