use std::collections::BTreeMap;
use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt};

use super::{Db, Modification};
use crate::errors::BackendError;
use crate::filter::{Criteria, Order, Page};
use crate::player::{Id, Player, PlayerDraft};

/// Keeps players in process memory. IDs are handed out from 1 upwards
/// and never reused.
#[derive(Default)]
pub struct MemoryDb {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    last_id: Id,
    players: BTreeMap<Id, Player>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Db for MemoryDb {
    fn list(
        &self,
        criteria: &Criteria,
        page: Page,
        order: Order,
    ) -> BoxFuture<Result<Vec<Player>, BackendError>> {
        let matches = criteria.matcher();

        let mut matching: Vec<Player> = {
            let state = self.state.read().unwrap();

            state
                .players
                .values()
                .filter(|p| matches(p))
                .cloned()
                .collect()
        };

        matching.sort_by(|a, b| order.compare(a, b));

        let players = matching
            .into_iter()
            .skip(to_usize(page.offset()))
            .take(to_usize(page.size()))
            .collect();

        futures::future::ok(players).boxed()
    }

    fn count(&self, criteria: &Criteria) -> BoxFuture<Result<i64, BackendError>> {
        let matches = criteria.matcher();

        let state = self.state.read().unwrap();
        let count = state.players.values().filter(|p| matches(p)).count();

        futures::future::ok(count as i64).boxed()
    }

    fn retrieve(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>> {
        let player = self.state.read().unwrap().players.get(&id).cloned();

        futures::future::ok(player).boxed()
    }

    fn insert(&self, draft: PlayerDraft) -> BoxFuture<Result<Player, BackendError>> {
        let mut state = self.state.write().unwrap();

        state.last_id += 1;
        let player = draft.into_player(state.last_id);
        state.players.insert(player.id, player.clone());

        futures::future::ok(player).boxed()
    }

    fn modify(
        &self,
        id: Id,
        modification: Modification,
    ) -> BoxFuture<Result<Option<Player>, BackendError>> {
        let result = {
            let mut state = self.state.write().unwrap();

            match state.players.get(&id).cloned() {
                Some(current) => modification(current).map(|changed| {
                    state.players.insert(id, changed.clone());
                    Some(changed)
                }),
                None => Ok(None),
            }
        };

        futures::future::ready(result).boxed()
    }

    fn remove(&self, id: Id) -> BoxFuture<Result<Option<Player>, BackendError>> {
        let player = self.state.write().unwrap().players.remove(&id);

        futures::future::ok(player).boxed()
    }
}

fn to_usize(n: i64) -> usize {
    use std::convert::TryFrom;

    usize::try_from(n).unwrap_or(usize::MAX)
}
