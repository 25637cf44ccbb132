use std::sync::Arc;

use log::{debug, Logger};

use crate::db::Db;
use crate::errors::BackendError;
use crate::filter::{Criteria, Order, Page};
use crate::player::{Id, NewPlayer, Player, PlayerUpdate};
use crate::validation::{check_id, Limits};

/// The operations offered on players. Writes go through a single
/// storage call each, so they either happen completely or not at all.
#[derive(Clone)]
pub struct Players {
    logger: Arc<Logger>,
    db: Arc<dyn Db + Send + Sync>,
    limits: Limits,
}

impl Players {
    pub fn new(logger: Arc<Logger>, db: Arc<dyn Db + Send + Sync>, limits: Limits) -> Self {
        Self { logger, db, limits }
    }

    pub async fn list(
        &self,
        criteria: &Criteria,
        page: Page,
        order: Order,
    ) -> Result<Vec<Player>, BackendError> {
        debug!(self.logger, "Listing players..."; "criteria" => ?criteria, "page" => ?page, "order" => ?order);

        self.db.list(criteria, page, order).await
    }

    pub async fn count(&self, criteria: &Criteria) -> Result<i64, BackendError> {
        debug!(self.logger, "Counting players..."; "criteria" => ?criteria);

        self.db.count(criteria).await
    }

    pub async fn create(&self, player: NewPlayer) -> Result<Player, BackendError> {
        let draft = player.validate(&self.limits)?;

        debug!(self.logger, "Creating player..."; "name" => &draft.name);
        let player = self.db.insert(draft).await?;
        debug!(self.logger, "Created player"; "id" => player.id);

        Ok(player)
    }

    pub async fn get_by_id(&self, id: Id) -> Result<Player, BackendError> {
        check_id(id)?;

        debug!(self.logger, "Retrieving player..."; "id" => id);
        self.db
            .retrieve(id)
            .await?
            .ok_or(BackendError::NotFound { id })
    }

    pub async fn update(&self, id: Id, changes: PlayerUpdate) -> Result<Player, BackendError> {
        check_id(id)?;

        let limits = self.limits;

        debug!(self.logger, "Updating player..."; "id" => id);
        self.db
            .modify(id, Box::new(move |player| changes.apply(player, &limits)))
            .await?
            .ok_or(BackendError::NotFound { id })
    }

    pub async fn delete(&self, id: Id) -> Result<Player, BackendError> {
        check_id(id)?;

        debug!(self.logger, "Deleting player..."; "id" => id);
        self.db
            .remove(id)
            .await?
            .ok_or(BackendError::NotFound { id })
    }
}
