use std::sync::Arc;

use log::Logger;

use crate::config::Config;
use crate::db::Db;
use crate::service::Players;

/// Everything a request handler needs.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub players: Players,
    pub config: Config,
}

impl Environment {
    pub fn new(logger: Arc<Logger>, db: Arc<dyn Db + Send + Sync>, config: Config) -> Self {
        let players = Players::new(logger.clone(), db, config.limits());

        Self {
            logger,
            players,
            config,
        }
    }
}
