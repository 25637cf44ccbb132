use std::time::{Duration, Instant};

use log::debug;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::player::{Id, NewPlayer, PlayerUpdate};
use crate::routes::{
    query::PlayerQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($expression:stmt);+) => {
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($expression)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn list(environment: Environment, query: PlayerQuery) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::list(), e);

        let page = query
            .page(environment.config.default_page_size)
            .map_err(error_handler)?;

        let players = environment
            .players
            .list(&query.criteria(), page, query.order())
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Players(players))
    }
}

pub async fn count(environment: Environment, query: PlayerQuery) -> RouteResult {
    timed! {
        let count = environment
            .players
            .count(&query.criteria())
            .await
            .map_err(|e: BackendError| Rejection::new(Context::count(), e))?;

        json(&SuccessResponse::Count(count))
    }
}

pub async fn create(environment: Environment, player: NewPlayer) -> RouteResult {
    timed! {
        let player = environment
            .players
            .create(player)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::create(), e))?;

        json(&SuccessResponse::Player(player))
    }
}

pub async fn retrieve(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::retrieve(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;

        let player = environment
            .players
            .get_by_id(id)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Player(player))
    }
}

pub async fn update(environment: Environment, id: String, changes: PlayerUpdate) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::update(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;

        let player = environment
            .players
            .update(id, changes)
            .await
            .map_err(error_handler)?;

        json(&SuccessResponse::Player(player))
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::delete(id.clone()), e);

        let id = parse_id(&id).map_err(error_handler)?;

        let removed = environment
            .players
            .delete(id)
            .await
            .map_err(error_handler)?;
        debug!(environment.logger, "Deleted player"; "id" => removed.id, "name" => &removed.name);

        StatusCode::OK
    }
}

fn parse_id(raw: &str) -> Result<Id, BackendError> {
    raw.parse().map_err(|_| BackendError::InvalidInput { field: "id" })
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
