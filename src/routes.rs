use std::sync::Arc;

use log::{error, Logger};
use warp::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::reject::{self, InvalidQuery};
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;
pub use query::PlayerQuery;

/// The maximum body size to accept. Player payloads are tiny, so
/// anything bigger than this is not a player.
const MAX_CONTENT_LENGTH: u64 = 16 * 1024;

/// The first two path segments of every player route.
const PLAYERS_ROOT: &str = "rest";
const PLAYERS_PATH: &str = "players";

/// Combines every player route, turning failures into JSON responses.
pub fn make_routes(
    environment: Environment,
) -> impl Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();

    // `count` must come before `retrieve`, which would otherwise treat
    // it as an ID
    make_list_route(environment.clone())
        .or(make_count_route(environment.clone()))
        .unify()
        .or(make_create_route(environment.clone()))
        .unify()
        .or(make_retrieve_route(environment.clone()))
        .unify()
        .or(make_update_route(environment.clone()))
        .unify()
        .or(make_delete_route(environment))
        .unify()
        .recover(move |r| format_rejection(logger.clone(), r))
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    // unparseable bodies and query strings are bad data like any other
    if rej.find::<BodyDeserializeError>().is_some() || rej.find::<InvalidQuery>().is_some() {
        let r = rejection::Rejection::new(
            rejection::Context::decode(),
            BackendError::InvalidInput { field: "request" },
        );
        error!(logger, "Malformed request"; "rejection" => ?rej);

        return Ok(with_status(json(&r.flatten()), StatusCode::BAD_REQUEST));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        InvalidInput { .. } => StatusCode::BAD_REQUEST,
        NotFound { .. } => StatusCode::NOT_FOUND,
        Sqlx { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use warp::body::{content_length_limit, json as body};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{delete, get as g, path as p, path::param as par, post, query};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH, PLAYERS_PATH, PLAYERS_ROOT};
    use crate::environment::Environment;
    use crate::player::{NewPlayer, PlayerUpdate};

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(p(PLAYERS_ROOT))
                .and(p(PLAYERS_PATH));

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    route!(make_list_route => list, rt; end(), g(), query::<q::PlayerQuery>());
    route!(make_count_route => count, rt; p("count"), end(), g(), query::<q::PlayerQuery>());
    route!(make_create_route => create, rt; end(), post(), content_length_limit(MAX_CONTENT_LENGTH), body::<NewPlayer>());
    route!(make_retrieve_route => retrieve, rt; par::<String>(), end(), g());
    route!(make_update_route => update, rt; par::<String>(), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), body::<PlayerUpdate>());
    route!(make_delete_route => delete, rt; par::<String>(), end(), delete());
}
