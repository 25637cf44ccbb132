use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::{Filter, Reply};

use players::config::Config;
use players::db::MemoryDb;
use players::environment::Environment;
use players::player::Player;
use players::routes::make_routes;

type Routes = BoxedFilter<(Box<dyn Reply>,)>;

const ROOT: &str = "/rest/players";

/// 2005-06-01T00:00:00Z.
const BIRTHDAY: i64 = 1_117_584_000_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorResponse {
    id: Option<String>,
    message: String,
}

fn routes() -> Routes {
    let environment = Environment::new(
        Arc::new(log::discard()),
        Arc::new(MemoryDb::new()),
        Config::default(),
    );

    make_routes(environment)
        .map(|reply| Box::new(reply) as Box<dyn Reply>)
        .boxed()
}

fn player_json(name: &str, experience: i64) -> serde_json::Value {
    json!({
        "name": name,
        "title": "Keeper of Keys",
        "race": "DWARF",
        "profession": "KNIGHT",
        "birthday": BIRTHDAY,
        "experience": experience,
    })
}

async fn send(
    routes: &Routes,
    method: &str,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, Vec<u8>, Option<String>) {
    let mut request = warp::test::request().method(method).path(path);

    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.reply(routes).await;
    let timing = response
        .headers()
        .get("server-timing")
        .map(|v| v.to_str().unwrap().to_owned());

    (response.status(), response.body().to_vec(), timing)
}

async fn create(routes: &Routes, name: &str, experience: i64) -> Player {
    let (status, body, _) = send(routes, "POST", ROOT, Some(player_json(name, experience))).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));

    serde_json::from_slice(&body).expect("parse created player")
}

async fn list(routes: &Routes, query: &str) -> Vec<Player> {
    let (status, body, _) = send(routes, "GET", &format!("{}?{}", ROOT, query), None).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));

    serde_json::from_slice(&body).expect("parse player list")
}

async fn count(routes: &Routes, query: &str) -> i64 {
    let (status, body, _) = send(routes, "GET", &format!("{}/count?{}", ROOT, query), None).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));

    serde_json::from_slice(&body).expect("parse count")
}

#[tokio::test]
async fn create_and_retrieve() {
    let routes = routes();

    let created = create(&routes, "Gimli", 100).await;
    assert_eq!(created.level, 1);
    assert_eq!(created.until_next_level, 200);
    assert!(!created.banned);

    let (status, body, timing) =
        send(&routes, "GET", &format!("{}/{}", ROOT, created.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(timing.unwrap().starts_with("handler;dur="));

    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({
            "id": created.id,
            "name": "Gimli",
            "title": "Keeper of Keys",
            "race": "DWARF",
            "profession": "KNIGHT",
            "level": 1,
            "untilNextLevel": 200,
            "birthday": BIRTHDAY,
            "banned": false,
            "experience": 100,
        })
    );
}

#[tokio::test]
async fn derived_fields_in_payload_are_ignored() {
    let routes = routes();

    let mut payload = player_json("Gimli", 0);
    payload["level"] = json!(99);
    payload["untilNextLevel"] = json!(1);
    payload["id"] = json!(12345);

    let (status, body, _) = send(&routes, "POST", ROOT, Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let created: Player = serde_json::from_slice(&body).unwrap();
    assert_eq!(created.id, 1);
    assert_eq!((created.level, created.until_next_level), (0, 100));
}

#[tokio::test]
async fn invalid_creations_are_rejected() {
    let routes = routes();

    let mut cases = vec![
        player_json("", 0),
        player_json("Thirteen_char", 0),
        player_json("Gimli", -1),
        player_json("Gimli", 10_000_001),
    ];

    let mut long_title = player_json("Gimli", 0);
    long_title["title"] = json!("t".repeat(31));
    cases.push(long_title);

    // a millisecond before 2000 and the first millisecond of 3001
    for millis in &[946_684_799_999_i64, 32_535_216_000_000] {
        let mut bad_birthday = player_json("Gimli", 0);
        bad_birthday["birthday"] = json!(millis);
        cases.push(bad_birthday);
    }

    for field in &["name", "title", "experience", "birthday", "race", "profession"] {
        let mut missing = player_json("Gimli", 0);
        missing.as_object_mut().unwrap().remove(*field);
        cases.push(missing);
    }

    for case in cases {
        let (status, body, _) = send(&routes, "POST", ROOT, Some(case.clone())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{} was accepted", case);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.id, None);
    }

    assert_eq!(count(&routes, "").await, 0);
}

#[tokio::test]
async fn lookups_by_bad_or_unknown_ids() {
    let routes = routes();

    for id in &["0", "-5", "abc"] {
        for method in &["GET", "DELETE"] {
            let (status, body, _) = send(&routes, method, &format!("{}/{}", ROOT, id), None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, id);
            let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
            assert_eq!(error.id.as_deref(), Some(*id));
        }

        let (status, _, _) = send(&routes, "POST", &format!("{}/{}", ROOT, id), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "POST {}", id);
    }

    let path = format!("{}/999999", ROOT);
    assert_eq!(send(&routes, "GET", &path, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&routes, "DELETE", &path, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        send(&routes, "POST", &path, Some(json!({}))).await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn partial_update() {
    let routes = routes();

    let mut payload = player_json("Gimli", 0);
    payload["banned"] = json!(true);
    let (_, body, _) = send(&routes, "POST", ROOT, Some(payload)).await;
    let created: Player = serde_json::from_slice(&body).unwrap();
    assert!(created.banned);

    let path = format!("{}/{}", ROOT, created.id);
    let (status, body, _) = send(&routes, "POST", &path, Some(json!({ "experience": 300 }))).await;
    assert_eq!(status, StatusCode::OK);

    let updated: Player = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.experience, 300);
    assert_eq!((updated.level, updated.until_next_level), (2, 300));
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.race, created.race);
    assert_eq!(updated.profession, created.profession);
    assert_eq!(updated.birthday, created.birthday);
    // absent from the payload, so reset
    assert!(!updated.banned);

    let (status, _, _) = send(&routes, "POST", &path, Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body, _) = send(&routes, "GET", &path, None).await;
    let stored: Player = serde_json::from_slice(&body).unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn null_banned_in_update_unbans() {
    let routes = routes();

    let mut payload = player_json("Gimli", 0);
    payload["banned"] = json!(true);
    let (_, body, _) = send(&routes, "POST", ROOT, Some(payload)).await;
    let created: Player = serde_json::from_slice(&body).unwrap();
    assert!(created.banned);

    let path = format!("{}/{}", ROOT, created.id);
    let (status, body, _) = send(
        &routes,
        "POST",
        &path,
        Some(json!({ "experience": 100, "banned": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let updated: Player = serde_json::from_slice(&body).unwrap();
    assert!(!updated.banned);
    assert_eq!(updated.experience, 100);
}

#[tokio::test]
async fn deletion() {
    let routes = routes();

    let created = create(&routes, "Gimli", 0).await;
    let path = format!("{}/{}", ROOT, created.id);

    let (status, body, _) = send(&routes, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    assert_eq!(send(&routes, "GET", &path, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(count(&routes, "").await, 0);
}

#[tokio::test]
async fn filtering_paging_and_sorting() {
    let routes = routes();

    // levels 0, 5, 6, 8, 10, 11
    for (name, experience) in &[
        ("Frodo", 0),
        ("Sam", 1_500),
        ("Merry", 2_100),
        ("Pippin", 4_000),
        ("Bilbo", 5_500),
        ("Smeagol", 7_000),
    ] {
        create(&routes, name, *experience).await;
    }

    let names = |players: Vec<Player>| players.into_iter().map(|p| p.name).collect::<Vec<_>>();

    // default page size is 3, ordered by ID
    assert_eq!(names(list(&routes, "").await), vec!["Frodo", "Sam", "Merry"]);
    assert_eq!(
        names(list(&routes, "pageNumber=1").await),
        vec!["Pippin", "Bilbo", "Smeagol"]
    );
    assert_eq!(
        names(list(&routes, "pageSize=10&order=NAME").await),
        vec!["Bilbo", "Frodo", "Merry", "Pippin", "Sam", "Smeagol"]
    );

    let in_range = list(&routes, "minLevel=5&maxLevel=10&pageSize=10").await;
    assert!(in_range.iter().all(|p| (5..=10).contains(&p.level)));
    assert_eq!(in_range.len(), 4);
    assert_eq!(count(&routes, "minLevel=5&maxLevel=10").await, 4);

    assert_eq!(count(&routes, "minLevel=10").await, 2);
    assert_eq!(count(&routes, "maxExperience=1500").await, 2);
    assert_eq!(count(&routes, "name=i").await, 2);
    assert_eq!(count(&routes, "name=I").await, 0);
    assert_eq!(count(&routes, "race=DWARF&profession=KNIGHT&banned=false").await, 6);
    assert_eq!(count(&routes, "race=ELF").await, 0);
    assert_eq!(count(&routes, "banned=true").await, 0);
    assert_eq!(count(&routes, &format!("after={}&before={}", BIRTHDAY, BIRTHDAY)).await, 6);
    assert_eq!(count(&routes, &format!("after={}", BIRTHDAY + 1)).await, 0);
    assert_eq!(count(&routes, "pageSize=1").await, 6);
}

#[tokio::test]
async fn bad_queries_are_rejected() {
    let routes = routes();

    for query in &["pageSize=0", "pageNumber=-1", "race=GOBLIN", "order=AGE", "minLevel=x"] {
        let (status, body, _) = send(&routes, "GET", &format!("{}?{}", ROOT, query), None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", query);
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.id, None);
    }
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let routes = routes();

    let mut payload = player_json("Gimli", 0);
    payload["race"] = json!("GOBLIN");

    let (status, body, _) = send(&routes, "POST", ROOT, Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.id, None);
}
