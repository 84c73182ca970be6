//! End-to-end tests. Every test gets its own in-memory database.

use axum_test::{TestResponse, TestServer};
use serde_json::{Value, json};

use crate::{
    brackets::{Bracket, Match},
    config::{create_app, make_pool, run_migrations},
    state::DbPool,
};

mod tournament;
mod ui;

// This is a macro rather than a function because the `assert!` panic
// then directly notes the span of the call site.
macro_rules! assert_res_ok {
    ($response:expr) => {
        assert!(
            $response.status().is_success()
                || $response.status().is_redirection(),
            "response status = {:?}, str = {}",
            $response.status(),
            {
                let body_bytes =
                    axum::body::to_bytes($response.into_body(), usize::MAX)
                        .await
                        .unwrap();
                String::from_utf8_lossy(&body_bytes).to_string()
            }
        );
    };
}
pub(crate) use assert_res_ok;

pub fn test_pool() -> DbPool {
    let pool = make_pool(":memory:").unwrap();
    run_migrations(&pool).unwrap();
    assert_eq!(pool.state().idle_connections, 1);
    pool
}

pub fn test_server() -> (TestServer, DbPool) {
    let pool = test_pool();
    let server = TestServer::new(create_app(pool.clone())).unwrap();
    (server, pool)
}

pub async fn create_ring(server: &TestServer, name: &str) -> String {
    let res = server.post("/rings").json(&json!({ "name": name })).await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json::<Value>()["id"].as_str().unwrap().to_string()
}

pub async fn create_division(server: &TestServer, name: &str) -> String {
    let res = server.post("/divisions").json(&json!({ "name": name })).await;
    res.assert_status(axum::http::StatusCode::CREATED);
    res.json::<Value>()["id"].as_str().unwrap().to_string()
}

pub async fn add_competitors(
    server: &TestServer,
    division_id: &str,
    names: &[&str],
) -> TestResponse {
    server
        .post(&format!("/ui/divisions/{division_id}/competitors"))
        .form(&[("names", names.join("\n"))])
        .await
}

pub async fn generate_bracket(
    server: &TestServer,
    division_id: &str,
) -> TestResponse {
    server
        .post(&format!("/divisions/{division_id}/generate_bracket"))
        .await
}

/// A division with a freshly generated bracket.
pub async fn division_with_bracket(
    server: &TestServer,
    names: &[&str],
) -> String {
    let division_id = create_division(server, "Male - Black Belt - Under 70kg").await;
    add_competitors(server, &division_id, names)
        .await
        .assert_status_ok();
    generate_bracket(server, &division_id).await.assert_status_ok();
    division_id
}

/// Reads the bracket straight from the database. The connection is returned
/// to the pool before this returns, so the server can keep using it.
pub fn load_bracket(pool: &DbPool, division_id: &str) -> Bracket {
    let mut conn = pool.get().unwrap();
    Bracket::load(division_id, &mut *conn).unwrap()
}

pub fn find_match(
    pool: &DbPool,
    division_id: &str,
    f: impl Fn(&Match) -> bool,
) -> Match {
    load_bracket(pool, division_id)
        .matches()
        .find(|m| f(m))
        .cloned()
        .expect("no such match")
}
