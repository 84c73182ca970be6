//! Runs a whole division, from registration to the Final, through the same
//! requests the admin and scorekeeper screens make.

use axum::{Router, body::Body, extract::Request};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    brackets::{Bracket, MatchStatus},
    config::create_app,
    rings::Ring,
    state::DbPool,
    test::{assert_res_ok, load_bracket, test_pool},
};

const COMPETITORS: [&str; 6] = [
    "Kim Min-jun",
    "Lee Seo-yeon",
    "Park Ji-ho",
    "Choi Ha-eun",
    "Jung Do-yun",
    "Kang Seo-ah",
];

fn form(method: &str, uri: &str, fields: &[(&str, &str)]) -> Request {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

async fn setup(app: &Router, pool: &DbPool) -> (String, Vec<Ring>) {
    for name in ["Ring 1", "Ring 2"] {
        let res = app
            .clone()
            .oneshot(form("POST", "/ui/rings", &[("name", name)]))
            .await
            .unwrap();
        assert_res_ok!(res);
    }

    let res = app
        .clone()
        .oneshot(form("POST", "/ui/divisions", &[("name", "Cadets - Under 45kg")]))
        .await
        .unwrap();
    assert_res_ok!(res);

    let res = app.clone().oneshot(get("/divisions")).await.unwrap();
    let divisions: Value =
        serde_json::from_str(&body_string(res).await).unwrap();
    let division_id = divisions[0]["id"].as_str().unwrap().to_string();

    let names = COMPETITORS.join("\n");
    let res = app
        .clone()
        .oneshot(form(
            "POST",
            &format!("/ui/divisions/{division_id}/competitors"),
            &[("names", names.as_str())],
        ))
        .await
        .unwrap();
    assert_res_ok!(res);

    let res = app
        .clone()
        .oneshot(form(
            "POST",
            &format!("/divisions/{division_id}/generate_bracket"),
            &[],
        ))
        .await
        .unwrap();
    assert_res_ok!(res);

    let rings = {
        let mut conn = pool.get().unwrap();
        Ring::all(&mut *conn).unwrap()
    };
    (division_id, rings)
}

/// Puts every open match of the bracket on a ring, alternating between the
/// rings.
async fn schedule_open_matches(
    app: &Router,
    bracket: &Bracket,
    rings: &[Ring],
    next_sequence: &mut i64,
) {
    for (i, m) in bracket
        .matches()
        .filter(|m| m.status.is_open() && m.ring_id.is_none())
        .enumerate()
    {
        let ring = &rings[i % rings.len()];
        let sequence = next_sequence.to_string();
        *next_sequence += 1;

        let res = app
            .clone()
            .oneshot(form(
                "PUT",
                &format!("/matches/{}/schedule", m.id),
                &[("ring_id", ring.id.as_str()), ("ring_sequence", sequence.as_str())],
            ))
            .await
            .unwrap();
        assert_res_ok!(res);
    }
}

#[tokio::test]
async fn six_competitors_play_to_a_champion() {
    let pool = test_pool();
    let app = create_app(pool.clone());

    let (division_id, rings) = setup(&app, &pool).await;

    let bracket = load_bracket(&pool, &division_id);
    assert_eq!(bracket.len(), 7);
    assert_eq!(
        bracket
            .matches()
            .filter(|m| m.status == MatchStatus::CompletedBye)
            .count(),
        2
    );

    let mut next_sequence = 1;
    let mut played = 0;
    loop {
        let bracket = load_bracket(&pool, &division_id);
        if bracket.champion().is_some() {
            break;
        }
        schedule_open_matches(&app, &bracket, &rings, &mut next_sequence).await;

        // whatever the scorekeepers can see gets played, the competitor in
        // the blue corner always winning
        let mut progressed = false;
        for ring in &rings {
            let page = app
                .clone()
                .oneshot(get(&format!("/ring/{}/scorekeeper", ring.id)))
                .await
                .unwrap();
            assert_res_ok!(page);

            let bracket = load_bracket(&pool, &division_id);
            let ready = bracket
                .matches()
                .filter(|m| {
                    m.ring_id.as_ref() == Some(&ring.id)
                        && m.status.is_open()
                        && m.is_ready()
                })
                .cloned()
                .collect::<Vec<_>>();

            for m in ready {
                let uri = format!("/ui/matches/{}/result", m.id);
                let res = app
                    .clone()
                    .oneshot(form("POST", &uri, &[("status", "In Progress")]))
                    .await
                    .unwrap();
                assert_res_ok!(res);

                let winner = m.competitor1_id.clone().unwrap();
                let res = app
                    .clone()
                    .oneshot(form(
                        "POST",
                        &uri,
                        &[("status", "Completed"), ("winner_id", winner.as_str())],
                    ))
                    .await
                    .unwrap();
                let status = res.status();
                let text = body_string(res).await;
                assert!(status.is_success(), "{status}: {text}");
                assert!(text.contains("Complete"));

                played += 1;
                progressed = true;
            }
        }
        assert!(progressed, "no match could be played");
    }

    // six competitors, so five decisive matches
    assert_eq!(played, 5);

    let bracket = load_bracket(&pool, &division_id);
    assert!(bracket.check_tree().is_ok());
    let fin = bracket.root().unwrap();
    assert_eq!(fin.status, MatchStatus::Completed);

    let mut conn = pool.get().unwrap();
    let names = crate::divisions::competitors::Competitor::names_of_division(
        &division_id,
        &mut *conn,
    )
    .unwrap();
    drop(conn);
    // the top seed sits in slot 1 all the way up
    assert_eq!(names[bracket.champion().unwrap()], COMPETITORS[0]);

    let res = app
        .clone()
        .oneshot(get(&format!("/divisions/{division_id}/bracket_ui")))
        .await
        .unwrap();
    let text = body_string(res).await;
    assert!(text.contains("Champion"));
    assert!(text.contains(COMPETITORS[0]));
}
