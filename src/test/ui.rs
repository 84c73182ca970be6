use axum::http::StatusCode;

use crate::{
    brackets::{MatchStatus, RoundName},
    rings::Ring,
    test::{
        add_competitors, create_division, create_ring, division_with_bracket,
        find_match, load_bracket, test_server,
    },
};

#[tokio::test]
async fn ring_fragments() {
    let (server, pool) = test_server();

    let res = server.post("/ui/rings").form(&[("name", "Ring 1")]).await;
    res.assert_status_ok();
    assert!(res.text().contains("Ring 1"));
    assert!(res.text().contains("/scorekeeper"));

    let list = server.get("/ui/rings_list").await;
    list.assert_status_ok();
    assert!(list.text().contains("Ring 1"));

    let ring_id = {
        let mut conn = pool.get().unwrap();
        Ring::all(&mut *conn).unwrap().remove(0).id
    };
    let res = server.delete(&format!("/ui/rings/{ring_id}")).await;
    res.assert_status_ok();
    assert_eq!(res.text(), "");
    assert!(!server.get("/ui/rings_list").await.text().contains("Ring 1"));

    server.delete("/ui/rings/nope").await.assert_status_not_found();
}

#[tokio::test]
async fn division_fragments() {
    let (server, pool) = test_server();

    let res = server
        .post("/ui/divisions")
        .form(&[("name", "Junior Boys")])
        .await;
    res.assert_status_ok();
    assert!(res.text().contains("Junior Boys"));
    assert!(res.text().contains("/setup"));

    create_division(&server, "Senior Women").await;
    let list = server.get("/ui/divisions_list").await.text();
    assert!(list.contains("Junior Boys"));
    assert!(list.contains("Senior Women"));

    let division_id = division_with_bracket(&server, &["A", "B"]).await;
    let res = server.delete(&format!("/ui/divisions/{division_id}")).await;
    res.assert_status_ok();
    assert_eq!(res.text(), "");
    assert!(load_bracket(&pool, &division_id).is_empty());

    server.delete("/ui/divisions/nope").await.assert_status_not_found();
}

#[tokio::test]
async fn competitor_fragments() {
    let (server, _pool) = test_server();
    let division_id = create_division(&server, "Juniors").await;

    let empty = server
        .get(&format!("/ui/divisions/{division_id}/competitors_list"))
        .await;
    empty.assert_status_ok();
    assert!(empty.text().contains("No competitors"));

    let res = add_competitors(&server, &division_id, &["Alice", "", "  Bob  "]).await;
    res.assert_status_ok();
    assert!(res.text().contains("Alice"));
    assert!(res.text().contains("Bob"));

    add_competitors(&server, &division_id, &[])
        .await
        .assert_status_ok();

    let list = server
        .get(&format!("/ui/divisions/{division_id}/competitors_list"))
        .await
        .text();
    assert_eq!(list.matches("<li").count(), 2);

    server
        .post("/ui/divisions/nope/competitors")
        .form(&[("names", "Carol")])
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn pages_render() {
    let (server, _pool) = test_server();
    let ring_id = create_ring(&server, "Ring 1").await;
    let division_id = create_division(&server, "Juniors").await;

    server.get("/").await.assert_status_ok();
    server.get("/admin").await.assert_status_ok();
    server
        .get(&format!("/admin/divisions/{division_id}/setup"))
        .await
        .assert_status_ok();
    server
        .get(&format!("/ring/{ring_id}/scorekeeper"))
        .await
        .assert_status_ok();

    let page = server
        .get(&format!("/ui/divisions/{division_id}/bracket"))
        .await;
    page.assert_status_ok();
    assert!(page.text().contains("No bracket generated yet."));
    server
        .get(&format!("/divisions/{division_id}/bracket_ui"))
        .await
        .assert_status_not_found();

    server.get("/admin/divisions/nope/setup").await.assert_status_not_found();
    server.get("/ring/nope/scorekeeper").await.assert_status_not_found();
}

#[tokio::test]
async fn bracket_views_show_every_round() {
    let (server, _pool) = test_server();
    let division_id =
        division_with_bracket(&server, &["Alice", "Bob", "Carol", "Dan", "Eve"])
            .await;

    let fragment = server
        .get(&format!("/divisions/{division_id}/bracket_ui"))
        .await;
    fragment.assert_status_ok();
    let text = fragment.text();
    for round in ["Round 1", "Semi-Final", "Final"] {
        assert!(text.contains(round), "missing {round}");
    }
    assert!(text.contains("Eve"));
    assert!(text.contains("TBD"));

    let manage = server
        .get(&format!("/admin/divisions/{division_id}/bracket_manage"))
        .await;
    manage.assert_status_ok();
    assert!(manage.text().contains("Unassigned"));

    // a bracket now exists, so the setup page offers to replace it
    let setup = server
        .get(&format!("/admin/divisions/{division_id}/setup"))
        .await
        .text();
    assert!(setup.contains("force=true"));
}

#[tokio::test]
async fn scheduling() {
    let (server, pool) = test_server();
    create_ring(&server, "Ring 1").await;
    let ring_id = create_ring(&server, "Ring 2").await;
    let division_id = division_with_bracket(&server, &["A", "B", "C"]).await;
    let opener = find_match(&pool, &division_id, |m| m.is_ready());
    let bye = find_match(&pool, &division_id, |m| {
        m.status == MatchStatus::CompletedBye
    });
    let url = format!("/matches/{}/schedule", opener.id);

    let res = server
        .put(&url)
        .form(&[("ring_id", ring_id.as_str()), ("ring_sequence", "25")])
        .await;
    res.assert_status_ok();
    assert!(res.text().contains("Match 225"));

    let opener = load_bracket(&pool, &division_id)
        .get(&opener.id)
        .cloned()
        .unwrap();
    assert_eq!(opener.ring_id.as_ref(), Some(&ring_id));
    assert_eq!(opener.sequence, Some(25));

    for sequence in ["0", "100", "soon"] {
        server
            .put(&url)
            .form(&[("ring_id", ring_id.as_str()), ("ring_sequence", sequence)])
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server
        .put(&url)
        .form(&[("ring_id", "nope"), ("ring_sequence", "3")])
        .await
        .assert_status_not_found();

    server
        .put(&format!("/matches/{}/schedule", bye.id))
        .form(&[("ring_id", ring_id.as_str()), ("ring_sequence", "3")])
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .put("/matches/nope/schedule")
        .form(&[("ring_id", ring_id.as_str()), ("ring_sequence", "3")])
        .await
        .assert_status_not_found();

    // the failed attempts left the schedule alone
    let opener = load_bracket(&pool, &division_id)
        .get(&opener.id)
        .cloned()
        .unwrap();
    assert_eq!(opener.sequence, Some(25));

    // deleting the ring unschedules its matches
    server
        .delete(&format!("/ui/rings/{ring_id}"))
        .await
        .assert_status_ok();
    let opener = load_bracket(&pool, &division_id)
        .get(&opener.id)
        .cloned()
        .unwrap();
    assert_eq!(opener.ring_id, None);
    assert_eq!(opener.sequence, None);
}

#[tokio::test]
async fn scorekeeper_only_lists_ready_matches() {
    let (server, pool) = test_server();
    let ring_id = create_ring(&server, "Ring 1").await;
    let division_id =
        division_with_bracket(&server, &["Alice Kim", "Bob Lee", "Carol Park"])
            .await;
    let opener = find_match(&pool, &division_id, |m| m.is_ready());
    let fin = find_match(&pool, &division_id, |m| m.round_name == RoundName::Final);

    for (m, sequence) in [(&opener, "1"), (&fin, "2")] {
        server
            .put(&format!("/matches/{}/schedule", m.id))
            .form(&[("ring_id", ring_id.as_str()), ("ring_sequence", sequence)])
            .await
            .assert_status_ok();
    }

    let page = server.get(&format!("/ring/{ring_id}/scorekeeper")).await.text();
    assert!(page.contains("Match 101"));
    assert!(!page.contains("Match 102"));

    // both show up on the public board, with short names
    let board = server.get("/ui/public_rings").await.text();
    assert!(board.contains("101"));
    assert!(board.contains("102"));
    assert!(board.contains("A. Kim"));
    assert!(board.contains("TBD"));

    let winner = opener.competitor1_id.clone().unwrap();
    let started = server
        .post(&format!("/ui/matches/{}/result", opener.id))
        .form(&[("status", "In Progress")])
        .await;
    started.assert_status_ok();
    assert!(started.text().contains("In Progress"));

    let res = server
        .post(&format!("/ui/matches/{}/result", opener.id))
        .form(&[("status", "Completed"), ("winner_id", winner.as_str())])
        .await;
    res.assert_status_ok();
    assert!(res.text().contains("Match 101 Complete"));
    assert!(res.text().contains("Alice Kim advances"));

    // the final is ready now, and the opener has left the ring
    let page = server.get(&format!("/ring/{ring_id}/scorekeeper")).await.text();
    assert!(!page.contains("Match 101"));
    assert!(page.contains("Match 102"));
    assert!(page.contains("Alice Kim"));
    assert!(page.contains("Bob Lee"));
}

#[tokio::test]
async fn scorekeeper_form_needs_a_winner() {
    let (server, pool) = test_server();
    let division_id = division_with_bracket(&server, &["A", "B"]).await;
    let fin = find_match(&pool, &division_id, |m| m.next_match_id.is_none());

    server
        .post(&format!("/ui/matches/{}/result", fin.id))
        .form(&[("status", "Completed"), ("winner_id", "")])
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        load_bracket(&pool, &division_id).get(&fin.id).unwrap().status,
        MatchStatus::Pending
    );
}
