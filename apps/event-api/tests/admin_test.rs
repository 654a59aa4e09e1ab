mod common;

use std::sync::Arc;

use axum::extract::ws::Message;
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use event_api::gateway::session::{self, ConnectionReceiver};

use event_api::gateway::session::ClientConnection;
use event_api::AppState;

async fn setup() -> (TestServer, AppState, Arc<event_api::db::store::MemoryStore>) {
    let (state, store) = common::test_state().await;
    let app = event_api::routes::router().with_state(state.clone());
    let server = TestServer::new(app).unwrap();
    (server, state, store)
}

/// Register an in-process display client and return its outbound queue.
fn listen(state: &AppState, id: &str) -> ConnectionReceiver {
    let (tx, rx) = session::queue();
    state
        .hub
        .registry()
        .add(Arc::new(ClientConnection::new(id.to_string(), tx)));
    rx
}

fn drain(rx: &mut ConnectionReceiver) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Ok(Message::Text(t)) = rx.try_recv() {
        out.push(serde_json::from_str(t.as_str()).unwrap());
    }
    out
}

#[tokio::test]
async fn health_reports_ok() {
    let (server, _state, _store) = setup().await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn leaderboard_lists_every_participant() {
    let (server, _state, _store) = setup().await;
    let resp = server.get("/api/v1/leaderboard").await;
    resp.assert_status_ok();
    let rows: Vec<serde_json::Value> = resp.json();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[3]["display_name"], "Team Four");
}

#[tokio::test]
async fn admin_routes_require_credentials() {
    let (server, _state, _store) = setup().await;

    let resp = server.post("/api/v1/admin/toggle_leaderboard").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let resp = server
        .post("/api/v1/admin/toggle_leaderboard")
        .add_header(
            AUTHORIZATION,
            event_api::auth::middleware::basic_header("user", "wrong"),
        )
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn toggle_leaderboard_flips_and_broadcasts() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_toggle");

    let resp = server
        .post("/api/v1/admin/toggle_leaderboard")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["show"], true);

    let frames = drain(&mut rx);
    assert_eq!(
        frames,
        vec![serde_json::json!({"type": "leaderboard_toggle", "payload": {"show": true}})]
    );

    let resp = server
        .post("/api/v1/admin/toggle_alliance_selection")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await;
    let body: serde_json::Value = resp.json();
    assert_eq!(body["show"], true);
    assert!(state.hub.topics().alliance_selection_visible());
}

#[tokio::test]
async fn quals_active_match_resolves_names() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_active");

    let resp = server
        .post("/api/v1/admin/active_match")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "level": "Quals", "match_id": 2 }))
        .await;
    resp.assert_status_ok();

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    let payload = &frames[0]["payload"];
    assert_eq!(frames[0]["type"], "active_match_update");
    assert_eq!(payload["match_level"], "Quals");
    assert_eq!(payload["match_id"], 2);
    assert_eq!(payload["event_name"], common::EVENT_NAME);
    assert_eq!(payload["red_alliance"], serde_json::json!(["charlie"]));
    assert_eq!(payload["blue_alliance"], serde_json::json!(["Team Four"]));
}

#[tokio::test]
async fn playoffs_active_match_has_empty_names() {
    let (server, state, _store) = setup().await;
    let resp = server
        .post("/api/v1/admin/active_match")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "level": "Playoffs", "match_id": 7 }))
        .await;
    resp.assert_status_ok();

    let active = state.hub.topics().active_match();
    assert_eq!(active.match_level, "Playoffs");
    assert_eq!(active.red_alliance, vec![String::new()]);
}

#[tokio::test]
async fn active_match_rejects_bad_input() {
    let (server, state, _store) = setup().await;

    let resp = server
        .post("/api/v1/admin/active_match")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "level": "Finals", "match_id": 1 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/v1/admin/active_match")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "level": "Quals", "match_id": 99 }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    assert_eq!(state.hub.topics().active_match().match_id, 0);
}

#[tokio::test]
async fn event_name_updates_without_broadcast() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_name");

    let resp = server
        .post("/api/v1/admin/event_name")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "name": "  " }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/v1/admin/event_name")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "name": "Finals Night" }))
        .await;
    resp.assert_status(StatusCode::NO_CONTENT);

    assert!(drain(&mut rx).is_empty());
    assert_eq!(state.hub.event_name(), "Finals Night");
}

#[tokio::test]
async fn alliance_selection_persists_and_publishes() {
    let (server, state, store) = setup().await;
    let mut rx = listen(&state, "ws_admin_alliance");

    let resp = server
        .post("/api/v1/admin/alliance_selection")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "alliance": 9, "captain": "alpha", "selection": "" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .post("/api/v1/admin/alliance_selection")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "alliance": 1, "captain": "alpha", "selection": "bravo" }))
        .await;
    resp.assert_status_ok();

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "alliance_selection");
    assert_eq!(frames[0]["payload"]["alliance_number"], 1);
    assert_eq!(frames[0]["payload"]["alliance_selection"], "bravo");

    use event_api::db::store::EventStore;
    let persisted = store.alliance_selections().await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].alliance_captain, "alpha");
}

#[tokio::test]
async fn scoring_publishes_leaderboard_then_match_saved() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_score");

    server
        .post("/api/v1/admin/active_match")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "level": "Quals", "match_id": 1 }))
        .await
        .assert_status_ok();
    drain(&mut rx);

    let resp = server
        .post("/api/v1/admin/matches/1/score")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({
            "red_player_id": 101,
            "blue_player_id": 102,
            "red_auto_score": 5,
            "blue_auto_score": 20,
            "red_teleop_score": 0,
            "blue_teleop_score": 0,
            "red_endgame_score": 0,
            "blue_endgame_score": 0,
            "red_bonus_rp": 0,
            "blue_bonus_rp": 1
        }))
        .await;
    resp.assert_status_ok();
    let saved: serde_json::Value = resp.json();
    assert_eq!(saved["blue_win_rp"], 3);

    let frames = drain(&mut rx);
    let kinds: Vec<_> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["leaderboard_update", "match_saved"]);
    assert_eq!(frames[0]["payload"][0]["display_name"], "bravo");
    assert_eq!(frames[0]["payload"][0]["total_rp"], 4);
    assert_eq!(frames[1]["payload"]["red_alliance"], serde_json::json!(["alpha"]));

    // match_saved clears the active match.
    assert_eq!(state.hub.topics().active_match().match_id, 0);
}

#[tokio::test]
async fn scoring_unknown_match_is_not_found() {
    let (server, _state, _store) = setup().await;
    let resp = server
        .post("/api/v1/admin/matches/42/score")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({
            "red_player_id": 101,
            "blue_player_id": 102,
            "red_auto_score": 0,
            "blue_auto_score": 0,
            "red_teleop_score": 0,
            "blue_teleop_score": 0,
            "red_endgame_score": 0,
            "blue_endgame_score": 0,
            "red_bonus_rp": 0,
            "blue_bonus_rp": 0
        }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn end_screen_reannounces_stored_match() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_end");

    let resp = server
        .post("/api/v1/admin/matches/2/end_screen")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await;
    resp.assert_status_ok();

    let frames = drain(&mut rx);
    assert_eq!(
        frames,
        vec![serde_json::json!({
            "type": "match_saved",
            "payload": { "red_alliance": ["charlie"], "blue_alliance": ["Team Four"] }
        })]
    );
}

#[tokio::test]
async fn registration_assigns_next_mm_id_and_rejects_duplicates() {
    let (server, state, _store) = setup().await;
    let mut rx = listen(&state, "ws_admin_register");

    let resp = server
        .post("/api/v1/admin/participants")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "username": "echo", "preferred_username": "  " }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = resp.json();
    assert_eq!(created["mm_id"], 105);
    assert_eq!(created["preferred_username"], serde_json::Value::Null);

    // The live board picks up the new zero-point row.
    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "leaderboard_update");
    assert_eq!(frames[0]["payload"].as_array().unwrap().len(), 5);

    let resp = server
        .post("/api/v1/admin/participants")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "username": "echo" }))
        .await;
    resp.assert_status(StatusCode::CONFLICT);

    let resp = server
        .post("/api/v1/admin/participants")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "username": "   " }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = server
        .get("/api/v1/admin/participants")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await;
    let rows: Vec<serde_json::Value> = resp.json();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn schedule_is_hidden_until_toggled() {
    let (server, _state, _store) = setup().await;

    let body: serde_json::Value = server.get("/api/v1/schedule").await.json();
    assert_eq!(body, serde_json::json!({ "public": false, "matches": [] }));

    let resp = server
        .post("/api/v1/admin/toggle_schedule")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await;
    let toggled: serde_json::Value = resp.json();
    assert_eq!(toggled["show"], true);

    let body: serde_json::Value = server.get("/api/v1/schedule").await.json();
    assert_eq!(body["public"], true);
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[1]["match_number"], 2);
    assert_eq!(matches[1]["red"]["display_name"], "charlie");
    assert_eq!(matches[1]["blue"]["display_name"], "Team Four");
}

#[tokio::test]
async fn schedule_import_replaces_matches_and_scores() {
    let (server, state, store) = setup().await;

    server
        .post("/api/v1/admin/matches/1/score")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({
            "red_player_id": 101,
            "blue_player_id": 102,
            "red_auto_score": 9,
            "blue_auto_score": 0,
            "red_teleop_score": 0,
            "blue_teleop_score": 0,
            "red_endgame_score": 0,
            "blue_endgame_score": 0,
            "red_bonus_rp": 0,
            "blue_bonus_rp": 0
        }))
        .await
        .assert_status_ok();
    let mut rx = listen(&state, "ws_admin_import");

    let resp = server
        .post("/api/v1/admin/schedule")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({
            "schedule": "Round Red - Blue\n1 104 v 101 | 102 v 103\n2 101 v 102 | 103 v 104\n"
        }))
        .await;
    resp.assert_status_ok();
    let rows: Vec<serde_json::Value> = resp.json();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["red_player_id"], 104);

    use event_api::db::store::EventStore;
    let stored = store.quals_matches().await.unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|m| m.red_score == 0 && m.blue_score == 0));

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["type"], "leaderboard_update");
    assert!(frames[0]["payload"]
        .as_array()
        .unwrap()
        .iter()
        .all(|row| row["total_rp"] == 0));
}

#[tokio::test]
async fn schedule_import_rejects_bad_lines_and_unknown_ids() {
    let (server, _state, store) = setup().await;
    use event_api::db::store::EventStore;

    let resp = server
        .post("/api/v1/admin/schedule")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "schedule": "1 101 v abc | 103 v 104" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = server
        .post("/api/v1/admin/schedule")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "schedule": "1 101 v 999 | 103 v 104" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(
        body["error"]["details"][0]["message"],
        "match 1: matchmaker id 999 is not registered"
    );

    // Nothing was replaced.
    assert_eq!(store.quals_matches().await.unwrap().len(), 2);
}

#[tokio::test]
async fn single_match_is_appended() {
    let (server, _state, _store) = setup().await;

    let resp = server
        .post("/api/v1/admin/matches")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "red_player_id": 102, "blue_player_id": 104 }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let row: serde_json::Value = resp.json();
    assert_eq!(row["id"], 3);

    let resp = server
        .post("/api/v1/admin/matches")
        .add_header(AUTHORIZATION, common::admin_auth())
        .json(&serde_json::json!({ "red_player_id": 102, "blue_player_id": 102 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = server
        .get("/api/v1/admin/schedule")
        .add_header(AUTHORIZATION, common::admin_auth())
        .await
        .json();
    assert_eq!(body["public"], false);
    assert_eq!(body["matches"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unauthorized_response_challenges_for_basic_auth() {
    let (server, _state, _store) = setup().await;
    let resp = server.get("/api/v1/admin/participants").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.header(axum::http::header::WWW_AUTHENTICATE),
        "Basic realm=\"admin\""
    );
}
