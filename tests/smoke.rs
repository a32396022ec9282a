use serde_json::{json, Value};
use stop_backend::test_support::common::test_bootstrap;
use stop_backend::GameConfig;
use uuid::Uuid;

/// Post one `{action, params}` envelope to the dispatch endpoint and return
/// the parsed body, asserting the expected HTTP status.
macro_rules! act {
    ($app:expr, $action:expr, $params:expr) => {
        act!($app, $action, $params, 200)
    };
    ($app:expr, $action:expr, $params:expr, $status:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/api/database")
            .set_json(json!({ "action": $action, "params": $params }))
            .to_request();
        let res = actix_web::test::call_service(&$app, req).await;
        let status = res.status().as_u16();
        let body: Value = actix_web::test::read_body_json(res).await;
        assert_eq!(
            status, $status,
            "{} returned {} with body {}",
            $action, status, body
        );
        body
    }};
}

fn data(body: &Value) -> &Value {
    assert_eq!(
        body["success"], true,
        "expected success response, got {body}"
    );
    &body["data"]
}

#[actix_web::test]
async fn smoke_workflow() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let app = actix_web::test::init_service(
        actix_web::App::new()
            .app_data(actix_web::web::Data::new(db.clone()))
            .app_data(actix_web::web::Data::new(GameConfig {
                default_max_rounds: 3,
                round_duration_secs: 60,
            }))
            .configure(stop_backend::configure_routes),
    )
    .await;

    // Two players with unique sessions; the first will host
    let host_session = format!("sess-{}", Uuid::new_v4());
    let guest_session = format!("sess-{}", Uuid::new_v4());

    let body = act!(app, "createPlayer", json!({ "name": "Ana", "sessionId": host_session }));
    let host_id = data(&body)["id"].as_str().unwrap().to_string();
    let body = act!(app, "createPlayer", json!({ "name": "Bruno", "sessionId": guest_session }));
    let guest_id = data(&body)["id"].as_str().unwrap().to_string();

    // Re-registering the same session updates the name instead of failing
    let body = act!(app, "createPlayer", json!({ "name": "Ana Maria", "sessionId": host_session }));
    assert_eq!(data(&body)["id"].as_str().unwrap(), host_id);

    // Room with two seats
    let code = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    let body = act!(
        app,
        "createGameRoom",
        json!({
            "roomCode": code,
            "name": "Smoke room",
            "maxPlayers": 2,
            "createdBySessionId": host_session,
        })
    );
    let room_id = data(&body)["id"].as_str().unwrap().to_string();

    act!(app, "joinGameRoom", json!({ "roomCode": code, "playerId": host_id, "playerName": "Ana" }));
    let body = act!(app, "joinGameRoom", json!({ "roomCode": code, "playerId": guest_id, "playerName": "Bruno" }));
    assert_eq!(data(&body)["current_players"], 2);

    // A third player bounces off the full room with a logical error
    let body = act!(app, "createPlayer", json!({ "name": "Carla", "sessionId": format!("sess-{}", Uuid::new_v4()) }));
    let third_id = data(&body)["id"].as_str().unwrap().to_string();
    let body = act!(app, "joinGameRoom", json!({ "roomCode": code, "playerId": third_id, "playerName": "Carla" }));
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("full"));

    act!(app, "updateRoomParticipantReady", json!({ "roomId": room_id, "playerId": host_id, "isReady": true }));
    act!(app, "updateRoomParticipantReady", json!({ "roomId": room_id, "playerId": guest_id, "isReady": true }));

    // Only the host can start the game
    let body = act!(app, "createGame", json!({ "roomId": room_id, "requestedBy": guest_id }));
    assert_eq!(body["success"], false);

    let body = act!(app, "createGame", json!({ "roomId": room_id, "requestedBy": host_id }));
    let game_id = data(&body)["id"].as_str().unwrap().to_string();
    assert_eq!(data(&body)["max_rounds"], 3);

    // Game creation snapshots the default catalog and seats both players
    let body = act!(app, "getGameCategories", json!({ "gameId": game_id }));
    let categories = data(&body).as_array().unwrap().clone();
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0]["position"], 0);
    let first_category = categories[0]["id"].as_i64().unwrap();

    let body = act!(app, "getGameParticipants", json!({ "gameId": game_id }));
    assert_eq!(data(&body).as_array().unwrap().len(), 2);

    // Round one exists already with a drawn letter
    let body = act!(app, "getCurrentRound", json!({ "gameId": game_id }));
    let round_id = data(&body)["id"].as_str().unwrap().to_string();
    assert_eq!(data(&body)["round_number"], 1);
    assert_eq!(data(&body)["letter"].as_str().unwrap().len(), 1);

    let body = act!(app, "startRound", json!({ "roundId": round_id }));
    assert_eq!(data(&body)["status"], "playing");
    // Starting cascades to the room
    let body = act!(app, "getGameRoom", json!({ "roomCode": code }));
    assert_eq!(data(&body)["status"], "playing");
    assert_eq!(data(&body)["game_id"].as_str().unwrap(), game_id);

    // Both players answer the first category; the guest edits theirs once
    act!(
        app,
        "savePlayerAnswer",
        json!({ "roundId": round_id, "playerId": host_id, "playerName": "Ana", "categoryId": first_category, "answer": "Amanda" })
    );
    act!(
        app,
        "savePlayerAnswer",
        json!({ "roundId": round_id, "playerId": guest_id, "playerName": "Bruno", "categoryId": first_category, "answer": "Alberto" })
    );
    act!(
        app,
        "savePlayerAnswer",
        json!({ "roundId": round_id, "playerId": guest_id, "playerName": "Bruno", "categoryId": first_category, "answer": "Andre" })
    );
    let body = act!(app, "getRoundAnswers", json!({ "roundId": round_id }));
    assert_eq!(data(&body).as_array().unwrap().len(), 2);

    // Someone presses Stop!
    act!(app, "stopGameForAll", json!({ "gameId": game_id }));
    let body = act!(app, "checkAllPlayersStopped", json!({ "gameId": game_id }));
    assert_eq!(data(&body), &json!(true));
    let body = act!(app, "getGameStats", json!({ "gameId": game_id }));
    assert_eq!(data(&body)["game_status"], "scoring");
    assert_eq!(data(&body)["stopped_players"], 2);

    // Voting: everyone votes valid on every answer
    let body = act!(app, "getVotingResults", json!({ "roundId": round_id }));
    let answers = data(&body).as_array().unwrap().clone();
    assert_eq!(answers.len(), 2);
    let host_answer = answers
        .iter()
        .find(|a| a["player_id"] == json!(host_id))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let guest_answer = answers
        .iter()
        .find(|a| a["player_id"] == json!(guest_id))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    for answer in [&host_answer, &guest_answer] {
        for voter in [&host_id, &guest_id] {
            act!(app, "voteOnAnswer", json!({ "answerId": answer, "playerId": voter, "isValid": true }));
        }
    }
    let body = act!(app, "checkAllPlayersVotedOnAnswer", json!({ "answerId": host_answer }));
    assert_eq!(data(&body), &json!(true));

    let body = act!(app, "getUserVotes", json!({ "roundId": round_id, "playerId": host_id }));
    assert_eq!(data(&body).as_array().unwrap().len(), 2);

    // Both players agree the guest copied the host: the duplicate majority
    // caps that answer at 5 points even though its validity vote was won
    act!(app, "markAnswerAsDuplicate", json!({ "answerId": guest_answer, "playerId": host_id }));
    act!(app, "markAnswerAsDuplicate", json!({ "answerId": guest_answer, "playerId": guest_id }));

    // The readiness barrier releases once both are ready and all answers
    // are fully voted; settlement happens inside the same call
    let body = act!(
        app,
        "markPlayerReadyForNextCategory",
        json!({ "gameId": game_id, "playerId": host_id, "categoryIndex": 0 })
    );
    assert_eq!(data(&body)["all_ready"], false);
    assert_eq!(data(&body)["category_settled"], false);

    let body = act!(
        app,
        "markPlayerReadyForNextCategory",
        json!({ "gameId": game_id, "playerId": guest_id, "categoryIndex": 0 })
    );
    assert_eq!(data(&body)["all_ready"], true);
    assert_eq!(data(&body)["category_settled"], true);
    assert_eq!(data(&body)["round_completed"], false);

    let body = act!(app, "getPlayersReadyForCategory", json!({ "gameId": game_id, "categoryIndex": 0 }));
    assert!(data(&body)
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["is_ready"] == json!(true)));

    // Settled tallies: 10 for the clean answer, 5 for the duplicate
    let body = act!(app, "getRoundAnswers", json!({ "roundId": round_id }));
    for answer in data(&body).as_array().unwrap() {
        if answer["id"] == json!(host_answer) {
            assert_eq!(answer["points"], 10);
            assert_eq!(answer["is_valid"], true);
            assert_eq!(answer["is_duplicate"], false);
        } else {
            assert_eq!(answer["points"], 5);
            assert_eq!(answer["is_duplicate"], true);
        }
    }

    // The bulk recompute lands on the same numbers
    let body = act!(app, "recalculateCategoryPoints", json!({ "roundId": round_id, "categoryId": first_category }));
    let recomputed = data(&body).as_array().unwrap().clone();
    assert!(recomputed
        .iter()
        .any(|a| a["id"] == json!(host_answer) && a["points"] == json!(10)));

    // Round totals: no completion bonus with eight categories unanswered
    let body = act!(app, "completeRound", json!({ "roundId": round_id }));
    let scores = data(&body).as_array().unwrap().clone();
    assert_eq!(scores.len(), 2);
    let host_score = scores
        .iter()
        .find(|s| s["player_id"] == json!(host_id))
        .unwrap();
    assert_eq!(host_score["base_points"], 10);
    assert_eq!(host_score["bonus_points"], 0);
    assert_eq!(host_score["position"], 1);

    let body = act!(app, "getPlayerTotalScore", json!({ "gameId": game_id, "playerId": host_id }));
    assert_eq!(data(&body), &json!(10));
    let body = act!(app, "getPlayerTotalScore", json!({ "gameId": game_id, "playerId": guest_id }));
    assert_eq!(data(&body), &json!(5));

    // Totals only move forward
    let body = act!(app, "updatePlayerScore", json!({ "gameId": game_id, "playerId": host_id, "score": 3 }));
    assert_eq!(body["success"], false);

    // Next round prep clears the stop flags and advances the cursor
    act!(app, "resetPlayersStopStatus", json!({ "gameId": game_id }));
    let body = act!(app, "checkAllPlayersStopped", json!({ "gameId": game_id }));
    assert_eq!(data(&body), &json!(false));

    let body = act!(app, "createRound", json!({ "gameId": game_id, "roundNumber": 2 }));
    assert_eq!(data(&body)["round_number"], 2);
    let body = act!(app, "getCurrentRound", json!({ "gameId": game_id }));
    assert_eq!(data(&body)["round_number"], 2);

    // Finish up: standings come back ordered with the host on top
    let body = act!(app, "finalizeGame", json!({ "gameId": game_id }));
    let standings = data(&body).as_array().unwrap().clone();
    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0]["player_id"], json!(host_id));
    assert_eq!(standings[0]["position"], 1);
    assert_eq!(standings[1]["total_score"], 5);

    let body = act!(app, "getGameRoom", json!({ "roomCode": code }));
    assert_eq!(data(&body)["status"], "finished");
    assert_eq!(data(&body)["game_status"], "finished");

    let body = act!(app, "getGameResults", json!({ "gameId": game_id }));
    let results = data(&body).as_array().unwrap().clone();
    assert_eq!(results[0]["total_points"], 10);
    assert_eq!(results[0]["valid_answers"], 1);

    // Malformed traffic is a 400, not a logical failure
    act!(app, "unknownAction", json!({}), 400);
    act!(app, "getGame", json!({ "gameId": "not-a-uuid" }), 400);

    Ok(())
}
