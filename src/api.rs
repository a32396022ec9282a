//! The HTTP surface: one POST endpoint dispatching `{action, params}`
//! envelopes into the engine.
//!
//! Logical failures (room full, not the host, unknown id) come back as
//! HTTP 200 with `{success: false, error}` so the polling clients can show
//! them; malformed requests are 400; storage failures are 500 with the
//! detail only in the server log.

use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::bootstrap::GameConfig;
use crate::dto::requests::*;
use crate::engine::{answers, players, progression, rooms, rounds, voting};
use crate::entity::game_rooms::RoomStatus;
use crate::entity::games::GameStatus;
use crate::error::GameError;

fn respond<T: Serialize>(result: Result<T, GameError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(json!({ "success": true, "data": data })),
        Err(GameError::Rejected(msg)) => {
            HttpResponse::Ok().json(json!({ "success": false, "error": msg }))
        }
        Err(GameError::Db(e)) => {
            error!("database error while handling action: {e}");
            HttpResponse::InternalServerError()
                .json(json!({ "success": false, "error": "internal server error" }))
        }
    }
}

fn bad_request(action: &str, detail: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "error": format!("invalid params for {}: {}", action, detail),
    }))
}

fn reject(msg: String) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": false, "error": msg }))
}

fn parse_game_status(raw: &str) -> Option<GameStatus> {
    match raw {
        "waiting" => Some(GameStatus::Waiting),
        "playing" => Some(GameStatus::Playing),
        "scoring" => Some(GameStatus::Scoring),
        "finished" => Some(GameStatus::Finished),
        _ => None,
    }
}

fn parse_room_status(raw: &str) -> Option<RoomStatus> {
    match raw {
        "waiting" => Some(RoomStatus::Waiting),
        "playing" => Some(RoomStatus::Playing),
        "scoring" => Some(RoomStatus::Scoring),
        "finished" => Some(RoomStatus::Finished),
        _ => None,
    }
}

/// Deserialize the params payload for one action, or bail with a 400.
macro_rules! params {
    ($ty:ty, $req:expr) => {
        match serde_json::from_value::<$ty>($req.params.clone()) {
            Ok(params) => params,
            Err(e) => return bad_request(&$req.action, &e.to_string()),
        }
    };
}

#[post("/database")]
pub async fn dispatch(
    db: web::Data<DatabaseConnection>,
    config: web::Data<GameConfig>,
    req: web::Json<ActionRequest>,
) -> HttpResponse {
    let db = db.get_ref();

    match req.action.as_str() {
        // Players
        "createPlayer" => {
            let p = params!(CreatePlayerParams, req);
            respond(players::create_player(db, &p.name, &p.session_id).await)
        }
        "getPlayer" => {
            let p = params!(PlayerIdParams, req);
            respond(players::get_player(db, p.id).await)
        }
        "getPlayerBySessionId" => {
            let p = params!(SessionIdParams, req);
            respond(players::get_player_by_session(db, &p.session_id).await)
        }

        // Rooms
        "createGameRoom" => {
            let p = params!(CreateRoomParams, req);
            respond(
                rooms::create_room(
                    db,
                    &p.room_code,
                    &p.name,
                    p.max_players,
                    &p.created_by_session_id,
                )
                .await,
            )
        }
        "getGameRoom" => {
            let p = params!(RoomCodeParams, req);
            respond(rooms::get_room_with_game(db, &p.room_code).await)
        }
        "joinGameRoom" => {
            let p = params!(JoinRoomParams, req);
            respond(rooms::join_room(db, &p.room_code, p.player_id, &p.player_name).await)
        }
        "getRoomParticipants" => {
            let p = params!(RoomIdParams, req);
            respond(rooms::get_participants(db, p.room_id).await)
        }
        "addRoomParticipant" => {
            let p = params!(AddRoomParticipantParams, req);
            respond(rooms::add_participant(db, p.room_id, p.player_id, &p.player_name).await)
        }
        "updateRoomParticipantReady" => {
            let p = params!(ParticipantReadyParams, req);
            respond(rooms::set_participant_ready(db, p.room_id, p.player_id, p.is_ready).await)
        }
        "removeRoomParticipant" => {
            let p = params!(RemoveParticipantParams, req);
            respond(
                rooms::remove_participant(db, p.room_id, p.player_id, p.requested_by).await,
            )
        }

        // Games
        "createGame" => {
            let p = params!(CreateGameParams, req);
            respond(
                rounds::create_game(db, config.get_ref(), p.room_id, p.requested_by, p.max_rounds)
                    .await,
            )
        }
        "getGame" => {
            let p = params!(GameIdParams, req);
            respond(rounds::get_game(db, p.game_id).await)
        }
        "getGameStats" => {
            let p = params!(GameIdParams, req);
            respond(progression::get_game_stats(db, p.game_id).await)
        }
        "getGameCategories" => {
            let p = params!(GameIdParams, req);
            respond(rounds::get_game_categories(db, p.game_id).await)
        }
        "getGameParticipants" => {
            let p = params!(GameIdParams, req);
            respond(rounds::get_game_participants(db, p.game_id).await)
        }
        "addGameParticipant" => {
            let p = params!(AddGameParticipantParams, req);
            respond(
                rounds::add_game_participant(db, p.game_id, p.player_id, &p.player_name).await,
            )
        }
        "updateGameStatus" => {
            let p = params!(UpdateGameStatusParams, req);
            let status = match parse_game_status(&p.status) {
                Some(status) => status,
                None => return reject(format!("unknown game status: {}", p.status)),
            };
            respond(rounds::update_game_status(db, p.game_id, status).await)
        }
        "updateRoomStatus" => {
            let p = params!(UpdateRoomStatusParams, req);
            let status = match parse_room_status(&p.status) {
                Some(status) => status,
                None => return reject(format!("unknown room status: {}", p.status)),
            };
            respond(rooms::update_room_status(db, &p.room_code, status).await)
        }

        // Rounds
        "createRound" => {
            let p = params!(CreateRoundParams, req);
            respond(rounds::create_round(db, p.game_id, p.round_number).await)
        }
        "getCurrentRound" => {
            let p = params!(GameIdParams, req);
            respond(rounds::get_current_round(db, p.game_id).await)
        }
        "startRound" => {
            let p = params!(RoundIdParams, req);
            respond(rounds::start_round(db, p.round_id).await)
        }
        "endRound" => {
            let p = params!(RoundIdParams, req);
            respond(rounds::end_round(db, p.round_id).await)
        }

        // Answers
        "savePlayerAnswer" => {
            let p = params!(SaveAnswerParams, req);
            respond(
                answers::save_answer(
                    db,
                    p.round_id,
                    p.player_id,
                    &p.player_name,
                    p.category_id,
                    &p.answer,
                )
                .await,
            )
        }
        "getRoundAnswers" => {
            let p = params!(RoundIdParams, req);
            respond(answers::get_round_answers(db, p.round_id).await)
        }
        "getPlayerAnswers" => {
            let p = params!(RoundPlayerParams, req);
            respond(answers::get_player_answers(db, p.round_id, p.player_id).await)
        }
        "getVotingResults" => {
            let p = params!(RoundIdParams, req);
            respond(answers::get_voting_results(db, p.round_id).await)
        }

        // Voting
        "voteOnAnswer" => {
            let p = params!(VoteParams, req);
            respond(voting::vote_on_answer(db, p.answer_id, p.player_id, p.is_valid).await)
        }
        "markAnswerAsDuplicate" => {
            let p = params!(AnswerPlayerParams, req);
            respond(voting::mark_answer_as_duplicate(db, p.answer_id, p.player_id).await)
        }
        "checkAllPlayersVotedOnAnswer" => {
            let p = params!(AnswerIdParams, req);
            respond(voting::all_players_voted(db, p.answer_id).await)
        }
        "getUserVotes" => {
            let p = params!(RoundPlayerParams, req);
            respond(voting::get_user_votes(db, p.round_id, p.player_id).await)
        }
        "markPlayerReadyForNextCategory" => {
            let p = params!(CategoryReadyParams, req);
            respond(
                voting::mark_player_ready_for_next_category(
                    db,
                    p.game_id,
                    p.player_id,
                    p.category_index,
                )
                .await,
            )
        }
        "getPlayersReadyForCategory" => {
            let p = params!(CategoryReadyQueryParams, req);
            respond(
                voting::get_players_ready_for_category(db, p.game_id, p.category_index).await,
            )
        }
        "recalculateCategoryPoints" => {
            let p = params!(RecalculatePointsParams, req);
            respond(
                progression::recalculate_category_points(db, p.round_id, p.category_id).await,
            )
        }

        // Game ending
        "updatePlayerStopStatus" => {
            let p = params!(StopStatusParams, req);
            respond(
                progression::update_player_stop_status(
                    db,
                    p.game_id,
                    p.player_id,
                    p.has_stopped,
                )
                .await,
            )
        }
        "checkAllPlayersStopped" => {
            let p = params!(GameIdParams, req);
            respond(progression::check_all_players_stopped(db, p.game_id).await)
        }
        "resetPlayersStopStatus" => {
            let p = params!(GameIdParams, req);
            respond(progression::reset_players_stop_status(db, p.game_id).await)
        }
        "stopGameForAll" => {
            let p = params!(GameIdParams, req);
            respond(progression::stop_game_for_all(db, p.game_id).await)
        }
        "completeRound" => {
            let p = params!(RoundIdParams, req);
            respond(progression::complete_round(db, p.round_id).await)
        }
        "saveRoundScore" => {
            let p = params!(SaveRoundScoreParams, req);
            respond(
                progression::save_round_score(
                    db,
                    p.round_id,
                    p.player_id,
                    p.base_points,
                    p.bonus_points,
                    p.position,
                )
                .await,
            )
        }
        "updatePlayerScore" => {
            let p = params!(UpdateScoreParams, req);
            respond(progression::update_player_score(db, p.game_id, p.player_id, p.score).await)
        }
        "getPlayerTotalScore" => {
            let p = params!(GamePlayerParams, req);
            respond(progression::get_player_total_score(db, p.game_id, p.player_id).await)
        }
        "finalizeGame" => {
            let p = params!(GameIdParams, req);
            respond(progression::finalize_game(db, p.game_id).await)
        }
        "getGameResults" => {
            let p = params!(GameIdParams, req);
            respond(progression::get_game_results(db, p.game_id).await)
        }

        unknown => HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": format!("unknown action: {}", unknown),
        })),
    }
}
