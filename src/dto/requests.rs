//! Typed parameter payloads for the dispatch endpoint.
//!
//! The wire format is `{ action, params }` with camelCase params, matching
//! what the polling clients send.

use serde::Deserialize;
use uuid::Uuid;

/// Envelope for every request hitting the dispatch endpoint.
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayerParams {
    pub name: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdParams {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdParams {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomParams {
    pub room_code: String,
    pub name: String,
    pub max_players: i32,
    pub created_by_session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCodeParams {
    pub room_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomParams {
    pub room_code: String,
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdParams {
    pub room_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoomParticipantParams {
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReadyParams {
    pub room_id: Uuid,
    pub player_id: Uuid,
    pub is_ready: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveParticipantParams {
    pub room_id: Uuid,
    pub player_id: Uuid,
    /// Player issuing the removal; must be the player themselves or the
    /// room's host.
    pub requested_by: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameParams {
    pub room_id: Uuid,
    /// Player issuing the request; must be the room's host.
    pub requested_by: Uuid,
    pub max_rounds: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameIdParams {
    pub game_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGameParticipantParams {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGameStatusParams {
    pub game_id: Uuid,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomStatusParams {
    pub room_code: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoundParams {
    pub game_id: Uuid,
    pub round_number: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundIdParams {
    pub round_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerParams {
    pub round_id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
    pub category_id: i32,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteParams {
    pub answer_id: Uuid,
    pub player_id: Uuid,
    pub is_valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPlayerParams {
    pub answer_id: Uuid,
    pub player_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIdParams {
    pub answer_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReadyParams {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub category_index: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReadyQueryParams {
    pub game_id: Uuid,
    pub category_index: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculatePointsParams {
    pub round_id: Uuid,
    pub category_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopStatusParams {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub has_stopped: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundPlayerParams {
    pub round_id: Uuid,
    pub player_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRoundScoreParams {
    pub round_id: Uuid,
    pub player_id: Uuid,
    pub base_points: i32,
    pub bonus_points: i32,
    pub position: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreParams {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub score: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePlayerParams {
    pub game_id: Uuid,
    pub player_id: Uuid,
}
