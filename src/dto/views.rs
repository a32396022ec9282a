//! Response payloads assembled from multiple tables for the polling clients.

use serde::Serialize;
use uuid::Uuid;

use crate::entity::{game_rooms, games, rounds};

/// Room snapshot joined with its active game, if any. While a game is in
/// the playing or scoring phase the room reports that phase as its own
/// status so late polls converge on the right screen.
#[derive(Debug, Serialize)]
pub struct RoomView {
    pub id: Uuid,
    pub room_code: String,
    pub name: String,
    pub max_players: i32,
    pub current_players: i32,
    pub status: game_rooms::RoomStatus,
    pub created_by_session_id: String,
    pub game_id: Option<Uuid>,
    pub game_status: Option<games::GameStatus>,
}

/// A category as snapshotted into a game.
#[derive(Debug, Serialize)]
pub struct GameCategoryView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub position: i32,
}

/// An answer joined with its category for the voting screen.
#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub position: Option<i32>,
    pub answer: String,
    pub votes_for: i32,
    pub votes_against: i32,
    pub is_valid: Option<bool>,
    pub is_duplicate: bool,
    pub points: i32,
}

/// Per-player readiness for one category index.
#[derive(Debug, Serialize)]
pub struct ReadyPlayer {
    pub player_id: Uuid,
    pub player_name: String,
    pub is_ready: bool,
}

/// Outcome of a readiness mark, reporting whether the barrier released.
#[derive(Debug, Serialize)]
pub struct ReadyOutcome {
    pub ready_count: usize,
    pub total_players: usize,
    pub all_ready: bool,
    /// True when the advancement gate passed and the category's points were
    /// settled as part of this call.
    pub category_settled: bool,
    /// True when this was the round's last category and round totals were
    /// folded into the cumulative scores.
    pub round_completed: bool,
}

/// One voter's recorded vote on one answer.
#[derive(Debug, Serialize)]
pub struct UserVote {
    pub answer_id: Uuid,
    pub is_valid: Option<bool>,
    pub is_duplicate: bool,
}

/// Coarse per-game counters for the polling loop.
#[derive(Debug, Serialize)]
pub struct GameStats {
    pub total_players: i64,
    pub stopped_players: i64,
    pub current_round: i32,
    pub max_rounds: i32,
    pub game_status: games::GameStatus,
}

/// Final per-player aggregate for the results screen.
#[derive(Debug, Serialize)]
pub struct PlayerResult {
    pub player_id: Uuid,
    pub player_name: String,
    pub total_points: i32,
    pub total_answers: usize,
    pub valid_answers: usize,
    pub invalid_answers: usize,
}

/// Cumulative standing at game end.
#[derive(Debug, Serialize)]
pub struct FinalStanding {
    pub player_id: Uuid,
    pub player_name: String,
    pub total_score: i32,
    pub position: i32,
}

/// The current round together with its game, for poll reconciliation.
#[derive(Debug, Serialize)]
pub struct CurrentRoundView {
    #[serde(flatten)]
    pub round: rounds::Model,
    pub game_status: games::GameStatus,
}
