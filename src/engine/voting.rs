//! Voting on answers and the per-category readiness barrier.
//!
//! Every tally on an answer row is recomputed in full from the vote rows
//! inside the same transaction as the vote write. Nothing increments a
//! counter in place, so a replayed or double-delivered vote can never
//! skew a score.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::views::{ReadyOutcome, ReadyPlayer, UserVote};
use crate::engine::{progression, rules, scoring};
use crate::entity::{
    answer_votes, category_votes, game_categories, game_participants, games, player_answers,
    rounds,
};
use crate::error::GameError;

/// Cast or change a validity vote on an answer. A duplicate marker by the
/// same voter is replaced; the answer's tally is recomputed before the
/// transaction commits.
pub async fn vote_on_answer(
    db: &DatabaseConnection,
    answer_id: Uuid,
    player_id: Uuid,
    is_valid: bool,
) -> Result<player_answers::Model, GameError> {
    let answer = db
        .transaction::<_, player_answers::Model, GameError>(|txn| {
            Box::pin(async move {
                upsert_vote(txn, answer_id, player_id, Some(is_valid), false).await?;
                recompute_answer(txn, answer_id).await
            })
        })
        .await?;

    Ok(answer)
}

/// Flag an answer as a duplicate. The marker replaces any validity vote by
/// the same voter; the 5-point cap applies once a majority of participants
/// agree.
pub async fn mark_answer_as_duplicate(
    db: &DatabaseConnection,
    answer_id: Uuid,
    player_id: Uuid,
) -> Result<player_answers::Model, GameError> {
    let answer = db
        .transaction::<_, player_answers::Model, GameError>(|txn| {
            Box::pin(async move {
                upsert_vote(txn, answer_id, player_id, None, true).await?;
                recompute_answer(txn, answer_id).await
            })
        })
        .await?;

    Ok(answer)
}

async fn upsert_vote<C: ConnectionTrait>(
    conn: &C,
    answer_id: Uuid,
    player_id: Uuid,
    is_valid: Option<bool>,
    is_duplicate: bool,
) -> Result<(), GameError> {
    let now: DateTime<FixedOffset> = Utc::now().into();

    let existing = answer_votes::Entity::find()
        .filter(answer_votes::Column::AnswerId.eq(answer_id))
        .filter(answer_votes::Column::PlayerId.eq(player_id))
        .one(conn)
        .await?;

    if let Some(vote) = existing {
        let mut model: answer_votes::ActiveModel = vote.into();
        model.is_valid = Set(is_valid);
        model.is_duplicate = Set(is_duplicate);
        model.voted_at = Set(now);
        model.update(conn).await?;
    } else {
        let vote = answer_votes::ActiveModel {
            id: Set(Uuid::new_v4()),
            answer_id: Set(answer_id),
            player_id: Set(player_id),
            is_valid: Set(is_valid),
            is_duplicate: Set(is_duplicate),
            voted_at: Set(now),
        };
        vote.insert(conn).await?;
    }

    Ok(())
}

/// Rebuild an answer's cached tally from its vote rows: majority verdict,
/// then the duplicate override against the game's participant count.
pub(crate) async fn recompute_answer<C: ConnectionTrait>(
    conn: &C,
    answer_id: Uuid,
) -> Result<player_answers::Model, GameError> {
    let answer = match player_answers::Entity::find_by_id(answer_id).one(conn).await? {
        Some(answer) => answer,
        None => return Err(GameError::rejected("answer not found")),
    };

    let participant_count = round_participant_count(conn, answer.round_id).await?;

    let votes = answer_votes::Entity::find()
        .filter(answer_votes::Column::AnswerId.eq(answer_id))
        .all(conn)
        .await?;

    let votes_for = votes.iter().filter(|v| v.is_valid == Some(true)).count() as i32;
    let votes_against = votes.iter().filter(|v| v.is_valid == Some(false)).count() as i32;
    let marker_count = votes.iter().filter(|v| v.is_duplicate).count();

    let mut model: player_answers::ActiveModel = answer.into();
    model.votes_for = Set(votes_for);
    model.votes_against = Set(votes_against);
    model.is_duplicate = Set(marker_count > 0);

    if votes.is_empty() {
        model.is_valid = Set(None);
        model.points = Set(0);
    } else {
        let verdict = scoring::apply_duplicate_override(
            scoring::resolve_majority(votes_for, votes_against),
            marker_count,
            participant_count,
        );
        model.is_valid = Set(Some(verdict.is_valid));
        model.points = Set(verdict.points);
    }

    Ok(model.update(conn).await?)
}

/// How many players sit in the game that owns this round.
pub(crate) async fn round_participant_count<C: ConnectionTrait>(
    conn: &C,
    round_id: Uuid,
) -> Result<usize, GameError> {
    let round = match rounds::Entity::find_by_id(round_id).one(conn).await? {
        Some(round) => round,
        None => return Err(GameError::rejected("round not found")),
    };
    let count = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(round.game_id))
        .count(conn)
        .await?;
    Ok(count as usize)
}

/// True when every participant in the game has a vote row (of either kind)
/// on this answer. The participant count is authoritative on the server.
pub async fn all_players_voted(
    db: &DatabaseConnection,
    answer_id: Uuid,
) -> Result<bool, GameError> {
    let answer = match player_answers::Entity::find_by_id(answer_id).one(db).await? {
        Some(answer) => answer,
        None => return Err(GameError::rejected("answer not found")),
    };
    let participant_count = round_participant_count(db, answer.round_id).await?;

    let votes = answer_votes::Entity::find()
        .filter(answer_votes::Column::AnswerId.eq(answer_id))
        .count(db)
        .await?;

    Ok(participant_count > 0 && votes as usize >= participant_count)
}

/// One voter's recorded votes across a round, for restoring the voting
/// screen after a reload.
pub async fn get_user_votes(
    db: &DatabaseConnection,
    round_id: Uuid,
    player_id: Uuid,
) -> Result<Vec<UserVote>, GameError> {
    let answer_ids: Vec<Uuid> = player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round_id))
        .all(db)
        .await?
        .into_iter()
        .map(|a| a.id)
        .collect();

    if answer_ids.is_empty() {
        return Ok(Vec::new());
    }

    let votes = answer_votes::Entity::find()
        .filter(answer_votes::Column::AnswerId.is_in(answer_ids))
        .filter(answer_votes::Column::PlayerId.eq(player_id))
        .all(db)
        .await?;

    Ok(votes
        .into_iter()
        .map(|v| UserVote {
            answer_id: v.answer_id,
            is_valid: v.is_valid,
            is_duplicate: v.is_duplicate,
        })
        .collect())
}

/// Mark a player ready to advance past a category, then evaluate the
/// advancement gate. When the gate passes the category is settled, and on
/// the round's last category the round totals are folded in as well. The
/// settlement path is idempotent, so the gate firing once per polling
/// client is harmless.
pub async fn mark_player_ready_for_next_category(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
    category_index: i32,
) -> Result<ReadyOutcome, GameError> {
    let game = match games::Entity::find_by_id(game_id).one(db).await? {
        Some(game) => game,
        None => return Err(GameError::rejected("game not found")),
    };

    upsert_readiness(db, game_id, player_id, category_index).await?;

    let participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(db)
        .await?;
    let total_players = participants.len();

    let ready_count = category_votes::Entity::find()
        .filter(category_votes::Column::GameId.eq(game_id))
        .filter(category_votes::Column::CategoryIndex.eq(category_index))
        .filter(category_votes::Column::IsReady.eq(true))
        .count(db)
        .await? as usize;

    let snapshot = game_categories::Entity::find()
        .filter(game_categories::Column::GameId.eq(game_id))
        .filter(game_categories::Column::Position.eq(category_index))
        .one(db)
        .await?;
    let snapshot = match snapshot {
        Some(snapshot) => snapshot,
        None => return Err(GameError::rejected("category index out of range")),
    };
    let category_count = game_categories::Entity::find()
        .filter(game_categories::Column::GameId.eq(game_id))
        .count(db)
        .await? as i32;

    let round = rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .filter(rounds::Column::RoundNumber.eq(game.current_round))
        .one(db)
        .await?;
    let round = match round {
        Some(round) => round,
        None => return Err(GameError::rejected("game has no current round")),
    };

    let answers = player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round.id))
        .filter(player_answers::Column::CategoryId.eq(snapshot.category_id))
        .all(db)
        .await?;

    let mut votes_per_answer = Vec::with_capacity(answers.len());
    for answer in &answers {
        let votes = answer_votes::Entity::find()
            .filter(answer_votes::Column::AnswerId.eq(answer.id))
            .count(db)
            .await?;
        votes_per_answer.push(votes as usize);
    }

    let gate = rules::advancement_gate(ready_count, total_players, &votes_per_answer);

    let mut round_completed = false;
    if gate {
        progression::settle_category(db, round.id, snapshot.category_id).await?;
        if category_index + 1 >= category_count {
            progression::complete_round(db, round.id).await?;
            round_completed = true;
        }
    }

    Ok(ReadyOutcome {
        ready_count,
        total_players,
        all_ready: total_players > 0 && ready_count >= total_players,
        category_settled: gate,
        round_completed,
    })
}

async fn upsert_readiness(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
    category_index: i32,
) -> Result<(), GameError> {
    let now: DateTime<FixedOffset> = Utc::now().into();

    let existing = category_votes::Entity::find()
        .filter(category_votes::Column::GameId.eq(game_id))
        .filter(category_votes::Column::PlayerId.eq(player_id))
        .filter(category_votes::Column::CategoryIndex.eq(category_index))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let mut model: category_votes::ActiveModel = row.into();
        model.is_ready = Set(true);
        model.updated_at = Set(now);
        model.update(db).await?;
    } else {
        let row = category_votes::ActiveModel {
            id: Set(Uuid::new_v4()),
            game_id: Set(game_id),
            player_id: Set(player_id),
            category_index: Set(category_index),
            is_ready: Set(true),
            updated_at: Set(now),
        };
        row.insert(db).await?;
    }

    Ok(())
}

/// Every participant with their readiness flag for one category index.
pub async fn get_players_ready_for_category(
    db: &DatabaseConnection,
    game_id: Uuid,
    category_index: i32,
) -> Result<Vec<ReadyPlayer>, GameError> {
    let participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(db)
        .await?;

    let ready_rows = category_votes::Entity::find()
        .filter(category_votes::Column::GameId.eq(game_id))
        .filter(category_votes::Column::CategoryIndex.eq(category_index))
        .filter(category_votes::Column::IsReady.eq(true))
        .all(db)
        .await?;

    Ok(participants
        .into_iter()
        .map(|p| {
            let is_ready = ready_rows.iter().any(|r| r.player_id == p.player_id);
            ReadyPlayer {
                player_id: p.player_id,
                player_name: p.player_name,
                is_ready,
            }
        })
        .collect())
}
