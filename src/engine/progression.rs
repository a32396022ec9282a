//! Category settlement, round completion, the Stop! flow and game ending.
//!
//! Settlement always rebuilds from source rows: answer tallies from
//! `answer_votes`, round totals from settled answers, cumulative totals
//! from answer points plus round bonuses. Running the same settlement
//! twice therefore lands on the same numbers, which is what makes the
//! polling clients' duplicate triggers safe.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::views::{FinalStanding, GameStats, PlayerResult};
use crate::engine::{scoring, voting};
use crate::entity::game_rooms::RoomStatus;
use crate::entity::games::GameStatus;
use crate::entity::rounds::RoundStatus;
use crate::entity::{
    game_categories, game_participants, game_rooms, games, player_answers, round_scores, rounds,
};
use crate::error::GameError;

/// Settle one category of a round: rebuild every answer's tally from its
/// vote rows and repropagate the cumulative totals.
pub async fn settle_category(
    db: &DatabaseConnection,
    round_id: Uuid,
    category_id: i32,
) -> Result<Vec<player_answers::Model>, GameError> {
    let settled = db
        .transaction::<_, Vec<player_answers::Model>, GameError>(|txn| {
            Box::pin(async move {
                let round = match rounds::Entity::find_by_id(round_id).one(txn).await? {
                    Some(round) => round,
                    None => return Err(GameError::rejected("round not found")),
                };

                let answers = player_answers::Entity::find()
                    .filter(player_answers::Column::RoundId.eq(round_id))
                    .filter(player_answers::Column::CategoryId.eq(category_id))
                    .all(txn)
                    .await?;

                let mut settled = Vec::with_capacity(answers.len());
                for answer in answers {
                    settled.push(voting::recompute_answer(txn, answer.id).await?);
                }

                propagate_totals(txn, round.game_id).await?;

                Ok(settled)
            })
        })
        .await?;

    Ok(settled)
}

/// The standalone bulk recompute over a (round, category). Same rules as
/// the barrier's settlement.
pub async fn recalculate_category_points(
    db: &DatabaseConnection,
    round_id: Uuid,
    category_id: i32,
) -> Result<Vec<player_answers::Model>, GameError> {
    settle_category(db, round_id, category_id).await
}

/// Rebuild every participant's cumulative total from source rows: the sum
/// of their settled answer points across the game's rounds plus the round
/// bonuses. A total never decreases; if the rebuild comes out lower (a
/// category mid-recount) the stored value stands.
async fn propagate_totals<C: ConnectionTrait>(
    conn: &C,
    game_id: Uuid,
) -> Result<(), GameError> {
    let round_ids: Vec<Uuid> = rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    let mut answer_points: HashMap<Uuid, i32> = HashMap::new();
    let mut bonus_points: HashMap<Uuid, i32> = HashMap::new();

    if !round_ids.is_empty() {
        let answers = player_answers::Entity::find()
            .filter(player_answers::Column::RoundId.is_in(round_ids.clone()))
            .all(conn)
            .await?;
        for answer in answers {
            *answer_points.entry(answer.player_id).or_insert(0) += answer.points;
        }

        let scores = round_scores::Entity::find()
            .filter(round_scores::Column::RoundId.is_in(round_ids))
            .all(conn)
            .await?;
        for score in scores {
            *bonus_points.entry(score.player_id).or_insert(0) += score.bonus_points;
        }
    }

    let participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(conn)
        .await?;

    for participant in participants {
        let total = answer_points.get(&participant.player_id).copied().unwrap_or(0)
            + bonus_points.get(&participant.player_id).copied().unwrap_or(0);
        if total > participant.total_score {
            let mut model: game_participants::ActiveModel = participant.into();
            model.total_score = Set(total);
            model.update(conn).await?;
        }
    }

    Ok(())
}

/// Close out a round: per-player base points from settled answers, the
/// completion bonus for a full sheet of valid answers, standings positions,
/// and the fold into the cumulative totals. Safe to run more than once.
pub async fn complete_round(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<Vec<round_scores::Model>, GameError> {
    let scores = db
        .transaction::<_, Vec<round_scores::Model>, GameError>(|txn| {
            Box::pin(async move {
                let round = match rounds::Entity::find_by_id(round_id).one(txn).await? {
                    Some(round) => round,
                    None => return Err(GameError::rejected("round not found")),
                };

                let category_count = game_categories::Entity::find()
                    .filter(game_categories::Column::GameId.eq(round.game_id))
                    .count(txn)
                    .await? as usize;

                let participants = game_participants::Entity::find()
                    .filter(game_participants::Column::GameId.eq(round.game_id))
                    .all(txn)
                    .await?;

                let answers = player_answers::Entity::find()
                    .filter(player_answers::Column::RoundId.eq(round_id))
                    .all(txn)
                    .await?;

                // (base, valid-count) per player, missing sheets count as zero
                let mut tallies: HashMap<Uuid, (i32, usize)> = HashMap::new();
                for answer in &answers {
                    let entry = tallies.entry(answer.player_id).or_insert((0, 0));
                    entry.0 += answer.points;
                    if answer.is_valid == Some(true) {
                        entry.1 += 1;
                    }
                }

                let mut totals: Vec<(Uuid, i32, i32)> = participants
                    .iter()
                    .map(|p| {
                        let (base, valid) =
                            tallies.get(&p.player_id).copied().unwrap_or((0, 0));
                        let bonus = scoring::completion_bonus(valid, category_count);
                        (p.player_id, base, bonus)
                    })
                    .collect();
                totals.sort_by(|a, b| (b.1 + b.2).cmp(&(a.1 + a.2)));

                let sorted: Vec<i32> = totals.iter().map(|t| t.1 + t.2).collect();
                let positions = scoring::assign_positions(&sorted);

                let mut saved = Vec::with_capacity(totals.len());
                for ((player_id, base, bonus), position) in
                    totals.into_iter().zip(positions)
                {
                    saved.push(
                        upsert_round_score(txn, round_id, player_id, base, bonus, position)
                            .await?,
                    );
                }

                propagate_totals(txn, round.game_id).await?;

                Ok(saved)
            })
        })
        .await?;

    Ok(scores)
}

async fn upsert_round_score<C: ConnectionTrait>(
    conn: &C,
    round_id: Uuid,
    player_id: Uuid,
    base_points: i32,
    bonus_points: i32,
    position: i32,
) -> Result<round_scores::Model, GameError> {
    let existing = round_scores::Entity::find()
        .filter(round_scores::Column::RoundId.eq(round_id))
        .filter(round_scores::Column::PlayerId.eq(player_id))
        .one(conn)
        .await?;

    if let Some(score) = existing {
        let mut model: round_scores::ActiveModel = score.into();
        model.base_points = Set(base_points);
        model.bonus_points = Set(bonus_points);
        model.total_points = Set(base_points + bonus_points);
        model.position = Set(position);
        return Ok(model.update(conn).await?);
    }

    let now: DateTime<FixedOffset> = Utc::now().into();
    let score = round_scores::ActiveModel {
        id: Set(Uuid::new_v4()),
        round_id: Set(round_id),
        player_id: Set(player_id),
        base_points: Set(base_points),
        bonus_points: Set(bonus_points),
        total_points: Set(base_points + bonus_points),
        position: Set(position),
        created_at: Set(now),
    };
    Ok(score.insert(conn).await?)
}

/// Persist an externally computed round score. The barrier path computes
/// its own; this action exists for reconciliation.
pub async fn save_round_score(
    db: &DatabaseConnection,
    round_id: Uuid,
    player_id: Uuid,
    base_points: i32,
    bonus_points: i32,
    position: i32,
) -> Result<round_scores::Model, GameError> {
    upsert_round_score(db, round_id, player_id, base_points, bonus_points, position).await
}

pub async fn update_player_stop_status(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
    has_stopped: bool,
) -> Result<game_participants::Model, GameError> {
    let participant = match game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .filter(game_participants::Column::PlayerId.eq(player_id))
        .one(db)
        .await?
    {
        Some(participant) => participant,
        None => return Err(GameError::rejected("player is not in this game")),
    };

    let mut model: game_participants::ActiveModel = participant.into();
    model.has_stopped = Set(has_stopped);
    model.stopped_at = Set(if has_stopped {
        Some(Utc::now().into())
    } else {
        None
    });
    Ok(model.update(db).await?)
}

pub async fn check_all_players_stopped(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<bool, GameError> {
    let participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(db)
        .await?;
    Ok(!participants.is_empty() && participants.iter().all(|p| p.has_stopped))
}

/// Clear the stop flags before a new round starts.
pub async fn reset_players_stop_status(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<(), GameError> {
    game_participants::Entity::update_many()
        .col_expr(game_participants::Column::HasStopped, Expr::value(false))
        .col_expr(
            game_participants::Column::StoppedAt,
            Expr::value(Option::<DateTime<FixedOffset>>::None),
        )
        .filter(game_participants::Column::GameId.eq(game_id))
        .exec(db)
        .await?;
    Ok(())
}

/// One player pressed Stop!: every participant is marked stopped, the
/// playing round closes for voting and the scoring status cascades to the
/// game and room, all in one transaction.
pub async fn stop_game_for_all(db: &DatabaseConnection, game_id: Uuid) -> Result<(), GameError> {
    db.transaction::<_, (), GameError>(|txn| {
        Box::pin(async move {
            let game = match games::Entity::find_by_id(game_id).one(txn).await? {
                Some(game) => game,
                None => return Err(GameError::rejected("game not found")),
            };
            let now: DateTime<FixedOffset> = Utc::now().into();

            game_participants::Entity::update_many()
                .col_expr(game_participants::Column::HasStopped, Expr::value(true))
                .col_expr(game_participants::Column::StoppedAt, Expr::value(Some(now)))
                .filter(game_participants::Column::GameId.eq(game_id))
                .filter(game_participants::Column::HasStopped.eq(false))
                .exec(txn)
                .await?;

            let playing = rounds::Entity::find()
                .filter(rounds::Column::GameId.eq(game_id))
                .filter(rounds::Column::Status.eq(RoundStatus::Playing))
                .order_by_desc(rounds::Column::RoundNumber)
                .one(txn)
                .await?;
            if let Some(round) = playing {
                let mut model: rounds::ActiveModel = round.into();
                model.status = Set(RoundStatus::Scoring);
                model.end_time = Set(Some(now));
                model.update(txn).await?;
            }

            let room_id = game.room_id;
            let mut model: games::ActiveModel = game.into();
            model.status = Set(GameStatus::Scoring);
            model.updated_at = Set(now);
            model.update(txn).await?;

            if let Some(room) = game_rooms::Entity::find_by_id(room_id).one(txn).await? {
                let mut model: game_rooms::ActiveModel = room.into();
                model.status = Set(RoomStatus::Scoring);
                model.update(txn).await?;
            }

            Ok(())
        })
    })
    .await?;

    Ok(())
}

/// Raise a player's cumulative total. Lowering is refused; totals only move
/// forward.
pub async fn update_player_score(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
    score: i32,
) -> Result<game_participants::Model, GameError> {
    let participant = match game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .filter(game_participants::Column::PlayerId.eq(player_id))
        .one(db)
        .await?
    {
        Some(participant) => participant,
        None => return Err(GameError::rejected("player is not in this game")),
    };

    if score < participant.total_score {
        return Err(GameError::rejected(format!(
            "refusing to lower total from {} to {}",
            participant.total_score, score
        )));
    }
    if score == participant.total_score {
        return Ok(participant);
    }

    let mut model: game_participants::ActiveModel = participant.into();
    model.total_score = Set(score);
    Ok(model.update(db).await?)
}

pub async fn get_player_total_score(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<i32, GameError> {
    let participant = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .filter(game_participants::Column::PlayerId.eq(player_id))
        .one(db)
        .await?;
    Ok(participant.map(|p| p.total_score).unwrap_or(0))
}

/// Mark the game and its room finished and return the final standings.
pub async fn finalize_game(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Vec<FinalStanding>, GameError> {
    db.transaction::<_, (), GameError>(|txn| {
        Box::pin(async move {
            let game = match games::Entity::find_by_id(game_id).one(txn).await? {
                Some(game) => game,
                None => return Err(GameError::rejected("game not found")),
            };
            let room_id = game.room_id;

            let mut model: games::ActiveModel = game.into();
            model.status = Set(GameStatus::Finished);
            model.updated_at = Set(Utc::now().into());
            model.update(txn).await?;

            if let Some(room) = game_rooms::Entity::find_by_id(room_id).one(txn).await? {
                let mut model: game_rooms::ActiveModel = room.into();
                model.status = Set(RoomStatus::Finished);
                model.update(txn).await?;
            }

            Ok(())
        })
    })
    .await?;

    let mut participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(db)
        .await?;
    participants.sort_by(|a, b| b.total_score.cmp(&a.total_score));

    let totals: Vec<i32> = participants.iter().map(|p| p.total_score).collect();
    let positions = scoring::assign_positions(&totals);

    Ok(participants
        .into_iter()
        .zip(positions)
        .map(|(p, position)| FinalStanding {
            player_id: p.player_id,
            player_name: p.player_name,
            total_score: p.total_score,
            position,
        })
        .collect())
}

/// Per-player aggregates for the results screen: cumulative total plus
/// answer counts across the whole game.
pub async fn get_game_results(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Vec<PlayerResult>, GameError> {
    let participants = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .all(db)
        .await?;

    let round_ids: Vec<Uuid> = rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    let answers = if round_ids.is_empty() {
        Vec::new()
    } else {
        player_answers::Entity::find()
            .filter(player_answers::Column::RoundId.is_in(round_ids))
            .all(db)
            .await?
    };

    let mut results: Vec<PlayerResult> = participants
        .into_iter()
        .map(|p| {
            let mine = answers.iter().filter(|a| a.player_id == p.player_id);
            let total_answers = mine.clone().count();
            let valid_answers = mine
                .clone()
                .filter(|a| a.is_valid == Some(true))
                .count();
            let invalid_answers = mine.filter(|a| a.is_valid == Some(false)).count();
            PlayerResult {
                player_id: p.player_id,
                player_name: p.player_name,
                total_points: p.total_score,
                total_answers,
                valid_answers,
                invalid_answers,
            }
        })
        .collect();
    results.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    Ok(results)
}

/// Coarse per-game counters for the polling loop.
pub async fn get_game_stats(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<GameStats, GameError> {
    let game = match games::Entity::find_by_id(game_id).one(db).await? {
        Some(game) => game,
        None => return Err(GameError::rejected("game not found")),
    };

    let total_players = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .count(db)
        .await? as i64;
    let stopped_players = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .filter(game_participants::Column::HasStopped.eq(true))
        .count(db)
        .await? as i64;

    Ok(GameStats {
        total_players,
        stopped_players,
        current_round: game.current_round,
        max_rounds: game.max_rounds,
        game_status: game.status,
    })
}
