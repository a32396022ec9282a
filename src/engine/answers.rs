//! Answer submission and retrieval.
//!
//! One row per (round, player, category), last write wins. The vote
//! counters on each row are a cache derived from `answer_votes`; nothing
//! here touches them.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::dto::views::AnswerView;
use crate::entity::{categories, game_categories, player_answers, rounds};
use crate::error::GameError;

/// Upsert a player's answer for one category of a round. Re-submitting
/// replaces the text and refreshes the timestamp.
pub async fn save_answer(
    db: &DatabaseConnection,
    round_id: Uuid,
    player_id: Uuid,
    player_name: &str,
    category_id: i32,
    answer: &str,
) -> Result<player_answers::Model, GameError> {
    let player_name = player_name.to_string();
    let answer = answer.trim().to_string();

    let saved = db
        .transaction::<_, player_answers::Model, GameError>(|txn| {
            Box::pin(async move {
                let now: DateTime<FixedOffset> = Utc::now().into();

                let existing = player_answers::Entity::find()
                    .filter(player_answers::Column::RoundId.eq(round_id))
                    .filter(player_answers::Column::PlayerId.eq(player_id))
                    .filter(player_answers::Column::CategoryId.eq(category_id))
                    .one(txn)
                    .await?;

                if let Some(row) = existing {
                    let mut model: player_answers::ActiveModel = row.into();
                    model.answer = Set(answer);
                    model.player_name = Set(player_name);
                    model.submitted_at = Set(now);
                    return Ok(model.update(txn).await?);
                }

                let row = player_answers::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    round_id: Set(round_id),
                    player_id: Set(player_id),
                    player_name: Set(player_name),
                    category_id: Set(category_id),
                    answer: Set(answer),
                    votes_for: Set(0),
                    votes_against: Set(0),
                    is_valid: Set(None),
                    is_duplicate: Set(false),
                    points: Set(0),
                    submitted_at: Set(now),
                };
                Ok(row.insert(txn).await?)
            })
        })
        .await?;

    Ok(saved)
}

pub async fn get_round_answers(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<Vec<player_answers::Model>, GameError> {
    Ok(player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round_id))
        .all(db)
        .await?)
}

/// One player's answers for a round, joined with category names.
pub async fn get_player_answers(
    db: &DatabaseConnection,
    round_id: Uuid,
    player_id: Uuid,
) -> Result<Vec<AnswerView>, GameError> {
    let catalog = category_lookup(db, round_id).await?;
    let rows = player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round_id))
        .filter(player_answers::Column::PlayerId.eq(player_id))
        .all(db)
        .await?;

    let mut views: Vec<AnswerView> = rows
        .into_iter()
        .map(|row| to_view(row, &catalog))
        .collect();
    views.sort_by_key(|v| v.position.unwrap_or(i32::MAX));
    Ok(views)
}

/// Every answer of a round in voting order: category position first, then
/// player name so the listing is stable for all voters.
pub async fn get_voting_results(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<Vec<AnswerView>, GameError> {
    let catalog = category_lookup(db, round_id).await?;
    let rows = player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round_id))
        .order_by_asc(player_answers::Column::PlayerName)
        .all(db)
        .await?;

    let mut views: Vec<AnswerView> = rows
        .into_iter()
        .map(|row| to_view(row, &catalog))
        .collect();
    views.sort_by(|a, b| {
        let pa = a.position.unwrap_or(i32::MAX);
        let pb = b.position.unwrap_or(i32::MAX);
        pa.cmp(&pb).then_with(|| a.player_name.cmp(&b.player_name))
    });
    Ok(views)
}

/// Category id -> (name, position) for the game that owns the round.
async fn category_lookup(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<HashMap<i32, (String, i32)>, GameError> {
    let round = match rounds::Entity::find_by_id(round_id).one(db).await? {
        Some(round) => round,
        None => return Err(GameError::rejected("round not found")),
    };

    let rows = game_categories::Entity::find()
        .filter(game_categories::Column::GameId.eq(round.game_id))
        .find_also_related(categories::Entity)
        .all(db)
        .await?;

    let mut lookup = HashMap::with_capacity(rows.len());
    for (snapshot, category) in rows {
        if let Some(category) = category {
            lookup.insert(category.id, (category.name, snapshot.position));
        }
    }
    Ok(lookup)
}

fn to_view(row: player_answers::Model, catalog: &HashMap<i32, (String, i32)>) -> AnswerView {
    let (category_name, position) = match catalog.get(&row.category_id) {
        Some((name, position)) => (Some(name.clone()), Some(*position)),
        None => (None, None),
    };
    AnswerView {
        id: row.id,
        player_id: row.player_id,
        player_name: row.player_name,
        category_id: row.category_id,
        category_name,
        position,
        answer: row.answer,
        votes_for: row.votes_for,
        votes_against: row.votes_against,
        is_valid: row.is_valid,
        is_duplicate: row.is_duplicate,
        points: row.points,
    }
}
