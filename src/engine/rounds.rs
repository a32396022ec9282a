//! Game and round lifecycle.
//!
//! Game creation snapshots the category catalog, seats the room's players
//! and opens round one in a single transaction. Status changes cascade
//! round -> game -> room in the same transaction so a polling client never
//! observes a half-advanced hierarchy.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::bootstrap::GameConfig;
use crate::dto::views::{CurrentRoundView, GameCategoryView};
use crate::engine::rules;
use crate::entity::game_rooms::RoomStatus;
use crate::entity::games::GameStatus;
use crate::entity::rounds::RoundStatus;
use crate::entity::{
    categories, game_categories, game_participants, game_rooms, games, players,
    room_participants, rounds,
};
use crate::error::GameError;

/// Create a game for a room. Only the room's host may start one.
///
/// Everything a running game needs is prepared here: the category snapshot
/// (seeding the default catalog on first use), a seat for every room
/// participant, and round one with its letter already drawn. The room moves
/// to playing so late lobby polls follow along.
pub async fn create_game(
    db: &DatabaseConnection,
    config: &GameConfig,
    room_id: Uuid,
    requested_by: Uuid,
    max_rounds: Option<i32>,
) -> Result<games::Model, GameError> {
    let max_rounds = max_rounds.unwrap_or(config.default_max_rounds);
    if max_rounds < 1 {
        return Err(GameError::rejected("a game needs at least one round"));
    }
    let round_duration = config.round_duration_secs;

    let game = db
        .transaction::<_, games::Model, GameError>(|txn| {
            Box::pin(async move {
                let room = match game_rooms::Entity::find_by_id(room_id).one(txn).await? {
                    Some(room) => room,
                    None => return Err(GameError::rejected("room not found")),
                };

                let requester = match players::Entity::find_by_id(requested_by).one(txn).await? {
                    Some(requester) => requester,
                    None => return Err(GameError::rejected("requesting player not found")),
                };
                if requester.session_id != room.created_by_session_id {
                    return Err(GameError::rejected("only the host can start the game"));
                }

                let now: DateTime<FixedOffset> = Utc::now().into();
                let game = games::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    room_id: Set(room.id),
                    status: Set(GameStatus::Waiting),
                    current_round: Set(1),
                    max_rounds: Set(max_rounds),
                    round_duration: Set(round_duration),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                let game = game.insert(txn).await?;

                snapshot_categories(txn, game.id).await?;

                let seats = room_participants::Entity::find()
                    .filter(room_participants::Column::RoomId.eq(room.id))
                    .order_by_asc(room_participants::Column::JoinedAt)
                    .all(txn)
                    .await?;
                for seat in seats {
                    let participant = game_participants::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        game_id: Set(game.id),
                        player_id: Set(seat.player_id),
                        player_name: Set(seat.player_name),
                        total_score: Set(0),
                        has_stopped: Set(false),
                        stopped_at: Set(None),
                        joined_at: Set(now),
                    };
                    participant.insert(txn).await?;
                }

                insert_round(txn, game.id, 1, round_duration).await?;

                let mut room_model: game_rooms::ActiveModel = room.into();
                room_model.status = Set(RoomStatus::Playing);
                room_model.update(txn).await?;

                Ok(game)
            })
        })
        .await?;

    Ok(game)
}

/// Snapshot the active catalog into a game, seeding the default catalog
/// first if the table is empty. Positions follow catalog id order.
async fn snapshot_categories(txn: &DatabaseTransaction, game_id: Uuid) -> Result<(), GameError> {
    let mut catalog = categories::Entity::find()
        .filter(categories::Column::IsActive.eq(true))
        .order_by_asc(categories::Column::Id)
        .all(txn)
        .await?;

    if catalog.is_empty() {
        for (name, description) in rules::DEFAULT_CATEGORIES {
            let category = categories::ActiveModel {
                name: Set(name.to_string()),
                description: Set(description.to_string()),
                is_active: Set(true),
                ..Default::default()
            };
            catalog.push(category.insert(txn).await?);
        }
    }

    for (position, category) in catalog.iter().enumerate() {
        let snapshot = game_categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            game_id: Set(game_id),
            category_id: Set(category.id),
            position: Set(position as i32),
        };
        snapshot.insert(txn).await?;
    }

    Ok(())
}

pub async fn get_game(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Option<games::Model>, GameError> {
    Ok(games::Entity::find_by_id(game_id).one(db).await?)
}

/// The game's category snapshot in voting order.
pub async fn get_game_categories(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Vec<GameCategoryView>, GameError> {
    let rows = game_categories::Entity::find()
        .filter(game_categories::Column::GameId.eq(game_id))
        .find_also_related(categories::Entity)
        .order_by_asc(game_categories::Column::Position)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(rows.len());
    for (snapshot, category) in rows {
        let category = match category {
            Some(category) => category,
            None => return Err(GameError::rejected("category snapshot is dangling")),
        };
        views.push(GameCategoryView {
            id: category.id,
            name: category.name,
            description: category.description,
            position: snapshot.position,
        });
    }
    Ok(views)
}

/// Seat a player in a game directly. Idempotent per (game, player); used to
/// reconcile a client that joined the room after the game was created.
pub async fn add_game_participant(
    db: &DatabaseConnection,
    game_id: Uuid,
    player_id: Uuid,
    player_name: &str,
) -> Result<game_participants::Model, GameError> {
    let existing = game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .filter(game_participants::Column::PlayerId.eq(player_id))
        .one(db)
        .await?;
    if let Some(participant) = existing {
        return Ok(participant);
    }

    let now: DateTime<FixedOffset> = Utc::now().into();
    let participant = game_participants::ActiveModel {
        id: Set(Uuid::new_v4()),
        game_id: Set(game_id),
        player_id: Set(player_id),
        player_name: Set(player_name.to_string()),
        total_score: Set(0),
        has_stopped: Set(false),
        stopped_at: Set(None),
        joined_at: Set(now),
    };
    Ok(participant.insert(db).await?)
}

pub async fn get_game_participants(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Vec<game_participants::Model>, GameError> {
    Ok(game_participants::Entity::find()
        .filter(game_participants::Column::GameId.eq(game_id))
        .order_by_asc(game_participants::Column::JoinedAt)
        .all(db)
        .await?)
}

/// Set a game's status, cascading to the owning room in the same
/// transaction.
pub async fn update_game_status(
    db: &DatabaseConnection,
    game_id: Uuid,
    status: GameStatus,
) -> Result<games::Model, GameError> {
    let game = db
        .transaction::<_, games::Model, GameError>(|txn| {
            Box::pin(async move {
                let game = match games::Entity::find_by_id(game_id).one(txn).await? {
                    Some(game) => game,
                    None => return Err(GameError::rejected("game not found")),
                };
                let room_id = game.room_id;

                let mut model: games::ActiveModel = game.into();
                model.status = Set(status);
                model.updated_at = Set(Utc::now().into());
                let game = model.update(txn).await?;

                cascade_room_status(txn, room_id, status).await?;

                Ok(game)
            })
        })
        .await?;

    Ok(game)
}

async fn cascade_room_status(
    txn: &DatabaseTransaction,
    room_id: Uuid,
    status: GameStatus,
) -> Result<(), GameError> {
    let room_status = match status {
        GameStatus::Waiting => RoomStatus::Waiting,
        GameStatus::Playing => RoomStatus::Playing,
        GameStatus::Scoring => RoomStatus::Scoring,
        GameStatus::Finished => RoomStatus::Finished,
    };
    if let Some(room) = game_rooms::Entity::find_by_id(room_id).one(txn).await? {
        let mut model: game_rooms::ActiveModel = room.into();
        model.status = Set(room_status);
        model.update(txn).await?;
    }
    Ok(())
}

/// Open a new round for a game. The round's letter is drawn here; the
/// game's round cursor advances with it.
pub async fn create_round(
    db: &DatabaseConnection,
    game_id: Uuid,
    round_number: i32,
) -> Result<rounds::Model, GameError> {
    let round = db
        .transaction::<_, rounds::Model, GameError>(|txn| {
            Box::pin(async move {
                let game = match games::Entity::find_by_id(game_id).one(txn).await? {
                    Some(game) => game,
                    None => return Err(GameError::rejected("game not found")),
                };
                if round_number < 1 || round_number > game.max_rounds {
                    return Err(GameError::rejected(format!(
                        "round {} is out of range for this game",
                        round_number
                    )));
                }

                let existing = rounds::Entity::find()
                    .filter(rounds::Column::GameId.eq(game_id))
                    .filter(rounds::Column::RoundNumber.eq(round_number))
                    .one(txn)
                    .await?;
                if let Some(round) = existing {
                    return Ok(round);
                }

                let duration = game.round_duration;
                let round = insert_round(txn, game_id, round_number, duration).await?;

                let mut model: games::ActiveModel = game.into();
                model.current_round = Set(round_number);
                model.updated_at = Set(Utc::now().into());
                model.update(txn).await?;

                Ok(round)
            })
        })
        .await?;

    Ok(round)
}

async fn insert_round(
    txn: &DatabaseTransaction,
    game_id: Uuid,
    round_number: i32,
    duration: i32,
) -> Result<rounds::Model, GameError> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let round = rounds::ActiveModel {
        id: Set(Uuid::new_v4()),
        game_id: Set(game_id),
        round_number: Set(round_number),
        letter: Set(rules::draw_letter()),
        duration: Set(duration),
        status: Set(RoundStatus::Waiting),
        start_time: Set(None),
        end_time: Set(None),
        created_at: Set(now),
    };
    Ok(round.insert(txn).await?)
}

/// The game's latest round together with the game status, for poll
/// reconciliation.
pub async fn get_current_round(
    db: &DatabaseConnection,
    game_id: Uuid,
) -> Result<Option<CurrentRoundView>, GameError> {
    let game = match games::Entity::find_by_id(game_id).one(db).await? {
        Some(game) => game,
        None => return Err(GameError::rejected("game not found")),
    };

    let round = rounds::Entity::find()
        .filter(rounds::Column::GameId.eq(game_id))
        .order_by_desc(rounds::Column::RoundNumber)
        .one(db)
        .await?;

    Ok(round.map(|round| CurrentRoundView {
        round,
        game_status: game.status,
    }))
}

/// Move a round into play, stamping its start time and cascading the
/// playing status up through the game to the room. Calling it again on a
/// round already playing is a no-op, so every client in the room can fire
/// it when the countdown ends.
pub async fn start_round(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<rounds::Model, GameError> {
    transition_round(db, round_id, RoundStatus::Playing).await
}

/// Close a round for voting, stamping its end time and cascading the
/// scoring status upward. Idempotent for the same reason as
/// [`start_round`]: any player's Stop! press may land first.
pub async fn end_round(
    db: &DatabaseConnection,
    round_id: Uuid,
) -> Result<rounds::Model, GameError> {
    transition_round(db, round_id, RoundStatus::Scoring).await
}

async fn transition_round(
    db: &DatabaseConnection,
    round_id: Uuid,
    target: RoundStatus,
) -> Result<rounds::Model, GameError> {
    let round = db
        .transaction::<_, rounds::Model, GameError>(|txn| {
            Box::pin(async move {
                let round = match rounds::Entity::find_by_id(round_id).one(txn).await? {
                    Some(round) => round,
                    None => return Err(GameError::rejected("round not found")),
                };
                if round.status == target {
                    return Ok(round);
                }

                let game_id = round.game_id;
                let now: DateTime<FixedOffset> = Utc::now().into();

                let mut model: rounds::ActiveModel = round.into();
                model.status = Set(target);
                match target {
                    RoundStatus::Playing => model.start_time = Set(Some(now)),
                    RoundStatus::Scoring => model.end_time = Set(Some(now)),
                    RoundStatus::Waiting => {}
                }
                let round = model.update(txn).await?;

                let game_status = match target {
                    RoundStatus::Playing => GameStatus::Playing,
                    RoundStatus::Scoring => GameStatus::Scoring,
                    RoundStatus::Waiting => GameStatus::Waiting,
                };
                if let Some(game) = games::Entity::find_by_id(game_id).one(txn).await? {
                    let room_id = game.room_id;
                    let mut model: games::ActiveModel = game.into();
                    model.status = Set(game_status);
                    model.updated_at = Set(now);
                    model.update(txn).await?;
                    cascade_room_status(txn, room_id, game_status).await?;
                }

                Ok(round)
            })
        })
        .await?;

    Ok(round)
}
