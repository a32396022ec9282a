//! Room lifecycle: creation, joining with capacity enforcement, the lobby
//! ready flags, and participant removal.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::views::RoomView;
use crate::entity::{game_rooms, games, players, room_participants};
use crate::entity::game_rooms::RoomStatus;
use crate::error::GameError;

pub async fn create_room(
    db: &DatabaseConnection,
    room_code: &str,
    name: &str,
    max_players: i32,
    created_by_session_id: &str,
) -> Result<game_rooms::Model, GameError> {
    if max_players < 2 {
        return Err(GameError::rejected("a room needs at least 2 seats"));
    }

    let code = room_code.trim().to_uppercase();
    let existing = game_rooms::Entity::find()
        .filter(game_rooms::Column::RoomCode.eq(code.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(GameError::rejected(format!(
            "room code {} is already in use",
            code
        )));
    }

    let now: DateTime<FixedOffset> = Utc::now().into();
    let room = game_rooms::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_code: Set(code),
        name: Set(name.to_string()),
        max_players: Set(max_players),
        current_players: Set(0),
        status: Set(RoomStatus::Waiting),
        created_by_session_id: Set(created_by_session_id.to_string()),
        created_at: Set(now),
    };

    Ok(room.insert(db).await?)
}

pub async fn get_room_by_code(
    db: &DatabaseConnection,
    room_code: &str,
) -> Result<Option<game_rooms::Model>, GameError> {
    Ok(game_rooms::Entity::find()
        .filter(game_rooms::Column::RoomCode.eq(room_code.trim().to_uppercase()))
        .one(db)
        .await?)
}

/// Room snapshot joined with its most recent game so a polling client can
/// follow the room into the playing and scoring screens.
pub async fn get_room_with_game(
    db: &DatabaseConnection,
    room_code: &str,
) -> Result<Option<RoomView>, GameError> {
    let room = match get_room_by_code(db, room_code).await? {
        Some(room) => room,
        None => return Ok(None),
    };

    let game = games::Entity::find()
        .filter(games::Column::RoomId.eq(room.id))
        .order_by_desc(games::Column::CreatedAt)
        .one(db)
        .await?;

    Ok(Some(RoomView {
        id: room.id,
        room_code: room.room_code,
        name: room.name,
        max_players: room.max_players,
        current_players: room.current_players,
        status: room.status,
        created_by_session_id: room.created_by_session_id,
        game_id: game.as_ref().map(|g| g.id),
        game_status: game.as_ref().map(|g| g.status),
    }))
}

/// Join a room by code. The room row is locked for the duration of the
/// check-and-insert so two concurrent joins cannot both take the last seat.
/// Joining a room the player already sits in is a no-op.
pub async fn join_room(
    db: &DatabaseConnection,
    room_code: &str,
    player_id: Uuid,
    player_name: &str,
) -> Result<game_rooms::Model, GameError> {
    let code = room_code.trim().to_uppercase();
    let name = player_name.to_string();

    let room = db
        .transaction::<_, game_rooms::Model, GameError>(|txn| {
            Box::pin(async move {
                let room = match game_rooms::Entity::find()
                    .filter(game_rooms::Column::RoomCode.eq(code.clone()))
                    .lock_exclusive()
                    .one(txn)
                    .await
                {
                    Ok(Some(room)) => room,
                    Ok(None) => {
                        return Err(GameError::rejected(format!("room {} not found", code)))
                    }
                    Err(e) => return Err(GameError::Db(e)),
                };

                if room.status != RoomStatus::Waiting {
                    return Err(GameError::rejected("room is no longer accepting players"));
                }

                let already_in = room_participants::Entity::find()
                    .filter(room_participants::Column::RoomId.eq(room.id))
                    .filter(room_participants::Column::PlayerId.eq(player_id))
                    .one(txn)
                    .await?;
                if already_in.is_some() {
                    return Ok(room);
                }

                if room.current_players >= room.max_players {
                    return Err(GameError::rejected("room is full"));
                }

                insert_participant(txn, room.id, player_id, &name).await?;

                let new_count = room.current_players + 1;
                let mut model: game_rooms::ActiveModel = room.into();
                model.current_players = Set(new_count);
                Ok(model.update(txn).await?)
            })
        })
        .await?;

    Ok(room)
}

/// Seat a player in a room by id, bypassing the waiting-status check. Used
/// when reconciling a client that lost its seat row but still knows the
/// room. Idempotent per (room, player).
pub async fn add_participant(
    db: &DatabaseConnection,
    room_id: Uuid,
    player_id: Uuid,
    player_name: &str,
) -> Result<room_participants::Model, GameError> {
    let name = player_name.to_string();

    let participant = db
        .transaction::<_, room_participants::Model, GameError>(|txn| {
            Box::pin(async move {
                let existing = room_participants::Entity::find()
                    .filter(room_participants::Column::RoomId.eq(room_id))
                    .filter(room_participants::Column::PlayerId.eq(player_id))
                    .one(txn)
                    .await?;
                if let Some(participant) = existing {
                    return Ok(participant);
                }

                let room = match game_rooms::Entity::find_by_id(room_id)
                    .lock_exclusive()
                    .one(txn)
                    .await?
                {
                    Some(room) => room,
                    None => return Err(GameError::rejected("room not found")),
                };
                if room.current_players >= room.max_players {
                    return Err(GameError::rejected("room is full"));
                }

                let participant = insert_participant(txn, room_id, player_id, &name).await?;

                let new_count = room.current_players + 1;
                let mut model: game_rooms::ActiveModel = room.into();
                model.current_players = Set(new_count);
                model.update(txn).await?;

                Ok(participant)
            })
        })
        .await?;

    Ok(participant)
}

async fn insert_participant(
    txn: &DatabaseTransaction,
    room_id: Uuid,
    player_id: Uuid,
    player_name: &str,
) -> Result<room_participants::Model, GameError> {
    let now: DateTime<FixedOffset> = Utc::now().into();
    let participant = room_participants::ActiveModel {
        id: Set(Uuid::new_v4()),
        room_id: Set(room_id),
        player_id: Set(player_id),
        player_name: Set(player_name.to_string()),
        is_ready: Set(false),
        joined_at: Set(now),
    };
    Ok(participant.insert(txn).await?)
}

pub async fn get_participants(
    db: &DatabaseConnection,
    room_id: Uuid,
) -> Result<Vec<room_participants::Model>, GameError> {
    Ok(room_participants::Entity::find()
        .filter(room_participants::Column::RoomId.eq(room_id))
        .order_by_asc(room_participants::Column::JoinedAt)
        .all(db)
        .await?)
}

pub async fn set_participant_ready(
    db: &DatabaseConnection,
    room_id: Uuid,
    player_id: Uuid,
    is_ready: bool,
) -> Result<room_participants::Model, GameError> {
    let participant = match room_participants::Entity::find()
        .filter(room_participants::Column::RoomId.eq(room_id))
        .filter(room_participants::Column::PlayerId.eq(player_id))
        .one(db)
        .await?
    {
        Some(participant) => participant,
        None => return Err(GameError::rejected("player is not in this room")),
    };

    let mut model: room_participants::ActiveModel = participant.into();
    model.is_ready = Set(is_ready);
    Ok(model.update(db).await?)
}

/// Remove a player from a room. A player may always remove themselves;
/// removing anyone else requires the requester to be the room's host. The
/// seat count never drops below zero even if the seat row was already gone.
pub async fn remove_participant(
    db: &DatabaseConnection,
    room_id: Uuid,
    player_id: Uuid,
    requested_by: Uuid,
) -> Result<(), GameError> {
    db.transaction::<_, (), GameError>(|txn| {
        Box::pin(async move {
            let room = match game_rooms::Entity::find_by_id(room_id)
                .lock_exclusive()
                .one(txn)
                .await?
            {
                Some(room) => room,
                None => return Err(GameError::rejected("room not found")),
            };

            if requested_by != player_id {
                let requester = match players::Entity::find_by_id(requested_by).one(txn).await? {
                    Some(requester) => requester,
                    None => return Err(GameError::rejected("requesting player not found")),
                };
                if requester.session_id != room.created_by_session_id {
                    return Err(GameError::rejected(
                        "only the host can remove another player",
                    ));
                }
            }

            let deleted = room_participants::Entity::delete_many()
                .filter(room_participants::Column::RoomId.eq(room_id))
                .filter(room_participants::Column::PlayerId.eq(player_id))
                .exec(txn)
                .await?;

            if deleted.rows_affected > 0 && room.current_players > 0 {
                let new_count = room.current_players - 1;
                let mut model: game_rooms::ActiveModel = room.into();
                model.current_players = Set(new_count);
                model.update(txn).await?;
            }

            Ok(())
        })
    })
    .await?;

    Ok(())
}

pub async fn update_room_status(
    db: &DatabaseConnection,
    room_code: &str,
    status: RoomStatus,
) -> Result<game_rooms::Model, GameError> {
    let room = match get_room_by_code(db, room_code).await? {
        Some(room) => room,
        None => return Err(GameError::rejected(format!("room {} not found", room_code))),
    };

    let mut model: game_rooms::ActiveModel = room.into();
    model.status = Set(status);
    Ok(model.update(db).await?)
}
