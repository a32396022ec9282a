//! Anonymous player records, identified by a browser session id.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entity::players;
use crate::error::GameError;

/// Register a player for a browser session. Re-registering the same session
/// updates the display name instead of failing on the unique constraint.
pub async fn create_player(
    db: &DatabaseConnection,
    name: &str,
    session_id: &str,
) -> Result<players::Model, GameError> {
    let existing = players::Entity::find()
        .filter(players::Column::SessionId.eq(session_id))
        .one(db)
        .await?;

    if let Some(player) = existing {
        let mut model: players::ActiveModel = player.into();
        model.name = Set(name.to_string());
        return Ok(model.update(db).await?);
    }

    let now: DateTime<FixedOffset> = Utc::now().into();
    let player = players::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        session_id: Set(session_id.to_string()),
        created_at: Set(now),
    };

    Ok(player.insert(db).await?)
}

pub async fn get_player(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<players::Model>, GameError> {
    Ok(players::Entity::find_by_id(id).one(db).await?)
}

pub async fn get_player_by_session(
    db: &DatabaseConnection,
    session_id: &str,
) -> Result<Option<players::Model>, GameError> {
    Ok(players::Entity::find()
        .filter(players::Column::SessionId.eq(session_id))
        .one(db)
        .await?)
}
