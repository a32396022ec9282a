use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (answer, voter), overwritten when the voter changes their
/// mind. A row is either a validity vote (`is_valid` set) or a duplicate
/// marker (`is_duplicate` with `is_valid` null), never both.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer_votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub answer_id: Uuid,
    pub player_id: Uuid,
    pub is_valid: Option<bool>,
    pub is_duplicate: bool,
    pub voted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::player_answers::Entity",
        from = "Column::AnswerId",
        to = "super::player_answers::Column::Id"
    )]
    PlayerAnswer,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id"
    )]
    Player,
}

impl Related<super::player_answers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerAnswer.def()
    }
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
