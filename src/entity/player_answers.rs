use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Latest answer text for a (round, player, category), upserted on every
/// edit. `votes_for` / `votes_against` / `points` are a derived cache over
/// `answer_votes` and must always be safe to recompute from those rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_answers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub round_id: Uuid,
    pub player_id: Uuid,
    pub player_name: String,
    pub category_id: i32,
    pub answer: String,
    pub votes_for: i32,
    pub votes_against: i32,
    pub is_valid: Option<bool>,
    pub is_duplicate: bool,
    pub points: i32,
    pub submitted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rounds::Entity",
        from = "Column::RoundId",
        to = "super::rounds::Column::Id"
    )]
    Round,
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id"
    )]
    Player,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::answer_votes::Entity")]
    AnswerVotes,
}

impl Related<super::rounds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::answer_votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerVotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
