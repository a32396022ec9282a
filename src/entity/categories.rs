use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed prompt catalog shared across all games. Serial ids double as the
/// catalog order used when snapshotting categories into a game.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_categories::Entity")]
    GameCategories,
    #[sea_orm(has_many = "super::player_answers::Entity")]
    PlayerAnswers,
}

impl Related<super::game_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
