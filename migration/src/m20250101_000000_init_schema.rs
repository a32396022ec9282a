use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create players table
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Players::Name).string().not_null())
                    .col(ColumnDef::new(Players::SessionId).string().not_null().unique_key())
                    .col(ColumnDef::new(Players::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create game_rooms table
        manager
            .create_table(
                Table::create()
                    .table(GameRooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameRooms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GameRooms::RoomCode).string_len(16).not_null().unique_key())
                    .col(ColumnDef::new(GameRooms::Name).string().not_null())
                    .col(ColumnDef::new(GameRooms::MaxPlayers).integer().not_null())
                    .col(ColumnDef::new(GameRooms::CurrentPlayers).integer().not_null().default(0))
                    .col(ColumnDef::new(GameRooms::Status).string_len(20).not_null())
                    .col(ColumnDef::new(GameRooms::CreatedBySessionId).string().not_null())
                    .col(ColumnDef::new(GameRooms::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create room_participants table
        manager
            .create_table(
                Table::create()
                    .table(RoomParticipants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoomParticipants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RoomParticipants::RoomId).uuid().not_null())
                    .col(ColumnDef::new(RoomParticipants::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(RoomParticipants::PlayerName).string().not_null())
                    .col(ColumnDef::new(RoomParticipants::IsReady).boolean().not_null().default(false))
                    .col(ColumnDef::new(RoomParticipants::JoinedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_participants_room_id")
                            .from(RoomParticipants::Table, RoomParticipants::RoomId)
                            .to(GameRooms::Table, GameRooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_participants_player_id")
                            .from(RoomParticipants::Table, RoomParticipants::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_room_participants_room_player")
                    .table(RoomParticipants::Table)
                    .col(RoomParticipants::RoomId)
                    .col(RoomParticipants::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create games table
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::RoomId).uuid().not_null())
                    .col(ColumnDef::new(Games::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Games::CurrentRound).integer().not_null().default(1))
                    .col(ColumnDef::new(Games::MaxRounds).integer().not_null())
                    .col(ColumnDef::new(Games::RoundDuration).integer().not_null())
                    .col(ColumnDef::new(Games::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Games::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_room_id")
                            .from(Games::Table, Games::RoomId)
                            .to(GameRooms::Table, GameRooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create game_participants table
        manager
            .create_table(
                Table::create()
                    .table(GameParticipants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameParticipants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GameParticipants::GameId).uuid().not_null())
                    .col(ColumnDef::new(GameParticipants::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(GameParticipants::PlayerName).string().not_null())
                    .col(ColumnDef::new(GameParticipants::TotalScore).integer().not_null().default(0))
                    .col(ColumnDef::new(GameParticipants::HasStopped).boolean().not_null().default(false))
                    .col(ColumnDef::new(GameParticipants::StoppedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(GameParticipants::JoinedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_participants_game_id")
                            .from(GameParticipants::Table, GameParticipants::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_participants_player_id")
                            .from(GameParticipants::Table, GameParticipants::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_game_participants_game_player")
                    .table(GameParticipants::Table)
                    .col(GameParticipants::GameId)
                    .col(GameParticipants::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string().not_null())
                    .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        // Create game_categories table
        manager
            .create_table(
                Table::create()
                    .table(GameCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameCategories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GameCategories::GameId).uuid().not_null())
                    .col(ColumnDef::new(GameCategories::CategoryId).integer().not_null())
                    .col(ColumnDef::new(GameCategories::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_categories_game_id")
                            .from(GameCategories::Table, GameCategories::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_categories_category_id")
                            .from(GameCategories::Table, GameCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_game_categories_game_category")
                    .table(GameCategories::Table)
                    .col(GameCategories::GameId)
                    .col(GameCategories::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create rounds table
        manager
            .create_table(
                Table::create()
                    .table(Rounds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rounds::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Rounds::GameId).uuid().not_null())
                    .col(ColumnDef::new(Rounds::RoundNumber).integer().not_null())
                    .col(ColumnDef::new(Rounds::Letter).string_len(1).not_null())
                    .col(ColumnDef::new(Rounds::Duration).integer().not_null())
                    .col(ColumnDef::new(Rounds::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Rounds::StartTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Rounds::EndTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Rounds::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rounds_game_id")
                            .from(Rounds::Table, Rounds::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_rounds_game_round_number")
                    .table(Rounds::Table)
                    .col(Rounds::GameId)
                    .col(Rounds::RoundNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create player_answers table
        manager
            .create_table(
                Table::create()
                    .table(PlayerAnswers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlayerAnswers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PlayerAnswers::RoundId).uuid().not_null())
                    .col(ColumnDef::new(PlayerAnswers::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(PlayerAnswers::PlayerName).string().not_null())
                    .col(ColumnDef::new(PlayerAnswers::CategoryId).integer().not_null())
                    .col(ColumnDef::new(PlayerAnswers::Answer).string().not_null())
                    .col(ColumnDef::new(PlayerAnswers::VotesFor).integer().not_null().default(0))
                    .col(ColumnDef::new(PlayerAnswers::VotesAgainst).integer().not_null().default(0))
                    .col(ColumnDef::new(PlayerAnswers::IsValid).boolean().null())
                    .col(ColumnDef::new(PlayerAnswers::IsDuplicate).boolean().not_null().default(false))
                    .col(ColumnDef::new(PlayerAnswers::Points).integer().not_null().default(0))
                    .col(ColumnDef::new(PlayerAnswers::SubmittedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_answers_round_id")
                            .from(PlayerAnswers::Table, PlayerAnswers::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_answers_player_id")
                            .from(PlayerAnswers::Table, PlayerAnswers::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_answers_category_id")
                            .from(PlayerAnswers::Table, PlayerAnswers::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_player_answers_round_player_category")
                    .table(PlayerAnswers::Table)
                    .col(PlayerAnswers::RoundId)
                    .col(PlayerAnswers::PlayerId)
                    .col(PlayerAnswers::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create answer_votes table
        manager
            .create_table(
                Table::create()
                    .table(AnswerVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AnswerVotes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AnswerVotes::AnswerId).uuid().not_null())
                    .col(ColumnDef::new(AnswerVotes::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(AnswerVotes::IsValid).boolean().null())
                    .col(ColumnDef::new(AnswerVotes::IsDuplicate).boolean().not_null().default(false))
                    .col(ColumnDef::new(AnswerVotes::VotedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_votes_answer_id")
                            .from(AnswerVotes::Table, AnswerVotes::AnswerId)
                            .to(PlayerAnswers::Table, PlayerAnswers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_votes_player_id")
                            .from(AnswerVotes::Table, AnswerVotes::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_answer_votes_answer_player")
                    .table(AnswerVotes::Table)
                    .col(AnswerVotes::AnswerId)
                    .col(AnswerVotes::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create category_votes table
        manager
            .create_table(
                Table::create()
                    .table(CategoryVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CategoryVotes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CategoryVotes::GameId).uuid().not_null())
                    .col(ColumnDef::new(CategoryVotes::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(CategoryVotes::CategoryIndex).integer().not_null())
                    .col(ColumnDef::new(CategoryVotes::IsReady).boolean().not_null().default(false))
                    .col(ColumnDef::new(CategoryVotes::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_votes_game_id")
                            .from(CategoryVotes::Table, CategoryVotes::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_votes_player_id")
                            .from(CategoryVotes::Table, CategoryVotes::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_category_votes_game_player_index")
                    .table(CategoryVotes::Table)
                    .col(CategoryVotes::GameId)
                    .col(CategoryVotes::PlayerId)
                    .col(CategoryVotes::CategoryIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create round_scores table
        manager
            .create_table(
                Table::create()
                    .table(RoundScores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoundScores::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(RoundScores::RoundId).uuid().not_null())
                    .col(ColumnDef::new(RoundScores::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(RoundScores::BasePoints).integer().not_null().default(0))
                    .col(ColumnDef::new(RoundScores::BonusPoints).integer().not_null().default(0))
                    .col(ColumnDef::new(RoundScores::TotalPoints).integer().not_null().default(0))
                    .col(ColumnDef::new(RoundScores::Position).integer().not_null().default(0))
                    .col(ColumnDef::new(RoundScores::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_scores_round_id")
                            .from(RoundScores::Table, RoundScores::RoundId)
                            .to(Rounds::Table, Rounds::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_round_scores_player_id")
                            .from(RoundScores::Table, RoundScores::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_round_scores_round_player")
                    .table(RoundScores::Table)
                    .col(RoundScores::RoundId)
                    .col(RoundScores::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookup indexes for the hot polling queries
        manager
            .create_index(
                Index::create()
                    .name("idx_rounds_game_id")
                    .table(Rounds::Table)
                    .col(Rounds::GameId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_player_answers_round_id")
                    .table(PlayerAnswers::Table)
                    .col(PlayerAnswers::RoundId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_answer_votes_answer_id")
                    .table(AnswerVotes::Table)
                    .col(AnswerVotes::AnswerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(RoundScores::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CategoryVotes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AnswerVotes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(PlayerAnswers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rounds::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GameCategories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GameParticipants::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(RoomParticipants::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GameRooms::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    Name,
    SessionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GameRooms {
    Table,
    Id,
    RoomCode,
    Name,
    MaxPlayers,
    CurrentPlayers,
    Status,
    CreatedBySessionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RoomParticipants {
    Table,
    Id,
    RoomId,
    PlayerId,
    PlayerName,
    IsReady,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    RoomId,
    Status,
    CurrentRound,
    MaxRounds,
    RoundDuration,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GameParticipants {
    Table,
    Id,
    GameId,
    PlayerId,
    PlayerName,
    TotalScore,
    HasStopped,
    StoppedAt,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    IsActive,
}

#[derive(DeriveIden)]
enum GameCategories {
    Table,
    Id,
    GameId,
    CategoryId,
    Position,
}

#[derive(DeriveIden)]
enum Rounds {
    Table,
    Id,
    GameId,
    RoundNumber,
    Letter,
    Duration,
    Status,
    StartTime,
    EndTime,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlayerAnswers {
    Table,
    Id,
    RoundId,
    PlayerId,
    PlayerName,
    CategoryId,
    Answer,
    VotesFor,
    VotesAgainst,
    IsValid,
    IsDuplicate,
    Points,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum AnswerVotes {
    Table,
    Id,
    AnswerId,
    PlayerId,
    IsValid,
    IsDuplicate,
    VotedAt,
}

#[derive(DeriveIden)]
enum CategoryVotes {
    Table,
    Id,
    GameId,
    PlayerId,
    CategoryIndex,
    IsReady,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RoundScores {
    Table,
    Id,
    RoundId,
    PlayerId,
    BasePoints,
    BonusPoints,
    TotalPoints,
    Position,
    CreatedAt,
}
