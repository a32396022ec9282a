pub mod players;
pub mod game_rooms;
pub mod room_participants;
pub mod games;
pub mod game_participants;
pub mod categories;
pub mod game_categories;
pub mod rounds;
pub mod player_answers;
pub mod answer_votes;
pub mod category_votes;
pub mod round_scores;

pub use players::Entity as Players;
pub use game_rooms::Entity as GameRooms;
pub use room_participants::Entity as RoomParticipants;
pub use games::Entity as Games;
pub use game_participants::Entity as GameParticipants;
pub use categories::Entity as Categories;
pub use game_categories::Entity as GameCategories;
pub use rounds::Entity as Rounds;
pub use player_answers::Entity as PlayerAnswers;
pub use answer_votes::Entity as AnswerVotes;
pub use category_votes::Entity as CategoryVotes;
pub use round_scores::Entity as RoundScores;
