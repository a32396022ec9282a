use stop_backend::bootstrap::GameConfig;
use stop_backend::engine::{answers, players, progression, rooms, rounds, voting};
use stop_backend::test_support::common::test_bootstrap;
use uuid::Uuid;

fn session() -> String {
    format!("sess-{}", Uuid::new_v4())
}

fn code() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_uppercase()
}

/// Three players, one full round driven through the engine directly:
/// a full sheet earns the completion bonus, a rejected answer earns
/// nothing, and equal totals share a standings position.
#[actix_web::test]
async fn full_sheet_earns_bonus_and_ties_share_position() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let config = GameConfig {
        default_max_rounds: 1,
        round_duration_secs: 60,
    };

    let ana = players::create_player(&db, "Ana", &session()).await?;
    let bruno = players::create_player(&db, "Bruno", &session()).await?;
    let carla = players::create_player(&db, "Carla", &session()).await?;

    let room = rooms::create_room(&db, &code(), "Engine room", 3, &ana.session_id).await?;
    for p in [&ana, &bruno, &carla] {
        rooms::join_room(&db, &room.room_code, p.id, &p.name).await?;
    }

    let game = rounds::create_game(&db, &config, room.id, ana.id, None).await?;
    let categories = rounds::get_game_categories(&db, game.id).await?;
    assert_eq!(categories.len(), 9);

    let round = rounds::get_current_round(&db, game.id)
        .await?
        .expect("round one is created with the game");
    let round_id = round.round.id;
    rounds::start_round(&db, round_id).await?;

    // Ana fills the whole sheet; Bruno answers only the first category
    for category in &categories {
        answers::save_answer(&db, round_id, ana.id, &ana.name, category.id, "resposta").await?;
    }
    let bruno_answer = answers::save_answer(
        &db,
        round_id,
        bruno.id,
        &bruno.name,
        categories[0].id,
        "resposta",
    )
    .await?;

    progression::stop_game_for_all(&db, game.id).await?;
    assert!(progression::check_all_players_stopped(&db, game.id).await?);

    // Everyone accepts all of Ana's answers; Bruno's is voted down 2 to 1
    for answer in answers::get_round_answers(&db, round_id).await? {
        if answer.player_id == ana.id {
            for voter in [&ana, &bruno, &carla] {
                voting::vote_on_answer(&db, answer.id, voter.id, true).await?;
            }
        }
    }
    voting::vote_on_answer(&db, bruno_answer.id, bruno.id, true).await?;
    voting::vote_on_answer(&db, bruno_answer.id, ana.id, false).await?;
    let settled = voting::vote_on_answer(&db, bruno_answer.id, carla.id, false).await?;
    assert_eq!(settled.is_valid, Some(false));
    assert_eq!(settled.points, 0);
    assert_eq!(settled.votes_for, 1);
    assert_eq!(settled.votes_against, 2);

    let scores = progression::complete_round(&db, round_id).await?;
    let ana_score = scores.iter().find(|s| s.player_id == ana.id).unwrap();
    assert_eq!(ana_score.base_points, 90);
    assert_eq!(ana_score.bonus_points, 5);
    assert_eq!(ana_score.total_points, 95);
    assert_eq!(ana_score.position, 1);

    // Bruno and Carla both closed the round on zero and share second place
    let bruno_score = scores.iter().find(|s| s.player_id == bruno.id).unwrap();
    let carla_score = scores.iter().find(|s| s.player_id == carla.id).unwrap();
    assert_eq!(bruno_score.total_points, 0);
    assert_eq!(bruno_score.position, 2);
    assert_eq!(carla_score.position, 2);

    assert_eq!(
        progression::get_player_total_score(&db, game.id, ana.id).await?,
        95
    );

    // Running the settlement again lands on the same numbers
    let again = progression::complete_round(&db, round_id).await?;
    let ana_again = again.iter().find(|s| s.player_id == ana.id).unwrap();
    assert_eq!(ana_again.total_points, 95);
    assert_eq!(
        progression::get_player_total_score(&db, game.id, ana.id).await?,
        95
    );

    let standings = progression::finalize_game(&db, game.id).await?;
    assert_eq!(standings[0].player_id, ana.id);
    assert_eq!(standings[0].total_score, 95);

    Ok(())
}

/// Removal is host-gated: a guest cannot evict another player, the host
/// can, and a player may always leave on their own.
#[actix_web::test]
async fn participant_removal_is_host_gated() -> anyhow::Result<()> {
    let db = test_bootstrap().await;

    let host = players::create_player(&db, "Host", &session()).await?;
    let guest = players::create_player(&db, "Guest", &session()).await?;
    let other = players::create_player(&db, "Other", &session()).await?;

    let room = rooms::create_room(&db, &code(), "Gated room", 4, &host.session_id).await?;
    for p in [&host, &guest, &other] {
        rooms::join_room(&db, &room.room_code, p.id, &p.name).await?;
    }

    let err = rooms::remove_participant(&db, room.id, other.id, guest.id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("host"));

    rooms::remove_participant(&db, room.id, other.id, host.id).await?;
    rooms::remove_participant(&db, room.id, guest.id, guest.id).await?;

    let remaining = rooms::get_participants(&db, room.id).await?;
    assert_eq!(remaining.len(), 1);
    let room = rooms::get_room_by_code(&db, &room.room_code).await?.unwrap();
    assert_eq!(room.current_players, 1);

    Ok(())
}
