use nova_core::GameId;
use nova_core::NUM_PLAYERS;
use nova_core::Slot;
use nova_game::Game;
use nova_game::GameState;
use nova_game::Result;
use nova_game::Root;
use nova_game::TurnState;
use nova_game::unpack_score;
use nova_game::unpack_turn_status;

/// Close a slot whose last primary player just left, if the position is
/// dead: running game, no published score or score at zero.
///
/// Reads the score of the current turn number; a kick racing a score
/// publication can misjudge a slot. Accepted, see the design notes.
pub fn drop_slot_if_dead(game: &Game, slot: Slot) -> Result<bool> {
    let mut dead = false;
    if game.state()? == GameState::Running {
        let packed = game.turn(game.turn_number()).scores("timscore");
        if slot <= 0 || unpack_score(&packed, slot).map(|s| s <= 0).unwrap_or(true) {
            dead = true;
        }
    }
    if dead {
        game.set_slot_status(slot, 0);
    }
    Ok(dead)
}

/// Kick players that sat out the last N turns.
///
/// A slot is kicked when it never submitted a non-missing turn over the
/// window and the same primary player held it throughout. All
/// subscribers of the slot are dropped; a slot without a score is then
/// closed as dead.
pub fn process_inactivity_kicks(root: &Root, game_id: GameId) -> Result<()> {
    let game = Game::open(root, game_id)?;
    let turn_limit = game
        .num_missed_turns_for_kick()
        .unwrap_or(root.config().num_missed_turns_for_kick);
    if turn_limit <= 0 {
        return Ok(());
    }
    let turn_number = game.turn_number();
    if turn_number < turn_limit + 1 {
        return Ok(());
    }

    // Slots with a primary player.
    let mut candidates: Vec<(Slot, String)> = (1..=NUM_PLAYERS as Slot)
        .filter(|slot| game.slot_status(*slot) != 0)
        .filter_map(|slot| game.primary_player(slot).map(|user| (slot, user)))
        .collect();

    // Remove everyone who submitted anything, or whose slot changed hands.
    for turn_nr in turn_number - turn_limit + 1..=turn_number {
        let turn = game.turn(turn_nr);
        let statuses = turn.turn_statuses();
        candidates.retain(|(slot, primary)| {
            let status = unpack_turn_status(&statuses, *slot).unwrap_or(0) as i32;
            status == TurnState::Missing.to_wire() && turn.player_id(*slot) == *primary
        });
        if candidates.is_empty() {
            return Ok(());
        }
    }

    for (slot, _) in &candidates {
        log::info!("[cron] game {}: kicking slot {} for inactivity", game_id, slot);
        let mut user = String::new();
        while let Some(popped) = game.pop_player_slot(*slot) {
            user = popped;
        }
        let dead = drop_slot_if_dead(&game, *slot)?;
        let what = if dead { "game-resign-dead" } else { "game-kick" };
        game.add_user_history_item(what, &format!("{}:{}", user, slot), &user);
    }
    if !candidates.is_empty() {
        root.handle_game_change(game_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::Store;

    fn create_running_game(root: &Root, id: GameId, turn: i32) {
        let store = root.store();
        store.sadd("game:all", &id.to_string());
        store.set(&format!("game:{}:state", id), b"running");
        store.set(&format!("game:{}:type", id), b"public");
        let game = Game::open_unchecked(root, id);
        for slot in 1..=NUM_PLAYERS as Slot {
            game.set_slot_status(slot, 1);
        }
        game.set_config_int("turn", turn as i64);
    }

    fn record_turn(game: &Game, turn_nr: i32, missing: &[Slot], primary: &str, slot: Slot) {
        let turn = game.turn(turn_nr);
        let mut statuses = [TurnState::Green.to_wire() as i16; NUM_PLAYERS];
        for s in missing {
            statuses[*s as usize - 1] = TurnState::Missing.to_wire() as i16;
        }
        turn.set_turn_statuses(&statuses);
        turn.set_player_id(slot, primary);
    }

    #[test]
    fn kicks_a_slot_that_never_submitted() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 8);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1001");
        game.set_config_int("numMissedTurnsForKick", 3);
        for turn_nr in 6..=8 {
            record_turn(&game, turn_nr, &[3], "1001", 3);
        }
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(!game.is_slot_played(3));
        // No score published: the slot is closed as dead.
        assert_eq!(game.slot_status(3), 0);
        assert!(
            game.history(5)
                .iter()
                .any(|item| item.contains("game-resign-dead"))
        );
    }

    #[test]
    fn submitting_one_turn_in_the_window_saves_the_slot() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 8);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1001");
        game.set_config_int("numMissedTurnsForKick", 3);
        record_turn(&game, 6, &[3], "1001", 3);
        record_turn(&game, 7, &[], "1001", 3);
        record_turn(&game, 8, &[3], "1001", 3);
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(game.is_slot_played(3));
    }

    #[test]
    fn replacement_resets_the_window() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 8);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1002");
        game.set_config_int("numMissedTurnsForKick", 3);
        // The slot was missing throughout, but a different player held
        // it at the start of the window.
        record_turn(&game, 6, &[3], "1001", 3);
        record_turn(&game, 7, &[3], "1002", 3);
        record_turn(&game, 8, &[3], "1002", 3);
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(game.is_slot_played(3));
    }

    #[test]
    fn young_games_are_exempt() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 3);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1001");
        game.set_config_int("numMissedTurnsForKick", 3);
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(game.is_slot_played(3));
    }

    #[test]
    fn kick_limit_zero_disables_kicks() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 20);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1001");
        game.set_config_int("numMissedTurnsForKick", 0);
        for turn_nr in 18..=20 {
            record_turn(&game, turn_nr, &[3], "1001", 3);
        }
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(game.is_slot_played(3));
    }

    #[test]
    fn kicked_slot_with_score_stays_open() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 7, 8);
        let game = Game::open(&root, 7).unwrap();
        game.push_player_slot(3, "1001");
        game.set_config_int("numMissedTurnsForKick", 3);
        for turn_nr in 6..=8 {
            record_turn(&game, turn_nr, &[3], "1001", 3);
        }
        let mut scores = [0; NUM_PLAYERS];
        scores[2] = 55;
        game.turn(8).set_scores("timscore", &scores);
        process_inactivity_kicks(&root, 7).unwrap();
        assert!(!game.is_slot_played(3));
        assert_eq!(game.slot_status(3), 1);
        assert!(game.history(5).iter().any(|item| item.contains("game-kick")));
    }

    #[test]
    fn drop_slot_if_dead_checks_the_score() {
        let root = Root::for_testing(1000);
        create_running_game(&root, 9, 5);
        let game = Game::open(&root, 9).unwrap();
        let mut scores = [0; NUM_PLAYERS];
        scores[0] = 10;
        game.turn(5).set_scores("timscore", &scores);
        assert!(!drop_slot_if_dead(&game, 1).unwrap());
        assert_eq!(game.slot_status(1), 1);
        assert!(drop_slot_if_dead(&game, 2).unwrap());
        assert_eq!(game.slot_status(2), 0);
    }
}
