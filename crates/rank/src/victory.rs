//! Victory recognition and end-of-game ranking.
//!
//! Built-in end conditions ("turn" with decaying probability, "score"
//! held over a window of turns), the forced-end approximation, and the
//! rank-point computation that feeds the level handler after a game
//! ends.

use crate::LevelHandler;
use nova_core::NUM_PLAYERS;
use nova_core::PlayerSet;
use nova_core::Rng;
use nova_core::Slot;
use nova_core::Turn;
use nova_game::Game;
use nova_game::Root;
use nova_game::TURN_STATE_MASK;
use nova_game::TurnState;
use nova_game::unpack_score;
use nova_game::unpack_turn_status;
use nova_game::User;
use nova_store::StoreExt;
use std::collections::BTreeMap;

/// Per-slot rank scratch array.
pub type RankArray = [i64; NUM_PLAYERS];

/// Placement points by final rank; everyone below eighth gets 1.
const POSITION_POINTS: [i64; 8] = [20, 14, 10, 8, 6, 4, 3, 2];

pub fn init_ranks(value: i64) -> RankArray {
    [value; NUM_PLAYERS]
}

/// Compact raw scores into 1-based placements.
///
/// Lower key is better; ties break by lower tiebreak, and slots equal in
/// both share a placement. Slots outside `players` get placement 0.
pub fn compact_ranks(keys: &RankArray, tiebreak: &RankArray, players: PlayerSet) -> RankArray {
    let mut result = [0i64; NUM_PLAYERS];
    let mut order: Vec<usize> = (0..NUM_PLAYERS)
        .filter(|i| players.contains(*i as i32 + 1))
        .collect();
    order.sort_by_key(|i| (keys[*i], tiebreak[*i]));
    let mut place = 0;
    let mut previous: Option<(i64, i64)> = None;
    for (position, slot) in order.iter().enumerate() {
        let key = (keys[*slot], tiebreak[*slot]);
        if previous != Some(key) {
            place = position as i64 + 1;
            previous = Some(key);
        }
        result[*slot] = place;
    }
    result
}

/// Store placements on the game's slots.
fn save_ranks(ranks: &RankArray, game: &Game) {
    let slots = game.game_slots();
    let null = init_ranks(0);
    let compacted = compact_ranks(ranks, &null, slots);
    for slot in 1..=NUM_PLAYERS as Slot {
        if slots.contains(slot) {
            game.set_slot_rank(slot, compacted[slot as usize - 1] as i32);
        } else {
            game.set_slot_rank(slot, 0);
        }
    }
}

/// Rank everyone by the referee score of the current turn.
fn save_score_ranks(game: &Game) {
    let turn = game.turn_number();
    let packed = game.turn(turn).scores(&game.referee_score_name());
    let mut ranks = init_ranks(i64::from(i32::MAX));
    for slot in 1..=NUM_PLAYERS as Slot {
        if let Some(score) = unpack_score(&packed, slot) {
            // Negate: a high score is a good (low) rank.
            ranks[slot as usize - 1] = -(score as i64);
        }
    }
    save_ranks(&ranks, game);
}

/// Scan a turn window for the score condition: how many consecutive
/// turns each player has held the target score, and the latest scores.
fn compute_score_condition(
    game: &Game,
    from_turn: Turn,
    to_turn: Turn,
    players: PlayerSet,
) -> (RankArray, RankArray) {
    let end_score = game.get_config_int("endScore");
    let score_name = game.referee_score_name();
    let mut turns = init_ranks(0);
    let mut scores = init_ranks(0);
    for turn in from_turn..=to_turn {
        let packed = game.turn(turn).scores(&score_name);
        for slot in 1..=NUM_PLAYERS as Slot {
            if !players.contains(slot) {
                continue;
            }
            let score = unpack_score(&packed, slot).unwrap_or(0) as i64;
            scores[slot as usize - 1] = score;
            if score >= end_score {
                // Negated count, so it can be used as a rank key.
                turns[slot as usize - 1] -= 1;
            } else {
                turns[slot as usize - 1] = 0;
            }
        }
    }
    (turns, scores)
}

/// "score" condition: the game ends when someone has held the target
/// score for the configured number of turns.
fn check_score_condition(game: &Game) -> bool {
    let turn = game.turn_number();
    let end_turn = game.get_config_int("endTurn").max(1) as Turn;
    if turn < end_turn {
        return false;
    }
    let players = game.game_slots();
    let (turns, scores) = compute_score_condition(game, turn - end_turn + 1, turn, players);
    if !turns.iter().any(|t| -t >= end_turn as i64) {
        return false;
    }
    log::info!("[victory] game {}: 'score' condition ends game", game.id());
    let ranks = compact_ranks(&turns, &scores.map(|s| -s), players);
    save_ranks(&ranks, game);
    true
}

/// "turn" condition: the game ends at a fixed turn, optionally stretched
/// by a die roll whose odds tighten every turn past the limit.
fn check_turn_condition(game: &Game, rng: &mut Rng) -> bool {
    let turn = game.turn_number();
    let end_turn = game.get_config_int("endTurn") as Turn;
    if turn < end_turn {
        return false;
    }
    let probability = game.get_config_int("endProbability");
    let effective = probability * (2 + turn as i64 - end_turn as i64) / 2;
    if effective <= 0 || effective >= 100 || (rng.below(100) as i64) < effective {
        log::info!("[victory] game {}: 'turn' condition ends game", game.id());
        save_score_ranks(game);
        true
    } else {
        log::info!(
            "[victory] game {}: 'turn' condition continues game, probability {}",
            game.id(),
            effective
        );
        false
    }
}

/// Check the configured end condition; stores final slot ranks and
/// returns true when the game is over.
pub fn check_victory(game: &Game, rng: &mut Rng) -> bool {
    match game.get_config("endCondition").as_str() {
        "turn" => check_turn_condition(game, rng),
        "score" => check_score_condition(game),
        _ => false,
    }
}

/// Rank a game that is being ended by force (owner or admin). Uses the
/// best approximation available for the configured condition.
pub fn check_forced_game_end(game: &Game) {
    let turn = game.turn_number();
    if turn <= 0 {
        // No scores yet; everyone ties.
        save_ranks(&init_ranks(i64::from(i32::MAX)), game);
    } else if game.get_config("endCondition") == "score" {
        let end_turn = game.get_config_int("endTurn").max(1) as Turn;
        let from = (turn - end_turn + 1).max(1);
        let players = game.game_slots();
        let (turns, scores) = compute_score_condition(game, from, turn, players);
        let ranks = compact_ranks(&turns, &scores.map(|s| -s), players);
        save_ranks(&ranks, game);
    } else {
        save_score_ranks(game);
    }
}

#[derive(Default)]
struct PlayerInfo {
    turns_total: i64,
    turns_played: i64,
    rank_level: i64,
    turns_in_slot: [i64; NUM_PLAYERS],
}

/// Compute and award rank points after a game end.
///
/// Walks the whole game history: who played which slot for how long and
/// how reliably, weighted by game difficulty, final placement, and the
/// strength of the beaten opponents. Points are a lifetime maximum per
/// game; replacements earn in proportion to the turns they actually
/// played. All arithmetic is 64-bit scaled-integer.
pub fn compute_game_rankings(root: &Root, game: &Game) {
    let current_turn = game.turn_number();
    let mut players: BTreeMap<String, PlayerInfo> = BTreeMap::new();
    let mut sum_of_rank_levels = [0i64; NUM_PLAYERS];
    let mut last_turn_seen = [0i64; NUM_PLAYERS];

    // Start at turn 2: everyone "misses" turn 1, and players who resign
    // during it never registered for the game.
    log::info!(
        "[victory] computing ranks for game {}, {} turns",
        game.id(),
        current_turn
    );
    for turn_nr in 2..=current_turn {
        let turn = game.turn(turn_nr);
        let statuses = turn.turn_statuses();
        for slot in 1..=NUM_PLAYERS as Slot {
            let Some(raw) = unpack_turn_status(&statuses, slot) else {
                continue;
            };
            if raw < 0 {
                continue;
            }
            let state = TurnState::from_wire(raw as i32 & TURN_STATE_MASK);
            let player = turn.player_id(slot);
            if player.is_empty() {
                continue;
            }
            let info = players.entry(player.clone()).or_insert_with(|| PlayerInfo {
                rank_level: User::new(root, &player).rank() + 1,
                ..PlayerInfo::default()
            });
            sum_of_rank_levels[slot as usize - 1] += info.rank_level;
            last_turn_seen[slot as usize - 1] = turn_nr as i64;
            if matches!(
                state,
                Some(TurnState::Yellow) | Some(TurnState::Green) | Some(TurnState::Dead)
            ) {
                info.turns_played += 1;
            }
            info.turns_total += 1;
            info.turns_in_slot[slot as usize - 1] += 1;
        }
    }

    // Referee placements, tie-broken by how long the slot survived.
    let mut ref_ranks = init_ranks(i64::from(i32::MAX));
    for slot in 1..=NUM_PLAYERS as Slot {
        let value = game.slot_rank(slot);
        if value != 0 {
            ref_ranks[slot as usize - 1] = value as i64;
        }
    }
    let final_ranks = compact_ranks(&ref_ranks, &last_turn_seen.map(|t| -t), PlayerSet::all());

    // Game weight: difficulty, scaled down for short games.
    let difficulty = match game.get_config_int("difficulty") {
        0 => 100,
        d => d,
    };
    let (turn_factor_num, turn_factor_den) = if current_turn < 50 {
        (current_turn as i64, 50)
    } else {
        (1, 1)
    };

    let handler = LevelHandler::new(root);
    for (user, info) in &players {
        let mut new_points = 0i64;
        let mut used_slot = 0;
        for slot in 1..=NUM_PLAYERS {
            if info.turns_in_slot[slot - 1] == 0 {
                continue;
            }
            let slot_rank = final_ranks[slot - 1];
            let position_points = if (1..=POSITION_POINTS.len() as i64).contains(&slot_rank) {
                POSITION_POINTS[slot_rank as usize - 1]
            } else {
                1
            };

            // Beaten opposition, weighted by their ranks over the game.
            let mut num_opponents = 0i64;
            let mut sum_ranks_of_opponents = 0i64;
            for i in 0..NUM_PLAYERS {
                if final_ranks[i] > slot_rank {
                    num_opponents += 1;
                    sum_ranks_of_opponents += sum_of_rank_levels[i];
                }
            }

            // points = 100 * difficulty/100 * turn_factor * position
            //          * (sumOpp/turn + 110) / ((level*opps + 110) * turn
            //          / turnsInSlot) * (played/total)^2
            // evaluated at scale 1000 on the rate numerator.
            let rate_num = sum_ranks_of_opponents * 1000 / current_turn as i64 + 110_000;
            let rate_den = (info.rank_level * num_opponents + 110) * current_turn as i64;
            let numerator = difficulty
                * turn_factor_num
                * position_points
                * rate_num
                * info.turns_in_slot[slot - 1]
                * info.turns_played
                * info.turns_played;
            let denominator = turn_factor_den
                * rate_den
                * 1000
                * info.turns_total
                * info.turns_total;
            let points = (numerator + denominator / 2) / denominator;
            if points > new_points {
                new_points = points;
                used_slot = slot;
            }
        }

        let old_points = root.store().hget_int(&game.rank_points_key(), user);
        log::info!(
            "[victory]   slot {:2}, {:5} points (was {:5}), user {}",
            used_slot,
            new_points,
            old_points,
            user
        );
        root.store()
            .hset_int(&game.rank_points_key(), user, new_points);
        handler.add_player_rank_points(user, new_points - old_points);
    }
    for user in players.keys() {
        handler.handle_player_rank_changes(user);
    }
    game.set_config_int("rankTurn", current_turn as i64);
    log::info!("[victory] ranking done");
}
