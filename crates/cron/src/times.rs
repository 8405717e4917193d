use crate::Action;
use crate::Event;
use nova_core::GameId;
use nova_core::MASTER_DELAY;
use nova_core::NUM_PLAYERS;
use nova_core::SCHEDULE_CHANGE_GRACE;
use nova_core::Slot;
use nova_core::Time;
use nova_core::UserTime;
use nova_core::to_user_time;
use nova_game::Game;
use nova_game::GameState;
use nova_game::Result;
use nova_game::Root;
use nova_game::is_turn_in;
use nova_schedule::Schedule;
use nova_schedule::ScheduleStack;

/// True if every subscribed, live slot has a real (non-temporary) turn.
/// Unplayed slots do not count; a game with no played slots never
/// qualifies.
fn all_turns_in(game: &Game) -> bool {
    let mut any = false;
    for slot in 1..=NUM_PLAYERS as Slot {
        if !game.is_slot_in_game(slot) || !game.is_slot_played(slot) {
            continue;
        }
        any = true;
        if !is_turn_in(game.slot_turn_status(slot)) {
            return false;
        }
    }
    any
}

/// The active (first non-expired) schedule, and whether any expired
/// entries precede it in the stack.
fn active_schedule(
    game: &Game,
    root: &Root,
    turn: i32,
    current_time: Time,
) -> (Option<Schedule>, bool) {
    let stack = ScheduleStack::new(game.schedule_base());
    let mut have_dropped = false;
    for id in stack.ids(root.store()) {
        let schedule = stack.load(root.store(), &id);
        if schedule.is_expired(turn, current_time) {
            have_dropped = true;
        } else {
            return (Some(schedule), have_dropped);
        }
    }
    (None, have_dropped)
}

/// Compute the next scheduler event of one game, if any.
///
/// This is the scheduling state machine: master runs for joining and
/// freshly started games, the schedule merge for running games, nothing
/// for everything else. Pure with respect to the store; executing the
/// returned event is the cron worker's job.
pub fn compute_game_times(now: Time, root: &Root, game_id: GameId) -> Result<Option<Event>> {
    let game = Game::open_unchecked(root, game_id);
    match game.state()? {
        GameState::Preparing | GameState::Finished | GameState::Deleted => Ok(None),
        GameState::Joining => {
            if game.has_any_open_slot() {
                return Ok(None);
            }
            let time = game
                .last_player_joined()
                .map(|t| t + MASTER_DELAY)
                .unwrap_or(now);
            Ok(Some(Event::new(Action::Master, game_id, time)))
        }
        GameState::Running => compute_running(now, root, &game),
    }
}

/// The running-game merge: schedule stack, early host, and triggers.
fn compute_running(now: Time, root: &Root, game: &Game) -> Result<Option<Event>> {
    let game_id = game.id();
    let turn = game.turn_number();
    if turn == 0 {
        // The master (turn-zero generator) has not run yet.
        return Ok(Some(Event::new(Action::Master, game_id, now)));
    }
    let mut last_host = game.last_host_time();
    if last_host == 0 {
        // A running game must have hosted at least once; catch up now.
        return Ok(Some(Event::new(Action::Host, game_id, now)));
    }

    let current_time = last_host.max(now);
    let (current, have_dropped) = active_schedule(game, root, turn, current_time);
    let Some(current) = current else {
        // Only expired schedules left (if any): have the worker prune them.
        return Ok(have_dropped.then(|| Event::new(Action::ScheduleChange, game_id, now)));
    };

    // Explicit trigger beats everything.
    if game.host_run_now() {
        return Ok(Some(Event::new(Action::Host, game_id, now)));
    }

    // Early host once all turns are in; quick schedules host this way
    // and only this way.
    let early = (current.host_early || current.kind == nova_schedule::ScheduleKind::Quick)
        && all_turns_in(game);
    let mut result = if early {
        Some(game.last_turn_submitted() + current.host_delay)
    } else {
        let mut next = current.next_host(last_host);
        if have_dropped {
            // A slow schedule just fell off; do not treat its stale
            // last-host time as overdue under the new cadence.
            if let (Some(n), Some(virtual_host)) =
                (next, current.previous_virtual_host(current_time))
            {
                if n < virtual_host && virtual_host > last_host {
                    last_host = virtual_host;
                    next = current.next_host(last_host);
                }
            }
        }
        next
    };

    // A host never fires in the past, and never hot on the heels of a
    // schedule edit.
    if let Some(time) = result.as_mut() {
        if *time < now {
            *time = now;
        }
        let grace = game.last_schedule_change() + SCHEDULE_CHANGE_GRACE;
        if game.last_schedule_change() > 0 && grace > *time {
            *time = grace;
        }
    }

    // A timed expiration preempts a host scheduled after it.
    let change_time = current.expiration_time();
    Ok(match (result, change_time) {
        (Some(host), Some(change)) if change < host => {
            Some(Event::new(Action::ScheduleChange, game_id, change))
        }
        (Some(host), _) => Some(Event::new(Action::Host, game_id, host)),
        (None, Some(change)) => Some(Event::new(Action::ScheduleChange, game_id, change)),
        (None, None) => None,
    })
}

/// Drop expired schedules from the stack, re-anchoring the last host
/// time on the successor schedule. Called by the worker when it executes
/// an event for the game.
pub fn prune_expired_schedules(now: Time, root: &Root, game: &Game) {
    let stack = ScheduleStack::new(game.schedule_base());
    let turn = game.turn_number();
    let current_time = game.last_host_time().max(now);
    let mut have_dropped = false;
    while let Some((id, schedule)) = stack.front(root.store()) {
        if !schedule.is_expired(turn, current_time) {
            break;
        }
        stack.drop_front(root.store());
        have_dropped = true;
        log::info!("[cron] game {}: schedule {} expired", game.id(), id);
    }
    if !have_dropped {
        return;
    }
    game.set_schedule_changed(true);
    let last_host = game.last_host_time();
    if last_host > 0 {
        if let Some((_, successor)) = stack.front(root.store()) {
            if let Some(virtual_host) = successor.previous_virtual_host(current_time) {
                if virtual_host > last_host {
                    game.set_config_int("lastHostTime", virtual_host as i64);
                }
            }
        }
    }
    root.handle_game_change(game.id());
}

/// Walk a game's schedules forward in virtual time, producing up to
/// `turn_limit` future host times (user time). The first element is a
/// pretended immediate host when the game never hosted. `time_limit` is
/// relative to now.
pub fn preview_schedule(
    now: Time,
    root: &Root,
    game: &Game,
    time_limit: Option<Time>,
    turn_limit: i32,
) -> Vec<UserTime> {
    let mut result = Vec::new();
    if turn_limit <= 0 {
        return result;
    }
    let scale = root.config().user_time_scale;
    let absolute_limit = time_limit.map(|t| t + now);
    let stack = ScheduleStack::new(game.schedule_base());
    let ids = stack.ids(root.store());
    let mut index = 0;

    let mut turn = game.turn_number();
    let mut last_host = game.last_host_time();
    if last_host == 0 || turn == 0 {
        // Host never ran; pretend it runs now.
        last_host = now;
        turn += 1;
        result.push(to_user_time(last_host, scale));
    }
    let mut current_time = last_host.max(now);

    while (result.len() as i32) < turn_limit
        && absolute_limit.map(|limit| limit > last_host).unwrap_or(true)
    {
        // Skip expired schedules.
        let mut current = None;
        let mut have_dropped = false;
        while index < ids.len() {
            let schedule = stack.load(root.store(), &ids[index]);
            if schedule.is_expired(turn, current_time) {
                index += 1;
                have_dropped = true;
            } else {
                current = Some(schedule);
                break;
            }
        }
        let Some(current) = current else {
            break;
        };

        let change_time = current.expiration_time().unwrap_or(0);
        let mut next = current.next_host(last_host);
        if have_dropped && last_host > 0 {
            if let (Some(n), Some(virtual_host)) =
                (next, current.previous_virtual_host(current_time))
            {
                if n < virtual_host && virtual_host > last_host {
                    last_host = virtual_host;
                    next = current.next_host(last_host);
                }
            }
        }
        let next = next.map(|n| n.max(current_time)).unwrap_or(0);

        // Generate exactly one event per iteration.
        if next > 0 && (change_time == 0 || next <= change_time) {
            turn += 1;
            result.push(to_user_time(next, scale));
            last_host = next;
            current_time = next;
        } else if change_time > 0 && (next == 0 || change_time < next) {
            current_time = change_time;
        } else {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::MINUTES_PER_DAY;
    use nova_game::TURN_IS_TEMPORARY;
    use nova_game::TurnState;
    use nova_store::Store;
    use nova_store::StoreExt;

    const MPD: Time = MINUTES_PER_DAY;

    fn create_game(root: &Root, id: GameId, state: GameState) {
        let store = root.store();
        store.sadd("game:all", &id.to_string());
        store.set(&format!("game:{}:name", id), b"Test Game");
        store.set(&format!("game:{}:state", id), state.format().as_bytes());
        store.set(&format!("game:{}:type", id), b"public");
        store.sadd(&format!("game:state:{}", state.format()), &id.to_string());
        let game = Game::open_unchecked(root, id);
        for slot in 1..=NUM_PLAYERS as Slot {
            game.set_slot_status(slot, 1);
            game.set_slot_turn_status(slot, 0);
        }
    }

    fn add_player(root: &Root, id: GameId, slot: Slot, user: i32) {
        Game::open_unchecked(root, id).push_player_slot(slot, &user.to_string());
    }

    fn set_turn_state(root: &Root, id: GameId, slot: Slot, state: i32) {
        Game::open_unchecked(root, id).set_slot_turn_status(slot, state);
    }

    fn set_game_config(root: &Root, id: GameId, key: &str, value: i64) {
        Game::open_unchecked(root, id).set_config_int(key, value);
    }

    fn set_schedule(root: &Root, id: GameId, sid: i32, key: &str, value: i64) {
        root.store()
            .hset_int(&format!("game:{}:schedule:{}", id, sid), key, value);
    }

    fn add_schedule(root: &Root, id: GameId, sid: i32) {
        root.store()
            .lpush(&format!("game:{}:schedule:list", id), sid.to_string().as_bytes());
    }

    fn compute(root: &Root, now: Time, id: GameId) -> Option<Event> {
        compute_game_times(now, root, id).unwrap()
    }

    #[test]
    fn joining_without_players_produces_nothing() {
        let root = Root::for_testing(105);
        create_game(&root, 37, GameState::Joining);
        set_game_config(&root, 37, "lastPlayerJoined", 100);
        assert_eq!(compute(&root, 105, 37), None);
    }

    #[test]
    fn joining_full_game_schedules_master() {
        let root = Root::for_testing(105);
        create_game(&root, 37, GameState::Joining);
        set_game_config(&root, 37, "lastPlayerJoined", 100);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 37, slot, 600 + slot);
        }
        // lastPlayerJoined + MASTER_DELAY.
        assert_eq!(
            compute(&root, 105, 37),
            Some(Event::new(Action::Master, 37, 115))
        );
    }

    #[test]
    fn joining_full_game_without_timestamp_masters_now() {
        let root = Root::for_testing(108);
        create_game(&root, 37, GameState::Joining);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 37, slot, 600 + slot);
        }
        assert_eq!(
            compute(&root, 108, 37),
            Some(Event::new(Action::Master, 37, 108))
        );
    }

    #[test]
    fn preparing_and_finished_produce_nothing() {
        let root = Root::for_testing(108);
        for (id, state) in [(200, GameState::Preparing), (500, GameState::Finished)] {
            create_game(&root, id, state);
            set_game_config(&root, id, "lastPlayerJoined", 100);
            for slot in 1..=NUM_PLAYERS as Slot {
                add_player(&root, id, slot, 600 + slot);
                set_turn_state(&root, id, slot, TurnState::Green.to_wire());
            }
            assert_eq!(compute(&root, 108, id), None);
        }
    }

    #[test]
    fn running_game_without_master_masters_now() {
        let root = Root::for_testing(105);
        create_game(&root, 257, GameState::Running);
        assert_eq!(
            compute(&root, 105, 257),
            Some(Event::new(Action::Master, 257, 105))
        );
    }

    #[test]
    fn running_game_that_never_hosted_hosts_now() {
        let root = Root::for_testing(105);
        create_game(&root, 257, GameState::Running);
        set_game_config(&root, 257, "turn", 3);
        assert_eq!(
            compute(&root, 105, 257),
            Some(Event::new(Action::Host, 257, 105))
        );
    }

    #[test]
    fn running_game_without_schedule_produces_nothing() {
        let root = Root::for_testing(108);
        create_game(&root, 500, GameState::Running);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 500, slot, 600 + slot);
            set_turn_state(&root, 500, slot, TurnState::Green.to_wire());
        }
        set_game_config(&root, 500, "turn", 30);
        set_game_config(&root, 500, "lastHostTime", 20);
        assert_eq!(compute(&root, 108, 500), None);
    }

    #[test]
    fn weekly_normal() {
        let root = Root::for_testing(200);
        create_game(&root, 7, GameState::Running);
        set_game_config(&root, 7, "turn", 3);
        set_game_config(&root, 7, "lastHostTime", (500 * MPD + 400 + 3) as i64);
        set_schedule(&root, 7, 3, "type", 1);
        set_schedule(&root, 7, 3, "interval", 4);
        set_schedule(&root, 7, 3, "daytime", 400);
        set_schedule(&root, 7, 3, "hostLimit", 300);
        add_schedule(&root, 7, 3);
        assert_eq!(
            compute(&root, 200, 7),
            Some(Event::new(Action::Host, 7, 504 * MPD + 400))
        );
    }

    #[test]
    fn weekly_delayed_past_limit() {
        let root = Root::for_testing(200);
        create_game(&root, 7, GameState::Running);
        set_game_config(&root, 7, "turn", 3);
        set_game_config(&root, 7, "lastHostTime", (500 * MPD + 150 + 50) as i64);
        set_schedule(&root, 7, 3, "type", 1);
        set_schedule(&root, 7, 3, "interval", 4);
        set_schedule(&root, 7, 3, "daytime", 150);
        set_schedule(&root, 7, 3, "hostLimit", 45);
        add_schedule(&root, 7, 3);
        assert_eq!(
            compute(&root, 200, 7),
            Some(Event::new(Action::Host, 7, 505 * MPD + 150))
        );
    }

    #[test]
    fn weekly_delayed_exactly_at_limit() {
        let root = Root::for_testing(200);
        create_game(&root, 9876, GameState::Running);
        set_game_config(&root, 9876, "turn", 3);
        set_game_config(&root, 9876, "lastHostTime", (500 * MPD + 150 + 45) as i64);
        set_schedule(&root, 9876, 4, "type", 1);
        set_schedule(&root, 9876, 4, "interval", 4);
        set_schedule(&root, 9876, 4, "daytime", 150);
        set_schedule(&root, 9876, 4, "hostLimit", 45);
        add_schedule(&root, 9876, 4);
        assert_eq!(
            compute(&root, 200, 9876),
            Some(Event::new(Action::Host, 9876, 504 * MPD + 150))
        );
    }

    // Day 696 is a Sunday; weekday bit 0 = Sunday.
    const SUNDAY: Time = 700 - 4;
    const MO_WE_FR: i64 = 2 + 8 + 32;
    const SU_TH: i64 = 1 + 16;

    fn daily_game(root: &Root, id: GameId, last_host_day: Time, daytime: Time) {
        create_game(root, id, GameState::Running);
        set_game_config(root, id, "turn", 3);
        set_game_config(
            root,
            id,
            "lastHostTime",
            (last_host_day * MPD + daytime) as i64,
        );
        set_schedule(root, id, 8, "type", 2);
        set_schedule(root, id, 8, "weekdays", MO_WE_FR);
        set_schedule(root, id, 8, "daytime", daytime as i64);
        set_schedule(root, id, 8, "hostLimit", 45);
        add_schedule(root, id, 8);
    }

    #[test]
    fn daily_monday_hosts_wednesday() {
        let root = Root::for_testing(200);
        daily_game(&root, 77, SUNDAY + 1, 360);
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(Action::Host, 77, (SUNDAY + 3) * MPD + 360))
        );
    }

    #[test]
    fn daily_friday_hosts_next_monday() {
        let root = Root::for_testing(200);
        daily_game(&root, 77, SUNDAY + 5, 360);
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(Action::Host, 77, (SUNDAY + 8) * MPD + 360))
        );
    }

    #[test]
    fn daily_overdue_tuesday_host_forfeits_wednesday() {
        // The Monday host ran a full day late; the next slot is Friday.
        let root = Root::for_testing(200);
        daily_game(&root, 77, SUNDAY + 2, 360);
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(Action::Host, 77, (SUNDAY + 5) * MPD + 360))
        );
    }

    #[test]
    fn daily_early_host_when_all_turns_in() {
        let root = Root::for_testing(200);
        daily_game(&root, 77, SUNDAY + 2, 360);
        set_schedule(&root, 77, 8, "hostDelay", 22);
        set_schedule(&root, 77, 8, "hostEarly", 1);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 77, slot, 600 + slot);
            set_turn_state(&root, 77, slot, TurnState::Green.to_wire());
        }
        set_game_config(
            &root,
            77,
            "lastTurnSubmitted",
            ((SUNDAY + 2) * MPD + 360 + 100) as i64,
        );
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(
                Action::Host,
                77,
                (SUNDAY + 2) * MPD + 360 + 122
            ))
        );
    }

    fn manual_game(root: &Root, id: GameId, host_early: bool) {
        create_game(root, id, GameState::Running);
        set_game_config(root, id, "turn", 3);
        set_game_config(root, id, "lastHostTime", 4000);
        set_game_config(root, id, "lastTurnSubmitted", 4100);
        set_schedule(root, id, 5, "type", 4);
        set_schedule(root, id, 5, "hostDelay", 50);
        if host_early {
            set_schedule(root, id, 5, "hostEarly", 1);
        }
        add_schedule(root, id, 5);
    }

    #[test]
    fn manual_without_trigger_produces_nothing() {
        let root = Root::for_testing(4110);
        manual_game(&root, 13579, true);
        assert_eq!(compute(&root, 4110, 13579), None);
    }

    #[test]
    fn manual_trigger_hosts_now() {
        let root = Root::for_testing(4200);
        manual_game(&root, 800, false);
        set_game_config(&root, 800, "hostRunNow", 1);
        assert_eq!(
            compute(&root, 4200, 800),
            Some(Event::new(Action::Host, 800, 4200))
        );
    }

    #[test]
    fn manual_early_hosts_after_last_turn() {
        let root = Root::for_testing(4110);
        manual_game(&root, 666, true);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 666, slot, 600 + slot);
            let state = if slot % 2 == 1 {
                TurnState::Green
            } else {
                TurnState::Yellow
            };
            set_turn_state(&root, 666, slot, state.to_wire());
        }
        assert_eq!(
            compute(&root, 4110, 666),
            Some(Event::new(Action::Host, 666, 4150))
        );
    }

    #[test]
    fn manual_early_with_missing_turns_produces_nothing() {
        let root = Root::for_testing(4110);
        manual_game(&root, 13579, true);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 13579, slot, 600 + slot);
        }
        for slot in 1..=8 as Slot {
            set_turn_state(&root, 13579, slot, TurnState::Green.to_wire());
        }
        assert_eq!(compute(&root, 4110, 13579), None);
    }

    fn quick_game(root: &Root, id: GameId, last_host: Time, last_turn: Time) {
        create_game(root, id, GameState::Running);
        set_game_config(root, id, "turn", 3);
        set_game_config(root, id, "lastHostTime", last_host as i64);
        set_game_config(root, id, "lastTurnSubmitted", last_turn as i64);
        set_schedule(root, id, 77, "type", 3);
        set_schedule(root, id, 77, "hostDelay", 50);
        set_schedule(root, id, 77, "hostEarly", 1);
        add_schedule(root, id, 77);
    }

    #[test]
    fn quick_hosts_when_all_turns_in() {
        let root = Root::for_testing(4110);
        quick_game(&root, 32168, 4000, 4100);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 32168, slot, 600 + slot);
            set_turn_state(&root, 32168, slot, TurnState::Green.to_wire());
        }
        assert_eq!(
            compute(&root, 4110, 32168),
            Some(Event::new(Action::Host, 32168, 4150))
        );
    }

    #[test]
    fn quick_does_not_host_on_temporary_turns() {
        let root = Root::for_testing(4110);
        quick_game(&root, 25392, 4000, 4100);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 25392, slot, 600 + slot);
            let state = if slot % 2 == 1 {
                TurnState::Green.to_wire()
            } else {
                TurnState::Green.to_wire() | TURN_IS_TEMPORARY
            };
            set_turn_state(&root, 25392, slot, state);
        }
        assert_eq!(compute(&root, 4110, 25392), None);
    }

    #[test]
    fn quick_hosts_with_partially_populated_slots() {
        let root = Root::for_testing(630);
        quick_game(&root, 6722, 600, 620);
        for slot in 1..=8 as Slot {
            add_player(&root, 6722, slot, 600 + slot);
            set_turn_state(&root, 6722, slot, TurnState::Green.to_wire());
        }
        assert_eq!(
            compute(&root, 630, 6722),
            Some(Event::new(Action::Host, 6722, 670))
        );
    }

    #[test]
    fn expired_weekly_falls_to_faster_schedule() {
        let root = Root::for_testing(200);
        create_game(&root, 99, GameState::Running);
        set_game_config(&root, 99, "turn", 3);
        set_game_config(&root, 99, "lastHostTime", (100 * MPD + 200) as i64);
        set_schedule(&root, 99, 4, "type", 1);
        set_schedule(&root, 99, 4, "interval", 2);
        set_schedule(&root, 99, 4, "daytime", 200);
        add_schedule(&root, 99, 4);
        set_schedule(&root, 99, 3, "type", 1);
        set_schedule(&root, 99, 3, "interval", 7);
        set_schedule(&root, 99, 3, "daytime", 200);
        set_schedule(&root, 99, 3, "condition", 1);
        set_schedule(&root, 99, 3, "condTurn", 2);
        add_schedule(&root, 99, 3);
        assert_eq!(
            compute(&root, 200, 99),
            Some(Event::new(Action::Host, 99, 102 * MPD + 200))
        );
    }

    #[test]
    fn expired_weekly_falls_to_slower_schedule() {
        let root = Root::for_testing(200);
        create_game(&root, 99, GameState::Running);
        set_game_config(&root, 99, "turn", 3);
        set_game_config(&root, 99, "lastHostTime", (100 * MPD + 200) as i64);
        set_schedule(&root, 99, 4, "type", 1);
        set_schedule(&root, 99, 4, "interval", 7);
        set_schedule(&root, 99, 4, "daytime", 200);
        add_schedule(&root, 99, 4);
        set_schedule(&root, 99, 3, "type", 1);
        set_schedule(&root, 99, 3, "interval", 2);
        set_schedule(&root, 99, 3, "daytime", 200);
        set_schedule(&root, 99, 3, "condition", 1);
        set_schedule(&root, 99, 3, "condTurn", 2);
        add_schedule(&root, 99, 3);
        assert_eq!(
            compute(&root, 200, 99),
            Some(Event::new(Action::Host, 99, 107 * MPD + 200))
        );
    }

    #[test]
    fn expired_daily_changes_weekday_set() {
        // Su/Th expires in favor of Mo/We/Fr after a Sunday host; the
        // next host lands on Wednesday, not the overdue Monday.
        let root = Root::for_testing(200);
        create_game(&root, 77, GameState::Running);
        set_game_config(&root, 77, "turn", 3);
        set_game_config(&root, 77, "lastHostTime", (SUNDAY * MPD + 360) as i64);
        set_schedule(&root, 77, 8, "type", 2);
        set_schedule(&root, 77, 8, "weekdays", MO_WE_FR);
        set_schedule(&root, 77, 8, "daytime", 360);
        set_schedule(&root, 77, 8, "hostLimit", 45);
        add_schedule(&root, 77, 8);
        set_schedule(&root, 77, 3, "type", 2);
        set_schedule(&root, 77, 3, "weekdays", SU_TH);
        set_schedule(&root, 77, 3, "daytime", 360);
        set_schedule(&root, 77, 3, "hostLimit", 45);
        set_schedule(&root, 77, 3, "condition", 1);
        set_schedule(&root, 77, 3, "condTurn", 2);
        add_schedule(&root, 77, 3);
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(Action::Host, 77, (SUNDAY + 3) * MPD + 360))
        );
    }

    #[test]
    fn expired_daily_changes_weekday_set_reverse() {
        let root = Root::for_testing(200);
        create_game(&root, 77, GameState::Running);
        set_game_config(&root, 77, "turn", 3);
        set_game_config(&root, 77, "lastHostTime", ((SUNDAY + 3) * MPD + 360) as i64);
        set_schedule(&root, 77, 8, "type", 2);
        set_schedule(&root, 77, 8, "weekdays", SU_TH);
        set_schedule(&root, 77, 8, "daytime", 360);
        set_schedule(&root, 77, 8, "hostLimit", 45);
        add_schedule(&root, 77, 8);
        set_schedule(&root, 77, 3, "type", 2);
        set_schedule(&root, 77, 3, "weekdays", MO_WE_FR);
        set_schedule(&root, 77, 3, "daytime", 360);
        set_schedule(&root, 77, 3, "hostLimit", 45);
        set_schedule(&root, 77, 3, "condition", 1);
        set_schedule(&root, 77, 3, "condTurn", 2);
        add_schedule(&root, 77, 3);
        assert_eq!(
            compute(&root, 200, 77),
            Some(Event::new(Action::Host, 77, (SUNDAY + 7) * MPD + 360))
        );
    }

    #[test]
    fn timed_expiration_preempts_later_host() {
        let root = Root::for_testing(200);
        create_game(&root, 99, GameState::Running);
        set_game_config(&root, 99, "turn", 3);
        set_game_config(&root, 99, "lastHostTime", (100 * MPD + 200) as i64);
        set_schedule(&root, 99, 4, "type", 1);
        set_schedule(&root, 99, 4, "interval", 7);
        set_schedule(&root, 99, 4, "daytime", 200);
        add_schedule(&root, 99, 4);
        set_schedule(&root, 99, 3, "type", 1);
        set_schedule(&root, 99, 3, "interval", 2);
        set_schedule(&root, 99, 3, "daytime", 200);
        set_schedule(&root, 99, 3, "condition", 2);
        set_schedule(&root, 99, 3, "condTime", (101 * MPD + 200) as i64);
        add_schedule(&root, 99, 3);
        assert_eq!(
            compute(&root, 200, 99),
            Some(Event::new(Action::ScheduleChange, 99, 101 * MPD + 200))
        );
    }

    #[test]
    fn expiration_re_anchors_on_fixed_weekdays() {
        // An overdue quick schedule expires toward a fixed-weekday
        // schedule; the host lands on the next weekday instead of
        // firing immediately for being overdue.
        let now = (SUNDAY + 7) * MPD + 150;
        let root = Root::for_testing(now);
        create_game(&root, 66, GameState::Running);
        set_game_config(&root, 66, "turn", 3);
        set_game_config(&root, 66, "lastHostTime", (SUNDAY * MPD + 150) as i64);
        set_schedule(&root, 66, 8, "type", 2);
        set_schedule(&root, 66, 8, "weekdays", MO_WE_FR);
        set_schedule(&root, 66, 8, "daytime", 150);
        set_schedule(&root, 66, 8, "hostLimit", 45);
        add_schedule(&root, 66, 8);
        set_schedule(&root, 66, 3, "type", 3);
        set_schedule(&root, 66, 3, "condition", 2);
        set_schedule(&root, 66, 3, "condTime", (SUNDAY * MPD + 150) as i64);
        add_schedule(&root, 66, 3);
        assert_eq!(
            compute(&root, now, 66),
            Some(Event::new(Action::Host, 66, (SUNDAY + 8) * MPD + 150))
        );
    }

    #[test]
    fn recent_schedule_change_defers_instant_host() {
        let root = Root::for_testing(4149);
        quick_game(&root, 32168, 4000, 4100);
        set_game_config(&root, 32168, "lastScheduleChange", 4149);
        for slot in 1..=NUM_PLAYERS as Slot {
            add_player(&root, 32168, slot, 600 + slot);
            set_turn_state(&root, 32168, slot, TurnState::Green.to_wire());
        }
        assert_eq!(
            compute(&root, 4149, 32168),
            Some(Event::new(Action::Host, 32168, 4159))
        );
    }

    #[test]
    fn only_expired_schedules_request_pruning() {
        let root = Root::for_testing(200);
        create_game(&root, 55, GameState::Running);
        set_game_config(&root, 55, "turn", 9);
        set_game_config(&root, 55, "lastHostTime", 100);
        set_schedule(&root, 55, 1, "type", 1);
        set_schedule(&root, 55, 1, "interval", 2);
        set_schedule(&root, 55, 1, "condition", 1);
        set_schedule(&root, 55, 1, "condTurn", 5);
        add_schedule(&root, 55, 1);
        assert_eq!(
            compute(&root, 200, 55),
            Some(Event::new(Action::ScheduleChange, 55, 200))
        );
        // Executing the event prunes the stack; afterwards nothing is due.
        let game = Game::open_unchecked(&root, 55);
        prune_expired_schedules(200, &root, &game);
        assert_eq!(compute(&root, 200, 55), None);
        assert_eq!(game.get_config_int("scheduleChanged"), 1);
    }

    #[test]
    fn prune_re_anchors_last_host_time() {
        // Last host ran nine days ago on the old weekly cadence; when
        // that schedule expires toward Mo/We/Fr, the virtual previous
        // host (last Friday) becomes the new anchor.
        let now = SUNDAY * MPD + 360;
        let root = Root::for_testing(now);
        create_game(&root, 56, GameState::Running);
        set_game_config(&root, 56, "turn", 9);
        set_game_config(&root, 56, "lastHostTime", ((SUNDAY - 9) * MPD + 360) as i64);
        set_schedule(&root, 56, 2, "type", 2);
        set_schedule(&root, 56, 2, "weekdays", MO_WE_FR);
        set_schedule(&root, 56, 2, "daytime", 360);
        add_schedule(&root, 56, 2);
        set_schedule(&root, 56, 1, "type", 1);
        set_schedule(&root, 56, 1, "interval", 7);
        set_schedule(&root, 56, 1, "daytime", 360);
        set_schedule(&root, 56, 1, "condition", 1);
        set_schedule(&root, 56, 1, "condTurn", 5);
        add_schedule(&root, 56, 1);
        let game = Game::open_unchecked(&root, 56);
        prune_expired_schedules(now, &root, &game);
        assert_eq!(game.last_host_time(), (SUNDAY - 2) * MPD + 360);
        let stack = ScheduleStack::new(game.schedule_base());
        assert_eq!(stack.len(root.store()), 1);
    }

    #[test]
    fn preview_walks_the_stack() {
        let root = Root::for_testing(200);
        create_game(&root, 12, GameState::Running);
        set_game_config(&root, 12, "turn", 3);
        set_game_config(&root, 12, "lastHostTime", (100 * MPD + 200) as i64);
        set_schedule(&root, 12, 1, "type", 1);
        set_schedule(&root, 12, 1, "interval", 2);
        set_schedule(&root, 12, 1, "daytime", 200);
        add_schedule(&root, 12, 1);
        let game = Game::open_unchecked(&root, 12);
        let scale = root.config().user_time_scale;
        let times = preview_schedule(200, &root, &game, None, 3);
        assert_eq!(
            times,
            vec![
                to_user_time(102 * MPD + 200, scale),
                to_user_time(104 * MPD + 200, scale),
                to_user_time(106 * MPD + 200, scale),
            ]
        );
    }

    #[test]
    fn preview_of_unhosted_game_pretends_a_host_now() {
        let root = Root::for_testing(555);
        create_game(&root, 13, GameState::Running);
        set_schedule(&root, 13, 1, "type", 1);
        set_schedule(&root, 13, 1, "interval", 3);
        set_schedule(&root, 13, 1, "daytime", (555 % MPD).into());
        add_schedule(&root, 13, 1);
        let game = Game::open_unchecked(&root, 13);
        let times = preview_schedule(555, &root, &game, None, 2);
        let scale = root.config().user_time_scale;
        assert_eq!(times.len(), 2);
        assert_eq!(times[0], to_user_time(555, scale));
    }

    #[test]
    fn preview_respects_turn_limit_zero() {
        let root = Root::for_testing(200);
        create_game(&root, 14, GameState::Running);
        let game = Game::open_unchecked(&root, 14);
        assert!(preview_schedule(200, &root, &game, None, 0).is_empty());
    }
}
