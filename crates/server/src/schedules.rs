use crate::GameCreator;
use crate::Host;
use crate::Session;
use nova_core::GameId;
use nova_core::Time;
use nova_core::UserTime;
use nova_cron::LockLevel;
use nova_cron::preview_schedule;
use nova_game::Game;
use nova_game::HostError;
use nova_game::PermissionLevel;
use nova_game::Result;
use nova_schedule::Expiration;
use nova_schedule::Schedule;
use nova_schedule::ScheduleKind;
use nova_schedule::ScheduleStack;
use serde::Deserialize;
use serde::Serialize;

/// Partial schedule as it arrives on the wire; unset fields keep their
/// previous (or default) value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleParams {
    pub kind: Option<ScheduleKind>,
    pub weekdays: Option<u8>,
    pub interval: Option<i32>,
    pub daytime: Option<Time>,
    pub host_early: Option<bool>,
    pub host_delay: Option<Time>,
    pub host_limit: Option<Time>,
    pub expiration: Option<Expiration>,
}

impl ScheduleParams {
    pub fn apply_to(&self, schedule: &mut Schedule) {
        if let Some(kind) = self.kind {
            schedule.kind = kind;
        }
        if let Some(weekdays) = self.weekdays {
            schedule.weekdays = weekdays;
        }
        if let Some(interval) = self.interval {
            schedule.interval = interval;
        }
        if let Some(daytime) = self.daytime {
            schedule.daytime = daytime;
        }
        if let Some(host_early) = self.host_early {
            schedule.host_early = host_early;
        }
        if let Some(host_delay) = self.host_delay {
            schedule.host_delay = host_delay;
        }
        if let Some(host_limit) = self.host_limit {
            schedule.host_limit = host_limit;
        }
        if let Some(expiration) = self.expiration {
            schedule.expiration = expiration;
        }
    }
}

/// Schedule verbs: add, replace, modify, drop, list, preview.
pub struct ScheduleService<'a> {
    host: &'a Host,
}

impl<'a> ScheduleService<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }

    /// SCHEDULEADD: push a new schedule on top of the stack.
    pub fn add(&self, session: &Session, game_id: GameId, params: &ScheduleParams) -> Result<()> {
        self.add_or_replace(session, game_id, params, true)
    }

    /// SCHEDULESET: overwrite the active schedule.
    pub fn replace(&self, session: &Session, game_id: GameId, params: &ScheduleParams) -> Result<()> {
        self.add_or_replace(session, game_id, params, false)
    }

    fn add_or_replace(
        &self,
        session: &Session,
        game_id: GameId,
        params: &ScheduleParams,
        add: bool,
    ) -> Result<()> {
        // Schedule modifications cannot parallel anything.
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;

        let stack = ScheduleStack::new(game.schedule_base());
        let mut schedule = Schedule::default();
        params.apply_to(&mut schedule);

        // Without an explicit daytime, inherit from the active schedule
        // or pick a fresh low-load hour.
        if params.daytime.is_none() {
            schedule.daytime = match stack.front(self.host.root.store()) {
                Some((_, front)) => front.daytime,
                None => GameCreator::new(&self.host.root).pick_day_time(),
            };
        }

        if add || stack.is_empty(self.host.root.store()) {
            stack.push_front(self.host.root.store(), &schedule);
        } else {
            stack.replace_front(self.host.root.store(), &schedule);
        }
        self.finish_change(&game);
        Ok(())
    }

    /// SCHEDULEMOD: merge fields into the active schedule.
    pub fn modify(&self, session: &Session, game_id: GameId, params: &ScheduleParams) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;

        let stack = ScheduleStack::new(game.schedule_base());
        let Some((_, mut schedule)) = stack.front(self.host.root.store()) else {
            return Err(HostError::PreconditionViolated("no schedule".to_string()));
        };
        params.apply_to(&mut schedule);
        stack.replace_front(self.host.root.store(), &schedule);
        self.finish_change(&game);
        Ok(())
    }

    /// SCHEDULEDROP: remove the active schedule.
    pub fn drop_front(&self, session: &Session, game_id: GameId) -> Result<()> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Critical);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Config)?;
        let stack = ScheduleStack::new(game.schedule_base());
        if stack.drop_front(self.host.root.store()).is_some() {
            game.remove_config("hostRunNow");
        }
        self.finish_change(&game);
        Ok(())
    }

    /// SCHEDULELIST: all schedules, active first.
    pub fn list(&self, session: &Session, game_id: GameId) -> Result<Vec<Schedule>> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        let stack = ScheduleStack::new(game.schedule_base());
        Ok(stack.all(self.host.root.store()))
    }

    /// SCHEDULESHOW: future host times.
    pub fn preview(
        &self,
        session: &Session,
        game_id: GameId,
        time_limit: Option<Time>,
        turn_limit: i32,
    ) -> Result<Vec<UserTime>> {
        let _guard = self.host.arbiter.lock(game_id, LockLevel::Simple);
        let game = Game::open(&self.host.root, game_id)?;
        session.check_permission(&game, PermissionLevel::Read)?;
        Ok(preview_schedule(
            self.host.root.time(),
            &self.host.root,
            &game,
            time_limit,
            turn_limit,
        ))
    }

    /// A schedule edit clears the manual trigger, stamps the change time
    /// (which buys the grace period), and wakes the scheduler.
    fn finish_change(&self, game: &Game) {
        game.remove_config("hostRunNow");
        game.set_last_schedule_change(self.host.root.time());
        game.set_schedule_changed(true);
        self.host.root.handle_game_change(game.id());
    }
}
