//! Classic Host battle algorithm, plus the NuHost variant.
//!
//! One fight is a tick loop over two sides closing from the starting
//! distance. Beams and launchers recharge by their rates, fighters fly
//! out, strike, and return. All arithmetic is integral; the per-side
//! working state lives in fixed arrays so the loop never allocates.

use crate::HostConfig;
use crate::Object;
use crate::Statistic;
use crate::Weapons;
use crate::Winner;
use nova_core::Rng;

/// Weapon charge level meaning "ready to fire".
const FULL: i32 = 100;
/// Fixed capacity for beam and launcher banks.
const MAX_WEAPONS: usize = 20;
/// Fixed capacity for fighters in flight per side.
const MAX_FIGHTERS: usize = 32;
/// Klingon player number; NuHost doubles their beam recharge.
const KLINGON: i32 = 4;

// Hit scaling. Every hull soaks as if BULK_OFFSET kt heavier; shields
// drain slightly faster than hulls break, and kill yield loses a tenth
// against armored crew decks. These values are wire-compatible state:
// changing any of them changes recorded battle outcomes.
const BULK_OFFSET: i32 = 100;
const SHIELD_SCALE: i32 = 105;
const HULL_SCALE: i32 = 100;
const CREW_SCALE: i32 = 90;

/// Working state of one side of the fight.
struct Side<'a> {
    obj: &'a mut Object,
    stat: &'a mut Statistic,
    beam_charge: [i32; MAX_WEAPONS],
    tube_charge: [i32; MAX_WEAPONS],
    bay_charge: i32,
    /// Fighter positions, measured from the own ship. Unused slots are -1.
    fighter_pos: [i32; MAX_FIGHTERS],
    /// 1 = outbound, -1 = returning.
    fighter_dir: [i32; MAX_FIGHTERS],
    beam_rate: i32,
    tube_rate: i32,
}

impl<'a> Side<'a> {
    fn new(obj: &'a mut Object, stat: &'a mut Statistic, nu_host: bool) -> Self {
        let beam_rate = if nu_host && obj.owner == KLINGON {
            obj.beam_charge_rate * 2
        } else {
            obj.beam_charge_rate
        };
        let tube_rate = obj.torp_charge_rate;
        Self {
            obj,
            stat,
            beam_charge: [0; MAX_WEAPONS],
            tube_charge: [0; MAX_WEAPONS],
            bay_charge: 0,
            fighter_pos: [-1; MAX_FIGHTERS],
            fighter_dir: [0; MAX_FIGHTERS],
            beam_rate,
            tube_rate,
        }
    }
    fn num_beams(&self) -> usize {
        (self.obj.num_beams.max(0) as usize).min(MAX_WEAPONS)
    }
    fn num_tubes(&self) -> usize {
        (self.obj.num_launchers.max(0) as usize).min(MAX_WEAPONS)
    }
    fn fighters_out(&self) -> usize {
        self.fighter_pos.iter().filter(|p| **p >= 0).count()
    }
    fn recharge(&mut self, cfg: &HostConfig) {
        for i in 0..self.num_beams() {
            self.beam_charge[i] = (self.beam_charge[i] + cfg.beam_recharge * self.beam_rate).min(FULL);
        }
        for i in 0..self.num_tubes() {
            self.tube_charge[i] = (self.tube_charge[i] + cfg.tube_recharge * self.tube_rate).min(FULL);
        }
        if self.obj.num_bays > 0 {
            self.bay_charge += cfg.bay_recharge * self.obj.num_bays;
        }
    }
    /// Kill the enemy fighter closest to us, if any. Returns true on kill.
    fn shoot_down_incoming(&mut self, enemy: &mut Side, distance: i32) -> bool {
        let target = (0..MAX_FIGHTERS)
            .filter(|i| enemy.fighter_pos[*i] >= 0)
            .max_by_key(|i| enemy.fighter_pos[*i] - distance);
        match target {
            Some(i) => {
                enemy.fighter_pos[i] = -1;
                enemy.fighter_dir[i] = 0;
                true
            }
            None => false,
        }
    }
    fn launch_fighters(&mut self, cfg: &HostConfig) {
        while self.bay_charge >= FULL
            && self.obj.num_fighters > 0
            && (self.fighters_out() as i32) < cfg.max_fighters_out
        {
            self.bay_charge -= FULL;
            self.obj.num_fighters -= 1;
            self.stat.record_fighters_aboard(self.obj.num_fighters);
            if let Some(slot) = self.fighter_pos.iter().position(|p| *p < 0) {
                self.fighter_pos[slot] = 0;
                self.fighter_dir[slot] = 1;
            }
        }
    }
    fn fly_fighters(&mut self, enemy: &mut Side, cfg: &HostConfig, distance: i32) {
        for i in 0..MAX_FIGHTERS {
            if self.fighter_pos[i] < 0 {
                continue;
            }
            self.fighter_pos[i] += cfg.fighter_speed * self.fighter_dir[i];
            if self.fighter_dir[i] > 0 && self.fighter_pos[i] >= distance {
                apply_hit(enemy.obj, cfg.fighter_kill, cfg.fighter_damage);
                self.fighter_dir[i] = -1;
                self.fighter_pos[i] = distance;
            } else if self.fighter_dir[i] < 0 && self.fighter_pos[i] <= 0 {
                self.fighter_pos[i] = -1;
                self.fighter_dir[i] = 0;
                self.obj.num_fighters += 1;
            }
        }
    }
}

/// Apply one weapon hit to a unit: shields absorb first, and the shot
/// that collapses them carries its excess fraction through to hull and
/// crew. All fractions truncate.
fn apply_hit(target: &mut Object, kill: i32, expl: i32) {
    let bulk = target.mass + BULK_OFFSET;
    let mut kill = kill;
    let mut expl = expl;
    if target.shield > 0 {
        let drain = (expl * SHIELD_SCALE / bulk).max(1);
        if drain < target.shield {
            target.shield -= drain;
            return;
        }
        let excess = drain - target.shield;
        target.shield = 0;
        expl = expl * excess / drain;
        kill = kill * excess / drain;
        if expl <= 0 && kill <= 0 {
            return;
        }
    }
    target.damage = (target.damage + (expl * HULL_SCALE / bulk).max(1)).min(150);
    if !target.is_planet {
        target.crew = (target.crew - (kill * CREW_SCALE / bulk).max(1)).max(0);
    }
}

/// Resolve one classic fight. Returns the winning side; both objects are
/// left in their end-of-battle state.
pub fn fight(
    left: &mut Object,
    right: &mut Object,
    cfg: &HostConfig,
    weapons: &Weapons,
    rng: &mut Rng,
    nu_host: bool,
    left_stat: &mut Statistic,
    right_stat: &mut Statistic,
) -> Winner {
    let left_limit = cfg.damage_limit(left.owner, left.is_planet);
    let right_limit = cfg.damage_limit(right.owner, right.is_planet);
    let mut l = Side::new(left, left_stat, nu_host);
    let mut r = Side::new(right, right_stat, nu_host);
    let mut distance = cfg.starting_distance;

    for _tick in 0..cfg.max_ticks {
        if distance > cfg.standoff_distance {
            distance = (distance - cfg.closing_speed).max(cfg.standoff_distance);
        }
        l.recharge(cfg);
        r.recharge(cfg);
        // The left side acts first; a side that just went down fires no
        // return salvo.
        fire_beams(&mut l, &mut r, cfg, weapons, rng, distance);
        fire_torps(&mut l, &mut r, cfg, weapons, rng, distance);
        if !r.obj.is_out_of_action(right_limit) {
            fire_beams(&mut r, &mut l, cfg, weapons, rng, distance);
            fire_torps(&mut r, &mut l, cfg, weapons, rng, distance);
        }
        l.launch_fighters(cfg);
        r.launch_fighters(cfg);
        dogfight(&mut l, &mut r, cfg, rng);
        l.fly_fighters(&mut r, cfg, distance);
        r.fly_fighters(&mut l, cfg, distance);

        if r.obj.is_out_of_action(right_limit) {
            return Winner::Left;
        }
        if l.obj.is_out_of_action(left_limit) {
            return Winner::Right;
        }
        // A fight with nothing left to shoot ends early instead of
        // grinding to the tick cap.
        if !l.obj.is_armed() && !r.obj.is_armed() && l.fighters_out() == 0 && r.fighters_out() == 0 {
            break;
        }
    }
    if l.obj.hit_points() >= r.obj.hit_points() {
        Winner::Left
    } else {
        Winner::Right
    }
}

fn fire_beams(side: &mut Side, enemy: &mut Side, cfg: &HostConfig, weapons: &Weapons, rng: &mut Rng, distance: i32) {
    let (kill_power, damage_power) = weapons.beam(side.obj.beam_type);
    for i in 0..side.num_beams() {
        let charge = side.beam_charge[i];
        if charge >= cfg.beam_fighter_threshold
            && enemy.fighters_out() > 0
            && rng.chance(cfg.beam_hit_fighter_odds)
        {
            if side.shoot_down_incoming(enemy, distance) {
                side.beam_charge[i] = 0;
            }
        } else if charge >= FULL && distance <= cfg.beam_range {
            apply_hit(enemy.obj, kill_power * side.obj.beam_kill_rate, damage_power);
            side.beam_charge[i] = 0;
        }
    }
}

fn fire_torps(side: &mut Side, enemy: &mut Side, cfg: &HostConfig, weapons: &Weapons, rng: &mut Rng, distance: i32) {
    if distance > cfg.torp_range {
        return;
    }
    let (kill_power, damage_power) = weapons.torpedo(side.obj.torpedo_type);
    for i in 0..side.num_tubes() {
        if side.tube_charge[i] < FULL || side.obj.num_torpedoes <= 0 {
            continue;
        }
        side.obj.num_torpedoes -= 1;
        side.tube_charge[i] = 0;
        if rng.range(1, 100) > side.obj.torp_miss_rate {
            apply_hit(
                enemy.obj,
                kill_power * cfg.torp_damage_scale,
                damage_power * cfg.torp_damage_scale,
            );
            side.stat.record_torpedo_hit();
        }
    }
}

/// One fighter-vs-fighter pass per tick while both sides have fighters in
/// the air.
fn dogfight(l: &mut Side, r: &mut Side, cfg: &HostConfig, rng: &mut Rng) {
    if l.fighters_out() == 0 || r.fighters_out() == 0 {
        return;
    }
    if rng.chance(cfg.fighter_dogfight_odds) {
        if let Some(i) = (0..MAX_FIGHTERS).find(|i| r.fighter_pos[*i] >= 0) {
            r.fighter_pos[i] = -1;
            r.fighter_dir[i] = 0;
        }
    } else if let Some(i) = (0..MAX_FIGHTERS).find(|i| l.fighter_pos[*i] >= 0) {
        l.fighter_pos[i] = -1;
        l.fighter_dir[i] = 0;
    }
}
