//! PHost battle algorithm, versions 2 through 4.
//!
//! Structurally a tick loop like the classic algorithm, but a distinct
//! state machine: different recharge pacing, nearest-to-even rounding in
//! the damage fractions, single-strength torpedo warheads, crew-defense
//! scaling, boarding of defenseless targets, and (v3/v4) experience-level
//! modifiers on the weapon rates.

use crate::HostConfig;
use crate::Object;
use crate::Statistic;
use crate::Weapons;
use crate::Winner;
use nova_core::Rng;

const FULL: i32 = 100;
const MAX_WEAPONS: usize = 20;
const MAX_FIGHTERS: usize = 32;

/// Effective weapon rates of one side after experience modifiers.
struct Rates {
    beam_recharge: i32,
    tube_recharge: i32,
    torp_miss: i32,
    crew_defense: i32,
}

impl Rates {
    fn new(obj: &Object, cfg: &HostConfig, experience: bool) -> Self {
        let level = if experience && cfg.num_experience_levels > 0 {
            obj.experience_level.clamp(0, cfg.num_experience_levels)
        } else {
            0
        };
        Self {
            beam_recharge: obj.beam_charge_rate + level,
            tube_recharge: obj.torp_charge_rate + level,
            torp_miss: (obj.torp_miss_rate - 2 * level).max(5),
            crew_defense: (obj.crew_defense_rate + 5 * level).min(100),
        }
    }
}

struct Side<'a> {
    obj: &'a mut Object,
    stat: &'a mut Statistic,
    rates: Rates,
    beam_charge: [i32; MAX_WEAPONS],
    tube_charge: [i32; MAX_WEAPONS],
    bay_charge: i32,
    fighter_pos: [i32; MAX_FIGHTERS],
    fighter_dir: [i32; MAX_FIGHTERS],
}

impl<'a> Side<'a> {
    fn new(obj: &'a mut Object, stat: &'a mut Statistic, cfg: &HostConfig, experience: bool) -> Self {
        let rates = Rates::new(obj, cfg, experience);
        Self {
            obj,
            stat,
            rates,
            // PHost starts a fight with partially charged weapons.
            beam_charge: [FULL / 2; MAX_WEAPONS],
            tube_charge: [FULL / 2; MAX_WEAPONS],
            bay_charge: 0,
            fighter_pos: [-1; MAX_FIGHTERS],
            fighter_dir: [0; MAX_FIGHTERS],
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
            self.beam_charge[i] =
                (self.beam_charge[i] + cfg.beam_recharge * self.rates.beam_recharge).min(FULL);
        }
        for i in 0..self.num_tubes() {
            self.tube_charge[i] =
                (self.tube_charge[i] + cfg.tube_recharge * self.rates.tube_recharge).min(FULL);
        }
        if self.obj.num_bays > 0 {
            self.bay_charge += cfg.bay_recharge * self.obj.num_bays;
        }
    }
}

/// Nearest rounding of `a / b` with integer arithmetic.
fn round_div(a: i32, b: i32) -> i32 {
    (a + b / 2) / b
}

/// PHost damage application: shields absorb the scaled warhead, hull and
/// crew suffer only once shields are down. Fractions round to nearest;
/// crew losses scale down by the defender's crew-defense rate.
fn apply_hit(target: &mut Object, kill: i32, expl: i32, crew_defense: i32) {
    let mass1 = target.mass + 1;
    if target.shield > 0 {
        target.shield -= round_div(expl * 100, mass1).max(1);
        if target.shield < 0 {
            target.shield = 0;
        }
        return;
    }
    target.damage = (target.damage + round_div(expl * 100, mass1).max(1)).min(150);
    if !target.is_planet {
        let loss = round_div(kill * 100, mass1).max(1);
        target.crew -= loss * (100 - crew_defense) / 100;
        if target.crew < 0 {
            target.crew = 0;
        }
    }
}

/// Resolve one PHost fight. `experience` enables the v3/v4 level
/// modifiers; version 2 runs with them off.
pub fn fight(
    left: &mut Object,
    right: &mut Object,
    cfg: &HostConfig,
    weapons: &Weapons,
    rng: &mut Rng,
    experience: bool,
    left_stat: &mut Statistic,
    right_stat: &mut Statistic,
) -> Winner {
    let left_limit = cfg.damage_limit(left.owner, left.is_planet);
    let right_limit = cfg.damage_limit(right.owner, right.is_planet);
    let mut l = Side::new(left, left_stat, cfg, experience);
    let mut r = Side::new(right, right_stat, cfg, experience);
    let mut distance = cfg.starting_distance;

    for _tick in 0..cfg.max_ticks {
        // Both sides approach; an unarmed side cannot keep the distance.
        if distance > cfg.standoff_distance {
            distance = (distance - cfg.closing_speed).max(cfg.standoff_distance);
        } else if !r.obj.is_armed() || !l.obj.is_armed() {
            distance = (distance - cfg.closing_speed).max(0);
        }
        l.recharge(cfg);
        r.recharge(cfg);
        fire_beams(&mut l, &mut r, cfg, weapons, rng, distance);
        fire_beams(&mut r, &mut l, cfg, weapons, rng, distance);
        fire_torps(&mut l, &mut r, cfg, weapons, rng, distance);
        fire_torps(&mut r, &mut l, cfg, weapons, rng, distance);
        launch_fighters(&mut l, cfg);
        launch_fighters(&mut r, cfg);
        fly_fighters(&mut l, &mut r, cfg, distance);
        fly_fighters(&mut r, &mut l, cfg, distance);
        if distance == 0 {
            if let Some(winner) = board(&mut l, &mut r, rng) {
                return winner;
            }
        }
        if r.obj.is_out_of_action(right_limit) {
            return Winner::Left;
        }
        if l.obj.is_out_of_action(left_limit) {
            return Winner::Right;
        }
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

/// An unarmed ship is prize, not target: the attacker closes in to board
/// instead of shooting it apart.
fn holds_fire(enemy: &Object) -> bool {
    !enemy.is_armed() && !enemy.is_planet
}

fn fire_beams(side: &mut Side, enemy: &mut Side, cfg: &HostConfig, weapons: &Weapons, rng: &mut Rng, distance: i32) {
    if holds_fire(enemy.obj) {
        return;
    }
    let (kill_power, damage_power) = weapons.beam(side.obj.beam_type);
    for i in 0..side.num_beams() {
        let charge = side.beam_charge[i];
        if charge < FULL {
            continue;
        }
        // Fully charged beams prefer incoming fighters.
        if enemy.fighters_out() > 0 && rng.chance(cfg.beam_hit_fighter_odds) {
            if let Some(slot) = (0..MAX_FIGHTERS).find(|s| enemy.fighter_pos[*s] >= 0) {
                enemy.fighter_pos[slot] = -1;
                enemy.fighter_dir[slot] = 0;
                side.beam_charge[i] = 0;
                continue;
            }
        }
        if distance <= cfg.beam_range {
            apply_hit(
                enemy.obj,
                kill_power * side.obj.beam_kill_rate,
                damage_power,
                enemy.rates.crew_defense,
            );
            side.beam_charge[i] = 0;
        }
    }
}

fn fire_torps(side: &mut Side, enemy: &mut Side, cfg: &HostConfig, weapons: &Weapons, rng: &mut Rng, distance: i32) {
    if distance > cfg.torp_range || holds_fire(enemy.obj) {
        return;
    }
    let (kill_power, damage_power) = weapons.torpedo(side.obj.torpedo_type);
    for i in 0..side.num_tubes() {
        if side.tube_charge[i] < FULL || side.obj.num_torpedoes <= 0 {
            continue;
        }
        side.obj.num_torpedoes -= 1;
        side.tube_charge[i] = 0;
        if rng.range(1, 100) > side.rates.torp_miss {
            // Single-strength warheads, unlike the classic doubling.
            apply_hit(enemy.obj, kill_power, damage_power, enemy.rates.crew_defense);
            side.stat.record_torpedo_hit();
        }
    }
}

fn launch_fighters(side: &mut Side, cfg: &HostConfig) {
    while side.bay_charge >= FULL
        && side.obj.num_fighters > 0
        && (side.fighters_out() as i32) < cfg.max_fighters_out
    {
        side.bay_charge -= FULL;
        side.obj.num_fighters -= 1;
        side.stat.record_fighters_aboard(side.obj.num_fighters);
        if let Some(slot) = side.fighter_pos.iter().position(|p| *p < 0) {
            side.fighter_pos[slot] = 0;
            side.fighter_dir[slot] = 1;
        }
    }
}

fn fly_fighters(side: &mut Side, enemy: &mut Side, cfg: &HostConfig, distance: i32) {
    for i in 0..MAX_FIGHTERS {
        if side.fighter_pos[i] < 0 {
            continue;
        }
        side.fighter_pos[i] += cfg.fighter_speed * side.fighter_dir[i];
        if side.fighter_dir[i] > 0 && side.fighter_pos[i] >= distance {
            if !holds_fire(enemy.obj) {
                apply_hit(
                    enemy.obj,
                    cfg.fighter_kill,
                    cfg.fighter_damage,
                    enemy.rates.crew_defense,
                );
            }
            side.fighter_dir[i] = -1;
            side.fighter_pos[i] = distance;
        } else if side.fighter_dir[i] < 0 && side.fighter_pos[i] <= 0 {
            side.fighter_pos[i] = -1;
            side.fighter_dir[i] = 0;
            side.obj.num_fighters += 1;
        }
    }
}

/// Boarding at zero distance: an armed side overwhelms a defenseless crew
/// unless the crew-defense roll holds the deck.
fn board(l: &mut Side, r: &mut Side, rng: &mut Rng) -> Option<Winner> {
    let left_armed = l.obj.is_armed();
    let right_armed = r.obj.is_armed();
    if left_armed && !right_armed && !r.obj.is_planet {
        if !rng.chance(r.rates.crew_defense) {
            r.obj.crew = 0;
            return Some(Winner::Left);
        }
    } else if right_armed && !left_armed && !l.obj.is_planet {
        if !rng.chance(l.rates.crew_defense) {
            l.obj.crew = 0;
            return Some(Winner::Right);
        }
    }
    None
}
