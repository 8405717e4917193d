//! FLAK fleet combat: one battle over any number of participants.
//!
//! Participants form teams by owner. Each armed unit fires volleys at the
//! highest-rated living enemy; damage uses a fleet-scale model rather than
//! the pairwise duel machine. The battle ends when at most one team has
//! units left, or at the tick cap.

use crate::FlakConfig;
use crate::Object;
use crate::Statistic;
use crate::Weapons;
use nova_core::Rng;

/// Target-priority rating of a unit: big, heavily armed units soak up
/// fire first.
pub fn rating(obj: &Object, cfg: &FlakConfig) -> i64 {
    obj.mass as i64 * cfg.rating_mass_scale as i64
        + (obj.num_launchers * obj.torpedo_type) as i64 * cfg.rating_torp_scale as i64
        + (obj.num_beams * obj.beam_type) as i64 * cfg.rating_beam_scale as i64
        + (obj.num_bays * 10) as i64 * cfg.rating_bay_scale as i64
}

fn alive(obj: &Object) -> bool {
    !obj.is_out_of_action(if obj.owner == 2 && !obj.is_planet { 150 } else { 100 })
}

/// Index of the target `shooter` fires at: the highest-rated living enemy,
/// ties to the lower id.
fn pick_target(objects: &[Object], shooter: usize, cfg: &FlakConfig) -> Option<usize> {
    objects
        .iter()
        .enumerate()
        .filter(|(i, obj)| *i != shooter && alive(obj) && obj.owner != objects[shooter].owner)
        .max_by_key(|(_, obj)| (rating(obj, cfg), -obj.id))
        .map(|(i, _)| i)
}

/// Fleet-scale hit: shields first, then hull and crew, mass-scaled.
fn apply_volley(target: &mut Object, kill: i32, expl: i32) {
    let mass1 = target.mass + 1;
    if target.shield > 0 {
        target.shield -= ((expl * 100 + mass1 - 1) / mass1).max(1);
        if target.shield < 0 {
            target.shield = 0;
        }
        return;
    }
    target.damage = (target.damage + ((expl * 100 + mass1 - 1) / mass1).max(1)).min(150);
    if !target.is_planet {
        target.crew -= (kill * 100 / mass1).max(1);
        if target.crew < 0 {
            target.crew = 0;
        }
    }
}

/// Count of distinct owners with living units.
fn teams_alive(objects: &[Object]) -> usize {
    let mut owners = objects
        .iter()
        .filter(|o| alive(o))
        .map(|o| o.owner)
        .collect::<Vec<_>>();
    owners.sort();
    owners.dedup();
    owners.len()
}

/// Resolve one fleet battle in place.
pub fn fight(objects: &mut [Object], cfg: &FlakConfig, weapons: &Weapons, rng: &mut Rng, stats: &mut [Statistic]) {
    for (obj, stat) in objects.iter().zip(stats.iter_mut()) {
        obj.check();
        stat.record_fight();
    }
    if teams_alive(objects) < 2 {
        return;
    }
    for tick in 1..=cfg.max_ticks {
        if tick % cfg.volley_interval != 0 {
            continue;
        }
        for shooter in 0..objects.len() {
            if !alive(&objects[shooter]) || !objects[shooter].is_armed() {
                continue;
            }
            let Some(target) = pick_target(objects, shooter, cfg) else {
                continue;
            };
            volley(objects, stats, shooter, target, cfg, weapons, rng);
        }
        if teams_alive(objects) < 2 {
            break;
        }
    }
}

/// One unit empties its charged weapons at one target.
fn volley(
    objects: &mut [Object],
    stats: &mut [Statistic],
    shooter: usize,
    target: usize,
    cfg: &FlakConfig,
    weapons: &Weapons,
    rng: &mut Rng,
) {
    let (beam_kill, beam_damage) = weapons.beam(objects[shooter].beam_type);
    let (torp_kill, torp_damage) = weapons.torpedo(objects[shooter].torpedo_type);

    // Beams always connect at fleet range.
    let beams = objects[shooter].num_beams;
    let beam_kill_rate = objects[shooter].beam_kill_rate;
    for _ in 0..beams {
        apply_volley(&mut objects[target], beam_kill * beam_kill_rate, beam_damage);
        if !alive(&objects[target]) {
            return;
        }
    }

    // Torpedo salvo, one per launcher while ammo lasts.
    let launchers = objects[shooter].num_launchers;
    for _ in 0..launchers {
        if objects[shooter].num_torpedoes <= 0 {
            break;
        }
        objects[shooter].num_torpedoes -= 1;
        if rng.chance(cfg.torp_hit_odds) {
            apply_volley(&mut objects[target], torp_kill, torp_damage);
            stats[shooter].record_torpedo_hit();
            if !alive(&objects[target]) {
                return;
            }
        }
    }

    // Fighter strikes, one wave per bay; one in ten does not come back.
    let bays = objects[shooter].num_bays;
    for _ in 0..bays {
        if objects[shooter].num_fighters <= 0 {
            break;
        }
        apply_volley(&mut objects[target], 2, 2);
        if rng.chance(10) {
            objects[shooter].num_fighters -= 1;
            let aboard = objects[shooter].num_fighters;
            stats[shooter].record_fighters_aboard(aboard);
        }
        if !alive(&objects[target]) {
            return;
        }
    }
}
