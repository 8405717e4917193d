//! One simulation pass: preconditions, pairing, battle order, execution.

use crate::Aggressiveness;
use crate::BalancingMode;
use crate::Options;
use crate::Setup;
use crate::SimResult;
use crate::FL_CLOAKED;
use crate::FL_COMMANDER;
use crate::FL_DEACTIVATED;
use crate::FL_SHIELD_GENERATOR;
use nova_combat::Algorithm;
use nova_combat::Battle;
use nova_combat::FlakConfig;
use nova_combat::HostConfig;
use nova_combat::Object;
use nova_combat::Role;
use nova_combat::Statistic;
use nova_combat::Weapons;
use nova_combat::Winner;
use nova_core::Player;
use nova_core::Rng;

/// Klingon ships may open fire without fuel.
const KLINGON: Player = 4;
/// Bird Man ships; fuelless Birds are immune to planetary attack.
const BIRD: Player = 3;
/// Federation; eligible for the +50 kt crew bonus.
const FEDERATION: Player = 1;

/// Where a unit came from, for writing final state back to the setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    Ship(usize),
    Planet,
}

/// One combat-capable unit with its intent.
struct Unit {
    kind: UnitKind,
    object: Object,
    fcbo: i32,
    aggressiveness: Aggressiveness,
    intercept_id: i32,
    flags: u32,
    has_fuel: bool,
    fcode: String,
    alive: bool,
}

impl Unit {
    fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
}

/// Friendly-code battle order: a fully numeric code is the order value,
/// anything else sorts at 1000 plus the unit id. Classic Host ignores
/// negative codes; PHost honors them.
fn battle_order(fcode: &str, id: i32, phost: bool) -> i32 {
    match fcode.parse::<i32>() {
        Ok(value) if phost || value >= 0 => value,
        _ => 1000 + id,
    }
}

/// Matching special friendly codes suppress combat between two units.
/// "???" is the unknown placeholder and never matches; numeric codes are
/// battle orders, not match codes.
fn codes_match(a: &str, b: &str) -> bool {
    a == b
        && a != "???"
        && a.parse::<i32>().is_err()
        && !a.is_empty()
        && a.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Does `a` want to open fire on `b`?
fn wants_to_attack(a: &Unit, b: &Unit, opts: &Options) -> bool {
    if a.kind == UnitKind::Planet {
        // A planet is an aggressor with ATT/NUK; ATT needs the target to
        // have fuel aboard, NUK does not (and thus catches fuelless Birds).
        return b.kind != UnitKind::Planet
            && match a.fcode.as_str() {
                "NUK" => true,
                "ATT" => b.has_fuel,
                _ => false,
            };
    }
    if !a.has_fuel && a.object.owner != KLINGON {
        return false;
    }
    if a.intercept_id != 0 {
        if let UnitKind::Ship(_) = b.kind {
            if b.object.id == a.intercept_id {
                return true;
            }
        }
    }
    if opts.enemy_settings.get(a.object.owner, b.object.owner) {
        return true;
    }
    match a.aggressiveness {
        Aggressiveness::Kill => true,
        Aggressiveness::PrimaryEnemy(p) => b.object.owner == p,
        Aggressiveness::Passive => false,
    }
}

/// Full pairing matrix: both present, distinct owners, not allied, not
/// shielded by matching codes or cloak, fuel somewhere, and at least one
/// side aggressive.
fn is_eligible_pair(a: &Unit, b: &Unit, opts: &Options, cfg: &HostConfig) -> bool {
    a.alive
        && b.alive
        && a.object.owner != b.object.owner
        && a.object.owner > 0
        && b.object.owner > 0
        && !(opts.honor_alliances
            && opts.alliance_settings.is_mutual(a.object.owner, b.object.owner))
        && !codes_match(&a.fcode, &b.fcode)
        && !((a.has_flag(FL_CLOAKED) || b.has_flag(FL_CLOAKED))
            && !cfg.allow_cloaked_ships_attack)
        && (a.has_fuel || b.has_fuel)
        && (a.object.is_armed() || b.object.is_armed())
        && (wants_to_attack(a, b, opts) || wants_to_attack(b, a, opts))
}

/// A fuelless Bird Man ship is immune to planetary attack unless the
/// planet flies "NUK".
fn bird_immunity(ship: &Unit, planet: &Unit) -> bool {
    ship.object.owner == BIRD && !ship.has_fuel && planet.fcode != "NUK"
}

fn build_weapons(list: &nova_spec::ShipList) -> Weapons {
    let mut weapons = Weapons::default();
    for id in 1..=10 {
        if let Some(beam) = list.beam(id) {
            weapons.beam_kill[id as usize] = beam.kill_power;
            weapons.beam_damage[id as usize] = beam.damage_power;
        }
        if let Some(torp) = list.launcher(id) {
            weapons.torp_kill[id as usize] = torp.kill_power;
            weapons.torp_damage[id as usize] = torp.damage_power;
        }
    }
    weapons
}

/// Build the unit list, applying every mass and experience precondition.
fn build_units(setup: &Setup, opts: &Options, list: &nova_spec::ShipList, cfg: &HostConfig) -> Vec<Unit> {
    let algorithm = opts.mode.algorithm();
    let phost = algorithm.is_phost();
    let mut units = Vec::with_capacity(setup.num_units());
    for (index, ship) in setup.ships().iter().enumerate() {
        let mut object = Object {
            id: ship.id,
            owner: ship.owner,
            name: ship.name.clone(),
            is_planet: false,
            mass: ship.mass,
            crew: ship.crew,
            damage: ship.damage,
            shield: if ship.damage > 0 { 0 } else { ship.shield },
            beam_type: ship.beam_type,
            num_beams: ship.num_beams,
            torpedo_type: ship.torpedo_type,
            num_launchers: ship.num_launchers,
            num_torpedoes: if ship.num_launchers > 0 { ship.ammo } else { 0 },
            num_bays: ship.num_bays,
            num_fighters: if ship.num_bays > 0 { ship.ammo } else { 0 },
            experience_level: ship.experience_level,
            ..Object::default()
        };
        // Engine-shield bonus: engine cost scaled by the configured rate.
        if opts.engine_shield_bonus > 0 {
            if let Some(engine) = list.engine(ship.engine_type) {
                object.mass += engine.cost * opts.engine_shield_bonus / 100;
            }
        }
        // Federation crew bonus.
        if ship.owner == FEDERATION && opts.scotty_bonus && cfg.allow_fed_combat_bonus {
            object.mass += 50;
        }
        // 360k balancing runs carriers 360 kt heavy in this pass; the
        // doubled series covers the unweighted half.
        if opts.balancing_mode == BalancingMode::Balance360k && ship.num_bays > 0 {
            object.mass += 360;
        }
        // NTP empties the magazine, NTF grounds the fighters.
        match ship.friendly_code.as_str() {
            "NTP" => object.num_torpedoes = 0,
            "NTF" => object.num_fighters = 0,
            _ => {}
        }
        let alive = !ship.has_flag(FL_DEACTIVATED);
        units.push(Unit {
            kind: UnitKind::Ship(index),
            fcbo: battle_order(&ship.friendly_code, ship.id, phost),
            object,
            aggressiveness: ship.aggressiveness,
            intercept_id: ship.intercept_id,
            flags: ship.flags,
            has_fuel: ship.has_fuel,
            fcode: ship.friendly_code.clone(),
            alive,
        });
    }
    if let Some(planet) = setup.planet() {
        let object = Object {
            id: planet.id,
            owner: planet.owner,
            name: planet.name.clone(),
            is_planet: true,
            mass: planet.combat_mass(),
            crew: 0,
            damage: planet.damage,
            shield: if planet.damage > 0 { 0 } else { planet.shield },
            beam_type: planet.combat_beam_type(list),
            num_beams: planet.combat_beams(),
            torpedo_type: if cfg.planets_have_tubes {
                planet.combat_torpedo_type(list)
            } else {
                0
            },
            num_launchers: if cfg.planets_have_tubes {
                planet.combat_launchers()
            } else {
                0
            },
            num_torpedoes: if cfg.planets_have_tubes {
                planet.combat_torpedoes(list)
            } else {
                0
            },
            num_bays: planet.combat_bays(),
            num_fighters: planet.combat_fighters(),
            experience_level: planet.experience_level,
            ..Object::default()
        };
        units.push(Unit {
            kind: UnitKind::Planet,
            fcbo: battle_order(&planet.friendly_code, planet.id, phost),
            object,
            aggressiveness: Aggressiveness::Passive,
            intercept_id: 0,
            flags: planet.flags,
            has_fuel: true,
            fcode: planet.friendly_code.clone(),
            alive: planet.flags & FL_DEACTIVATED == 0,
        });
    }
    // A passive allied commander raises everyone's level by one.
    if algorithm.has_experience() && cfg.num_experience_levels > 0 {
        let commanders: Vec<Player> = units
            .iter()
            .filter(|u| u.alive && u.has_flag(FL_COMMANDER))
            .filter(|u| u.aggressiveness == Aggressiveness::Passive)
            .map(|u| u.object.owner)
            .collect();
        for unit in units.iter_mut() {
            if commanders.contains(&unit.object.owner) && !unit.has_flag(FL_COMMANDER) {
                unit.object.experience_level =
                    (unit.object.experience_level + 1).min(cfg.num_experience_levels);
            }
        }
    }
    units
}

/// Initiator and defender of a pair: the side holding the lower battle
/// order opens the fight, provided it actually wants to; a unit that is
/// merely being attacked never initiates.
fn split_pair(units: &[Unit], i: usize, j: usize, opts: &Options) -> (usize, usize) {
    let i_first = if units[i].fcbo != units[j].fcbo {
        units[i].fcbo < units[j].fcbo
    } else {
        units[i].object.id < units[j].object.id
    };
    let (initiator, defender) = if i_first { (i, j) } else { (j, i) };
    if wants_to_attack(&units[initiator], &units[defender], opts) {
        (initiator, defender)
    } else {
        (defender, initiator)
    }
}

/// The next fight, by ascending battle order: the eligible pair with the
/// lowest minimum FCBO; among those, a pair whose low-order side is the
/// actual attacker precedes one where it is merely the victim; further
/// ties go to the lower maximum, then to the ids. Returns
/// (initiator, defender).
fn next_pair(units: &[Unit], opts: &Options, cfg: &HostConfig) -> Option<(usize, usize)> {
    let mut best: Option<((i32, i32, i32, i32, i32), usize, usize)> = None;
    for i in 0..units.len() {
        for j in i + 1..units.len() {
            let (a, b) = (&units[i], &units[j]);
            if !is_eligible_pair(a, b, opts, cfg) {
                continue;
            }
            if b.kind == UnitKind::Planet && bird_immunity(a, b) && !wants_to_attack(a, b, opts) {
                continue;
            }
            if a.kind == UnitKind::Planet && bird_immunity(b, a) && !wants_to_attack(b, a, opts) {
                continue;
            }
            let (initiator, defender) = split_pair(units, i, j, opts);
            let initiates = units[initiator].fcbo <= units[defender].fcbo;
            let key = (
                a.fcbo.min(b.fcbo),
                i32::from(!initiates),
                a.fcbo.max(b.fcbo),
                a.object.id.min(b.object.id),
                a.object.id.max(b.object.id),
            );
            if best.as_ref().map(|(k, _, _)| key < *k).unwrap_or(true) {
                best = Some((key, i, j));
            }
        }
    }
    best.map(|(_, i, j)| split_pair(units, i, j, opts))
}

/// Shield-generator support: each passive allied generator attending the
/// fight donates 25% shield to the defender, capped at 125.
fn shield_support(units: &[Unit], defender: usize) -> i32 {
    let owner = units[defender].object.owner;
    units
        .iter()
        .enumerate()
        .filter(|(i, u)| {
            *i != defender
                && u.alive
                && u.object.owner == owner
                && u.has_flag(FL_SHIELD_GENERATOR)
                && u.aggressiveness == Aggressiveness::Passive
        })
        .count() as i32
        * 25
}

/// Drive one full deterministic simulation pass over the setup.
///
/// Final unit states are written back into the setup; destroyed or
/// captured units come back with owner 0. The caller's RNG advances once
/// per battle unless seed control is on — except in FLAK mode, which
/// draws its seed unconditionally.
pub fn simulate(
    setup: &mut Setup,
    opts: &Options,
    list: &nova_spec::ShipList,
    cfg: &HostConfig,
    flak_cfg: &FlakConfig,
    rng: &mut Rng,
) -> SimResult {
    let algorithm = opts.mode.algorithm();
    let weapons = build_weapons(list);
    let mut units = build_units(setup, opts, list, cfg);
    let mut result = SimResult::default();
    result.init(opts, 0);

    // Setup-dependent series weighting.
    let any_bays = units.iter().any(|u| u.object.num_bays > 0);
    let any_fighters = units.iter().any(|u| u.object.num_fighters > 0);
    let multiplier = opts.balance_multiplier(any_bays, any_fighters);
    result.series_length *= multiplier;
    result.total_battle_weight = opts.total_battle_weight();
    result.this_battle_weight = result.total_battle_weight / multiplier;

    // Deterministic seed source under seed control, mixed from the setup
    // itself so the same fleet always replays the same battles.
    let mixed = units.iter().fold(0x5EED_0000u32, |acc, u| {
        acc.wrapping_mul(31)
            .wrapping_add(u.object.id as u32)
            .wrapping_add((u.object.owner as u32) << 16)
    });
    let mut pinned = Rng::new(mixed.wrapping_add(result.this_battle_index as u32));
    let mut stats: Vec<Statistic> = units.iter().map(|u| Statistic::init(&u.object)).collect();

    if algorithm == Algorithm::Flak {
        run_flak(&mut units, &mut stats, opts, cfg, flak_cfg, &weapons, rng, &mut result);
    } else {
        run_pairwise(
            &mut units,
            &mut stats,
            opts,
            cfg,
            &weapons,
            rng,
            &mut pinned,
            &mut result,
            algorithm,
        );
    }

    write_back(setup, &units, list);
    result.stats = stats;
    log::debug!(
        "[sim] {} battles, series {}, weight {}/{}",
        result.battles.len(),
        result.series_length,
        result.this_battle_weight,
        result.total_battle_weight
    );
    result
}

fn run_pairwise(
    units: &mut [Unit],
    stats: &mut [Statistic],
    opts: &Options,
    cfg: &HostConfig,
    weapons: &Weapons,
    rng: &mut Rng,
    pinned: &mut Rng,
    result: &mut SimResult,
    algorithm: Algorithm,
) {
    while let Some((attacker, defender)) = next_pair(units, opts, cfg) {
        let seed = if opts.seed_control {
            pinned.bits() << 16 | pinned.bits()
        } else {
            rng.bits() << 16 | rng.bits()
        };
        if result.battles.is_empty() {
            result.seed = seed;
        }
        let mut battle_rng = Rng::new(seed);

        // Side assignment: planets fight on the right; classic puts the
        // aggressor right, PHost the lower id left, optionally shuffled.
        let (mut left, mut right) = match (units[attacker].kind, units[defender].kind) {
            (UnitKind::Planet, _) => (defender, attacker),
            (_, UnitKind::Planet) => (attacker, defender),
            _ if !algorithm.is_phost() => (defender, attacker),
            _ => {
                if units[attacker].object.id < units[defender].object.id {
                    (attacker, defender)
                } else {
                    (defender, attacker)
                }
            }
        };
        if opts.random_left_right
            && algorithm.is_phost()
            && units[left].kind != UnitKind::Planet
            && units[right].kind != UnitKind::Planet
            && battle_rng.chance(50)
        {
            std::mem::swap(&mut left, &mut right);
        }

        // Roles and shield support.
        if algorithm.has_roles() {
            units[attacker].object.role = Role::Aggressor;
            units[defender].object.role = Role::Opponent;
        }
        let support = shield_support(units, defender);
        if support > 0 && units[defender].object.damage == 0 {
            units[defender].object.shield = (units[defender].object.shield + support).min(125);
        }

        let before = vec![units[left].object.clone(), units[right].object.clone()];
        let mut left_obj = units[left].object.clone();
        let mut right_obj = units[right].object.clone();
        let mut left_stat = Statistic::init(&left_obj);
        let mut right_stat = Statistic::init(&right_obj);
        let winner = algorithm.resolve(
            &mut left_obj,
            &mut right_obj,
            cfg,
            weapons,
            seed,
            &mut left_stat,
            &mut right_stat,
        );

        // Carry state forward and retire the loser.
        units[left].object = left_obj.clone();
        units[right].object = right_obj.clone();
        let loser = match winner {
            Winner::Left => right,
            Winner::Right => left,
        };
        let victor = if loser == left { right } else { left };
        units[loser].alive = false;
        units[loser].object.owner = 0;
        if units[victor].object.damage >= algorithm.damage_tech_limit()
            || (!units[victor].object.is_planet && units[victor].object.crew <= 0)
        {
            units[victor].alive = false;
        }
        stats[left].merge(&left_stat);
        stats[right].merge(&right_stat);

        result.battles.push(Battle::new(
            algorithm,
            seed,
            before,
            vec![units[left].object.clone(), units[right].object.clone()],
            vec![left_stat, right_stat],
        ));

        if opts.randomize_fcodes_on_every_fight {
            for unit in units.iter_mut() {
                if unit.alive && unit.kind != UnitKind::Planet {
                    unit.fcbo = battle_rng.range(0, 999);
                }
            }
        }
    }
}

fn run_flak(
    units: &mut [Unit],
    stats: &mut [Statistic],
    opts: &Options,
    cfg: &HostConfig,
    flak_cfg: &FlakConfig,
    weapons: &Weapons,
    rng: &mut Rng,
    result: &mut SimResult,
) {
    // FLAK draws its seed even under seed control; deliberate, matches
    // the fielded implementation.
    let seed = rng.bits() << 16 | rng.bits();
    result.seed = seed;
    let fighters: Vec<usize> = (0..units.len())
        .filter(|i| {
            (0..units.len()).any(|j| {
                j != *i && is_eligible_pair(&units[*i], &units[j], opts, cfg)
            })
        })
        .collect();
    if fighters.len() < 2 {
        return;
    }
    let mut objects: Vec<Object> = fighters.iter().map(|i| units[*i].object.clone()).collect();
    let mut battle_stats: Vec<Statistic> = objects.iter().map(Statistic::init).collect();
    Algorithm::Flak.resolve_fleet(&mut objects, flak_cfg, weapons, seed, &mut battle_stats);

    let before: Vec<Object> = fighters.iter().map(|i| units[*i].object.clone()).collect();
    for (slot, unit_idx) in fighters.iter().enumerate() {
        let limit = cfg.damage_limit(objects[slot].owner, objects[slot].is_planet);
        units[*unit_idx].object = objects[slot].clone();
        if objects[slot].is_out_of_action(limit) {
            units[*unit_idx].alive = false;
            units[*unit_idx].object.owner = 0;
        }
        stats[*unit_idx].merge(&battle_stats[slot]);
    }
    result
        .battles
        .push(Battle::new(Algorithm::Flak, seed, before, objects, battle_stats));
}

/// Copy final combat state back into the caller's setup.
fn write_back(setup: &mut Setup, units: &[Unit], list: &nova_spec::ShipList) {
    for unit in units {
        match unit.kind {
            UnitKind::Ship(i) => {
                let ship = &mut setup.ships_mut()[i];
                ship.damage = unit.object.damage;
                ship.shield = unit.object.shield;
                ship.crew = unit.object.crew;
                ship.owner = unit.object.owner;
                ship.ammo = if ship.num_bays > 0 {
                    unit.object.num_fighters
                } else {
                    unit.object.num_torpedoes
                };
            }
            UnitKind::Planet => {
                let consumed_type = unit.object.torpedo_type;
                let initial = setup
                    .planet()
                    .map(|p| p.combat_torpedoes(list))
                    .unwrap_or(0);
                let planet = setup.planet_mut().unwrap();
                planet.damage = unit.object.damage;
                planet.shield = unit.object.shield;
                planet.owner = unit.object.owner;
                // Fired torpedoes come out of the starbase stockpile, by
                // money value, evenly across the stocked types.
                let consumed = initial - unit.object.num_torpedoes;
                if consumed > 0 {
                    if let Some(launcher) = list.launcher(consumed_type) {
                        let value = consumed * launcher.torpedo_cost;
                        let cost_sum: i32 = (1..=10)
                            .filter(|t| planet.num_base_torpedoes(*t) > 0)
                            .filter_map(|t| list.launcher(t).map(|l| l.torpedo_cost))
                            .sum();
                        if cost_sum > 0 {
                            let each = (value + cost_sum - 1) / cost_sum;
                            for t in 1..=10 {
                                let stock = planet.num_base_torpedoes(t);
                                if stock > 0 {
                                    planet.set_num_base_torpedoes(t, (stock - each).max(0));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ship;
    use crate::VcrMode;
    use nova_spec::ShipList;

    fn deterministic_options(mode: VcrMode) -> Options {
        Options {
            mode,
            engine_shield_bonus: 0,
            scotty_bonus: true,
            random_left_right: false,
            honor_alliances: true,
            only_one_simulation: true,
            seed_control: true,
            randomize_fcodes_on_every_fight: false,
            ..Options::default()
        }
    }

    fn add_ship(setup: &mut Setup, hull: i32, id: i32, owner: i32, list: &ShipList) {
        let ship = setup.add_ship();
        ship.id = id;
        ship.owner = owner;
        ship.set_hull_type(hull, list);
    }

    fn add_outrider(setup: &mut Setup, id: i32, owner: i32, list: &ShipList) {
        add_ship(setup, 1, id, owner, list);
    }

    fn run(setup: &mut Setup, opts: &Options, rng: &mut Rng) -> SimResult {
        let list = ShipList::standard();
        let cfg = HostConfig::default();
        let flak_cfg = FlakConfig::default();
        simulate(setup, opts, &list, &cfg, &flak_cfg, rng)
    }

    #[test]
    fn host_duel_basics() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);

        // Seed control leaves the caller's generator untouched.
        assert_eq!(rng.seed(), 42);
        assert_eq!(result.num_battles(), 1);
        assert_eq!(result.this_battle_weight, 1);
        assert_eq!(result.total_battle_weight, 1);
        assert_eq!(result.series_length, 110);
        assert_eq!(result.this_battle_index, 0);
        assert_eq!(result.stats.len(), 2);

        // Ship 1 defends the right-hand side and goes down one salvo
        // short; ship 2 survives with its shields stripped.
        let s1 = setup.ship(0).unwrap();
        assert_eq!(s1.damage, 107);
        assert_eq!(s1.shield, 0);
        assert_eq!(s1.crew, 103);
        assert_eq!(s1.owner, 0);
        let s2 = setup.ship(1).unwrap();
        assert_eq!(s2.damage, 82);
        assert_eq!(s2.shield, 0);
        assert_eq!(s2.crew, 121);
        assert_eq!(s2.owner, 11);
    }

    #[test]
    fn identical_inputs_identical_results() {
        let list = ShipList::standard();
        let opts = deterministic_options(VcrMode::Host);
        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let mut setup = Setup::new();
            add_outrider(&mut setup, 1, 12, &list);
            add_outrider(&mut setup, 2, 11, &list);
            let mut rng = Rng::new(42);
            let result = run(&mut setup, &opts, &mut rng);
            outcomes.push((
                setup.ships().to_vec(),
                result.seed,
                result.num_battles(),
            ));
        }
        assert_eq!(outcomes[0], outcomes[1]);
    }

    #[test]
    fn engine_shield_bonus_mass() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 6, &list);
        add_outrider(&mut setup, 2, 9, &list);
        setup.ships_mut()[0].engine_type = 5; // Nova Drive 5, 25 mc
        setup.ships_mut()[1].engine_type = 9; // Transwarp, 300 mc
        let mut opts = deterministic_options(VcrMode::Host);
        opts.engine_shield_bonus = 20;
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(rng.seed(), 42);
        let battle = result.battle(0).unwrap();
        // Host puts the initiator right: ship 1 opens, ship 2 defends left.
        assert_eq!(battle.object(0).owner, 9);
        assert_eq!(battle.object(0).mass, 75 + 60);
        assert_eq!(battle.object(1).owner, 6);
        assert_eq!(battle.object(1).mass, 75 + 5);
    }

    #[test]
    fn federation_crew_bonus() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 1, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        let battle = result.battle(0).unwrap();
        let fed = (0..2)
            .map(|i| battle.object(i))
            .find(|o| o.owner == 1)
            .unwrap();
        assert_eq!(fed.mass, 75 + 50);
    }

    #[test]
    fn ntp_empties_torpedoes_and_orders_sides() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_ship(&mut setup, 53, 1, 6, &list);
        add_ship(&mut setup, 53, 2, 2, &list);
        setup.ships_mut()[1].friendly_code = "NTP".to_string();
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(rng.seed(), 42);
        let battle = result.battle(0).unwrap();
        assert_eq!(battle.object(0).id, 2);
        assert_eq!(battle.object(0).num_torpedoes, 0);
        assert_eq!(battle.object(1).id, 1);
        assert_eq!(battle.object(1).num_torpedoes, 320);
    }

    #[test]
    fn intercept_attack_pairs_interceptors() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        for (id, owner) in [(1, 1), (2, 2), (3, 3), (4, 4)] {
            add_outrider(&mut setup, id, owner, &list);
        }
        for (index, fcode) in [(2, "200"), (3, "100")] {
            let ship = &mut setup.ships_mut()[index];
            ship.aggressiveness = Aggressiveness::PrimaryEnemy(2);
            ship.intercept_id = 2;
            ship.friendly_code = fcode.to_string();
        }
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        // The lower battle order (ship 4, "100") engages its intercept
        // target first and fights on the right.
        assert_eq!(result.battle(0).unwrap().object(0).id, 2);
        assert_eq!(result.battle(0).unwrap().object(1).id, 4);
    }

    #[test]
    fn battle_order_is_lowest_fcbo_first() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 1, &list);
        add_outrider(&mut setup, 2, 2, &list);
        add_outrider(&mut setup, 3, 2, &list);
        add_outrider(&mut setup, 4, 2, &list);
        setup.ships_mut()[0].friendly_code = "-20".to_string(); // not numeric for Host
        setup.ships_mut()[1].friendly_code = "100".to_string();
        setup.ships_mut()[2].friendly_code = "300".to_string();
        setup.ships_mut()[3].friendly_code = "200".to_string();
        let planet = setup.add_planet();
        planet.id = 17;
        planet.owner = 1;
        planet.friendly_code = "ATT".to_string();
        planet.defense = 61;
        planet.base_defense = 30;
        planet.base_beam_tech = 5;
        planet.num_base_fighters = 12;
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);

        // First fight: ship 2 ("100") initiates against ship 1 and takes
        // the right-hand side.
        assert!(result.num_battles() >= 1);
        let battle = result.battle(0).unwrap();
        assert_eq!(battle.object(0).id, 1);
        assert_eq!(battle.object(1).id, 2);
        // Every subsequent battle involves the planet on the right or two
        // ships of different owners.
        for battle in &result.battles {
            assert_ne!(battle.object(0).owner, battle.object(1).owner);
            if battle.object(0).is_planet || battle.object(1).is_planet {
                assert!(battle.object(1).is_planet);
            }
        }
    }

    #[test]
    fn deactivated_allied_passive_make_no_battles() {
        let list = ShipList::standard();
        let opts = deterministic_options(VcrMode::Host);

        // Deactivated.
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].flags = FL_DEACTIVATED;
        setup.ships_mut()[1].intercept_id = 1;
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);

        // Mutually allied.
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let mut opts_allied = opts.clone();
        opts_allied.alliance_settings.set(11, 12, true);
        opts_allied.alliance_settings.set(12, 11, true);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts_allied, &mut rng).num_battles(), 0);

        // Both passive.
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::Passive;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Passive;
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);

        // Mismatching primary enemies.
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::PrimaryEnemy(7);
        setup.ships_mut()[1].aggressiveness = Aggressiveness::PrimaryEnemy(2);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);
    }

    #[test]
    fn persistent_enemies_force_battle() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::Passive;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Passive;
        let mut opts = deterministic_options(VcrMode::Host);
        opts.enemy_settings.set(12, 11, true);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 1);
    }

    #[test]
    fn matching_codes_suppress_combat() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].friendly_code = "xyz".to_string();
        setup.ships_mut()[1].friendly_code = "xyz".to_string();
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);
    }

    #[test]
    fn planet_fights_on_the_right() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 5, &list);
        let planet = setup.add_planet();
        planet.id = 1;
        planet.owner = 4;
        planet.defense = 61;
        planet.base_defense = 30;
        planet.base_beam_tech = 5;
        planet.num_base_fighters = 12;
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(result.num_battles(), 1);
        assert!(result.battle(0).unwrap().object(1).is_planet);
        assert_eq!(result.stats.len(), 2);
    }

    #[test]
    fn balance_360k_doubles_series_and_halves_weight() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let mut opts = deterministic_options(VcrMode::Host);
        opts.balancing_mode = BalancingMode::Balance360k;
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(result.series_length, 220);
        assert_eq!(result.this_battle_weight, 50);
        assert_eq!(result.total_battle_weight, 100);
    }

    #[test]
    fn master_at_arms_scales_with_carrier_features() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_ship(&mut setup, 70, 1, 8, &list);
        add_ship(&mut setup, 70, 2, 6, &list);
        let mut opts = deterministic_options(VcrMode::Host);
        opts.balancing_mode = BalancingMode::BalanceMasterAtArms;
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(result.series_length, 440);
        assert_eq!(result.total_battle_weight, 1000);
        assert_eq!(result.this_battle_weight, 250);
    }

    #[test]
    fn random_left_right_doubles_phost_series() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let mut opts = deterministic_options(VcrMode::PHost4);
        opts.random_left_right = true;
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(rng.seed(), 42);
        assert_eq!(result.series_length, 220);
        assert_eq!(result.num_battles(), 1);
    }

    #[test]
    fn nuhost_series_length() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let opts = deterministic_options(VcrMode::NuHost);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_eq!(result.series_length, 118);
    }

    #[test]
    fn without_seed_control_the_rng_advances() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        let mut opts = deterministic_options(VcrMode::Host);
        opts.seed_control = false;
        let mut rng = Rng::new(42);
        run(&mut setup, &opts, &mut rng);
        assert_ne!(rng.seed(), 42);
    }

    #[test]
    fn flak_advances_rng_even_under_seed_control() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_ship(&mut setup, 53, 1, 1, &list);
        add_ship(&mut setup, 53, 2, 1, &list);
        add_ship(&mut setup, 53, 3, 4, &list);
        let opts = deterministic_options(VcrMode::Flak);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        assert_ne!(rng.seed(), 42);
        assert_eq!(result.num_battles(), 1);
        assert_eq!(result.battle(0).unwrap().num_objects(), 3);
    }

    #[test]
    fn commander_raises_allied_experience() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 1, &list);
        add_outrider(&mut setup, 2, 2, &list);
        add_outrider(&mut setup, 3, 2, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::Passive;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Kill;
        let commander = &mut setup.ships_mut()[2];
        commander.aggressiveness = Aggressiveness::Passive;
        commander.experience_level = 3;
        commander.flags = FL_COMMANDER;
        let opts = deterministic_options(VcrMode::PHost4);
        let list_cfg = HostConfig {
            num_experience_levels: 4,
            ..HostConfig::default()
        };
        let mut rng = Rng::new(42);
        let result = simulate(
            &mut setup,
            &opts,
            &list,
            &list_cfg,
            &FlakConfig::default(),
            &mut rng,
        );
        assert_eq!(result.num_battles(), 1);
        let battle = result.battle(0).unwrap();
        assert_eq!(battle.object(0).id, 1);
        assert_eq!(battle.object(0).experience_level, 0);
        assert_eq!(battle.object(1).id, 2);
        assert_eq!(battle.object(1).experience_level, 1);
        assert_eq!(result.stats[2].num_fights(), 0);
    }

    #[test]
    fn shield_generator_supports_defender() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 1, &list);
        add_outrider(&mut setup, 2, 2, &list);
        add_outrider(&mut setup, 3, 1, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::Passive;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Kill;
        let generator = &mut setup.ships_mut()[2];
        generator.aggressiveness = Aggressiveness::Passive;
        generator.flags = FL_SHIELD_GENERATOR;
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        // Ship 1 defends on the left with the generator's 25% on top.
        let battle = result.battle(0).unwrap();
        assert_eq!(battle.object(0).id, 1);
        assert_eq!(battle.object(0).shield, 125);
    }

    #[test]
    fn phost_records_roles() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].aggressiveness = Aggressiveness::Kill;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Passive;
        let opts = deterministic_options(VcrMode::PHost4);
        let mut rng = Rng::new(42);
        let result = run(&mut setup, &opts, &mut rng);
        let battle = result.battle(0).unwrap();
        let roles = [battle.role(0), battle.role(1)];
        assert!(roles.contains(&Role::Aggressor));
        assert!(roles.contains(&Role::Opponent));
        // Ship 1 is the only aggressive side.
        let aggressor = (0..2).find(|i| battle.role(*i) == Role::Aggressor).unwrap();
        assert_eq!(battle.object(aggressor).id, 1);
    }

    #[test]
    fn cloaked_ships_do_not_fight_by_default() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].flags = FL_CLOAKED;
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);

        let cfg = HostConfig {
            allow_cloaked_ships_attack: true,
            ..HostConfig::default()
        };
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].flags = FL_CLOAKED;
        let mut rng = Rng::new(42);
        let result = simulate(
            &mut setup,
            &opts,
            &list,
            &cfg,
            &FlakConfig::default(),
            &mut rng,
        );
        assert_eq!(result.num_battles(), 1);
    }

    #[test]
    fn fuelless_ships_cannot_attack_unless_klingon() {
        let list = ShipList::standard();
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 12, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].has_fuel = false;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Passive;
        let opts = deterministic_options(VcrMode::Host);
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 0);

        // The same situation with a Klingon attacker does fight.
        let mut setup = Setup::new();
        add_outrider(&mut setup, 1, 4, &list);
        add_outrider(&mut setup, 2, 11, &list);
        setup.ships_mut()[0].has_fuel = false;
        setup.ships_mut()[1].aggressiveness = Aggressiveness::Passive;
        let mut rng = Rng::new(42);
        assert_eq!(run(&mut setup, &opts, &mut rng).num_battles(), 1);
    }
}
