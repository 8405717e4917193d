/// Host configuration parameters consumed by the per-pair algorithms.
///
/// All values are scaled integers; weapon charge levels run 0..=100.
/// Defaults mirror the classic host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Hard cap on battle ticks; at the cap the weaker side loses.
    pub max_ticks: i32,
    /// Initial distance between the two sides, in meters.
    pub starting_distance: i32,
    /// Distance closed per tick while both sides keep approaching.
    pub closing_speed: i32,
    /// Sides never close beyond this distance (except to board).
    pub standoff_distance: i32,
    /// Beams reach this far.
    pub beam_range: i32,
    /// Torpedoes reach this far.
    pub torp_range: i32,
    /// Minimum beam charge to pick off an enemy fighter; firing on the
    /// enemy hull always takes a full charge.
    pub beam_fighter_threshold: i32,
    /// Odds in percent that a charged beam catches a crossing fighter.
    pub beam_hit_fighter_odds: i32,
    /// Base beam recharge per tick, scaled by the object's charge rate.
    pub beam_recharge: i32,
    /// Base launcher recharge per tick, scaled by the charge rate.
    pub tube_recharge: i32,
    /// Bay recharge per tick.
    pub bay_recharge: i32,
    /// Fighter travel per tick, in meters.
    pub fighter_speed: i32,
    /// Crew casualties of one fighter strike.
    pub fighter_kill: i32,
    /// Hull damage of one fighter strike.
    pub fighter_damage: i32,
    /// Fighters a side may keep in flight at once.
    pub max_fighters_out: i32,
    /// Odds in percent of winning a fighter-vs-fighter pass.
    pub fighter_dogfight_odds: i32,
    /// Torpedo damage multiplier (classic host doubles warhead yield).
    pub torp_damage_scale: i32,
    /// Experience levels configured for the game; 0 disables modifiers.
    pub num_experience_levels: i32,
    /// Planets fire torpedoes when configured (PlanetsHaveTubes).
    pub planets_have_tubes: bool,
    /// Cloaked ships may attack when configured (AllowCloakedShipsAttack).
    pub allow_cloaked_ships_attack: bool,
    /// Federation ships gain +50 kt when configured (AllowFedCombatBonus).
    pub allow_fed_combat_bonus: bool,
    /// Ships of this player survive to 150% damage.
    pub regenerating_race: i32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_ticks: 2000,
            starting_distance: 57_000,
            closing_speed: 100,
            standoff_distance: 3_000,
            beam_range: 20_000,
            torp_range: 30_000,
            beam_fighter_threshold: 40,
            beam_hit_fighter_odds: 20,
            beam_recharge: 4,
            tube_recharge: 2,
            bay_recharge: 5,
            fighter_speed: 235,
            fighter_kill: 2,
            fighter_damage: 2,
            max_fighters_out: 19,
            fighter_dogfight_odds: 50,
            torp_damage_scale: 2,
            num_experience_levels: 0,
            planets_have_tubes: false,
            allow_cloaked_ships_attack: false,
            allow_fed_combat_bonus: true,
            regenerating_race: 2,
        }
    }
}

impl HostConfig {
    /// Damage at which a unit of the given owner is destroyed in battle.
    pub fn damage_limit(&self, owner: i32, is_planet: bool) -> i32 {
        if !is_planet && owner == self.regenerating_race {
            150
        } else {
            100
        }
    }
}

/// Configuration of the FLAK fleet-battle algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlakConfig {
    /// Hard cap on battle ticks.
    pub max_ticks: i32,
    /// Rating weight of combat mass.
    pub rating_mass_scale: i32,
    /// Rating weight of torpedo strength.
    pub rating_torp_scale: i32,
    /// Rating weight of beam strength.
    pub rating_beam_scale: i32,
    /// Rating weight of fighter bays.
    pub rating_bay_scale: i32,
    /// Ticks between volleys of one armed unit.
    pub volley_interval: i32,
    /// Odds in percent that a torpedo volley hits.
    pub torp_hit_odds: i32,
}

impl Default for FlakConfig {
    fn default() -> Self {
        Self {
            max_ticks: 2000,
            rating_mass_scale: 1,
            rating_torp_scale: 25,
            rating_beam_scale: 10,
            rating_bay_scale: 5,
            volley_interval: 3,
            torp_hit_odds: 65,
        }
    }
}
