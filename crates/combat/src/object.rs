use nova_core::Player;

/// Battle role of a participant, recorded by the PHost-family algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// The side that initiated combat.
    Aggressor,
    /// The side that was attacked.
    Opponent,
    /// Role not tracked by this algorithm.
    #[default]
    None,
}

/// One battle participant: a ship or a planet, reduced to combat state.
///
/// Invariants the caller must uphold: shield is 0 whenever damage is
/// nonzero; counts are non-negative; ammo is consistent with the presence
/// of launchers or bays. Violations are caller bugs, not error returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: i32,
    pub owner: Player,
    pub name: String,
    pub is_planet: bool,
    /// Combat mass in kt, after all orchestrator bonuses.
    pub mass: i32,
    pub crew: i32,
    /// Hull damage in percent, 0..=150.
    pub damage: i32,
    /// Shield level in percent, 0..=100 (shield generators may push to 125).
    pub shield: i32,
    pub beam_type: i32,
    pub num_beams: i32,
    pub torpedo_type: i32,
    pub num_launchers: i32,
    pub num_torpedoes: i32,
    pub num_bays: i32,
    pub num_fighters: i32,
    pub experience_level: i32,
    pub role: Role,
    // Algorithm rate parameters, percent-style scaled integers.
    pub beam_kill_rate: i32,
    pub beam_charge_rate: i32,
    pub torp_miss_rate: i32,
    pub torp_charge_rate: i32,
    pub crew_defense_rate: i32,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            id: 0,
            owner: 0,
            name: String::new(),
            is_planet: false,
            mass: 100,
            crew: 0,
            damage: 0,
            shield: 100,
            beam_type: 0,
            num_beams: 0,
            torpedo_type: 0,
            num_launchers: 0,
            num_torpedoes: 0,
            num_bays: 0,
            num_fighters: 0,
            experience_level: 0,
            role: Role::None,
            beam_kill_rate: 1,
            beam_charge_rate: 1,
            torp_miss_rate: 35,
            torp_charge_rate: 1,
            crew_defense_rate: 0,
        }
    }
}

impl Object {
    /// True once this unit can no longer take part in combat.
    pub fn is_out_of_action(&self, damage_limit: i32) -> bool {
        self.damage >= damage_limit || (!self.is_planet && self.crew <= 0)
    }
    /// True if any weapon system remains usable.
    pub fn is_armed(&self) -> bool {
        self.num_beams > 0
            || (self.num_launchers > 0 && self.num_torpedoes > 0)
            || (self.num_bays > 0 && self.num_fighters > 0)
    }
    /// Relative strength for the tick-cap tiebreak: remaining hull
    /// percentage plus shields, weighted by mass.
    pub fn hit_points(&self) -> i64 {
        ((100 - self.damage).max(0) + self.shield) as i64 * (self.mass + 1) as i64
    }
    /// Debug-build consistency check; violations are caller bugs.
    pub fn check(&self) {
        debug_assert!(self.damage == 0 || self.shield == 0);
        debug_assert!(self.num_torpedoes >= 0 && self.num_fighters >= 0);
        debug_assert!(self.num_beams >= 0 && self.num_launchers >= 0 && self.num_bays >= 0);
        debug_assert!((0..=150).contains(&self.damage));
        debug_assert!((0..=125).contains(&self.shield));
    }
}
