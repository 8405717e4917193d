use nova_core::Player;
use nova_spec::ShipList;

/// Unit is switched off and takes no part in the simulation.
pub const FL_DEACTIVATED: u32 = 1 << 0;
/// Ship is cloaked.
pub const FL_CLOAKED: u32 = 1 << 1;
/// Ship projects the commander bonus onto allied units.
pub const FL_COMMANDER: u32 = 1 << 2;
/// Ship donates shield charge to allied defenders.
pub const FL_SHIELD_GENERATOR: u32 = 1 << 3;

/// Combat intent of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggressiveness {
    /// Attacks nobody.
    #[default]
    Passive,
    /// Attacks everything hostile ("Kill" mission).
    Kill,
    /// Attacks ships and planets of one player (primary enemy).
    PrimaryEnemy(Player),
}

impl From<i32> for Aggressiveness {
    fn from(value: i32) -> Self {
        match value {
            -1 => Aggressiveness::Kill,
            1..=11 => Aggressiveness::PrimaryEnemy(value),
            _ => Aggressiveness::Passive,
        }
    }
}

/// One simulated ship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    pub id: i32,
    pub name: String,
    pub friendly_code: String,
    pub owner: Player,
    pub damage: i32,
    pub shield: i32,
    pub crew: i32,
    pub mass: i32,
    pub experience_level: i32,
    pub flags: u32,
    pub hull_type: i32,
    pub engine_type: i32,
    pub beam_type: i32,
    pub num_beams: i32,
    pub torpedo_type: i32,
    pub num_launchers: i32,
    pub num_bays: i32,
    /// Torpedoes for a torper, fighters for a carrier.
    pub ammo: i32,
    pub aggressiveness: Aggressiveness,
    /// Target ship id of an intercept-attack, 0 for none.
    pub intercept_id: i32,
    pub has_fuel: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            friendly_code: "???".to_string(),
            owner: 0,
            damage: 0,
            shield: 100,
            crew: 1,
            mass: 100,
            experience_level: 0,
            flags: 0,
            hull_type: 0,
            engine_type: 1,
            beam_type: 0,
            num_beams: 0,
            torpedo_type: 0,
            num_launchers: 0,
            num_bays: 0,
            ammo: 0,
            aggressiveness: Aggressiveness::Kill,
            intercept_id: 0,
            has_fuel: true,
        }
    }
}

impl Ship {
    /// Outfit this ship as a stock unit of the given hull: full crew, best
    /// weapons the hull mounts, magazine filled to cargo capacity.
    pub fn set_hull_type(&mut self, hull_id: i32, list: &ShipList) {
        let Some(hull) = list.hull(hull_id) else {
            return;
        };
        self.hull_type = hull_id;
        self.mass = hull.mass;
        self.crew = hull.max_crew;
        self.num_beams = hull.max_beams;
        self.beam_type = if hull.max_beams > 0 {
            list.num_beams() as i32
        } else {
            0
        };
        self.num_launchers = hull.max_launchers;
        self.torpedo_type = if hull.max_launchers > 0 {
            list.num_launchers() as i32
        } else {
            0
        };
        self.num_bays = hull.num_bays;
        self.ammo = if hull.max_launchers > 0 || hull.num_bays > 0 {
            hull.max_cargo
        } else {
            0
        };
    }
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }
    pub fn is_carrier(&self) -> bool {
        self.num_bays > 0
    }
}
