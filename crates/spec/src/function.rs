use nova_core::PlayerSet;

/// Internal ids at and above this value refer to modified functions.
const MODIFIED_FUNCTION_BASE_ID: i32 = 99999;

/// Highest experience level a unit can reach.
pub const MAX_EXPERIENCE_LEVELS: i32 = 10;

/// Basic hull function ids the simulator cares about.
pub const FUNC_CLOAK: i32 = 1;
pub const FUNC_FULL_WEAPONRY: i32 = 12;
pub const FUNC_PLANET_IMMUNITY: i32 = 13;
pub const FUNC_DOUBLE_BEAM_CHARGE: i32 = 31;
pub const FUNC_DOUBLE_TORPEDO_CHARGE: i32 = 32;
pub const FUNC_SHIELD_GENERATOR: i32 = 35;

/// Set of experience levels, bit 0 = level 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSet(pub u16);

impl LevelSet {
    pub fn all() -> Self {
        Self((1 << (MAX_EXPERIENCE_LEVELS + 1)) - 1)
    }
    pub fn contains(&self, level: i32) -> bool {
        (0..=MAX_EXPERIENCE_LEVELS).contains(&level) && self.0 & (1 << level) != 0
    }
}

/// One hull function: a basic ability restricted to players and levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HullFunction {
    basic_id: i32,
    players: PlayerSet,
    levels: LevelSet,
    host_id: i32,
}

impl HullFunction {
    pub fn new(basic_id: i32) -> Self {
        Self {
            basic_id,
            players: PlayerSet::all(),
            levels: LevelSet::all(),
            host_id: -1,
        }
    }
    pub fn with_levels(basic_id: i32, levels: LevelSet) -> Self {
        Self {
            levels,
            ..Self::new(basic_id)
        }
    }
    pub fn basic_id(&self) -> i32 {
        self.basic_id
    }
    pub fn players(&self) -> PlayerSet {
        self.players
    }
    pub fn set_players(&mut self, players: PlayerSet) {
        self.players = players;
    }
    pub fn levels(&self) -> LevelSet {
        self.levels
    }
    pub fn host_id(&self) -> i32 {
        self.host_id
    }
    pub fn set_host_id(&mut self, host_id: i32) {
        self.host_id = host_id;
    }
    /// Two functions are the same device if they agree on ability and levels.
    pub fn is_same(&self, other: &HullFunction) -> bool {
        self.basic_id == other.basic_id && self.levels == other.levels
    }
}

/// Registry of level-restricted ("modified") hull functions.
///
/// Unmodified functions use their basic id as internal id; modified ones
/// are interned here and addressed from `MODIFIED_FUNCTION_BASE_ID` up.
#[derive(Debug, Default)]
pub struct ModifiedHullFunctionList {
    modified: Vec<HullFunction>,
}

impl ModifiedHullFunctionList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn clear(&mut self) {
        self.modified.clear();
    }
    /// Map a host-supplied device id to the internal id.
    pub fn function_id_from_host_id(&self, host_id: i32) -> i32 {
        self.modified
            .iter()
            .position(|f| f.host_id() == host_id)
            .map(|i| i as i32 + MODIFIED_FUNCTION_BASE_ID)
            .unwrap_or(host_id)
    }
    /// Map a definition to the internal id, interning it if necessary.
    pub fn function_id_from_definition(&mut self, def: &HullFunction) -> i32 {
        if def.levels() == LevelSet::all() {
            return def.basic_id();
        }
        if let Some(i) = self.modified.iter().position(|f| f.is_same(def)) {
            if def.host_id() >= 0 && self.modified[i].host_id() < 0 {
                self.modified[i].set_host_id(def.host_id());
            }
            return i as i32 + MODIFIED_FUNCTION_BASE_ID;
        }
        self.modified.push(def.clone());
        self.modified.len() as i32 - 1 + MODIFIED_FUNCTION_BASE_ID
    }
    /// Resolve an internal id back to its definition.
    ///
    /// Non-negative ids outside the modified range resolve to a default
    /// definition built from the id, even when the id names no known basic
    /// function. TODO: tighten validation against the basic function list.
    pub fn function_definition(&self, id: i32) -> Option<HullFunction> {
        if id >= MODIFIED_FUNCTION_BASE_ID {
            self.modified.get((id - MODIFIED_FUNCTION_BASE_ID) as usize).cloned()
        } else if id >= 0 {
            Some(HullFunction::new(id))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmodified_id_is_basic_id() {
        let mut list = ModifiedHullFunctionList::new();
        let def = HullFunction::new(FUNC_CLOAK);
        assert_eq!(list.function_id_from_definition(&def), FUNC_CLOAK);
    }

    #[test]
    fn modified_ids_are_interned() {
        let mut list = ModifiedHullFunctionList::new();
        let def = HullFunction::with_levels(FUNC_CLOAK, LevelSet(0b1110));
        let id = list.function_id_from_definition(&def);
        assert!(id >= MODIFIED_FUNCTION_BASE_ID);
        assert_eq!(list.function_id_from_definition(&def), id);
        let back = list.function_definition(id).unwrap();
        assert!(back.is_same(&def));
    }

    #[test]
    fn host_id_mapping() {
        let mut list = ModifiedHullFunctionList::new();
        let mut def = HullFunction::with_levels(FUNC_SHIELD_GENERATOR, LevelSet(0b0110));
        def.set_host_id(77);
        let id = list.function_id_from_definition(&def);
        assert_eq!(list.function_id_from_host_id(77), id);
        assert_eq!(list.function_id_from_host_id(12), 12);
    }

    #[test]
    fn unknown_nonnegative_id_falls_through() {
        let list = ModifiedHullFunctionList::new();
        let def = list.function_definition(4711).unwrap();
        assert_eq!(def.basic_id(), 4711);
        assert_eq!(def.levels(), LevelSet::all());
        assert_eq!(list.function_definition(-1), None);
    }
}
