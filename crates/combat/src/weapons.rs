/// Weapon power tables, indexed by weapon type 0..=10.
///
/// The engine is pure: beam and torpedo powers arrive as input rather than
/// being looked up in a ship list. Type 0 means "no weapon" and stays zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weapons {
    pub beam_kill: [i32; 11],
    pub beam_damage: [i32; 11],
    pub torp_kill: [i32; 11],
    pub torp_damage: [i32; 11],
}

impl Default for Weapons {
    fn default() -> Self {
        Self {
            beam_kill: [0; 11],
            beam_damage: [0; 11],
            torp_kill: [0; 11],
            torp_damage: [0; 11],
        }
    }
}

impl Weapons {
    /// (kill, damage) of a beam type; unknown types count as unarmed.
    pub fn beam(&self, beam_type: i32) -> (i32, i32) {
        match usize::try_from(beam_type) {
            Ok(t) if t < 11 => (self.beam_kill[t], self.beam_damage[t]),
            _ => (0, 0),
        }
    }
    /// (kill, damage) of a torpedo type; unknown types count as unarmed.
    pub fn torpedo(&self, torpedo_type: i32) -> (i32, i32) {
        match usize::try_from(torpedo_type) {
            Ok(t) if t < 11 => (self.torp_kill[t], self.torp_damage[t]),
            _ => (0, 0),
        }
    }
    /// The stock weapon set; tests and previews that do not carry a ship
    /// list use this.
    pub fn standard() -> Self {
        Self {
            beam_kill: [0, 10, 15, 3, 10, 9, 30, 20, 30, 50, 35],
            beam_damage: [0, 3, 1, 10, 25, 29, 20, 40, 35, 35, 45],
            torp_kill: [0, 4, 6, 3, 15, 9, 13, 17, 23, 25, 35],
            torp_damage: [0, 5, 8, 10, 2, 15, 30, 35, 40, 48, 55],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let weapons = Weapons::standard();
        assert_eq!(weapons.beam(10), (35, 45));
        assert_eq!(weapons.torpedo(1), (4, 5));
        assert_eq!(weapons.beam(0), (0, 0));
        assert_eq!(weapons.beam(11), (0, 0));
        assert_eq!(weapons.torpedo(-3), (0, 0));
    }
}
