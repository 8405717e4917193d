use crate::Planet;
use crate::Ship;

/// The fleet under simulation: an ordered list of ships and at most one
/// planet.
#[derive(Debug, Clone, Default)]
pub struct Setup {
    ships: Vec<Ship>,
    planet: Option<Planet>,
}

impl Setup {
    pub fn new() -> Self {
        Self::default()
    }
    /// Append a new ship and return it for configuration.
    pub fn add_ship(&mut self) -> &mut Ship {
        self.ships.push(Ship::default());
        self.ships.last_mut().unwrap()
    }
    /// Install the planet and return it for configuration.
    pub fn add_planet(&mut self) -> &mut Planet {
        self.planet = Some(Planet::default());
        self.planet.as_mut().unwrap()
    }
    pub fn num_ships(&self) -> usize {
        self.ships.len()
    }
    /// Number of simulation units: ships plus the planet.
    pub fn num_units(&self) -> usize {
        self.ships.len() + usize::from(self.planet.is_some())
    }
    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }
    pub fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }
    pub fn ship(&self, index: usize) -> Option<&Ship> {
        self.ships.get(index)
    }
    pub fn planet(&self) -> Option<&Planet> {
        self.planet.as_ref()
    }
    pub fn planet_mut(&mut self) -> Option<&mut Planet> {
        self.planet.as_mut()
    }
}
