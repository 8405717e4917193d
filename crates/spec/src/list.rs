use crate::Beam;
use crate::Engine;
use crate::Hull;
use crate::ModifiedHullFunctionList;
use crate::TorpedoLauncher;

/// Component registry for one game.
///
/// Components are indexed by their 1-based ids. Missing ids resolve to
/// `None`; the simulator treats an unknown hull id as a caller bug.
#[derive(Debug, Default)]
pub struct ShipList {
    beams: Vec<Beam>,
    launchers: Vec<TorpedoLauncher>,
    engines: Vec<Engine>,
    hulls: Vec<Hull>,
    modified_functions: ModifiedHullFunctionList,
}

impl ShipList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn beam(&self, id: i32) -> Option<&Beam> {
        self.beams.iter().find(|b| b.id == id)
    }
    pub fn launcher(&self, id: i32) -> Option<&TorpedoLauncher> {
        self.launchers.iter().find(|l| l.id == id)
    }
    pub fn engine(&self, id: i32) -> Option<&Engine> {
        self.engines.iter().find(|e| e.id == id)
    }
    pub fn hull(&self, id: i32) -> Option<&Hull> {
        self.hulls.iter().find(|h| h.id == id)
    }
    pub fn num_beams(&self) -> usize {
        self.beams.len()
    }
    pub fn num_launchers(&self) -> usize {
        self.launchers.len()
    }
    pub fn add_beam(&mut self, beam: Beam) {
        self.beams.push(beam);
    }
    pub fn add_launcher(&mut self, launcher: TorpedoLauncher) {
        self.launchers.push(launcher);
    }
    pub fn add_engine(&mut self, engine: Engine) {
        self.engines.push(engine);
    }
    pub fn add_hull(&mut self, hull: Hull) {
        self.hulls.push(hull);
    }
    pub fn modified_functions(&self) -> &ModifiedHullFunctionList {
        &self.modified_functions
    }
    pub fn modified_functions_mut(&mut self) -> &mut ModifiedHullFunctionList {
        &mut self.modified_functions
    }

    /// Standard component set used throughout the test suites: the ten
    /// stock beams and torpedoes, two reference engines, and three
    /// reference hulls (a small escort, a torper, a carrier).
    pub fn standard() -> Self {
        let mut list = Self::new();
        for (id, name, kill, damage, tech, cost) in [
            (1, "Laser", 10, 3, 1, 1),
            (2, "X-Ray Laser", 15, 1, 1, 2),
            (3, "Plasma Bolt", 3, 10, 2, 5),
            (4, "Blaster", 10, 25, 3, 10),
            (5, "Positron Beam", 9, 29, 4, 12),
            (6, "Disruptor", 30, 20, 5, 13),
            (7, "Heavy Blaster", 20, 40, 6, 31),
            (8, "Phaser", 30, 35, 7, 35),
            (9, "Heavy Disruptor", 50, 35, 8, 36),
            (10, "Heavy Phaser", 35, 45, 10, 54),
        ] {
            list.add_beam(Beam {
                id,
                name: name.to_string(),
                kill_power: kill,
                damage_power: damage,
                tech,
                cost,
            });
        }
        for (id, name, kill, damage, tech, cost) in [
            (1, "Mark 1 Photon", 4, 5, 1, 1),
            (2, "Proton Torpedo", 6, 8, 2, 2),
            (3, "Mark 2 Photon", 3, 10, 3, 5),
            (4, "Gamma Bomb", 15, 2, 3, 10),
            (5, "Mark 3 Photon", 9, 15, 4, 12),
            (6, "Mark 4 Photon", 13, 30, 5, 13),
            (7, "Mark 5 Photon", 17, 35, 6, 31),
            (8, "Mark 6 Photon", 23, 40, 7, 35),
            (9, "Mark 7 Photon", 25, 48, 8, 36),
            (10, "Mark 8 Photon", 35, 55, 10, 54),
        ] {
            list.add_launcher(TorpedoLauncher {
                id,
                name: name.to_string(),
                kill_power: kill,
                damage_power: damage,
                tech,
                torpedo_cost: cost,
            });
        }
        list.add_engine(Engine {
            id: 5,
            name: "Nova Drive 5".to_string(),
            cost: 25,
            tech: 5,
        });
        list.add_engine(Engine {
            id: 9,
            name: "Transwarp Drive".to_string(),
            cost: 300,
            tech: 10,
        });
        list.add_hull(Hull {
            id: 1,
            name: "Outrider Class Scout".to_string(),
            mass: 75,
            max_crew: 180,
            num_engines: 1,
            max_beams: 1,
            max_launchers: 0,
            num_bays: 0,
            max_fuel: 260,
            max_cargo: 40,
        });
        list.add_hull(Hull {
            id: 53,
            name: "Annihilation Class Battleship".to_string(),
            mass: 960,
            max_crew: 2910,
            num_engines: 6,
            max_beams: 10,
            max_launchers: 10,
            num_bays: 0,
            max_fuel: 1260,
            max_cargo: 320,
        });
        list.add_hull(Hull {
            id: 70,
            name: "Gorbie Class Battlecarrier".to_string(),
            mass: 980,
            max_crew: 2287,
            num_engines: 6,
            max_beams: 10,
            max_launchers: 0,
            num_bays: 10,
            max_fuel: 1760,
            max_cargo: 250,
        });
        list
    }
}
