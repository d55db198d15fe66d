use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::env::{DiscreteActionSpace, Environment, Report};

pub type Room = usize;

const DOOR: f32 = -10.0;
const OUTSIDE: f32 = 100.0;

/// A building evacuation problem: rooms joined by doors, with one room standing for the outside
///
/// Every episode starts in a uniformly random room (possibly already outside) and ends
/// once the agent reaches the exit room.
///
/// Intended for use with a [QTableAgent](crate::algo::tabular::q_table::QTableAgent)
pub struct Building<R: Rng = StdRng> {
    doors: Vec<Vec<Room>>,
    rewards: Vec<Vec<Option<f32>>>,
    exit: Room,
    room: Room,
    rng: R,
    pub report: Report,
}

impl Building {
    /// The six-room building whose last room is the outside
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Building {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Building<R> {
    pub fn with_rng(rng: R) -> Self {
        let doors = vec![
            vec![4],
            vec![3, 5],
            vec![3],
            vec![1, 2, 4],
            vec![0, 3, 5],
            vec![1, 4, 5],
        ];
        Self::from_doors(doors, 5, rng)
    }

    /// Build a custom building from its door list
    ///
    /// Walking through a door costs `-10`, any door into `exit` pays `100`.
    ///
    /// **Panics** if a door leads to a room that does not exist
    pub fn from_doors(doors: Vec<Vec<Room>>, exit: Room, rng: R) -> Self {
        let n = doors.len();
        assert!(exit < n, "Exit room {exit} does not exist");

        let mut rewards = vec![vec![None; n]; n];
        for (from, to) in doors.iter().enumerate() {
            for &room in to {
                assert!(room < n, "Door from {from} leads to missing room {room}");
                rewards[from][room] = Some(if room == exit { OUTSIDE } else { DOOR });
            }
        }

        Self {
            doors,
            rewards,
            exit,
            room: exit,
            rng,
            report: Report::new(vec!["reward", "steps"]),
        }
    }

    pub fn rooms(&self) -> usize {
        self.doors.len()
    }

    pub fn room(&self) -> Room {
        self.room
    }

    pub fn exit(&self) -> Room {
        self.exit
    }

    /// Place the agent in a specific room
    pub fn enter(&mut self, room: Room) -> Room {
        assert!(room < self.rooms(), "Room {room} does not exist");
        self.room = room;
        room
    }
}

impl<R: Rng> DiscreteActionSpace for Building<R> {
    fn actions(&self) -> Vec<Self::Action> {
        if self.is_active() {
            self.doors[self.room].clone()
        } else {
            Vec::new()
        }
    }
}

impl<R: Rng> Environment for Building<R> {
    type State = Room;
    type Action = Room;

    fn is_active(&self) -> bool {
        self.room != self.exit
    }

    fn step(&mut self, action: Self::Action) -> (Option<Self::State>, f32) {
        let reward = self.rewards[self.room][action]
            .unwrap_or_else(|| panic!("No door from room {} to room {action}", self.room));
        self.room = action;

        self.report.add("steps", 1.0);
        self.report.add("reward", reward as f64);

        (self.is_active().then_some(self.room), reward)
    }

    fn reset(&mut self) -> Self::State {
        self.room = self.rng.gen_range(0..self.rooms());
        self.room
    }

    fn random_action(&mut self) -> Self::Action {
        *self.doors[self.room]
            .choose(&mut self.rng)
            .expect("Every room has at least one door")
    }
}
