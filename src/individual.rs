use crate::towns::TownId;

/// A candidate route handed over by the optimizer: the order towns are visited in
/// plus its two fitness scores. Never modified after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    sequence: Vec<TownId>,
    distance_fitness: f64,
    time_fitness: f64,
}

impl Individual {
    pub fn new(sequence: Vec<TownId>, distance_fitness: f64, time_fitness: f64) -> Self {
        Self {
            sequence,
            distance_fitness,
            time_fitness,
        }
    }

    pub fn sequence(&self) -> &[TownId] {
        &self.sequence
    }

    pub fn distance_fitness(&self) -> f64 {
        self.distance_fitness
    }

    pub fn time_fitness(&self) -> f64 {
        self.time_fitness
    }
}
