//! # HGS-VRPTW
//!
//! A Rust implementation of the Hybrid Genetic Search algorithm for the
//! Vehicle Routing Problem with Time Windows, covering the capacitated and
//! release-time variants.
//!
//! The algorithm combines genetic search with a granular local improvement
//! engine (including the SWAP* neighborhood), an exact Split of giant tours
//! into routes, and population management that balances solution quality
//! against diversity while adapting infeasibility penalties.

pub mod circle_sector;
pub mod config;
pub mod crossover;
pub mod error;
pub mod genetic;
pub mod individual;
pub mod local_search;
pub mod matrix;
pub mod params;
pub mod population;
pub mod rng;
pub mod split;

use tracing::info;

use crate::error::Result;
use crate::genetic::Genetic;
use crate::individual::Individual;
use crate::local_search::LocalSearch;
use crate::params::Params;
use crate::population::Population;
use crate::split::Split;

/// The main structure orchestrating the hybrid genetic search.
pub struct HgsAlgorithm {
    pub params: Params,
    pub population: Population,
    pub split: Split,
    pub local_search: LocalSearch,
    pub genetic: Genetic,
}

impl HgsAlgorithm {
    /// Create a solver for the given parameter store.
    pub fn new(params: Params) -> Self {
        let split = Split::new(&params);
        let local_search = LocalSearch::new(&params);
        let genetic = Genetic::new(&params);
        HgsAlgorithm {
            params,
            population: Population::new(),
            split,
            local_search,
            genetic,
        }
    }

    /// Run the search until the termination criteria are met and return the
    /// best solution found, if any.
    pub fn run(&mut self) -> Result<Option<&Individual>> {
        info!(
            clients = self.params.nb_clients,
            vehicles = self.params.nb_vehicles,
            "starting hybrid genetic search"
        );
        self.genetic.run(
            &mut self.population,
            &mut self.params,
            &mut self.split,
            &mut self.local_search,
        )?;
        info!(
            elapsed = self.params.elapsed_seconds(),
            "hybrid genetic search finished"
        );
        Ok(self.population.get_best_found())
    }
}
