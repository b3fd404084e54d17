//! Configuration parameters for the HGS-VRPTW algorithm.

use serde::{Deserialize, Serialize};

/// Tunable settings of the algorithm. Every field has a default and can be
/// overridden from the command line or with the builder methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of iterations without improvement until termination
    pub nb_iter: usize,
    /// Wall clock time limit in seconds (`None` = no limit)
    pub time_limit: Option<u64>,
    /// Path to a best-known-solution file, overwritten on improvement
    pub path_bks: Option<String>,

    /// Proportion of initial individuals constructed nearest-first
    pub fraction_generated_nearest: f64,
    /// Proportion of initial individuals constructed furthest-first
    pub fraction_generated_furthest: f64,
    /// Proportion of initial individuals constructed by sweep
    pub fraction_generated_sweep: f64,
    /// Proportion of initial individuals constructed randomly
    pub fraction_generated_randomly: f64,
    /// Minimum fill percentage for sweep-constructed routes
    pub min_sweep_fill_percentage: i64,
    /// Capacity violation tolerated by the seed-order construction
    pub max_tolerated_capacity_violation: i64,
    /// Time warp tolerated by the seed-order construction
    pub max_tolerated_time_warp: i64,
    /// Time warp penalty at the start of the run (and after each restart)
    pub initial_time_warp_penalty: f64,
    /// Penalty multiplier applied when (almost) no individual is feasible
    pub penalty_booster: f64,

    /// Minimum population size per subpopulation
    pub minimum_population_size: usize,
    /// Number of insertions before survivor selection triggers
    pub generation_size: usize,
    /// Number of elite individuals shielding the diversity weight
    pub nb_elite: usize,
    /// Number of closest individuals in the diversity contribution
    pub nb_close: usize,
    /// Target proportion of feasible individuals for penalty adaptation
    pub target_feasible: f64,
    /// Probability (0-100) of a repair pass when LS leaves an individual infeasible
    pub repair_probability: u32,
    /// Grow the granular neighborhood after this many non-improving iterations
    pub grow_nb_granular_after_non_improvement_iterations: usize,
    /// Grow the granular neighborhood after this many iterations
    pub grow_nb_granular_after_iterations: usize,
    /// Amount the granular neighborhood grows by
    pub grow_nb_granular_size: usize,
    /// Grow the population after this many non-improving iterations
    pub grow_population_after_non_improvement_iterations: usize,
    /// Grow the population after this many iterations
    pub grow_population_after_iterations: usize,
    /// Amount the minimum population size grows by
    pub grow_population_size: usize,
    /// Diversity weight; 0 means `1 - nbElite / |P|`
    pub diversity_weight: f64,
    /// Initial solution as a giant tour with `0` separating routes
    pub initial_solution: Option<String>,

    /// Fleet size; `None` = derive from instance, `Some(-1)` = unlimited
    pub nb_vehicles: Option<i64>,
    /// Log the population pool every this many iterations (0 = never)
    pub log_pool_interval: usize,
    /// DIMACS controller mode: print every incumbent on stdout
    pub is_dimacs_run: bool,
    /// Adapt granularity/population/intensification to the instance shape
    pub use_dynamic_parameters: bool,
    /// Path where the best solution is written
    pub path_solution: String,
    /// Granular search parameter limiting RI move candidates
    pub nb_granular: usize,
    /// Probability (0-100) that the SWAP* phase runs after RI converges
    pub intensification_probability_ls: u32,
    /// Use the time-window-aware SWAP* variant
    pub use_swap_star_tw: bool,
    /// Skip the distance-based SWAP* variant
    pub skip_swap_star_dist: bool,
    /// Circle sector overlap tolerance in degrees (0-359)
    pub circle_sector_overlap_tolerance_degrees: i64,
    /// Minimum circle sector size in degrees, so small sectors still overlap
    pub min_circle_sector_size_degrees: i64,
    /// RNG seed
    pub seed: u32,
    /// Path of the instance file
    pub path_instance: String,
    /// Make the granular neighborhood relation symmetric
    pub use_symmetric_correlated_vertices: bool,
    /// Restart the population when `nb_iter` is reached before the time limit
    pub do_repeat_until_time_limit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            nb_iter: 20_000,
            time_limit: None,
            path_bks: None,
            fraction_generated_nearest: 0.05,
            fraction_generated_furthest: 0.05,
            fraction_generated_sweep: 0.05,
            fraction_generated_randomly: 0.85,
            min_sweep_fill_percentage: 60,
            max_tolerated_capacity_violation: 50,
            max_tolerated_time_warp: 100,
            initial_time_warp_penalty: 1.0,
            penalty_booster: 2.0,
            minimum_population_size: 25,
            generation_size: 40,
            nb_elite: 4,
            nb_close: 5,
            target_feasible: 0.2,
            repair_probability: 50,
            grow_nb_granular_after_non_improvement_iterations: 5000,
            grow_nb_granular_after_iterations: 0,
            grow_nb_granular_size: 0,
            grow_population_after_non_improvement_iterations: 5000,
            grow_population_after_iterations: 0,
            grow_population_size: 0,
            diversity_weight: 0.0,
            initial_solution: None,
            nb_vehicles: None,
            log_pool_interval: 0,
            is_dimacs_run: false,
            use_dynamic_parameters: false,
            path_solution: String::new(),
            nb_granular: 40,
            intensification_probability_ls: 15,
            use_swap_star_tw: true,
            skip_swap_star_dist: false,
            circle_sector_overlap_tolerance_degrees: 0,
            min_circle_sector_size_degrees: 15,
            seed: 0,
            path_instance: String::new(),
            use_symmetric_correlated_vertices: false,
            do_repeat_until_time_limit: true,
        }
    }
}

impl Config {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the non-improvement iteration bound.
    pub fn with_nb_iter(mut self, nb_iter: usize) -> Self {
        self.nb_iter = nb_iter;
        self
    }

    /// Set the wall clock time limit in seconds.
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the fleet size (`-1` means unlimited).
    pub fn with_nb_vehicles(mut self, nb_vehicles: i64) -> Self {
        self.nb_vehicles = Some(nb_vehicles);
        self
    }

    /// Set the granular neighborhood size.
    pub fn with_nb_granular(mut self, nb_granular: usize) -> Self {
        self.nb_granular = nb_granular;
        self
    }

    /// Set the minimum population size.
    pub fn with_minimum_population_size(mut self, size: usize) -> Self {
        self.minimum_population_size = size;
        self
    }

    /// Set the generation size.
    pub fn with_generation_size(mut self, size: usize) -> Self {
        self.generation_size = size;
        self
    }

    /// Set the target proportion of feasible individuals.
    pub fn with_target_feasible(mut self, target: f64) -> Self {
        self.target_feasible = target;
        self
    }

    /// Set the probability (0-100) of the SWAP* intensification phase.
    pub fn with_intensification_probability_ls(mut self, probability: u32) -> Self {
        self.intensification_probability_ls = probability;
        self
    }

    /// Set the repair probability (0-100).
    pub fn with_repair_probability(mut self, probability: u32) -> Self {
        self.repair_probability = probability;
        self
    }

    /// Set the initial time warp penalty.
    pub fn with_initial_time_warp_penalty(mut self, penalty: f64) -> Self {
        self.initial_time_warp_penalty = penalty;
        self
    }
}
