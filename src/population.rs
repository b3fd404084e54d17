//! Population management: two subpopulations, diversity bookkeeping, biased
//! fitness, parent selection, and adaptive penalty control.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;

use tracing::info;

use crate::error::Result;
use crate::individual::Individual;
use crate::local_search::LocalSearch;
use crate::params::{Params, EPSILON};
use crate::split::Split;

/// Length of the sliding windows tracking the feasibility of recent local
/// search outputs.
const FEASIBILITY_WINDOW: usize = 100;

/// The population, partitioned into a feasible and an infeasible
/// subpopulation, each kept sorted by ascending penalized cost.
pub struct Population {
    pub feasible: Vec<Individual>,
    pub infeasible: Vec<Individual>,
    /// Load feasibility of the last 100 local search results
    list_feasibility_load: VecDeque<bool>,
    /// Time window feasibility of the last 100 local search results
    list_feasibility_time_warp: VecDeque<bool>,
    /// Best feasible solution since the last restart
    pub best_solution_restart: Option<Individual>,
    /// Best feasible solution of the whole run
    pub best_solution_overall: Option<Individual>,
    /// (elapsed seconds, cost) at each improvement of the overall best
    pub search_progress: Vec<(f64, f64)>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Population {
            feasible: Vec::new(),
            infeasible: Vec::new(),
            list_feasibility_load: VecDeque::from(vec![true; FEASIBILITY_WINDOW]),
            list_feasibility_time_warp: VecDeque::from(vec![true; FEASIBILITY_WINDOW]),
            best_solution_restart: None,
            best_solution_overall: None,
            search_progress: Vec::new(),
            next_id: 1,
        }
    }

    /// Run local search on an individual and insert it; infeasible results
    /// are repaired at tenfold penalties with the configured probability.
    fn do_local_search_and_add(
        &mut self,
        indiv: &mut Individual,
        params: &mut Params,
        local_search: &mut LocalSearch,
    ) {
        let (penalty_capacity, penalty_time_warp) =
            (params.penalty_capacity, params.penalty_time_warp);
        local_search.run(indiv, penalty_capacity, penalty_time_warp, params);
        self.add_individual(indiv, true, params);

        if !indiv.is_feasible && params.rng.next() % 100 < params.config.repair_probability {
            local_search.run(
                indiv,
                penalty_capacity * 10.0,
                penalty_time_warp * 10.0,
                params,
            );
            // Keep the repaired individual only when it became feasible
            if indiv.is_feasible {
                self.add_individual(indiv, false, params);
            }
        }
    }

    /// Build the initial individuals: a configurable mix of nearest-seed,
    /// furthest-seed, sweep, and random constructions, each educated by
    /// local search.
    pub fn generate_population(
        &mut self,
        params: &mut Params,
        split: &mut Split,
        local_search: &mut LocalSearch,
    ) -> Result<()> {
        if params.nb_clients == 1 {
            // The genetic operators are pointless with a single client
            let mut indiv = Individual::new_random(params);
            split.general_split(&mut indiv, params, params.nb_vehicles)?;
            self.add_individual(&indiv, true, params);
            return Ok(());
        }

        if let Some(solution) = params.config.initial_solution.clone() {
            let indiv = Individual::from_giant_tour_str(params, &solution)?;
            self.add_individual(&indiv, true, params);
            info!("added initial solution to the population");
        }

        let nof_individuals = 4 * params.config.minimum_population_size;
        // Resetting here also restores the penalty after each restart
        params.penalty_time_warp = params.config.initial_time_warp_penalty;

        // Too low a fill percentage may leave clients unplanned
        let min_sweep_fill_percentage = params.config.min_sweep_fill_percentage.max(30);
        let nof_nearest = (params.config.fraction_generated_nearest * nof_individuals as f64)
            .round() as usize;
        let nof_furthest = (params.config.fraction_generated_furthest * nof_individuals as f64)
            .round() as usize;
        let nof_sweep =
            (params.config.fraction_generated_sweep * nof_individuals as f64).round() as usize;
        let nof_random = (params.config.fraction_generated_randomly * nof_individuals as f64)
            .round() as usize;
        let max_tolerated_capacity_violation = params.config.max_tolerated_capacity_violation;
        let max_tolerated_time_warp = params.config.max_tolerated_time_warp;

        for i in 0..nof_nearest {
            if params.is_time_limit_exceeded() {
                info!("time limit hit during generation of the initial population");
                return Ok(());
            }
            // The first individual is constructed without violations
            let tolerated_capacity_violation = if i == 0 {
                0
            } else {
                params.rng.next() as i64 % (max_tolerated_capacity_violation + 1)
            };
            let tolerated_time_warp = if i == 0 {
                0
            } else {
                params.rng.next() as i64 % (max_tolerated_time_warp + 1)
            };
            let mut indiv = Individual::new(params);
            local_search.construct_individual_with_seed_order(
                tolerated_capacity_violation,
                tolerated_time_warp,
                false,
                &mut indiv,
                params,
            );
            self.do_local_search_and_add(&mut indiv, params, local_search);
        }
        info!(count = nof_nearest, "generated individuals using nearest");

        for i in 0..nof_furthest {
            if params.is_time_limit_exceeded() {
                info!("time limit hit during generation of the initial population");
                return Ok(());
            }
            let tolerated_capacity_violation = if i == 0 {
                0
            } else {
                params.rng.next() as i64 % (max_tolerated_capacity_violation + 1)
            };
            let tolerated_time_warp = if i == 0 {
                0
            } else {
                params.rng.next() as i64 % (max_tolerated_time_warp + 1)
            };
            let mut indiv = Individual::new(params);
            local_search.construct_individual_with_seed_order(
                tolerated_capacity_violation,
                tolerated_time_warp,
                true,
                &mut indiv,
                params,
            );
            self.do_local_search_and_add(&mut indiv, params, local_search);
        }
        info!(count = nof_furthest, "generated individuals using furthest");

        for i in 0..nof_sweep {
            if params.is_time_limit_exceeded() {
                info!("time limit hit during generation of the initial population");
                return Ok(());
            }
            // The first individual is constructed without load restrictions
            let fill_percentage = if i == 0 {
                100
            } else {
                min_sweep_fill_percentage
                    + params.rng.next() as i64 % (100 - min_sweep_fill_percentage + 1)
            };
            let mut indiv = Individual::new(params);
            local_search.construct_individual_by_sweep(fill_percentage, &mut indiv, params);
            self.do_local_search_and_add(&mut indiv, params, local_search);
        }
        info!(count = nof_sweep, "generated individuals using sweep");

        for _ in 0..nof_random {
            if params.is_time_limit_exceeded() {
                info!("time limit hit during generation of the initial population");
                return Ok(());
            }
            let mut indiv = Individual::new_random(params);
            split.general_split(&mut indiv, params, params.nb_vehicles)?;
            self.do_local_search_and_add(&mut indiv, params, local_search);
        }
        info!(count = nof_random, "generated individuals randomly");

        Ok(())
    }

    /// Insert a copy of the individual into the matching subpopulation,
    /// updating the proximity structures and evicting down to the minimum
    /// size when the subpopulation overflows. Returns whether the insertion
    /// improved the best feasible solution since the last restart.
    pub fn add_individual(
        &mut self,
        indiv: &Individual,
        update_feasible: bool,
        params: &Params,
    ) -> bool {
        if update_feasible {
            self.list_feasibility_load
                .push_back(indiv.cost.capacity_excess == 0);
            self.list_feasibility_time_warp
                .push_back(indiv.cost.time_warp == 0);
            self.list_feasibility_load.pop_front();
            self.list_feasibility_time_warp.pop_front();
        }

        let mut my_individual = indiv.clone();
        my_individual.id = self.next_id;
        self.next_id += 1;
        my_individual.proximate.clear();

        let subpop = if indiv.is_feasible {
            &mut self.feasible
        } else {
            &mut self.infeasible
        };
        for other in subpop.iter_mut() {
            let distance = my_individual.broken_pairs_distance(other);
            other.add_proximity(distance, my_individual.id);
            my_individual.add_proximity(distance, other.id);
        }

        // Place the copy at its sorted position by penalized cost
        let mut place = subpop.len();
        while place > 0
            && subpop[place - 1].cost.penalized_cost > indiv.cost.penalized_cost - EPSILON
        {
            place -= 1;
        }
        subpop.insert(place, my_individual);

        if subpop.len()
            > params.config.minimum_population_size + params.config.generation_size
        {
            while subpop.len() > params.config.minimum_population_size {
                remove_worst_biased_fitness(subpop, params);
            }
        }

        if indiv.is_feasible {
            let improved_restart = match &self.best_solution_restart {
                Some(best) => indiv.cost.penalized_cost < best.cost.penalized_cost - EPSILON,
                None => true,
            };
            if improved_restart {
                self.best_solution_restart = Some(indiv.clone());
                let improved_overall = match &self.best_solution_overall {
                    Some(best) => indiv.cost.penalized_cost < best.cost.penalized_cost - EPSILON,
                    None => true,
                };
                if improved_overall {
                    self.best_solution_overall = Some(indiv.clone());
                    self.search_progress
                        .push((params.elapsed_seconds(), indiv.cost.penalized_cost));
                    if params.config.is_dimacs_run {
                        // The controller may kill the program at any moment,
                        // so incumbents are printed as soon as they are found
                        indiv.print_cvrplib(params.elapsed_seconds());
                    }
                }
                return true;
            }
        }
        false
    }

    /// Refresh the biased fitness of every individual in both
    /// subpopulations.
    pub fn update_all_biased_fitnesses(&mut self, params: &Params) {
        update_biased_fitnesses(&mut self.feasible, params);
        update_biased_fitnesses(&mut self.infeasible, params);
    }

    /// Adapt the capacity and time warp penalties from the recent
    /// feasibility history, then re-evaluate and re-sort the infeasible
    /// subpopulation.
    pub fn manage_penalties(&mut self, params: &mut Params) {
        // Penalties stay within [0.1, 100000] for safety
        let fraction_feasible_load = fraction_true(&self.list_feasibility_load);
        if fraction_feasible_load <= 0.01
            && params.config.penalty_booster > 0.0
            && params.penalty_capacity < 100_000.0
        {
            params.penalty_capacity =
                (params.penalty_capacity * params.config.penalty_booster).min(100_000.0);
        } else if fraction_feasible_load < params.config.target_feasible - 0.05
            && params.penalty_capacity < 100_000.0
        {
            params.penalty_capacity = (params.penalty_capacity * 1.2).min(100_000.0);
        } else if fraction_feasible_load > params.config.target_feasible + 0.05
            && params.penalty_capacity > 0.1
        {
            params.penalty_capacity = (params.penalty_capacity * 0.85).max(0.1);
        }

        let fraction_feasible_tw = fraction_true(&self.list_feasibility_time_warp);
        if fraction_feasible_tw <= 0.01
            && params.config.penalty_booster > 0.0
            && params.penalty_time_warp < 100_000.0
        {
            params.penalty_time_warp =
                (params.penalty_time_warp * params.config.penalty_booster).min(100_000.0);
        } else if fraction_feasible_tw < params.config.target_feasible - 0.05
            && params.penalty_time_warp < 100_000.0
        {
            params.penalty_time_warp = (params.penalty_time_warp * 1.2).min(100_000.0);
        } else if fraction_feasible_tw > params.config.target_feasible + 0.05
            && params.penalty_time_warp > 0.1
        {
            params.penalty_time_warp = (params.penalty_time_warp * 0.85).max(0.1);
        }

        for indiv in self.infeasible.iter_mut() {
            indiv.cost.penalized_cost = indiv.cost.distance as f64
                + params.penalty_capacity * indiv.cost.capacity_excess as f64
                + params.penalty_time_warp * indiv.cost.time_warp as f64;
        }

        // Bubble sort, the penalties only shift costs slightly
        let n = self.infeasible.len();
        for i in 0..n {
            for j in 0..n - i - 1 {
                if self.infeasible[j].cost.penalized_cost
                    > self.infeasible[j + 1].cost.penalized_cost + EPSILON
                {
                    self.infeasible.swap(j, j + 1);
                }
            }
        }
    }

    /// One binary tournament over the union of both subpopulations.
    pub fn get_binary_tournament(&mut self, params: &mut Params) -> usize {
        self.update_all_biased_fitnesses(params);

        let total = self.size();
        let place1 = params.rng.next_mod(total);
        let place2 = params.rng.next_mod(total);
        if self.get(place1).biased_fitness < self.get(place2).biased_fitness {
            place1
        } else {
            place2
        }
    }

    /// Two binary tournaments; the second parent is re-drawn up to nine
    /// times while the pair is identical by broken-pairs distance.
    pub fn get_non_identical_parents(&mut self, params: &mut Params) -> (usize, usize) {
        let parent_a = self.get_binary_tournament(params);
        let mut parent_b = self.get_binary_tournament(params);
        let mut num_tries = 1;
        while self.get(parent_a).broken_pairs_distance(self.get(parent_b)) < EPSILON
            && num_tries < 10
        {
            parent_b = self.get_binary_tournament(params);
            num_tries += 1;
        }
        (parent_a, parent_b)
    }

    /// Member at a union index: feasible first, then infeasible.
    pub fn get(&self, index: usize) -> &Individual {
        if index >= self.feasible.len() {
            &self.infeasible[index - self.feasible.len()]
        } else {
            &self.feasible[index]
        }
    }

    pub fn size(&self) -> usize {
        self.feasible.len() + self.infeasible.len()
    }

    pub fn get_best_feasible(&self) -> Option<&Individual> {
        self.feasible.first()
    }

    pub fn get_best_infeasible(&self) -> Option<&Individual> {
        self.infeasible.first()
    }

    pub fn get_best_found(&self) -> Option<&Individual> {
        self.best_solution_overall.as_ref()
    }

    /// Drop every individual and the per-restart best, then regenerate the
    /// initial population.
    pub fn restart(
        &mut self,
        params: &mut Params,
        split: &mut Split,
        local_search: &mut LocalSearch,
    ) -> Result<()> {
        info!("resetting the population");
        self.feasible.clear();
        self.infeasible.clear();
        self.best_solution_restart = None;
        self.generate_population(params, split, local_search)
    }

    /// Log the current population state.
    pub fn print_state(&self, nb_iter: usize, nb_iter_non_prod: usize, params: &Params) {
        let feasible = self
            .get_best_feasible()
            .map(|best| format!("{} {:.2} {:.2}", self.feasible.len(), best.cost.penalized_cost, average_cost(&self.feasible, params)))
            .unwrap_or_else(|| "none".to_string());
        let infeasible = self
            .get_best_infeasible()
            .map(|best| format!("{} {:.2} {:.2}", self.infeasible.len(), best.cost.penalized_cost, average_cost(&self.infeasible, params)))
            .unwrap_or_else(|| "none".to_string());
        info!(
            iteration = nb_iter,
            non_improving = nb_iter_non_prod,
            elapsed = %format!("{:.2}", params.elapsed_seconds()),
            feasible = %feasible,
            infeasible = %infeasible,
            diversity = %format!(
                "{:.2} {:.2}",
                diversity(&self.feasible, params),
                diversity(&self.infeasible, params)
            ),
            recent_feasibility = %format!(
                "{:.2} {:.2}",
                fraction_true(&self.list_feasibility_load),
                fraction_true(&self.list_feasibility_time_warp)
            ),
            penalties = %format!(
                "{:.2} {:.2}",
                params.penalty_capacity, params.penalty_time_warp
            ),
            "population state"
        );
    }

    /// Overwrite the best-known-solution file when this run found a better
    /// solution than the one recorded there.
    pub fn export_bks(&self, file_name: &str, params: &Params) -> Result<()> {
        info!("checking for a possible best-known-solution update");
        let read = Individual::read_cvrplib(file_name);
        if let Some(best) = &self.best_solution_overall {
            let improved = match read {
                Some((_, read_cost)) => best.cost.penalized_cost < read_cost - EPSILON,
                None => true,
            };
            if improved {
                info!(cost = best.cost.penalized_cost, "new best known solution");
                best.export_cvrplib(file_name, params.elapsed_seconds())?;
            }
        }
        Ok(())
    }

    /// Write the search progress as `instance;seed;cost;time` CSV rows.
    pub fn export_search_progress(
        &self,
        file_name: &str,
        instance_name: &str,
        seed: u32,
    ) -> Result<()> {
        let mut file = std::fs::File::create(file_name)?;
        for (time, cost) in &self.search_progress {
            writeln!(file, "{};{};{};{}", instance_name, seed, cost, time)?;
        }
        Ok(())
    }

    /// Append a snapshot of both subpopulations to a pool log file.
    pub fn export_population(&self, nb_iter: usize, file_name: &str) -> Result<()> {
        info!(path = file_name, "exporting population pool");
        let mut file = OpenOptions::new().create(true).append(true).open(file_name)?;
        for indiv in self.feasible.iter().chain(self.infeasible.iter()) {
            log_solution(nb_iter, &mut file, indiv)?;
        }
        Ok(())
    }
}

impl Default for Population {
    fn default() -> Self {
        Population::new()
    }
}

/// Update the biased fitness of a cost-sorted subpopulation: cost rank plus
/// diversity-weighted rank of the average distance to the closest members.
fn update_biased_fitnesses(pop: &mut [Individual], params: &Params) {
    // Rank by descending diversity contribution
    let mut ranking: Vec<(f64, usize)> = pop
        .iter()
        .enumerate()
        .map(|(i, indiv)| {
            (
                -indiv.average_broken_pairs_distance_closest(params.config.nb_close),
                i,
            )
        })
        .collect();
    ranking.sort_by(|a, b| a.partial_cmp(b).expect("distances are finite"));

    if pop.len() == 1 {
        pop[0].biased_fitness = 0.0;
        return;
    }
    for (div_rank, &(_, cost_rank)) in ranking.iter().enumerate() {
        let div_rank = div_rank as f64 / (pop.len() - 1) as f64;
        let fit_rank = cost_rank as f64 / (pop.len() - 1) as f64;
        // With a tiny population every individual counts as elite and only
        // the cost matters
        if pop.len() <= params.config.nb_elite {
            pop[cost_rank].biased_fitness = fit_rank;
        } else if params.config.diversity_weight > 0.0 {
            pop[cost_rank].biased_fitness =
                fit_rank + params.config.diversity_weight * div_rank;
        } else {
            pop[cost_rank].biased_fitness = fit_rank
                + (1.0 - params.config.nb_elite as f64 / pop.len() as f64) * div_rank;
        }
    }
}

/// Evict one individual: clones first, then the worst biased fitness. The
/// best individual (position 0) is never touched.
fn remove_worst_biased_fitness(pop: &mut Vec<Individual>, params: &Params) {
    update_biased_fitnesses(pop, params);
    assert!(
        pop.len() > 1,
        "eliminating the best individual: this should not occur"
    );

    let mut worst_position = 0;
    let mut worst_is_clone = false;
    let mut worst_biased_fitness = -1.0e30;
    for (i, indiv) in pop.iter().enumerate().skip(1) {
        // An average distance of zero to the closest member means a clone
        let is_clone = indiv.average_broken_pairs_distance_closest(1) < EPSILON;
        if (is_clone && !worst_is_clone)
            || (is_clone == worst_is_clone && indiv.biased_fitness > worst_biased_fitness)
        {
            worst_biased_fitness = indiv.biased_fitness;
            worst_is_clone = is_clone;
            worst_position = i;
        }
    }

    let worst = pop.remove(worst_position);
    for indiv in pop.iter_mut() {
        indiv.remove_proximity(worst.id);
    }
}

fn fraction_true(window: &VecDeque<bool>) -> f64 {
    window.iter().filter(|&&b| b).count() as f64 / window.len() as f64
}

/// Average distance to the closest members over the best `minPop`
/// individuals; monitoring more would only add noise.
fn diversity(pop: &[Individual], params: &Params) -> f64 {
    let size = params.config.minimum_population_size.min(pop.len());
    if size == 0 {
        return -1.0;
    }
    let sum: f64 = pop[..size]
        .iter()
        .map(|indiv| indiv.average_broken_pairs_distance_closest(size))
        .sum();
    sum / size as f64
}

/// Average penalized cost over the best `minPop` individuals.
fn average_cost(pop: &[Individual], params: &Params) -> f64 {
    let size = params.config.minimum_population_size.min(pop.len());
    if size == 0 {
        return -1.0;
    }
    let sum: f64 = pop[..size].iter().map(|indiv| indiv.cost.penalized_cost).sum();
    sum / size as f64
}

fn log_solution(nb_iter: usize, file: &mut std::fs::File, indiv: &Individual) -> Result<()> {
    write!(
        file,
        "{};{};{};{};{};{};{};",
        nb_iter,
        indiv.is_feasible,
        indiv.cost.nb_routes,
        indiv.cost.penalized_cost,
        indiv.cost.distance,
        indiv.cost.capacity_excess,
        indiv.cost.time_warp
    )?;
    for route in indiv.routes.iter().filter(|route| !route.is_empty()) {
        for client in route {
            write!(file, " {}", client)?;
        }
        write!(file, " 0")?;
    }
    writeln!(file)?;
    Ok(())
}
