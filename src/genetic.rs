//! The outer genetic loop: selection, crossover, education, insertion,
//! penalty management and restarts.

use tracing::info;

use crate::crossover::{crossover_ox, crossover_srex};
use crate::error::Result;
use crate::individual::Individual;
use crate::local_search::LocalSearch;
use crate::params::Params;
use crate::population::Population;
use crate::split::Split;

/// The genetic driver. Owns the four candidate offspring slots that the
/// crossovers write into (0 and 1 for SREX, 2 and 3 for OX).
pub struct Genetic {
    candidate_offsprings: [Individual; 4],
}

impl Genetic {
    pub fn new(params: &Params) -> Self {
        Genetic {
            candidate_offsprings: [
                Individual::new(params),
                Individual::new(params),
                Individual::new(params),
                Individual::new(params),
            ],
        }
    }

    /// Run the hybrid genetic search until `nb_iter` consecutive
    /// non-improving iterations or the time limit is reached.
    pub fn run(
        &mut self,
        population: &mut Population,
        params: &mut Params,
        split: &mut Split,
        local_search: &mut LocalSearch,
    ) -> Result<()> {
        // Generating the initial population is part of the loop since a
        // restart regenerates it too
        population.generate_population(params, split, local_search)?;

        if params.nb_clients == 1 {
            // Crossover needs at least two clients; the single trivial
            // individual is already in the population
            return Ok(());
        }

        let mut nb_iter_non_prod = 1usize;
        let mut nb_iter = 0usize;
        while nb_iter_non_prod <= params.config.nb_iter && !params.is_time_limit_exceeded() {
            /* SELECTION AND CROSSOVER */
            let best = self.best_of_srex_and_ox_crossovers(population, params, split)?;

            /* EDUCATION */
            let (penalty_capacity, penalty_time_warp) =
                (params.penalty_capacity, params.penalty_time_warp);
            local_search.run(
                &mut self.candidate_offsprings[best],
                penalty_capacity,
                penalty_time_warp,
                params,
            );
            let mut is_new_best =
                population.add_individual(&self.candidate_offsprings[best], true, params);

            /* REPAIR */
            if !self.candidate_offsprings[best].is_feasible
                && params.rng.next() % 100 < params.config.repair_probability
            {
                local_search.run(
                    &mut self.candidate_offsprings[best],
                    penalty_capacity * 10.0,
                    penalty_time_warp * 10.0,
                    params,
                );
                // An infeasible individual after repair is not reinserted
                if self.candidate_offsprings[best].is_feasible {
                    is_new_best = population.add_individual(
                        &self.candidate_offsprings[best],
                        false,
                        params,
                    ) || is_new_best;
                }
            }

            if is_new_best {
                nb_iter_non_prod = 1;
            } else {
                nb_iter_non_prod += 1;
            }

            /* PENALTY MANAGEMENT AND TRACES */
            if nb_iter % 100 == 0 {
                population.manage_penalties(params);
            }
            if nb_iter % 500 == 0 {
                population.print_state(nb_iter, nb_iter_non_prod, params);
            }
            if params.config.log_pool_interval > 0
                && nb_iter % params.config.log_pool_interval == 0
            {
                let path = format!("{}.log.csv", params.config.path_solution);
                population.export_population(nb_iter, &path)?;
            }

            /* RESTART WHEN RUNNING AGAINST A TIME LIMIT */
            if params.config.time_limit.is_some()
                && nb_iter_non_prod == params.config.nb_iter
                && params.config.do_repeat_until_time_limit
            {
                population.restart(params, split, local_search)?;
                nb_iter_non_prod = 1;
            }

            /* PARAMETER GROWTH SCHEDULES */
            if nb_iter > 0
                && params.config.grow_nb_granular_size != 0
                && ((params.config.grow_nb_granular_after_iterations > 0
                    && nb_iter % params.config.grow_nb_granular_after_iterations == 0)
                    || (params.config.grow_nb_granular_after_non_improvement_iterations > 0
                        && nb_iter_non_prod
                            % params.config.grow_nb_granular_after_non_improvement_iterations
                            == 0))
            {
                // Growing nbGranular also changes how often the neighbor
                // lists get reshuffled
                params.config.nb_granular += params.config.grow_nb_granular_size;
                params.set_correlated_vertices();
                info!(nb_granular = params.config.nb_granular, "granularity grown");
            }

            if nb_iter > 0
                && params.config.grow_population_size != 0
                && ((params.config.grow_population_after_iterations > 0
                    && nb_iter % params.config.grow_population_after_iterations == 0)
                    || (params.config.grow_population_after_non_improvement_iterations > 0
                        && nb_iter_non_prod
                            % params.config.grow_population_after_non_improvement_iterations
                            == 0))
            {
                // The subpopulation sizes adjust over the next insertions
                params.config.minimum_population_size += params.config.grow_population_size;
                info!(
                    minimum_population_size = params.config.minimum_population_size,
                    "population size grown"
                );
            }

            nb_iter += 1;
        }

        Ok(())
    }

    /// Select a non-identical parent pair, produce the OX-best and the
    /// SREX-best offspring, and return the slot of the cheaper of the two.
    fn best_of_srex_and_ox_crossovers(
        &mut self,
        population: &mut Population,
        params: &mut Params,
        split: &mut Split,
    ) -> Result<usize> {
        let (index_a, index_b) = population.get_non_identical_parents(params);
        let parent_a = population.get(index_a);
        let parent_b = population.get(index_b);

        let best_ox = crossover_ox(
            &mut self.candidate_offsprings,
            (parent_a, parent_b),
            params,
            split,
        )?;
        let best_srex =
            crossover_srex(&mut self.candidate_offsprings, (parent_a, parent_b), params);

        if self.candidate_offsprings[best_ox].cost.penalized_cost
            < self.candidate_offsprings[best_srex].cost.penalized_cost
        {
            Ok(best_ox)
        } else {
            Ok(best_srex)
        }
    }
}
