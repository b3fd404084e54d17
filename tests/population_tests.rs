//! Tests for population management.

use hgs_vrptw::config::Config;
use hgs_vrptw::individual::Individual;
use hgs_vrptw::params::{Client, Params};
use hgs_vrptw::population::Population;

fn client(cust_num: usize, x: i64, y: i64, demand: i64) -> Client {
    Client {
        cust_num,
        coord_x: x,
        coord_y: y,
        demand,
        earliest_arrival: 0,
        latest_arrival: 100_000,
        service_duration: 0,
        release_time: 0,
        polar_angle: 0,
    }
}

/// Six clients around the depot, tiny population bounds so that survivor
/// selection triggers quickly.
fn create_test_params() -> Params {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 1),
        client(2, 0, 100, 1),
        client(3, 100, 100, 1),
        client(4, 200, 0, 1),
        client(5, 200, 100, 1),
        client(6, 0, 200, 1),
    ];
    Params::new(
        Config::new()
            .with_nb_vehicles(6)
            .with_minimum_population_size(2)
            .with_generation_size(2),
        clients,
        6,
        None,
    )
    .unwrap()
}

fn individual_with_routes(params: &Params, routes: Vec<Vec<usize>>) -> Individual {
    let mut indiv = Individual::new(params);
    for (r, route) in routes.into_iter().enumerate() {
        indiv.routes[r] = route;
    }
    indiv.evaluate_complete_cost(params);
    indiv
}

#[test]
fn test_insertion_keeps_subpopulation_sorted_by_cost() {
    let params = create_test_params();
    let mut population = Population::new();

    population.add_individual(
        &individual_with_routes(&params, vec![vec![1, 3, 2], vec![4, 5], vec![6]]),
        true,
        &params,
    );
    population.add_individual(
        &individual_with_routes(&params, vec![vec![1, 2], vec![3, 4], vec![5, 6]]),
        true,
        &params,
    );
    population.add_individual(
        &individual_with_routes(&params, vec![vec![2, 1], vec![4, 3], vec![6, 5]]),
        true,
        &params,
    );

    let costs: Vec<f64> = population
        .feasible
        .iter()
        .map(|indiv| indiv.cost.penalized_cost)
        .collect();
    let mut sorted = costs.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(costs, sorted);
}

#[test]
fn test_insertion_reports_new_best_feasible() {
    let params = create_test_params();
    let mut population = Population::new();

    let worse = individual_with_routes(&params, vec![vec![1, 3, 2], vec![4, 5], vec![6]]);
    let better = individual_with_routes(&params, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

    assert!(population.add_individual(&worse, true, &params));
    assert!(population.add_individual(&better, true, &params));
    assert!(!population.add_individual(&worse, true, &params));

    let best = population.get_best_feasible().unwrap();
    assert!((best.cost.penalized_cost - better.cost.penalized_cost).abs() < 1e-9);
}

#[test]
fn test_survivor_selection_caps_subpopulation_size() {
    let mut params = create_test_params();
    let mut population = Population::new();

    // Insert many distinct individuals; the cap is minPop + generationSize
    for seed in 0..20 {
        params.rng = hgs_vrptw::rng::XorShift128::new(seed);
        let indiv = random_evaluated_individual(&mut params);
        population.add_individual(&indiv, true, &params);
        assert!(
            population.feasible.len() + population.infeasible.len() <= 8,
            "subpopulations must stay within minPop + generationSize"
        );
    }

    // After an overflow the survivors were trimmed down to minPop
    assert!(population.feasible.len() <= 4);
}

fn random_evaluated_individual(params: &mut Params) -> Individual {
    let mut indiv = Individual::new_random(params);
    let mut split = hgs_vrptw::split::Split::new(params);
    split
        .general_split(&mut indiv, params, params.nb_vehicles)
        .unwrap();
    indiv
}

#[test]
fn test_eviction_prefers_clones() {
    let params = create_test_params();
    let mut population = Population::new();

    let base = individual_with_routes(&params, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    let diverse = individual_with_routes(&params, vec![vec![2, 4], vec![1, 6], vec![3, 5]]);

    // Two copies of the same solution plus genuinely different ones; keep
    // inserting until the cap forces evictions
    population.add_individual(&base, true, &params);
    population.add_individual(&base, true, &params);
    population.add_individual(&diverse, true, &params);
    population.add_individual(
        &individual_with_routes(&params, vec![vec![1, 3, 2], vec![4, 5], vec![6]]),
        true,
        &params,
    );
    population.add_individual(
        &individual_with_routes(&params, vec![vec![6, 2], vec![3, 1], vec![4, 5]]),
        true,
        &params,
    );

    // The duplicate must have been evicted before any unique solution
    let clone_count = population
        .feasible
        .iter()
        .filter(|indiv| indiv.broken_pairs_distance(&base) < 1e-9)
        .count();
    assert!(clone_count <= 1);
}

#[test]
fn test_biased_fitness_is_cost_rank_with_small_population() {
    let params = create_test_params();
    let mut population = Population::new();

    population.add_individual(
        &individual_with_routes(&params, vec![vec![1, 3, 2], vec![4, 5], vec![6]]),
        true,
        &params,
    );
    population.add_individual(
        &individual_with_routes(&params, vec![vec![1, 2], vec![3, 4], vec![5, 6]]),
        true,
        &params,
    );
    population.add_individual(
        &individual_with_routes(&params, vec![vec![6, 2], vec![3, 1], vec![4, 5]]),
        true,
        &params,
    );

    // With |P| <= nbElite the fitness reduces to the cost rank, so the
    // cheapest individual carries the minimum
    population.update_all_biased_fitnesses(&params);
    let best_fitness = population.feasible[0].biased_fitness;
    for indiv in &population.feasible {
        assert!(best_fitness <= indiv.biased_fitness);
    }
}

#[test]
fn test_parent_selection_returns_valid_indices() {
    let mut params = create_test_params();
    let mut population = Population::new();
    for seed in 0..6 {
        params.rng = hgs_vrptw::rng::XorShift128::new(seed);
        let indiv = random_evaluated_individual(&mut params);
        population.add_individual(&indiv, true, &params);
    }

    for _ in 0..20 {
        let (a, b) = population.get_non_identical_parents(&mut params);
        assert!(a < population.size());
        assert!(b < population.size());
    }
}

#[test]
fn test_manage_penalties_boosts_when_everything_is_infeasible() {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 1),
        client(2, 0, 100, 1),
        client(3, 100, 100, 1),
        client(4, 200, 0, 1),
        client(5, 200, 100, 1),
        client(6, 0, 200, 1),
    ];
    // Capacity 4 makes a single route through all six clients overloaded
    let mut params = Params::new(
        Config::new()
            .with_nb_vehicles(6)
            .with_minimum_population_size(2)
            .with_generation_size(2),
        clients,
        4,
        None,
    )
    .unwrap();
    let mut population = Population::new();
    let initial_capacity_penalty = params.penalty_capacity;
    let initial_time_warp_penalty = params.penalty_time_warp;

    // Overloaded single-route solutions, one hundred times: both sliding
    // windows become entirely false
    let overloaded = individual_with_routes(&params, vec![vec![1, 2, 3, 4, 5, 6]]);
    assert!(!overloaded.is_feasible);
    let mut warped = overloaded.clone();
    warped.cost.time_warp = 1;
    for _ in 0..100 {
        population.add_individual(&warped, true, &params);
    }

    population.manage_penalties(&mut params);
    assert!(params.penalty_capacity >= initial_capacity_penalty * params.config.penalty_booster - 1e-9);
    assert!(params.penalty_time_warp >= initial_time_warp_penalty * params.config.penalty_booster - 1e-9);
}

#[test]
fn test_manage_penalties_relaxes_when_everything_is_feasible() {
    let mut params = create_test_params();
    let mut population = Population::new();
    params.penalty_capacity = 10.0;
    params.penalty_time_warp = 10.0;

    let feasible = individual_with_routes(&params, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    population.add_individual(&feasible, true, &params);

    // The windows start out all-true, so the fractions sit at 1.0
    population.manage_penalties(&mut params);
    assert!((params.penalty_capacity - 8.5).abs() < 1e-9);
    assert!((params.penalty_time_warp - 8.5).abs() < 1e-9);
}

#[test]
fn test_manage_penalties_reorders_infeasible_subpopulation() {
    let mut params = create_test_params();
    let mut population = Population::new();

    let mut a = individual_with_routes(&params, vec![vec![1, 2, 3, 4, 5, 6]]);
    a.cost.capacity_excess = 10;
    a.cost.time_warp = 0;
    a.cost.penalized_cost = 100.0;
    a.is_feasible = false;
    let mut b = a.clone();
    b.cost.capacity_excess = 0;
    b.cost.time_warp = 10;
    b.cost.penalized_cost = 200.0;

    population.add_individual(&a, false, &params);
    population.add_individual(&b, false, &params);

    // A large capacity penalty makes the capacity violator the worse one
    params.penalty_capacity = 1000.0;
    params.penalty_time_warp = 1.0;
    population.manage_penalties(&mut params);

    assert!(
        population.infeasible[0].cost.penalized_cost
            <= population.infeasible[1].cost.penalized_cost
    );
    assert_eq!(population.infeasible[0].cost.capacity_excess, 0);
}
