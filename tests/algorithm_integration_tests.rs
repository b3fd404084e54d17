//! End-to-end runs of the full hybrid genetic search on small instances.

use hgs_vrptw::config::Config;
use hgs_vrptw::params::{Client, Params};
use hgs_vrptw::HgsAlgorithm;

fn client(
    cust_num: usize,
    x: i64,
    y: i64,
    demand: i64,
    earliest: i64,
    latest: i64,
) -> Client {
    Client {
        cust_num,
        coord_x: x,
        coord_y: y,
        demand,
        earliest_arrival: earliest,
        latest_arrival: latest,
        service_duration: 0,
        release_time: 0,
        polar_angle: 0,
    }
}

// No time limit: with one configured, the driver would keep restarting the
// population until the clock runs out instead of stopping after `nb_iter`
// non-improving iterations.
fn small_config() -> Config {
    Config::new()
        .with_seed(42)
        .with_nb_iter(200)
        .with_minimum_population_size(5)
        .with_generation_size(5)
        .with_nb_granular(5)
}

#[test]
fn test_trivial_two_client_instance() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 0, 10, 1, 0, 100_000),
        client(2, 0, 20, 1, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(1), clients, 10, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    // One route through both clients: 10 + 10 + 20
    assert_eq!(best.cost.nb_routes, 1);
    assert_eq!(best.cost.distance, 40);
}

#[test]
fn test_capacity_forces_two_routes() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 10, 10, 3, 0, 100_000),
        client(2, -10, 10, 3, 0, 100_000),
        client(3, -10, -10, 3, 0, 100_000),
        client(4, 10, -10, 3, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(3), clients, 5, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    assert_eq!(best.cost.nb_routes, 2);
    for route in best.routes.iter().filter(|r| !r.is_empty()) {
        let load: i64 = route
            .iter()
            .map(|&c| algorithm.params.clients[c].demand)
            .sum();
        assert!(load <= 5);
    }
}

#[test]
fn test_tight_time_windows_force_one_route_per_client() {
    // Equidistant clients whose windows all close before a second visit
    // could start
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 10, 0, 1, 10, 11),
        client(2, 0, 10, 1, 10, 11),
        client(3, -10, 0, 1, 10, 11),
    ];
    let params = Params::new(small_config().with_nb_vehicles(3), clients, 10, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    assert_eq!(best.cost.nb_routes, 3);
    for route in best.routes.iter().filter(|r| !r.is_empty()) {
        assert_eq!(route.len(), 1);
    }
}

#[test]
fn test_release_times_delay_route_starts() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        Client {
            release_time: 1000,
            ..client(1, 10, 0, 1, 0, 5000)
        },
        client(2, 0, 10, 1, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(2), clients, 10, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    // Any routing is feasible here: the release only delays the departure
    assert!(best.is_feasible);
    assert_eq!(best.cost.time_warp, 0);
}

#[test]
fn test_single_client_instance_skips_the_genetic_loop() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 10, 0, 1, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(1), clients, 10, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    assert_eq!(best.cost.nb_routes, 1);
    assert_eq!(best.cost.distance, 20);
}

#[test]
fn test_tight_fleet_still_produces_a_full_solution() {
    // Fleet exactly at the bin packing bound
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 10, 10, 3, 0, 100_000),
        client(2, -10, 10, 3, 0, 100_000),
        client(3, -10, -10, 3, 0, 100_000),
        client(4, 10, -10, 3, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(2), clients, 6, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    let mut visited: Vec<usize> = best.routes.iter().flatten().copied().collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3, 4]);
}

#[test]
fn test_same_seed_reproduces_the_same_result() {
    let clients: Vec<Client> = std::iter::once(client(0, 0, 0, 0, 0, 100_000))
        .chain((1..=8).map(|i| {
            client(
                i,
                (i as i64 % 4) * 25 + 10,
                (i as i64 / 4) * 40,
                2,
                0,
                100_000,
            )
        }))
        .collect();

    let run = |seed: u32| {
        let params = Params::new(
            small_config().with_seed(seed).with_nb_vehicles(4),
            clients.clone(),
            5,
            None,
        )
        .unwrap();
        let mut algorithm = HgsAlgorithm::new(params);
        algorithm.run().unwrap();
        let best = algorithm.population.get_best_found().unwrap();
        (best.cost.penalized_cost, best.giant_tour.clone())
    };

    let first = run(9);
    let second = run(9);
    assert_eq!(first, second);
    assert!(first.0 > 0.0);
}

#[test]
fn test_cvrp_reduction_when_windows_cover_the_horizon() {
    // All windows equal to the depot horizon: time warp never fires
    let clients = vec![
        client(0, 0, 0, 0, 0, 100_000),
        client(1, 20, 0, 2, 0, 100_000),
        client(2, 40, 0, 2, 0, 100_000),
        client(3, 60, 0, 2, 0, 100_000),
        client(4, 80, 0, 2, 0, 100_000),
    ];
    let params = Params::new(small_config().with_nb_vehicles(4), clients, 4, None).unwrap();

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run().unwrap();

    let best = algorithm.population.get_best_found().expect("a solution exists");
    assert!(best.is_feasible);
    assert_eq!(best.cost.time_warp, 0);
    assert_eq!(best.cost.wait_time, 0);
}
