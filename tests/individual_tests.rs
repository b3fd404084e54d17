//! Tests for solution evaluation and the individual representation.

use hgs_vrptw::config::Config;
use hgs_vrptw::individual::Individual;
use hgs_vrptw::params::{Client, Params};

fn client(cust_num: usize, x: i64, y: i64, demand: i64, earliest: i64, latest: i64) -> Client {
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

/// Three clients on a line, ten apart, wide time windows.
fn create_test_params() -> Params {
    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        client(1, 10, 0, 1, 0, 10_000),
        client(2, 20, 0, 1, 0, 10_000),
        client(3, 30, 0, 1, 0, 10_000),
    ];
    Params::new(Config::new().with_nb_vehicles(3), clients, 10, None).unwrap()
}

#[test]
fn test_evaluate_distance_and_feasibility() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2, 3];
    indiv.evaluate_complete_cost(&params);

    assert_eq!(indiv.cost.distance, 10 + 10 + 10 + 30);
    assert_eq!(indiv.cost.nb_routes, 1);
    assert_eq!(indiv.cost.capacity_excess, 0);
    assert_eq!(indiv.cost.time_warp, 0);
    assert!(indiv.is_feasible);
    assert_eq!(indiv.cost.penalized_cost, indiv.cost.distance as f64);
}

#[test]
fn test_evaluate_fills_predecessors_and_successors() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![2, 1];
    indiv.routes[1] = vec![3];
    indiv.evaluate_complete_cost(&params);

    assert_eq!(indiv.predecessors[2], 0);
    assert_eq!(indiv.successors[2], 1);
    assert_eq!(indiv.predecessors[1], 2);
    assert_eq!(indiv.successors[1], 0);
    assert_eq!(indiv.predecessors[3], 0);
    assert_eq!(indiv.successors[3], 0);
}

#[test]
fn test_evaluate_counts_waiting_without_losing_feasibility() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        client(1, 10, 0, 1, 0, 10_000),
        // Opens long after any possible arrival
        client(2, 20, 0, 1, 500, 10_000),
    ];
    let params = Params::new(Config::new().with_nb_vehicles(2), clients, 10, None).unwrap();

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2];
    indiv.evaluate_complete_cost(&params);

    // Arrival at client 2 is 10 + 10 = 20; waiting until 500
    assert_eq!(indiv.cost.wait_time, 480);
    assert_eq!(indiv.cost.time_warp, 0);
    // Wait time has no bearing on feasibility
    assert!(indiv.is_feasible);
}

#[test]
fn test_evaluate_counts_time_warp() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        client(1, 10, 0, 1, 0, 10_000),
        // Closes before any possible arrival through client 1
        client(2, 20, 0, 1, 0, 15),
    ];
    let params = Params::new(Config::new().with_nb_vehicles(2), clients, 10, None).unwrap();

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2];
    indiv.evaluate_complete_cost(&params);

    // Arrival at client 2 is 20, five past its closing time
    assert_eq!(indiv.cost.time_warp, 5);
    assert!(!indiv.is_feasible);
}

#[test]
fn test_route_start_waits_for_release_time() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        Client {
            release_time: 1000,
            ..client(1, 10, 0, 1, 0, 5000)
        },
    ];
    let params = Params::new(Config::new().with_nb_vehicles(1), clients, 10, None).unwrap();

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1];
    indiv.evaluate_complete_cost(&params);

    // The vehicle leaves at 1000 and arrives at 1010, inside the window
    assert_eq!(indiv.cost.time_warp, 0);
    assert_eq!(indiv.cost.wait_time, 0);
    assert!(indiv.is_feasible);
}

#[test]
fn test_release_time_past_window_is_permanent_time_warp() {
    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        Client {
            release_time: 1000,
            ..client(1, 10, 0, 1, 0, 500)
        },
    ];
    let params = Params::new(Config::new().with_nb_vehicles(1), clients, 10, None).unwrap();

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1];
    indiv.evaluate_complete_cost(&params);

    // Leaving at the release time arrives at 1010, past the closing at 500
    assert_eq!(indiv.cost.time_warp, 510);
    assert!(!indiv.is_feasible);
}

#[test]
fn test_capacity_excess_is_per_route() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2, 3];
    indiv.evaluate_complete_cost(&params);
    assert_eq!(indiv.cost.capacity_excess, 0);

    let clients = vec![
        client(0, 0, 0, 0, 0, 10_000),
        client(1, 10, 0, 6, 0, 10_000),
        client(2, 20, 0, 6, 0, 10_000),
    ];
    let params = Params::new(Config::new().with_nb_vehicles(2), clients, 10, None).unwrap();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2];
    indiv.evaluate_complete_cost(&params);
    assert_eq!(indiv.cost.capacity_excess, 2);
    assert!(!indiv.is_feasible);
}

#[test]
fn test_broken_pairs_distance_properties() {
    let params = create_test_params();

    let mut a = Individual::new(&params);
    a.routes[0] = vec![1, 2, 3];
    a.evaluate_complete_cost(&params);

    let mut b = Individual::new(&params);
    b.routes[0] = vec![3, 2, 1];
    b.evaluate_complete_cost(&params);

    let mut c = Individual::new(&params);
    c.routes[0] = vec![2];
    c.routes[1] = vec![1, 3];
    c.evaluate_complete_cost(&params);

    // Identity
    assert_eq!(a.broken_pairs_distance(&a), 0.0);
    // A reversed route visits the same arcs, in both directions
    assert_eq!(a.broken_pairs_distance(&b), 0.0);
    assert_eq!(b.broken_pairs_distance(&a), 0.0);
    assert!(a.broken_pairs_distance(&c) > 0.0);
    assert!(a.broken_pairs_distance(&c) <= 1.0);
}

#[test]
fn test_penalized_cost_matches_recomputation() {
    let mut params = create_test_params();
    params.penalty_capacity = 7.5;
    params.penalty_time_warp = 3.25;

    let clients_cost = |indiv: &Individual| {
        indiv.cost.distance as f64
            + indiv.cost.capacity_excess as f64 * params.penalty_capacity
            + indiv.cost.time_warp as f64 * params.penalty_time_warp
            + indiv.cost.wait_time as f64 * params.penalty_wait_time
    };

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![3, 1];
    indiv.routes[2] = vec![2];
    indiv.evaluate_complete_cost(&params);

    assert!((indiv.cost.penalized_cost - clients_cost(&indiv)).abs() < 1e-9);
}

#[test]
fn test_cvrplib_round_trip() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 3];
    indiv.routes[1] = vec![2];
    indiv.evaluate_complete_cost(&params);

    let path = std::env::temp_dir().join(format!("hgs_vrptw_sol_{}.txt", std::process::id()));
    indiv.export_cvrplib(&path, 1.5).unwrap();

    let (routes, cost) = Individual::read_cvrplib(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(routes, vec![vec![1, 3], vec![2]]);
    assert_eq!(cost, (indiv.cost.penalized_cost as i64) as f64);
}

#[test]
fn test_giant_tour_parsing_with_route_separators() {
    let params = create_test_params();
    let indiv = Individual::from_giant_tour_str(&params, "2 0 1 3").unwrap();

    assert_eq!(indiv.routes[0], vec![2]);
    assert_eq!(indiv.routes[1], vec![1, 3]);
    assert_eq!(indiv.giant_tour, vec![2, 1, 3]);
    assert!(indiv.cost.distance > 0);
}

#[test]
fn test_giant_tour_parsing_rejects_missing_clients() {
    let params = create_test_params();
    assert!(Individual::from_giant_tour_str(&params, "2 0 1").is_err());
}
