//! Tests for the Split algorithm.

use hgs_vrptw::config::Config;
use hgs_vrptw::individual::Individual;
use hgs_vrptw::params::{Client, Params};
use hgs_vrptw::split::Split;

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

/// Six clients on a line with increasing demands, capacity 5.
fn create_test_params(nb_vehicles: i64) -> Params {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 10, 0, 1),
        client(2, 20, 0, 1),
        client(3, 30, 0, 2),
        client(4, 40, 0, 2),
        client(5, 50, 0, 2),
        client(6, 60, 0, 2),
    ];
    Params::new(
        Config::new().with_nb_vehicles(nb_vehicles),
        clients,
        5,
        None,
    )
    .unwrap()
}

fn split_tour(params: &Params, tour: Vec<usize>) -> Individual {
    let mut split = Split::new(params);
    let mut indiv = Individual::new(params);
    indiv.giant_tour = tour;
    split
        .general_split(&mut indiv, params, params.nb_vehicles)
        .unwrap();
    indiv
}

fn visited_clients(indiv: &Individual) -> Vec<usize> {
    let mut visited: Vec<usize> = indiv.routes.iter().flatten().copied().collect();
    visited.sort_unstable();
    visited
}

#[test]
fn test_split_single_customer() {
    let clients = vec![client(0, 0, 0, 0), client(1, 10, 0, 1)];
    let params = Params::new(Config::new().with_nb_vehicles(1), clients, 5, None).unwrap();
    let indiv = split_tour(&params, vec![1]);

    assert_eq!(indiv.cost.nb_routes, 1);
    assert_eq!(indiv.cost.distance, 20);
    assert!(indiv.is_feasible);
}

#[test]
fn test_split_visits_every_client_once() {
    let params = create_test_params(6);
    let indiv = split_tour(&params, vec![3, 1, 4, 6, 2, 5]);

    assert_eq!(visited_clients(&indiv), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_split_respects_capacity_under_high_penalty() {
    let mut params = create_test_params(6);
    // With a prohibitive penalty the optimal partition never overloads
    params.penalty_capacity = 1000.0;
    let indiv = split_tour(&params, vec![1, 2, 3, 4, 5, 6]);

    // Total demand is 10 over capacity 5, so at least two routes
    assert!(indiv.cost.nb_routes >= 2);
    for route in indiv.routes.iter().filter(|r| !r.is_empty()) {
        let load: i64 = route.iter().map(|&c| params.clients[c].demand).sum();
        assert!(load <= params.vehicle_capacity);
    }
}

#[test]
fn test_split_keeps_giant_tour_order_within_routes() {
    let params = create_test_params(6);
    let tour = vec![2, 5, 1, 6, 3, 4];
    let indiv = split_tour(&params, tour.clone());

    // Routes are contiguous segments of the tour, written right to left
    let mut rebuilt: Vec<usize> = Vec::new();
    for route in &indiv.routes {
        rebuilt.extend(route);
    }
    assert_eq!(rebuilt, tour);
}

#[test]
fn test_split_empty_routes_occupy_low_indices() {
    let params = create_test_params(6);
    let indiv = split_tour(&params, vec![1, 2, 3, 4, 5, 6]);

    // The last route slot is always used; unused slots come first
    let first_used = indiv.routes.iter().position(|r| !r.is_empty()).unwrap();
    assert!(indiv.routes[first_used..].iter().all(|r| !r.is_empty()));
}

#[test]
fn test_split_not_worse_than_single_client_routes() {
    let params = create_test_params(6);
    let tour = vec![4, 2, 6, 1, 5, 3];
    let indiv = split_tour(&params, tour.clone());

    let mut trivial = Individual::new(&params);
    for (r, &c) in tour.iter().enumerate() {
        trivial.routes[r] = vec![c];
    }
    trivial.evaluate_complete_cost(&params);

    assert!(indiv.cost.penalized_cost <= trivial.cost.penalized_cost + 1e-6);
}

#[test]
fn test_split_with_tight_fleet() {
    // Fleet exactly at the bin packing bound of ceil(10 / 5) = 2
    let params = create_test_params(2);
    let indiv = split_tour(&params, vec![1, 2, 3, 4, 5, 6]);

    assert_eq!(visited_clients(&indiv), vec![1, 2, 3, 4, 5, 6]);
    assert!(indiv.cost.nb_routes <= 2);
}

#[test]
fn test_split_limited_fleet_allows_overloaded_routes() {
    // With only two vehicles for clients that do not pack into two loads of
    // five, the limited-fleet variant returns an overloaded partition
    let params = create_test_params(2);
    let indiv = split_tour(&params, vec![1, 2, 3, 4, 5, 6]);

    assert_eq!(visited_clients(&indiv), vec![1, 2, 3, 4, 5, 6]);
    assert!(indiv.cost.capacity_excess > 0);
    assert!(!indiv.is_feasible);
}

#[test]
fn test_split_optimal_on_line_instances() {
    // On a line with uniform demand, contiguous halves are optimal
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 10, 0, 1),
        client(2, 20, 0, 1),
        client(3, 30, 0, 1),
        client(4, 40, 0, 1),
    ];
    let params = Params::new(Config::new().with_nb_vehicles(2), clients, 2, None).unwrap();
    let indiv = split_tour(&params, vec![1, 2, 3, 4]);

    // Expected: routes [1, 2] and [3, 4]
    // distance = (10 + 10 + 20) + (30 + 10 + 40) = 120
    assert_eq!(indiv.cost.distance, 120);
    assert!(indiv.is_feasible);
}
