//! Tests for the local search engine.

use hgs_vrptw::config::Config;
use hgs_vrptw::individual::Individual;
use hgs_vrptw::local_search::LocalSearch;
use hgs_vrptw::params::{Client, Params};

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

/// Five clients in a grid, wide time windows.
fn create_test_params() -> Params {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 1),
        client(2, 0, 100, 1),
        client(3, 100, 100, 1),
        client(4, 200, 0, 1),
        client(5, 200, 100, 2),
    ];
    Params::new(
        Config::new().with_nb_vehicles(3).with_nb_granular(4),
        clients,
        5,
        None,
    )
    .unwrap()
}

fn sorted_routes(indiv: &Individual) -> Vec<Vec<usize>> {
    let mut routes: Vec<Vec<usize>> = indiv
        .routes
        .iter()
        .filter(|r| !r.is_empty())
        .cloned()
        .collect();
    // A reversed route is the same set of arcs
    for route in routes.iter_mut() {
        if route.first() > route.last() {
            route.reverse();
        }
    }
    routes.sort();
    routes
}

#[test]
fn test_load_export_round_trip() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 4];
    indiv.routes[1] = vec![2, 3, 5];
    indiv.evaluate_complete_cost(&params);
    let original_routes = sorted_routes(&indiv);
    let original_cost = indiv.cost.penalized_cost;

    let mut local_search = LocalSearch::new(&params);
    local_search.load_individual(&indiv, &params);
    let mut exported = Individual::new(&params);
    local_search.export_individual(&mut exported, &params);

    assert_eq!(sorted_routes(&exported), original_routes);
    assert!((exported.cost.penalized_cost - original_cost).abs() < 1e-9);
}

#[test]
fn test_export_orders_giant_tour_consistently_with_routes() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![5, 3];
    indiv.routes[2] = vec![1, 2, 4];
    indiv.evaluate_complete_cost(&params);

    let mut local_search = LocalSearch::new(&params);
    local_search.load_individual(&indiv, &params);
    let mut exported = Individual::new(&params);
    local_search.export_individual(&mut exported, &params);

    let concatenated: Vec<usize> = exported.routes.iter().flatten().copied().collect();
    assert_eq!(exported.giant_tour, concatenated);
}

#[test]
fn test_run_untangles_a_crossed_route() {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 1),
        client(2, 200, 0, 1),
        client(3, 300, 0, 1),
        client(4, 400, 0, 1),
    ];
    let mut params = Params::new(
        Config::new()
            .with_nb_vehicles(1)
            .with_nb_granular(4)
            .with_seed(7),
        clients,
        10,
        None,
    )
    .unwrap();

    let mut indiv = Individual::new(&params);
    // Zig-zag order along the line
    indiv.routes[0] = vec![1, 3, 2, 4];
    indiv.evaluate_complete_cost(&params);
    assert_eq!(indiv.cost.distance, 100 + 200 + 100 + 200 + 400);

    let mut local_search = LocalSearch::new(&params);
    let (pc, ptw) = (params.penalty_capacity, params.penalty_time_warp);
    local_search.run(&mut indiv, pc, ptw, &mut params);

    // The ordered line is the optimum
    assert_eq!(indiv.cost.distance, 100 + 100 + 100 + 100 + 400);
    assert!(indiv.is_feasible);
}

#[test]
fn test_intensification_finds_cross_route_swap() {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 1000, 0, 1),
        client(2, 1000, 100, 1),
        client(3, 0, 1000, 1),
        client(4, 100, 1000, 1),
    ];
    let mut params = Params::new(
        Config::new()
            .with_nb_vehicles(2)
            .with_nb_granular(4)
            .with_intensification_probability_ls(100)
            .with_seed(3),
        clients,
        2,
        None,
    )
    .unwrap();

    // Each route holds one client of each cluster; swapping 2 and 4 gives
    // one route per cluster
    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 4];
    indiv.routes[1] = vec![3, 2];
    indiv.evaluate_complete_cost(&params);
    let initial_cost = indiv.cost.penalized_cost;

    let mut local_search = LocalSearch::new(&params);
    let (pc, ptw) = (params.penalty_capacity, params.penalty_time_warp);
    local_search.run(&mut indiv, pc, ptw, &mut params);

    assert!(indiv.cost.penalized_cost < initial_cost);
    // Optimal clustering: 1000 + 100 + 1004 per cluster route
    assert_eq!(indiv.cost.distance, 2 * (1000 + 100 + 1004));
    assert_eq!(sorted_routes(&indiv), vec![vec![1, 2], vec![3, 4]]);
}

#[test]
fn test_run_moves_overload_to_an_empty_route() {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 4),
        client(2, 110, 0, 4),
        client(3, 120, 0, 4),
    ];
    let mut params = Params::new(
        Config::new()
            .with_nb_vehicles(3)
            .with_nb_granular(2)
            .with_seed(11),
        clients,
        5,
        None,
    )
    .unwrap();
    // Make overloads expensive enough that splitting routes pays off
    params.penalty_capacity = 1000.0;

    let mut indiv = Individual::new(&params);
    indiv.routes[0] = vec![1, 2, 3];
    indiv.evaluate_complete_cost(&params);
    assert!(indiv.cost.capacity_excess > 0);

    let mut local_search = LocalSearch::new(&params);
    let (pc, ptw) = (params.penalty_capacity, params.penalty_time_warp);
    local_search.run(&mut indiv, pc, ptw, &mut params);

    assert_eq!(indiv.cost.capacity_excess, 0);
    assert!(indiv.is_feasible);
    assert!(indiv.cost.nb_routes >= 2);
}

#[test]
fn test_sweep_construction_visits_every_client() {
    let params = create_test_params();
    let mut indiv = Individual::new(&params);
    let mut local_search = LocalSearch::new(&params);
    local_search.construct_individual_by_sweep(80, &mut indiv, &params);

    let mut visited: Vec<usize> = indiv.routes.iter().flatten().copied().collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_seed_order_construction_visits_every_client() {
    let params = create_test_params();
    let mut local_search = LocalSearch::new(&params);

    for &furthest in &[false, true] {
        let mut indiv = Individual::new(&params);
        local_search.construct_individual_with_seed_order(0, 0, furthest, &mut indiv, &params);

        let mut visited: Vec<usize> = indiv.routes.iter().flatten().copied().collect();
        visited.sort_unstable();
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn test_seed_order_construction_respects_tolerances_when_possible() {
    let params = create_test_params();
    let mut local_search = LocalSearch::new(&params);

    let mut indiv = Individual::new(&params);
    local_search.construct_individual_with_seed_order(0, 0, false, &mut indiv, &params);

    // Capacity 5 fits the total demand of 6 into the three routes
    assert_eq!(indiv.cost.capacity_excess, 0);
    assert_eq!(indiv.cost.time_warp, 0);
}
