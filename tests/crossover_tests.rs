//! Tests for the OX and SREX recombination operators.

use hgs_vrptw::config::Config;
use hgs_vrptw::crossover::{crossover_srex, do_ox_crossover};
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

/// Five clients on a circle around the depot.
fn create_test_params() -> Params {
    let clients = vec![
        client(0, 0, 0, 0),
        client(1, 100, 0, 1),
        client(2, 30, 95, 1),
        client(3, -80, 58, 1),
        client(4, -80, -58, 1),
        client(5, 30, -95, 1),
    ];
    Params::new(Config::new().with_nb_vehicles(5), clients, 3, None).unwrap()
}

fn evaluated(params: &Params, routes: Vec<Vec<usize>>) -> Individual {
    let mut indiv = Individual::new(params);
    let mut pos = 0;
    for (r, route) in routes.into_iter().enumerate() {
        for &c in &route {
            indiv.giant_tour[pos] = c;
            pos += 1;
        }
        indiv.routes[r] = route;
    }
    indiv.evaluate_complete_cost(params);
    indiv
}

fn is_permutation(tour: &[usize], nb_clients: usize) -> bool {
    let mut seen = vec![false; nb_clients + 1];
    for &c in tour {
        if c == 0 || c > nb_clients || seen[c] {
            return false;
        }
        seen[c] = true;
    }
    tour.len() == nb_clients
}

#[test]
fn test_ox_preserves_the_copied_zone() {
    let params = create_test_params();
    let mut split = Split::new(&params);

    let parent1 = evaluated(&params, vec![vec![1, 2, 3, 4, 5]]);
    let parent2 = evaluated(&params, vec![vec![5, 4, 3, 2, 1]]);

    let mut offspring = Individual::new(&params);
    do_ox_crossover(&mut offspring, (&parent1, &parent2), 1, 3, &params, &mut split).unwrap();

    // Positions 1..=3 come verbatim from parent 1
    assert_eq!(&offspring.giant_tour[1..4], &[2, 3, 4]);
    // The remainder follows parent 2 from position 4 onward: 1 then 5
    assert_eq!(offspring.giant_tour, vec![5, 2, 3, 4, 1]);
    assert!(is_permutation(&offspring.giant_tour, params.nb_clients));
}

#[test]
fn test_ox_output_is_always_a_permutation() {
    let params = create_test_params();
    let mut split = Split::new(&params);

    let parent1 = evaluated(&params, vec![vec![3, 1], vec![4, 2, 5]]);
    let parent2 = evaluated(&params, vec![vec![2, 5, 1], vec![3, 4]]);

    for start in 0..params.nb_clients {
        for end in 0..params.nb_clients {
            if start == end {
                continue;
            }
            let mut offspring = Individual::new(&params);
            do_ox_crossover(
                &mut offspring,
                (&parent1, &parent2),
                start,
                end,
                &params,
                &mut split,
            )
            .unwrap();
            assert!(is_permutation(&offspring.giant_tour, params.nb_clients));
        }
    }
}

#[test]
fn test_ox_derives_routes_through_split() {
    let params = create_test_params();
    let mut split = Split::new(&params);

    let parent1 = evaluated(&params, vec![vec![1, 2, 3, 4, 5]]);
    let parent2 = evaluated(&params, vec![vec![2, 4, 1, 5, 3]]);

    let mut offspring = Individual::new(&params);
    do_ox_crossover(&mut offspring, (&parent1, &parent2), 0, 2, &params, &mut split).unwrap();

    let visited: usize = offspring.routes.iter().map(|r| r.len()).sum();
    assert_eq!(visited, params.nb_clients);
    assert!(offspring.cost.penalized_cost > 0.0);
}

#[test]
fn test_srex_offspring_visits_every_client_once() {
    let mut params = create_test_params();

    let parent_a = evaluated(&params, vec![vec![1, 2], vec![3, 4], vec![5]]);
    let parent_b = evaluated(&params, vec![vec![2, 3], vec![4, 5], vec![1]]);

    let mut candidates = [
        Individual::new(&params),
        Individual::new(&params),
        Individual::new(&params),
        Individual::new(&params),
    ];

    for _ in 0..25 {
        let best = crossover_srex(&mut candidates, (&parent_a, &parent_b), &mut params);
        let mut visited: Vec<usize> = candidates[best].routes.iter().flatten().copied().collect();
        visited.sort_unstable();
        assert_eq!(visited, vec![1, 2, 3, 4, 5]);
    }
}

#[test]
fn test_srex_with_single_route_parents() {
    let mut params = create_test_params();

    let parent_a = evaluated(&params, vec![vec![1, 2, 3, 4, 5]]);
    let parent_b = evaluated(&params, vec![vec![5, 3, 1, 4, 2]]);

    let mut candidates = [
        Individual::new(&params),
        Individual::new(&params),
        Individual::new(&params),
        Individual::new(&params),
    ];

    let best = crossover_srex(&mut candidates, (&parent_a, &parent_b), &mut params);
    let mut visited: Vec<usize> = candidates[best].routes.iter().flatten().copied().collect();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2, 3, 4, 5]);
}
