//! Recombination operators: order crossover (OX) and selective route
//! exchange (SREX).

use std::collections::BTreeSet;

use crate::error::Result;
use crate::individual::Individual;
use crate::params::Params;
use crate::split::Split;

/// Candidate offspring slots: 0 and 1 belong to SREX, 2 and 3 to OX.
pub(crate) const SREX_SLOTS: (usize, usize) = (0, 1);
pub(crate) const OX_SLOTS: (usize, usize) = (2, 3);

/// Two OX crossovers with the same cut points and swapped parent roles;
/// returns the slot of the cheaper offspring.
pub fn crossover_ox(
    candidates: &mut [Individual; 4],
    parents: (&Individual, &Individual),
    params: &mut Params,
    split: &mut Split,
) -> Result<usize> {
    let nb_clients = params.nb_clients;
    let start = params.rng.next_mod(nb_clients);
    let mut end = params.rng.next_mod(nb_clients);
    while end == start {
        end = params.rng.next_mod(nb_clients);
    }

    do_ox_crossover(&mut candidates[OX_SLOTS.0], parents, start, end, params, split)?;
    do_ox_crossover(
        &mut candidates[OX_SLOTS.1],
        (parents.1, parents.0),
        start,
        end,
        params,
        split,
    )?;

    if candidates[OX_SLOTS.0].cost.penalized_cost < candidates[OX_SLOTS.1].cost.penalized_cost {
        Ok(OX_SLOTS.0)
    } else {
        Ok(OX_SLOTS.1)
    }
}

/// One OX crossover: copy the zone `[start, end]` (cyclically) from the
/// first parent, fill the remainder in the order of the second parent, and
/// derive routes with Split.
pub fn do_ox_crossover(
    result: &mut Individual,
    parents: (&Individual, &Individual),
    start: usize,
    end: usize,
    params: &Params,
    split: &mut Split,
) -> Result<()> {
    let n = params.nb_clients;
    let mut freq_client = vec![false; n + 1];

    let mut j = start;
    while j % n != (end + 1) % n {
        result.giant_tour[j % n] = parents.0.giant_tour[j % n];
        freq_client[result.giant_tour[j % n]] = true;
        j += 1;
    }

    for i in 1..=n {
        let client = parents.1.giant_tour[(end + i) % n];
        if !freq_client[client] {
            result.giant_tour[j % n] = client;
            j += 1;
        }
    }

    split.general_split(result, params, params.nb_vehicles)
}

/// SREX: exchange a block of routes between the parents. The block
/// selection slides towards minimal symmetric difference, then two
/// offspring variants are built and the cheaper one wins.
pub fn crossover_srex(
    candidates: &mut [Individual; 4],
    parents: (&Individual, &Individual),
    params: &mut Params,
) -> usize {
    let (parent_a, parent_b) = parents;
    let n_routes_a = parent_a.cost.nb_routes;
    let n_routes_b = parent_b.cost.nb_routes;

    // Adjacent routes overlap most (they are sorted by polar angle), so a
    // contiguous block is a good exchange unit
    let mut start_a = params.rng.next_mod(n_routes_a);
    let n_moved_routes = if n_routes_a.min(n_routes_b) == 1 {
        1
    } else {
        params.rng.next_mod(n_routes_a.min(n_routes_b) - 1) + 1
    };
    let mut start_b = if start_a < n_routes_b { start_a } else { 0 };

    let mut selected_a: BTreeSet<usize> = BTreeSet::new();
    for r in 0..n_moved_routes {
        selected_a.extend(&parent_a.routes[(start_a + r) % n_routes_a]);
    }
    let mut selected_b: BTreeSet<usize> = BTreeSet::new();
    for r in 0..n_moved_routes {
        selected_b.extend(&parent_b.routes[(start_b + r) % n_routes_b]);
    }

    // Greedily slide either block while the symmetric difference shrinks
    let mut improved = true;
    while improved {
        let count_a_not_in_b = |route: &[usize], set: &BTreeSet<usize>| {
            route.iter().filter(|c| !set.contains(*c)).count() as i64
        };
        let count_b_in_a = |route: &[usize], set: &BTreeSet<usize>| {
            route.iter().filter(|c| set.contains(*c)).count() as i64
        };

        let difference_a_left = count_a_not_in_b(
            &parent_a.routes[(start_a + n_routes_a - 1) % n_routes_a],
            &selected_b,
        ) - count_a_not_in_b(
            &parent_a.routes[(start_a + n_moved_routes - 1) % n_routes_a],
            &selected_b,
        );
        let difference_a_right = count_a_not_in_b(
            &parent_a.routes[(start_a + n_moved_routes) % n_routes_a],
            &selected_b,
        ) - count_a_not_in_b(&parent_a.routes[start_a], &selected_b);
        let difference_b_left = count_b_in_a(
            &parent_b.routes[(start_b + n_moved_routes + n_routes_b - 1) % n_routes_b],
            &selected_a,
        ) - count_b_in_a(
            &parent_b.routes[(start_b + n_routes_b - 1) % n_routes_b],
            &selected_a,
        );
        let difference_b_right = count_b_in_a(&parent_b.routes[start_b], &selected_a)
            - count_b_in_a(
                &parent_b.routes[(start_b + n_moved_routes) % n_routes_b],
                &selected_a,
            );

        let best_difference = difference_a_left
            .min(difference_a_right)
            .min(difference_b_left)
            .min(difference_b_right);

        if best_difference < 0 {
            if best_difference == difference_a_left {
                for c in &parent_a.routes[(start_a + n_moved_routes - 1) % n_routes_a] {
                    selected_a.remove(c);
                }
                start_a = (start_a + n_routes_a - 1) % n_routes_a;
                selected_a.extend(&parent_a.routes[start_a]);
            } else if best_difference == difference_a_right {
                for c in &parent_a.routes[start_a] {
                    selected_a.remove(c);
                }
                start_a = (start_a + 1) % n_routes_a;
                selected_a.extend(&parent_a.routes[(start_a + n_moved_routes - 1) % n_routes_a]);
            } else if best_difference == difference_b_left {
                for c in &parent_b.routes[(start_b + n_moved_routes - 1) % n_routes_b] {
                    selected_b.remove(c);
                }
                start_b = (start_b + n_routes_b - 1) % n_routes_b;
                selected_b.extend(&parent_b.routes[start_b]);
            } else {
                for c in &parent_b.routes[start_b] {
                    selected_b.remove(c);
                }
                start_b = (start_b + 1) % n_routes_b;
                selected_b.extend(&parent_b.routes[(start_b + n_moved_routes - 1) % n_routes_b]);
            }
        } else {
            improved = false;
        }
    }

    let selected_a_not_b: BTreeSet<usize> =
        selected_a.difference(&selected_b).copied().collect();
    let selected_b_not_a: BTreeSet<usize> =
        selected_b.difference(&selected_a).copied().collect();

    // Offspring 1 takes B's routes verbatim; offspring 2 strips the clients
    // that were not in A's selection
    let (slot1, slot2) = SREX_SLOTS;
    for r in 0..n_moved_routes {
        let index_a = (start_a + r) % n_routes_a;
        let index_b = (start_b + r) % n_routes_b;
        candidates[slot1].routes[index_a].clear();
        candidates[slot2].routes[index_a].clear();
        for &c in &parent_b.routes[index_b] {
            candidates[slot1].routes[index_a].push(c);
            if !selected_b_not_a.contains(&c) {
                candidates[slot2].routes[index_a].push(c);
            }
        }
    }

    // The kept routes of parent A, with duplicates of B's block removed in
    // offspring 1
    for r in n_moved_routes..n_routes_a {
        let index_a = (start_a + r) % n_routes_a;
        candidates[slot1].routes[index_a].clear();
        candidates[slot2].routes[index_a].clear();
        for &c in &parent_a.routes[index_a] {
            if !selected_b_not_a.contains(&c) {
                candidates[slot1].routes[index_a].push(c);
            }
            candidates[slot2].routes[index_a].push(c);
        }
    }

    for r in n_routes_a..params.nb_vehicles {
        candidates[slot1].routes[r].clear();
        candidates[slot2].routes[r].clear();
    }

    insert_unplanned_tasks(&mut candidates[slot1], &selected_a_not_b, params);
    insert_unplanned_tasks(&mut candidates[slot2], &selected_a_not_b, params);

    candidates[slot1].evaluate_complete_cost(params);
    candidates[slot2].evaluate_complete_cost(params);

    if candidates[slot1].cost.penalized_cost < candidates[slot2].cost.penalized_cost {
        slot1
    } else {
        slot2
    }
}

/// Cheapest insertion of the clients left unplanned by SREX, with a time
/// window prefilter on each candidate position.
fn insert_unplanned_tasks(
    offspring: &mut Individual,
    unplanned_tasks: &BTreeSet<usize>,
    params: &Params,
) {
    for &c in unplanned_tasks {
        let earliest_arrival = params.clients[c].earliest_arrival;
        let latest_arrival = params.clients[c].latest_arrival;

        let mut best_distance = i64::MAX;
        let mut best_location: Option<(usize, usize)> = None;

        for r in 0..params.nb_vehicles {
            if offspring.routes[r].is_empty() {
                continue;
            }

            let first = offspring.routes[r][0];
            let distance_from_insert = params.dist(c, first);
            if earliest_arrival + distance_from_insert < params.clients[first].latest_arrival {
                let distance_delta = params.dist(0, c) - params.dist(0, first);
                if distance_delta < best_distance {
                    best_distance = distance_delta;
                    best_location = Some((r, 0));
                }
            }

            for i in 1..offspring.routes[r].len() {
                let prev = offspring.routes[r][i - 1];
                let next = offspring.routes[r][i];
                let distance_to_insert = params.dist(prev, c);
                let distance_from_insert = params.dist(c, next);
                if params.clients[prev].earliest_arrival + distance_to_insert < latest_arrival
                    && earliest_arrival + distance_from_insert
                        < params.clients[next].latest_arrival
                {
                    let distance_delta =
                        distance_to_insert + distance_from_insert - params.dist(prev, next);
                    if distance_delta < best_distance {
                        best_distance = distance_delta;
                        best_location = Some((r, i));
                    }
                }
            }

            let last = *offspring.routes[r].last().unwrap();
            let distance_to_insert = params.dist(last, c);
            if params.clients[last].earliest_arrival + distance_to_insert < latest_arrival {
                let distance_delta =
                    distance_to_insert + params.dist(c, 0) - params.dist(last, 0);
                if distance_delta < best_distance {
                    best_distance = distance_delta;
                    best_location = Some((r, offspring.routes[r].len()));
                }
            }
        }

        // The prefilter can reject every position; fall back to the front
        let (route, position) = best_location.unwrap_or((0, 0));
        offspring.routes[route].insert(position, c);
    }
}
