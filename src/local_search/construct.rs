//! Construction heuristics used to seed the initial population.

use std::collections::BTreeSet;

use super::time_window::TimeWindowData;
use super::LocalSearch;
use crate::individual::Individual;
use crate::params::Params;

/// Client data needed while building routes from scratch.
struct NodeToInsert {
    client_idx: usize,
    load: i64,
    /// Angle relative to the depot, in radians
    angle_from_depot: f64,
    tw: TimeWindowData,
}

impl LocalSearch {
    /// Reset the node pool to empty routes and gather the client data the
    /// construction heuristics work from.
    fn initialize_construction(&mut self, params: &Params) -> Vec<NodeToInsert> {
        self.empty_routes.clear();
        self.penalty_capacity_ls = params.penalty_capacity;
        self.penalty_time_warp_ls = params.penalty_time_warp;

        let depot_tw = TimeWindowData::depot(params);
        for i in 1..=self.nb_clients {
            self.nodes[i].tw = TimeWindowData::single(i, params);
        }
        for r in 0..self.nb_vehicles {
            let depot = self.routes[r].depot;
            let depot_end = self.routes[r].depot_end;
            self.nodes[depot].prev = depot_end;
            self.nodes[depot_end].next = depot;
            self.nodes[depot].next = depot_end;
            self.nodes[depot_end].prev = depot;
            for &sentinel in &[depot, depot_end] {
                let node = &mut self.nodes[sentinel];
                node.tw = depot_tw;
                node.prefix_tw = depot_tw;
                node.postfix_tw = depot_tw;
                node.is_seed = false;
                node.next_seed = None;
            }
            self.update_route_data(r, params);
        }

        (1..=self.nb_clients)
            .map(|i| NodeToInsert {
                client_idx: i,
                load: params.clients[i].demand,
                angle_from_depot: ((params.clients[i].coord_y - params.clients[0].coord_y) as f64)
                    .atan2((params.clients[i].coord_x - params.clients[0].coord_x) as f64),
                tw: self.nodes[i].tw,
            })
            .collect()
    }

    /// Splice an unlinked client node right after `insertion_point`.
    fn link_after(&mut self, to_insert: usize, insertion_point: usize) {
        let after = self.nodes[insertion_point].next;
        self.nodes[to_insert].prev = insertion_point;
        self.nodes[to_insert].next = after;
        self.nodes[after].prev = to_insert;
        self.nodes[insertion_point].next = to_insert;
        self.nodes[to_insert].route = self.nodes[insertion_point].route;
    }

    /// Sweep construction: group clients by polar angle into routes filled
    /// up to `fill_percentage` of the capacity. Within a route, clients with
    /// short time windows go first in order of latest arrival, the rest are
    /// inserted at their cheapest position.
    pub fn construct_individual_by_sweep(
        &mut self,
        fill_percentage: i64,
        indiv: &mut Individual,
        params: &Params,
    ) {
        let nodes_to_insert = self.initialize_construction(params);

        let mut order: Vec<usize> = (0..nodes_to_insert.len()).collect();
        order.sort_by(|&a, &b| {
            nodes_to_insert[a]
                .angle_from_depot
                .partial_cmp(&nodes_to_insert[b].angle_from_depot)
                .expect("angles are finite")
        });

        // Distribute clients over routes by the sweep order
        let mut node_indices_per_route: Vec<Vec<usize>> = Vec::new();
        let mut node_indices_in_route: Vec<usize> = Vec::new();
        let mut load = 0;
        for &idx in &order {
            if load > 0
                && load + nodes_to_insert[idx].load
                    > fill_percentage * params.vehicle_capacity / 100
                && node_indices_per_route.len() + 1 < self.routes.len()
            {
                node_indices_per_route.push(std::mem::take(&mut node_indices_in_route));
                load = 0;
            }
            load += nodes_to_insert[idx].load;
            node_indices_in_route.push(idx);
        }
        node_indices_per_route.push(node_indices_in_route);

        for (r, indices) in node_indices_per_route.iter().enumerate() {
            let depot = self.routes[r].depot;
            let depot_opening_duration =
                self.nodes[depot].tw.latest_arrival - self.nodes[depot].tw.earliest_arrival;
            let mut short_tw: Vec<usize> = Vec::new();
            let mut long_tw: Vec<usize> = Vec::new();
            for &idx in indices {
                // Time windows are either much shorter than half the horizon
                // or much larger; the midpoint separates the two groups
                let width = nodes_to_insert[idx].tw.latest_arrival
                    - nodes_to_insert[idx].tw.earliest_arrival;
                if width * 2 > depot_opening_duration {
                    long_tw.push(idx);
                } else {
                    short_tw.push(idx);
                }
            }

            short_tw.sort_by_key(|&idx| nodes_to_insert[idx].tw.latest_arrival);

            let mut prev = depot;
            for &idx in &short_tw {
                let to_insert = nodes_to_insert[idx].client_idx;
                self.link_after(to_insert, prev);
                prev = to_insert;
            }
            self.update_route_data(r, params);

            for &idx in &long_tw {
                let client = nodes_to_insert[idx].client_idx;
                let mut best_cost = f64::MAX;
                let mut best_pred = None;
                let mut prev = depot;
                for _ in 0..=self.routes[r].nb_customers {
                    let next = self.nodes[prev].next;
                    let insertion_cost = (params.dist(self.nodes[prev].cour, client)
                        + params.dist(client, self.nodes[next].cour)
                        - params.dist(self.nodes[prev].cour, self.nodes[next].cour))
                        as f64;
                    if insertion_cost < best_cost {
                        best_cost = insertion_cost;
                        best_pred = Some(prev);
                    }
                    prev = next;
                }
                let best_pred = best_pred.expect("route walk visits at least the depot");
                self.link_after(client, best_pred);
                self.update_route_data(r, params);
            }
        }

        self.export_individual(indiv, params);
    }

    /// Sequential route construction: each route starts either empty
    /// ("nearest") or seeded with the unassigned client furthest from the
    /// depot, then greedily takes the cheapest insertion that stays within
    /// the tolerated capacity violation and time warp. Clients left over
    /// when the routes run out go to the back of the last route.
    pub fn construct_individual_with_seed_order(
        &mut self,
        tolerated_capacity_violation: i64,
        tolerated_time_warp: i64,
        use_seed_client_furthest_from_depot: bool,
        indiv: &mut Individual,
        params: &Params,
    ) {
        let nodes_to_insert = self.initialize_construction(params);
        let mut unassigned: BTreeSet<usize> = (0..nodes_to_insert.len()).collect();

        for r in 0..self.routes.len() {
            if unassigned.is_empty() {
                break;
            }
            let depot = self.routes[r].depot;

            if use_seed_client_furthest_from_depot {
                let mut furthest_idx = None;
                let mut furthest_cost = -1.0;
                for &idx in &unassigned {
                    let client = nodes_to_insert[idx].client_idx;
                    let next = self.nodes[depot].next;
                    let insertion_cost = (params.dist(self.nodes[depot].cour, client)
                        + params.dist(client, self.nodes[next].cour)
                        - params.dist(self.nodes[depot].cour, self.nodes[next].cour))
                        as f64;
                    if insertion_cost > furthest_cost {
                        furthest_cost = insertion_cost;
                        furthest_idx = Some(idx);
                    }
                }
                let furthest_idx = furthest_idx.expect("unassigned set is non-empty");
                self.link_after(nodes_to_insert[furthest_idx].client_idx, depot);
                self.update_route_data(r, params);
                unassigned.remove(&furthest_idx);
            }

            let mut inserted_node = true;
            while inserted_node {
                inserted_node = false;
                let mut best_cost = f64::MAX;
                let mut best_pred = None;
                let mut best_node_idx = None;
                for &idx in &unassigned {
                    // Skip insertions violating capacity beyond the tolerance
                    if self.routes[r].load + nodes_to_insert[idx].load
                        > params.vehicle_capacity + tolerated_capacity_violation
                    {
                        continue;
                    }

                    let mut prev = depot;
                    for _ in 0..=self.routes[r].nb_customers {
                        let next = self.nodes[prev].next;
                        // Skip insertions violating time windows beyond the
                        // tolerance
                        let route_tw = TimeWindowData::merge_all(
                            params,
                            &[
                                self.nodes[prev].prefix_tw,
                                nodes_to_insert[idx].tw,
                                self.nodes[next].postfix_tw,
                            ],
                        );
                        if route_tw.time_warp > tolerated_time_warp {
                            prev = next;
                            continue;
                        }

                        let client = nodes_to_insert[idx].client_idx;
                        let insertion_cost = (params.dist(self.nodes[prev].cour, client)
                            + params.dist(client, self.nodes[next].cour)
                            - params.dist(self.nodes[prev].cour, self.nodes[next].cour))
                            as f64;
                        if insertion_cost < best_cost {
                            best_cost = insertion_cost;
                            best_pred = Some(prev);
                            best_node_idx = Some(idx);
                        }
                        prev = next;
                    }
                }

                if let (Some(pred), Some(idx)) = (best_pred, best_node_idx) {
                    self.link_after(nodes_to_insert[idx].client_idx, pred);
                    self.update_route_data(r, params);
                    inserted_node = true;
                    unassigned.remove(&idx);
                }
            }
        }

        // There are usually plenty of routes, but every client must end up
        // somewhere
        if !unassigned.is_empty() {
            let last_route = self.routes.len() - 1;
            let mut prev_node = self.nodes[self.routes[last_route].depot_end].prev;
            for idx in std::mem::take(&mut unassigned) {
                let client = nodes_to_insert[idx].client_idx;
                self.link_after(client, prev_node);
                prev_node = client;
            }
            self.update_route_data(last_route, params);
        }

        self.export_individual(indiv, params);
    }
}
