//! SWAP* intensification: cross-route swaps where each client is reinserted
//! at the cheapest position of the other route, plus the cheaper
//! RELOCATE* sweep tried first.

use super::time_window::TimeWindowData;
use super::LocalSearch;
use crate::params::{Params, EPSILON};

/// Per (route, client): the three cheapest insertion positions, refreshed
/// lazily when the route changes.
#[derive(Debug, Clone)]
pub(crate) struct ThreeBestInsert {
    pub when_last_calculated: i64,
    pub best_cost: [i64; 3],
    pub best_location: [Option<usize>; 3],
}

impl ThreeBestInsert {
    pub fn new() -> Self {
        ThreeBestInsert {
            when_last_calculated: -1,
            best_cost: [i64::MAX; 3],
            best_location: [None; 3],
        }
    }

    pub fn reset(&mut self) {
        self.best_cost = [i64::MAX; 3];
        self.best_location = [None; 3];
    }

    /// Keep the three cheapest (cost, location) entries in order.
    pub fn compare_and_add(&mut self, cost_insert: i64, place_insert: usize) {
        if cost_insert >= self.best_cost[2] {
            return;
        }
        if cost_insert >= self.best_cost[1] {
            self.best_cost[2] = cost_insert;
            self.best_location[2] = Some(place_insert);
        } else if cost_insert >= self.best_cost[0] {
            self.best_cost[2] = self.best_cost[1];
            self.best_location[2] = self.best_location[1];
            self.best_cost[1] = cost_insert;
            self.best_location[1] = Some(place_insert);
        } else {
            self.best_cost[2] = self.best_cost[1];
            self.best_location[2] = self.best_location[1];
            self.best_cost[1] = self.best_cost[0];
            self.best_location[1] = self.best_location[0];
            self.best_cost[0] = cost_insert;
            self.best_location[0] = Some(place_insert);
        }
    }
}

/// Best SWAP* move found for a route pair.
struct SwapStarElement {
    move_cost: f64,
    load_pen_u: f64,
    load_pen_v: f64,
    u: usize,
    best_position_u: Option<usize>,
    v: usize,
    best_position_v: Option<usize>,
}

impl SwapStarElement {
    fn new() -> Self {
        SwapStarElement {
            move_cost: 1.0e30,
            load_pen_u: 1.0e30,
            load_pen_v: 1.0e30,
            u: 0,
            best_position_u: None,
            v: 0,
            best_position_v: None,
        }
    }
}

impl LocalSearch {
    /// Evaluate all SWAP* exchanges between `route_u` and `route_v` and
    /// apply the best improving one. The three-best preprocessing gives a
    /// lower-bound estimate; the exact time window cost is recomputed before
    /// accepting.
    pub(crate) fn swap_star(&mut self, with_tw: bool, params: &Params) -> bool {
        let (route_u, route_v) = (self.route_u, self.route_v);
        for r in [route_u, route_v] {
            if !self.best_insert_initialized_for_route[r] {
                self.best_insert_initialized_for_route[r] = true;
                for i in 1..=self.nb_clients {
                    self.best_insert_client[r][i].when_last_calculated = -1;
                    self.best_insert_client_tw[r][i].when_last_calculated = -1;
                }
            }
        }

        if with_tw {
            self.preprocess_insertions_with_tw(route_u, route_v, params);
            self.preprocess_insertions_with_tw(route_v, route_u, params);
        } else {
            self.preprocess_insertions(route_u, route_v, params);
            self.preprocess_insertions(route_v, route_u, params);
        }

        let mut best = SwapStarElement::new();

        // The exact time warp impact would cost O(n^3); the preprocessed
        // removal/insertion bounds filter candidates instead
        let mut u = self.nodes[self.routes[route_u].depot].next;
        while !self.nodes[u].is_depot {
            let mut v = self.nodes[self.routes[route_v].depot].next;
            while !self.nodes[v].is_depot {
                let demand_u = params.clients[self.nodes[u].cour].demand;
                let demand_v = params.clients[self.nodes[v].cour].demand;
                let load_pen_u =
                    self.penalty_excess_load(self.routes[route_u].load + demand_v - demand_u);
                let load_pen_v =
                    self.penalty_excess_load(self.routes[route_v].load + demand_u - demand_v);
                let delta_load_pen = load_pen_u + load_pen_v
                    - self.penalty_excess_load(self.routes[route_u].load)
                    - self.penalty_excess_load(self.routes[route_v].load);
                let delta_removal = if with_tw {
                    self.nodes[u].delta_removal_tw + self.nodes[v].delta_removal_tw
                } else {
                    self.nodes[u].delta_removal + self.nodes[v].delta_removal
                };

                if delta_load_pen + delta_removal as f64 <= 0.0 {
                    let (extra_v, best_position_u) = if with_tw {
                        self.cheapest_insert_simult_removal_with_tw(u, v, params)
                    } else {
                        self.cheapest_insert_simult_removal(u, v, params)
                    };
                    let (extra_u, best_position_v) = if with_tw {
                        self.cheapest_insert_simult_removal_with_tw(v, u, params)
                    } else {
                        self.cheapest_insert_simult_removal(v, u, params)
                    };

                    let move_cost = delta_load_pen + (delta_removal + extra_u + extra_v) as f64;
                    if move_cost < best.move_cost {
                        best = SwapStarElement {
                            move_cost,
                            load_pen_u,
                            load_pen_v,
                            u,
                            best_position_u,
                            v,
                            best_position_v,
                        };
                    }
                }
                v = self.nodes[v].next;
            }
            u = self.nodes[u].next;
        }

        let (best_position_u, best_position_v) = match (best.best_position_u, best.best_position_v)
        {
            (Some(pu), Some(pv)) => (pu, pv),
            _ => return false,
        };

        let u = best.u;
        let v = best.v;
        let u_prev = self.nodes[u].prev;
        let u_next = self.nodes[u].next;
        let v_prev = self.nodes[v].prev;
        let v_next = self.nodes[v].next;

        // Exact distance deltas of the combined move
        let mut cost_supp_u = (params.dist(self.nodes[best_position_v].cour, self.nodes[v].cour)
            - params.dist(self.nodes[u_prev].cour, self.nodes[u].cour)
            - params.dist(self.nodes[u].cour, self.nodes[u_next].cour)) as f64;
        let mut cost_supp_v = (params.dist(self.nodes[best_position_u].cour, self.nodes[u].cour)
            - params.dist(self.nodes[v_prev].cour, self.nodes[v].cour)
            - params.dist(self.nodes[v].cour, self.nodes[v_next].cour)) as f64;

        if best_position_v == u_prev {
            // V takes U's place
            cost_supp_u += params.dist(self.nodes[v].cour, self.nodes[u_next].cour) as f64;
        } else {
            cost_supp_u += (params.dist(
                self.nodes[v].cour,
                self.nodes[self.nodes[best_position_v].next].cour,
            ) + params.dist(self.nodes[u_prev].cour, self.nodes[u_next].cour)
                - params.dist(
                    self.nodes[best_position_v].cour,
                    self.nodes[self.nodes[best_position_v].next].cour,
                )) as f64;
        }

        if best_position_u == v_prev {
            // U takes V's place
            cost_supp_v += params.dist(self.nodes[u].cour, self.nodes[v_next].cour) as f64;
        } else {
            cost_supp_v += (params.dist(
                self.nodes[u].cour,
                self.nodes[self.nodes[best_position_u].next].cour,
            ) + params.dist(self.nodes[v_prev].cour, self.nodes[v_next].cour)
                - params.dist(
                    self.nodes[best_position_u].cour,
                    self.nodes[self.nodes[best_position_u].next].cour,
                )) as f64;
        }

        // Exact time window blocks. The insertion point can never equal the
        // removed node itself, so the positions are strictly different.
        let route_u_tw = if self.nodes[best_position_v].position == self.nodes[u].position - 1 {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[best_position_v].prefix_tw,
                    self.nodes[v].tw,
                    self.nodes[u_next].postfix_tw,
                ],
            )
        } else if self.nodes[best_position_v].position < self.nodes[u].position {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[best_position_v].prefix_tw,
                    self.nodes[v].tw,
                    self.route_segment_tw(self.nodes[best_position_v].next, u_prev, params),
                    self.nodes[u_next].postfix_tw,
                ],
            )
        } else {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[u_prev].prefix_tw,
                    self.route_segment_tw(u_next, best_position_v, params),
                    self.nodes[v].tw,
                    self.nodes[self.nodes[best_position_v].next].postfix_tw,
                ],
            )
        };

        let route_v_tw = if self.nodes[best_position_u].position == self.nodes[v].position - 1 {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[best_position_u].prefix_tw,
                    self.nodes[u].tw,
                    self.nodes[v_next].postfix_tw,
                ],
            )
        } else if self.nodes[best_position_u].position < self.nodes[v].position {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[best_position_u].prefix_tw,
                    self.nodes[u].tw,
                    self.route_segment_tw(self.nodes[best_position_u].next, v_prev, params),
                    self.nodes[v_next].postfix_tw,
                ],
            )
        } else {
            TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[v_prev].prefix_tw,
                    self.route_segment_tw(v_next, best_position_u, params),
                    self.nodes[u].tw,
                    self.nodes[self.nodes[best_position_u].next].postfix_tw,
                ],
            )
        };

        cost_supp_u += best.load_pen_u + self.penalty_time_windows(&route_u_tw)
            - self.routes[route_u].penalty;
        cost_supp_v += best.load_pen_v + self.penalty_time_windows(&route_v_tw)
            - self.routes[route_v].penalty;

        if cost_supp_u + cost_supp_v > -EPSILON {
            return false;
        }

        self.insert_node(u, best_position_u);
        self.insert_node(v, best_position_v);
        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(route_u, params);
        self.update_route_data(route_v, params);
        true
    }

    /// Best relocation of a single client of `route_u` to any insertion
    /// point of `route_v`. Cheaper than SWAP*, so it runs first.
    pub(crate) fn relocate_star(&mut self, params: &Params) -> bool {
        let (route_u, route_v) = (self.route_u, self.route_v);
        let mut best_cost = 0.0;
        let mut insertion_point: Option<usize> = None;
        let mut node_to_insert: Option<usize> = None;

        let mut u = self.nodes[self.routes[route_u].depot].next;
        while !self.nodes[u].is_depot {
            self.node_u = u;
            self.set_local_variables_route_u(params);

            let route_u_tw = self.nodes[self.nodes[u].prev]
                .prefix_tw
                .merge(&self.nodes[self.node_x].postfix_tw, params);
            let cost_supp_u = (params.dist(self.node_u_prev_index, self.node_x_index)
                - params.dist(self.node_u_prev_index, self.node_u_index)
                - params.dist(self.node_u_index, self.node_x_index))
                as f64
                + self.penalty_excess_load(self.routes[route_u].load - self.load_u)
                + self.penalty_time_windows(&route_u_tw)
                - self.routes[route_u].penalty;

            let mut v = self.nodes[self.routes[route_v].depot].next;
            while !self.nodes[v].is_depot {
                let route_v_tw = TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[v].prefix_tw,
                        self.nodes[u].tw,
                        self.nodes[self.nodes[v].next].postfix_tw,
                    ],
                );
                let cost_supp_v = (params.dist(self.nodes[v].cour, self.node_u_index)
                    + params.dist(self.node_u_index, self.nodes[self.nodes[v].next].cour)
                    - params.dist(self.nodes[v].cour, self.nodes[self.nodes[v].next].cour))
                    as f64
                    + self.penalty_excess_load(self.routes[route_v].load + self.load_u)
                    + self.penalty_time_windows(&route_v_tw)
                    - self.routes[route_v].penalty;
                if cost_supp_u + cost_supp_v < best_cost - EPSILON {
                    best_cost = cost_supp_u + cost_supp_v;
                    insertion_point = Some(v);
                    node_to_insert = Some(u);
                }
                v = self.nodes[v].next;
            }
            u = self.nodes[u].next;
        }

        let (insertion_point, node_to_insert) = match (insertion_point, node_to_insert) {
            (Some(p), Some(n)) => (p, n),
            _ => return false,
        };

        let source_route = self.nodes[node_to_insert].route;
        self.insert_node(node_to_insert, insertion_point);
        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(source_route, params);
        self.update_route_data(self.nodes[insertion_point].route, params);
        true
    }

    /// Cheapest insertion of U in the route of V, assuming V is removed.
    /// Returns the cost and the insertion point.
    fn cheapest_insert_simult_removal(
        &self,
        u: usize,
        v: usize,
        params: &Params,
    ) -> (i64, Option<usize>) {
        let cache = &self.best_insert_client[self.nodes[v].route][self.nodes[u].cour];

        // The best position not adjacent to V can only be among the top
        // three locations
        let mut best_position = cache.best_location[0];
        let mut best_cost = cache.best_cost[0];
        let mut found = best_position
            .map(|p| p != v && self.nodes[p].next != v)
            .unwrap_or(false);
        if !found && cache.best_location[1].is_some() {
            best_position = cache.best_location[1];
            best_cost = cache.best_cost[1];
            found = best_position
                .map(|p| p != v && self.nodes[p].next != v)
                .unwrap_or(false);
            if !found && cache.best_location[2].is_some() {
                best_position = cache.best_location[2];
                best_cost = cache.best_cost[2];
                found = true;
            }
        }

        // Also consider inserting in place of V
        let delta_cost = params.dist(self.nodes[self.nodes[v].prev].cour, self.nodes[u].cour)
            + params.dist(self.nodes[u].cour, self.nodes[self.nodes[v].next].cour)
            - params.dist(
                self.nodes[self.nodes[v].prev].cour,
                self.nodes[self.nodes[v].next].cour,
            );
        if !found || delta_cost < best_cost {
            best_position = Some(self.nodes[v].prev);
            best_cost = delta_cost;
        }

        (best_cost, best_position)
    }

    /// Time-window-aware variant of the cheapest simultaneous insertion.
    fn cheapest_insert_simult_removal_with_tw(
        &self,
        u: usize,
        v: usize,
        params: &Params,
    ) -> (i64, Option<usize>) {
        let cache = &self.best_insert_client_tw[self.nodes[v].route][self.nodes[u].cour];

        let mut best_position = cache.best_location[0];
        let mut best_cost = cache.best_cost[0];
        let mut found = best_position
            .map(|p| p != v && self.nodes[p].next != v)
            .unwrap_or(false);
        if !found && cache.best_location[1].is_some() {
            best_position = cache.best_location[1];
            best_cost = cache.best_cost[1];
            found = best_position
                .map(|p| p != v && self.nodes[p].next != v)
                .unwrap_or(false);
            if !found && cache.best_location[2].is_some() {
                best_position = cache.best_location[2];
                best_cost = cache.best_cost[2];
                found = true;
            }
        }

        let tw = TimeWindowData::merge_all(
            params,
            &[
                self.nodes[self.nodes[v].prev].prefix_tw,
                self.nodes[u].tw,
                self.nodes[self.nodes[v].next].postfix_tw,
            ],
        );
        let delta_cost = (params.dist(self.nodes[self.nodes[v].prev].cour, self.nodes[u].cour)
            + params.dist(self.nodes[u].cour, self.nodes[self.nodes[v].next].cour)
            - params.dist(
                self.nodes[self.nodes[v].prev].cour,
                self.nodes[self.nodes[v].next].cour,
            )) as f64
            + self.delta_penalty_time_windows(&tw, &self.routes[self.nodes[v].route].tw);
        let delta_cost = delta_cost as i64;
        if !found || delta_cost < best_cost {
            best_position = Some(self.nodes[v].prev);
            best_cost = delta_cost;
        }

        (best_cost, best_position)
    }

    /// Refresh removal deltas of `r1`'s clients and, when `r2` changed, the
    /// three cheapest insertion positions of each of them in `r2`.
    fn preprocess_insertions(&mut self, r1: usize, r2: usize, params: &Params) {
        let mut u = self.nodes[self.routes[r1].depot].next;
        while !self.nodes[u].is_depot {
            let u_prev = self.nodes[u].prev;
            let u_next = self.nodes[u].next;
            self.nodes[u].delta_removal = params
                .dist(self.nodes[u_prev].cour, self.nodes[u_next].cour)
                - params.dist(self.nodes[u_prev].cour, self.nodes[u].cour)
                - params.dist(self.nodes[u].cour, self.nodes[u_next].cour);

            if self.routes[r2].when_last_modified
                > self.best_insert_client[r2][self.nodes[u].cour].when_last_calculated
            {
                let u_cour = self.nodes[u].cour;
                let depot = self.routes[r2].depot;
                let first = self.nodes[depot].next;
                let first_cost = params.dist(0, u_cour) + params.dist(u_cour, self.nodes[first].cour)
                    - params.dist(0, self.nodes[first].cour);
                let nb_moves = self.nb_moves;
                let cache = &mut self.best_insert_client[r2][u_cour];
                cache.reset();
                cache.when_last_calculated = nb_moves;
                cache.best_cost[0] = first_cost;
                cache.best_location[0] = Some(depot);
                let mut v = first;
                while !self.nodes[v].is_depot {
                    let v_next = self.nodes[v].next;
                    let delta_cost = params.dist(self.nodes[v].cour, u_cour)
                        + params.dist(u_cour, self.nodes[v_next].cour)
                        - params.dist(self.nodes[v].cour, self.nodes[v_next].cour);
                    self.best_insert_client[r2][u_cour].compare_and_add(delta_cost, v);
                    v = v_next;
                }
            }
            u = self.nodes[u].next;
        }
    }

    /// Time-window-aware preprocessing. When removing U and adding V the
    /// penalties may interact; assuming independence gives a conservative
    /// estimate in most cases.
    fn preprocess_insertions_with_tw(&mut self, r1: usize, r2: usize, params: &Params) {
        let mut u = self.nodes[self.routes[r1].depot].next;
        while !self.nodes[u].is_depot {
            if self.routes[r1].is_delta_removal_tw_outdated {
                let u_prev = self.nodes[u].prev;
                let u_next = self.nodes[u].next;
                let tw = self.nodes[u_prev]
                    .prefix_tw
                    .merge(&self.nodes[u_next].postfix_tw, params);
                let delta = (params.dist(self.nodes[u_prev].cour, self.nodes[u_next].cour)
                    - params.dist(self.nodes[u_prev].cour, self.nodes[u].cour)
                    - params.dist(self.nodes[u].cour, self.nodes[u_next].cour))
                    as f64
                    + self.delta_penalty_time_windows(&tw, &self.routes[r1].tw);
                self.nodes[u].delta_removal_tw = delta as i64;
            }

            if self.routes[r2].when_last_modified
                > self.best_insert_client_tw[r2][self.nodes[u].cour].when_last_calculated
            {
                let u_cour = self.nodes[u].cour;
                let depot = self.routes[r2].depot;
                let first = self.nodes[depot].next;
                let first_tw = TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[depot].prefix_tw,
                        self.nodes[u].tw,
                        self.nodes[first].postfix_tw,
                    ],
                );
                let first_cost = (params.dist(0, u_cour)
                    + params.dist(u_cour, self.nodes[first].cour)
                    - params.dist(0, self.nodes[first].cour))
                    as f64
                    + self.delta_penalty_time_windows(&first_tw, &self.routes[r2].tw);
                let nb_moves = self.nb_moves;
                {
                    let cache = &mut self.best_insert_client_tw[r2][u_cour];
                    cache.reset();
                    cache.when_last_calculated = nb_moves;
                    cache.best_cost[0] = first_cost as i64;
                    cache.best_location[0] = Some(depot);
                }
                let mut v = first;
                while !self.nodes[v].is_depot {
                    let v_next = self.nodes[v].next;
                    let tw = TimeWindowData::merge_all(
                        params,
                        &[
                            self.nodes[v].prefix_tw,
                            self.nodes[u].tw,
                            self.nodes[v_next].postfix_tw,
                        ],
                    );
                    let delta_cost = (params.dist(self.nodes[v].cour, u_cour)
                        + params.dist(u_cour, self.nodes[v_next].cour)
                        - params.dist(self.nodes[v].cour, self.nodes[v_next].cour))
                        as f64
                        + self.delta_penalty_time_windows(&tw, &self.routes[r2].tw);
                    self.best_insert_client_tw[r2][u_cour].compare_and_add(delta_cost as i64, v);
                    v = v_next;
                }
            }
            u = self.nodes[u].next;
        }
        self.routes[r1].is_delta_removal_tw_outdated = false;
    }
}
