//! Swap moves: exchanging clients or client pairs between positions.

use super::time_window::TimeWindowData;
use super::LocalSearch;
use crate::params::{Params, EPSILON};

impl LocalSearch {
    /// Swap U and V.
    pub(crate) fn swap_two_single_clients(&mut self, params: &Params) -> bool {
        if self.node_u_index == self.node_v_prev_index || self.node_u_index == self.node_y_index {
            return false;
        }

        let mut cost_supp_u = (params.dist(self.node_u_prev_index, self.node_v_index)
            + params.dist(self.node_v_index, self.node_x_index)
            - params.dist(self.node_u_prev_index, self.node_u_index)
            - params.dist(self.node_u_index, self.node_x_index)) as f64;
        let mut cost_supp_v = (params.dist(self.node_v_prev_index, self.node_u_index)
            + params.dist(self.node_u_index, self.node_y_index)
            - params.dist(self.node_v_prev_index, self.node_v_index)
            - params.dist(self.node_v_index, self.node_y_index)) as f64;

        if self.route_u != self.route_v {
            if !self.route_u_load_penalty
                && !self.route_u_time_warp
                && !self.route_v_load_penalty
                && !self.route_v_time_warp
                && cost_supp_u + cost_supp_v > -EPSILON
            {
                return false;
            }

            let route_u_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                    self.nodes[self.node_v].tw,
                    self.nodes[self.node_x].postfix_tw,
                ],
            );
            let route_v_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                    self.nodes[self.node_u].tw,
                    self.nodes[self.node_y].postfix_tw,
                ],
            );

            cost_supp_u += self.penalty_excess_load(
                self.routes[self.route_u].load + self.load_v - self.load_u,
            ) + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
            cost_supp_v += self.penalty_excess_load(
                self.routes[self.route_v].load + self.load_u - self.load_v,
            ) + self.penalty_time_windows(&route_v_tw)
                - self.routes[self.route_v].penalty;
        } else {
            if !self.route_u_time_warp && cost_supp_u + cost_supp_v > -EPSILON {
                return false;
            }

            let route_u_tw = if self.nodes[self.node_u].position
                < self.nodes[self.node_v].position
            {
                // Edge case: V directly after X works, V == X is excluded
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                        self.nodes[self.node_v].tw,
                        self.route_segment_tw(self.node_x, self.nodes[self.node_v].prev, params),
                        self.nodes[self.node_u].tw,
                        self.nodes[self.node_y].postfix_tw,
                    ],
                )
            } else {
                // Edge case U directly after V is excluded at the top
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                        self.nodes[self.node_u].tw,
                        self.route_segment_tw(self.node_y, self.nodes[self.node_u].prev, params),
                        self.nodes[self.node_v].tw,
                        self.nodes[self.node_x].postfix_tw,
                    ],
                )
            };

            cost_supp_u += self.penalty_excess_load(self.routes[self.route_u].load)
                + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
        }

        if cost_supp_u + cost_supp_v > -EPSILON {
            return false;
        }

        self.swap_node(self.node_u, self.node_v);
        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(self.route_u, params);
        if self.route_u != self.route_v {
            self.update_route_data(self.route_v, params);
        }
        true
    }

    /// Swap the pair (U, X) with the single client V.
    pub(crate) fn swap_two_clients_for_one(&mut self, params: &Params) -> bool {
        if self.node_u == self.nodes[self.node_v].prev
            || self.node_x == self.nodes[self.node_v].prev
            || self.node_u == self.node_y
            || self.nodes[self.node_x].is_depot
        {
            return false;
        }

        let mut cost_supp_u = (params.dist(self.node_u_prev_index, self.node_v_index)
            + params.dist(self.node_v_index, self.node_x_next_index)
            - params.dist(self.node_u_prev_index, self.node_u_index)
            - params.dist(self.node_x_index, self.node_x_next_index)) as f64;
        let mut cost_supp_v = (params.dist(self.node_v_prev_index, self.node_u_index)
            + params.dist(self.node_x_index, self.node_y_index)
            - params.dist(self.node_v_prev_index, self.node_v_index)
            - params.dist(self.node_v_index, self.node_y_index)) as f64;

        if self.route_u != self.route_v {
            if !self.route_u_load_penalty
                && !self.route_u_time_warp
                && !self.route_v_load_penalty
                && !self.route_v_time_warp
                && cost_supp_u + cost_supp_v > -EPSILON
            {
                return false;
            }

            let route_u_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                    self.nodes[self.node_v].tw,
                    self.nodes[self.nodes[self.node_x].next].postfix_tw,
                ],
            );
            let route_v_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                    self.edge_tw(self.node_u, self.node_x, params),
                    self.nodes[self.node_y].postfix_tw,
                ],
            );

            cost_supp_u += self.penalty_excess_load(
                self.routes[self.route_u].load + self.load_v - self.load_u - self.load_x,
            ) + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
            cost_supp_v += self.penalty_excess_load(
                self.routes[self.route_v].load + self.load_u + self.load_x - self.load_v,
            ) + self.penalty_time_windows(&route_v_tw)
                - self.routes[self.route_v].penalty;
        } else {
            if !self.route_u_time_warp && cost_supp_u + cost_supp_v > -EPSILON {
                return false;
            }

            let route_u_tw = if self.nodes[self.node_u].position
                < self.nodes[self.node_v].position
            {
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                        self.nodes[self.node_v].tw,
                        self.route_segment_tw(
                            self.nodes[self.node_x].next,
                            self.nodes[self.node_v].prev,
                            params,
                        ),
                        self.edge_tw(self.node_u, self.node_x, params),
                        self.nodes[self.node_y].postfix_tw,
                    ],
                )
            } else {
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                        self.edge_tw(self.node_u, self.node_x, params),
                        self.route_segment_tw(self.node_y, self.nodes[self.node_u].prev, params),
                        self.nodes[self.node_v].tw,
                        self.nodes[self.nodes[self.node_x].next].postfix_tw,
                    ],
                )
            };

            cost_supp_u += self.penalty_excess_load(self.routes[self.route_u].load)
                + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
        }

        if cost_supp_u + cost_supp_v > -EPSILON {
            return false;
        }

        // A swap followed by a reinsertion of X; update_route_data is the
        // expensive part anyway
        self.swap_node(self.node_u, self.node_v);
        self.insert_node(self.node_x, self.node_u);
        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(self.route_u, params);
        if self.route_u != self.route_v {
            self.update_route_data(self.route_v, params);
        }
        true
    }

    /// Swap the pair (U, X) with the pair (V, Y).
    pub(crate) fn swap_two_client_pairs(&mut self, params: &Params) -> bool {
        if self.nodes[self.node_x].is_depot
            || self.nodes[self.node_y].is_depot
            || self.node_y == self.nodes[self.node_u].prev
            || self.node_u == self.node_y
            || self.node_x == self.node_v
            || self.node_v == self.nodes[self.node_x].next
        {
            return false;
        }

        let mut cost_supp_u = (params.dist(self.node_u_prev_index, self.node_v_index)
            + params.dist(self.node_y_index, self.node_x_next_index)
            - params.dist(self.node_u_prev_index, self.node_u_index)
            - params.dist(self.node_x_index, self.node_x_next_index)) as f64;
        let mut cost_supp_v = (params.dist(self.node_v_prev_index, self.node_u_index)
            + params.dist(self.node_x_index, self.node_y_next_index)
            - params.dist(self.node_v_prev_index, self.node_v_index)
            - params.dist(self.node_y_index, self.node_y_next_index)) as f64;

        if self.route_u != self.route_v {
            if !self.route_u_load_penalty
                && !self.route_u_time_warp
                && !self.route_v_load_penalty
                && !self.route_v_time_warp
                && cost_supp_u + cost_supp_v > -EPSILON
            {
                return false;
            }

            let route_u_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                    self.edge_tw(self.node_v, self.node_y, params),
                    self.nodes[self.nodes[self.node_x].next].postfix_tw,
                ],
            );
            let route_v_tw = TimeWindowData::merge_all(
                params,
                &[
                    self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                    self.edge_tw(self.node_u, self.node_x, params),
                    self.nodes[self.nodes[self.node_y].next].postfix_tw,
                ],
            );

            cost_supp_u += self.penalty_excess_load(
                self.routes[self.route_u].load + self.load_v + self.load_y
                    - self.load_u
                    - self.load_x,
            ) + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
            cost_supp_v += self.penalty_excess_load(
                self.routes[self.route_v].load + self.load_u + self.load_x
                    - self.load_v
                    - self.load_y,
            ) + self.penalty_time_windows(&route_v_tw)
                - self.routes[self.route_v].penalty;
        } else {
            if !self.route_u_time_warp && cost_supp_u + cost_supp_v > -EPSILON {
                return false;
            }

            let route_u_tw = if self.nodes[self.node_u].position
                < self.nodes[self.node_v].position
            {
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_u].prev].prefix_tw,
                        self.edge_tw(self.node_v, self.node_y, params),
                        self.route_segment_tw(
                            self.nodes[self.node_x].next,
                            self.nodes[self.node_v].prev,
                            params,
                        ),
                        self.edge_tw(self.node_u, self.node_x, params),
                        self.nodes[self.nodes[self.node_y].next].postfix_tw,
                    ],
                )
            } else {
                TimeWindowData::merge_all(
                    params,
                    &[
                        self.nodes[self.nodes[self.node_v].prev].prefix_tw,
                        self.edge_tw(self.node_u, self.node_x, params),
                        self.route_segment_tw(
                            self.nodes[self.node_y].next,
                            self.nodes[self.node_u].prev,
                            params,
                        ),
                        self.edge_tw(self.node_v, self.node_y, params),
                        self.nodes[self.nodes[self.node_x].next].postfix_tw,
                    ],
                )
            };

            cost_supp_u += self.penalty_excess_load(self.routes[self.route_u].load)
                + self.penalty_time_windows(&route_u_tw)
                - self.routes[self.route_u].penalty;
        }

        if cost_supp_u + cost_supp_v > -EPSILON {
            return false;
        }

        self.swap_node(self.node_u, self.node_v);
        self.swap_node(self.node_x, self.node_y);
        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(self.route_u, params);
        if self.route_u != self.route_v {
            self.update_route_data(self.route_v, params);
        }
        true
    }
}
