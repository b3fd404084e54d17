//! 2-opt within a route and 2-opt* across routes.

use super::LocalSearch;
use crate::params::{Params, EPSILON};

impl LocalSearch {
    /// Same route: replace arcs (U, X) and (V, Y) by (U, V) and (X, Y),
    /// reversing the segment X..V.
    pub(crate) fn two_opt_within_trip(&mut self, params: &Params) -> bool {
        if self.nodes[self.node_u].position + 1 >= self.nodes[self.node_v].position {
            return false;
        }

        let mut cost = (params.dist(self.node_u_index, self.node_v_index)
            + params.dist(self.node_x_index, self.node_y_index)
            - params.dist(self.node_u_index, self.node_x_index)
            - params.dist(self.node_v_index, self.node_y_index)
            + self.nodes[self.node_v].cumulated_reversal_distance
            - self.nodes[self.node_x].cumulated_reversal_distance) as f64;

        if !self.route_u_time_warp && cost > -EPSILON {
            return false;
        }

        // The reversed segment is walked backwards node by node
        let mut route_tw = self.nodes[self.node_u].prefix_tw;
        let mut it_route = self.node_v;
        while it_route != self.node_u {
            route_tw = route_tw.merge(&self.nodes[it_route].tw, params);
            it_route = self.nodes[it_route].prev;
        }
        route_tw = route_tw.merge(&self.nodes[self.node_y].postfix_tw, params);

        cost += self.penalty_excess_load(self.routes[self.route_u].load)
            + self.penalty_time_windows(&route_tw)
            - self.routes[self.route_u].penalty;

        if cost > -EPSILON {
            return false;
        }

        // Reverse by reinserting V..X one by one after U; X itself pivots
        let mut it_route = self.node_v;
        let mut insertion_point = self.node_u;
        while it_route != self.node_x {
            let current = it_route;
            it_route = self.nodes[it_route].prev;
            self.insert_node(current, insertion_point);
            insertion_point = current;
        }

        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(self.route_u, params);
        true
    }

    /// Different routes: replace arcs (U, X) and (V, Y) by (U, Y) and
    /// (V, X), exchanging the route suffixes.
    pub(crate) fn two_opt_between_trips(&mut self, params: &Params) -> bool {
        let mut cost_supp_u = (params.dist(self.node_u_index, self.node_y_index)
            - params.dist(self.node_u_index, self.node_x_index)) as f64;
        let mut cost_supp_v = (params.dist(self.node_v_index, self.node_x_index)
            - params.dist(self.node_v_index, self.node_y_index)) as f64;

        if !self.route_u_load_penalty
            && !self.route_u_time_warp
            && !self.route_v_load_penalty
            && !self.route_v_time_warp
            && cost_supp_u + cost_supp_v > -EPSILON
        {
            return false;
        }

        let route_u_tw = self.nodes[self.node_u]
            .prefix_tw
            .merge(&self.nodes[self.node_y].postfix_tw, params);
        let route_v_tw = self.nodes[self.node_v]
            .prefix_tw
            .merge(&self.nodes[self.node_x].postfix_tw, params);

        cost_supp_u += self.penalty_excess_load(
            self.nodes[self.node_u].cumulated_load + self.routes[self.route_v].load
                - self.nodes[self.node_v].cumulated_load,
        ) + self.penalty_time_windows(&route_u_tw)
            - self.routes[self.route_u].penalty;
        cost_supp_v += self.penalty_excess_load(
            self.nodes[self.node_v].cumulated_load + self.routes[self.route_u].load
                - self.nodes[self.node_u].cumulated_load,
        ) + self.penalty_time_windows(&route_v_tw)
            - self.routes[self.route_v].penalty;

        if cost_supp_u + cost_supp_v > -EPSILON {
            return false;
        }

        // Move Y..end of route V after U, then X..end of route U after V
        let mut it_route_v = self.node_y;
        let mut insert_location = self.node_u;
        while !self.nodes[it_route_v].is_depot {
            let current = it_route_v;
            it_route_v = self.nodes[it_route_v].next;
            self.insert_node(current, insert_location);
            insert_location = current;
        }

        let mut it_route_u = self.node_x;
        let mut insert_location = self.node_v;
        while !self.nodes[it_route_u].is_depot {
            let current = it_route_u;
            it_route_u = self.nodes[it_route_u].next;
            self.insert_node(current, insert_location);
            insert_location = current;
        }

        self.nb_moves += 1;
        self.search_completed = false;
        self.update_route_data(self.route_u, params);
        self.update_route_data(self.route_v, params);
        true
    }
}
