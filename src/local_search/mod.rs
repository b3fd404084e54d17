//! Neighborhood-descent engine on an intrusive route representation.
//!
//! The solution is held as doubly-linked lists over a contiguous node arena;
//! nodes refer to each other by index, never by pointer. Between calls the
//! state is cleared and rebuilt from the incoming individual by
//! [`LocalSearch::load_individual`] and written back by
//! [`LocalSearch::export_individual`].

pub mod construct;
mod relocate;
mod swap;
pub mod swap_star;
pub mod time_window;
mod two_opt;

use std::collections::BTreeSet;

use rand::seq::SliceRandom;

use crate::circle_sector::{positive_mod, CircleSector};
use crate::individual::Individual;
use crate::params::Params;
use self::swap_star::ThreeBestInsert;
use self::time_window::TimeWindowData;

/// One node of the arena: a client or a depot sentinel.
#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub is_depot: bool,
    /// Client index (0 for depot sentinels)
    pub cour: usize,
    /// Position in the route, depot-start = 0
    pub position: usize,
    /// Move counter value when RI moves for this node were last evaluated
    pub when_last_tested_ri: i64,
    /// Arena index of the next node in the route
    pub next: usize,
    /// Arena index of the previous node in the route
    pub prev: usize,
    /// Index of the route this node belongs to
    pub route: usize,
    /// Load accumulated from the route start up to and including this node
    pub cumulated_load: i64,
    /// Cost difference if the segment up to this node were reversed
    pub cumulated_reversal_distance: i64,
    /// Cost difference if the node were removed (SWAP* preprocessing)
    pub delta_removal: i64,
    /// Same, including the time window penalty delta
    pub delta_removal_tw: i64,
    pub tw: TimeWindowData,
    /// Time window data of the prefix (depot..=node)
    pub prefix_tw: TimeWindowData,
    /// Time window data of the postfix (node..=depot-end)
    pub postfix_tw: TimeWindowData,
    /// Whether a merged block to the node four positions later is available
    pub is_seed: bool,
    /// Merged block covering (node..node+4], valid when `is_seed`
    pub to_next_seed_tw: TimeWindowData,
    pub next_seed: Option<usize>,
}

/// Cached aggregate data of one route.
#[derive(Debug, Clone, Default)]
pub(crate) struct RouteData {
    pub idx: usize,
    pub nb_customers: usize,
    /// Move counter value when this route was last changed
    pub when_last_modified: i64,
    /// Move counter value when SWAP* was last evaluated on this route
    pub when_last_tested_large_nb: i64,
    /// Whether the cached removal deltas of the nodes are stale
    pub is_delta_removal_tw_outdated: bool,
    /// Arena index of the start depot
    pub depot: usize,
    /// Arena index of the end depot
    pub depot_end: usize,
    /// Driving plus service duration, excluding waiting
    pub duration: i64,
    pub load: i64,
    pub reversal_distance: i64,
    pub tw: TimeWindowData,
    /// Load and time window penalties of the route under the LS penalties
    pub penalty: f64,
    pub polar_angle_barycenter: f64,
    pub sector: CircleSector,
}

/// The local search engine. Owns its node and route pools for its lifetime.
pub struct LocalSearch {
    nb_clients: usize,
    nb_vehicles: usize,
    vehicle_capacity: i64,

    pub(crate) penalty_capacity_ls: f64,
    pub(crate) penalty_time_warp_ls: f64,
    pub(crate) search_completed: bool,
    /// Total number of applied moves. Doubles as the logical clock for the
    /// `when_last_*` watermarks.
    pub(crate) nb_moves: i64,
    loop_id: usize,
    /// Randomized order in which RI explores the clients
    order_nodes: Vec<usize>,
    /// Randomized order in which SWAP* explores the routes
    order_routes: Vec<usize>,
    pub(crate) empty_routes: BTreeSet<usize>,

    pub(crate) nodes: Vec<Node>,
    pub(crate) routes: Vec<RouteData>,
    pub(crate) best_insert_initialized_for_route: Vec<bool>,
    /// (SWAP*) Per route and client, cheapest insertions excluding TW
    pub(crate) best_insert_client: Vec<Vec<ThreeBestInsert>>,
    /// (SWAP*) Per route and client, cheapest insertions including TW
    pub(crate) best_insert_client_tw: Vec<Vec<ThreeBestInsert>>,

    // Move evaluation context: node_u_prev -> node_u -> node_x -> x_next,
    // node_v_prev -> node_v -> node_y -> y_next
    pub(crate) node_u: usize,
    pub(crate) node_x: usize,
    pub(crate) node_v: usize,
    pub(crate) node_y: usize,
    pub(crate) route_u: usize,
    pub(crate) route_v: usize,
    pub(crate) node_u_prev_index: usize,
    pub(crate) node_u_index: usize,
    pub(crate) node_x_index: usize,
    pub(crate) node_x_next_index: usize,
    pub(crate) node_v_prev_index: usize,
    pub(crate) node_v_index: usize,
    pub(crate) node_y_index: usize,
    pub(crate) node_y_next_index: usize,
    pub(crate) load_u: i64,
    pub(crate) load_x: i64,
    pub(crate) load_v: i64,
    pub(crate) load_y: i64,
    pub(crate) route_u_time_warp: bool,
    pub(crate) route_u_load_penalty: bool,
    pub(crate) route_v_time_warp: bool,
    pub(crate) route_v_load_penalty: bool,
}

impl LocalSearch {
    pub fn new(params: &Params) -> Self {
        let n = params.nb_clients;
        let k = params.nb_vehicles;
        let mut nodes = vec![Node::default(); n + 1 + 2 * k];
        for (i, node) in nodes.iter_mut().enumerate().take(n + 1) {
            node.cour = i;
        }
        let mut routes = vec![RouteData::default(); k];
        for (r, route) in routes.iter_mut().enumerate() {
            route.idx = r;
            route.depot = n + 1 + r;
            route.depot_end = n + 1 + k + r;
            nodes[route.depot].is_depot = true;
            nodes[route.depot].route = r;
            nodes[route.depot_end].is_depot = true;
            nodes[route.depot_end].route = r;
        }
        LocalSearch {
            nb_clients: n,
            nb_vehicles: k,
            vehicle_capacity: params.vehicle_capacity,
            penalty_capacity_ls: params.penalty_capacity,
            penalty_time_warp_ls: params.penalty_time_warp,
            search_completed: false,
            nb_moves: 0,
            loop_id: 0,
            order_nodes: (1..=n).collect(),
            order_routes: (0..k).collect(),
            empty_routes: BTreeSet::new(),
            nodes,
            routes,
            best_insert_initialized_for_route: vec![false; k],
            best_insert_client: vec![vec![ThreeBestInsert::new(); n + 1]; k],
            best_insert_client_tw: vec![vec![ThreeBestInsert::new(); n + 1]; k],
            node_u: 0,
            node_x: 0,
            node_v: 0,
            node_y: 0,
            route_u: 0,
            route_v: 0,
            node_u_prev_index: 0,
            node_u_index: 0,
            node_x_index: 0,
            node_x_next_index: 0,
            node_v_prev_index: 0,
            node_v_index: 0,
            node_y_index: 0,
            node_y_next_index: 0,
            load_u: 0,
            load_x: 0,
            load_v: 0,
            load_y: 0,
            route_u_time_warp: false,
            route_u_load_penalty: false,
            route_v_time_warp: false,
            route_v_load_penalty: false,
        }
    }

    /// Run the descent on `indiv` with the given penalty weights, writing
    /// the improved solution back into it. Always terminates: a move is
    /// applied only on strict improvement and re-evaluated only when one of
    /// its routes changed since the last test.
    pub fn run(
        &mut self,
        indiv: &mut Individual,
        penalty_capacity_ls: f64,
        penalty_time_warp_ls: f64,
        params: &mut Params,
    ) {
        let never_intensify = params.config.intensification_probability_ls == 0;
        let always_intensify = params.config.intensification_probability_ls == 100;
        let run_ls_int =
            params.rng.next() % 100 < params.config.intensification_probability_ls;

        self.penalty_capacity_ls = penalty_capacity_ls;
        self.penalty_time_warp_ls = penalty_time_warp_ls;
        self.load_individual(indiv, params);

        // Shuffle the exploration orders, and occasionally a granular
        // neighbor list; the latter is sampled so the expected work stays
        // O(nbGranular x n) overall
        self.order_nodes.shuffle(&mut params.rng);
        self.order_routes.shuffle(&mut params.rng);
        let nb_granular = params.config.nb_granular;
        for i in 1..=self.nb_clients {
            if params.rng.next_mod(nb_granular) == 0 {
                let Params {
                    rng,
                    correlated_vertices,
                    ..
                } = params;
                correlated_vertices[i].shuffle(rng);
            }
        }

        let params = &*params;
        self.search_completed = false;
        self.loop_id = 0;
        while !self.search_completed {
            if self.loop_id > 1 {
                // At least two loops, since moves involving empty routes are
                // not checked in the first one
                self.search_completed = true;
            }
            self.route_improvement_pass(params);
            if !never_intensify && self.search_completed && (always_intensify || run_ls_int) {
                self.intensification_pass(params);
            }
            self.loop_id += 1;
        }

        self.export_individual(indiv, params);
    }

    /// Classical route improvement moves, restricted to granular neighbors.
    fn route_improvement_pass(&mut self, params: &Params) {
        'node_loop: for pos_u in 0..self.nb_clients {
            let u = self.order_nodes[pos_u];
            self.node_u = u;
            let last_test_ri_u = self.nodes[u].when_last_tested_ri;
            self.nodes[u].when_last_tested_ri = self.nb_moves;

            for pos_v in 0..params.correlated_vertices[u].len() {
                let v = params.correlated_vertices[u][pos_v];
                self.node_v = v;
                let modified = self.routes[self.nodes[u].route]
                    .when_last_modified
                    .max(self.routes[self.nodes[v].route].when_last_modified);
                // Only evaluate moves whose routes changed since this node
                // was last tested
                if self.loop_id == 0 || modified > last_test_ri_u {
                    self.set_local_variables_route_u(params);
                    self.set_local_variables_route_v(params);
                    if self.move_single_client(params) {
                        continue;
                    }
                    if self.move_two_clients(params) {
                        continue;
                    }
                    if self.move_two_clients_reversed(params) {
                        continue;
                    }
                    if self.node_u_index < self.node_v_index
                        && self.swap_two_single_clients(params)
                    {
                        continue;
                    }
                    if self.swap_two_clients_for_one(params) {
                        continue;
                    }
                    if self.node_u_index < self.node_v_index && self.swap_two_client_pairs(params)
                    {
                        continue;
                    }
                    if self.route_u < self.route_v && self.two_opt_between_trips(params) {
                        continue;
                    }
                    if self.route_u == self.route_v && self.two_opt_within_trip(params) {
                        continue;
                    }

                    // Also evaluate inserting U right after the depot of V's
                    // route
                    if self.nodes[self.nodes[self.node_v].prev].is_depot {
                        self.node_v = self.nodes[self.node_v].prev;
                        self.set_local_variables_route_v(params);
                        if self.move_single_client(params) {
                            continue;
                        }
                        if self.move_two_clients(params) {
                            continue;
                        }
                        if self.move_two_clients_reversed(params) {
                            continue;
                        }
                        if self.route_u < self.route_v && self.two_opt_between_trips(params) {
                            continue;
                        }
                    }
                }
            }

            // Moves towards an empty route, skipped in the first loop to
            // avoid growing the fleet too eagerly
            if self.loop_id > 0 && !self.empty_routes.is_empty() {
                let empty = *self.empty_routes.iter().next().unwrap();
                self.node_v = self.routes[empty].depot;
                self.set_local_variables_route_u(params);
                self.set_local_variables_route_v(params);
                if self.move_single_client(params) {
                    continue 'node_loop;
                }
                if self.move_two_clients(params) {
                    continue 'node_loop;
                }
                if self.move_two_clients_reversed(params) {
                    continue 'node_loop;
                }
                if self.two_opt_between_trips(params) {
                    continue 'node_loop;
                }
            }
        }
    }

    /// SWAP* / RELOCATE* moves, limited to route pairs whose circle sectors
    /// overlap.
    fn intensification_pass(&mut self, params: &Params) {
        for r_u in 0..self.nb_vehicles {
            let route_u = self.order_routes[r_u];
            if self.routes[route_u].nb_customers == 0 {
                continue;
            }
            let last_test_large = self.routes[route_u].when_last_tested_large_nb;
            self.routes[route_u].when_last_tested_large_nb = self.nb_moves;
            for r_v in 0..self.nb_vehicles {
                let route_v = self.order_routes[r_v];
                if self.routes[route_v].nb_customers == 0 || route_u >= route_v {
                    continue;
                }
                if self.loop_id > 0
                    && self.routes[route_u]
                        .when_last_modified
                        .max(self.routes[route_v].when_last_modified)
                        <= last_test_large
                {
                    continue;
                }
                if !CircleSector::overlap(
                    &self.routes[route_u].sector,
                    &self.routes[route_v].sector,
                    params.circle_sector_overlap_tolerance,
                ) {
                    continue;
                }
                self.route_u = route_u;
                self.route_v = route_v;
                if !self.relocate_star(params) {
                    if params.config.skip_swap_star_dist || !self.swap_star(false, params) {
                        if params.config.use_swap_star_tw {
                            self.swap_star(true, params);
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn set_local_variables_route_u(&mut self, params: &Params) {
        self.route_u = self.nodes[self.node_u].route;
        self.node_x = self.nodes[self.node_u].next;
        self.node_x_next_index = self.nodes[self.nodes[self.node_x].next].cour;
        self.node_u_index = self.nodes[self.node_u].cour;
        self.node_u_prev_index = self.nodes[self.nodes[self.node_u].prev].cour;
        self.node_x_index = self.nodes[self.node_x].cour;
        self.load_u = params.clients[self.node_u_index].demand;
        self.load_x = params.clients[self.node_x_index].demand;
        self.route_u_time_warp = self.routes[self.route_u].tw.time_warp > 0;
        self.route_u_load_penalty = self.routes[self.route_u].load > params.vehicle_capacity;
    }

    pub(crate) fn set_local_variables_route_v(&mut self, params: &Params) {
        self.route_v = self.nodes[self.node_v].route;
        self.node_y = self.nodes[self.node_v].next;
        self.node_y_next_index = self.nodes[self.nodes[self.node_y].next].cour;
        self.node_v_index = self.nodes[self.node_v].cour;
        self.node_v_prev_index = self.nodes[self.nodes[self.node_v].prev].cour;
        self.node_y_index = self.nodes[self.node_y].cour;
        self.load_v = params.clients[self.node_v_index].demand;
        self.load_y = params.clients[self.node_y_index].demand;
        self.route_v_time_warp = self.routes[self.route_v].tw.time_warp > 0;
        self.route_v_load_penalty = self.routes[self.route_v].load > params.vehicle_capacity;
    }

    #[inline]
    pub(crate) fn penalty_excess_load(&self, load: i64) -> f64 {
        (load - self.vehicle_capacity).max(0) as f64 * self.penalty_capacity_ls
    }

    #[inline]
    pub(crate) fn penalty_time_windows(&self, tw: &TimeWindowData) -> f64 {
        (tw.time_warp + (tw.latest_release_time - tw.latest_arrival).max(0)) as f64
            * self.penalty_time_warp_ls
    }

    #[inline]
    pub(crate) fn delta_penalty_time_windows(
        &self,
        tw_add: &TimeWindowData,
        tw_subtract: &TimeWindowData,
    ) -> f64 {
        self.penalty_time_windows(tw_add) - self.penalty_time_windows(tw_subtract)
    }

    /// Block covering the edge (U, V), whether or not they are adjacent.
    pub(crate) fn edge_tw(&self, u: usize, v: usize, params: &Params) -> TimeWindowData {
        self.nodes[u].tw.merge(&self.nodes[v].tw, params)
    }

    /// Block covering the in-route segment from U to V (inclusive),
    /// amortized O(1) thanks to the seed blocks every four positions.
    pub(crate) fn route_segment_tw(&self, u: usize, v: usize, params: &Params) -> TimeWindowData {
        if self.nodes[u].is_depot {
            return self.nodes[v].prefix_tw;
        }
        if self.nodes[v].is_depot {
            return self.nodes[u].postfix_tw;
        }
        let mut tw = self.nodes[u].tw;
        let target_pos = self.nodes[v].position;
        let mut node = u;
        while node != v {
            if self.nodes[node].is_seed && self.nodes[node].position + 4 <= target_pos {
                tw = tw.merge(&self.nodes[node].to_next_seed_tw, params);
                node = self.nodes[node].next_seed.expect("seeded node has a target");
            } else {
                node = self.nodes[node].next;
                tw = tw.merge(&self.nodes[node].tw, params);
            }
        }
        tw
    }

    /// Unlink `to_insert` from its position and insert it right after
    /// `insertion_point`.
    pub(crate) fn insert_node(&mut self, to_insert: usize, insertion_point: usize) {
        let prev = self.nodes[to_insert].prev;
        let next = self.nodes[to_insert].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        let after = self.nodes[insertion_point].next;
        self.nodes[after].prev = to_insert;
        self.nodes[to_insert].prev = insertion_point;
        self.nodes[to_insert].next = after;
        self.nodes[insertion_point].next = to_insert;
        self.nodes[to_insert].route = self.nodes[insertion_point].route;
    }

    /// Exchange the positions of two non-adjacent nodes.
    pub(crate) fn swap_node(&mut self, u: usize, v: usize) {
        let u_prev = self.nodes[u].prev;
        let u_next = self.nodes[u].next;
        let v_prev = self.nodes[v].prev;
        let v_next = self.nodes[v].next;
        let route_u = self.nodes[u].route;
        let route_v = self.nodes[v].route;

        self.nodes[u_prev].next = v;
        self.nodes[u_next].prev = v;
        self.nodes[v_prev].next = u;
        self.nodes[v_next].prev = u;

        self.nodes[u].prev = v_prev;
        self.nodes[u].next = v_next;
        self.nodes[v].prev = u_prev;
        self.nodes[v].next = u_next;

        self.nodes[u].route = route_v;
        self.nodes[v].route = route_u;
    }

    /// Rebuild every cached quantity of a route: positions, cumulative
    /// load/reversal data, prefix and postfix time window blocks, seed
    /// blocks, sector, barycenter, and the route penalty.
    pub(crate) fn update_route_data(&mut self, route_idx: usize, params: &Params) {
        let mut place = 0usize;
        let mut load = 0i64;
        let mut time = 0i64;
        let mut reversal_distance = 0i64;
        let mut cumulated_x = 0i64;
        let mut cumulated_y = 0i64;

        let depot = self.routes[route_idx].depot;
        self.nodes[depot].position = 0;
        self.nodes[depot].cumulated_load = 0;
        self.nodes[depot].cumulated_reversal_distance = 0;

        let mut first_it = true;
        let mut seed_tw = TimeWindowData::default();
        let mut seed_node: Option<usize> = None;
        let mut node = depot;
        while !self.nodes[node].is_depot || first_it {
            node = self.nodes[node].next;
            place += 1;
            let prev = self.nodes[node].prev;
            let cour = self.nodes[node].cour;
            let prev_cour = self.nodes[prev].cour;
            load += params.clients[cour].demand;
            time += params.dist(prev_cour, cour) + params.clients[cour].service_duration;
            reversal_distance += params.dist(cour, prev_cour) - params.dist(prev_cour, cour);
            let prefix = self.nodes[prev].prefix_tw.merge(&self.nodes[node].tw, params);
            {
                let entry = &mut self.nodes[node];
                entry.position = place;
                entry.cumulated_load = load;
                entry.cumulated_reversal_distance = reversal_distance;
                entry.prefix_tw = prefix;
                entry.is_seed = false;
                entry.next_seed = None;
            }
            if !self.nodes[node].is_depot {
                cumulated_x += params.clients[cour].coord_x;
                cumulated_y += params.clients[cour].coord_y;
                if first_it {
                    self.routes[route_idx]
                        .sector
                        .initialize(params.clients[cour].polar_angle);
                } else {
                    self.routes[route_idx]
                        .sector
                        .extend(params.clients[cour].polar_angle);
                }
                if place % 4 == 0 {
                    if let Some(seed) = seed_node {
                        let block = seed_tw.merge(&self.nodes[node].tw, params);
                        self.nodes[seed].is_seed = true;
                        self.nodes[seed].to_next_seed_tw = block;
                        self.nodes[seed].next_seed = Some(node);
                    }
                    seed_node = Some(node);
                } else if place % 4 == 1 {
                    seed_tw = self.nodes[node].tw;
                } else {
                    seed_tw = seed_tw.merge(&self.nodes[node].tw, params);
                }
            }
            first_it = false;
        }

        let route_tw = self.nodes[node].prefix_tw;
        let penalty = self.penalty_excess_load(load) + self.penalty_time_windows(&route_tw);
        {
            let route = &mut self.routes[route_idx];
            route.duration = time;
            route.load = load;
            route.tw = route_tw;
            route.penalty = penalty;
            route.nb_customers = place - 1;
            route.reversal_distance = reversal_distance;
            route.when_last_modified = self.nb_moves;
            route.is_delta_removal_tw_outdated = true;
        }

        // Postfix blocks, walking back from the end depot
        let mut first_it = true;
        while !self.nodes[node].is_depot || first_it {
            node = self.nodes[node].prev;
            let next = self.nodes[node].next;
            let postfix = self.nodes[node].tw.merge(&self.nodes[next].postfix_tw, params);
            self.nodes[node].postfix_tw = postfix;
            first_it = false;
        }

        if self.routes[route_idx].nb_customers == 0 {
            self.routes[route_idx].polar_angle_barycenter = 1.0e30;
            self.empty_routes.insert(route_idx);
        } else {
            let nb = self.routes[route_idx].nb_customers as f64;
            self.routes[route_idx].polar_angle_barycenter =
                (cumulated_y as f64 / nb - params.clients[0].coord_y as f64)
                    .atan2(cumulated_x as f64 / nb - params.clients[0].coord_x as f64);
            // Keep every non-empty sector at the configured minimum size so
            // small routes still register overlap
            if params.min_circle_sector_size > 0 {
                let sector = &mut self.routes[route_idx].sector;
                let grow_by =
                    (params.min_circle_sector_size - positive_mod(sector.end - sector.start) + 1)
                        / 2;
                if grow_by > 0 {
                    let (start, end) = (sector.start, sector.end);
                    sector.extend(start - grow_by);
                    sector.extend(end + grow_by);
                }
            }
            self.empty_routes.remove(&route_idx);
        }
    }

    /// Rebuild the intrusive lists from the routes of an individual.
    pub fn load_individual(&mut self, indiv: &Individual, params: &Params) {
        self.empty_routes.clear();
        self.nb_moves = 0;
        let depot_tw = TimeWindowData::depot(params);

        for i in 1..=self.nb_clients {
            self.nodes[i].tw = TimeWindowData::single(i, params);
        }

        for r in 0..self.nb_vehicles {
            let depot = self.routes[r].depot;
            let depot_end = self.routes[r].depot_end;
            self.nodes[depot].prev = depot_end;
            self.nodes[depot_end].next = depot;
            if indiv.routes[r].is_empty() {
                self.nodes[depot].next = depot_end;
                self.nodes[depot_end].prev = depot;
            } else {
                let first = indiv.routes[r][0];
                self.nodes[first].route = r;
                self.nodes[first].prev = depot;
                self.nodes[depot].next = first;
                let mut client = first;
                for &next_client in &indiv.routes[r][1..] {
                    self.nodes[next_client].prev = client;
                    self.nodes[client].next = next_client;
                    self.nodes[next_client].route = r;
                    client = next_client;
                }
                self.nodes[client].next = depot_end;
                self.nodes[depot_end].prev = client;
            }

            for &sentinel in &[depot, depot_end] {
                let node = &mut self.nodes[sentinel];
                node.tw = depot_tw;
                node.prefix_tw = depot_tw;
                node.postfix_tw = depot_tw;
                node.is_seed = false;
                node.next_seed = None;
            }

            self.update_route_data(r, params);
            self.routes[r].when_last_tested_large_nb = -1;
            self.best_insert_initialized_for_route[r] = false;
        }

        for i in 1..=self.nb_clients {
            self.nodes[i].when_last_tested_ri = -1;
        }
    }

    /// Write the current route structure back into an individual, routes
    /// ordered by polar-angle barycenter (empty routes last), and evaluate
    /// its cost under the parameter penalties.
    pub fn export_individual(&self, indiv: &mut Individual, params: &Params) {
        let mut route_polar_angles: Vec<(f64, usize)> = self
            .routes
            .iter()
            .map(|route| (route.polar_angle_barycenter, route.idx))
            .collect();
        // Empty routes carry an angle of 1e30 and sort to the end
        route_polar_angles.sort_by(|a, b| a.partial_cmp(b).expect("angles are finite"));

        let mut pos = 0;
        for (r, &(_, source)) in route_polar_angles.iter().enumerate() {
            indiv.routes[r].clear();
            let mut node = self.nodes[self.routes[source].depot].next;
            while !self.nodes[node].is_depot {
                indiv.giant_tour[pos] = self.nodes[node].cour;
                indiv.routes[r].push(self.nodes[node].cour);
                node = self.nodes[node].next;
                pos += 1;
            }
        }

        indiv.evaluate_complete_cost(params);
    }
}
