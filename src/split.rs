//! Split algorithm: optimal partition of a giant tour into routes.
//!
//! Linear-time split following "Vidal, T. (2016). Split algorithm in O(n)
//! for the capacitated vehicle routing problem", with a limited-fleet
//! variant and a quadratic fallback for duration-constrained instances.
//! Only the capacity penalty enters the segment costs; time window
//! feasibility is recovered later by the local search.

use crate::error::{Error, Result};
use crate::individual::Individual;
use crate::params::{Params, EPSILON};

/// Per-position data of the giant tour, precomputed for the DP.
#[derive(Debug, Clone, Default)]
struct ClientSplit {
    demand: i64,
    /// Distance from the depot to the client
    d0_x: i64,
    /// Distance from the client to the depot
    dx_0: i64,
    /// Distance from the client to its successor in the giant tour
    dnext: i64,
}

/// Flat deque over label indices, sized once and reset per sweep. The back
/// index transiently reaches -1 when dominance empties the queue before the
/// next label is pushed, hence the signed indices.
struct TrivialDeque {
    elements: Vec<usize>,
    index_front: isize,
    index_back: isize,
}

impl TrivialDeque {
    fn new(nb_elements: usize, first_node: usize) -> Self {
        let mut elements = vec![0; nb_elements];
        elements[0] = first_node;
        TrivialDeque {
            elements,
            index_front: 0,
            index_back: 0,
        }
    }

    fn reset(&mut self, first_node: usize) {
        self.elements[0] = first_node;
        self.index_front = 0;
        self.index_back = 0;
    }

    #[inline]
    fn pop_front(&mut self) {
        self.index_front += 1;
    }

    #[inline]
    fn pop_back(&mut self) {
        self.index_back -= 1;
    }

    #[inline]
    fn push_back(&mut self, i: usize) {
        self.index_back += 1;
        self.elements[self.index_back as usize] = i;
    }

    #[inline]
    fn front(&self) -> usize {
        self.elements[self.index_front as usize]
    }

    #[inline]
    fn next_front(&self) -> usize {
        self.elements[self.index_front as usize + 1]
    }

    #[inline]
    fn back(&self) -> usize {
        self.elements[self.index_back as usize]
    }

    #[inline]
    fn size(&self) -> isize {
        self.index_back + 1 - self.index_front
    }
}

/// Split solver. Owns its DP workspace so repeated calls do not allocate.
pub struct Split {
    max_vehicles: usize,
    cli_split: Vec<ClientSplit>,
    /// `potential[k][i]`: cost of the best partition of the first `i` tour
    /// positions into `k` routes (one row in the unlimited-fleet variant)
    potential: Vec<Vec<f64>>,
    /// Predecessor positions of the optimal labels
    pred: Vec<Vec<usize>>,
    sum_distance: Vec<i64>,
    sum_load: Vec<i64>,
}

impl Split {
    pub fn new(params: &Params) -> Self {
        Split {
            max_vehicles: params.nb_vehicles,
            cli_split: vec![ClientSplit::default(); params.nb_clients + 1],
            potential: vec![vec![1.0e30; params.nb_clients + 1]; params.nb_vehicles + 1],
            pred: vec![vec![0; params.nb_clients + 1]; params.nb_vehicles + 1],
            sum_distance: vec![0; params.nb_clients + 1],
            sum_load: vec![0; params.nb_clients + 1],
        }
    }

    /// Split the giant tour of `indiv` into routes, trying the unlimited
    /// fleet first and the limited-fleet variant only when needed. Completes
    /// the individual with a full cost evaluation.
    pub fn general_split(
        &mut self,
        indiv: &mut Individual,
        params: &Params,
        nb_max_vehicles: usize,
    ) -> Result<()> {
        // Never apply Split with fewer vehicles than the bin packing bound
        let bound = ((params.total_demand as f64) / (params.vehicle_capacity as f64)).ceil() as usize;
        self.max_vehicles = nb_max_vehicles.max(bound);

        for i in 1..=params.nb_clients {
            let client = indiv.giant_tour[i - 1];
            self.cli_split[i].demand = params.clients[client].demand;
            self.cli_split[i].d0_x = params.dist(0, client);
            self.cli_split[i].dx_0 = params.dist(client, 0);
            self.cli_split[i].dnext = if i < params.nb_clients {
                params.dist(client, indiv.giant_tour[i])
            } else {
                0
            };
            self.sum_load[i] = self.sum_load[i - 1] + self.cli_split[i].demand;
            self.sum_distance[i] = self.sum_distance[i - 1] + self.cli_split[i - 1].dnext;
        }

        if !self.split_simple(indiv, params)? {
            self.split_limited_fleet(indiv, params)?;
        }

        indiv.evaluate_complete_cost(params);
        Ok(())
    }

    /// Cost of extending the label at position `i` into a route ending at
    /// position `j` (row `k`).
    #[inline]
    fn propagate(&self, i: usize, j: usize, k: usize, params: &Params) -> f64 {
        self.potential[k][i]
            + (self.sum_distance[j] - self.sum_distance[i + 1]
                + self.cli_split[i + 1].d0_x
                + self.cli_split[j].dx_0) as f64
            + params.penalty_capacity
                * (self.sum_load[j] - self.sum_load[i] - params.vehicle_capacity).max(0) as f64
    }

    /// Whether `i` dominates `j` as a predecessor for all positions after
    /// `j` (assumes `i < j`).
    #[inline]
    fn dominates(&self, i: usize, j: usize, k: usize, params: &Params) -> bool {
        self.potential[k][j] + self.cli_split[j + 1].d0_x as f64
            > self.potential[k][i]
                + (self.cli_split[i + 1].d0_x + self.sum_distance[j + 1]
                    - self.sum_distance[i + 1]) as f64
                + params.penalty_capacity * (self.sum_load[j] - self.sum_load[i]) as f64
    }

    /// Whether `j` dominates `i` as a predecessor for all positions after
    /// `j` (assumes `i < j`).
    #[inline]
    fn dominates_right(&self, i: usize, j: usize, k: usize) -> bool {
        (self.potential[k][j] + self.cli_split[j + 1].d0_x as f64)
            < self.potential[k][i]
                + (self.cli_split[i + 1].d0_x + self.sum_distance[j + 1]
                    - self.sum_distance[i + 1]) as f64
                + EPSILON
    }

    /// Unlimited-fleet split. Returns whether the reconstruction reached the
    /// start of the tour within `max_vehicles` routes.
    fn split_simple(&mut self, indiv: &mut Individual, params: &Params) -> Result<bool> {
        let n = params.nb_clients;
        self.potential[0][0] = 0.0;
        for i in 1..=n {
            self.potential[0][i] = 1.0e30;
        }

        if params.is_duration_constraint {
            // Bellman sweep over feasible segments, O(nB); segments are cut
            // off at 1.5x capacity
            for i in 0..n {
                let mut load = 0;
                let mut distance = 0;
                let mut j = i + 1;
                while j <= n && (load as f64) <= 1.5 * params.vehicle_capacity as f64 {
                    load += self.cli_split[j].demand;
                    if j == i + 1 {
                        distance += self.cli_split[j].d0_x;
                    } else {
                        distance += self.cli_split[j - 1].dnext;
                    }
                    let cost = (distance + self.cli_split[j].dx_0) as f64
                        + params.penalty_capacity
                            * (load - params.vehicle_capacity).max(0) as f64;
                    if self.potential[0][i] + cost < self.potential[0][j] {
                        self.potential[0][j] = self.potential[0][i] + cost;
                        self.pred[0][j] = i;
                    }
                    j += 1;
                }
            }
        } else {
            // Monotone deque, O(n)
            let mut queue = TrivialDeque::new(n + 1, 0);
            for i in 1..=n {
                // The front is the best predecessor for i
                self.potential[0][i] = self.propagate(queue.front(), i, 0, params);
                self.pred[0][i] = queue.front();

                if i < n {
                    // If i is not dominated by the back of the queue, insert
                    // it after evicting whoever i dominates
                    if !self.dominates(queue.back(), i, 0, params) {
                        while queue.size() > 0 && self.dominates_right(queue.back(), i, 0) {
                            queue.pop_back();
                        }
                        queue.push_back(i);
                    }
                    while queue.size() > 1
                        && self.propagate(queue.front(), i + 1, 0, params)
                            > self.propagate(queue.next_front(), i + 1, 0, params) - EPSILON
                    {
                        queue.pop_front();
                    }
                }
            }
        }

        if self.potential[0][n] > 1.0e29 {
            return Err(Error::SplitInfeasible);
        }

        // Fill the routes right to left so unused slots are the low indices
        for k in (self.max_vehicles..params.nb_vehicles).rev() {
            indiv.routes[k].clear();
        }
        let mut end = n;
        for k in (0..self.max_vehicles).rev() {
            indiv.routes[k].clear();
            let begin = self.pred[0][end];
            for position in begin..end {
                indiv.routes[k].push(indiv.giant_tour[position]);
            }
            end = begin;
        }

        Ok(end == 0)
    }

    /// Limited-fleet split: one sweep per vehicle, then the cheapest route
    /// count wins.
    fn split_limited_fleet(&mut self, indiv: &mut Individual, params: &Params) -> Result<bool> {
        let n = params.nb_clients;
        self.potential[0][0] = 0.0;
        for k in 0..=self.max_vehicles {
            for i in 1..=n {
                self.potential[k][i] = 1.0e30;
            }
        }

        if params.is_duration_constraint {
            for k in 0..self.max_vehicles {
                for i in k..n {
                    if self.potential[k][i] > 1.0e29 {
                        break;
                    }
                    let mut load = 0;
                    let mut distance = 0;
                    let mut j = i + 1;
                    while j <= n && (load as f64) <= 1.5 * params.vehicle_capacity as f64 {
                        load += self.cli_split[j].demand;
                        if j == i + 1 {
                            distance += self.cli_split[j].d0_x;
                        } else {
                            distance += self.cli_split[j - 1].dnext;
                        }
                        let cost = (distance + self.cli_split[j].dx_0) as f64
                            + params.penalty_capacity
                                * (load - params.vehicle_capacity).max(0) as f64;
                        if self.potential[k][i] + cost < self.potential[k + 1][j] {
                            self.potential[k + 1][j] = self.potential[k][i] + cost;
                            self.pred[k + 1][j] = i;
                        }
                        j += 1;
                    }
                }
            }
        } else {
            let mut queue = TrivialDeque::new(n + 1, 0);
            for k in 0..self.max_vehicles {
                // A partition into k routes always reaches position k, so
                // the sweep for row k + 1 starts from there
                queue.reset(k);
                for i in (k + 1)..=n {
                    if queue.size() == 0 {
                        break;
                    }
                    self.potential[k + 1][i] = self.propagate(queue.front(), i, k, params);
                    self.pred[k + 1][i] = queue.front();

                    if i < n {
                        if !self.dominates(queue.back(), i, k, params) {
                            while queue.size() > 0 && self.dominates_right(queue.back(), i, k) {
                                queue.pop_back();
                            }
                            queue.push_back(i);
                        }
                        while queue.size() > 1
                            && self.propagate(queue.front(), i + 1, k, params)
                                > self.propagate(queue.next_front(), i + 1, k, params) - EPSILON
                        {
                            queue.pop_front();
                        }
                    }
                }
            }
        }

        if self.potential[self.max_vehicles][n] > 1.0e29 {
            return Err(Error::SplitInfeasible);
        }

        // Using fewer vehicles can be cheaper
        let mut min_cost = self.potential[self.max_vehicles][n];
        let mut nb_routes = self.max_vehicles;
        for k in 1..self.max_vehicles {
            if self.potential[k][n] < min_cost {
                min_cost = self.potential[k][n];
                nb_routes = k;
            }
        }

        for k in (nb_routes..params.nb_vehicles).rev() {
            indiv.routes[k].clear();
        }
        let mut end = n;
        for k in (0..nb_routes).rev() {
            indiv.routes[k].clear();
            let begin = self.pred[k + 1][end];
            for position in begin..end {
                indiv.routes[k].push(indiv.giant_tour[position]);
            }
            end = begin;
        }

        Ok(end == 0)
    }
}
