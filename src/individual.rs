//! Solution representation and cost evaluation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::seq::SliceRandom;
use tracing::info;

use crate::error::{Error, Result};
use crate::params::{Params, EPSILON};

/// Cost breakdown of a solution.
#[derive(Debug, Clone, Default)]
pub struct CostSol {
    /// Distance plus weighted penalties
    pub penalized_cost: f64,
    /// Number of non-empty routes
    pub nb_routes: usize,
    /// Total travel distance
    pub distance: i64,
    /// Total load in excess of the vehicle capacity, over all routes
    pub capacity_excess: i64,
    /// Total time spent waiting for time windows to open
    pub wait_time: i64,
    /// Total time warp needed to meet closing time windows
    pub time_warp: i64,
}

/// One individual of the population: a giant tour, its route decomposition,
/// and the cost data derived from the routes.
#[derive(Debug, Clone)]
pub struct Individual {
    pub cost: CostSol,
    /// Giant tour: the clients in visit order, without depot separators
    pub giant_tour: Vec<usize>,
    /// Per vehicle, the assigned clients in visit order (may be empty)
    pub routes: Vec<Vec<usize>>,
    /// For each node, its successor in the solution (0 = depot)
    pub successors: Vec<usize>,
    /// For each node, its predecessor in the solution (0 = depot)
    pub predecessors: Vec<usize>,
    pub is_feasible: bool,
    pub biased_fitness: f64,
    /// Identity assigned by the population (0 while unmanaged)
    pub id: u64,
    /// Other population members ordered by increasing broken-pairs distance
    pub proximate: Vec<(f64, u64)>,
}

impl Individual {
    /// Create an individual with an identity giant tour.
    pub fn new(params: &Params) -> Self {
        Individual {
            cost: CostSol::default(),
            giant_tour: (1..=params.nb_clients).collect(),
            routes: vec![Vec::new(); params.nb_vehicles],
            successors: vec![0; params.nb_clients + 1],
            predecessors: vec![0; params.nb_clients + 1],
            is_feasible: false,
            biased_fitness: 0.0,
            id: 0,
            proximate: Vec::new(),
        }
    }

    /// Create an individual with a randomly shuffled giant tour.
    pub fn new_random(params: &mut Params) -> Self {
        let mut indiv = Individual::new(params);
        indiv.shuffle_giant_tour(params);
        indiv
    }

    /// Reset the giant tour to the identity permutation and shuffle it.
    /// The routes are not updated; call Split afterwards.
    pub fn shuffle_giant_tour(&mut self, params: &mut Params) {
        for (i, slot) in self.giant_tour.iter_mut().enumerate() {
            *slot = i + 1;
        }
        self.giant_tour.shuffle(&mut params.rng);
    }

    /// Parse a giant-tour string where `0` separates routes, e.g.
    /// `1 2 3 0 4 5`. Evaluates the result.
    pub fn from_giant_tour_str(params: &Params, solution: &str) -> Result<Self> {
        let mut indiv = Individual::new(params);
        let mut pos = 0;
        let mut route = 0;
        for token in solution.split_whitespace() {
            let client: usize = token.parse().map_err(|_| {
                Error::InstanceFormat(format!("invalid client in initial solution: {}", token))
            })?;
            if client == 0 {
                route += 1;
                if route >= params.nb_vehicles {
                    return Err(Error::InstanceFormat(
                        "initial solution uses more routes than vehicles".into(),
                    ));
                }
            } else {
                if pos >= params.nb_clients {
                    return Err(Error::InstanceFormat(
                        "initial solution visits too many clients".into(),
                    ));
                }
                indiv.routes[route].push(client);
                indiv.giant_tour[pos] = client;
                pos += 1;
            }
        }
        if pos != params.nb_clients {
            return Err(Error::InstanceFormat(
                "initial solution does not visit every client".into(),
            ));
        }
        indiv.evaluate_complete_cost(params);
        Ok(indiv)
    }

    /// Recompute the full cost breakdown from `routes`, walking each route
    /// with the time window rules. Also rebuilds `predecessors` and
    /// `successors`.
    pub fn evaluate_complete_cost(&mut self, params: &Params) {
        self.cost = CostSol::default();
        for route in &self.routes {
            if route.is_empty() {
                continue;
            }
            // A vehicle may not leave before the latest release time of its
            // clients; starting exactly then is free since waiting at the
            // depot is not penalized.
            let latest_release = route
                .iter()
                .map(|&c| params.clients[c].release_time)
                .max()
                .unwrap_or(0);

            let first = route[0];
            let mut distance = params.dist(0, first);
            let mut load = params.clients[first].demand;
            let mut time = latest_release + distance;
            let mut wait_time = 0;
            let mut time_warp = 0;
            if time < params.clients[first].earliest_arrival {
                // The route can simply start later, so no waiting is counted
                time = params.clients[first].earliest_arrival;
            } else if time > params.clients[first].latest_arrival {
                time_warp += time - params.clients[first].latest_arrival;
                time = params.clients[first].latest_arrival;
            }
            self.predecessors[first] = 0;

            for window in route.windows(2) {
                let (prev, curr) = (window[0], window[1]);
                distance += params.dist(prev, curr);
                load += params.clients[curr].demand;
                time += params.clients[prev].service_duration + params.dist(prev, curr);
                if time < params.clients[curr].earliest_arrival {
                    wait_time += params.clients[curr].earliest_arrival - time;
                    time = params.clients[curr].earliest_arrival;
                } else if time > params.clients[curr].latest_arrival {
                    time_warp += time - params.clients[curr].latest_arrival;
                    time = params.clients[curr].latest_arrival;
                }
                self.predecessors[curr] = prev;
                self.successors[prev] = curr;
            }

            let last = *route.last().unwrap();
            self.successors[last] = 0;
            distance += params.dist(last, 0);
            time += params.clients[last].service_duration + params.dist(last, 0);
            // Only the end of the depot time window matters on return
            if time > params.clients[0].latest_arrival {
                time_warp += time - params.clients[0].latest_arrival;
            }

            self.cost.distance += distance;
            self.cost.wait_time += wait_time;
            self.cost.time_warp += time_warp;
            self.cost.nb_routes += 1;
            if load > params.vehicle_capacity {
                self.cost.capacity_excess += load - params.vehicle_capacity;
            }
        }

        self.cost.penalized_cost = self.cost.distance as f64
            + self.cost.capacity_excess as f64 * params.penalty_capacity
            + self.cost.time_warp as f64 * params.penalty_time_warp
            + self.cost.wait_time as f64 * params.penalty_wait_time;
        // Wait time does not affect feasibility
        self.is_feasible = self.cost.capacity_excess == 0 && self.cost.time_warp == 0;
    }

    /// Fraction of clients whose neighborhood (predecessor/successor pair)
    /// differs between the two solutions, counting reversed arcs as equal.
    pub fn broken_pairs_distance(&self, other: &Individual) -> f64 {
        let nb_clients = self.successors.len() - 1;
        let mut differences = 0;
        for j in 1..=nb_clients {
            if self.successors[j] != other.successors[j]
                && self.successors[j] != other.predecessors[j]
            {
                differences += 1;
            }
            // The successor check covers every arc except the first of each
            // route; count a client that starts a route here but not there.
            if self.predecessors[j] == 0 && other.predecessors[j] != 0 && other.successors[j] != 0 {
                differences += 1;
            }
        }
        differences as f64 / nb_clients as f64
    }

    /// Average broken-pairs distance to the `nb_closest` closest members.
    pub fn average_broken_pairs_distance_closest(&self, nb_closest: usize) -> f64 {
        let count = nb_closest.min(self.proximate.len());
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self.proximate[..count].iter().map(|(d, _)| d).sum();
        sum / count as f64
    }

    /// Record another member at the given distance, keeping the list sorted.
    pub fn add_proximity(&mut self, distance: f64, other: u64) {
        let at = self
            .proximate
            .partition_point(|(d, _)| *d < distance);
        self.proximate.insert(at, (distance, other));
    }

    /// Drop another member from the proximity list by identity.
    pub fn remove_proximity(&mut self, other: u64) {
        if let Some(at) = self.proximate.iter().position(|&(_, id)| id == other) {
            self.proximate.remove(at);
        }
    }

    /// Write the solution in CVRPLib format, with a trailing line holding
    /// the elapsed time.
    pub fn export_cvrplib<P: AsRef<Path>>(&self, path: P, elapsed_seconds: f64) -> Result<()> {
        info!(
            cost = self.cost.penalized_cost,
            path = %path.as_ref().display(),
            "writing solution"
        );
        let mut file = BufWriter::new(File::create(path)?);
        self.write_cvrplib(&mut file, elapsed_seconds)?;
        Ok(())
    }

    /// Print the solution in CVRPLib format on stdout (used in DIMACS mode,
    /// where the controller consumes incumbents as they are found).
    pub fn print_cvrplib(&self, elapsed_seconds: f64) {
        let mut out = Vec::new();
        // Writing to a Vec cannot fail
        self.write_cvrplib(&mut out, elapsed_seconds).unwrap();
        print!("{}", String::from_utf8_lossy(&out));
    }

    fn write_cvrplib<W: Write>(&self, out: &mut W, elapsed_seconds: f64) -> std::io::Result<()> {
        let mut route_number = 0;
        for route in &self.routes {
            if route.is_empty() {
                continue;
            }
            route_number += 1;
            write!(out, "Route #{}:", route_number)?;
            for client in route {
                write!(out, " {}", client)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "Cost {}", self.cost.penalized_cost as i64)?;
        writeln!(out, "Time {}", elapsed_seconds)?;
        Ok(())
    }

    /// Read a solution in CVRPLib format. Returns the routes and the cost
    /// recorded in the file, or `None` if the file is missing or malformed.
    pub fn read_cvrplib<P: AsRef<Path>>(path: P) -> Option<(Vec<Vec<usize>>, f64)> {
        let content = std::fs::read_to_string(path).ok()?;
        let mut routes = Vec::new();
        let mut cost = None;
        for line in content.lines() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some(word) if word.starts_with("Route") => {
                    // Skip the "#k:" token, keep the clients
                    let route: Vec<usize> = tokens
                        .skip(1)
                        .filter_map(|t| t.parse().ok())
                        .collect();
                    routes.push(route);
                }
                Some("Cost") => {
                    cost = tokens.next().and_then(|t| t.parse().ok());
                }
                _ => {}
            }
        }
        cost.map(|c| (routes, c))
    }

    /// Whether two individuals are closer than the numeric tolerance.
    pub fn is_clone_of(&self, other: &Individual) -> bool {
        self.broken_pairs_distance(other) < EPSILON
    }
}
