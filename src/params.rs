//! Problem instance data and run-wide parameter store.
//!
//! `Params` is built once at startup and stays immutable during the search
//! except for the three adaptive penalties, the granular neighbor lists and
//! the random generator.

use std::f64::consts::PI;
use std::fs;
use std::time::Instant;

use tracing::info;

use crate::circle_sector::positive_mod;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::rng::XorShift128;

/// Precision guard for numerical comparisons.
pub const EPSILON: f64 = 1e-5;

/// One client of the instance. Index 0 is the depot; it never appears in a
/// giant tour.
#[derive(Debug, Clone, Default)]
pub struct Client {
    /// Index of the client (0 = depot)
    pub cust_num: usize,
    pub coord_x: i64,
    pub coord_y: i64,
    pub service_duration: i64,
    pub demand: i64,
    /// Start of the time window
    pub earliest_arrival: i64,
    /// End of the time window
    pub latest_arrival: i64,
    /// A route containing this client cannot leave the depot earlier
    pub release_time: i64,
    /// Angle around the depot, mapped to [0, 65536)
    pub polar_angle: i64,
}

/// Instance data plus everything the search shares: adaptive penalties,
/// granular neighbor lists, the random generator and the elapsed clock.
pub struct Params {
    pub config: Config,
    pub rng: XorShift128,
    start_time: Instant,

    /// Penalty for one unit of capacity excess (adapted during the search)
    pub penalty_capacity: f64,
    /// Penalty for one unit of waiting time
    pub penalty_wait_time: f64,
    /// Penalty for one unit of time warp (adapted during the search)
    pub penalty_time_warp: f64,

    /// Weight of waiting time in the neighborhood proximity measure
    pub proximity_weight_wait_time: f64,
    /// Weight of time warp in the neighborhood proximity measure
    pub proximity_weight_time_warp: f64,

    pub instance_name: String,
    pub is_duration_constraint: bool,
    pub is_time_window_constraint: bool,
    pub is_explicit_distance_matrix: bool,
    /// Number of clients, excluding the depot
    pub nb_clients: usize,
    pub nb_vehicles: usize,
    pub duration_limit: i64,
    pub vehicle_capacity: i64,
    pub total_demand: i64,
    pub max_demand: i64,
    pub max_dist: i64,
    /// All clients, depot included at index 0
    pub clients: Vec<Client>,
    /// Travel time matrix, depot included
    pub time_cost: Matrix,
    /// For each client, the other clients sorted by proximity (empty for the depot)
    order_proximities: Vec<Vec<(f64, usize)>>,
    /// Granular neighborhoods: for each client, its `nb_granular` closest clients
    pub correlated_vertices: Vec<Vec<usize>>,
    /// Circle sector overlap tolerance, on the [0, 65536) circle
    pub circle_sector_overlap_tolerance: i64,
    /// Minimum circle sector size, on the [0, 65536) circle
    pub min_circle_sector_size: i64,
}

impl Params {
    /// Build the parameter store from already-parsed clients. The depot must
    /// sit at index 0 of `clients` and satisfy the depot invariants.
    pub fn new(
        mut config: Config,
        mut clients: Vec<Client>,
        vehicle_capacity: i64,
        explicit_matrix: Option<Matrix>,
    ) -> Result<Self> {
        if clients.len() < 2 {
            return Err(Error::InstanceFormat(
                "instance needs a depot and at least one client".into(),
            ));
        }
        let nb_clients = clients.len() - 1;

        if clients[0].earliest_arrival != 0 {
            return Err(Error::DepotInvariant("time window must start at 0".into()));
        }
        if clients[0].service_duration != 0 {
            return Err(Error::DepotInvariant("service duration must be 0".into()));
        }
        if clients[0].demand != 0 {
            return Err(Error::DepotInvariant("demand must be 0".into()));
        }
        if clients[0].release_time != 0 {
            return Err(Error::DepotInvariant("release time must be 0".into()));
        }
        if vehicle_capacity == i64::MAX {
            return Err(Error::InstanceFormat("vehicle capacity is undefined".into()));
        }

        let total_demand: i64 = clients.iter().map(|c| c.demand).sum();
        let max_demand = clients.iter().map(|c| c.demand).max().unwrap_or(0);

        // Polar angles around the depot, east = 0, counter-clockwise
        let (depot_x, depot_y) = (clients[0].coord_x, clients[0].coord_y);
        for client in clients.iter_mut() {
            let angle = ((client.coord_y - depot_y) as f64).atan2((client.coord_x - depot_x) as f64);
            client.polar_angle = positive_mod((32768.0 * angle / PI) as i64);
        }

        let is_explicit_distance_matrix = explicit_matrix.is_some();
        let mut max_dist = 0;
        let time_cost = match explicit_matrix {
            Some(matrix) => {
                for i in 0..=nb_clients {
                    for j in 0..=nb_clients {
                        max_dist = max_dist.max(matrix.get(i, j));
                    }
                }
                matrix
            }
            None => {
                let mut matrix = Matrix::new(nb_clients + 1);
                for i in 0..=nb_clients {
                    for j in (i + 1)..=nb_clients {
                        let dx = (clients[i].coord_x - clients[j].coord_x) as f64;
                        let dy = (clients[i].coord_y - clients[j].coord_y) as f64;
                        // Truncated Euclidean distance, as in the file formats
                        let cost = (dx * dx + dy * dy).sqrt() as i64;
                        max_dist = max_dist.max(cost);
                        matrix.set(i, j, cost);
                        matrix.set(j, i, cost);
                    }
                }
                matrix
            }
        };

        // Fleet sizing: command line wins, otherwise a margin over the bin
        // packing bound; -1 means one vehicle per client.
        let bin_packing_bound = ((total_demand as f64) / (vehicle_capacity as f64)).ceil() as usize;
        let nb_vehicles = match config.nb_vehicles {
            None => {
                let n = (1.3 * total_demand as f64 / vehicle_capacity as f64).ceil() as usize + 3;
                info!("fleet size not specified, defaulting to {} vehicles", n);
                n
            }
            Some(-1) => {
                info!("fleet size unlimited, using upper bound of {} vehicles", nb_clients);
                nb_clients
            }
            Some(n) => n.max(0) as usize,
        };

        if max_dist > 100_000 || (max_dist as f64) < 0.1 {
            return Err(Error::NumericScale(format!(
                "maximum distance {} outside [0.1, 100000]",
                max_dist
            )));
        }
        if max_demand > 100_000 || (max_demand as f64) < 0.1 {
            return Err(Error::NumericScale(format!(
                "maximum demand {} outside [0.1, 100000]",
                max_demand
            )));
        }
        if nb_vehicles < bin_packing_bound {
            return Err(Error::FleetTooSmall {
                vehicles: nb_vehicles,
                lower_bound: bin_packing_bound,
            });
        }

        if config.is_dimacs_run || config.use_dynamic_parameters {
            adapt_config_to_instance(&mut config, &clients, nb_clients, vehicle_capacity, total_demand);
        }

        let circle_sector_overlap_tolerance =
            (config.circle_sector_overlap_tolerance_degrees as f64 / 360.0 * 65536.0) as i64;
        let min_circle_sector_size =
            (config.min_circle_sector_size_degrees as f64 / 360.0 * 65536.0) as i64;

        // A reasonable scale for the initial capacity penalty
        let penalty_capacity = (max_dist as f64 / max_demand as f64).clamp(0.1, 1000.0);
        let penalty_time_warp = config.initial_time_warp_penalty;
        let rng = XorShift128::new(config.seed);

        let mut params = Params {
            rng,
            start_time: Instant::now(),
            penalty_capacity,
            penalty_wait_time: 0.0,
            penalty_time_warp,
            // See Vidal 2012, HGS for the VRPTW
            proximity_weight_wait_time: 0.2,
            proximity_weight_time_warp: 1.0,
            instance_name: String::new(),
            is_duration_constraint: false,
            is_time_window_constraint: true,
            is_explicit_distance_matrix,
            nb_clients,
            nb_vehicles,
            duration_limit: i64::MAX,
            vehicle_capacity,
            total_demand,
            max_demand,
            max_dist,
            clients,
            time_cost,
            order_proximities: Vec::new(),
            correlated_vertices: Vec::new(),
            circle_sector_overlap_tolerance,
            min_circle_sector_size,
            config,
        };
        params.compute_order_proximities();
        params.set_correlated_vertices();
        Ok(params)
    }

    /// Read an instance file (Solomon VRPTW or VRPLib keyword format) and
    /// build the parameter store.
    pub fn from_file(config: Config) -> Result<Self> {
        let content = fs::read_to_string(&config.path_instance).map_err(|e| {
            Error::InstanceFormat(format!(
                "impossible to open instance file {}: {}",
                config.path_instance, e
            ))
        })?;
        parse_instance(config, &content)
    }

    /// Travel time between two nodes (0 = depot).
    #[inline]
    pub fn dist(&self, from: usize, to: usize) -> i64 {
        self.time_cost.get(from, to)
    }

    /// Seconds elapsed since the parameter store was created.
    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Whether the configured time limit is exhausted.
    pub fn is_time_limit_exceeded(&self) -> bool {
        match self.config.time_limit {
            Some(limit) => self.elapsed_seconds() >= limit as f64,
            None => false,
        }
    }

    /// Proximity between clients following Vidal 2012 (Eq. 4): travel time
    /// plus weighted wait/warp estimates for either visit order.
    fn compute_order_proximities(&mut self) {
        let n = self.nb_clients;
        let mut proximities = vec![Vec::new(); n + 1];
        for i in 1..=n {
            let order_proximity = &mut proximities[i];
            for j in 1..=n {
                if i == j {
                    continue;
                }
                let time_ij = self.time_cost.get(i, j) as f64;
                let (ci, cj) = (&self.clients[i], &self.clients[j]);
                let forward = self.proximity_weight_wait_time
                    * ((cj.earliest_arrival - self.time_cost.get(i, j)
                        - ci.service_duration
                        - ci.latest_arrival)
                        .max(0)) as f64
                    + self.proximity_weight_time_warp
                        * ((ci.earliest_arrival + ci.service_duration + self.time_cost.get(i, j)
                            - cj.latest_arrival)
                            .max(0)) as f64;
                let backward = self.proximity_weight_wait_time
                    * ((ci.earliest_arrival - self.time_cost.get(i, j)
                        - cj.service_duration
                        - cj.latest_arrival)
                        .max(0)) as f64
                    + self.proximity_weight_time_warp
                        * ((cj.earliest_arrival + cj.service_duration + self.time_cost.get(i, j)
                            - ci.latest_arrival)
                            .max(0)) as f64;
                order_proximity.push((time_ij + forward.min(backward), j));
            }
            order_proximity
                .sort_by(|a, b| a.partial_cmp(b).expect("proximities are finite"));
        }
        self.order_proximities = proximities;
    }

    /// Rebuild the granular neighbor lists from the proximity order. Called
    /// at construction and whenever `nb_granular` grows.
    pub fn set_correlated_vertices(&mut self) {
        let n = self.nb_clients;
        let mut sets: Vec<std::collections::BTreeSet<usize>> = vec![Default::default(); n + 1];
        for i in 1..=n {
            let order_proximity = &self.order_proximities[i];
            for &(_, j) in order_proximity
                .iter()
                .take(self.config.nb_granular.min(n.saturating_sub(1)))
            {
                sets[i].insert(j);
                if self.config.use_symmetric_correlated_vertices {
                    sets[j].insert(i);
                }
            }
        }
        self.correlated_vertices = sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();
    }
}

/// Instance-shape-driven parameter selection: classify by route length and
/// time window width, then pick granularity, growth schedules and the
/// intensification rate.
fn adapt_config_to_instance(
    config: &mut Config,
    clients: &[Client],
    nb_clients: usize,
    vehicle_capacity: i64,
    total_demand: i64,
) {
    let stops_per_route = vehicle_capacity as f64 / (total_demand as f64 / nb_clients as f64);
    let has_large_routes = stops_per_route > 25.0;
    let horizon = clients[0].latest_arrival - clients[0].earliest_arrival;
    let nb_large_tw = clients[1..]
        .iter()
        .filter(|c| (c.latest_arrival - c.earliest_arrival) as f64 > 0.7 * horizon as f64)
        .count();
    let has_large_tw = nb_large_tw > 0;
    info!(has_large_routes, has_large_tw, "dynamic parameter selection");

    if has_large_routes {
        config.nb_granular = 40;
        config.grow_nb_granular_after_iterations = 10_000;
        config.grow_nb_granular_size = 5;
        config.grow_population_after_iterations = 10_000;
        config.grow_population_size = 5;
        config.intensification_probability_ls = 15;
    } else {
        if has_large_tw {
            // Smaller neighborhood so iterations are faster
            config.nb_granular = 20;
            config.grow_population_after_iterations = 20_000;
        } else {
            config.nb_granular = 40;
            config.grow_population_after_iterations = 10_000;
        }
        config.grow_population_size = 5;
        config.intensification_probability_ls = 100;
    }
}

/// Parse an instance body. Dispatches on the presence of a `VEHICLE` header
/// (Solomon) versus VRPLib keywords.
fn parse_instance(mut config: Config, content: &str) -> Result<Params> {
    let instance_name = content.lines().next().unwrap_or("").trim().to_string();
    if content.lines().any(|l| l.trim_start().starts_with("VEHICLE")) {
        let (clients, nb_vehicles, capacity) = parse_solomon(content)?;
        // Solomon instances carry the fleet size in the file
        if config.nb_vehicles.is_none() {
            config.nb_vehicles = Some(nb_vehicles);
        }
        let mut params = Params::new(config, clients, capacity, None)?;
        params.instance_name = instance_name;
        Ok(params)
    } else {
        let parsed = parse_vrplib(&mut config, content)?;
        let mut params = Params::new(config, parsed.clients, parsed.capacity, parsed.matrix)?;
        params.instance_name = instance_name;
        params.is_duration_constraint = parsed.is_duration_constraint;
        params.duration_limit = parsed.duration_limit;
        params.is_time_window_constraint = parsed.is_time_window_constraint;
        Ok(params)
    }
}

/// Solomon VRPTW format: `VEHICLE` header, `NUMBER CAPACITY`, then records
/// `id x y demand earliest latest service`. Coordinates and times are scaled
/// by 10 so distances carry one decimal while staying integer.
fn parse_solomon(content: &str) -> Result<(Vec<Client>, i64, i64)> {
    let mut lines = content.lines().peekable();
    // Skip until the VEHICLE header
    for line in lines.by_ref() {
        if line.trim_start().starts_with("VEHICLE") {
            break;
        }
    }
    // Header line NUMBER CAPACITY, then the values
    let mut nb_vehicles = None;
    let mut capacity = None;
    for line in lines.by_ref() {
        let fields: Vec<i64> = line
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();
        if fields.len() >= 2 {
            nb_vehicles = Some(fields[0]);
            capacity = Some(fields[1]);
            break;
        }
    }
    let nb_vehicles =
        nb_vehicles.ok_or_else(|| Error::InstanceFormat("missing vehicle count".into()))?;
    let capacity =
        capacity.ok_or_else(|| Error::InstanceFormat("missing vehicle capacity".into()))?;

    let mut clients = Vec::new();
    for line in lines {
        let fields: Vec<i64> = line
            .split_whitespace()
            .map(|t| t.parse::<i64>())
            .collect::<std::result::Result<_, _>>()
            .unwrap_or_default();
        if fields.len() < 7 {
            continue;
        }
        clients.push(Client {
            cust_num: fields[0] as usize,
            coord_x: fields[1] * 10,
            coord_y: fields[2] * 10,
            demand: fields[3],
            earliest_arrival: fields[4] * 10,
            latest_arrival: fields[5] * 10,
            service_duration: fields[6] * 10,
            release_time: 0,
            polar_angle: 0,
        });
    }
    if clients.is_empty() {
        return Err(Error::InstanceFormat("no client records found".into()));
    }
    Ok((clients, nb_vehicles, capacity))
}

struct VrplibInstance {
    clients: Vec<Client>,
    capacity: i64,
    matrix: Option<Matrix>,
    is_duration_constraint: bool,
    duration_limit: i64,
    is_time_window_constraint: bool,
}

/// VRPLib keyword format: `DIMENSION`, `CAPACITY`, coordinate/demand/service/
/// release/time-window sections, optional explicit full distance matrix.
fn parse_vrplib(config: &mut Config, content: &str) -> Result<VrplibInstance> {
    fn next<'a>(tokens: &[&'a str], pos: &mut usize) -> Result<&'a str> {
        let token = tokens
            .get(*pos)
            .copied()
            .ok_or_else(|| Error::InstanceFormat("unexpected end of file".into()))?;
        *pos += 1;
        Ok(token)
    }

    // Keyword values are written as `KEYWORD : value`; skip the separator.
    fn next_value<'a>(tokens: &[&'a str], pos: &mut usize) -> Result<&'a str> {
        let sep = next(tokens, pos)?;
        if sep == ":" {
            next(tokens, pos)
        } else {
            Ok(sep.trim_start_matches(':'))
        }
    }

    fn parse_i64(token: &str, what: &str) -> Result<i64> {
        token
            .parse()
            .map_err(|_| Error::InstanceFormat(format!("invalid {}: {}", what, token)))
    }

    let tokens: Vec<&str> = content.split_whitespace().collect();
    let mut pos = 0;

    let mut nb_clients: Option<usize> = None;
    let mut capacity = i64::MAX;
    let mut is_explicit = false;
    let mut matrix: Option<Matrix> = None;
    let mut clients: Vec<Client> = Vec::new();
    let mut is_duration_constraint = false;
    let mut duration_limit = i64::MAX;
    let mut is_time_window_constraint = false;
    let mut service_time_data = 0;
    let mut has_service_time_section = false;

    // The first token is part of the name line, already consumed by the
    // caller line-wise; scan from the top and ignore tokens until a known
    // keyword shows up.
    while pos < tokens.len() {
        let keyword = next(&tokens, &mut pos)?;
        match keyword {
            "EOF" => break,
            "DIMENSION" => {
                nb_clients = Some(parse_i64(next_value(&tokens, &mut pos)?, "dimension")? as usize - 1);
            }
            "EDGE_WEIGHT_TYPE" => {
                if next_value(&tokens, &mut pos)? == "EXPLICIT" {
                    is_explicit = true;
                }
            }
            "EDGE_WEIGHT_FORMAT" => {
                let format = next_value(&tokens, &mut pos)?;
                if !is_explicit {
                    return Err(Error::InstanceFormat(
                        "EDGE_WEIGHT_FORMAT requires EDGE_WEIGHT_TYPE : EXPLICIT".into(),
                    ));
                }
                if format != "FULL_MATRIX" {
                    return Err(Error::InstanceFormat(
                        "EDGE_WEIGHT_FORMAT only supports FULL_MATRIX".into(),
                    ));
                }
            }
            "CAPACITY" => {
                capacity = parse_i64(next_value(&tokens, &mut pos)?, "capacity")?;
            }
            "VEHICLES" | "SALESMAN" => {
                let value = parse_i64(next_value(&tokens, &mut pos)?, "vehicle count")?;
                // Command line takes precedence over the instance
                if config.nb_vehicles.is_none() {
                    config.nb_vehicles = Some(value);
                }
            }
            "DISTANCE" => {
                duration_limit = parse_i64(next_value(&tokens, &mut pos)?, "duration limit")?;
                is_duration_constraint = true;
            }
            "SERVICE_TIME" => {
                service_time_data = parse_i64(next_value(&tokens, &mut pos)?, "service time")?;
            }
            "EDGE_WEIGHT_SECTION" => {
                if !is_explicit {
                    return Err(Error::InstanceFormat(
                        "EDGE_WEIGHT_SECTION requires EDGE_WEIGHT_TYPE : EXPLICIT".into(),
                    ));
                }
                let n = dimension_or_err(nb_clients)?;
                let mut m = Matrix::new(n + 1);
                for i in 0..=n {
                    for j in 0..=n {
                        m.set(i, j, parse_i64(next(&tokens, &mut pos)?, "edge weight")?);
                    }
                }
                matrix = Some(m);
            }
            "NODE_COORD_SECTION" => {
                let n = dimension_or_err(nb_clients)?;
                ensure_clients(&mut clients, n);
                for i in 0..=n {
                    let id = parse_i64(next(&tokens, &mut pos)?, "node id")? as usize;
                    if id != i + 1 {
                        return Err(Error::InstanceFormat(
                            "clients are not in order in the list of coordinates".into(),
                        ));
                    }
                    clients[i].cust_num = i;
                    clients[i].coord_x = parse_i64(next(&tokens, &mut pos)?, "coordinate")?;
                    clients[i].coord_y = parse_i64(next(&tokens, &mut pos)?, "coordinate")?;
                }
            }
            "DEMAND_SECTION" => {
                let n = dimension_or_err(nb_clients)?;
                ensure_clients(&mut clients, n);
                for i in 0..=n {
                    let id = parse_i64(next(&tokens, &mut pos)?, "node id")? as usize;
                    if id != i + 1 {
                        return Err(Error::InstanceFormat(
                            "clients are not in order in the list of demands".into(),
                        ));
                    }
                    clients[i].demand = parse_i64(next(&tokens, &mut pos)?, "demand")?;
                }
            }
            "DEPOT_SECTION" => {
                let depot = next(&tokens, &mut pos)?;
                let _terminator = next(&tokens, &mut pos)?;
                if depot != "1" {
                    return Err(Error::InstanceFormat(format!(
                        "expected depot index 1 instead of {}",
                        depot
                    )));
                }
            }
            "SERVICE_TIME_SECTION" => {
                let n = dimension_or_err(nb_clients)?;
                ensure_clients(&mut clients, n);
                for i in 0..=n {
                    let id = parse_i64(next(&tokens, &mut pos)?, "node id")? as usize;
                    if id != i + 1 {
                        return Err(Error::InstanceFormat(
                            "clients are not in order in the list of service times".into(),
                        ));
                    }
                    clients[i].service_duration = parse_i64(next(&tokens, &mut pos)?, "service time")?;
                }
                has_service_time_section = true;
            }
            "RELEASE_TIME_SECTION" => {
                let n = dimension_or_err(nb_clients)?;
                ensure_clients(&mut clients, n);
                for i in 0..=n {
                    let id = parse_i64(next(&tokens, &mut pos)?, "node id")? as usize;
                    if id != i + 1 {
                        return Err(Error::InstanceFormat(
                            "clients are not in order in the list of release times".into(),
                        ));
                    }
                    clients[i].release_time = parse_i64(next(&tokens, &mut pos)?, "release time")?;
                }
            }
            "TIME_WINDOW_SECTION" => {
                is_time_window_constraint = true;
                let n = dimension_or_err(nb_clients)?;
                ensure_clients(&mut clients, n);
                for i in 0..=n {
                    let id = parse_i64(next(&tokens, &mut pos)?, "node id")? as usize;
                    if id != i + 1 {
                        return Err(Error::InstanceFormat(
                            "clients are not in order in the list of time windows".into(),
                        ));
                    }
                    clients[i].earliest_arrival = parse_i64(next(&tokens, &mut pos)?, "time window")?;
                    clients[i].latest_arrival = parse_i64(next(&tokens, &mut pos)?, "time window")?;
                }
            }
            "NAME" | "COMMENT" | "TYPE" => {
                // Header metadata; swallow ": value" (values cannot contain spaces)
                let _ = next_value(&tokens, &mut pos)?;
            }
            _ => {
                // The name line of the file produces arbitrary leading
                // tokens; everything after the first keyword must be known.
                if nb_clients.is_some() || capacity != i64::MAX {
                    return Err(Error::InstanceFormat(format!(
                        "unexpected data in input file: {}",
                        keyword
                    )));
                }
            }
        }
    }

    let n = dimension_or_err(nb_clients)?;
    ensure_clients(&mut clients, n);
    if !has_service_time_section {
        for (i, client) in clients.iter_mut().enumerate() {
            client.service_duration = if i == 0 { 0 } else { service_time_data };
        }
    }
    if !is_time_window_constraint {
        // Pure CVRP reading: open time windows over the whole horizon
        for client in clients.iter_mut() {
            client.earliest_arrival = 0;
            client.latest_arrival = i64::MAX / 4;
        }
    }

    Ok(VrplibInstance {
        clients,
        capacity,
        matrix,
        is_duration_constraint,
        duration_limit,
        is_time_window_constraint,
    })
}

fn dimension_or_err(nb_clients: Option<usize>) -> Result<usize> {
    nb_clients.ok_or_else(|| Error::InstanceFormat("DIMENSION must come first".into()))
}

fn ensure_clients(clients: &mut Vec<Client>, nb_clients: usize) {
    if clients.len() != nb_clients + 1 {
        *clients = vec![Client::default(); nb_clients + 1];
    }
}
