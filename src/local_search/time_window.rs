//! Time window algebra over contiguous node sequences.

use crate::params::Params;

/// Characterization of a contiguous sequence of nodes as if it were a single
/// super-node. `[earliest_arrival, latest_arrival]` is the interval in which
/// service of the first node can start while executing the minimum-cost
/// schedule; starting later adds time warp, starting earlier adds waiting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindowData {
    pub first_node: usize,
    pub last_node: usize,
    /// Cumulative duration, including waiting and servicing
    pub duration: i64,
    /// Cumulative time warp
    pub time_warp: i64,
    pub earliest_arrival: i64,
    pub latest_arrival: i64,
    /// Latest release time over the sequence; the route cannot dispatch before
    pub latest_release_time: i64,
}

impl TimeWindowData {
    /// Block for a single client.
    pub fn single(client: usize, params: &Params) -> Self {
        TimeWindowData {
            first_node: client,
            last_node: client,
            duration: params.clients[client].service_duration,
            time_warp: 0,
            earliest_arrival: params.clients[client].earliest_arrival,
            latest_arrival: params.clients[client].latest_arrival,
            latest_release_time: params.clients[client].release_time,
        }
    }

    /// Block for a depot sentinel.
    pub fn depot(params: &Params) -> Self {
        TimeWindowData {
            first_node: 0,
            last_node: 0,
            duration: 0,
            time_warp: 0,
            earliest_arrival: params.clients[0].earliest_arrival,
            latest_arrival: params.clients[0].latest_arrival,
            latest_release_time: params.clients[0].release_time,
        }
    }

    /// Concatenate two blocks in O(1). Travel time equals cost.
    pub fn merge(&self, other: &TimeWindowData, params: &Params) -> TimeWindowData {
        let delta_duration = params.dist(self.last_node, other.first_node);
        let delta = self.duration - self.time_warp + delta_duration;
        let delta_wait_time = (other.earliest_arrival - delta - self.latest_arrival).max(0);
        let delta_time_warp = (self.earliest_arrival + delta - other.latest_arrival).max(0);
        TimeWindowData {
            first_node: self.first_node,
            last_node: other.last_node,
            duration: self.duration + other.duration + delta_duration + delta_wait_time,
            time_warp: self.time_warp + other.time_warp + delta_time_warp,
            earliest_arrival: (other.earliest_arrival - delta).max(self.earliest_arrival)
                - delta_wait_time,
            latest_arrival: (other.latest_arrival - delta).min(self.latest_arrival)
                + delta_time_warp,
            latest_release_time: self.latest_release_time.max(other.latest_release_time),
        }
    }

    /// Left fold of `merge` over a sequence of blocks.
    pub fn merge_all(params: &Params, blocks: &[TimeWindowData]) -> TimeWindowData {
        let mut merged = blocks[0];
        for block in &blocks[1..] {
            merged = merged.merge(block, params);
        }
        merged
    }
}
