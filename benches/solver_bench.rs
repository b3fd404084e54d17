//! Benchmarks for the core phases of the solver.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use hgs_vrptw::config::Config;
use hgs_vrptw::individual::Individual;
use hgs_vrptw::local_search::LocalSearch;
use hgs_vrptw::params::{Client, Params};
use hgs_vrptw::split::Split;

/// A grid of clients with staggered time windows.
fn create_benchmark_params(size: usize) -> Params {
    let mut clients = vec![Client {
        cust_num: 0,
        coord_x: 0,
        coord_y: 0,
        demand: 0,
        earliest_arrival: 0,
        latest_arrival: 100_000,
        service_duration: 0,
        release_time: 0,
        polar_angle: 0,
    }];

    let grid_size = (size as f64).sqrt().ceil() as i64;
    for i in 1..=size {
        let row = (i as i64 - 1) / grid_size;
        let col = (i as i64 - 1) % grid_size;
        clients.push(Client {
            cust_num: i,
            coord_x: col * 100 + 50,
            coord_y: row * 100 + 50,
            demand: 1 + (i as i64 % 3),
            earliest_arrival: (i as i64 % 10) * 500,
            latest_arrival: (i as i64 % 10) * 500 + 40_000,
            service_duration: 100,
            release_time: 0,
            polar_angle: 0,
        });
    }

    Params::new(
        Config::new()
            .with_seed(1)
            .with_nb_vehicles((size as i64 / 5).max(2)),
        clients,
        10,
        None,
    )
    .unwrap()
}

fn benchmark_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("split");

    for size in [50, 100, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut params = create_benchmark_params(size);
            let mut split = Split::new(&params);
            let indiv = Individual::new_random(&mut params);

            b.iter(|| {
                let mut candidate = indiv.clone();
                split
                    .general_split(&mut candidate, &params, params.nb_vehicles)
                    .unwrap();
                candidate.cost.penalized_cost
            });
        });
    }

    group.finish();
}

fn benchmark_local_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_search");

    for size in [50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut params = create_benchmark_params(size);
            let mut split = Split::new(&params);
            let mut local_search = LocalSearch::new(&params);
            let mut indiv = Individual::new_random(&mut params);
            split
                .general_split(&mut indiv, &params, params.nb_vehicles)
                .unwrap();

            b.iter(|| {
                let mut candidate = indiv.clone();
                let (pc, ptw) = (params.penalty_capacity, params.penalty_time_warp);
                local_search.run(&mut candidate, pc, ptw, &mut params);
                candidate.cost.penalized_cost
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_split, benchmark_local_search);
criterion_main!(benches);
