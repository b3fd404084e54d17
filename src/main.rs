//! Command line entry point: parse arguments, read the instance, run the
//! search, and export the best solution.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use hgs_vrptw::config::Config;
use hgs_vrptw::error::{Error, Result};
use hgs_vrptw::params::Params;
use hgs_vrptw::HgsAlgorithm;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match solve(std::env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("EXCEPTION | {}", e);
            ExitCode::FAILURE
        }
    }
}

fn solve(args: Vec<String>) -> Result<()> {
    let config = parse_command_line(&args)?;

    tracing::info!(instance = %config.path_instance, "reading data set");
    let params = Params::from_file(config)?;

    let mut algorithm = HgsAlgorithm::new(params);
    algorithm.run()?;

    let params = &algorithm.params;
    let population = &algorithm.population;
    if let Some(best) = population.get_best_found() {
        best.export_cvrplib(&params.config.path_solution, params.elapsed_seconds())?;
        population.export_search_progress(
            &format!("{}.PG.csv", params.config.path_solution),
            &params.config.path_instance,
            params.config.seed,
        )?;
        if let Some(path_bks) = &params.config.path_bks {
            population.export_bks(path_bks, params)?;
        }
    }
    Ok(())
}

fn parse_command_line(args: &[String]) -> Result<Config> {
    // The instance and solution paths are mandatory, flags come in pairs
    if args.len() < 3 || args.len() % 2 != 1 {
        print_usage();
        return Err(Error::CommandLine(format!(
            "incorrect number of arguments: {}",
            args.len() - 1
        )));
    }

    let mut config = Config::new();
    config.path_instance = args[1].clone();
    config.path_solution = args[2].clone();

    // A numeric second argument is a time limit handed over by a controller;
    // the solution then goes next to the instance
    if is_number(&config.path_solution) {
        config.time_limit = Some(args[2].parse().expect("checked numeric"));
        config.path_solution = format!("{}.sol", config.path_instance);
        config.is_dimacs_run = true;
        tracing::info!(
            time_limit = ?config.time_limit,
            "running under a controller time limit"
        );
    }

    let mut i = 3;
    while i + 1 < args.len() {
        let flag = args[i].as_str();
        let value = args[i + 1].as_str();
        let parse_int = |what: &str| -> Result<i64> {
            value
                .parse()
                .map_err(|_| Error::CommandLine(format!("invalid value for {}: {}", what, value)))
        };
        let parse_float = |what: &str| -> Result<f64> {
            value
                .parse()
                .map_err(|_| Error::CommandLine(format!("invalid value for {}: {}", what, value)))
        };
        match flag {
            "-t" => config.time_limit = Some(parse_int("-t")? as u64),
            "-useWallClockTime" => {
                // Elapsed time is always wall clock in this implementation
                let _ = parse_int("-useWallClockTime")?;
            }
            "-it" => config.nb_iter = parse_int("-it")? as usize,
            "-bks" => config.path_bks = Some(value.to_string()),
            "-seed" => config.seed = parse_int("-seed")? as u32,
            "-veh" => config.nb_vehicles = Some(parse_int("-veh")?),
            "-isDimacsRun" => config.is_dimacs_run = parse_int("-isDimacsRun")? != 0,
            "-useDynamicParameters" => {
                config.use_dynamic_parameters = parse_int("-useDynamicParameters")? != 0
            }
            "-logpool" => config.log_pool_interval = parse_int("-logpool")? as usize,
            "-nbGranular" => config.nb_granular = parse_int("-nbGranular")? as usize,
            "-initialSolution" => config.initial_solution = Some(value.to_string()),
            "-fractionGeneratedNearest" => {
                config.fraction_generated_nearest = parse_float("-fractionGeneratedNearest")?
            }
            "-fractionGeneratedFurthest" => {
                config.fraction_generated_furthest = parse_float("-fractionGeneratedFurthest")?
            }
            "-fractionGeneratedSweep" => {
                config.fraction_generated_sweep = parse_float("-fractionGeneratedSweep")?
            }
            "-fractionGeneratedRandomly" => {
                config.fraction_generated_randomly = parse_float("-fractionGeneratedRandomly")?
            }
            "-minSweepFillPercentage" => {
                config.min_sweep_fill_percentage = parse_int("-minSweepFillPercentage")?
            }
            "-maxToleratedCapacityViolation" => {
                config.max_tolerated_capacity_violation =
                    parse_int("-maxToleratedCapacityViolation")?
            }
            "-maxToleratedTimeWarp" => {
                config.max_tolerated_time_warp = parse_int("-maxToleratedTimeWarp")?
            }
            "-initialTimeWarpPenalty" => {
                config.initial_time_warp_penalty = parse_float("-initialTimeWarpPenalty")?
            }
            "-penaltyBooster" => config.penalty_booster = parse_float("-penaltyBooster")?,
            "-useSymmetricCorrelatedVertices" => {
                config.use_symmetric_correlated_vertices =
                    parse_int("-useSymmetricCorrelatedVertices")? != 0
            }
            "-doRepeatUntilTimeLimit" => {
                config.do_repeat_until_time_limit = parse_int("-doRepeatUntilTimeLimit")? != 0
            }
            "-minimumPopulationSize" => {
                config.minimum_population_size = parse_int("-minimumPopulationSize")? as usize
            }
            "-generationSize" => config.generation_size = parse_int("-generationSize")? as usize,
            "-nbElite" => config.nb_elite = parse_int("-nbElite")? as usize,
            "-nbClose" => config.nb_close = parse_int("-nbClose")? as usize,
            "-targetFeasible" => config.target_feasible = parse_float("-targetFeasible")?,
            "-repairProbability" => {
                config.repair_probability = parse_int("-repairProbability")? as u32
            }
            "-growNbGranularAfterNonImprovementIterations" => {
                config.grow_nb_granular_after_non_improvement_iterations =
                    parse_int("-growNbGranularAfterNonImprovementIterations")? as usize
            }
            "-growNbGranularAfterIterations" => {
                config.grow_nb_granular_after_iterations =
                    parse_int("-growNbGranularAfterIterations")? as usize
            }
            "-growNbGranularSize" => {
                config.grow_nb_granular_size = parse_int("-growNbGranularSize")? as usize
            }
            "-growPopulationAfterNonImprovementIterations" => {
                config.grow_population_after_non_improvement_iterations =
                    parse_int("-growPopulationAfterNonImprovementIterations")? as usize
            }
            "-growPopulationAfterIterations" => {
                config.grow_population_after_iterations =
                    parse_int("-growPopulationAfterIterations")? as usize
            }
            "-growPopulationSize" => {
                config.grow_population_size = parse_int("-growPopulationSize")? as usize
            }
            "-intensificationProbabilityLS" => {
                config.intensification_probability_ls =
                    parse_int("-intensificationProbabilityLS")? as u32
            }
            "-diversityWeight" => config.diversity_weight = parse_float("-diversityWeight")?,
            "-useSwapStarTW" => config.use_swap_star_tw = parse_int("-useSwapStarTW")? != 0,
            "-skipSwapStarDist" => {
                config.skip_swap_star_dist = parse_int("-skipSwapStarDist")? != 0
            }
            "-circleSectorOverlapToleranceDegrees" => {
                config.circle_sector_overlap_tolerance_degrees =
                    parse_int("-circleSectorOverlapToleranceDegrees")?
            }
            "-minCircleSectorSizeDegrees" => {
                config.min_circle_sector_size_degrees = parse_int("-minCircleSectorSizeDegrees")?
            }
            _ => {
                print_usage();
                return Err(Error::CommandLine(format!("argument not recognized: {}", flag)));
            }
        }
        i += 2;
    }

    Ok(config)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn print_usage() {
    eprintln!(
        "Usage: hgs-vrptw instancePath solPath [-it nbIter] [-t timeLimit] [-bks bksPath] \
         [-seed seed] [-veh nbVehicles] [-logpool interval]\n\
         \n\
         [-it <int>] maximum number of iterations without improvement, default 20000\n\
         [-t <int>] wall clock time limit in seconds, default unlimited\n\
         [-bks <path>] best known solution file, overwritten on improvement\n\
         [-seed <int>] random seed, default 0\n\
         [-veh <int>] fleet size; -1 for one vehicle per client, default derived from the instance\n\
         [-logpool <int>] iterations between population pool dumps, default 0 (off)\n\
         \n\
         Additional arguments:\n\
         [-isDimacsRun <0|1>] print every incumbent on stdout, default 0\n\
         [-useDynamicParameters <0|1>] adapt parameters to the instance shape, default 0\n\
         [-nbGranular <int>] granular neighborhood size, default 40\n\
         [-initialSolution <string>] giant tour with 0 separating the routes\n\
         [-fractionGeneratedNearest <float>] share of nearest-constructed individuals, default 0.05\n\
         [-fractionGeneratedFurthest <float>] share of furthest-constructed individuals, default 0.05\n\
         [-fractionGeneratedSweep <float>] share of sweep-constructed individuals, default 0.05\n\
         [-fractionGeneratedRandomly <float>] share of random individuals, default 0.85\n\
         [-minSweepFillPercentage <int>] sweep route fill percentage, default 60\n\
         [-maxToleratedCapacityViolation <int>] construction capacity tolerance, default 50\n\
         [-maxToleratedTimeWarp <int>] construction time warp tolerance, default 100\n\
         [-initialTimeWarpPenalty <float>] starting time warp penalty, default 1.0\n\
         [-penaltyBooster <float>] penalty multiplier when no individual is feasible, default 2.0\n\
         [-useSymmetricCorrelatedVertices <0|1>] symmetric neighbor relation, default 0\n\
         [-doRepeatUntilTimeLimit <0|1>] restart when iterations run out before the time limit, default 1\n\
         [-minimumPopulationSize <int>] default 25\n\
         [-generationSize <int>] insertions before survivor selection, default 40\n\
         [-nbElite <int>] elite individuals, default 4\n\
         [-nbClose <int>] closest individuals in the diversity measure, default 5\n\
         [-targetFeasible <float>] target share of feasible individuals, default 0.2\n\
         [-repairProbability <int>] repair probability (0-100), default 50\n\
         [-growNbGranularAfterNonImprovementIterations <int>] default 5000\n\
         [-growNbGranularAfterIterations <int>] default 0\n\
         [-growNbGranularSize <int>] default 0\n\
         [-growPopulationAfterNonImprovementIterations <int>] default 5000\n\
         [-growPopulationAfterIterations <int>] default 0\n\
         [-growPopulationSize <int>] default 0\n\
         [-intensificationProbabilityLS <int>] SWAP* phase probability (0-100), default 15\n\
         [-diversityWeight <float>] diversity weight; 0 means 1 - nbElite/|P|, default 0\n\
         [-useSwapStarTW <0|1>] time-window-aware SWAP*, default 1\n\
         [-skipSwapStarDist <0|1>] skip distance-based SWAP*, default 0\n\
         [-circleSectorOverlapToleranceDegrees <int>] default 0\n\
         [-minCircleSectorSizeDegrees <int>] default 15"
    );
}
