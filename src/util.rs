use std::fs;

use clap::ArgMatches;
use serde_json::Value;

use crate::color::{checker, CheckerResult, Coloring, ConflictGraph};
use crate::search::tabucol::{RepExhaustion, TabucolConfig};

/** reads the command line parameters shared by the solver programs and
returns (instance name, instance, nb colors, search configuration). */
pub fn read_params(main_args: &ArgMatches) -> (String, ConflictGraph, usize, TabucolConfig) {
    let inst_filename = main_args.value_of("instance").unwrap();
    let nb_colors: usize = main_args.value_of("colors").unwrap().parse()
        .expect("unable to parse the number of colors");
    let mut config = TabucolConfig::default();
    if let Some(v) = main_args.value_of("tabu_size") {
        config = config.with_tabu_size(v.parse().expect("unable to parse the tabu size"));
    }
    if let Some(v) = main_args.value_of("reps") {
        config = config.with_reps(v.parse().expect("unable to parse the rep count"));
    }
    if let Some(v) = main_args.value_of("max_iterations") {
        config = config.with_max_iterations(
            v.parse().expect("unable to parse the iteration budget")
        );
    }
    if let Some(v) = main_args.value_of("seed") {
        config = config.with_seed(v.parse().expect("unable to parse the seed"));
    }
    if main_args.is_present("keep_current") {
        config = config.with_rep_exhaustion(RepExhaustion::KeepCurrent);
    }
    // read instance file
    let instance = ConflictGraph::from_file(inst_filename)
        .unwrap_or_else(|e| panic!("invalid instance {}: {}", inst_filename, e));
    instance.display_statistics();
    println!("=======================");
    (inst_filename.to_string(), instance, nb_colors, config)
}

/// exports performance statistics to a JSON file
pub fn export_stats(stats: &Value, perf_file: Option<&str>) {
    match perf_file {
        None => {},
        Some(filename) => {
            let serialized = serde_json::to_string(stats)
                .expect("export_stats: unable to serialize the statistics");
            fs::write(filename, serialized)
                .unwrap_or_else(|why| panic!("couldn't write {}: {}", filename, why));
            println!("perfs written in: {}", filename);
        }
    }
}

/// exports a coloring to a file (one line per color class), checking it first
pub fn export_solution(
    instance: &ConflictGraph,
    nb_colors: usize,
    coloring: &Coloring,
    sol_file: Option<&str>,
) {
    match sol_file {
        None => {},
        Some(filename) => {
            let checker_result = checker(instance, nb_colors, coloring);
            match checker_result {
                CheckerResult::Ok(_) => {},
                _ => { println!("invalid solution (reason: {:?})", checker_result) }
            };
            fs::write(filename, instance.coloring_to_string(nb_colors, coloring))
                .unwrap_or_else(|why| panic!("couldn't write {}: {}", filename, why));
            println!("solution written in: {}", filename);
        }
    }
}
