mod reader;
mod pb;

#[macro_use]
extern crate clap;

use std::fmt::Write;
use std::process;

use clap::{Arg, App, ArgMatches, SubCommand};

use birdwalk::batch::BatchIterator;
use birdwalk::utils;
use birdwalk::walker::{Config, HopMode, QueryItem, Walk, Walker};

fn load_walker(args: &ArgMatches<'_>) -> Result<Walker, String> {
    let config = Config {
        depth: value_t!(args, "depth", usize).unwrap_or(1),
        draws: value_t!(args, "draws", usize).unwrap_or(1000),
        mode: if args.is_present("restart-from-seeds") {
            HopMode::FromSeeds
        } else {
            HopMode::Chained
        }
    };

    let weights_path = args.value_of("weights").expect("Required");
    let adjacency_path = args.value_of("adjacency").expect("Required");
    let item_weights = reader::read_weights(weights_path)
        .map_err(|e| format!("{}: {}", weights_path, e))?;
    let users_to_items = reader::read_adjacency(adjacency_path)
        .map_err(|e| format!("{}: {}", adjacency_path, e))?;

    eprintln!("Number of Items: {}", item_weights.len());
    eprintln!("Number of Users: {}", users_to_items.len());
    eprintln!("Number of Interactions: {}", users_to_items.iter().map(|v| v.len()).sum::<usize>());

    Walker::new(config, item_weights, users_to_items).map_err(|e| {
        match std::error::Error::source(&e) {
            Some(cause) => format!("cannot build walker: {}: {}", e, cause),
            None        => format!("cannot build walker: {}", e)
        }
    })
}

// Runs every query through the walker and hands each successful walk to `emit`
fn run_queries<F: FnMut(usize, &Walk)>(
    walker: &Walker,
    queries: &[Vec<QueryItem>],
    args: &ArgMatches<'_>,
    mut emit: F
) {
    let seed = value_t!(args, "seed", u64).unwrap_or(2019);
    let buffer_size = value_t!(args, "buffer-size", usize).unwrap_or(10000);

    let pb = pb::query_pb(queries.len() as u64);
    let mut failed = 0usize;
    for (i, result) in BatchIterator::new(walker, queries, buffer_size, seed).enumerate() {
        match result {
            Ok(walk) => emit(i, &walk),
            Err(e)   => {
                failed += 1;
                pb.println(format!("Query {} skipped: {}", i, e));
            }
        }
        pb.inc(1);
    }
    pb.finish();

    eprintln!("Processed {} queries, {} skipped", queries.len(), failed);
}

fn walk(walker: &Walker, queries: &[Vec<QueryItem>], args: &ArgMatches<'_>) {
    let mut s = String::new();
    run_queries(walker, queries, args, |i, walk| {
        write!(s, "{}:", i).expect("Should never fail!");
        for (item, referrer) in walk.iter() {
            write!(s, " {}/{}", item, referrer).expect("Should never fail!");
        }
        println!("{}", s);
        s.clear();
    });
}

fn recommend(walker: &Walker, queries: &[Vec<QueryItem>], args: &ArgMatches<'_>, sub_args: &ArgMatches<'_>) {
    let max_terms = value_t!(sub_args, "max-terms", usize).unwrap_or(10);
    let mut s = String::new();
    run_queries(walker, queries, args, |i, walk| {
        write!(s, "{}:", i).expect("Should never fail!");
        for (item, score) in utils::top_items(&walk.items, max_terms) {
            write!(s, " {}:{}", item, score).expect("Should never fail!");
        }
        println!("{}", s);
        s.clear();
    });
}

fn parse<'a>() -> ArgMatches<'a> {
    App::new("birdwalk")
        .version("0.1.0")
        .author("Andrew S. <refefer@gmail.com>")
        .about("Recommends items through random walks on a user-item graph")
        .arg(Arg::with_name("weights")
             .long("weights")
             .takes_value(true)
             .required(true)
             .help("Path to item weights, one per line"))
        .arg(Arg::with_name("adjacency")
             .long("adjacency")
             .takes_value(true)
             .required(true)
             .help("Path to user collections, one user per line"))
        .arg(Arg::with_name("queries")
             .required(true)
             .help("Path to queries, one per line as item[:weight] tokens"))
        .arg(Arg::with_name("depth")
             .long("depth")
             .takes_value(true)
             .help("Number of hops per walk.  Default is 1"))
        .arg(Arg::with_name("draws")
             .long("draws")
             .takes_value(true)
             .help("Number of walks per query.  Default is 1000"))
        .arg(Arg::with_name("restart-from-seeds")
             .long("restart-from-seeds")
             .help("If provided, every hop starts again from the seed items instead of the previous hop"))
        .arg(Arg::with_name("seed")
             .long("seed")
             .takes_value(true)
             .help("Random seed.  Default is 2019"))
        .arg(Arg::with_name("buffer-size")
             .long("buffer-size")
             .takes_value(true)
             .help("Number of queries to process in parallel.  Default is 10000"))

        .subcommand(SubCommand::with_name("walk")
            .about("Emits the visited item/referrer pairs of each query"))

        .subcommand(SubCommand::with_name("recommend")
            .about("Emits the most visited items of each query")
            .arg(Arg::with_name("max-terms")
                 .long("max-terms")
                 .takes_value(true)
                 .help("Number of items to emit per query.  Default is 10")))

        .get_matches()
}

fn main() {
    let args = parse();

    let walker = match load_walker(&args) {
        Ok(walker) => walker,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let queries_path = args.value_of("queries").expect("Required");
    let queries = match reader::read_queries(queries_path) {
        Ok(queries) => queries,
        Err(e) => {
            eprintln!("{}: {}", queries_path, e);
            process::exit(1);
        }
    };
    eprintln!("Read in {} queries", queries.len());

    if let Some(ref sub_args) = args.subcommand_matches("recommend") {
        recommend(&walker, &queries, &args, sub_args);
    } else {
        walk(&walker, &queries, &args);
    }
}
