//! CLI entry point: `raftd <nodenum>` starts that node and drops into the REPL.

use std::env;
use std::process;

use raftd::apply::PrintApply;
use raftd::config::{ClusterConfig, Tunables};
use raftd::repl;
use raftd::runtime;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let nodenum = parse_nodenum_arg();
    let config = ClusterConfig::default_five_node();
    let tunables = Tunables::from_env();

    let controller = match runtime::start(nodenum, config, tunables, Box::new(PrintApply::new(nodenum))) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("failed to start node {}: {}", nodenum, err);
            process::exit(1);
        }
    };

    log::info!("node {} started", nodenum);
    repl::run(controller);
}

fn parse_nodenum_arg() -> u64 {
    let arg = match env::args().nth(1) {
        Some(arg) => arg,
        None => {
            eprintln!("usage: raftd <nodenum>");
            process::exit(1);
        }
    };
    match arg.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("usage: raftd <nodenum>; {:?} is not a valid node number", arg);
            process::exit(1);
        }
    }
}
