//! Drains nodes of a synthetic datacenter: the VMs of the drained nodes are migrated elsewhere,
//! then the drained nodes are shut down.
//!
//! ```text
//! cargo run --example drain -- --nodes 8 --drained 2 --vms-per-node 3
//! ```
use std::collections::BTreeSet;
use std::io::Write;
use std::time::Duration;

use clap::Parser;
use log::info;
use log::LevelFilter;
use replan_core::statistics::configure_statistic_logging;
use replan_core::statistics::log_statistic_postfix;
use replan_core::statistics::StatisticLogger;
use replan_scheduler::constraint::OptConstraint;
use replan_scheduler::constraint::SatConstraint;
use replan_scheduler::model::Model;
use replan_scheduler::model::ShareableResource;
use replan_scheduler::Instance;
use replan_scheduler::Parameters;
use replan_scheduler::ReconfigurationScheduler;
use replan_scheduler::SchedulerError;

#[derive(Debug, Parser)]
struct Args {
    /// The number of online nodes.
    #[arg(long, default_value_t = 6)]
    nodes: usize,

    /// The number of nodes to drain, starting with the first ones.
    #[arg(long, default_value_t = 1)]
    drained: usize,

    #[arg(long, default_value_t = 2)]
    vms_per_node: usize,

    /// The CPU capacity of every node.
    #[arg(long, default_value_t = 8)]
    capacity: i32,

    /// The CPU consumption of every VM.
    #[arg(long, default_value_t = 2)]
    consumption: i32,

    /// The search budget in milliseconds.
    #[arg(long)]
    time_limit: Option<u64>,

    /// Only move the VMs which are on a drained node.
    #[arg(long)]
    repair: bool,

    /// Log the statistics of the search.
    #[arg(short = 's', long)]
    log_statistics: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    configure_logging(&args);

    match run(&args) {
        Ok(()) => {}
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

fn configure_logging(args: &Args) {
    if args.log_statistics {
        configure_statistic_logging("%% stat:", None, None, None);
    }
    let level_filter = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "% {}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn run(args: &Args) -> Result<(), SchedulerError> {
    let mut model = Model::default();
    let mut cpu = ShareableResource::new("cpu");
    let nodes = (0..args.nodes)
        .map(|_| {
            let node = model.new_node();
            model.mapping_mut().add_online_node(node);
            let _ = cpu.set_capacity(node, args.capacity);
            node
        })
        .collect::<Vec<_>>();
    for &node in nodes.iter() {
        for _ in 0..args.vms_per_node {
            let vm = model.new_vm();
            let _ = model.mapping_mut().add_running_vm(vm, node);
            let _ = cpu.set_consumption(vm, args.consumption);
        }
    }
    model.attach(cpu);

    let drained = nodes
        .iter()
        .copied()
        .take(args.drained)
        .collect::<BTreeSet<_>>();
    info!("Draining {} of {} nodes", drained.len(), nodes.len());
    let instance = Instance::new(model, vec![SatConstraint::Offline(drained)])
        .with_objective(OptConstraint::MinMttr);

    let mut parameters = Parameters::default()
        .with_repair(args.repair)
        .with_verbosity(u8::from(args.verbose));
    if let Some(milliseconds) = args.time_limit {
        parameters = parameters.with_time_limit(Duration::from_millis(milliseconds));
    }

    let result = ReconfigurationScheduler::new(parameters).solve(&instance)?;
    result.statistics.log(StatisticLogger::new(["drain"]));
    log_statistic_postfix();

    match result.plan {
        Some(plan) => {
            println!("{plan}");
            println!("Plan of {} action(s) ending at {}", plan.size(), plan.duration());
        }
        None if result.statistics.completed => println!("No plan exists"),
        None => println!("No plan found within the budget"),
    }
    print!("{}", result.statistics);

    Ok(())
}
