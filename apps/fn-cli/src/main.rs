use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use fn_nodes::TickContext;
use fn_project::{NetworkFile, ProjectError, file_to_network, load_path, network_to_file, save_path};
use fn_sim::{EngineError, Network, SharedNetwork, SimOptions, TickLoop, run_ticks_with};

mod demo;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Unknown demo: {0} (expected one of: {})", demo::NAMES.join(", "))]
    UnknownDemo(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fn-cli")]
#[command(about = "flownet CLI - flow network tick simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a built-in demo network to a file
    Demo {
        /// Demo name (chain, merge, plant)
        name: String,
        /// Output path; extension selects the format (.yaml, .json, else binary)
        output: PathBuf,
    },
    /// Validate a network file
    Validate {
        /// Path to the network file
        path: PathBuf,
    },
    /// Print nodes, parameters, port values and links
    Show {
        /// Path to the network file
        path: PathBuf,
    },
    /// Tick a network with a fixed time step
    Run {
        /// Path to the network file
        path: PathBuf,
        /// Number of ticks
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        /// Elapsed time per tick in seconds
        #[arg(long, default_value_t = 0.1)]
        dt: f64,
        /// Save the network state after the run
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Tick a network in real time on a background thread
    Live {
        /// Path to the network file
        path: PathBuf,
        /// Interval between ticks in milliseconds
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
        /// How long to run in seconds
        #[arg(long, default_value_t = 5.0)]
        seconds: f64,
    },
    /// Convert a binary network file to YAML or JSON
    Export {
        /// Binary network file
        input: PathBuf,
        /// Output path (.yaml, .yml or .json); prints YAML to stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert a YAML or JSON network file to binary
    Import {
        /// YAML or JSON network file
        input: PathBuf,
        /// Binary output path
        output: PathBuf,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { name, output } => cmd_demo(&name, &output),
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Show { path } => cmd_show(&path),
        Commands::Run {
            path,
            ticks,
            dt,
            save,
        } => cmd_run(&path, ticks, dt, save.as_deref()),
        Commands::Live {
            path,
            interval_ms,
            seconds,
        } => cmd_live(&path, Duration::from_millis(interval_ms), seconds),
        Commands::Export { input, output } => cmd_export(&input, output.as_deref()),
        Commands::Import { input, output } => cmd_import(&input, &output),
    }
}

fn load_network(path: &Path) -> CliResult<(NetworkFile, Network)> {
    let file = load_path(path)?;
    let network = file_to_network(&file)?;
    info!(
        path = %path.display(),
        version = file.version,
        nodes = network.len(),
        "loaded network"
    );
    Ok((file, network))
}

fn cmd_demo(name: &str, output: &Path) -> CliResult<()> {
    let network = demo::build(name).ok_or_else(|| CliError::UnknownDemo(name.to_string()))??;
    let file = network_to_file(&network, name)?;
    save_path(output, &file)?;
    println!(
        "✓ Wrote demo '{}' ({} nodes) to {}",
        name,
        network.len(),
        output.display()
    );
    Ok(())
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    println!("Validating network: {}", path.display());
    let (_, network) = load_network(path)?;
    network.validate()?;
    println!("✓ Network is valid");
    Ok(())
}

fn cmd_show(path: &Path) -> CliResult<()> {
    let (file, network) = load_network(path)?;
    println!("Network '{}' (version {})", file.name, file.version);
    print_network(&network);
    Ok(())
}

fn print_network(network: &Network) {
    println!("Nodes in tick order:");
    for (index, node) in network.nodes().enumerate() {
        let params = node
            .parameters()
            .into_iter()
            .skip(1)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {:>2}. {} [{}] {}", index, node.name(), node.type_name(), params);

        for port in node.flow_ports() {
            if let Some(p) = network.flow_port(port) {
                let peer = network
                    .flow_peer(port)
                    .and_then(|peer| network.flow_port(peer))
                    .and_then(|peer| {
                        network
                            .node(peer.node)
                            .map(|n| format!("  <-> {}.{}", n.name(), peer.label))
                    })
                    .unwrap_or_default();
                println!(
                    "        {:<4} quantity={:.4} rate={:.4}{}",
                    p.label, p.quantity, p.rate, peer
                );
            }
        }
        if let Some(value) = node.logic_in().and_then(|p| network.logic_value(p)) {
            println!("        logic in  = {:.4}", value);
        }
        if let Some(value) = node.logic_out().and_then(|p| network.logic_value(p)) {
            println!("        logic out = {:.4}", value);
        }
    }

    if !network.logic_links().is_empty() {
        println!("Logic links:");
        for link in network.logic_links() {
            let name = |port| {
                network
                    .logic_port(port)
                    .and_then(|p| network.node(p.node))
                    .map(|n| n.name().to_string())
                    .unwrap_or_else(|| "?".to_string())
            };
            println!("  {} -> {}", name(link.output), name(link.input));
        }
    }
}

fn cmd_run(path: &Path, ticks: usize, dt: f64, save: Option<&Path>) -> CliResult<()> {
    let (file, mut network) = load_network(path)?;
    println!("Running '{}' for {} ticks", file.name, ticks);
    println!("  dt = {:.3} s", dt);

    let opts = SimOptions {
        dt,
        ticks,
        record_every: ticks.max(1),
    };
    let started = Instant::now();
    let mut last_emit = Instant::now();
    let record = run_ticks_with(&mut network, &opts, |step, ctx, _report| {
        if last_emit.elapsed().as_millis() >= 100 || step == ticks {
            render_progress(step, ticks, ctx);
            last_emit = Instant::now();
        }
    })?;
    clear_progress_line();

    println!(
        "✓ Completed {} ticks in {:.3}s",
        ticks,
        started.elapsed().as_secs_f64()
    );
    println!("  Events: {}", record.events);
    println!("  Node errors: {}", record.errors);
    print_network(&network);

    if let Some(out) = save {
        save_path(out, &network_to_file(&network, &file.name)?)?;
        println!("✓ Saved state to {}", out.display());
    }
    Ok(())
}

fn cmd_live(path: &Path, interval: Duration, seconds: f64) -> CliResult<()> {
    let (file, network) = load_network(path)?;
    println!(
        "Ticking '{}' every {} ms for {:.1} s",
        file.name,
        interval.as_millis(),
        seconds
    );

    let shared = SharedNetwork::new(network);
    let ticker = TickLoop::spawn(shared.clone(), interval);
    let deadline = Instant::now() + Duration::from_secs_f64(seconds.max(0.0));
    let mut errors = 0usize;
    while Instant::now() < deadline {
        if let Ok(report) = ticker.reports.recv_timeout(Duration::from_millis(50)) {
            errors += report.errors.len();
        }
    }
    let ticks = ticker.stop();
    if errors > 0 {
        warn!(ticks, errors, "live run reported node errors");
    }

    println!("✓ Ran {} ticks ({} node errors)", ticks, errors);
    let network = shared.snapshot()?;
    print_network(&network);
    Ok(())
}

fn cmd_export(input: &Path, output: Option<&Path>) -> CliResult<()> {
    let file = load_path(input)?;
    match output {
        Some(out) => {
            save_path(out, &file)?;
            println!("✓ Exported {} to {}", input.display(), out.display());
        }
        None => print!("{}", fn_project::to_yaml(&file)?),
    }
    Ok(())
}

fn cmd_import(input: &Path, output: &Path) -> CliResult<()> {
    let file = load_path(input)?;
    file_to_network(&file)?;
    save_path(output, &file)?;
    println!(
        "✓ Imported {} ({} nodes) to {}",
        input.display(),
        file.nodes.len(),
        output.display()
    );
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_progress(step: usize, total: usize, ctx: &TickContext) {
    let width = 28usize;
    let fraction = if total == 0 {
        1.0
    } else {
        step as f64 / total as f64
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    print!(
        "\r[{}] {:>6.2}%  tick={}/{}  t={:.3}s",
        bar,
        fraction * 100.0,
        step,
        total,
        ctx.time
    );
    let _ = io::stdout().flush();
}
