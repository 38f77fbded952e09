use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use paging_sim::{
    Clock, Config, Fifo, Kernel, Lru, PageReplacementPolicy, PolicyKind, Random, Reference,
    memory::MemoryStats,
    report,
    trace::read_trace,
    workload::{Workload, WorkloadConfig},
};
use rand::Rng;

#[derive(Parser)]
#[command(name = "paging-sim")]
#[command(about = "Simulate demand paging under different page replacement policies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a reference trace (`<R|W> <address>` per line)
    Run {
        /// Trace file, or `-` for stdin
        trace: PathBuf,

        #[command(flatten)]
        machine: MachineArgs,
    },

    /// Generate a working-set workload and replay it
    Synthetic {
        /// Number of references to generate
        #[arg(short, long, default_value = "10000")]
        references: usize,

        /// Pages in the working set
        #[arg(long, default_value = "8")]
        working_set: usize,

        /// References between working set changes
        #[arg(long, default_value = "1024")]
        working_set_lifespan: usize,

        /// Fraction of references that are reads
        #[arg(long, default_value = "0.8")]
        read_rate: f64,

        #[command(flatten)]
        machine: MachineArgs,
    },
}

#[derive(Args)]
struct MachineArgs {
    /// Page and frame size in bytes
    #[arg(long, default_value = "4096")]
    page_size: u32,

    /// Pages in the virtual address space
    #[arg(long, default_value = "64")]
    pages: u32,

    /// Physical frames
    #[arg(long, default_value = "8")]
    frames: u32,

    /// fifo, random, second-chance, lru, or all
    #[arg(short, long, default_value = "all")]
    policy: String,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Print every fault, eviction and translation
    #[arg(short, long)]
    detailed: bool,

    /// Print the page and frame tables after the run
    #[arg(long)]
    tables: bool,

    /// Check the page/frame table invariants after every reference
    #[arg(long)]
    audit: bool,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { trace, machine } => cmd_run(&trace, &machine),
        Commands::Synthetic {
            references,
            working_set,
            working_set_lifespan,
            read_rate,
            machine,
        } => cmd_synthetic(
            references,
            working_set,
            working_set_lifespan,
            read_rate,
            &machine,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_run(trace: &Path, machine: &MachineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let references = if trace.as_os_str() == "-" {
        read_trace(io::stdin().lock())?
    } else {
        read_trace(BufReader::new(File::open(trace)?))?
    };

    println!("Trace:        {}", trace.display());
    simulate(&references, machine)
}

fn cmd_synthetic(
    references: usize,
    working_set: usize,
    working_set_lifespan: usize,
    read_rate: f64,
    machine: &MachineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&read_rate) {
        return Err(format!("read rate must be between 0 and 1, got {read_rate}").into());
    }

    let config = WorkloadConfig {
        page_size: machine.page_size,
        page_count: machine.pages as usize,
        working_set_size: working_set,
        working_set_lifespan,
        lifespan: references,
        read_rate,
    };
    let seed = machine.seed.unwrap_or_else(|| rand::rng().random());
    let trace: Vec<Reference> = Workload::new(config, seed).collect();

    println!("Workload:     {references} references, working set {working_set}, seed {seed}");
    simulate(
        &trace,
        &MachineArgs {
            seed: Some(seed),
            policy: machine.policy.clone(),
            ..*machine
        },
    )
}

fn simulate(
    references: &[Reference],
    machine: &MachineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let kinds = if machine.policy.eq_ignore_ascii_case("all") {
        PolicyKind::ALL.to_vec()
    } else {
        let kind = PolicyKind::parse(&machine.policy)
            .ok_or_else(|| format!("Unknown policy: {}", machine.policy))?;
        vec![kind]
    };

    let config = Config::new(machine.page_size, machine.pages, machine.frames)
        .with_detailed(machine.detailed);
    config.validate()?;

    print_header(&mut io::stdout().lock(), &config, references.len())?;

    let mut results = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let stats = match kind {
            PolicyKind::Fifo => run_simulation(Fifo::new(), kind, config, references, machine)?,
            PolicyKind::Random => {
                let policy = match machine.seed {
                    Some(seed) => Random::with_seed(seed),
                    None => Random::from_os_rng(),
                };
                run_simulation(policy, kind, config, references, machine)?
            }
            PolicyKind::SecondChance => {
                run_simulation(Clock::new(), kind, config, references, machine)?
            }
            PolicyKind::Lru => run_simulation(Lru::new(), kind, config, references, machine)?,
        };
        results.push((kind, stats));
    }

    if results.len() > 1 {
        print_comparison(&results)?;
    }
    Ok(())
}

fn run_simulation<P: PageReplacementPolicy>(
    policy: P,
    kind: PolicyKind,
    config: Config,
    references: &[Reference],
    machine: &MachineArgs,
) -> Result<MemoryStats, Box<dyn std::error::Error>> {
    println!("Running `{}` policy simulation...", kind);

    let mut kernel = Kernel::new(config, policy)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (idx, reference) in references.iter().enumerate() {
        kernel.translate(reference.address, reference.operation);

        for event in kernel.drain_events() {
            writeln!(out, "{event}")?;
        }
        if machine.audit {
            kernel
                .audit()
                .map_err(|e| format!("reference {}: {e}", idx + 1))?;
        }
    }

    writeln!(out)?;
    if machine.tables {
        report::write_page_table(&mut out, &kernel)?;
        writeln!(out)?;
        report::write_frame_table(&mut out, &kernel)?;
        writeln!(out)?;
    }
    report::write_replacement_report(&mut out, &kernel)?;
    writeln!(out)?;
    report::write_stats(&mut out, kind.as_str(), kernel.stats())?;

    Ok(*kernel.stats())
}

fn print_header<W: Write>(out: &mut W, config: &Config, references: usize) -> io::Result<()> {
    writeln!(out, "# Paging simulation\n")?;
    report::write_row_header(out, "## Conditions")?;
    report::write_row(out, "Page size", &config.page_size)?;
    report::write_row(out, "Pages", &config.num_pages)?;
    report::write_row(out, "Frames", &config.num_frames)?;
    report::write_row(out, "References", &references)?;
    writeln!(out)
}

fn print_comparison(results: &[(PolicyKind, MemoryStats)]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "## Comparison")?;
    writeln!(
        out,
        "| {:<20} | {:<12} | {:<12} | {:<12} |",
        "Policy", "Page faults", "Write-backs", "Fault rate"
    )?;
    writeln!(out, "| {:-<20} | {:-<12} | {:-<12} | {:-<12} |", "-", "-", "-", "-")?;
    for (kind, stats) in results {
        writeln!(
            out,
            "| {:<20} | {:<12} | {:<12} | {:<12} |",
            kind.as_str(),
            stats.page_faults,
            stats.write_backs,
            format!("{:.2}%", stats.fault_rate())
        )?;
    }
    Ok(())
}
