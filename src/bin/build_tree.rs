//! Dice bidding game tree builder binary.
//!
//! Usage:
//!   cargo run --release --bin build_tree -- [OPTIONS]
//!
//! Set `RUST_LOG=debug` to see per-subtree build logs.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dice_tree::games::dice::{DiceGame, DiceTree};
use dice_tree::tree::stats::format_bytes;
use dice_tree::tree::{
    BuildConfig, Game, GameTreeFactory, InformationSetTagger, LazyTree, Player, TreeError,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build the game tree of the dice bidding game", long_about = None)]
struct Args {
    /// Faces per die
    #[arg(short, long)]
    die_size: Option<u8>,

    /// Configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of nodes
    #[arg(long, conflicts_with = "unbounded")]
    max_nodes: Option<u64>,

    /// Maximum estimated memory, in bytes
    #[arg(long, conflicts_with = "unbounded")]
    max_memory: Option<u64>,

    /// Remove every budget
    #[arg(long)]
    unbounded: bool,

    /// Build chance subtrees in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Worker threads for a parallel build (default: auto)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Tag information sets and print a summary
    #[arg(long)]
    info_sets: bool,

    /// Sample this many random playouts through the lazy tree instead of building
    #[arg(long)]
    playouts: Option<usize>,

    /// Random seed for playouts
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write tree statistics as JSON
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Write the whole tree as JSON
    #[arg(long)]
    tree_json: Option<PathBuf>,
}

impl Args {
    fn build_config(&self) -> Result<BuildConfig, TreeError> {
        let mut config = match &self.config {
            Some(path) => {
                println!("Loading configuration from: {}", path.display());
                BuildConfig::from_json_file(path)?
            }
            None => BuildConfig::default(),
        };

        if let Some(die_size) = self.die_size {
            config = config.with_die_size(die_size);
        }
        if self.unbounded {
            config = config.with_max_nodes(None).with_max_memory(None);
        }
        if self.max_nodes.is_some() {
            config = config.with_max_nodes(self.max_nodes);
        }
        if self.max_memory.is_some() {
            config = config.with_max_memory(self.max_memory);
        }
        if self.parallel {
            config = config.with_parallel(true);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.build_config()?;
    let game = DiceGame::new(config.die_size)?;

    println!("=================================================");
    println!("  Dice Bidding Game Tree (D = {})", config.die_size);
    println!("=================================================");
    println!();

    if let Some(count) = args.playouts {
        return run_playouts(game, count, args.seed);
    }

    let factory = GameTreeFactory::new(game, config);
    let die_size = factory.config().die_size;
    match DiceGame::predicted_node_count(die_size) {
        Some(n) => println!("Predicted nodes: {}", n),
        None => println!("Predicted nodes: more than {}", u64::MAX),
    }
    match factory.config().max_nodes {
        Some(limit) => println!("Node budget:     {}", limit),
        None => println!("Node budget:     unbounded"),
    }
    if let Some(bytes) = factory.config().max_memory_bytes {
        println!("Memory budget:   {}", format_bytes(bytes));
    }
    println!();

    let pb = ProgressBar::new(factory.game().chance_outcomes()?.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} rolls {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let start = Instant::now();
    let tree = factory.build_with_callback(|progress| {
        pb.set_position(progress.completed as u64);
        pb.set_message(format!(
            "{} nodes, {}",
            progress.nodes,
            format_bytes(progress.bytes)
        ));
    });
    pb.finish_and_clear();
    let tree = tree?;
    let elapsed = start.elapsed().as_secs_f64();

    let stats = tree.stats().with_elapsed(elapsed);
    println!("Nodes:          {}", stats.node_count);
    println!("  chance:       {}", stats.chance_nodes);
    println!("  decision:     {}", stats.decision_nodes);
    println!("  terminal:     {}", stats.terminal_nodes);
    println!("Max depth:      {}", stats.max_depth);
    println!("Max branching:  {}", stats.max_branching);
    println!("Memory (est.):  {}", stats.memory_str());
    println!("Build time:     {:.3}s", stats.elapsed_seconds);

    if args.info_sets {
        print_info_sets(factory.game(), &tree)?;
    }

    if let Some(path) = &args.stats_json {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
        println!("Stats written to: {}", path.display());
    }
    if let Some(path) = &args.tree_json {
        fs::write(path, serde_json::to_string(&tree)?)?;
        println!("Tree written to: {}", path.display());
    }

    Ok(())
}

fn print_info_sets(game: &DiceGame, tree: &DiceTree) -> Result<(), TreeError> {
    let partition = InformationSetTagger::new(game).tag(tree)?;
    println!();
    println!("Information sets: {}", partition.len());
    for player in Player::ALL {
        let sets: Vec<_> = partition.for_player(player).collect();
        let largest = sets.iter().map(|s| s.members.len()).max().unwrap_or(0);
        println!("  {}: {} sets, up to {} nodes each", player, sets.len(), largest);
    }
    Ok(())
}

fn run_playouts(
    game: DiceGame,
    count: usize,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let lazy = LazyTree::new(game);

    let mut wins = [0usize; 2];
    let mut total_len = 0usize;
    for _ in 0..count {
        let playout = lazy.playout(&mut rng)?;
        total_len += playout.history.len();
        if let Some(winner) = playout.payoffs.winning_player() {
            wins[winner.index()] += 1;
        }
    }

    println!("Playouts:       {}", count);
    println!("P1 wins:        {}", wins[0]);
    println!("P2 wins:        {}", wins[1]);
    if count > 0 {
        println!(
            "Mean length:    {:.2} actions",
            total_len as f64 / count as f64
        );
    }
    Ok(())
}
