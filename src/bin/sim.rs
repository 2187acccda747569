use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use catanatron_engine::board::MapType;
use catanatron_engine::cli::GameStats;
use catanatron_engine::game::{Game, GameConfig};
use catanatron_engine::players::RandomPlayer;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser, Clone)]
#[command(name = "catanatron-sim")]
#[command(about = "Simulate games between random players")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Number of seats (1-4)
    #[arg(long)]
    players: Option<usize>,

    /// Base random seed; game i uses seed + i
    #[arg(long)]
    seed: Option<u64>,

    /// Map type: BASE, MINI, or TOURNAMENT
    #[arg(long)]
    map: Option<MapType>,

    /// Victory points needed to win
    #[arg(long)]
    vps_to_win: Option<u8>,

    /// JSON game config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Silence the summary
    #[arg(long)]
    quiet: bool,

    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(players) = self.players {
            config.num_players = players;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(map) = self.map {
            config.map_type = map;
        }
        if let Some(vps) = self.vps_to_win {
            config.vps_to_win = vps;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    if args.workers == 0 {
        bail!("--workers must be at least 1");
    }
    let config = args.game_config()?;
    info!(?config, games = args.num, workers = args.workers, "starting simulation");

    let stats = run_simulations(&args, &config)?;
    if !args.quiet {
        print_summary(&stats, &config);
    }
    Ok(())
}

fn run_batch(config: &GameConfig, game_indices: Vec<u32>) -> Result<GameStats> {
    let mut stats = GameStats::new();
    for game_idx in game_indices {
        let game_config = GameConfig {
            seed: config.seed + u64::from(game_idx),
            ..config.clone()
        };
        let players: Vec<RandomPlayer> = (0..game_config.num_players)
            .map(|seat| RandomPlayer::seeded(game_config.seed ^ ((seat as u64 + 1) << 32)))
            .collect();

        let start = Instant::now();
        let mut game = Game::new(game_config)?;
        let winner = game.play(&players)?;
        let duration = start.elapsed();
        debug!(
            game = game_idx + 1,
            winner = ?winner,
            turns = game.state.turn,
            ticks = game.state.actions.len(),
            ?duration,
            "game finished"
        );
        stats.record_game(&game, duration);
    }
    Ok(stats)
}

fn run_simulations(args: &Args, config: &GameConfig) -> Result<GameStats> {
    if args.workers == 1 {
        return run_batch(config, (0..args.num).collect());
    }

    let workers = args.workers as u32;
    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let config = config.clone();
            let indices: Vec<u32> = (worker..args.num).step_by(workers as usize).collect();
            thread::spawn(move || run_batch(&config, indices))
        })
        .collect();

    let mut stats = GameStats::new();
    for handle in handles {
        let worker_stats = handle
            .join()
            .map_err(|_| anyhow::anyhow!("simulation worker panicked"))??;
        stats.merge(worker_stats);
    }
    Ok(stats)
}

fn print_summary(stats: &GameStats, config: &GameConfig) {
    println!("\n{}", "=".repeat(60));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(60));

    println!("\nPlayer Summary:");
    println!("{:<15} {:<10} {:<12} {:<12}", "Player", "Wins", "Win Rate", "Avg VP");
    println!("{}", "-".repeat(50));
    for color in &catanatron_engine::types::Color::ORDERED[..config.num_players] {
        println!(
            "{:<15} {:<10} {:<11.1}% {:<12.2}",
            format!("Random ({color})"),
            stats.wins.get(color).copied().unwrap_or(0),
            stats.win_rate(*color),
            stats.avg_victory_points(*color)
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.games);
    println!("  Hit Turn Cap: {}", stats.capped_games);
    println!("  Avg Turns: {:.2}", stats.avg_turns());
    println!("  Avg Ticks: {:.2}", stats.avg_ticks());
    println!("  Avg Duration: {:.2?}", stats.avg_duration());
}
