use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use policy_table::{
    FirstActionPolicy, Game, KuhnPoker, MatchingPennies, PlayoutSummary, Policy, PolicyTable,
    RenderOptions, SparsePolicy, UniformRandomPolicy, describe_sparse, render_table_with_options,
    simulate,
};

const DEFAULT_SEED: u64 = 0x7AB1_E5EE_D000_0001;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GameKind {
    Kuhn,
    Pennies,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PolicyKind {
    Uniform,
    First,
    Noisy,
}

#[derive(Parser, Debug)]
#[command(
    name = "tabular",
    about = "Build, perturb and export tabular policies for the bundled games",
    version
)]
struct Args {
    /// Game to build the table for.
    #[arg(long, value_enum, default_value_t = GameKind::Kuhn)]
    game: GameKind,

    /// Restrict the table to these players (all players when omitted).
    #[arg(long = "player")]
    players: Vec<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table, optionally after loading a sparse policy into it.
    Summary {
        /// Sparse policy written by `export`.
        #[arg(long)]
        sparse: Option<PathBuf>,
        /// Digits printed per probability.
        #[arg(long, default_value_t = 3)]
        precision: usize,
        /// Also print captured feature tensors.
        #[arg(long)]
        show_features: bool,
    },
    /// Print a noise-perturbed copy of the uniform table.
    Noise {
        #[arg(long, default_value_t = 0.5)]
        alpha: f64,
        #[arg(long, default_value_t = 1.0)]
        beta: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Play sampled games and report mean returns.
    Playout {
        #[arg(short = 'g', long, default_value_t = 1000)]
        games: usize,
        #[arg(long, value_enum, default_value_t = PolicyKind::Uniform)]
        policy: PolicyKind,
        /// Mixing weight used by the noisy policy.
        #[arg(long, default_value_t = 1.0)]
        alpha: f64,
        /// Noise temperature used by the noisy policy.
        #[arg(long, default_value_t = 2.0)]
        beta: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Write the (optionally perturbed) table as a sparse policy file.
    Export {
        #[arg(short = 'o', long = "out")]
        out: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        alpha: f64,
        #[arg(long, default_value_t = 0.0)]
        beta: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let result = match args.game {
        GameKind::Kuhn => run(&KuhnPoker, &args),
        GameKind::Pennies => run(&MatchingPennies, &args),
    };
    if let Err(err) = result {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run<G: Game>(game: &G, args: &Args) -> Result<(), Box<dyn Error>> {
    let mut table = PolicyTable::builder(game)
        .with_players(args.players.clone())
        .build()?;
    info!("{}: {} rows", game.name(), table.num_rows());

    match &args.command {
        Command::Summary {
            sparse,
            precision,
            show_features,
        } => {
            if let Some(path) = sparse {
                let loaded = load_sparse(path)?;
                table.apply_sparse(&loaded)?;
                info!("applied {} rows from {}", loaded.len(), display_path(path));
            }
            let options = RenderOptions {
                precision: *precision,
                show_illegal: false,
                show_features: *show_features,
            };
            print!("{}", render_table_with_options(&table, options));
        }
        Command::Noise { alpha, beta, seed } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            let noisy = table.with_noise(*alpha, *beta, &mut rng)?;
            print!("{}", render_table_with_options(&noisy, RenderOptions::default()));
        }
        Command::Playout {
            games,
            policy,
            alpha,
            beta,
            seed,
        } => {
            let summary = run_playout(game, &table, *policy, (*alpha, *beta), *games, *seed)?;
            println!("Played {} games of {}.", summary.games, game.name());
            for (player, value) in summary.mean_returns.iter().enumerate() {
                println!("  Player {player}: mean return {value:+.4}");
            }
            println!("  Mean history length: {:.2}", summary.mean_length);
        }
        Command::Export {
            out,
            alpha,
            beta,
            seed,
        } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            let exported = table.with_noise(*alpha, *beta, &mut rng)?.to_sparse();
            let bytes = bincode::serde::encode_to_vec(&exported, bincode::config::standard())?;
            fs::write(out, bytes)?;
            print!("{}", describe_sparse(&exported));
            println!("Sparse policy saved -> {}", display_path(out));
        }
    }
    Ok(())
}

/// Only the noisy policy perturbs the table, so the other policies neither
/// validate the noise parameters nor draw from the RNG for it.
fn run_playout<G: Game>(
    game: &G,
    table: &PolicyTable<G::State>,
    policy: PolicyKind,
    (alpha, beta): (f64, f64),
    games: usize,
    seed: u64,
) -> Result<PlayoutSummary, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let noisy;
    let chosen: &dyn Policy<G::State> = match policy {
        PolicyKind::Uniform => &UniformRandomPolicy,
        PolicyKind::First => &FirstActionPolicy,
        PolicyKind::Noisy => {
            noisy = table.with_noise(alpha, beta, &mut rng)?;
            &noisy
        }
    };
    Ok(simulate(game, &[chosen], games, &mut rng)?)
}

fn load_sparse(path: &Path) -> Result<SparsePolicy, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    let (sparse, _): (SparsePolicy, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
    Ok(sparse)
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_table::{InvalidArgument, PolicyError};

    #[test]
    fn plain_policies_ignore_noise_settings() -> Result<(), Box<dyn Error>> {
        let table = PolicyTable::new(&KuhnPoker)?;
        let summary = run_playout(&KuhnPoker, &table, PolicyKind::First, (5.0, 2.0), 10, 1)?;
        assert_eq!(summary.games, 10);
        assert_eq!(summary.mean_length, 4.0);
        Ok(())
    }

    #[test]
    fn uniform_playouts_match_a_plain_simulation() -> Result<(), Box<dyn Error>> {
        let table = PolicyTable::new(&KuhnPoker)?;
        let summary = run_playout(&KuhnPoker, &table, PolicyKind::Uniform, (1.0, 2.0), 20, 9)?;
        let uniform: &dyn Policy<policy_table::games::KuhnState> = &UniformRandomPolicy;
        let direct = simulate(&KuhnPoker, &[uniform], 20, &mut StdRng::seed_from_u64(9))?;
        assert_eq!(summary, direct);
        Ok(())
    }

    #[test]
    fn noisy_playouts_validate_the_mixing_weight() -> Result<(), Box<dyn Error>> {
        let table = PolicyTable::new(&KuhnPoker)?;
        let err = run_playout(&KuhnPoker, &table, PolicyKind::Noisy, (5.0, 2.0), 10, 1)
            .expect_err("alpha above one");
        let err = err.downcast::<PolicyError>().map_err(|_| "unexpected error type")?;
        assert_eq!(*err, PolicyError::InvalidArgument(InvalidArgument::MixingWeight(5.0)));
        Ok(())
    }
}
