#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_kernel::prelude::*;
#[cfg(feature = "std")]
use battleship_kernel::init_logging;

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play a simulated session with random shots.
    Autoplay {
        #[arg(long, help = "Ship map as 64 '0'/'1' characters, row-major")]
        map: Option<String>,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 5, help = "Ship cells on a random map")]
        ships: usize,
    },
    /// Read the map from stdin over the serial line, then autoplay.
    Serial {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
async fn play<R: SerialSource + 'static>(
    serial: R,
    rng: &mut SmallRng,
    load_wait: Duration,
) -> anyhow::Result<()> {
    let (peripherals, probes) = sim_board(serial);
    let handle = spawn_kernel(peripherals, KernelConfig::simulated());
    let mut operator = Operator::new(handle, probes.keypad.clone()).with_step_timeout(load_wait);

    operator.start().await?;
    let mut operator = operator.with_step_timeout(Duration::from_secs(5));
    println!("{}\n", probes.surface.text());

    for turn in operator.autoplay(rng).await? {
        println!(
            "Turn {:>2}: ({}, {}) -> {:?}",
            turn.turn,
            turn.target.x(),
            turn.target.y(),
            turn.outcome
        );
    }

    let session = operator.shutdown().await?;
    println!();
    println!("{}", session.ships());
    println!("{}", probes.surface.text());
    println!(
        "Hits: {} of {} in {} turns",
        session.hits().count_ones(),
        session.ships().count_ones(),
        session.turns()
    );
    Ok(())
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Autoplay { map, seed, ships } => {
            let mut rng = seeded_rng(seed);
            let ship_map = match map {
                Some(bits) => parse_map(bits.as_bytes())?,
                None => random_map(&mut rng, ships),
            };
            if ship_map.is_empty() {
                return Err(anyhow::anyhow!("Map has no ship cells"));
            }
            let (sender, serial) = InMemorySerial::pair();
            sender.send(&map_bytes(&ship_map))?;
            play(serial, &mut rng, Duration::from_secs(5)).await?;
        }
        Commands::Serial { seed } => {
            let mut rng = seeded_rng(seed);
            println!("Waiting for 64 map cells on stdin...");
            play(
                StreamSerial::new(tokio::io::stdin()),
                &mut rng,
                Duration::from_secs(300),
            )
            .await?;
        }
    }
    Ok(())
}
