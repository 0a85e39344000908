use battleship_kernel::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <ships>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let ships: usize = args[2].parse()?;
    if ships == 0 {
        return Err(anyhow::anyhow!("Need at least one ship cell"));
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let map = random_map(&mut rng, ships);

    let (sender, serial) = InMemorySerial::pair();
    sender.send(&map_bytes(&map))?;
    let (peripherals, probes) = sim_board(serial);
    let mut operator = Operator::new(
        spawn_kernel(peripherals, KernelConfig::simulated()),
        probes.keypad.clone(),
    );

    operator.start().await?;
    let turns = operator.autoplay(&mut rng).await?;
    let session = operator.shutdown().await?;

    let result = match session.phase() {
        Phase::GameOver(result) => format!("{:?}", result),
        other => format!("{:?}", other),
    };

    let summary = json!({
        "seed": seed,
        "ship_cells": map.count_ones(),
        "result": result,
        "turns": session.turns(),
        "hits": session.hits().count_ones(),
        "shots": turns,
    });

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
