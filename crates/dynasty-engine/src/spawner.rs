//! Initial population.
//!
//! Expands the configured `spawns` section into characters inside a fresh
//! [`SimulationContext`]. Unpinned spawns land on random free tiles drawn
//! from the context's seeded random source, so a given seed always
//! produces the same opening layout.

use dynasty_core::{KernelError, SimulationConfig, SimulationContext};
use dynasty_types::CharacterId;
use tracing::{debug, info};

use crate::error::EngineError;

/// Spawn every configured character into `context`.
///
/// Returns the new identifiers in configuration order.
///
/// # Errors
///
/// [`EngineError::Config`] if the classes or spawn list do not convert,
/// [`EngineError::Spawner`] if a character cannot be placed, and
/// [`EngineError::Kernel`] for any other kernel failure.
pub fn spawn_initial(
    config: &SimulationConfig,
    context: &mut SimulationContext,
) -> Result<Vec<CharacterId>, EngineError> {
    let classes = config.build_classes()?;
    let requests = config.spawn_requests(&classes)?;
    let mut spawned = Vec::with_capacity(requests.len());

    for request in requests {
        let name = request.name.clone();
        let id = context.spawn(request).map_err(|error| match error {
            KernelError::SpawnBlocked(_) | KernelError::NoFreeTile => EngineError::Spawner {
                message: format!("cannot place {name}: {error}"),
            },
            other => EngineError::from(other),
        })?;
        debug!(character = %id, name, "Character spawned");
        spawned.push(id);
    }

    info!(
        spawned = spawned.len(),
        lineages = context.lineages().count(),
        "Initial population placed"
    );
    Ok(spawned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use dynasty_core::KernelSettings;
    use dynasty_world::GridMap;

    use super::*;

    const CONFIG: &str = r"
archetypes:
  wolf:
    kind: beast
    starting_legacy: 4
  house:
    kind: player
classes:
  plain: {}
spawns:
  - name: Wolf
    archetype: wolf
    class: plain
    count: 3
  - name: Mira
    archetype: house
    class: plain
    row: 1
    col: 1
";

    fn context(rows: u32, cols: u32) -> SimulationContext {
        let world = GridMap::new("test", rows, cols).unwrap();
        SimulationContext::new(Box::new(world), KernelSettings::default())
    }

    #[test]
    fn spawns_every_configured_character() {
        let config = SimulationConfig::parse(CONFIG).unwrap();
        let mut ctx = context(4, 4);
        let ids = spawn_initial(&config, &mut ctx).unwrap();

        assert_eq!(ids.len(), 4);
        assert_eq!(ctx.alive_count(), 4);
        assert_eq!(ctx.lineages().count(), 1);
        let last = ids.last().copied().unwrap();
        assert_eq!(ctx.character(last).unwrap().name, "Mira");
    }

    #[test]
    fn shipped_config_populates_its_world() {
        let config = SimulationConfig::parse(include_str!("../../../dynasty-config.yaml")).unwrap();
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(config.world.seed);
        let world = GridMap::scattered(
            "shipped",
            config.world.rows,
            config.world.cols,
            config.world.blocked_density,
            &mut rng,
        )
        .unwrap();
        let mut ctx = SimulationContext::new(Box::new(world), config.kernel_settings());

        let ids = spawn_initial(&config, &mut ctx).unwrap();
        assert_eq!(ids.len(), 18);
        assert_eq!(ctx.lineages().count(), 2);
    }

    #[test]
    fn overcrowded_world_reports_a_spawner_error() {
        let config = SimulationConfig::parse(CONFIG).unwrap();
        // Two tiles for four characters.
        let mut ctx = context(1, 2);
        match spawn_initial(&config, &mut ctx) {
            Err(EngineError::Spawner { message }) => assert!(message.contains("cannot place")),
            other => panic!("expected a spawner error, got {other:?}"),
        }
    }
}
