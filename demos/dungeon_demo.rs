//! Complete workflow demonstration for voronoi_dungeon

use voronoi_dungeon::*;

fn main() -> Result<()> {
    println!("=== voronoi_dungeon Demo ===\n");

    // Step 1: Configure dungeon
    println!("Step 1: Configuring dungeon...");
    let config = DungeonConfigBuilder::new()
        .seed(12345)
        .dimensions(200.0, 200.0)?
        .rooms(10, 16)
        .hall_width(5.0)?
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Domain: {} x {}", config.width, config.height);
    println!("  Rooms: {:?}", config.room_range());

    // Step 2: Generate
    println!("\nStep 2: Generating dungeon...");
    let dungeon = Dungeon::generate(config)?;
    println!("  Cells: {}", dungeon.cell_count());
    println!("  Rooms: {}", dungeon.rooms().len());
    println!(
        "  Corridors: {} tree + {} restored",
        dungeon.corridors().spanning_tree().len(),
        dungeon.corridors().added_back().len()
    );
    println!(
        "  Walls: {} standing, {} renderable, {} opened",
        dungeon.walls().walls.len(),
        dungeon.walls().renderable.len(),
        dungeon.walls().opened.len()
    );
    println!("  Reachable cells: {}", dungeon.reachable_cells().len());
    for warning in dungeon.warnings() {
        println!("  Warning: {}", warning);
    }

    // Step 3: Placement
    println!("\nStep 3: Placement:");
    println!("  {:?}", dungeon.placement());
    if let Some(bounds) = dungeon.floor_bounds() {
        println!("  Floor: {:?} .. {:?}", bounds.min, bounds.max);
    }

    // Step 4: Navigation
    println!("\nStep 4: Navigation:");
    let placement = dungeon.placement();
    if let (Some(player), Some(pursuer)) = (placement.player_spawn, placement.pursuer_spawn) {
        match dungeon.find_path(pursuer, player) {
            Ok(path) => println!(
                "  Pursuer reaches player in {} steps ({:.1} units)",
                path.len().saturating_sub(1),
                dungeon.pathfinder().path_length(&path)
            ),
            Err(err) => println!("  {}", err),
        }
    }

    #[cfg(feature = "spatial-index")]
    {
        let probe = Vec2::new(config.width / 2.0, config.height / 2.0);
        if let Some(site) = dungeon.find_vertex_at(probe) {
            println!("  Position {:?} -> vertex {}", probe, site);
        }
    }
    println!("  Trigger zones: {}", dungeon.trigger_zones().len());

    println!("\n=== Demo Complete ===");
    Ok(())
}
