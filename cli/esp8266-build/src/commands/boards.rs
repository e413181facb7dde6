//! `esp8266-build boards`: board catalog listing and description.

use anyhow::{bail, Result};
use esp8266_boards::ld_script::{LAST_LEGACY_LD_SCRIPT, LAST_WITHOUT_LD_SCRIPT};
use esp8266_boards::{BoardCatalog, LinkerScripts};

/// List every board in the catalog.
pub fn list(boards: &BoardCatalog) -> Result<()> {
    println!("Known boards:");
    println!();
    for board in boards.iter() {
        println!("  {:<20} {:<6} {}", board.id, board.flash_size.label(), board.name);
    }
    println!();
    println!("Use 'esp8266-build boards describe <id>' for details.");
    Ok(())
}

/// Describe one board, including the linker scripts it would get.
pub fn describe(boards: &BoardCatalog, id: &str) -> Result<()> {
    let Some(board) = boards.get(id) else {
        bail!("unknown board: '{id}'. Use 'esp8266-build boards list' to see known boards.");
    };

    println!("=== Board: {} ===", board.id);
    println!("Name:       {}", board.name);
    println!("Flash size: {} ({} bytes)", board.flash_size, board.flash_size.bytes());
    println!();

    println!("--- Linker scripts (Arduino) ---");
    match LinkerScripts::for_flash_size(board.flash_size) {
        Some(scripts) => {
            println!("  <= {LAST_WITHOUT_LD_SCRIPT}: none");
            println!("  <= {LAST_LEGACY_LD_SCRIPT}: {}", scripts.legacy);
            println!("  >  {LAST_LEGACY_LD_SCRIPT}: {}", scripts.current);
        }
        None => println!("  none for this flash size"),
    }
    Ok(())
}
