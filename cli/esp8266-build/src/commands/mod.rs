//! CLI command implementations.

pub mod boards;
pub mod download;
pub mod emit;
pub mod validate;

use esp8266_core::Warnings;

/// Print collected warnings after a command's regular output.
fn print_warnings(warnings: &Warnings) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    for warning in warnings.iter() {
        println!("  - {warning}");
    }
}
