//! List available checks

use mobsec_checks::SecurityCheckType;
use mobsec_core::SecurityCheck;

pub fn run() -> anyhow::Result<()> {
    println!("Available Security Checks");
    println!("=========================\n");

    for ty in SecurityCheckType::all() {
        println!("{:<16} {:<20} {}", ty.id(), ty.name(), ty.description());
    }

    Ok(())
}
