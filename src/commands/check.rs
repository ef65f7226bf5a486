use anyhow::Result;
use calfeed_core::policy::{PropertyCheck, check_property};
use owo_colors::OwoColorize;

pub fn run(names: &[String]) -> Result<()> {
    for name in names {
        match check_property(name) {
            PropertyCheck::Accepted => println!("  {} {}", "✓".green(), name),
            PropertyCheck::Rejected(reason) => {
                println!("  {} {} {}", "✗".red(), name, reason.dimmed())
            }
        }
    }
    Ok(())
}
