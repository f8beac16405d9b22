//! Basic usage example for the scanner library.
//!
//! Prints the tags and labels of a public image.
//!
//! Run with: cargo run --example basic_usage -- ghcr.io/ublue-os/bazzite

use libscanner::{RegistryClient, TagFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let image = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ghcr.io/ublue-os/bazzite".to_string());

    let mut client = RegistryClient::new(&image)?;
    println!("Registry: {}", client.url());
    println!("Image:    {}\n", client.reference());

    let meta = client.meta("latest")?;

    println!("Title:       {}", meta.title());
    println!("Description: {}", meta.description());
    println!("Created:     {}", meta.created());

    let stable = TagFilter::new(&["^stable"], &[r"-\d+$"])?.apply(meta.tags());
    println!("\nStable tags ({} of {}):", stable.len(), meta.tags().len());
    for tag in stable {
        println!("  {}", tag);
    }

    println!("\nLabels:");
    for (key, value) in meta.labels() {
        println!("  {} = {}", key, value);
    }

    Ok(())
}
