use std::path::Path;

use anyhow::Result;

use kcal::config::Config;
use kcal::ics;

use super::load_records;

pub fn run(cfg: &Config, events: &Path, output: &Path) -> Result<()> {
    let records = load_records(events)?;
    let written = ics::write_file(&records, output, &cfg.ics_location)?;

    println!("Wrote {} event(s) to {}", records.len(), written.display());
    Ok(())
}
