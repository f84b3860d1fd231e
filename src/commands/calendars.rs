use anyhow::Result;

use kcal::config::Config;

use super::Session;

pub async fn run(cfg: &Config) -> Result<()> {
    let session = Session::open(cfg).await?;

    let calendars = session.directory.sorted();
    if calendars.is_empty() {
        println!("No calendars found");
        return Ok(());
    }

    for (name, id) in calendars {
        println!("{}: {}", name, id);
    }

    Ok(())
}
