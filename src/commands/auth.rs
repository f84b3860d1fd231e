use anyhow::Result;

use kcal::config::Config;

use super::credential_manager;

pub async fn run(cfg: &Config) -> Result<()> {
    let manager = credential_manager(cfg)?;

    println!("Authenticating with Google...");
    let credential = manager.obtain().await?;

    println!(
        "Credential valid until {}",
        credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Token stored at {}", cfg.token_path.display());

    Ok(())
}
