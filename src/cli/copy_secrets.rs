//! Copy Actions secrets from the local environment into a forked repo.

use crate::github::{seal_secret, SecretWrite, SecretsClient};
use crate::Result;
use colored::Colorize;

/// Secrets carried over to the fork. Values come from the environment of
/// the operator running the copy, mirroring the source repo's settings.
pub const SECRET_NAMES: [&str; 8] = [
    "DB_HOST",
    "DB_PASSWORD",
    "REDIS_HOST",
    "REDIS_PASSWORD",
    "SSH_HOST",
    "SSH_KEY",
    "SSH_PORT",
    "SSH_USER",
];

pub async fn run() -> Result<()> {
    let gh_pat = std::env::var("GH_PAT").ok().filter(|v| !v.is_empty());
    let owner = std::env::var("OWNER").ok().filter(|v| !v.is_empty());
    let new_repo = std::env::var("NEW_REPO").ok().filter(|v| !v.is_empty());

    let (Some(gh_pat), Some(owner), Some(new_repo)) = (gh_pat, owner, new_repo) else {
        anyhow::bail!("Missing required environment variables: GH_PAT, OWNER, NEW_REPO");
    };

    println!(
        "{}",
        format!("🔐 Copying secrets to {owner}/{new_repo}...").cyan()
    );

    let client = SecretsClient::new(gh_pat)?;

    println!("{} Fetching public key for {new_repo}...", "📥");
    let repo_key = client.public_key(&owner, &new_repo).await?;
    println!(
        "{} Public key fetched (key_id: {})",
        "✓".green(),
        repo_key.key_id
    );

    let mut copied = 0;
    let mut skipped = 0;

    for name in SECRET_NAMES {
        let Some(value) = std::env::var(name).ok().filter(|v| !v.is_empty()) else {
            println!(
                "{} Skipping {name}: environment variable unset or empty",
                "⚠".yellow()
            );
            skipped += 1;
            continue;
        };

        let encrypted = seal_secret(&repo_key.key, &value)?;
        match client
            .put_secret(&owner, &new_repo, name, &encrypted, &repo_key.key_id)
            .await?
        {
            SecretWrite::Created => println!("{} Created secret: {name}", "✓".green()),
            SecretWrite::Updated => println!("{} Updated secret: {name}", "✓".green()),
        }
        copied += 1;
    }

    println!(
        "\n{}",
        format!("🎉 Done! Copied {copied} secrets, skipped {skipped}").green()
    );
    Ok(())
}
