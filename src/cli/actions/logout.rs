use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Operator logout: removes the stored token for the configured origin.
///
/// # Errors
/// Returns an error if the token cannot be removed.
pub fn execute(args: &Args) -> Result<()> {
    args.globals
        .session()?
        .clear()
        .context("failed to clear session")?;
    info!("session ended by operator");
    println!("Logged out.");
    Ok(())
}
