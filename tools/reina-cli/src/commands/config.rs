//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[cart]");
    ctx.output.kv("slot", &ctx.config.cart.slot);
    ctx.output.kv("identity", ctx.config.cart.identity.as_str());

    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.config.storage.dir);
    ctx.output
        .kv("resolved", &ctx.storage_dir().display().to_string());

    ctx.output.info("[checkout]");
    ctx.output.kv("currency", &ctx.config.checkout.currency);
    ctx.output
        .kv("delivery_fee", &ctx.config.delivery_fee()?.display());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    CliConfig::default().save(&config_path)?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}
