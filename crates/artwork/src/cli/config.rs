//! The `artwork config` command for configuration management.

use std::path::Path;

use artwork_core::Config;
use clap::{Args, Subcommand};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show config file path
    Path,

    /// Write a config file with defaults and an `[artwork]` template
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs, explicit: Option<&Path>) -> anyhow::Result<()> {
    let path = super::config_path(explicit);

    match args.command {
        ConfigCommand::Show => {
            let config = super::load_config(explicit)?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            std::fs::write(&path, init_template()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Default config plus commented placeholders for the required properties.
fn init_template() -> anyhow::Result<String> {
    let defaults = Config::default().to_toml()?;
    Ok(format!(
        "# Required before building:\n\
         # [artwork]\n\
         # output_path = \"/srv/artwork\"\n\
         # base_url = \"https://cdn.example.com/artwork\"\n\
         # default_image = \"/srv/artwork/default.png\"\n\
         # default_image_url = \"https://cdn.example.com/artwork/default.png\"\n\
         \n{}",
        defaults
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_template_parses() {
        let template = init_template().unwrap();
        assert!(template.contains("# base_url"));
        let config = Config::parse(&template).unwrap();
        assert!(config.artwork.base_url.is_none());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        let args = ConfigArgs {
            command: ConfigCommand::Init { force: false },
        };
        assert!(execute(args, Some(&path)).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        let args = ConfigArgs {
            command: ConfigCommand::Init { force: true },
        };
        execute(args, Some(&path)).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[limits]"));
    }
}
