use std::path::PathBuf;

use cfgchain_core::{ConfigRole, OutputFormat};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cfgchain")]
#[command(about = "Configuration persistence through an ordered strategy chain")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project directory (defaults to CWD)
    #[arg(long, global = true)]
    pub cd: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the configuration stored for a resource
    Get {
        /// Absolute resource path, e.g. /conf/site/settings
        path: String,

        /// Role the path is read as
        #[arg(long, value_enum, default_value = "singleton")]
        role: ConfigRole,
    },

    /// List the items of a configuration collection
    List {
        /// Collection parent path
        parent: String,
    },

    /// Replace the properties of a singleton configuration
    Set {
        path: String,

        /// Properties as KEY=VALUE (bool, integer and float literals are typed)
        #[arg(required = true)]
        properties: Vec<String>,
    },

    /// Replace a whole configuration collection from a TOML file
    SetCollection {
        /// Collection parent path
        parent: String,

        /// File with optional [properties] and [[items]] (name + [items.properties])
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a configuration and everything below it
    Delete { path: String },

    /// Show where the chain maps a resource path
    Resolve {
        path: String,

        #[arg(long, value_enum, default_value = "singleton")]
        role: ConfigRole,
    },

    /// Show how the chain rewrites a nested configuration name
    ResolveName {
        name: String,

        /// Path of an already resolved configuration resource
        #[arg(long)]
        related: Option<String>,

        #[arg(long, value_enum, default_value = "singleton")]
        role: ConfigRole,
    },

    /// Find the context resource for a request path
    Detect {
        request_path: String,

        /// Request attribute as KEY=VALUE (repeatable)
        #[arg(long = "attr")]
        attributes: Vec<String>,
    },

    /// Show/manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective (merged) configuration
    Show,

    /// Validate the configuration
    Validate,

    /// Initialize project configuration (.cfgchain/config.toml)
    Init {
        /// Put a nested-content strategy in front of the direct fallback
        #[arg(long)]
        nested: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cfgchain",
            "get",
            "/conf/x",
            "--role",
            "collection-item",
            "--format",
            "json",
            "--cd",
            "/tmp",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.cd.as_deref(), Some("/tmp"));
        match cli.command {
            Commands::Get { path, role } => {
                assert_eq!(path, "/conf/x");
                assert_eq!(role, ConfigRole::CollectionItem);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn set_requires_properties() {
        assert!(Cli::try_parse_from(["cfgchain", "set", "/conf/x"]).is_err());
    }
}
