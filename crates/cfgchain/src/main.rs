use anyhow::Result;
use clap::Parser;

mod cli;
mod config_cmds;
mod resolve_cmds;
mod store_cmds;
mod workspace;

use cli::{Cli, Commands, ConfigCommands};

fn main() -> Result<()> {
    // Initialize tracing (output to stderr, initialize only once)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let format = cli.format;
    let cd = cli.cd;

    match cli.command {
        Commands::Get { path, role } => {
            store_cmds::handle_get(cd, path, role, format)?;
        }
        Commands::List { parent } => {
            store_cmds::handle_list(cd, parent, format)?;
        }
        Commands::Set { path, properties } => {
            store_cmds::handle_set(cd, path, properties)?;
        }
        Commands::SetCollection { parent, file } => {
            store_cmds::handle_set_collection(cd, parent, &file)?;
        }
        Commands::Delete { path } => {
            store_cmds::handle_delete(cd, path)?;
        }
        Commands::Resolve { path, role } => {
            resolve_cmds::handle_resolve(cd, path, role, format)?;
        }
        Commands::ResolveName {
            name,
            related,
            role,
        } => {
            resolve_cmds::handle_resolve_name(cd, name, related, role, format)?;
        }
        Commands::Detect {
            request_path,
            attributes,
        } => {
            resolve_cmds::handle_detect(cd, request_path, attributes, format)?;
        }
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => config_cmds::handle_config_show(cd, format)?,
            ConfigCommands::Validate => config_cmds::handle_config_validate(cd)?,
            ConfigCommands::Init { nested } => config_cmds::handle_config_init(cd, nested)?,
        },
    }

    Ok(())
}
