use anyhow::Result;

use cfgchain_config::{ChainConfig, build_chain, init_project, validate_config};
use cfgchain_core::OutputFormat;

use crate::workspace::determine_project_root;

pub(crate) fn handle_config_show(cd: Option<String>, format: OutputFormat) -> Result<()> {
    let project_root = determine_project_root(cd.as_deref())?;
    let config = ChainConfig::load(&project_root)?.unwrap_or_else(|| {
        eprintln!("No configuration found, showing defaults. Run 'cfgchain config init' to create one.");
        ChainConfig::default()
    });

    match format {
        OutputFormat::Json => {
            let json_str = serde_json::to_string_pretty(&config)?;
            println!("{}", json_str);
        }
        OutputFormat::Text => {
            let toml_str = toml::to_string_pretty(&config)?;
            print!("{}", toml_str);
        }
    }
    Ok(())
}

pub(crate) fn handle_config_validate(cd: Option<String>) -> Result<()> {
    let project_root = determine_project_root(cd.as_deref())?;
    validate_config(&project_root)?;
    let config = ChainConfig::load_or_default(&project_root)?;
    eprintln!(
        "Configuration is valid (strategies: {})",
        build_chain(&config).names().join(" -> ")
    );
    Ok(())
}

pub(crate) fn handle_config_init(cd: Option<String>, nested: bool) -> Result<()> {
    let project_root = determine_project_root(cd.as_deref())?;
    let config = init_project(&project_root, nested)?;
    eprintln!(
        "Initialized project configuration at: {}",
        ChainConfig::config_path(&project_root).display()
    );
    eprintln!("Store: {}", config.store_path(&project_root).display());
    Ok(())
}
