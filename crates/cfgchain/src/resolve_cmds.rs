use anyhow::{Result, bail};
use serde::Serialize;

use cfgchain_config::build_detectors;
use cfgchain_core::{ConfigRole, OutputFormat};
use cfgchain_persist::ContextRequest;

use crate::workspace::{Workspace, resource_path};

#[derive(Debug, Serialize)]
struct Resolution {
    input: String,
    role: ConfigRole,
    /// False when every strategy declined and the input is echoed back.
    handled: bool,
    resolved: String,
}

impl Resolution {
    fn print(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                println!("{}", self.resolved);
                if !self.handled {
                    eprintln!("No strategy handled {} as {}", self.input, self.role);
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn handle_resolve(
    cd: Option<String>,
    raw_path: String,
    role: ConfigRole,
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let path = resource_path(&raw_path)?;
    let resolved = workspace.chain.resolve_path(&path, role);
    Resolution {
        handled: resolved.is_some(),
        resolved: resolved.unwrap_or_else(|| path.clone()),
        input: path,
        role,
    }
    .print(format)
}

pub(crate) fn handle_resolve_name(
    cd: Option<String>,
    name: String,
    related: Option<String>,
    role: ConfigRole,
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let related = related.as_deref().map(resource_path).transpose()?;
    let resolved = workspace
        .chain
        .resolve_config_name(&name, related.as_deref(), role);
    Resolution {
        handled: resolved.is_some(),
        resolved: resolved.unwrap_or_else(|| name.clone()),
        input: name,
        role,
    }
    .print(format)
}

pub(crate) fn handle_detect(
    cd: Option<String>,
    request_path: String,
    attributes: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::open(cd.as_deref())?;
    let mut request = ContextRequest::new(request_path);
    for raw in &attributes {
        // Attributes are opaque strings, so no literal typing here.
        let Some((key, value)) = raw.split_once('=') else {
            bail!("Expected KEY=VALUE, got '{raw}'");
        };
        request = request.attribute(key.trim(), value);
    }

    let session = workspace.session()?;
    let detectors = build_detectors(&workspace.config);
    let Some(context) = detectors.detect(&request, &session) else {
        bail!("No context resource found for {}", request.path);
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "request": request.path, "context": context })
        ),
        OutputFormat::Text => println!("{context}"),
    }
    Ok(())
}
