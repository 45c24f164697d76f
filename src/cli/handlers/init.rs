use std::fs;
use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::paths::DATA_DIR_NAME;
use crate::io::{registry, session};

/// `qt init` — create the data directory with an empty registry and a
/// `default` workspace.
pub fn cmd_init(
    args: InitArgs,
    base_dir: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = match base_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let data_dir = base.join(DATA_DIR_NAME);

    if data_dir.is_dir() && data_dir.join("registry.toml").exists() && !args.force {
        return Err(format!(
            "{} already initialized (use --force to reinitialize)",
            data_dir.display()
        )
        .into());
    }

    fs::create_dir_all(data_dir.join("snapshots"))?;
    let mut reg = registry::WorkspaceRegistry::default();
    registry::write_registry(&data_dir, &mut reg)?;

    if !registry::register_workspace(&data_dir, "default") {
        return Err("could not create the default workspace".into());
    }
    session::write_session(
        &data_dir,
        &session::SessionState {
            active: "default".to_string(),
        },
    )?;

    println!("Initialized qtag data directory at {}", data_dir.display());
    println!("Active workspace: default");
    Ok(())
}
