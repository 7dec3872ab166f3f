//! Shared setup for the command-line tools.

use phetio_core::{
    indexed_node_io, init_logging, phetio_action_io, Builtins, CallbackOutbox, IndexLinkRegistry,
    Parameter, PhetioConfig, TypeRegistry,
};
use std::rc::Rc;

/// Loads `path` when given, otherwise the default configuration.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PhetioConfig> {
    match path {
        Some(path) => PhetioConfig::from_toml(&std::fs::read_to_string(path)?),
        None => Ok(PhetioConfig::default()),
    }
}

/// Loads the config and installs the log subscriber at its `[logging] level`.
pub fn init_tool(path: Option<&str>) -> anyhow::Result<PhetioConfig> {
    let config = load_config(path)?;
    init_logging(&config.logging.level);
    Ok(config)
}

/// Registry with the builtins, `IndexedNodeIO` and the common action types.
pub fn build_registry(config: &PhetioConfig) -> anyhow::Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    let builtins = Builtins::register(&mut registry)?;
    let indexed = indexed_node_io(
        &builtins,
        &Rc::new(IndexLinkRegistry::new()),
        &Rc::new(CallbackOutbox::new()),
        config.indexed_node_options(),
    );
    registry.register(&indexed)?;
    phetio_action_io(&mut registry, &builtins, &[])?;
    phetio_action_io(
        &mut registry,
        &builtins,
        &[Parameter::new("value", builtins.number.erased())],
    )?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tool_reads_logging_level() {
        let path = std::env::temp_dir().join(format!("phetio_tools_{}.toml", std::process::id()));
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let config = init_tool(path.to_str()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(init_tool(None).unwrap().logging.level, "info");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_init_tool_rejects_unknown_level() {
        let path = std::env::temp_dir().join(format!("phetio_tools_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(init_tool(path.to_str()).is_err());
        std::fs::remove_file(&path).ok();
    }
}
