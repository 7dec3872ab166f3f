use clap::Parser;
use phetio_tools::{build_registry, init_tool};

#[derive(Parser, Debug)]
#[command(author, version, about = "Prints the API of every builtin IOType", long_about = None)]
struct Args {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Config file whose state settings shape IndexedNodeIO
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = init_tool(args.config.as_deref())?;
    let registry = build_registry(&config)?;
    let json = serde_json::to_string_pretty(&registry.api())?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Wrote {} types to {}", registry.len(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phetio_core::PhetioConfig;

    #[test]
    fn test_args_parsing_defaults() {
        let args = Args::parse_from(["api"]);
        assert!(args.output.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_parsing_custom() {
        let args = Args::parse_from(["api", "-o", "api.json", "-c", "phetio.toml"]);
        assert_eq!(args.output.as_deref(), Some("api.json"));
        assert_eq!(args.config.as_deref(), Some("phetio.toml"));
    }

    #[test]
    fn test_registry_lists_indexed_node_methods() {
        let registry = build_registry(&PhetioConfig::default()).unwrap();
        let api = registry.api();
        let indexed = &api["IndexedNodeIO"];
        assert_eq!(indexed.supertype.as_deref(), Some("NodeIO"));
        for method in ["linkIndex", "unlinkIndex", "moveForward", "moveBackward"] {
            assert!(indexed.methods.contains_key(method), "missing {method}");
        }
        assert!(api.contains_key("PhetioActionIO<NumberIO>"));
    }
}
