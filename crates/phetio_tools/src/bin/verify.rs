use clap::Parser;
use phetio_core::AnyIOType;
use phetio_io::StateSnapshot;
use phetio_tools::{build_registry, init_tool};

#[derive(Parser, Debug)]
#[command(author, version, about = "Checks a saved state snapshot against the IOType schemas", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "state/snapshot.json.gz")]
    input: String,

    #[arg(short, long)]
    config: Option<String>,
}

/// One problem per line; empty when every entry is valid.
fn check_snapshot(snapshot: &StateSnapshot, registry: &phetio_core::TypeRegistry) -> Vec<String> {
    let mut problems = Vec::new();
    for (phetio_id, state) in &snapshot.state {
        let Some(type_name) = snapshot.types.get(phetio_id) else {
            problems.push(format!("{phetio_id}: no type recorded"));
            continue;
        };
        match registry.get(type_name) {
            Some(io_type) => {
                if let Err(err) = io_type.validate_state(state) {
                    problems.push(format!("{phetio_id} ({type_name}): {err}"));
                }
            }
            None => problems.push(format!("{phetio_id}: unknown type {type_name}")),
        }
    }
    problems
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Verifying PhET-iO state snapshot {}...", args.input);

    let config = init_tool(args.config.as_deref())?;
    let snapshot = StateSnapshot::load(&args.input)?;
    println!("Saved at: {}", snapshot.saved_at);
    println!("Fingerprint: {}", snapshot.fingerprint);
    println!("Entries: {}", snapshot.len());

    if let Some(recorded) = &snapshot.config_fingerprint {
        if *recorded != config.fingerprint() {
            println!("Warning: snapshot was saved under different state settings");
        }
    }

    let registry = build_registry(&config)?;
    let problems = check_snapshot(&snapshot, &registry);
    if problems.is_empty() {
        println!("\nVERIFICATION SUCCESSFUL: every entry matches its type.");
        return Ok(());
    }

    println!("\nVERIFICATION FAILED: {} invalid entries", problems.len());
    for problem in &problems {
        println!("  {}", problem);
    }
    anyhow::bail!("snapshot {} has {} invalid entries", args.input, problems.len())
}
