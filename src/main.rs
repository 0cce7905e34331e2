use clap::Parser;
use idfkit::output::FileOutput;
use idfkit::{run_round_trip, SchemaRegistry};
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct IdfKitArgs {
    #[arg(help = "Path to an IDF-style input file", required_unless_present = "dump_schema")]
    input_file: Option<String>,
    #[arg(
        long,
        short,
        help = "Directory to write translated output to (defaults to <input>__results)"
    )]
    output_dir: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = false,
        help = "Print the built-in object schemas as JSON and exit"
    )]
    dump_schema: bool,
    #[arg(long, short, default_value_t = false, help = "Log at trace level")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = IdfKitArgs::parse();

    // set up basic tracing
    let tracing_subscriber = tracing_subscriber::fmt::fmt()
        .with_max_level(log_level(args.verbose))
        .finish();
    tracing::subscriber::set_global_default(tracing_subscriber)
        .expect("setting tracing subscriber failed");

    if args.dump_schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&SchemaRegistry::builtin().to_json()?)?
        );
        return Ok(());
    }

    let Some(input_file) = args.input_file.as_deref() else {
        anyhow::bail!("An input file is required");
    };
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);

    let output_path = match args.output_dir {
        Some(directory) => directory,
        None => PathBuf::from(format!("{}__results", input_file_stem.display())),
    };
    fs::create_dir_all(&output_path)?;
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("output");
    let file_output = FileOutput::new(output_path, format!("{input_file_name}__{{}}.idf"));

    let results = run_round_trip(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        "roundtrip",
    )?;

    info!(
        "Round trip produced {} model objects and {} records with {} errors",
        results.model.len(),
        results.workspace.len(),
        results.error_count()
    );
    debug!(
        "Diagnostics: {}",
        serde_json::to_string_pretty(&(
            &results.reverse_diagnostics,
            &results.forward_diagnostics
        ))?
    );

    Ok(())
}

fn log_level(verbose: bool) -> tracing::Level {
    if verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    }
}
