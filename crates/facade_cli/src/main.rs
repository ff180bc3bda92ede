use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use facade_driver::{ReportMode, TranslateOptions, UnionPolicy, translate_files};

mod tracing_config;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UnionDisplay {
    /// Unions with several concrete members become `dynamic`.
    Opaque,
    /// Show the first concrete member.
    FirstConcrete,
}

impl From<UnionDisplay> for UnionPolicy {
    fn from(display: UnionDisplay) -> Self {
        match display {
            UnionDisplay::Opaque => UnionPolicy::Opaque,
            UnionDisplay::FirstConcrete => UnionPolicy::FirstConcrete,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "facade", about = "Translate TypeScript declarations into Dart JS-interop facades")]
struct Cli {
    /// Input declaration files (`.d.ts`).
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the generated libraries. Printed to stdout when absent.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop at the first diagnostic instead of collecting them all.
    #[arg(long)]
    fail_fast: bool,

    /// How unions with several representable members are displayed.
    #[arg(long, value_enum, default_value = "opaque")]
    union_policy: UnionDisplay,

    /// Translate all inputs into a single library with this name.
    #[arg(long, num_args = 0..=1, default_missing_value = "facade")]
    merge: Option<String>,
}

fn main() {
    tracing_config::init_tracing();
    let cli = Cli::parse();

    let options = TranslateOptions {
        report_mode: if cli.fail_fast {
            ReportMode::FailFast
        } else {
            ReportMode::Batch
        },
        union_policy: cli.union_policy.into(),
        merge_group: cli.merge,
        output_dir: cli.output,
    };

    tracing::debug!(inputs = cli.inputs.len(), "translating");
    let units = match translate_files(&cli.inputs, &options) {
        Ok(units) => units,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let mut failed = false;
    for unit in &units {
        if unit.failure.is_some() {
            eprintln!("skipped {}", unit.file_name);
        } else if options.output_dir.is_none() {
            println!("// {}", unit.file_name);
            print!("{}", unit.text);
        } else {
            eprintln!("wrote {}", unit.file_name);
        }
        for diagnostic in &unit.diagnostics {
            eprintln!("warning: {diagnostic}");
        }
        if let Err(e) = unit.status() {
            eprintln!("error: {}: {e}", unit.library);
            failed = true;
        }
    }

    if failed {
        process::exit(1);
    }
}
