use std::path::PathBuf;

use clap::{ArgAction, Parser};
use matter_conformance::{cases, load_pics, run_test, MatterTestConfig, SimulatedDevice};
use matter_pics_parser::pixit::{bool_arg, hex_arg, int_arg, string_arg};
use matter_pics_parser::{NamedArg, PicsSet};
use miette::miette;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs Microwave Oven Mode conformance test cases against a simulated
/// microwave oven.
#[derive(Parser, Debug)]
#[command(name = "mwom-conformance", version, long_about = None)]
struct Cli {
    /// Integer test parameter, NAME:VALUE (decimal or 0x-prefixed hex)
    #[arg(long = "int-arg", value_parser = int_arg, num_args = 1.., action = ArgAction::Append)]
    int_args: Vec<NamedArg>,

    /// Boolean test parameter, NAME:true|false
    #[arg(long = "bool-arg", value_parser = bool_arg, num_args = 1.., action = ArgAction::Append)]
    bool_args: Vec<NamedArg>,

    /// String test parameter, NAME:VALUE
    #[arg(long = "string-arg", value_parser = string_arg, num_args = 1.., action = ArgAction::Append)]
    string_args: Vec<NamedArg>,

    /// Octet string test parameter, NAME:[hex:]HEXDIGITS
    #[arg(long = "hex-arg", value_parser = hex_arg, num_args = 1.., action = ArgAction::Append)]
    hex_args: Vec<NamedArg>,

    /// PICS file with one CODE=0|1 entry per line
    #[arg(long = "PICS")]
    pics: Option<PathBuf>,

    /// Test cases to run
    #[arg(long, num_args = 1.., default_value = "TC_MWOM_2_1")]
    tests: Vec<String>,

    /// Endpoint the simulated microwave oven is exposed on
    #[arg(long, default_value_t = 1)]
    simulated_endpoint: u16,

    /// More logging, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let pics = match &cli.pics {
        Some(path) => load_pics(path)?,
        None => PicsSet::new(),
    };

    let args = cli
        .int_args
        .into_iter()
        .chain(cli.bool_args)
        .chain(cli.string_args)
        .chain(cli.hex_args);
    let config = MatterTestConfig::new(args, pics, cli.tests);
    let selected = cases::select(&config.tests)?;
    let device = SimulatedDevice::microwave_oven(cli.simulated_endpoint);

    let mut failed = 0;
    for test in &selected {
        let outcome = run_test(test.as_ref(), &config, &device).await;
        match outcome.result {
            Ok(()) => println!("PASS {}", outcome.name),
            Err(e) => {
                failed += 1;
                println!("FAIL {}", outcome.name);
                eprintln!("{:?}", miette::Report::new(e));
            }
        }
    }

    if failed > 0 {
        return Err(miette!("{failed} of {} test cases failed", selected.len()));
    }
    Ok(())
}
