use std::path::PathBuf;

use anyhow::Result;
use log::info;
use structopt::StructOpt;

use cprop_engine::flow::constprop::FlowConstProp;
use cprop_engine::flow::shared::Context;
use cprop_shared::logging;

#[derive(StructOpt)]
#[structopt(
    name = "cprop-engine",
    about = "Intraprocedural constant propagation over JSON-serialized procedures",
    rename_all = "kebab-case"
)]
struct Args {
    /// Verbosity, repeat for more details
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,

    /// Save the analysis report as JSON
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// Only analyze these procedures
    #[structopt(short, long)]
    procedures: Vec<String>,

    /// Serialized program
    input: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::from_args();
    let Args {
        verbose,
        output,
        procedures,
        input,
    } = args;

    // setup logging
    logging::setup(verbose)?;

    // load the program
    let ctxt = Context::new();
    let program = ctxt.load(&input)?;
    info!("program loaded from {}", input.display());

    // run the analysis
    let reports = FlowConstProp::new(&ctxt, &program, procedures, output).execute()?;
    for report in &reports {
        println!("{}", report);
    }

    // done with everything
    Ok(())
}
