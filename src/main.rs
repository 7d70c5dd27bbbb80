use anyhow::Result;
use clap::Parser;
use coinbind::{CLIArguments, convert_main, solve_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    match args {
        CLIArguments::Solve(args) => solve_main(args),
        CLIArguments::Convert(args) => convert_main(args),
    }
}
