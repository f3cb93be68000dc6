use std::process;

use clap::Parser;

use wordcop::cli::Args;

fn main() {
    let args = Args::parse();
    match wordcop::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(3);
        }
    }
}
