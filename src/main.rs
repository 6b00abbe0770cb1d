use clap::Parser;
use std::process::exit;
use twoslash_verify::cli::{Cli, Commands};
use twoslash_verify::verifier::{verify, VerifyOptions};

pub fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let Commands::Verify(args) = cli.command;

    let options = VerifyOptions {
        root_dir: args.root_dir,
        build_dir: args.build_dir,
        content_dir: args.content_dir,
        languages: args.languages,
        resolve_project: args.resolve_project,
        watch: args.watch,
        compiler: Some(args.compiler),
        ..VerifyOptions::default()
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match runtime.block_on(verify(&options)) {
        Ok(0) => {}
        Ok(_) => exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}
