use std::io;
use std::{env, process};

use loxrs::Lox;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut lox = Lox::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: jlox [script]");
            process::exit(64);
        }
        2 => lox.run_file(args[1].clone()),
        _ => lox.run_prompt(),
    }
}
