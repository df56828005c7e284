mod app;

use std::env;
use std::process::ExitCode;

use app::cli::{parse_args, usage_text, CliCommand};

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(CliCommand::Run(options)) => options,
        Ok(CliCommand::Help) => {
            println!("{}", usage_text());
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    app::bootstrap::init_tracing();
    app::loop_runner::run(options)
}
