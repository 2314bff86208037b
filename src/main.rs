//! oclean entrypoint: run `opencode` and clean up after it.

use oclean::config::WrapperConfig;
use oclean::exit::FAILURE;
use oclean::{Result, app, logging};
use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = WrapperConfig::from_env();
    logging::init(&config);
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let mut stdout = std::io::stdout();
    let run_result = app::run(&config, &args, &mut stdout);
    ExitCode::from(exit_code_for_run_result(run_result, &mut std::io::stderr()))
}

fn exit_code_for_run_result(result: Result<u8>, stderr: &mut dyn Write) -> u8 {
    match result {
        Ok(code) => code,
        Err(err) => {
            if writeln!(stderr, "oclean: {err}").is_err() {
                log::error!("{err}");
            }
            FAILURE
        }
    }
}
