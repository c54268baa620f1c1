use std::process::ExitCode;

fn main() -> ExitCode {
    mcserverdl_lib::run()
}
