#![forbid(unsafe_code)]

use clap::Parser;

fn main() {
    let cli = doctor_a2ui::Cli::parse();
    let emit_json = cli.json;
    let result = doctor_a2ui::logging::init(&cli.log_level, cli.log_json)
        .and_then(|()| doctor_a2ui::run(cli));
    if let Err(error) = result {
        if emit_json {
            eprintln!(
                "{}",
                serde_json::json!({
                    "status": "error",
                    "error": error.to_string(),
                    "exit_code": error.exit_code(),
                })
            );
        } else {
            eprintln!("{error}");
        }
        std::process::exit(error.exit_code());
    }
}
