#![windows_subsystem = "windows"]
use std::io::{self, BufRead, Write};

mod error;
mod logging;
mod model;
mod parsers;
mod protocol;
mod services;

fn main() {
    logging::init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ts-core started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read request line");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = std::panic::catch_unwind(|| protocol::handle(&line));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    tracing::info!("stdin closed, shutting down");
}
