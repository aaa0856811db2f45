//! # Kasir - Operator Terminal
//!
//! ```text
//! $ kasir checkout cart.json --cashier cashier@umkm.com
//! {
//!   "invoiceNumber": "INV-20260117-0001",
//!   "totalAmount": 11100000,
//!   ...
//! }
//! ```
//!
//! Exit status is non-zero when the command failed; the error is printed
//! to stderr as `{"code": ..., "message": ...}`.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    kasir_cli::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match kasir_cli::run(args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let rendered = serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string());
            eprintln!("{}", rendered);
            ExitCode::FAILURE
        }
    }
}
