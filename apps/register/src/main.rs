//! # Courtside Register Entry Point
//!
//! Setup lives in `lib.rs`; this only starts the runtime.

#[tokio::main]
async fn main() {
    if let Err(e) = courtside_register::run().await {
        eprintln!("courtside-register: {e}");
        std::process::exit(1);
    }
}
