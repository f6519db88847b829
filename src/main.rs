//! # Voxel Mesher Entry Point
//!
//! Generates a world, meshes it and logs the totals.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

fn main() {
    if let Err(err) = voxel_mesher::run() {
        log::error!("{err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
}
