//! Prints the metadata and every header field of a `.mccd` file.
//!
//! ```text
//! RUST_LOG=debug cargo run --example inspect -- frame.mccd
//! ```

use marccd::{FieldValue, MarCcd};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: inspect <file.mccd>")?;
    let image = MarCcd::read(&path)?;

    println!("name:       {}", image.name.as_deref().unwrap_or("-"));
    println!("dimensions: {:?}", image.dimensions());
    println!("distance:   {:?} mm", image.distance);
    println!("center:     {:?} px", image.center);
    println!("pixelsize:  {:?} µm", image.pixelsize);
    println!("wavelength: {:?} Å", image.wavelength);
    println!("timestamp:  {}", image.timestamp.as_deref().unwrap_or("-"));

    println!("\nHeader fields:");
    for (name, value) in image.raw_header().into_iter().flat_map(|h| h.fields()) {
        match value {
            FieldValue::Bytes(bytes) if bytes.iter().all(|&b| b == 0) => continue,
            FieldValue::Str(s) if s.is_empty() => continue,
            value => println!("{name:24}: {value:?}"),
        }
    }
    Ok(())
}
