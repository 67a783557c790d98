//! Record a clip, recognize it, print the result.
//!
//! The session never aborts on recognition problems: recording errors,
//! unreachable services, and unintelligible audio all end with a printed
//! result line and a normal exit.

mod args;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use voxclip_core::{RecorderConfig, list_input_devices, record_with, set_verbose, transcribe};

fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and friends from a local .env, if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    set_verbose(args.verbose);

    if args.list_devices {
        return list_devices();
    }

    println!("Recording for {} seconds...", args.duration);

    let mut config = RecorderConfig::new()
        .with_duration(args.duration)
        .with_sample_rate(args.sample_rate);
    if let Some(device) = args.device.clone() {
        config = config.with_device(device);
    }

    if let Err(err) = record_with(&args.output, &config) {
        println!("Recording failed: {err}");
        return Ok(());
    }
    println!("Audio saved as {}", args.output.display());

    println!("Converting speech to text...");
    println!("Processing audio...");
    let outcome = transcribe(&args.output);
    println!("\nResult: {outcome}");

    if !args.keep {
        // Best-effort cleanup; a clip that cannot be removed is not an error
        let _ = std::fs::remove_file(&args.output);
    }

    Ok(())
}

fn list_devices() -> Result<()> {
    for device in list_input_devices()? {
        if device.is_default {
            println!("{} (default)", device.name);
        } else {
            println!("{}", device.name);
        }
    }
    Ok(())
}
