// Prints the layer table stored in a seqnet model file.
//   cargo run -- path/to/model.nnmd
// Set RUST_LOG=debug for per-layer detail.
use std::process::ExitCode;

use seqnet::inspect_model;

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: seqnet <model-file>");
        return ExitCode::from(2);
    };

    match inspect_model(&path) {
        Ok(header) => {
            println!("{path}: {} parameterised layers", header.layers.len());
            for (i, layer) in header.layers.iter().enumerate() {
                println!(
                    "  {i}: {} -> {}  weights={} biases={}",
                    layer.input_shape, layer.output_shape, layer.weight_count, layer.bias_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("seqnet: {e}");
            ExitCode::FAILURE
        }
    }
}
