use std::fs;

use tplx_core::apply;
use tplx_core::{Block, Template};

fn main() {
    let mut args = std::env::args().skip(1);
    let template_path = args.next().expect("Usage: apply_demo <template.json> <blocks.json> [--debug]");
    let blocks_path = args.next().expect("Usage: apply_demo <template.json> <blocks.json> [--debug]");
    let include_debug = args.next().as_deref() == Some("--debug");

    let template_json = fs::read_to_string(&template_path).expect("failed to read template file");
    let blocks_json = fs::read_to_string(&blocks_path).expect("failed to read blocks file");

    let template: Template = serde_json::from_str(&template_json).expect("invalid template JSON");
    let blocks: Vec<Block> = serde_json::from_str(&blocks_json).expect("invalid blocks JSON");

    match apply(&template, &blocks, include_debug) {
        Ok(result) => {
            let out = serde_json::to_string_pretty(&result).expect("serialize result");
            println!("{out}");
        }
        Err(err) => {
            let envelope: tplx_core::ErrorEnvelope = (&err).into();
            let out = serde_json::to_string_pretty(&envelope).expect("serialize envelope");
            eprintln!("{out}");
            std::process::exit(1);
        }
    }
}
