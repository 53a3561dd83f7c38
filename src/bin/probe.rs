use std::process::ExitCode;
use std::sync::Arc;

use noder::app::BlueprintService;
use noder::infra::llm::{GeminiProvider, generation_config_from_env};
use tracing::error;
use tracing_subscriber::EnvFilter;

const SAMPLE_QUERIES: &[&str] = &[
    "Make a blueprint that prints Hello World",
    "When player presses Shift key, make them sprint",
    "Create a health regeneration system",
];

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("noder=info")),
        )
        .init();

    let service = match build_service() {
        Ok(service) => service,
        Err(message) => {
            error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let queries: Vec<&str> = if args.is_empty() {
        SAMPLE_QUERIES.to_vec()
    } else {
        args.iter().map(String::as_str).collect()
    };

    let mut failures = 0usize;
    for query in queries {
        println!("\n\nTesting with query: {query}");
        let success = probe(&service, query);
        if !success {
            failures += 1;
        }
        println!("Test result: {}", if success { "SUCCESS" } else { "FAILURE" });
        println!("{}", "-".repeat(50));
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn build_service() -> Result<BlueprintService, String> {
    let provider = GeminiProvider::from_env().map_err(|err| err.to_string())?;
    let config = generation_config_from_env().map_err(|err| err.to_string())?;
    BlueprintService::new(Arc::new(provider), config).map_err(|err| err.to_string())
}

fn probe(service: &BlueprintService, query: &str) -> bool {
    let completion = match service.complete(query) {
        Ok(completion) => completion,
        Err(err) => {
            println!("API Error: {err}");
            return false;
        }
    };

    println!("\n--- BEGIN RAW RESPONSE ---");
    println!("{}", completion.text);
    println!("--- END RAW RESPONSE ---\n");

    match service.extractor().extract(&completion.text) {
        Ok(graph) => {
            println!(
                "Extracted graph {:?}: {} nodes, {} connections",
                graph.graph_name.as_deref().unwrap_or("<unnamed>"),
                graph.nodes.len(),
                graph.connections.len()
            );
            true
        }
        Err(err) => {
            let report = err.report();
            println!("JSON Parse Error: {err}");
            if let Some(preview) = report.response_preview {
                println!("Response preview: {preview}");
            }
            false
        }
    }
}
