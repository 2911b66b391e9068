use std::fmt::Display;
use std::time::Instant;
use std::{fs, process};

use clap::Parser;
use mtsort_cli::{
    collect_inputs, exit_code, file_name, read_executions, render_entry, App, CheckArgs, Command,
    GenerateArgs, EXIT_FATAL, EXIT_OK,
};
use mtsort_core::Strategy;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Check(args) => check(args),
        Command::Generate(args) => generate(args),
    }
}

fn fatal(message: impl Display) -> ! {
    eprintln!("{message}");
    process::exit(EXIT_FATAL);
}

fn generate(args: &GenerateArgs) {
    args.validate().unwrap_or_else(|e| fatal(e));
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        fatal(format_args!("Failed to create output directory: {e}"));
    });

    let batches = mtsort_testgen::generator::generate_mult_batches(
        args.n_batch,
        args.n_label,
        args.n_slot,
        args.n_exec,
        args.n_mutation,
        args.seed,
    );

    for batch in &batches {
        let batch_dir = batch.write_to(&args.output_dir).unwrap_or_else(|e| {
            fatal(format_args!("Failed to write batch {}: {e}", batch.get_id()));
        });
        let path = batch_dir.join("batch.json");
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            fatal(format_args!("Failed to create {}: {e}", path.display()));
        });
        serde_json::to_writer_pretty(file, batch).unwrap_or_else(|e| {
            fatal(format_args!("Failed to write {}: {e}", path.display()));
        });
    }

    println!(
        "Generated {} batches to {}",
        batches.len(),
        args.output_dir.display()
    );
}

fn check(args: &CheckArgs) {
    let files = collect_inputs(args).unwrap_or_else(|e| fatal(e));
    let executions = read_executions(&files).unwrap_or_else(|e| fatal(e));
    let strategy = Strategy::from(args.strategy);

    let start = Instant::now();
    let report = mtsort_core::check(&executions, strategy).unwrap_or_else(|e| fatal(e));
    let elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
    tracing::info!(
        executions = executions.len(),
        ?strategy,
        elapsed_us,
        "sequence checked"
    );

    for (entry, path) in report.executions.iter().zip(&files) {
        let rendered = render_entry(args, &file_name(path), entry).unwrap_or_else(|e| fatal(e));
        println!("{rendered}");
    }

    let code = exit_code(&report);
    if code != EXIT_OK {
        process::exit(code);
    }
}
