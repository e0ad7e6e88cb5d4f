//! Print shop demo
//!
//! Computers submit print jobs to a shared, bounded spool; printers take
//! them off and print them. Choose a job source from the menu, watch the
//! run, then pick again.
//!
//! Run with: cargo run --example print_shop [descriptor-file]
//!
//! `WORK_QUEUE_*` environment variables override the defaults, and
//! `RUST_LOG=debug` shows worker lifecycle logs.

use rust_work_queue::prelude::*;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_INPUT: &str = "webView.txt";

enum Choice {
    Builtin,
    File,
    Exit,
}

fn prompt(input: &mut impl BufRead) -> io::Result<Option<Choice>> {
    loop {
        println!();
        println!("1. Print the built-in batch");
        println!("2. Print jobs listed in a file");
        println!("3. Exit");
        print!("Enter your choice: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim() {
            "1" => return Ok(Some(Choice::Builtin)),
            "2" => return Ok(Some(Choice::File)),
            "3" => return Ok(Some(Choice::Exit)),
            other => println!("Invalid choice '{}', please enter 1, 2 or 3", other),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let config = WorkQueueConfig::from_env()?
        .with_labels("Computer", "Printer")
        .with_thread_name_prefix("print-shop");

    println!("=== Print Shop ===");
    println!(
        "Spool capacity: {}, computers: {}, printers: {}",
        config.queue_capacity, config.producers, config.consumers
    );

    let orchestrator = Orchestrator::new(config)?
        .with_sink(Arc::new(StdoutSink))
        .with_processor(Arc::new(SimulatedWork::between(
            Duration::from_millis(50),
            Duration::from_millis(250),
        )));

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        let choice = prompt(&mut input).map_err(|e| WorkQueueError::other(e.to_string()))?;
        let descriptors = match choice {
            Some(Choice::Builtin) => builtin_descriptors(),
            Some(Choice::File) => match read_descriptors(&input_path) {
                Ok(descriptors) => descriptors,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            },
            Some(Choice::Exit) | None => break,
        };

        let report = orchestrator.run(descriptors)?;
        println!(
            "{} printed, {} rejected, spool peak {}/{}",
            report.processed(),
            report.rejected(),
            report.queue.peak_len,
            report.queue.capacity
        );
        for failure in &report.failures {
            println!("{} failed: {}", failure.worker, failure.message);
        }
        println!("All jobs are done");
    }

    println!("Goodbye");
    Ok(())
}
