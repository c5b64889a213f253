use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use tamago_core::{DeathPolicy, PetConfig};
use tamago_engine::PetEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{announce, execute, render, Command, Flow};

#[derive(Parser, Debug)]
#[command(name = "tamago", author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, env = "TAMAGO_CONFIG", default_value = "tamago.toml")]
    config: String,

    /// Name for the pet; asked for at startup when omitted
    #[arg(short, long, env = "TAMAGO_NAME")]
    name: Option<String>,

    /// When the pet dies: `any` (one need at zero) or `mean` (average at zero)
    #[arg(long)]
    death_policy: Option<DeathPolicy>,

    /// Print status as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut config = PetConfig::load_or_default(&args.config)
        .with_context(|| format!("Invalid config file {}", args.config))?;
    if let Some(policy) = args.death_policy {
        config.death_policy = policy;
    }
    let ask_for_name = args.name.is_none();
    if let Some(name) = &args.name {
        config.name = name.clone();
    }

    let engine = PetEngine::spawn(&config).context("Failed to start the pet")?;
    info!(config = %args.config, "Tamago started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if ask_for_name {
        // Nothing decays while the owner is still typing a name.
        engine.pause_clock();
        print!("What would you like to name your pet? [{}] ", engine.name());
        io::stdout().flush()?;
        if let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                if let Err(e) = engine.set_name(&line) {
                    warn!("Keeping default name: {}", e);
                }
            }
        }
        engine.pause_clock();
    }

    println!("Say hello to {}! Type 'help' for commands.", engine.name());
    println!("{}", render(&engine.snapshot(), args.json));

    let mut updates = engine.subscribe();
    let mut last = updates.borrow_and_update().clone();
    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    prompt()?;
                    continue;
                }
                match Command::parse(&line) {
                    Ok(command) => {
                        let (flow, text) = execute(&engine, command, args.json);
                        println!("{text}");
                        if flow == Flow::Quit {
                            break;
                        }
                    }
                    Err(message) => println!("{message}"),
                }
                prompt()?;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                if let Some(message) = announce(&last, &current) {
                    println!("\n{message}");
                    prompt()?;
                }
                let died = last.is_alive() && !current.is_alive();
                last = current;
                if died {
                    println!("\n{}", render(&last, args.json));
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    engine.shutdown();
    info!(age = engine.age(), "Tamago stopped");
    Ok(())
}
