//! Interactive chat over stdin/stdout

use colored::*;
use eyre::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};

use crate::config::Config;

pub fn run(dry_run: bool, verbose: bool, quiet: bool, config: &Config) -> Result<()> {
    let (session, greeting) = super::open_session(config, dry_run)?;

    let stdin = io::stdin();
    let prompt = stdin.is_terminal() && !quiet;

    if !quiet {
        println!("{} {}", "assistant>".green().bold(), greeting);
    }

    let mut stdout = io::stdout();
    let mut input = stdin.lock();
    let mut buf = Vec::new();
    loop {
        if prompt {
            print!("{} ", "you>".cyan().bold());
            stdout.flush().context("Failed to flush stdout")?;
        }

        buf.clear();
        if input.read_until(b'\n', &mut buf).context("Failed to read from stdin")? == 0 {
            break;
        }
        // Undecodable bytes become U+FFFD; the message still gets a reply
        let line = String::from_utf8_lossy(&buf);

        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if matches!(utterance, "/exit" | "/quit") {
            break;
        }

        let turn = session.turn(utterance);
        if verbose {
            super::print_tool_calls(&turn.tool_calls);
        }
        println!("{} {}", "assistant>".green().bold(), turn.reply);
    }

    log::info!("Chat session ended");
    Ok(())
}
