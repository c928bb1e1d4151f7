//! Interactive transcript entry.

use std::io::{self, BufRead, Write};

use clap::Args;

use super::{create_matcher, print_error};
use crate::Cli;
use crate::config::Config;

/// Interactive mode: enter transcripts and print summaries.
///
/// A transcript may span several lines and is submitted with an empty
/// line. `quit` or end of input leaves.
#[derive(Args)]
pub struct ReplCommand {
    /// Search an in-memory catalog built from this products file instead of Azure AI Search
    #[arg(long, value_name = "PATH")]
    catalog: Option<String>,
}

/// One read from the prompt.
#[derive(Debug, PartialEq)]
enum Block {
    Transcript(String),
    Empty,
    Quit,
}

impl ReplCommand {
    pub async fn run(&self, _cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
        let matcher = create_matcher(cfg, self.catalog.as_deref()).await?;

        let rule = "=".repeat(80);
        println!("{rule}\nINTERAKTIVNÍ REŽIM\n{rule}");
        println!("\nZadejte text transkriptu (nebo 'quit' pro ukončení):");
        println!("Tip: Můžete zadat více řádků. Ukončete zadávání prázdným řádkem.\n");

        let stdin = io::stdin();
        let mut input = stdin.lock();
        loop {
            println!("{}", "-".repeat(80));
            println!("Transkript:");
            io::stdout().flush()?;

            let text = match read_block(&mut input)? {
                Block::Quit => break,
                Block::Empty => continue,
                Block::Transcript(text) => text,
            };

            match matcher.process(&text).await {
                Ok(result) => println!("{}", result.to_summary()),
                Err(e) => {
                    tracing::error!(error = %e, "transcript failed");
                    print_error(&format!("Zpracování selhalo: {e}"));
                }
            }
            println!("\nZadejte další text (nebo 'quit' pro ukončení):");
        }

        println!("\nKonec interaktivního režimu.");
        Ok(())
    }
}

/// Read lines up to the first empty one and join them with spaces.
fn read_block(input: &mut impl BufRead) -> io::Result<Block> {
    let mut lines = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if input.read_line(&mut buf)? == 0 {
            return Ok(Block::Quit);
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if line.eq_ignore_ascii_case("quit") {
            return Ok(Block::Quit);
        }
        lines.push(line.to_string());
    }

    if lines.is_empty() {
        Ok(Block::Empty)
    } else {
        Ok(Block::Transcript(lines.join(" ")))
    }
}
