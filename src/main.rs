use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use scangen::{compile, DfaTable, Scanner};

/// Scanner generator: compile a token specification into a DFA table and
/// tokenize an input file with it.
#[derive(Parser, Debug)]
#[command(name = "scangen")]
#[command(about = "Compile a token specification and tokenize input", long_about = None)]
struct Args {
    /// Specification file: class definitions, a blank line, token rules
    #[arg(long = "specs-file", value_name = "PATH")]
    specs_file: PathBuf,

    /// Text to tokenize, one line at a time
    #[arg(long = "input-file", value_name = "PATH")]
    input_file: PathBuf,

    /// Where token output is written, one `<type> <lexeme>` per line
    #[arg(long = "output-file", value_name = "PATH")]
    output_file: PathBuf,

    /// Where the serialized transition table is written and reloaded from
    #[arg(long = "table-file", value_name = "PATH", default_value = "table")]
    table_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let spec_text = fs::read_to_string(&args.specs_file)
        .with_context(|| format!("reading specification file {}", args.specs_file.display()))?;
    let lexer = compile(&spec_text)
        .with_context(|| format!("compiling {}", args.specs_file.display()))?;
    eprintln!("{}", lexer.stats);

    // Persist the table and reload it, so every run exercises the
    // round-trip path the on-disk format promises.
    let mut table_out = BufWriter::new(
        fs::File::create(&args.table_file)
            .with_context(|| format!("creating table file {}", args.table_file.display()))?,
    );
    lexer.table.write_to(&mut table_out)?;
    table_out.flush()?;

    let table_text = fs::read_to_string(&args.table_file)
        .with_context(|| format!("re-reading table file {}", args.table_file.display()))?;
    let table = DfaTable::parse(&table_text)
        .with_context(|| format!("parsing table file {}", args.table_file.display()))?;
    let scanner = Scanner::new(&table, lexer.dfa.start);

    let input = fs::read_to_string(&args.input_file)
        .with_context(|| format!("reading input file {}", args.input_file.display()))?;
    let mut out = BufWriter::new(
        fs::File::create(&args.output_file)
            .with_context(|| format!("creating output file {}", args.output_file.display()))?,
    );

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let scan = scanner.scan_line(line);
        for token in &scan.tokens {
            writeln!(out, "{} {}", token.token_type, token.lexeme)?;
        }
        for error in &scan.errors {
            eprintln!("{error}");
        }
    }
    out.flush()?;

    Ok(())
}
