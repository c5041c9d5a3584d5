//! CLI entry point for the `relgram` tool.
//!
//! Two modes: compile a tabular grammar specification into a grammar file,
//! or dump the prelexer's view of each line of a sample file.

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use relgram::grammar::{Grammar, GrammarWriter};
use relgram::prelexer::prelex;
use relgram::table::parse_table;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.as_slice() {
        [flag, samples] if flag == "--prelex" => dump_prelexed(Path::new(samples)),
        [spec, output] => compile_grammar(Path::new(spec), Path::new(output)),
        _ => {
            let _ = writeln!(
                io::stderr(),
                "usage: relgram <spec.csv> <grammar.lark>\n       relgram --prelex <samples>"
            );
            return ExitCode::FAILURE;
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "relgram: {error}");
            ExitCode::FAILURE
        }
    }
}

fn compile_grammar(spec: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
    let input = fs::read_to_string(spec)?;
    let rows = parse_table(&input)?;
    let grammar = Grammar::from_rows(&rows)?;
    let module_name = output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| format!(".{stem}"));
    let file = fs::File::create(output)?;
    let mut out = io::BufWriter::new(file);
    let mut writer = GrammarWriter::new(&grammar, &mut out);
    if let Some(module_name) = module_name {
        writer = writer.with_module_name(module_name);
    }
    writer.write_grammar()?;
    out.flush()?;
    Ok(())
}

/// Line-numbered echo of each sample with one token per line. Blank lines
/// and `#` comments in the sample file are skipped.
fn dump_prelexed(samples: &Path) -> Result<(), Box<dyn Error>> {
    let input = fs::read_to_string(samples)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, line) in input.lines().enumerate() {
        let number = index.saturating_add(1);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        writeln!(out, "{number} {line}")?;
        let tokens = prelex(line).map_err(|e| format!("line {number}: {e}"))?;
        for token in tokens {
            writeln!(out, " {} {}", token.category.initial(), token.text)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
