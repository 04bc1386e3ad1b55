use std::{
    fs::File,
    ops::Range,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use codesnake::{Block, CodeWidth, Label, LineIndex};
use oxn::{Diagnostic, Dump, Options, Scoping, Seekable, Session};
use yansi::Paint;

#[derive(Parser)]
#[command(name = "oxn")]
#[command(about = "Parse and resolve oxn programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// How long lambda parameters stay in scope
    #[arg(long, global = true, value_enum, default_value = "flat")]
    scoping: ScopingArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopingArg {
    /// Until the end of the enclosing definition
    Flat,
    /// Until the end of the lambda body
    Lexical,
}

impl From<ScopingArg> for Scoping {
    fn from(arg: ScopingArg) -> Self {
        match arg {
            ScopingArg::Flat => Scoping::Flat,
            ScopingArg::Lexical => Scoping::Lexical,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Report the first error in a file, if there is one
    Check { file: PathBuf },
    /// Print the resolved definitions of a file
    Dump { file: PathBuf },
    /// Enter definitions line by line
    Repl,
}

/// The byte range to underline: at least one character, on char boundaries.
fn label_range(text: &str, range: Range<usize>) -> Option<Range<usize>> {
    if text.is_empty() {
        return None;
    }
    let mut start = range.start.min(text.len() - 1);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = range.end.max(start + 1).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    Some(start..end)
}

fn make_block<'a>(
    idx: &'a LineIndex,
    text: &str,
    diagnostic: &Diagnostic,
) -> Option<Block<&'a str, String>> {
    let range = label_range(text, diagnostic.span.range())?;
    Block::new(
        idx,
        [Label::new(range)
            .with_text(diagnostic.message.red().to_string())
            .with_style(|s| s.red().to_string())],
    )
}

fn report(name: &str, text: &str, diagnostic: &Diagnostic) {
    eprintln!("{}", diagnostic.render(name).bold());

    let idx = LineIndex::new(text);
    if let Some(block) = make_block(&idx, text, diagnostic) {
        let block = block.map_code(|c| CodeWidth::new(c, c.len()));
        eprintln!("{}[{name}]", block.prologue());
        eprint!("{block}");
        eprintln!("{}", block.epilogue());
    }
}

fn compile_file(path: &Path, options: Options, dump: bool) -> anyhow::Result<ExitCode> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let source =
        Seekable::new(file).with_context(|| format!("cannot read {}", path.display()))?;

    let mut session = Session::new(options);
    match session.compile(&source) {
        Ok(program) => {
            log::info!("{}: {} definitions", path.display(), program.len());
            if dump {
                print!("{}", Dump::new(&program, &source));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            // only a failing file is read into memory, for the snippet
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            report(&path.display().to_string(), &text, &err.diagnostic());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn repl(options: Options) -> anyhow::Result<ExitCode> {
    let mut readline = rustyline::DefaultEditor::new()?;
    let mut accepted = String::new();

    while let Ok(input) = readline.readline(">> ") {
        if input.trim().is_empty() {
            continue;
        }
        readline.add_history_entry(input.as_str())?;

        // every line recompiles everything accepted so far
        let candidate = format!("{accepted}{input}\n");
        let mut session = Session::new(options.clone());
        match session.compile(&candidate) {
            Ok(program) => {
                print!("{}", Dump::new(&program, &candidate));
                accepted = candidate;
            }
            Err(err) => report("<repl>", &candidate, &err.diagnostic()),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    let options = Options {
        scoping: cli.scoping.into(),
    };

    match cli.command {
        Command::Check { file } => compile_file(&file, options, false),
        Command::Dump { file } => compile_file(&file, options, true),
        Command::Repl => repl(options),
    }
}
