use std::{
    fs,
    io::{self, BufRead, Read, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use ll_slr_helper::{
    parser::{tokenize, LL1Parser, SLR1Parser},
    Analysis, Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow sets
    Ff,
    /// LL(1) / SLR(1) classification with conflicts
    Class,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0fsm,
    /// SLR(1) action and goto tables
    Slr1table,
}

#[derive(Parser)]
#[command(about = "Analyze a context-free grammar and run LL(1) / SLR(1) parsers on it")]
struct Args {
    /// What to print
    #[arg(value_enum)]
    outputs: Vec<Output>,

    /// Path to the grammar file, read from stdin when absent
    #[arg(short = 'g', long)]
    grammar: Option<PathBuf>,

    /// Eliminate left recursion before anything else
    #[arg(long)]
    elf: bool,

    /// Print in LaTeX format
    #[arg(short = 'l', long, conflicts_with = "json")]
    latex: bool,

    /// Print in JSON format
    #[arg(short = 'j', long)]
    json: bool,

    /// Parse a string with the LL(1) parser
    #[arg(long = "ll1", value_name = "STR")]
    ll1_inputs: Vec<String>,

    /// Parse a string with the SLR(1) parser
    #[arg(long = "slr1", value_name = "STR")]
    slr1_inputs: Vec<String>,

    /// Read strings to parse from the terminal
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Show every parser step
    #[arg(short = 't', long)]
    trace: bool,

    /// Log verbosity, repeat for more
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Plain,
    LaTeX,
    JSON,
}

fn render<T: Serialize>(
    t: &T,
    format: Format,
    plain: impl FnOnce(&T) -> String,
    latex: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    Ok(match format {
        Format::Plain => plain(t),
        Format::LaTeX => latex(t),
        Format::JSON => serde_json::to_string(t)?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    LL1,
    SLR1,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::LL1 => "LL(1)",
            Method::SLR1 => "SLR(1)",
        }
    }
}

struct Session<'a> {
    grammar: &'a Grammar,
    analysis: &'a Analysis,
    format: Format,
}

impl Session<'_> {
    fn not_available(&self, method: Method) -> anyhow::Error {
        let class = self.analysis.to_classification(self.grammar);
        let conflicts = match method {
            Method::LL1 => class.ll1_conflicts,
            Method::SLR1 => class.slr1_conflicts,
        };
        anyhow::anyhow!(
            "grammar is not {}:\n{}",
            method.name(),
            conflicts.join("\n")
        )
    }

    fn print(&self, output: Output) -> anyhow::Result<()> {
        let (g, a, format) = (self.grammar, self.analysis, self.format);
        let text = match output {
            Output::Prod => render(
                &g.to_production_output_vec(),
                format,
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Ff => render(
                &a.to_non_terminal_output_vec(g),
                format,
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Class => render(
                &a.to_classification(g),
                format,
                |t| t.to_plaintext(),
                |t| t.to_latex(),
            )?,
            Output::Ll1 => {
                let table = a
                    .ll1_table
                    .as_ref()
                    .ok_or_else(|| self.not_available(Method::LL1))?;
                render(
                    &table.to_output(g),
                    format,
                    |t| t.to_plaintext(),
                    |t| t.to_latex(),
                )?
            }
            Output::Lr0fsm => render(
                &a.automaton.to_output(),
                format,
                |t| t.to_plaintext(),
                |_| a.automaton.to_latex(),
            )?,
            Output::Slr1table => {
                let table = a
                    .slr1_table
                    .as_ref()
                    .ok_or_else(|| self.not_available(Method::SLR1))?;
                render(
                    &table.to_output(g),
                    format,
                    |t| t.to_plaintext(),
                    |t| t.to_latex(),
                )?
            }
        };
        println!("{}", text);
        Ok(())
    }

    fn parse(&self, method: Method, input: &str, trace: bool) -> anyhow::Result<bool> {
        let tokens = tokenize(input);
        let result = match method {
            Method::LL1 => {
                let table = self
                    .analysis
                    .ll1_table
                    .as_ref()
                    .ok_or_else(|| self.not_available(method))?;
                LL1Parser::new(self.grammar, table).parse_with_trace(&tokens)
            }
            Method::SLR1 => {
                let table = self
                    .analysis
                    .slr1_table
                    .as_ref()
                    .ok_or_else(|| self.not_available(method))?;
                SLR1Parser::new(self.grammar, table).parse_with_trace(&tokens)
            }
        };
        if trace {
            match self.format {
                Format::JSON => println!("{}", serde_json::to_string(&result)?),
                _ => println!("{}", result.to_plaintext()),
            }
        }
        Ok(result.accepted)
    }

    fn parse_and_answer(&self, method: Method, input: &str, trace: bool) -> anyhow::Result<()> {
        let accepted = self.parse(method, input, trace)?;
        println!("{}", if accepted { "yes" } else { "no" });
        Ok(())
    }

    /// Reads strings until an empty line or end of input.
    fn read_loop(
        &self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        method: Method,
        message: &str,
        trace: bool,
    ) -> anyhow::Result<()> {
        while let Some(input) = prompt(lines, message)? {
            if input.is_empty() {
                break;
            }
            self.parse_and_answer(method, &input, trace)?;
        }
        Ok(())
    }

    fn interactive(&self, trace: bool) -> anyhow::Result<()> {
        let class = self.analysis.to_classification(self.grammar);
        println!("{}", class.verdict());

        let methods: Vec<Method> = [(class.ll1, Method::LL1), (class.slr1, Method::SLR1)]
            .into_iter()
            .filter_map(|(ok, m)| ok.then_some(m))
            .collect();
        if methods.is_empty() {
            return Ok(());
        }

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        let trace = trace
            || prompt(&mut lines, "Enable step-by-step view? (y/n): ")?
                .map_or(false, |s| s.eq_ignore_ascii_case("y"));

        if let [method] = methods[..] {
            return self.read_loop(
                &mut lines,
                method,
                "Input string to parse (or press Enter to quit): ",
                trace,
            );
        }

        while let Some(choice) = prompt(
            &mut lines,
            "Select a parser (T: for LL(1), B: for SLR(1), Q: quit): ",
        )? {
            let method = match choice.to_uppercase().as_str() {
                "Q" => break,
                "T" => Method::LL1,
                "B" => Method::SLR1,
                _ => {
                    println!("Invalid selection.");
                    continue;
                }
            };
            let message = format!(
                "Input string for {} parser (or press Enter to re-select): ",
                method.name()
            );
            self.read_loop(&mut lines, method, &message, trace)?;
        }
        Ok(())
    }
}

/// Prints `message` and reads one trimmed line; `None` at end of input.
fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    message: &str,
) -> anyhow::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .module(module_path!())
        .verbosity(usize::from(args.verbose))
        .init()?;

    let input = match &args.grammar {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            if args.interactive {
                bail!("interactive mode needs the grammar in a file (-g)");
            }
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let mut g = Grammar::from_text(&input)?;
    if args.elf {
        g = g.without_left_recursion();
    }
    let analysis = g.analyze();

    let format = if args.latex {
        Format::LaTeX
    } else if args.json {
        Format::JSON
    } else {
        Format::Plain
    };
    let session = Session {
        grammar: &g,
        analysis: &analysis,
        format,
    };

    let nothing_requested = args.outputs.is_empty()
        && args.ll1_inputs.is_empty()
        && args.slr1_inputs.is_empty()
        && !args.interactive;
    let outputs = if nothing_requested {
        vec![Output::Class]
    } else {
        args.outputs.clone()
    };

    for output in outputs {
        session.print(output)?;
    }
    for input in &args.ll1_inputs {
        session.parse_and_answer(Method::LL1, input, args.trace)?;
    }
    for input in &args.slr1_inputs {
        session.parse_and_answer(Method::SLR1, input, args.trace)?;
    }
    if args.interactive {
        session.interactive(args.trace)?;
    }

    Ok(())
}
