use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use eva_core::{ir_persist, Interpreter, Module};
use eva_emit::{EmitterConfig, IrEmitter};
use eva_lower::{Compiler, CompilerOptions};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "eva")]
#[command(about = "Eva - compile S-expression programs to SSA IR")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a program and write its IR
    Compile {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(short, long, default_value = "out.eir")]
        output: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        emit: EmitFormat,

        /// Also print the IR to stdout
        #[arg(long)]
        print: bool,
    },

    /// Compile a program and execute it on the reference interpreter
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Abort after this many executed instructions
        #[arg(long, default_value_t = 1_000_000)]
        step_limit: usize,
    },

    /// Compile and verify a program without writing anything
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Source file
    #[arg(required_unless_present = "eval")]
    input: Option<PathBuf>,

    /// Program text given inline instead of a file
    #[arg(short, long, conflicts_with = "input")]
    eval: Option<String>,

    /// Compiler options as JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Compile {
            source,
            output,
            emit,
            print,
        } => cmd_compile(&source, &output, emit, print),
        Commands::Run { source, step_limit } => cmd_run(&source, step_limit),
        Commands::Check { source } => cmd_check(&source),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

impl SourceArgs {
    fn read(&self) -> Result<(String, String)> {
        match (&self.eval, &self.input) {
            (Some(text), _) => Ok(("<eval>".to_string(), text.clone())),
            (None, Some(path)) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok((path.display().to_string(), text))
            }
            (None, None) => anyhow::bail!("No input given; pass a file or --eval"),
        }
    }

    fn options(&self) -> Result<CompilerOptions> {
        match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                tracing::info!(config = %path.display(), "loaded compiler options");
                CompilerOptions::from_json(&json)
                    .with_context(|| format!("Invalid config {}", path.display()))
            }
            None => Ok(CompilerOptions::default()),
        }
    }

    fn compile(&self) -> Result<Compiled> {
        let (name, text) = self.read()?;
        let compiler = Compiler::new(self.options()?);
        tracing::info!(input = %name, "compiling");
        let module = compiler
            .compile(&text)
            .with_context(|| format!("Failed to compile {}", name))?;
        Ok(Compiled {
            name,
            options: compiler.options().clone(),
            module,
        })
    }
}

struct Compiled {
    name: String,
    options: CompilerOptions,
    module: Module,
}

fn cmd_compile(source: &SourceArgs, output: &Path, emit: EmitFormat, print: bool) -> Result<()> {
    use colored::*;

    let module = source.compile()?.module;

    let contents = match emit {
        EmitFormat::Text => IrEmitter::default().emit_module(&module),
        EmitFormat::Json => ir_persist::module_to_json(&module)?,
    };
    fs::write(output, &contents)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if print {
        let rendered = match emit {
            EmitFormat::Text if std::io::stdout().is_terminal() => {
                IrEmitter::new(EmitterConfig::terminal()).emit_module(&module)
            }
            _ => contents,
        };
        print!("{}", rendered);
    }

    eprintln!(
        "{} wrote {}",
        "SUCCESS:".bright_green().bold(),
        output.display()
    );
    Ok(())
}

fn cmd_run(source: &SourceArgs, step_limit: usize) -> Result<()> {
    let Compiled {
        options, module, ..
    } = source.compile()?;
    let entry = options.entry_function;

    let outcome = Interpreter::new(&module)
        .with_step_limit(step_limit)
        .run(&entry)
        .with_context(|| format!("Execution of %{} failed", entry))?;

    print!("{}", outcome.output);
    tracing::info!(steps = outcome.steps, result = ?outcome.return_value, "finished");
    Ok(())
}

fn cmd_check(source: &SourceArgs) -> Result<()> {
    use colored::*;

    match source.compile() {
        Ok(Compiled { name, module, .. }) => {
            let blocks: usize = module
                .defined_functions()
                .filter_map(|f| f.body.as_ref())
                .map(|b| b.blocks.len())
                .sum();
            println!("{} {}", "VALID".bright_green().bold(), name);
            tracing::info!(blocks, strings = module.strings.len(), "verified");
            Ok(())
        }
        Err(e) => {
            println!("{}", "INVALID".bright_red().bold());
            Err(e)
        }
    }
}
