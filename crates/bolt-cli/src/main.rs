use std::env;
use std::fs;
use std::path::PathBuf;

use bolt_core::actions::ChatMessage;
use bolt_core::actions::Role;
use bolt_core::config::EngineConfig;
use bolt_core::parser::StreamParser;
use bolt_core::verify;
use bolt_exec::completion::replay_conversation;
use bolt_exec::contracts::CommandRunner;
use bolt_exec::contracts::FileStore;
use bolt_exec::dispatcher::ArtifactDispatcher;
use bolt_exec::runtime::DiskFileStore;
use bolt_exec::runtime::SequentialCommandQueue;
use bolt_exec::runtime::ShellCommandRunner;
use bolt_exec::runtime::SimulatedCommandRunner;
use bolt_exec::runtime::SimulatedFileStore;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_help();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("boltline {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "apply" => run_apply(parse_options(args.collect())?),
        "check" => run_check(parse_options(args.collect())?),
        "replay" => run_replay(parse_options(args.collect())?),
        _ => {
            print_help();
            Err(format!("unknown command: {command}").into())
        }
    }
}

fn print_help() {
    println!("boltline - executes streamed model artifacts as file writes and shell commands");
    println!();
    println!("usage:");
    println!("  boltline apply  --transcript FILE [--workdir DIR] [--chunk N] [--dry-run]");
    println!("  boltline check  --transcript FILE");
    println!("  boltline replay --transcript FILE [--workdir DIR] [--dry-run]");
    println!();
    println!("options:");
    println!("  --transcript FILE  conversation transcript (JSON array of role/content)");
    println!("  --workdir DIR      directory receiving file writes and running commands");
    println!("  --chunk N          feed assistant messages in N-byte chunks");
    println!("  --dry-run          simulate file writes and commands, print them instead");
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    transcript: Option<PathBuf>,
    workdir: Option<PathBuf>,
    chunk: Option<usize>,
    dry_run: bool,
}

fn parse_options(args: Vec<String>) -> Result<Options, Box<dyn std::error::Error>> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--transcript" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--transcript requires a path".into());
                };
                options.transcript = Some(PathBuf::from(value));
                i += 2;
            }
            "--workdir" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--workdir requires a path".into());
                };
                options.workdir = Some(PathBuf::from(value));
                i += 2;
            }
            "--chunk" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--chunk requires a byte count".into());
                };
                options.chunk = Some(value.parse()?);
                i += 2;
            }
            "--dry-run" => {
                options.dry_run = true;
                i += 1;
            }
            other => {
                return Err(format!("unsupported argument: {other}").into());
            }
        }
    }
    Ok(options)
}

fn load_config() -> EngineConfig {
    let Some(path) = dirs::config_dir().map(|dir| dir.join("boltline/config.toml")) else {
        return EngineConfig::default();
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return EngineConfig::default();
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: ignoring malformed config {}: {err}", path.display());
            EngineConfig::default()
        }
    }
}

fn load_transcript(options: &Options) -> Result<Vec<ChatMessage>, Box<dyn std::error::Error>> {
    let Some(path) = &options.transcript else {
        return Err("--transcript is required".into());
    };
    let raw = fs::read_to_string(path)?;
    let messages: Vec<ChatMessage> = serde_json::from_str(&raw)?;
    Ok(messages)
}

fn run_apply(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    let messages = load_transcript(&options)?;
    let workdir = resolve_workdir(&options, &config);
    let chunk = options.chunk.or(config.chunk);

    if options.dry_run {
        let mut files = SimulatedFileStore::new();
        let mut runner = SimulatedCommandRunner::new();
        apply_messages(&messages, chunk, &mut files, &mut runner)?;
        for (path, _, _) in &files.writes {
            println!("would write {path}");
        }
        for command in &runner.executed {
            println!("would run {command}");
        }
    } else {
        fs::create_dir_all(&workdir)?;
        let mut files = DiskFileStore::new(&workdir);
        let mut runner = shell_runner(&workdir, &config);
        let commands_run = apply_messages(&messages, chunk, &mut files, &mut runner)?;
        println!("applied transcript into {} ({commands_run} command(s) run)", workdir.display());
    }
    Ok(())
}

fn apply_messages(
    messages: &[ChatMessage],
    chunk: Option<usize>,
    files: &mut dyn FileStore,
    runner: &mut dyn CommandRunner,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut parser = StreamParser::new();
    let mut commands_run = 0;
    for (index, message) in messages.iter().enumerate() {
        if message.role != Role::Assistant {
            continue;
        }
        let message_id = format!("msg-{index}");
        let mut dispatcher = ArtifactDispatcher::new(files, runner);
        for end in chunk_boundaries(&message.content, chunk) {
            parser.parse(&message_id, &message.content[..end], &mut dispatcher)?;
        }
        commands_run += dispatcher.commands_run;
    }
    for entry in parser.logs().iter() {
        eprintln!("warning: {}", entry.message);
    }
    Ok(commands_run)
}

// Prefix lengths to feed the parser: every `chunk` bytes rounded up to a
// char boundary, always ending with the full message.
fn chunk_boundaries(text: &str, chunk: Option<usize>) -> Vec<usize> {
    let mut ends = Vec::new();
    if let Some(step) = chunk.filter(|step| *step > 0) {
        let mut end = step.min(text.len());
        while end < text.len() {
            while !text.is_char_boundary(end) {
                end += 1;
            }
            ends.push(end);
            end = (end + step).min(text.len());
        }
    }
    ends.push(text.len());
    ends
}

fn run_check(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let messages = load_transcript(&options)?;
    let mut truncated = 0;
    for (index, message) in messages.iter().enumerate() {
        if message.role != Role::Assistant {
            continue;
        }
        if verify::is_complete(&message.content) {
            println!("message {index}: complete");
        } else {
            println!("message {index}: truncated (artifact left open)");
            truncated += 1;
        }
    }
    if truncated > 0 {
        return Err(format!("{truncated} truncated message(s)").into());
    }
    Ok(())
}

fn run_replay(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    let messages = load_transcript(&options)?;
    let workdir = resolve_workdir(&options, &config);

    let submitted = if options.dry_run {
        let mut runner = SimulatedCommandRunner::new();
        let submitted = {
            let mut queue = SequentialCommandQueue::new(&mut runner);
            replay_conversation(&messages, &mut queue)?
        };
        for command in &runner.executed {
            println!("would run {command}");
        }
        submitted
    } else {
        fs::create_dir_all(&workdir)?;
        let mut runner = shell_runner(&workdir, &config);
        let mut queue = SequentialCommandQueue::new(&mut runner);
        replay_conversation(&messages, &mut queue)?
    };
    println!("replayed {submitted} command(s)");
    Ok(())
}

fn resolve_workdir(options: &Options, config: &EngineConfig) -> PathBuf {
    options
        .workdir
        .clone()
        .or_else(|| config.workdir.clone().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn shell_runner(workdir: &std::path::Path, config: &EngineConfig) -> ShellCommandRunner {
    let runner = ShellCommandRunner::new(workdir);
    match &config.shell {
        Some(shell) => runner.with_shell(shell),
        None => runner,
    }
}
