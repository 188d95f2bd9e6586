use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BIN_NAME: &str = "folder-rename";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install folder-rename binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run folder-rename with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to folder-rename")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run every test suite"))
                .subcommand(Command::new("core").about("Run tests for folder-rename-core"))
                .subcommand(Command::new("bin").about("Run tests for folder-rename-bin"))
                .subcommand(Command::new("cli").about("Smoke test the built binary"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _args)) => cargo(&["install", "--path", "crates/folder-rename-bin"], "Install"),
        Some(("run", args)) => handle_run_command(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn handle_run_command(args: &ArgMatches) -> Result<()> {
    let mut run_args = vec!["run".to_string(), "--bin".to_string(), BIN_NAME.to_string(), "--".to_string()];
    if let Some(values) = args.get_many::<String>("args") {
        run_args.extend(values.cloned());
    }

    let status = process::Command::new("cargo").args(&run_args).status()?;
    if !status.success() {
        anyhow::bail!("Failed to run {BIN_NAME}");
    }
    Ok(())
}

type Suite = (&'static str, fn() -> Result<()>);

const SUITES: &[Suite] = &[
    ("core", test_core),
    ("bin", test_bin),
    ("workspace", test_workspace),
    ("docs", test_docs),
    ("cli", test_cli),
];

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => test_core(),
        Some(("bin", _args)) => test_bin(),
        Some(("cli", _args)) => test_cli(),
        _ => {
            println!("Available test commands: all, core, bin, cli");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    let mut failed = Vec::new();

    for (name, suite) in SUITES {
        println!("🧪 Running {name} tests...");
        match suite() {
            Ok(()) => println!("✅ {name} tests passed\n"),
            Err(e) => {
                println!("❌ {name} tests failed: {e}\n");
                failed.push(*name);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Test suites failed: {}", failed.join(", "));
    }
    println!("🎉 All tests passed successfully!");
    Ok(())
}

fn test_core() -> Result<()> {
    cargo(&["test", "--package", "folder-rename-core"], "Core tests")
}

fn test_bin() -> Result<()> {
    cargo(&["test", "--package", "folder-rename-bin"], "Binary tests")
}

fn test_workspace() -> Result<()> {
    cargo(&["test", "--workspace"], "Workspace tests")
}

fn test_docs() -> Result<()> {
    cargo(&["test", "--doc", "--package", "folder-rename-core"], "Documentation tests")
}

fn test_cli() -> Result<()> {
    cargo(&["build", "--bin", BIN_NAME], "Binary build")?;
    cargo(&["run", "--bin", BIN_NAME, "--", "--version"], "CLI version command")?;
    cargo(&["run", "--bin", BIN_NAME, "--", "rename", "--help"], "CLI rename help command")?;
    cargo(&["run", "--bin", BIN_NAME, "--", "show", "--help"], "CLI show help command")
}

fn cargo(args: &[&str], what: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;

    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}
