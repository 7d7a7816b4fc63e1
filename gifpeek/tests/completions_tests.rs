// ABOUTME: Tests for shell completion generation functionality
// ABOUTME: Ensures completions cover every gifpeek subcommand for all supported shells

use clap::CommandFactory;
use gifpeek::cli::Cli;
use gifpeek::completions::{generate_completions, Shell};
use std::io::Cursor;

fn completions_for(shell: Shell) -> String {
    let mut output = Cursor::new(Vec::new());
    let mut cmd = Cli::command();
    generate_completions(shell, &mut cmd, &mut output).expect("Should generate completions");
    String::from_utf8(output.into_inner()).expect("Should be valid UTF-8")
}

#[test]
fn test_completion_shell_parsing() {
    assert_eq!("BASH".parse::<Shell>().unwrap(), Shell::Bash);
    assert_eq!("Zsh".parse::<Shell>().unwrap(), Shell::Zsh);
    assert!("invalid".parse::<Shell>().is_err());
}

#[test]
fn test_bash_completion_generation() {
    let output = completions_for(Shell::Bash);
    assert!(output.contains("_gifpeek"));
    for command in ["browse", "still", "sheet", "info", "completions"] {
        assert!(output.contains(command), "bash completions missing {command}");
    }
}

#[test]
fn test_zsh_completion_generation() {
    let output = completions_for(Shell::Zsh);
    assert!(output.contains("#compdef gifpeek"));
    assert!(output.contains("browse"));
}

#[test]
fn test_fish_completion_generation() {
    let output = completions_for(Shell::Fish);
    assert!(output.contains("complete -c gifpeek"));
    assert!(output.contains("sheet"));
}

#[test]
fn test_powershell_completion_generation() {
    let output = completions_for(Shell::PowerShell);
    assert!(output.contains("Register-ArgumentCompleter"));
    assert!(output.contains("gifpeek"));
}

#[test]
fn test_global_flags_are_completed() {
    let output = completions_for(Shell::Bash);
    assert!(output.contains("--config"));
    assert!(output.contains("--log-file"));
}
