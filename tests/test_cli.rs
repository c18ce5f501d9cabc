use clap::Parser;
use notedit::cli::args::{Args, Command};
use std::path::PathBuf;

#[test]
fn given_no_subcommand_when_parsing_then_fails() {
    // Arrange
    let args = vec!["notedit", "n1"];

    // Act & Assert
    let result = Args::try_parse_from(args);
    assert!(result.is_err(), "Should fail without subcommand");
}

#[test]
fn given_show_command_when_parsing_then_succeeds() {
    // Arrange
    let args = vec!["notedit", "show", "n1"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Show { note_id, json } => {
            assert_eq!(note_id, "n1");
            assert!(!json);
        }
        _ => panic!("Expected Show command"),
    }
    assert_eq!(parsed.config, None);
    assert_eq!(parsed.store, None);
    assert_eq!(parsed.remote, None);
}

#[test]
fn given_new_command_without_notebook_when_parsing_then_fails() {
    // Arrange
    let args = vec!["notedit", "new", "n1"];

    // Act & Assert
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn given_new_command_when_parsing_then_title_defaults_to_empty() {
    // Arrange
    let args = vec!["notedit", "new", "n1", "--notebook", "nb"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::New {
            note_id,
            notebook,
            title,
        } => {
            assert_eq!(note_id, "n1");
            assert_eq!(notebook, "nb");
            assert_eq!(title, "");
        }
        _ => panic!("Expected New command"),
    }
}

#[test]
fn given_edit_command_with_global_flags_when_parsing_then_succeeds() {
    // Arrange - global flags work anywhere when marked as global
    let args = vec![
        "notedit",
        "edit",
        "n1",
        "steps.txt",
        "-s",
        "/tmp/notes",
        "-c",
        "/tmp/notedit.toml",
    ];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    match parsed.command {
        Command::Edit { note_id, script } => {
            assert_eq!(note_id, "n1");
            assert_eq!(script, PathBuf::from("steps.txt"));
        }
        _ => panic!("Expected Edit command"),
    }
    assert_eq!(parsed.store, Some(PathBuf::from("/tmp/notes")));
    assert_eq!(parsed.config, Some(PathBuf::from("/tmp/notedit.toml")));
}

#[test]
fn given_remote_flag_when_parsing_then_stores_url() {
    // Arrange
    let args = vec!["notedit", "-r", "http://localhost:3000", "render", "n1", "-o", "out.html"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert_eq!(parsed.remote.as_deref(), Some("http://localhost:3000"));
    match parsed.command {
        Command::Render { note_id, output } => {
            assert_eq!(note_id, "n1");
            assert_eq!(output, Some(PathBuf::from("out.html")));
        }
        _ => panic!("Expected Render command"),
    }
}

#[test]
fn given_verbose_flag_when_parsing_then_increments_count() {
    // Arrange
    let args = vec!["notedit", "-vv", "show", "n1", "--json"];

    // Act
    let parsed = Args::try_parse_from(args).unwrap();

    // Assert
    assert_eq!(parsed.verbose, 2);
    assert!(matches!(parsed.command, Command::Show { json: true, .. }));
}
