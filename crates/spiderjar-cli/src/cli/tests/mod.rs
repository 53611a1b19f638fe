use super::*;


pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_fetch_defaults() {
    let cli = parse(&["spiderjar", "fetch"]);
    assert!(cli.config.is_none());
    match cli.command {
        CliCommand::Fetch { refresh, output } => {
            assert!(!refresh);
            assert_eq!(output, PathBuf::from("spider.jar"));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_refresh_output() {
    match parse(&["spiderjar", "fetch", "--refresh", "-o", "/tmp/x.jar"]).command {
        CliCommand::Fetch { refresh, output } => {
            assert!(refresh);
            assert_eq!(output, PathBuf::from("/tmp/x.jar"));
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_global_config_after_subcommand() {
    let cli = parse(&["spiderjar", "verify", "a.jar", "--config", "/etc/spiderjar.toml"]);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/spiderjar.toml")));
    match cli.command {
        CliCommand::Verify { path } => assert_eq!(path, PathBuf::from("a.jar")),
        _ => panic!("expected Verify"),
    }
}

#[test]
fn cli_parse_serve_bind() {
    match parse(&["spiderjar", "serve", "--bind", "0.0.0.0:8080"]).command {
        CliCommand::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:8080")),
        _ => panic!("expected Serve"),
    }
    match parse(&["spiderjar", "serve"]).command {
        CliCommand::Serve { bind } => assert!(bind.is_none()),
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_completions() {
    match parse(&["spiderjar", "completions", "bash"]).command {
        CliCommand::Completions { shell } => assert_eq!(shell, Shell::Bash),
        _ => panic!("expected Completions"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["spiderjar", "download"]).is_err());
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}
