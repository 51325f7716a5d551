use super::*;

#[test]
fn test_parses_stats_increment_with_global_flags() {
    let cli = Cli::try_parse_from([
        "study",
        "stats",
        "increment",
        "documentsProcessed",
        "--remote",
        "memory",
    ])
    .unwrap();

    assert_eq!(cli.remote, Some(RemoteArg::Memory));
    match cli.command {
        Command::Stats {
            action: StatsAction::Increment { stat },
        } => assert_eq!(stat, "documentsProcessed"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_chat_joins_trailing_words() {
    let cli = Cli::try_parse_from(["study", "chat", "what", "is", "entropy?"]).unwrap();
    match cli.command {
        Command::Chat { message } => assert_eq!(message.join(" "), "what is entropy?"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_signup_requires_confirmation() {
    let result = Cli::try_parse_from([
        "study",
        "signup",
        "--email",
        "a@b.co",
        "--password",
        "secret1",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_config_flag_accepted_before_command() {
    let cli = Cli::try_parse_from(["study", "--config", "/tmp/study.yaml", "dashboard"]).unwrap();
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/study.yaml"))
    );
    assert!(matches!(cli.command, Command::Dashboard));
}

#[test]
fn test_remote_arg_maps_to_kind() {
    assert_eq!(RemoteKind::from(RemoteArg::File), RemoteKind::File);
    assert_eq!(RemoteKind::from(RemoteArg::Memory), RemoteKind::Memory);
}
