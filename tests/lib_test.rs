//! Library integration tests.

use bite::BiteError;

#[test]
fn error_types_are_public() {
    let err = BiteError::UnknownSetting {
        key: "sound.volume".into(),
    };
    assert!(err.to_string().contains("sound.volume"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> bite::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use bite::cli::{Cli, Commands};
    use clap::Parser;

    let cli = Cli::parse_from(["bite", "status", "--json"]);

    if let Some(Commands::Status(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn cargo_toml_has_release_profile() {
    let cargo_toml = include_str!("../Cargo.toml");
    assert!(cargo_toml.contains("[profile.release]"));
    assert!(cargo_toml.contains("lto = true"));
}
