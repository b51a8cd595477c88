use super::*;
use clap::CommandFactory;

#[test]
fn help_lists_subcommands() {
    let mut command = Cli::command();
    let help = command.render_long_help().to_string();
    assert!(help.contains("compile"));
    assert!(help.contains("template"));
}

#[test]
fn parses_compile_with_repeated_tools() {
    let cli = Cli::try_parse_from([
        "nibuild",
        "compile",
        "--graph",
        "pipeline.json",
        "--tools",
        "fsl.yaml",
        "--tools",
        "registries/",
        "--out-dir",
        "build",
        "--format",
        "json",
    ])
    .expect("must parse");
    let Commands::Compile(command) = cli.command else {
        panic!("expected compile command");
    };
    assert_eq!(command.graph, PathBuf::from("pipeline.json"));
    assert_eq!(
        command.tools,
        vec![PathBuf::from("fsl.yaml"), PathBuf::from("registries/")]
    );
    assert_eq!(command.out_dir, Some(PathBuf::from("build")));
    assert_eq!(command.format, OutputFormat::Json);
    assert!(!command.verbose);
}

#[test]
fn template_defaults_to_yaml() {
    let cli = Cli::try_parse_from(["nibuild", "template", "--graph", "g.yaml", "--verbose"])
        .expect("must parse");
    let Commands::Template(command) = cli.command else {
        panic!("expected template command");
    };
    assert_eq!(command.format, OutputFormat::Yaml);
    assert!(command.verbose);
    assert!(command.tools.is_empty());
}

#[test]
fn graph_is_required() {
    assert!(Cli::try_parse_from(["nibuild", "compile"]).is_err());
}
