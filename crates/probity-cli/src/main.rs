use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use probity_expect::ExpectationMatcher;
use probity_harness::{fixtures, Harness, HarnessConfig, Platform, ScenarioRegistry};
use probity_identity::{ResourceIdentity, SchemaCatalog};
use probity_manifest::{wrap_node, EnsureState, ManifestRenderer, PropertyMap};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("probity")
        .version(probity_harness::VERSION)
        .about("Declarative resource acceptance: manifests, identities and introspection checks")
        .subcommand_required(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log output format (filter with RUST_LOG)"),
        )
        .subcommand(
            Command::new("render")
                .about("Render a resource manifest")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .required(true)
                        .help("Resource type, e.g. cisco_bgp"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .default_value("")
                        .help("Resource title"),
                )
                .arg(
                    Arg::new("prop")
                        .long("prop")
                        .action(ArgAction::Append)
                        .value_parser(parse_pair)
                        .help("Property as key=value (repeatable)"),
                )
                .arg(
                    Arg::new("absent")
                        .long("absent")
                        .action(ArgAction::SetTrue)
                        .help("Render ensure => absent"),
                )
                .arg(
                    Arg::new("node")
                        .long("node")
                        .num_args(0..=1)
                        .default_missing_value("default")
                        .help("Wrap in a node definition"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check introspection output for expected properties")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .value_parser(value_parser!(PathBuf))
                        .help("File with `puppet resource` output (default: stdin)"),
                )
                .arg(
                    Arg::new("expect")
                        .long("expect")
                        .required(true)
                        .action(ArgAction::Append)
                        .value_parser(parse_pair)
                        .help("Expected property as key=value (repeatable)"),
                )
                .arg(
                    Arg::new("absent")
                        .long("absent")
                        .action(ArgAction::SetTrue)
                        .help("Expect every pair to be absent"),
                )
                .arg(
                    Arg::new("literal")
                        .long("literal")
                        .action(ArgAction::SetTrue)
                        .help("Treat '*' in values literally"),
                ),
        )
        .subcommand(Command::new("scenarios").about("List registered scenarios"))
        .subcommand(
            Command::new("run")
                .about("Run scenarios against the simulated agent")
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .action(ArgAction::Append)
                        .help("Scenario id (repeatable; default: all)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("platform")
                        .long("platform")
                        .value_parser(["nexus", "ios_xr"])
                        .help("Override the configured platform"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output reports as JSON"),
                ),
        )
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn pairs(args: &ArgMatches, id: &str) -> PropertyMap {
    args.get_many::<(String, String)>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn init_tracing(format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn render(args: &ArgMatches) -> Result<String> {
    let resource_type = args.get_one::<String>("type").context("missing --type")?;
    let title = args.get_one::<String>("title").map_or("", String::as_str);
    let props = pairs(args, "prop");
    let ensure = if args.get_flag("absent") {
        EnsureState::Absent
    } else {
        EnsureState::Present
    };

    let renderer = ManifestRenderer::new();
    let catalog = SchemaCatalog::builtin();
    let block = match catalog.get(resource_type) {
        Ok(schema) => {
            let identity = ResourceIdentity::compose(schema, title, &props)
                .with_context(|| format!("cannot compose {resource_type} '{title}'"))?;
            renderer.render(&identity, ensure, &props)
        }
        Err(_) => {
            tracing::warn!(
                "no identity schema for '{}' (known: {}); title rendered as given",
                resource_type,
                catalog.resource_types().collect::<Vec<_>>().join(", ")
            );
            renderer.render_block(resource_type, title, ensure, &props)
        }
    };

    Ok(match args.get_one::<String>("node") {
        Some(node) => wrap_node(node, &block),
        None => block,
    })
}

fn check(args: &ArgMatches) -> Result<bool> {
    let output = match args.get_one::<PathBuf>("input") {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            text
        }
    };
    let matcher = if args.get_flag("literal") {
        ExpectationMatcher::literal()
    } else {
        ExpectationMatcher::new()
    };

    let result = matcher.matches(&output, &pairs(args, "expect"), !args.get_flag("absent"));
    println!("{}", result.summary());
    Ok(result.passed())
}

fn load_config(args: &ArgMatches) -> Result<HarnessConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => HarnessConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    match args.get_one::<String>("platform").map(String::as_str) {
        Some("nexus") => config.platform = Platform::Nexus,
        Some("ios_xr") => config.platform = Platform::IosXr,
        Some(other) => bail!("unknown platform '{other}'"),
        None => {}
    }
    Ok(config)
}

fn run(args: &ArgMatches) -> Result<bool> {
    let config = load_config(args)?;
    let registry = ScenarioRegistry::with_builtins();
    let ids: Vec<String> = match args.get_many::<String>("scenario") {
        Some(ids) => ids.cloned().collect(),
        None => registry.ids().into_iter().map(str::to_string).collect(),
    };
    let scenarios = registry.resolve_all(&ids, &config)?;

    let mut reports = Vec::with_capacity(scenarios.len());
    for scenario in &scenarios {
        let mut harness = Harness::new(config.clone(), fixtures::simulated_agent(&config));
        reports.push(harness.run_scenario(scenario));
    }

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{report}\n");
        }
    }
    Ok(reports.iter().all(probity_harness::ScenarioReport::passed))
}

fn dispatch(matches: &ArgMatches) -> Result<bool> {
    match matches.subcommand() {
        Some(("render", args)) => {
            print!("{}", render(args)?);
            Ok(true)
        }
        Some(("check", args)) => check(args),
        Some(("scenarios", _)) => {
            for (id, description) in ScenarioRegistry::with_builtins().entries() {
                println!("{id:<34} {description}");
            }
            Ok(true)
        }
        Some(("run", args)) => run(args),
        _ => bail!("no subcommand given"),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-format").map_or("text", String::as_str));

    match dispatch(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn matches(argv: &[&str]) -> ArgMatches {
        cli().try_get_matches_from(argv).unwrap()
    }

    fn sub<'a>(m: &'a ArgMatches, name: &str) -> &'a ArgMatches {
        m.subcommand_matches(name).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn pair_parsing() {
        assert_eq!(parse_pair("vrf=red").unwrap(), ("vrf".to_string(), "red".to_string()));
        assert_eq!(parse_pair("k=a=b").unwrap().1, "a=b");
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn render_expands_title() {
        let m = matches(&[
            "probity", "render", "--type", "cisco_pim_grouplist", "--title", "ipv4 red",
            "--prop", "rp_addr=44.44.44.44", "--prop", "group=226.0.0.0/8", "--node",
        ]);
        assert_eq!(
            render(sub(&m, "render")).unwrap(),
            "node 'default' {\n  cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':\n    ensure => present,\n    rp_addr => '44.44.44.44',\n    group => '226.0.0.0/8',\n  }\n}\n"
        );
    }

    #[test]
    fn render_absent_drops_properties() {
        let m = matches(&["probity", "render", "--type", "cisco_bgp", "--title", "2 blue", "--prop", "shutdown=true", "--absent"]);
        assert_eq!(render(sub(&m, "render")).unwrap(), "cisco_bgp { '2 blue':\n  ensure => absent,\n}\n");
    }

    #[test]
    fn render_reports_missing_field() {
        let m = matches(&["probity", "render", "--type", "cisco_bgp", "--title", "2"]);
        let err = render(sub(&m, "render")).unwrap_err();
        assert!(format!("{err:#}").contains("vrf"));
    }

    #[test]
    fn check_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "cisco_bgp {{ '2 default':\n  ensure => 'present',\n  shutdown => 'false',\n}}\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let m = matches(&["probity", "check", "--input", &path, "--expect", "ensure=present", "--expect", "shutdown=false"]);
        assert!(check(sub(&m, "check")).unwrap());

        let m = matches(&["probity", "check", "--input", &path, "--expect", "shutdown=true"]);
        assert!(!check(sub(&m, "check")).unwrap());
    }

    #[test]
    fn run_unknown_scenario_is_an_error() {
        let m = matches(&["probity", "run", "--scenario", "nope"]);
        assert!(run(sub(&m, "run")).is_err());
    }

    #[test]
    fn run_all_builtins() {
        let m = matches(&["probity", "run", "--platform", "ios_xr"]);
        assert!(run(sub(&m, "run")).unwrap());
    }
}
