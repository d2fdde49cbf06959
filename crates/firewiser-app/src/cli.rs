//! Command-line flags.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};

use firewiser_core::enums::HouseholdProfile;

pub const DEFAULT_RUN_SECONDS: f64 = 20.0;

pub const USAGE: &str = "\
Usage: firewiser [--scenario <path>] [--profile <name>] [--seconds <n>] [--seed <n>]

  --scenario <path>   scenario JSON (defaults to the built-in Malibu scenario)
  --profile <name>    parent | elderly | pet-owner | mobility-impaired
  --seconds <n>       how long to run the map session
  --seed <n>          override the scenario seed";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub scenario: Option<PathBuf>,
    pub profile: HouseholdProfile,
    pub seconds: f64,
    pub seed: Option<u64>,
    pub help: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            scenario: None,
            profile: HouseholdProfile::default(),
            seconds: DEFAULT_RUN_SECONDS,
            seed: None,
            help: false,
        }
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> anyhow::Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} needs a value"))
}

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => cli.scenario = Some(PathBuf::from(value(args, i, "--scenario")?)),
            "--profile" => {
                let name = value(args, i, "--profile")?;
                cli.profile = HouseholdProfile::parse(name)
                    .ok_or_else(|| anyhow!("unknown household profile: {name}"))?;
            }
            "--seconds" => {
                let raw = value(args, i, "--seconds")?;
                cli.seconds = raw
                    .parse()
                    .with_context(|| format!("invalid --seconds value: {raw}"))?;
                if !cli.seconds.is_finite() || cli.seconds < 0.0 {
                    bail!("--seconds must be a non-negative number");
                }
            }
            "--seed" => {
                let raw = value(args, i, "--seed")?;
                cli.seed = Some(
                    raw.parse()
                        .with_context(|| format!("invalid --seed value: {raw}"))?,
                );
            }
            "help" | "--help" | "-h" => {
                cli.help = true;
                i += 1;
                continue;
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 2;
    }
    Ok(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&args(&[
            "--scenario",
            "malibu.json",
            "--profile",
            "pet-owner",
            "--seconds",
            "7.5",
            "--seed",
            "9",
        ]))
        .unwrap();
        assert_eq!(cli.scenario, Some(PathBuf::from("malibu.json")));
        assert_eq!(cli.profile, HouseholdProfile::PetOwner);
        assert_eq!(cli.seconds, 7.5);
        assert_eq!(cli.seed, Some(9));
        assert!(!cli.help);
    }

    #[test]
    fn test_help_flag() {
        assert!(parse(&args(&["--help"])).unwrap().help);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&args(&["--seed"])).is_err());
        assert!(parse(&args(&["--seed", "x"])).is_err());
        assert!(parse(&args(&["--seconds", "-1"])).is_err());
        assert!(parse(&args(&["--profile", "astronaut"])).is_err());
        assert!(parse(&args(&["--fast"])).is_err());
    }
}
