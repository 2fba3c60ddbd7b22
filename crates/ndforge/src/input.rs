//! File-driven front-ends: a JSON description or a plain-text script, both
//! resolving to the same subcommand invocations as the command line.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;

use crate::cli::{Cmd, ScriptLine};

/// Read a JSON description: a top-level object keyed by subcommand name,
/// each value an array of objects mapping long option names to values.
pub fn from_json_file(path: &Path) -> Result<Vec<Cmd>> {
    let text = read_input(path)?;
    parse_json(&text).with_context(|| format!("in {}", path.display()))
}

/// Read a plain-text script: one subcommand invocation per line,
/// space-separated arguments.
pub fn from_script_file(path: &Path) -> Result<Vec<Cmd>> {
    let text = read_input(path)?;
    parse_script(&text).with_context(|| format!("in {}", path.display()))
}

fn read_input(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("{} cannot be opened", path.display()))?;
    if text.is_empty() {
        bail!("Attempted to read from empty file {}", path.display());
    }
    Ok(text)
}

fn parse_json(text: &str) -> Result<Vec<Cmd>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow!("Expected a top-level object of subcommands"))?;

    let mut cmds = Vec::new();
    for (key, entries) in object {
        let entries = entries
            .as_array()
            .ok_or_else(|| anyhow!("Expected array of objects for key {key}"))?;
        for entry in entries {
            if entry.get("help").is_some() {
                bail!("\"help\" is an invalid option when running from json");
            }
            let cmd = match key.as_str() {
                "na" | "neighbor-advert" => {
                    Cmd::NeighborAdvert(serde_json::from_value(entry.clone())?)
                }
                "ra" | "router-advert" => Cmd::RouterAdvert(serde_json::from_value(entry.clone())?),
                "hd" => Cmd::Hd(serde_json::from_value(entry.clone())?),
                other => bail!("Unknown command: {other}"),
            };
            cmds.push(cmd);
        }
    }
    Ok(cmds)
}

fn parse_script(text: &str) -> Result<Vec<Cmd>> {
    let mut cmds = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = ScriptLine::try_parse_from(line.split_whitespace())
            .map_err(|err| anyhow!("could not parse line {}: {line}\n{err}", lineno + 1))?;
        cmds.push(parsed.command);
    }
    Ok(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_na_batch() {
        let cmds = parse_json(
            r#"{
                "na": [
                    {
                        "interface": "eth0",
                        "dst-mac": "33:33:00:00:00:01",
                        "dst-ip": "ff02::1",
                        "src-ip": "fe80::1",
                        "repeat": 3,
                        "timeout": 1
                    },
                    {
                        "interface": "eth0",
                        "dst-mac": "52:54:00:aa:bb:cc",
                        "dst-ip": "fe80::2",
                        "src-ip": "fe80::1"
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cmds.len(), 2);
        let Cmd::NeighborAdvert(first) = &cmds[0] else {
            panic!("expected na");
        };
        assert_eq!(first.repeat, 3);
        assert_eq!(first.timeout, 1);
    }

    #[test]
    fn test_json_ra_and_hd() {
        let cmds = parse_json(
            r#"{
                "ra": [{"interface": "eth0", "router-ip": "fe80::dead", "prefix": 48}],
                "hd": [{"interface": "eth0"}]
            }"#,
        )
        .unwrap();
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().any(|c| matches!(c, Cmd::RouterAdvert(o) if o.prefix == 48)));
        assert!(cmds.iter().any(|c| matches!(c, Cmd::Hd(o) if o.timeout == 5)));
    }

    #[test]
    fn test_json_help_rejected() {
        let err = parse_json(r#"{"na": [{"help": true}]}"#).unwrap_err();
        assert!(err.to_string().contains("invalid option"));
    }

    #[test]
    fn test_json_unknown_command_rejected() {
        assert!(parse_json(r#"{"nonsense": []}"#).is_err());
    }

    #[test]
    fn test_json_unknown_option_rejected() {
        let res = parse_json(
            r#"{"hd": [{"interface": "eth0", "frobnicate": 1}]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_script_lines() {
        let cmds = parse_script(
            "na -i eth0 -d 33:33:00:00:00:01 -D ff02::1 -S fe80::1\n\
             \n\
             ra -i eth0 -R fe80::dead -r -1 -z 2\n",
        )
        .unwrap();
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], Cmd::NeighborAdvert(_)));
        assert!(matches!(&cmds[1], Cmd::RouterAdvert(o) if o.repeat == -1));
    }

    #[test]
    fn test_script_bad_line_reports_position() {
        let err = parse_script("na -i eth0\nbogus --nope\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
