//! Command-line surface. The same option structs back the JSON and script
//! front-ends, so every surface shares one set of names, types and defaults.

use std::net::Ipv6Addr;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use nf_packet::Mac;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "ndforge",
    version,
    disable_version_flag = true,
    about = "IPv6 address spoofing with the Neighbor Discovery Protocol"
)]
pub struct Cli {
    /// Print the version number
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Parse input from the provided json file
    #[arg(short = 'j', long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Parse input from the provided text file
    #[arg(short = 'x', long, value_name = "FILE")]
    pub execute: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Send ICMPv6 Neighbor Advertisement messages to the given address
    #[command(name = "na", alias = "neighbor-advert")]
    NeighborAdvert(NaOpts),

    /// Send ICMPv6 Router Advertisement messages to the given address
    #[command(name = "ra", alias = "router-advert")]
    RouterAdvert(RaOpts),

    /// Hijack the default route
    Hd(HdOpts),
}

#[derive(Args, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NaOpts {
    /// Network interface that will be used to send packets
    #[arg(short, long)]
    pub interface: String,

    /// Source address for the ethernet frame (defaults to the interface
    /// hardware address)
    #[arg(short = 's', long)]
    #[serde(default)]
    pub src_mac: Option<Mac>,

    /// Destination address for the ethernet frame
    #[arg(short = 'd', long)]
    pub dst_mac: Mac,

    /// Link layer address used for the target address option of the
    /// advertisement (defaults to the source mac)
    #[arg(short = 't', long)]
    #[serde(default)]
    pub target_mac: Option<Mac>,

    /// Source ipv6 address in the IPv6 header
    #[arg(short = 'S', long)]
    pub src_ip: Ipv6Addr,

    /// Destination ipv6 address in the IPv6 header
    #[arg(short = 'D', long)]
    pub dst_ip: Ipv6Addr,

    /// Target address of the Neighbor Advertisement (defaults to the source
    /// ip)
    #[arg(short = 'T', long)]
    #[serde(default)]
    pub target_ip: Option<Ipv6Addr>,

    /// Accepted for compatibility; a Neighbor Advertisement carries no prefix
    #[arg(short = 'p', long, hide = true)]
    #[serde(default)]
    pub prefix: Option<u8>,

    /// Send the packet <num> times (-1 repeats forever)
    #[arg(short = 'r', long, default_value_t = 0, allow_hyphen_values = true)]
    #[serde(default)]
    pub repeat: i64,

    /// Wait <seconds> before sending the packet again
    #[arg(short = 'z', long, default_value_t = 0)]
    #[serde(default)]
    pub timeout: i64,
}

#[derive(Args, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RaOpts {
    /// Network interface that will be used to send packets
    #[arg(short, long)]
    pub interface: String,

    /// Source address for the ethernet frame (defaults to the interface
    /// hardware address)
    #[arg(short = 's', long)]
    #[serde(default)]
    pub src_mac: Option<Mac>,

    /// Destination address for the ethernet frame (defaults to the all-nodes
    /// multicast address together with --dst-ip)
    #[arg(short = 'd', long)]
    #[serde(default)]
    pub dst_mac: Option<Mac>,

    /// Source ipv6 address in the IPv6 header (defaults to the router ip)
    #[arg(short = 'S', long)]
    #[serde(default)]
    pub src_ip: Option<Ipv6Addr>,

    /// Destination ipv6 address in the IPv6 header
    #[arg(short = 'D', long)]
    #[serde(default)]
    pub dst_ip: Option<Ipv6Addr>,

    /// Link layer address used for the source link-layer option of the
    /// advertisement (defaults to the source mac)
    #[arg(short = 't', long)]
    #[serde(default)]
    pub target_mac: Option<Mac>,

    /// Ipv6 address of the router to spoof
    #[arg(short = 'R', long)]
    pub router_ip: Ipv6Addr,

    /// Length of the advertised prefix
    #[arg(short = 'p', long, default_value_t = 64)]
    #[serde(default = "default_prefix")]
    pub prefix: u8,

    /// Router lifetime advertised to victims
    #[arg(short = 'l', long, default_value_t = 0)]
    #[serde(default)]
    pub lifetime: u16,

    /// Send the packet <num> times (-1 repeats forever)
    #[arg(short = 'r', long, default_value_t = 0, allow_hyphen_values = true)]
    #[serde(default)]
    pub repeat: i64,

    /// Wait <seconds> before sending the packet again
    #[arg(short = 'z', long, default_value_t = 0)]
    #[serde(default)]
    pub timeout: i64,
}

fn default_prefix() -> u8 {
    64
}

#[derive(Args, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HdOpts {
    /// Network interface that will be used to listen and reply
    #[arg(short, long)]
    pub interface: String,

    /// Wait <seconds> before answering the same router again
    #[arg(short = 'z', long, default_value_t = 5)]
    #[serde(default = "default_hd_timeout")]
    pub timeout: i64,
}

fn default_hd_timeout() -> i64 {
    5
}

/// One line of a `--execute` script: a bare subcommand invocation.
#[derive(Parser, Debug)]
#[command(name = "ndforge", no_binary_name = true)]
pub struct ScriptLine {
    #[command(subcommand)]
    pub command: Cmd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_na_required_and_defaults() {
        let cli = Cli::try_parse_from([
            "ndforge", "na", "-i", "eth0", "-d", "33:33:00:00:00:01", "-D", "ff02::1", "-S",
            "fe80::1",
        ])
        .unwrap();
        let Some(Cmd::NeighborAdvert(opts)) = cli.command else {
            panic!("expected na");
        };
        assert_eq!(opts.interface, "eth0");
        assert_eq!(opts.repeat, 0);
        assert_eq!(opts.timeout, 0);
        assert!(opts.src_mac.is_none());
        assert!(opts.target_ip.is_none());
    }

    #[test]
    fn test_na_missing_dst_mac_rejected() {
        let res = Cli::try_parse_from(["ndforge", "na", "-i", "eth0", "-D", "ff02::1", "-S", "fe80::1"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_long_option_with_equals() {
        let cli = Cli::try_parse_from([
            "ndforge",
            "ra",
            "--interface=eth0",
            "--router-ip=fe80::dead",
            "--prefix=48",
            "--lifetime=1800",
        ])
        .unwrap();
        let Some(Cmd::RouterAdvert(opts)) = cli.command else {
            panic!("expected ra");
        };
        assert_eq!(opts.prefix, 48);
        assert_eq!(opts.lifetime, 1800);
    }

    #[test]
    fn test_subcommand_long_alias() {
        let cli = Cli::try_parse_from([
            "ndforge",
            "router-advert",
            "-i",
            "eth0",
            "-R",
            "fe80::1",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Cmd::RouterAdvert(_))));
    }

    #[test]
    fn test_negative_repeat_accepted() {
        let cli = Cli::try_parse_from([
            "ndforge", "ra", "-i", "eth0", "-R", "fe80::1", "-r", "-1", "-z", "2",
        ])
        .unwrap();
        let Some(Cmd::RouterAdvert(opts)) = cli.command else {
            panic!("expected ra");
        };
        assert_eq!(opts.repeat, -1);
        assert_eq!(opts.timeout, 2);
    }

    #[test]
    fn test_hd_defaults() {
        let cli = Cli::try_parse_from(["ndforge", "hd", "-i", "eth0"]).unwrap();
        let Some(Cmd::Hd(opts)) = cli.command else {
            panic!("expected hd");
        };
        assert_eq!(opts.timeout, 5);
    }

    #[test]
    fn test_bad_mac_rejected() {
        let res = Cli::try_parse_from([
            "ndforge", "na", "-i", "eth0", "-d", "33:33:0:0:0:1", "-D", "ff02::1", "-S", "fe80::1",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_script_line_grammar() {
        let line = ScriptLine::try_parse_from(
            "na -i eth0 -d 33:33:00:00:00:01 -D ff02::1 -S fe80::1 -r 3".split_whitespace(),
        )
        .unwrap();
        assert!(matches!(line.command, Cmd::NeighborAdvert(_)));
    }
}
