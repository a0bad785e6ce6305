use std::path::PathBuf;
use std::str::FromStr;

use blocklog::{ConfigStore, EventStore, FilterSet};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod config;
mod query;
mod teleport;
mod update;

use config::{ensure_db_path, run_change_db, run_set_auto_update};
use query::run_query;
use teleport::run_teleport;
use update::{UpdateCheck, run_self_update};

#[derive(Parser)]
#[command(
    name = "blocklog",
    version,
    about = "Query a block-change audit log (co_block / co_user / co_world)",
    long_about = None,
    after_help = "Examples:\n  blocklog --teleport 100 200 300 5   move to (100, 200, 300) in world 5\n  blocklog --teleport 5               switch to world 5, keep coordinates\n  blocklog --teleport                 show the current position\n  blocklog -r 10                      events within 10 blocks\n  blocklog -u Brain -a b+             placements by user \"Brain\""
)]
pub struct Cli {
    /// Set a new database path (prompts when PATH is omitted) and exit
    #[arg(long = "change-db", value_name = "PATH", num_args = 0..=1)]
    change_db: Option<Option<PathBuf>>,
    /// Only events by this user name or numeric user id
    #[arg(
        short = 'u',
        long = "user",
        value_name = "NAME_OR_ID",
        allow_hyphen_values = true
    )]
    user: Option<String>,
    /// Only events of an action class: b+ (placed), b- (removed), b (both), b* (anything else)
    #[arg(short = 'a', long = "action", value_name = "ACTION")]
    action: Option<String>,
    /// Only events within RADIUS blocks of the current position
    #[arg(short = 'r', long = "radius", value_name = "RADIUS", allow_negative_numbers = true)]
    radius: Option<f64>,
    /// Move the query origin: X Y Z [WORLD], WORLD, or nothing to show the current position
    #[arg(
        long = "teleport",
        value_name = "X Y Z WORLD",
        num_args = 0..=4,
        allow_negative_numbers = true
    )]
    teleport_args: Option<Vec<String>>,
    #[arg(skip)]
    teleport: Option<Vec<i64>>,
    /// Turn the startup update check on and exit
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "disable_auto_update")]
    enable_auto_update: bool,
    /// Turn the startup update check off and exit
    #[arg(long, action = ArgAction::SetTrue)]
    disable_auto_update: bool,
    /// Download the latest release next to the state directory and exit
    #[arg(long, action = ArgAction::SetTrue)]
    self_update: bool,
    /// Verbose logging, including the composed SQL
    #[arg(long, action = ArgAction::SetTrue)]
    debug: bool,
    /// Print events as a JSON array
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Shorthand filters: r:<radius>
    #[arg(value_name = "FILTER")]
    shorthand: Vec<ShorthandArg>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShorthandArg {
    Radius(f64),
}

impl FromStr for ShorthandArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some(("r", value)) => value
                .trim()
                .parse::<f64>()
                .map(ShorthandArg::Radius)
                .map_err(|_| format!("radius must be a number, got '{}'", value)),
            _ => Err(format!("unknown filter '{}', expected r:<radius>", s)),
        }
    }
}

impl Cli {
    /// Moves non-integer tokens that clap attached to `--teleport` over to
    /// the shorthand filters.
    fn finish(mut self) -> Result<Self, String> {
        if let Some(raw) = self.teleport_args.take() {
            let split = raw
                .iter()
                .position(|v| v.parse::<i64>().is_err())
                .unwrap_or(raw.len());
            let (values, rest) = raw.split_at(split);

            let values = values
                .iter()
                .map(|v| v.parse::<i64>().map_err(|e| e.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            for token in rest {
                self.shorthand.push(token.parse()?);
            }
            self.teleport = Some(values);
        }
        Ok(self)
    }

    /// A bare `--teleport` only reports the position; no query follows.
    fn runs_query(&self) -> bool {
        !matches!(self.teleport.as_deref(), Some([]))
    }

    fn radius(&self) -> Option<f64> {
        self.radius.or_else(|| {
            self.shorthand.iter().rev().find_map(|arg| match arg {
                ShorthandArg::Radius(r) => Some(*r),
            })
        })
    }
}

pub fn run() {
    let cli = match Cli::parse().finish() {
        Ok(cli) => cli,
        Err(msg) => Cli::command().error(ErrorKind::ValueValidation, msg).exit(),
    };
    init_tracing(cli.debug);
    if let Err(err) = dispatch(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "blocklog=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), String> {
    let mut config = ConfigStore::open_default().map_err(|e| e.to_string())?;

    if let Some(path) = cli.change_db.clone() {
        return run_change_db(&mut config, path);
    }
    if cli.enable_auto_update || cli.disable_auto_update {
        return run_set_auto_update(&mut config, cli.enable_auto_update);
    }
    if cli.self_update {
        return run_self_update(&config);
    }

    let update_check = UpdateCheck::spawn(&config);

    let db_path = ensure_db_path(&mut config)?;
    let store = EventStore::open(&db_path).map_err(|e| e.to_string())?;

    if let Some(values) = cli.teleport.as_deref() {
        run_teleport(values, &mut config, &store)?;
    }
    if !cli.runs_query() {
        update_check.report();
        return Ok(());
    }

    let mut filters = FilterSet::new(config.coordinates());
    filters.radius = cli.radius();
    filters.user = cli.user.clone();
    filters.action = cli.action.clone();

    run_query(&store, &filters, cli.json)?;

    update_check.report();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("blocklog").chain(args.iter().copied()))
            .unwrap()
            .finish()
            .unwrap()
    }

    #[test]
    fn parses_filters() {
        let cli = parse(&["-u", "Brain", "-a", "b-", "-r", "12.5"]);
        assert_eq!(cli.user.as_deref(), Some("Brain"));
        assert_eq!(cli.action.as_deref(), Some("b-"));
        assert_eq!(cli.radius(), Some(12.5));
        assert!(cli.teleport.is_none());
    }

    #[test]
    fn teleport_takes_zero_to_four_values() {
        assert_eq!(parse(&["--teleport"]).teleport, Some(vec![]));
        assert_eq!(parse(&["--teleport", "5"]).teleport, Some(vec![5]));
        assert_eq!(
            parse(&["--teleport", "100", "-64", "300", "2"]).teleport,
            Some(vec![100, -64, 300, 2])
        );
        assert!(
            Cli::try_parse_from(["blocklog", "--teleport", "1", "2", "3", "4", "5"]).is_err()
        );
    }

    #[test]
    fn shorthand_radius() {
        assert_eq!(parse(&["r:25"]).radius(), Some(25.0));
        assert_eq!(parse(&["-r", "3", "r:25"]).radius(), Some(3.0));
        assert!(Cli::try_parse_from(["blocklog", "x:1"]).is_err());
        assert!(Cli::try_parse_from(["blocklog", "r:far"]).is_err());
    }

    #[test]
    fn shorthand_after_teleport_values() {
        let cli = parse(&["--teleport", "5", "r:10"]);
        assert_eq!(cli.teleport, Some(vec![5]));
        assert_eq!(cli.radius(), Some(10.0));

        let cli = parse(&["--teleport", "1", "-2", "3", "r:4"]);
        assert_eq!(cli.teleport, Some(vec![1, -2, 3]));
        assert_eq!(cli.radius(), Some(4.0));

        let cli = parse(&["--teleport", "r:7"]);
        assert_eq!(cli.teleport, Some(vec![]));
        assert_eq!(cli.radius(), Some(7.0));

        let raw = Cli::try_parse_from(["blocklog", "--teleport", "5", "x:1"]).unwrap();
        assert!(raw.finish().is_err());
    }

    #[test]
    fn bare_teleport_skips_the_query() {
        assert!(!parse(&["--teleport"]).runs_query());
        assert!(!parse(&["--teleport", "-u", "Brain"]).runs_query());
        assert!(parse(&["--teleport", "5"]).runs_query());
        assert!(parse(&["--teleport", "5", "r:10"]).runs_query());
        assert!(parse(&["-r", "3"]).runs_query());
    }

    #[test]
    fn user_accepts_leading_hyphen() {
        assert_eq!(parse(&["-u", "-5"]).user.as_deref(), Some("-5"));
        assert_eq!(parse(&["-u", "-dash"]).user.as_deref(), Some("-dash"));
    }

    #[test]
    fn negative_radius_parses() {
        assert_eq!(parse(&["-r", "-4"]).radius(), Some(-4.0));
    }

    #[test]
    fn change_db_value_is_optional() {
        assert_eq!(parse(&["--change-db"]).change_db, Some(None));
        assert_eq!(
            parse(&["--change-db", "/tmp/core.db"]).change_db,
            Some(Some(PathBuf::from("/tmp/core.db")))
        );
    }

    #[test]
    fn auto_update_toggles_conflict() {
        assert!(
            Cli::try_parse_from(["blocklog", "--enable-auto-update", "--disable-auto-update"])
                .is_err()
        );
    }
}
