//! CLI argument definitions for liquiscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the browser dashboard |
//! | `symbols` | List symbols in the cache |
//! | `view` | Render one dashboard selection as JSON |
//! | `alert` | Send a Telegram alert |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--cache` | `$LIQUISCOPE_CACHE` or `liquidity_cache.duckdb` | Cache file |
//! | `--table` | `$LIQUISCOPE_CACHE_TABLE` or `asset_data` | Cache table |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--full-history` | `false` | Show all rows when no dates are picked |
//!
//! # Examples
//!
//! ```bash
//! liquiscope symbols --pretty
//! liquiscope view 2330.TW --start 2024-01-02 --end 2024-03-29
//! liquiscope serve --port 8050
//! liquiscope alert "*AAA* z-score above 2"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use liquiscope_core::ThemeMode;

/// Liquidity and price dashboard over a local cache.
#[derive(Debug, Parser)]
#[command(name = "liquiscope", author, version, about = "Liquidity and price dashboard")]
pub struct Cli {
    /// Path to the DuckDB cache file.
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Cache table holding asset records.
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Show the full history of a symbol when neither date is set.
    ///
    /// Also enabled by LIQUISCOPE_FULL_HISTORY=1.
    #[arg(long, global = true, default_value_t = false)]
    pub full_history: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the browser dashboard.
    ///
    /// Flags override LIQUISCOPE_HOST, LIQUISCOPE_PORT and LIQUISCOPE_CORS.
    Serve(ServeArgs),

    /// List the symbols available in the cache.
    Symbols,

    /// Render the charts and table for one selection.
    ///
    /// Without a symbol, or without both dates, the output is empty.
    View(ViewArgs),

    /// Send a message to the configured Telegram chat.
    ///
    /// Reads TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID. Exits 7 when the
    /// message is not delivered.
    Alert(AlertArgs),
}

/// Arguments for the `serve` command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind to.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Allow cross-origin API calls.
    #[arg(long, default_value_t = false)]
    pub cors: bool,
}

/// Arguments for the `view` command.
#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Symbol exactly as stored in the cache (e.g. 2330.TW).
    pub symbol: Option<String>,

    /// First day of the window, YYYY-MM-DD.
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the window, YYYY-MM-DD.
    #[arg(long)]
    pub end: Option<String>,

    /// Chart theme.
    #[arg(long, value_enum, default_value_t = ThemeArg::Dark)]
    pub theme: ThemeArg,
}

/// Arguments for the `alert` command.
#[derive(Debug, Args)]
pub struct AlertArgs {
    /// Message text (Markdown).
    pub message: String,
}

/// Theme options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for ThemeMode {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Dark => Self::Dark,
            ThemeArg::Light => Self::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_with_global_flags() {
        let cli = Cli::try_parse_from([
            "liquiscope",
            "view",
            "2330.TW",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-04",
            "--theme",
            "light",
            "--pretty",
            "--cache",
            "/tmp/cache.duckdb",
        ])
        .expect("valid args");

        assert!(cli.pretty);
        assert_eq!(cli.cache, Some(PathBuf::from("/tmp/cache.duckdb")));
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        assert_eq!(args.symbol.as_deref(), Some("2330.TW"));
        assert_eq!(ThemeMode::from(args.theme), ThemeMode::Light);
    }

    #[test]
    fn view_symbol_is_optional() {
        let cli = Cli::try_parse_from(["liquiscope", "view"]).expect("valid args");
        let Command::View(args) = cli.command else {
            panic!("expected view");
        };
        assert!(args.symbol.is_none());
        assert_eq!(args.theme, ThemeArg::Dark);
    }

    #[test]
    fn alert_requires_message() {
        assert!(Cli::try_parse_from(["liquiscope", "alert"]).is_err());
    }
}
