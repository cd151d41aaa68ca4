//! These structs provide the CLI interface for the sales CLI. The view argument structs are also
//! the parameter types of the MCP tools, so they derive `Deserialize` and `JsonSchema` as well.

use crate::dashboard::LineShape;
use crate::model::{Dimension, Metric};
use crate::pipeline::{EmptySelectionPolicy, FilterCriteria, Selection, SmoothingSpec};
use crate::render::OutputFormat;
use crate::Result;
use anyhow::anyhow;
use clap::{Parser, Subcommand};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// sales: filter, aggregate and export a sales dataset.
///
/// The dataset is a CSV with the columns Year-Month, Category, Sub-Category, State, Quantity and
/// Profit. Each subcommand runs one dashboard view over it (state totals, annual profit, monthly
/// trend, the profit table, rankings and the Year-Month series) and prints the result as a table,
/// CSV or JSON.
///
/// There is also a mode in which an AI agent can use this program through the mcp subcommand.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its configuration file.
    ///
    /// Run this first. It records the path of your sales CSV in $SALES_HOME/config.json so that
    /// the other commands can find it. By default $SALES_HOME is ~/sales.
    Init(InitArgs),
    /// List the categories, sub-categories and years that can be selected.
    Options(OptionsArgs),
    /// Total profit or quantity per state, with state codes for map rendering.
    States(StatesArgs),
    /// Profit per year and category.
    Annual(AnnualArgs),
    /// Profit per calendar month and category (or sub-category), optionally smoothed.
    Trend(TrendArgs),
    /// Profit per year, month, category and sub-category. Can be exported to CSV.
    Table(TableArgs),
    /// Totals per value of one dimension, ordered by total.
    Ranking(RankingArgs),
    /// Profit per Year-Month in chronological order, optionally split and smoothed.
    Series(SeriesArgs),
    /// Run the MCP server over stdio.
    Mcp(McpArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO, global = true)]
    log_level: LevelFilter,

    /// The directory where configuration and exports are held. Defaults to ~/sales
    #[arg(long, env = "SALES_HOME", default_value_t = default_sales_home(), global = true)]
    sales_home: DisplayPath,

    /// How to print view results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    format: OutputFormat,

    /// Read this CSV instead of the data file named in config.json. Give it before the
    /// subcommand, e.g. `sales --data-file other.csv states`.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl Common {
    pub fn new(log_level: LevelFilter, sales_home: PathBuf) -> Self {
        Self {
            log_level,
            sales_home: sales_home.into(),
            format: OutputFormat::default(),
            data_file: None,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn sales_home(&self) -> &DisplayPath {
        &self.sales_home
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }
}

/// Args for the `sales init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The path to the sales CSV.
    #[arg(long)]
    data_file: PathBuf,
}

impl InitArgs {
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Args for the `sales mcp` command.
#[derive(Debug, Parser, Clone)]
pub struct McpArgs {}

/// The category, sub-category and year selections shared by every view.
///
/// Leaving a selection out means "All". Listing `All` among the values also means "All". Giving
/// the flag with no values (or an empty list over MCP) is an empty selection, which is handled
/// according to the empty selection policy.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct FilterArgs {
    /// Categories to include, e.g. Furniture. Repeatable.
    #[arg(long = "category", num_args = 0..)]
    #[serde(default)]
    pub categories: Option<Vec<String>>,

    /// Sub-categories to include, e.g. Chairs. Repeatable.
    #[arg(long = "sub-category", num_args = 0..)]
    #[serde(default)]
    pub sub_categories: Option<Vec<String>>,

    /// Years to include, e.g. 2023. Repeatable.
    #[arg(long = "year", num_args = 0..)]
    #[serde(default)]
    pub years: Option<Vec<String>>,

    /// 'reject' reports an empty selection as "no data", 'all' treats it as no restriction.
    /// Defaults to the empty_selection setting in config.json.
    #[arg(long, value_enum)]
    #[serde(default)]
    pub empty_selection: Option<EmptySelectionPolicy>,
}

impl FilterArgs {
    /// Builds the criteria, using `default_policy` unless a policy was given.
    pub fn criteria(&self, default_policy: EmptySelectionPolicy) -> Result<FilterCriteria> {
        let text = |choices: &Option<Vec<String>>| match choices {
            None => Selection::All,
            Some(c) => Selection::from_choices(c),
        };
        let years = match &self.years {
            None => Selection::All,
            Some(y) => Selection::from_year_choices(y)
                .map_err(|bad| anyhow!("'{bad}' is not a year"))?,
        };
        Ok(FilterCriteria {
            categories: text(&self.categories),
            sub_categories: text(&self.sub_categories),
            years,
            empty_selection: self.empty_selection.unwrap_or(default_policy),
        })
    }
}

/// Args for `sales options`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct OptionsArgs {
    /// Limit the sub-category list to these categories. Repeatable.
    #[arg(long = "category")]
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

impl OptionsArgs {
    pub fn selection(&self) -> Selection<String> {
        match &self.categories {
            None => Selection::All,
            Some(c) => Selection::from_choices(c),
        }
    }
}

/// Args for `sales states`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct StatesArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// The metric to total: profit or quantity.
    #[arg(long, value_enum, default_value_t = Metric::Profit)]
    #[serde(default)]
    pub metric: Metric,
}

/// Args for `sales annual`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct AnnualArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// Order categories from the lowest total profit instead of the highest.
    #[arg(long)]
    #[serde(default)]
    pub ascending: bool,
}

/// Args for `sales trend`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct TrendArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// Trailing moving-average window in months. 0 or absent means no smoothing.
    #[arg(long)]
    #[serde(default)]
    pub window: Option<usize>,

    /// Rendering hint: how to connect points.
    #[arg(long, value_enum, default_value_t = LineShape::Linear)]
    #[serde(default)]
    pub line_shape: LineShape,

    /// Rendering hint: whether to draw point markers.
    #[arg(long)]
    #[serde(default)]
    pub markers: bool,
}

impl TrendArgs {
    pub fn smoothing(&self) -> SmoothingSpec {
        SmoothingSpec::from_window(self.window.unwrap_or_default())
    }
}

/// Args for `sales table`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct TableArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// Also write the table to $SALES_HOME/exports/profit-table.YYYY-MM-DD-NNN.csv, keeping the
    /// newest export_copies files.
    #[arg(long)]
    #[serde(default)]
    pub export: bool,

    /// Also write the table as CSV to this path.
    #[arg(long)]
    #[serde(skip)]
    pub output: Option<PathBuf>,
}

/// Args for `sales ranking`.
#[derive(Debug, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct RankingArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// The dimension to rank.
    #[arg(long, value_enum, default_value_t = Dimension::Category)]
    #[serde(default = "default_ranking_key")]
    pub key: Dimension,

    /// The metric to total: profit or quantity.
    #[arg(long, value_enum, default_value_t = Metric::Profit)]
    #[serde(default)]
    pub metric: Metric,

    /// Order from the lowest total instead of the highest.
    #[arg(long)]
    #[serde(default)]
    pub ascending: bool,
}

fn default_ranking_key() -> Dimension {
    Dimension::Category
}

/// Args for `sales series`.
#[derive(Debug, Default, Clone, Parser, Serialize, Deserialize, JsonSchema)]
pub struct SeriesArgs {
    #[command(flatten)]
    #[serde(flatten)]
    pub filters: FilterArgs,

    /// Draw one line per value of this dimension, e.g. category.
    #[arg(long, value_enum)]
    #[serde(default)]
    pub split: Option<Dimension>,

    /// Trailing moving-average window in months. 0 or absent means no smoothing.
    #[arg(long)]
    #[serde(default)]
    pub window: Option<usize>,
}

impl SeriesArgs {
    pub fn smoothing(&self) -> SmoothingSpec {
        SmoothingSpec::from_window(self.window.unwrap_or_default())
    }
}

fn default_sales_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("sales"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --sales-home or SALES_HOME instead of relying on the default \
                sales home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("sales")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
