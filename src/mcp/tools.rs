//! The MCP tools. Each one is a thin wrapper around a view command.

use crate::args::{
    AnnualArgs, OptionsArgs, RankingArgs, SeriesArgs, StatesArgs, TableArgs, TrendArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::SalesServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl SalesServer {
    #[tool]
    /// Initialize the sales MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// List the categories, sub-categories and years present in the dataset. Pass `categories`
    /// to list only the sub-categories that belong to them.
    #[tool]
    async fn filter_options(
        &self,
        Parameters(args): Parameters<OptionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: filter_options called");
        tool_result(commands::options(&self.session, args).await)
    }

    /// Total profit (or quantity, with `metric`) per U.S. state, with the two-letter state code
    /// of each state for map rendering. States without a code are listed in `unmapped`.
    #[tool]
    async fn state_totals(
        &self,
        Parameters(args): Parameters<StatesArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: state_totals called");
        tool_result(commands::states(&self.session, args).await)
    }

    /// Profit per year and category, with `year_order` for the x axis and `category_order`
    /// (categories by total profit, highest first unless `ascending`) for the bar grouping.
    #[tool]
    async fn annual_profit(
        &self,
        Parameters(args): Parameters<AnnualArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: annual_profit called");
        tool_result(commands::annual(&self.session, args).await)
    }

    /// Profit per calendar month (Jan..Dec, all years combined). Series are categories, or
    /// sub-categories when `sub_categories` restricts them. `window` applies a trailing moving
    /// average per series. The result includes the peak month of each series and passes
    /// `line_shape` and `markers` through as rendering hints.
    #[tool]
    async fn monthly_trend(
        &self,
        Parameters(args): Parameters<TrendArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: monthly_trend called");
        tool_result(commands::trend(&self.session, args).await)
    }

    /// Profit per year, month, category and sub-category, ordered by year then month. With
    /// `export`, the table is also written as CSV to the exports directory and the path is
    /// included in the message.
    #[tool]
    async fn profit_table(
        &self,
        Parameters(args): Parameters<TableArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: profit_table called");
        tool_result(commands::table(&self.session, args).await)
    }

    /// Totals of `metric` per value of the `key` dimension, ordered by total (highest first
    /// unless `ascending`).
    #[tool]
    async fn ranking(
        &self,
        Parameters(args): Parameters<RankingArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: ranking called");
        tool_result(commands::ranking(&self.session, args).await)
    }

    /// Profit per Year-Month in chronological order. `split` draws one series per value of a
    /// dimension such as `category`; `window` applies a trailing moving average per series.
    #[tool]
    async fn year_month_series(
        &self,
        Parameters(args): Parameters<SeriesArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: year_month_series called");
        tool_result(commands::series(&self.session, args).await)
    }

    /// Reload the dataset from disk. The dataset is reloaded automatically when the file
    /// changes; use this to force it.
    #[tool]
    async fn reload_dataset(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: reload_dataset called");
        tool_result(commands::reload(&self.session).await)
    }
}
