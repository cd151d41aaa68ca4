//! The view commands. Each loads the dataset through the session, runs one dashboard view and
//! wraps the report in an `Out`.

use crate::args::{
    AnnualArgs, OptionsArgs, RankingArgs, SeriesArgs, StatesArgs, TableArgs, TrendArgs,
};
use crate::commands::{DatasetSummary, Out, Session};
use crate::dashboard::{
    self, AnnualProfit, FilterOptions, LineStyle, MonthlyTrend, ProfitTable, Ranking,
    StateTotals, YearMonthSeries,
};
use crate::exports::PROFIT_TABLE;
use crate::pipeline::{to_csv_string, EmptyReason, FilterCriteria};
use crate::{utils, Result};
use anyhow::Context;
use tracing::info;

/// The message for a view: the empty reason if there is one, otherwise `summary`.
fn message(empty: Option<EmptyReason>, summary: impl FnOnce() -> String) -> String {
    match empty {
        Some(reason) => reason.to_string(),
        None => summary(),
    }
}

fn criteria(session: &Session, filters: &crate::args::FilterArgs) -> Result<FilterCriteria> {
    filters.criteria(session.config().empty_selection())
}

/// Lists the values that can be selected in each filter.
pub async fn options(session: &Session, args: OptionsArgs) -> Result<Out<FilterOptions>> {
    let dataset = session.dataset().await?;
    let options = dashboard::filter_options(dataset.records(), &args.selection());
    Ok(Out::new(
        format!(
            "{} categories, {} sub-categories, {} years",
            options.categories.len(),
            options.sub_categories.len(),
            options.years.len()
        ),
        options,
    ))
}

/// Totals per state.
pub async fn states(session: &Session, args: StatesArgs) -> Result<Out<StateTotals>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let totals = dashboard::state_totals(dataset.records(), &criteria, args.metric)?;
    let msg = message(totals.empty, || {
        format!("Total {} for {} states", args.metric, totals.rows.len())
    });
    Ok(Out::new(msg, totals))
}

/// Profit per year and category.
pub async fn annual(session: &Session, args: AnnualArgs) -> Result<Out<AnnualProfit>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let annual = dashboard::annual_profit(dataset.records(), &criteria, args.ascending)?;
    let msg = message(annual.empty, || {
        format!(
            "Profit for {} categories over {} years",
            annual.category_order.len(),
            annual.year_order.len()
        )
    });
    Ok(Out::new(msg, annual))
}

/// Profit per calendar month.
pub async fn trend(session: &Session, args: TrendArgs) -> Result<Out<MonthlyTrend>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let style = LineStyle {
        line_shape: args.line_shape,
        markers: args.markers,
    };
    let trend = dashboard::monthly_trend(dataset.records(), &criteria, args.smoothing(), style)?;
    let msg = message(trend.empty, || {
        format!(
            "Monthly profit by {} ({} series, smoothing: {})",
            trend.group,
            trend.peaks.len(),
            trend.smoothing
        )
    });
    Ok(Out::new(msg, trend))
}

/// The profit table, optionally written to a file or a rotated export.
pub async fn table(session: &Session, args: TableArgs) -> Result<Out<ProfitTable>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let table = dashboard::profit_table(dataset.records(), &criteria)?;
    let mut msg = message(table.empty, || format!("{} profit rows", table.table.len()));

    if let Some(path) = &args.output {
        let csv = to_csv_string(&table.table)?;
        utils::write(path, csv)
            .await
            .context("Unable to write the profit table")?;
        info!("Wrote {}", path.display());
        msg.push_str(&format!(". Wrote {}", path.display()));
    }
    if args.export {
        let path = session
            .config()
            .exporter()
            .save_csv(PROFIT_TABLE, &table.table)
            .await?;
        msg.push_str(&format!(". Exported to {}", path.display()));
    }
    Ok(Out::new(msg, table))
}

/// Totals per value of one dimension, ordered by total.
pub async fn ranking(session: &Session, args: RankingArgs) -> Result<Out<Ranking>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let ranking = dashboard::ranking(
        dataset.records(),
        &criteria,
        args.key,
        args.metric,
        args.ascending,
    )?;
    let msg = message(ranking.empty, || {
        format!(
            "{} ranked by total {}",
            ranking.order.len(),
            args.metric
        )
    });
    Ok(Out::new(msg, ranking))
}

/// Profit per Year-Month.
pub async fn series(session: &Session, args: SeriesArgs) -> Result<Out<YearMonthSeries>> {
    let dataset = session.dataset().await?;
    let criteria = criteria(session, &args.filters)?;
    let series =
        dashboard::year_month_series(dataset.records(), &criteria, args.split, args.smoothing())?;
    let msg = message(series.empty, || {
        format!(
            "Profit for {} months (smoothing: {})",
            series.table.len(),
            series.smoothing
        )
    });
    Ok(Out::new(msg, series))
}

/// Reloads the dataset from disk.
pub async fn reload(session: &Session) -> Result<Out<DatasetSummary>> {
    let dataset = session.reload().await?;
    let summary = DatasetSummary::from(dataset.as_ref());
    Ok(Out::new(
        format!(
            "Loaded {} records from {} ({} rows skipped)",
            summary.records,
            summary.path.display(),
            summary.skipped.len()
        ),
        summary,
    ))
}
