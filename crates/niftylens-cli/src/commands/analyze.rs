use niftylens_core::{
    format_date, parse_date, AnalysisPipeline, AnalysisReport, AnalysisRequest, NiftylensConfig,
    Outcome, TickerAnalysis,
};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{optional_price, price, TextTable};

use super::news::render_news;
use super::CommandResult;

pub async fn run(args: &AnalyzeArgs, config: &NiftylensConfig) -> Result<CommandResult, CliError> {
    let request = build_request(args)?;
    let pipeline = AnalysisPipeline::from_config(config)?;
    let report = pipeline.analyze(&request).await?;

    let warnings = report.warnings();
    let text = render_report(&report, !args.no_news);
    let data = serde_json::to_value(&report)?;
    Ok(CommandResult::ok(data, text).with_warnings(warnings))
}

fn build_request(args: &AnalyzeArgs) -> Result<AnalysisRequest, CliError> {
    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;

    let mut request = AnalysisRequest::new(args.tickers.iter().cloned(), start, end);
    if let Some(window) = args.window {
        request = request.with_window(window);
    }
    for (ticker, window) in &args.window_for {
        request = request.with_window_for(ticker.clone(), *window);
    }
    if args.no_news {
        request = request.without_news();
    }
    Ok(request)
}

fn render_report(report: &AnalysisReport, include_news: bool) -> String {
    let mut text = String::new();
    for analysis in &report.tickers {
        text.push_str(&render_ticker(analysis, report));
        text.push('\n');
    }

    if include_news {
        text.push_str("== News ==\n");
        text.push_str(&render_news(&report.news));
    }
    text
}

fn render_ticker(analysis: &TickerAnalysis, report: &AnalysisReport) -> String {
    let mut text = format!("== {} ({}) ==\n", analysis.ticker, analysis.company);

    match &analysis.outcome {
        Outcome::Success(series) => {
            let mut raw = TextTable::new(["date", "open", "high", "low", "close", "volume"]);
            let mut sma = TextTable::new([
                String::from("date"),
                String::from("close"),
                format!("sma_{}", series.window),
            ]);
            for row in &series.rows {
                let bar = &row.bar;
                let date = format_date(bar.date);
                raw.push(vec![
                    date.clone(),
                    price(bar.open),
                    price(bar.high),
                    price(bar.low),
                    price(bar.close),
                    bar.volume.map(|v| v.to_string()).unwrap_or_else(|| String::from("-")),
                ]);
                sma.push(vec![date, price(bar.close), optional_price(row.sma)]);
            }

            text.push_str("Raw data\n");
            text.push_str(&raw.render());
            text.push_str(&format!("\nClose with {}-day SMA\n", series.window));
            text.push_str(&sma.render());
        }
        Outcome::Empty => {
            text.push_str(&format!(
                "No price data for {} in {}.\n",
                analysis.ticker, report.range
            ));
        }
        Outcome::Failure(error) => {
            text.push_str(&format!("Error: {error}\n"));
        }
    }
    text
}
