use colored::Colorize;
use divfeed::{api, utils::datetime::epoch_secs_to_date_str};
use tabled::settings::{
    Alignment, Color,
    object::{Columns, Object, Rows},
};

use super::{format_percent, format_value};

#[derive(clap::Args)]
pub struct ChartCommand {
    #[arg(required = true, help = "ETF symbols, e.g. SCHD VYM")]
    symbols: Vec<String>,

    #[arg(
        short = 't',
        long = "timeframe",
        default_value = "1Y",
        help = "One of 1D, 1W, 1M, 3M, 6M, YTD, 1Y, 3Y, 5Y, 10Y, 20Y, MAX, the default value is 1Y"
    )]
    timeframe: String,

    #[arg(long = "points", help = "List every chart point instead of a summary")]
    points: bool,
}

impl ChartCommand {
    pub async fn exec(&self) {
        if self.points {
            self.exec_points().await;
            return;
        }

        match api::comparison_charts(&self.symbols, &self.timeframe).await {
            Ok(charts) => {
                let mut table_data: Vec<Vec<String>> = vec![vec![
                    "".to_string(),
                    "Points".to_string(),
                    "From".to_string(),
                    "To".to_string(),
                    "First".to_string(),
                    "Last".to_string(),
                    "Change".to_string(),
                ]];

                for symbol in &charts.symbols {
                    let Some(series) = charts.data.get(symbol) else {
                        continue;
                    };

                    if series.is_empty() {
                        table_data.push(vec![
                            symbol.to_string(),
                            "0".to_string(),
                            "-".to_string(),
                            "-".to_string(),
                            "-".to_string(),
                            "-".to_string(),
                            "-".to_string(),
                        ]);
                        continue;
                    }

                    let first = series.closes.first().copied();
                    let last = series.last_close();
                    let change = match (first, last) {
                        (Some(first), Some(last)) if first > 0.0 => {
                            Some((last - first) / first * 100.0)
                        }
                        _ => None,
                    };

                    table_data.push(vec![
                        symbol.to_string(),
                        series.len().to_string(),
                        series
                            .timestamps
                            .first()
                            .and_then(|ts| epoch_secs_to_date_str(*ts))
                            .unwrap_or("-".to_string()),
                        series
                            .timestamps
                            .last()
                            .and_then(|ts| epoch_secs_to_date_str(*ts))
                            .unwrap_or("-".to_string()),
                        format_value(first),
                        format_value(last),
                        format_percent(change),
                    ]);
                }

                println!("[Timeframe] {}", charts.timeframe);

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
                table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
                table.modify(Columns::new(1..), Alignment::right());
                println!("{table}");
            }
            Err(err) => {
                println!("[!] {}", err.to_string().red());
            }
        }
    }

    async fn exec_points(&self) {
        for symbol in &self.symbols {
            match api::etf_chart(symbol, &self.timeframe).await {
                Ok(etf) => {
                    let mut table_data: Vec<Vec<String>> = vec![vec![
                        "Date".to_string(),
                        "Open".to_string(),
                        "High".to_string(),
                        "Low".to_string(),
                        "Close".to_string(),
                    ]];
                    for point in &etf.data {
                        table_data.push(vec![
                            epoch_secs_to_date_str(point.timestamp).unwrap_or("-".to_string()),
                            format_value(Some(point.open)),
                            format_value(Some(point.high)),
                            format_value(Some(point.low)),
                            format_value(Some(point.close)),
                        ]);
                    }

                    println!("[{}] {} points", etf.symbol.cyan(), etf.data.len());

                    let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                    table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
                    table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
                    table.modify(Columns::new(1..), Alignment::right());
                    println!("{table}");
                }
                Err(err) => {
                    println!("[{symbol}][!] {}", err.to_string().red());
                }
            }
        }
    }
}
