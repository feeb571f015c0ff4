use colored::Colorize;
use divfeed::api;
use tabled::settings::{
    Alignment, Color,
    object::{Columns, Object, Rows},
};

use super::{format_percent, format_value};

#[derive(clap::Args)]
pub struct ReturnsCommand {
    #[arg(required = true, help = "ETF symbols, e.g. JEPI QYLD")]
    symbols: Vec<String>,
}

impl ReturnsCommand {
    pub async fn exec(&self) {
        let mut table_data: Vec<Vec<String>> = vec![vec![
            "".to_string(),
            "Price".to_string(),
            "1W".to_string(),
            "1M".to_string(),
            "3M".to_string(),
            "6M".to_string(),
            "12M".to_string(),
            "3Y".to_string(),
        ]];

        for symbol in &self.symbols {
            match api::returns(symbol).await {
                Ok(report) => {
                    table_data.push(vec![
                        report.symbol.to_string(),
                        format_value(report.current_price),
                        format_percent(report.price_return_1_wk),
                        format_percent(report.price_return_1_mo),
                        format_percent(report.price_return_3_mo),
                        format_percent(report.price_return_6_mo),
                        format_percent(report.price_return_12_mo),
                        format_percent(report.price_return_3_yr),
                    ]);
                }
                Err(err) => {
                    println!("[{symbol}][!] {}", err.to_string().red());
                }
            }
        }

        let mut table = tabled::builder::Builder::from_iter(&table_data).build();
        table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
        table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
        table.modify(Columns::new(1..), Alignment::right());
        println!("{table}");
    }
}
