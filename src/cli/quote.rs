use colored::Colorize;
use divfeed::api;
use tabled::settings::{
    Alignment, Color,
    object::{Columns, Object, Rows},
};

use super::{format_percent, format_value};

#[derive(clap::Args)]
pub struct QuoteCommand {
    #[arg(required = true, help = "ETF symbols, e.g. SCHD JEPI")]
    symbols: Vec<String>,
}

impl QuoteCommand {
    pub async fn exec(&self) {
        match api::batch_quotes(&self.symbols).await {
            Ok(quotes) => {
                let mut table_data: Vec<Vec<String>> = vec![vec![
                    "".to_string(),
                    "Price".to_string(),
                    "Change".to_string(),
                    "Change %".to_string(),
                    "Currency".to_string(),
                    "Exchange".to_string(),
                ]];

                let mut symbols: Vec<&String> = quotes.keys().collect();
                symbols.sort();

                for symbol in symbols {
                    let quote = &quotes[symbol];
                    let change_pct = match (quote.price_change, quote.previous_close) {
                        (Some(change), Some(previous)) if previous > 0.0 => {
                            Some(change / previous * 100.0)
                        }
                        _ => None,
                    };

                    table_data.push(vec![
                        symbol.to_string(),
                        format_value(quote.price),
                        format_value(quote.price_change),
                        format_percent(change_pct),
                        quote.currency.clone().unwrap_or("-".to_string()),
                        quote.exchange.clone().unwrap_or("-".to_string()),
                    ]);
                }

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
                table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
                table.modify(Columns::new(1..4), Alignment::right());
                println!("{table}");
            }
            Err(err) => {
                println!("[!] {}", err.to_string().red());
            }
        }
    }
}
