use colored::Colorize;
use divfeed::{
    api,
    utils::financial::{calc_annual_dividend, calc_average_dividend, calc_forward_yield},
};
use tabled::settings::{
    Alignment, Color,
    object::{Columns, Object, Rows},
};

use super::{format_percent, format_value};

#[derive(clap::Args)]
pub struct DividendsCommand {
    #[arg(help = "ETF symbol, e.g. SCHD")]
    symbol: String,

    #[arg(
        short = 'p',
        long = "payments",
        default_value_t = 4,
        help = "Dividend payments per year, the default value is 4"
    )]
    payments_per_year: u32,

    #[arg(
        long = "price",
        help = "Price to compute the forward yield with, the latest quote is used if absent"
    )]
    price: Option<f64>,

    #[arg(
        short = 'n',
        long = "last",
        default_value_t = 12,
        help = "Number of most recent payments to list, the default value is 12"
    )]
    last: usize,
}

impl DividendsCommand {
    pub async fn exec(&self) {
        match api::dividend_history(&self.symbol).await {
            Ok(history) => {
                if history.dividends.is_empty() {
                    println!("[!] No dividend found for '{}'", history.symbol.yellow());
                    return;
                }

                let mut table_data: Vec<Vec<String>> =
                    vec![vec!["Date".to_string(), "Dividend".to_string()]];
                let skip = history.dividends.len().saturating_sub(self.last);
                for record in history.dividends.iter().skip(skip) {
                    table_data.push(vec![record.date.to_string(), format!("{:.4}", record.dividend)]);
                }

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Rows::first(), Color::FG_BRIGHT_BLACK);
                table.modify(Columns::first().not(Rows::first()), Color::FG_CYAN);
                table.modify(Columns::new(1..), Alignment::right());
                println!("{table}");

                let price = match self.price {
                    Some(price) => Some(price),
                    None => match api::quote(&history.symbol).await {
                        Ok(quote) => quote.price,
                        Err(err) => {
                            println!("[!] {}", err.to_string().red());
                            None
                        }
                    },
                };

                let average = calc_average_dividend(&history.dividends, self.payments_per_year);
                let annual = calc_annual_dividend(average, Some(self.payments_per_year));
                let forward_yield = calc_forward_yield(annual, price, None);

                println!(
                    "[Average] {} \t [Annual] {} \t [Price] {} \t [Forward Yield] {}",
                    format_value(average),
                    format_value(annual),
                    format_value(price),
                    format_percent(forward_yield).green()
                );
            }
            Err(err) => {
                println!("[!] {}", err.to_string().red());
            }
        }
    }
}
