use clap::Subcommand;

mod chart;
mod config;
mod dividends;
mod quote;
mod returns;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show price history of ETFs side by side")]
    Chart(Box<chart::ChartCommand>),

    #[command(subcommand, about = "Show or set configurations")]
    Config(Box<config::ConfigCommand>),

    #[command(about = "Show split-adjusted dividend history and yield")]
    #[clap(visible_aliases = &["div"])]
    Dividends(Box<dividends::DividendsCommand>),

    #[command(about = "Show latest quotes")]
    #[clap(visible_aliases = &["q"])]
    Quote(Box<quote::QuoteCommand>),

    #[command(about = "Show trailing returns")]
    Returns(Box<returns::ReturnsCommand>),
}

fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or("-".to_string())
}

fn format_percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or("-".to_string())
}
