use colored::Colorize;
use divfeed::api;
use tabled::settings::{Color, object::Columns};

#[derive(clap::Args)]
pub struct ConfigSetCommand {
    #[arg(help = "One of api_base, max_retries, initial_backoff_ms")]
    key: String,

    value: String,
}

impl ConfigSetCommand {
    pub async fn exec(&self) {
        if let Err(err) = api::set_config(&self.key, &self.value).await {
            println!("[!] {}", err.to_string().red());
            return;
        }

        match api::get_config().await {
            Ok(config) => {
                let key = self.key.to_lowercase();
                let table_data: Vec<Vec<String>> = config
                    .entries()
                    .into_iter()
                    .filter(|(k, _)| *k == key)
                    .map(|(k, v)| vec![k.to_string(), v])
                    .collect();

                let mut table = tabled::builder::Builder::from_iter(&table_data).build();
                table.modify(Columns::first(), Color::FG_CYAN);
                println!("{table}");
                println!("{}", "Takes effect on the next run".bright_black());
            }
            Err(err) => {
                println!("[!] {}", err.to_string().red());
            }
        }
    }
}
