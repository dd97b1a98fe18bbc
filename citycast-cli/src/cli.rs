use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use citycast_core::{
    Config, Language, QueryController, WeatherError, WeatherQuery, provider::provider_from_config,
};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeatherMap API key, preferred language and default city.
    Configure,

    /// Show current conditions and the daily forecast for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Language for descriptions and dates ("en" or "fr").
        #[arg(long)]
        lang: Option<Language>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search cities interactively; Esc or Ctrl-C quits.
    Search {
        /// City looked up before the first prompt; defaults to the configured city.
        #[arg(long)]
        city: Option<String>,

        /// Language for descriptions and dates ("en" or "fr").
        #[arg(long)]
        lang: Option<Language>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lang, json } => show(&city, lang, json).await,
            Command::Search { city, lang } => search(city.as_deref(), lang).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let help = if config.api_key.is_some() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://home.openweathermap.org/api_keys"
    };
    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    let default = config.resolve_language(None);
    let cursor = Language::all().iter().position(|l| *l == default).unwrap_or(0);
    let language = Select::new("Preferred language:", Language::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;
    config.language = Some(language);

    let city = Text::new("Default city:")
        .with_default(&config.initial_city(None))
        .with_help_message("Looked up first by `citycast search`")
        .prompt()?;
    config.set_city(&city);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

fn controller(config: &Config) -> anyhow::Result<QueryController> {
    if !config.has_api_key() {
        debug!("No API key configured; the provider will reject the request");
    }
    let provider = provider_from_config(config)?;
    Ok(QueryController::from_config(Arc::from(provider), config))
}

async fn show(city: &str, lang: Option<Language>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let language = config.resolve_language(lang);
    let controller = controller(&config)?;

    let snapshot = controller
        .fetch(WeatherQuery::new(city, language))
        .await
        .map_err(|err| describe(&err))?;

    if json {
        let out = serde_json::to_string_pretty(&*snapshot)
            .context("Failed to serialize weather snapshot")?;
        println!("{out}");
    } else {
        print!("{}", render::snapshot(&snapshot, language));
    }

    Ok(())
}

async fn search(city: Option<&str>, lang: Option<Language>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let language = config.resolve_language(lang);
    let controller = controller(&config)?;

    let prompt = match language {
        Language::En => "City:",
        Language::Fr => "Ville :",
    };

    let mut input = config.initial_city(city);
    loop {
        lookup(&controller, WeatherQuery::new(&input, language), language).await?;

        input = match Text::new(prompt).prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };
    }

    Ok(())
}

async fn lookup(
    controller: &QueryController,
    query: WeatherQuery,
    language: Language,
) -> anyhow::Result<()> {
    if let Some(task) = controller.request(query).await {
        println!("{}", render::loading(language));
        task.await.context("Weather fetch task failed")?;
    }

    if let Some(out) = render::view(&controller.state().view(), language) {
        println!("{out}");
    }

    Ok(())
}

fn describe(err: &WeatherError) -> anyhow::Error {
    match err {
        WeatherError::Network { status: Some(401), message } => anyhow::anyhow!(
            "{message}\nHint: run `citycast configure` or set OPENWEATHERMAP_API_KEY."
        ),
        other => anyhow::anyhow!("{other}"),
    }
}
