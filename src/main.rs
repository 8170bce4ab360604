use anyhow::Context;
use clap::{Parser, Subcommand};
use fxsignal::application::analysis_service::{AnalysisRequest, AnalysisService};
use fxsignal::config::{Config, Provider};
use fxsignal::domain::analysis::ForecastMethod;
use fxsignal::domain::errors::AnalysisError;
use fxsignal::infrastructure::ServiceFactory;
use rust_decimal::Decimal;
use tracing::info;

#[derive(Parser)]
#[command(name = "fxsignal")]
#[command(about = "Forex technical analysis: indicators, trade signal and next-close forecast", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one currency pair and print the report as JSON
    Analyze {
        /// Currency pair (EUR/USD, EUR_USD or EURUSD)
        #[arg(short, long, default_value = "EUR/USD")]
        pair: String,

        /// Candle timeframe (M1, M5, M15, M30, H1, H4, D1)
        #[arg(short, long, default_value = "H1")]
        timeframe: String,

        /// Number of candles to fetch
        #[arg(long, default_value = "200")]
        periods: usize,

        /// Account capital
        #[arg(long, default_value = "10000")]
        capital: Decimal,

        /// Percent of capital put at risk (0-100]
        #[arg(short, long, default_value = "2")]
        risk: Decimal,

        /// Forecast method: trend, regression or random-walk
        #[arg(short, long, default_value = "regression")]
        forecast: String,

        /// Seed for the random-walk forecast and the mock provider
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Overrides FX_PROVIDER (mock or oanda)
        #[arg(long)]
        provider: Option<Provider>,
    },
}

fn parse_forecast_method(name: &str, seed: u64) -> anyhow::Result<ForecastMethod> {
    match name.to_lowercase().as_str() {
        "trend" => Ok(ForecastMethod::TrendContinuation),
        "regression" => Ok(ForecastMethod::LinearRegression),
        "random-walk" | "random_walk" => Ok(ForecastMethod::SeededRandomWalk { seed }),
        _ => anyhow::bail!(
            "Invalid forecast method: {}. Must be 'trend', 'regression' or 'random-walk'",
            name
        ),
    }
}

fn error_report(error: &AnalysisError) -> serde_json::Value {
    serde_json::json!({
        "error": error.kind(),
        "message": error.to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            pair,
            timeframe,
            periods,
            capital,
            risk,
            forecast,
            seed,
            provider,
        } => {
            if let Some(provider) = provider {
                config.provider.provider = provider;
            }
            let method = parse_forecast_method(&forecast, seed)?;

            let market_data = ServiceFactory::create_market_data(&config.provider, seed)?;
            let service = AnalysisService::new(market_data, config.analysis_settings(method));

            info!(
                "Analyzing {} {} over {} candles (forecast: {})",
                pair, timeframe, periods, method
            );

            let request = AnalysisRequest {
                pair,
                timeframe,
                periods,
                capital,
                risk_percent: risk,
            };
            match service.analyze(&request).await {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&error_report(&e))?);
                    return Err(anyhow::Error::new(e).context("Analysis failed"));
                }
            }
        }
    }

    Ok(())
}
