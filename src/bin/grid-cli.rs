use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use grid_console::api::{ApiResponse, BrokerType, GridApiClient, GridCalculationMode, Id, ImageBlob, NewStrategy};
use grid_console::config::{load_or_default, validate_api, BaseUrlMode, ConfigError, ConsoleConfig};
use grid_console::observability::logging;

#[derive(Parser)]
#[command(name = "grid-cli")]
#[command(about = "Command-line client for the grid trading backend", long_about = None)]
struct Cli {
    /// Console config file; only its [api] section is used.
    #[arg(short, long, env = "GRID_CONSOLE_CONFIG")]
    config: Option<PathBuf>,

    /// Fixed backend base URL, e.g. http://localhost:8080/api.
    #[arg(long, env = "GRID_CONSOLE_API_BASE")]
    api_base: Option<String>,

    /// Host the backend shares with the console (same-host policy).
    #[arg(long, env = "GRID_CONSOLE_API_HOST")]
    host: Option<String>,

    /// Backend port for the same-host policy.
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all strategies
    List,
    /// Show one strategy
    Get { id: Id },
    /// Show a strategy with its grid lines
    Detail { id: Id },
    /// Create a strategy
    Create {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        base_price: f64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount_per_grid: Option<f64>,
        #[arg(long)]
        quantity_per_grid: Option<f64>,
    },
    /// Show the grid plan of a strategy
    GridPlans { strategy_id: Id },
    /// Submit a price tick
    Tick { strategy_id: Id, price: f64 },
    /// Adjust a grid line's planned buy price
    PlanBuyPrice { grid_line_id: Id, price: f64 },
    /// Record a grid line's actual buy price
    ActualBuyPrice { grid_line_id: Id, price: f64 },
    /// List trade records of a strategy
    Trades { strategy_id: Id },
    /// Set the fee of a trade record
    Fee { trade_id: Id, fee: f64 },
    /// Show the accumulated fee of a strategy
    TotalFee { strategy_id: Id },
    /// Recognize broker screenshots for a strategy
    OcrRecognize {
        #[arg(long)]
        strategy_id: Id,
        #[arg(long, default_value = BrokerType::EASTMONEY)]
        broker: String,
        files: Vec<PathBuf>,
    },
    /// Import confirmed OCR records (JSON file with strategyId and records)
    OcrImport { file: PathBuf },
    /// Create a strategy from broker screenshots
    OcrImportCreate {
        #[arg(long, default_value = BrokerType::EASTMONEY)]
        broker: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        mode: Option<String>,
        files: Vec<PathBuf>,
    },
    /// Re-run matching on OCR records (JSON array file)
    OcrRematch {
        #[arg(long)]
        strategy_id: Id,
        records: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    logging::init(&config.observability);

    let client = GridApiClient::from_config(&config.api, cli.host.as_deref())?;

    let res = match cli.command {
        Commands::List => client.list_strategies().await?,
        Commands::Get { id } => client.get_strategy(id).await?,
        Commands::Detail { id } => client.get_strategy_detail(id).await?,
        Commands::Create {
            symbol,
            base_price,
            name,
            amount_per_grid,
            quantity_per_grid,
        } => {
            let body = NewStrategy {
                name,
                symbol,
                base_price,
                amount_per_grid,
                quantity_per_grid,
            };
            client.create_strategy(&body).await?
        }
        Commands::GridPlans { strategy_id } => client.get_grid_lines(strategy_id).await?,
        Commands::Tick { strategy_id, price } => client.execute_tick(strategy_id, price).await?,
        Commands::PlanBuyPrice { grid_line_id, price } => {
            client.update_plan_buy_price(grid_line_id, price).await?
        }
        Commands::ActualBuyPrice { grid_line_id, price } => {
            client.update_actual_buy_price(grid_line_id, price).await?
        }
        Commands::Trades { strategy_id } => client.get_trade_records(strategy_id).await?,
        Commands::Fee { trade_id, fee } => client.update_trade_fee(trade_id, fee).await?,
        Commands::TotalFee { strategy_id } => client.get_total_fee(strategy_id).await?,
        Commands::OcrRecognize {
            strategy_id,
            broker,
            files,
        } => {
            let blobs = read_images(&files).await?;
            client
                .ocr_recognize(blobs, strategy_id, &BrokerType::new(broker))
                .await?
        }
        Commands::OcrImport { file } => {
            let data = read_json(&file).await?;
            client.ocr_import(&data).await?
        }
        Commands::OcrImportCreate {
            broker,
            name,
            symbol,
            mode,
            files,
        } => {
            let blobs = read_images(&files).await?;
            let mode = mode.map(GridCalculationMode::new);
            client
                .ocr_import_and_create_strategy(
                    blobs,
                    &BrokerType::new(broker),
                    name.as_deref(),
                    symbol.as_deref(),
                    mode.as_ref(),
                )
                .await?
        }
        Commands::OcrRematch {
            strategy_id,
            records,
        } => {
            let records = match read_json(&records).await? {
                Value::Array(items) => items,
                other => vec![other],
            };
            client.ocr_rematch(strategy_id, &records).await?
        }
    };

    print_response(&res)?;
    Ok(())
}

/// Config file (or defaults) with the command-line overrides applied and the
/// `[api]` section re-validated.
fn load_config(cli: &Cli) -> Result<ConsoleConfig, ConfigError> {
    let mut config = load_or_default(cli.config.as_deref())?;

    if let Some(base) = &cli.api_base {
        config.api.policy = BaseUrlMode::Fixed;
        config.api.base_url = base.clone();
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }
    if let Some(secs) = cli.timeout_secs {
        config.api.timeout_secs = secs;
    }

    validate_api(&config.api).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageBlob>, Box<dyn std::error::Error>> {
    let mut blobs = Vec::with_capacity(paths.len());
    for path in paths {
        blobs.push(ImageBlob::read(path).await?);
    }
    Ok(blobs)
}

async fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn print_response(res: &ApiResponse) -> Result<(), Box<dyn std::error::Error>> {
    if res.is_empty() {
        println!("{}", res.status());
        return Ok(());
    }

    match res.json::<Value>() {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", res.text()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_buy_price() {
        let cli = Cli::try_parse_from(["grid-cli", "--host", "10.0.0.2", "plan-buy-price", "42", "10.5"]).unwrap();
        assert_eq!(cli.host.as_deref(), Some("10.0.0.2"));
        match cli.command {
            Commands::PlanBuyPrice { grid_line_id, price } => {
                assert_eq!(grid_line_id, Id::Num(42));
                assert_eq!(price, 10.5);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_overrides_are_validated() {
        let cli = Cli::try_parse_from(["grid-cli", "--timeout-secs", "0", "list"]).unwrap();
        assert!(matches!(load_config(&cli), Err(ConfigError::Validation(_))));

        let cli = Cli::try_parse_from(["grid-cli", "--port", "0", "list"]).unwrap();
        assert!(matches!(load_config(&cli), Err(ConfigError::Validation(_))));

        let cli = Cli::try_parse_from(["grid-cli", "--api-base", "not a url", "list"]).unwrap();
        assert!(matches!(load_config(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::try_parse_from([
            "grid-cli",
            "--api-base",
            "http://10.0.0.2:8080/api",
            "--timeout-secs",
            "3",
            "list",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.api.policy, BaseUrlMode::Fixed);
        assert_eq!(config.api.base_url, "http://10.0.0.2:8080/api");
        assert_eq!(config.api.timeout_secs, 3);
    }

    #[test]
    fn test_parse_ocr_recognize_defaults_broker() {
        let cli = Cli::try_parse_from(["grid-cli", "ocr-recognize", "--strategy-id", "3", "a.png", "b.png"]).unwrap();
        match cli.command {
            Commands::OcrRecognize { strategy_id, broker, files } => {
                assert_eq!(strategy_id, Id::Num(3));
                assert_eq!(broker, "EASTMONEY");
                assert_eq!(files.len(), 2);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
