use advisor::{InstructionSource, LlmAdvisor};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use core_types::{AnalysisContext, FinancialSnapshot, Position, TradingAdvice};
use database::DbRepository;
use executor::{Outcome, Portfolio, TradeExecutor};
use futures::future::join_all;
use market_data::{FinancialsClient, MaiRuiClient, NewsClient, QuoteSource};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The main entry point for the Augur analysis application.
#[tokio::main]
async fn main() {
    // Secrets may come from a .env file or the ambient environment; both are fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => {
            if let Err(e) = handle_analyze(args).await {
                eprintln!("Error during analysis: {e:#}");
                std::process::exit(1);
            }
        }
        Commands::History(args) => {
            if let Err(e) = handle_history(args).await {
                eprintln!("Error reading history: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// LLM-assisted stock analysis with a simulated portfolio.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze held positions and market opportunities with the model.
    Analyze(AnalyzeArgs),
    /// Show recently stored analyses.
    History(HistoryArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Available cash for the simulated portfolio (defaults to the configured value).
    #[arg(long)]
    balance: Option<Decimal>,

    /// A pre-existing holding as CODE:QTY:AVG_COST (e.g. "000001:1000:10.50"). Repeatable.
    #[arg(long = "position", value_name = "CODE:QTY:COST")]
    positions: Vec<String>,

    /// Apply parsed advice to the simulated ledger through the trade executor.
    #[arg(long)]
    apply: bool,

    /// Skip the news-driven market scan after the per-position analysis.
    #[arg(long)]
    skip_market_scan: bool,
}

#[derive(Parser)]
struct HistoryArgs {
    /// Only show analyses for this security code.
    #[arg(long)]
    code: Option<String>,

    /// How many rows to show.
    #[arg(long, default_value_t = 10)]
    limit: i64,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// Handles the orchestration of the full analysis flow: per-position
/// analysis, the market scan, and the final ledger rendering.
async fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;

    let balance = args.balance.unwrap_or(config.portfolio.initial_balance);
    let holdings = args
        .positions
        .iter()
        .map(|spec| parse_holding(spec))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let portfolio = Arc::new(Mutex::new(Portfolio::with_holdings(balance, holdings)));

    let quotes = Arc::new(MaiRuiClient::new(&config.market_data));
    let news_client = NewsClient::new(&config.news);
    let financials = FinancialsClient::new(&config.financials);
    let llm_advisor = LlmAdvisor::new(&config.llm);

    let pool = database::connect(&config.storage.db_path).await?;
    database::init_schema(&pool).await?;
    let repo = DbRepository::new(pool);

    let mut trade_executor = TradeExecutor::new(portfolio.clone(), quotes.clone());

    // 1. Analyze each held position.
    let held: Vec<Position> = {
        let ledger = portfolio.lock().expect("portfolio lock poisoned");
        ledger.positions().values().cloned().collect()
    };
    for position in held {
        let code = position.code.clone();
        println!("\n=== Analyzing {code} ===");

        let context = assemble_context(&code, Some(position), &quotes, &news_client, &financials)
            .await;
        repo.save_stock_profile(&context.profile).await?;
        repo.save_news(&context.news, Some(code.as_str())).await?;

        let analysis = match llm_advisor.analyze_position(&context).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(code = %code, error = %e, "Analysis failed, moving on");
                continue;
            }
        };

        println!("\n{}\n", analysis.narrative);
        print_advice(&analysis.advice);
        repo.save_stock_analysis(&analysis, &context.profile.name).await?;

        if args.apply {
            apply_advice(&mut trade_executor, &analysis.advice, &code).await;
        }
    }

    // 2. Scan the market for new opportunities.
    if !args.skip_market_scan {
        println!("\n=== Market scan ===");
        match news_client.daily_news(config.news.min_count).await {
            Ok(daily) => {
                println!("Fetched {} market news articles", daily.len());
                repo.save_news(&daily, None).await?;

                let cash = portfolio
                    .lock()
                    .expect("portfolio lock poisoned")
                    .available_balance();
                match llm_advisor
                    .scan_market(&daily, cash, &quotes, &news_client, &financials)
                    .await
                {
                    Ok(scan) => {
                        println!("\n{}\n", scan.narrative);
                        repo.save_market_analysis(&scan.narrative, cash, scan.timestamp)
                            .await?;
                    }
                    Err(e) => tracing::error!(error = %e, "Market scan failed"),
                }
            }
            Err(e) => tracing::error!(error = %e, "Could not fetch daily news, skipping scan"),
        }
    }

    // 3. Render the final state of the simulated ledger.
    render_portfolio(&portfolio, &quotes).await;

    Ok(())
}

/// Parses one `CODE:QTY:AVG_COST` holding argument.
fn parse_holding(spec: &str) -> anyhow::Result<(String, u64, Decimal)> {
    let parts: Vec<&str> = spec.split(':').collect();
    anyhow::ensure!(
        parts.len() == 3,
        "invalid holding '{spec}', expected CODE:QTY:AVG_COST"
    );
    let quantity: u64 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid quantity in holding '{spec}'"))?;
    let cost: Decimal = parts[2]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid cost in holding '{spec}'"))?;
    Ok((parts[0].to_string(), quantity, cost))
}

/// Gathers everything the advisor wants to know about one security. Missing
/// news or financials degrade to empty context rather than aborting the run.
async fn assemble_context(
    code: &str,
    held: Option<Position>,
    quotes: &MaiRuiClient,
    news_client: &NewsClient,
    financials: &FinancialsClient,
) -> AnalysisContext {
    let profile = quotes.profile(code);

    let (news, snapshot, technicals) = tokio::join!(
        news_client.stock_news(code, &profile.name),
        financials.financial_snapshot(code),
        quotes.technical_summary(code),
    );

    let news = news.unwrap_or_else(|e| {
        tracing::warn!(code, error = %e, "Proceeding without news");
        Vec::new()
    });
    let snapshot = snapshot.unwrap_or_else(|e| {
        tracing::warn!(code, error = %e, "Proceeding without financials");
        FinancialSnapshot::default()
    });
    let technicals = technicals.unwrap_or_else(|e| {
        tracing::warn!(code, error = %e, "Proceeding without technical indicators");
        None
    });

    AnalysisContext {
        profile,
        news,
        financials: snapshot,
        technicals,
        held,
    }
}

/// Runs parsed advice through the trade executor and reports what happened.
async fn apply_advice(trade_executor: &mut TradeExecutor, advice: &TradingAdvice, code: &str) {
    match trade_executor.execute(advice, code).await {
        Ok(Outcome::Filled {
            side,
            fill_price,
            quantity,
        }) => {
            println!("Applied: {side:?} {quantity} x {code} @ {fill_price}");
        }
        Ok(Outcome::Held) => println!("Advice is to hold; ledger unchanged."),
        Err(e) => println!("Advice not applied: {e}"),
    }
}

/// Prints the structured advice block as a table, showing "-" for any field
/// the parser could not extract.
fn print_advice(advice: &TradingAdvice) {
    if advice.is_empty() {
        println!("(no structured advice could be parsed from the response)");
        return;
    }

    fn cell<T: std::fmt::Debug>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map_or_else(|| "-".to_string(), |v| format!("{v:?}"))
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Action".to_string(), cell(&advice.action)]);
    table.add_row(vec![
        "Target price".to_string(),
        advice.price.map_or_else(|| "-".to_string(), |v| v.to_string()),
    ]);
    table.add_row(vec!["Quantity".to_string(), cell(&advice.quantity)]);
    table.add_row(vec![
        "Stop loss".to_string(),
        advice.stop_loss.map_or_else(|| "-".to_string(), |v| v.to_string()),
    ]);
    table.add_row(vec![
        "Take profit".to_string(),
        advice
            .take_profit
            .map_or_else(|| "-".to_string(), |v| v.to_string()),
    ]);
    table.add_row(vec!["Holding period".to_string(), cell(&advice.holding_period)]);
    table.add_row(vec!["Risk level".to_string(), cell(&advice.risk_level)]);
    println!("{table}");
}

/// Renders the ledger: positions marked to market where quotes are available,
/// then the trade history.
async fn render_portfolio(portfolio: &Arc<Mutex<Portfolio>>, quotes: &Arc<MaiRuiClient>) {
    let (cash, positions, history) = {
        let ledger = portfolio.lock().expect("portfolio lock poisoned");
        (
            ledger.available_balance(),
            ledger.positions().clone(),
            ledger.trade_history().to_vec(),
        )
    };

    // Look up all current prices concurrently; a missing quote just leaves
    // that position unvalued.
    let lookups = positions.keys().map(|code| {
        let quotes = quotes.clone();
        let code = code.clone();
        async move {
            let price = quotes.latest_price(&code).await.ok();
            (code, price)
        }
    });
    let prices: HashMap<String, Decimal> = join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(code, price)| price.map(|p| (code, p)))
        .collect();

    println!("\n=== Simulated portfolio ===");
    println!("Cash: {cash}");

    if !positions.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Code", "Quantity", "Avg cost", "Last price", "Market value"]);
        for position in positions.values() {
            let (last_price, value) = match prices.get(&position.code) {
                Some(price) => (
                    price.to_string(),
                    (*price * Decimal::from(position.quantity)).to_string(),
                ),
                None => ("-".to_string(), "-".to_string()),
            };
            table.add_row(vec![
                position.code.clone(),
                position.quantity.to_string(),
                position.average_cost.round_dp(4).to_string(),
                last_price,
                value,
            ]);
        }
        println!("{table}");
    }

    let total = portfolio
        .lock()
        .expect("portfolio lock poisoned")
        .total_value(&prices);
    println!("Total value (cash + quoted positions): {total}");

    if !history.is_empty() {
        println!("\n=== Trade history ===");
        let mut table = Table::new();
        table.set_header(vec!["Action", "Code", "Price", "Quantity", "Time"]);
        for trade in &history {
            table.add_row(vec![
                format!("{:?}", trade.action),
                trade.code.clone(),
                trade.price.to_string(),
                trade.quantity.to_string(),
                trade.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]);
        }
        println!("{table}");
    }
}

// ==============================================================================
// History Command Logic
// ==============================================================================

/// Prints recently stored analyses, with a one-line summary of the advice
/// that was parsed at the time.
async fn handle_history(args: HistoryArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;

    let pool = database::connect(&config.storage.db_path).await?;
    database::init_schema(&pool).await?;
    let repo = DbRepository::new(pool);

    let rows = repo.recent_analyses(args.code.as_deref(), args.limit).await?;
    if rows.is_empty() {
        println!("No stored analyses yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Code", "Name", "Advice", "Time"]);
    for row in rows {
        let advice_summary = row
            .trading_advice
            .as_deref()
            .and_then(|raw| serde_json::from_str::<TradingAdvice>(raw).ok())
            .map(|advice| summarize_advice(&advice))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            row.stock_code,
            row.stock_name.unwrap_or_default(),
            advice_summary,
            row.timestamp.unwrap_or_default(),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn summarize_advice(advice: &TradingAdvice) -> String {
    match (advice.action, advice.price, advice.quantity) {
        (Some(action), Some(price), Some(quantity)) => {
            format!("{action:?} {quantity} @ {price}")
        }
        (Some(action), _, _) => format!("{action:?}"),
        _ => "-".to_string(),
    }
}
