use crypto_gateway::utils::display::DisplayFormatter;
use crypto_gateway::{FieldQuery, GatewayConfig, QueryResolver, RequestContext};
use std::error::Error;
use std::io::{self, Write};
use tracing::{debug, info};

fn print_help() {
    println!("Commands:");
    println!("  tokens [limit]                              - Latest listings (default 10)");
    println!("  token <id>                                  - Latest quote for one token");
    println!("  info <ids>                                  - Metadata for comma separated ids");
    println!("  tickers <id> <start> [end] [limit]          - Historical tickers (default 30)");
    println!("  batch <query>; <query>; ...                 - Resolve several queries at once");
    println!("  stats                                       - Cache statistics");
    println!("  help                                        - Show this help");
    println!("  exit                                        - Exit the program");
}

async fn run_query(
    resolver: &QueryResolver,
    display: &DisplayFormatter,
    query: FieldQuery,
) -> crypto_gateway::Result<()> {
    match query {
        FieldQuery::Tokens { limit } => {
            let tokens = resolver.tokens(limit).await?;
            println!("{}", display.format_token_table(&tokens));
        }
        FieldQuery::Token { id } => {
            let token = resolver.token(&id).await?;
            println!("{}", display.format_token_summary(&token));
        }
        FieldQuery::TokenInfo { ids } => {
            for info in resolver.token_info(&ids).await?.iter() {
                println!("{}", display.format_token_info(info));
            }
        }
        FieldQuery::CryptoTickers(query) => {
            let tickers = resolver.crypto_tickers(&query).await?;
            println!("{}", display.format_ticker_table(query.crypto_id(), &tickers));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Crypto Query Gateway");

    let config = GatewayConfig::from_env()?;
    debug!(?config, "Loaded configuration");
    let resolver = QueryResolver::from_config(&config)?;
    let display = DisplayFormatter::new();
    let ctx = RequestContext::for_caller(
        std::env::var("USER").unwrap_or_else(|_| "cli".to_string()),
    );

    println!("=== Crypto Query Gateway ===");
    print_help();

    let mut input = String::new();
    loop {
        input.clear();
        print!("> ");
        io::stdout().flush()?;
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let command = input.trim();
        match command {
            "" => continue,
            "exit" => {
                debug!("Received exit command");
                break;
            }
            "help" => print_help(),
            "stats" => println!("{}", display.format_stats(&resolver.cache().stats())),
            _ if command.starts_with("batch ") => {
                match FieldQuery::parse_batch(&command["batch ".len()..]) {
                    Ok(queries) => {
                        let response = resolver.execute(&ctx, &queries).await;
                        println!("{}", serde_json::to_string_pretty(&response)?);
                    }
                    Err(e) => println!("{}", display.format_error(&e.to_string())),
                }
            }
            _ => match FieldQuery::parse(command) {
                Ok(query) => {
                    debug!(field = query.field_name(), "Running query");
                    if let Err(e) = run_query(&resolver, &display, query).await {
                        println!("{}", display.format_error(&e.to_string()));
                    }
                }
                Err(e) => println!("{}", display.format_error(&e.to_string())),
            },
        }
    }

    info!("Shutting down");
    Ok(())
}
