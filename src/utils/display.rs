use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::models::{CacheStats, Ticker, Token, TokenInfo};

pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_header(&self, text: &str) -> String {
        format!("\n=== {} ===", text.bright_white().bold())
    }

    pub fn format_table(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        table.add_row(Row::new(
            headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
        ));

        for row in rows {
            table.add_row(Row::new(row.iter().map(|cell| Cell::new(cell)).collect()));
        }

        table.to_string()
    }

    pub fn format_colored_change(&self, change: f64) -> String {
        if change >= 0.0 {
            format!("+{:.2}%", change).green().to_string()
        } else {
            format!("{:.2}%", change).red().to_string()
        }
    }

    pub fn format_currency(&self, amount: f64) -> String {
        if amount >= 1.0 {
            format!("${:.2}", amount)
        } else {
            format!("${:.6}", amount)
        }
    }

    pub fn format_supply(&self, amount: Option<f64>) -> String {
        match amount {
            Some(amount) => format!("{:.0}", amount),
            None => "-".to_string(),
        }
    }

    pub fn format_token_table(&self, tokens: &[Token]) -> String {
        let headers = &["ID", "Symbol", "Name", "Price (USD)", "Market Cap", "24h Volume", "1h Change"];
        let rows: Vec<Vec<String>> = tokens
            .iter()
            .map(|t| {
                vec![
                    t.id.clone(),
                    t.symbol.clone(),
                    t.name.clone(),
                    self.format_currency(t.price),
                    self.format_currency(t.market_cap),
                    self.format_currency(t.volume_24h),
                    t.percentage_change_1h
                        .map(|c| self.format_colored_change(c))
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();

        format!("{}\n{}", self.format_header("Latest Listings"), self.format_table(headers, &rows))
    }

    pub fn format_token_summary(&self, token: &Token) -> String {
        let mut output = Vec::new();
        output.push(self.format_header(&format!("{} ({})", token.symbol, token.id)));
        output.push(format!("Name: {}", token.name));
        output.push(format!("Price: {}", self.format_currency(token.price)));
        output.push(format!("Market Cap: {}", self.format_currency(token.market_cap)));
        output.push(format!("24h Volume: {}", self.format_currency(token.volume_24h)));
        output.push(format!(
            "Supply: {} / {}",
            self.format_supply(Some(token.circulating_supply)),
            self.format_supply(token.max_supply)
        ));
        output.push(format!("Last Updated: {}", token.last_updated.to_rfc3339()));

        output.join("\n")
    }

    pub fn format_token_info(&self, info: &TokenInfo) -> String {
        let mut output = Vec::new();
        output.push(self.format_header(&format!("{} ({})", info.name, info.symbol)));
        output.push(format!("ID: {}", info.id));
        if let Some(category) = &info.category {
            output.push(format!("Category: {}", category));
        }
        if let Some(platform) = &info.platform {
            output.push(format!("Platform: {}", platform));
        }
        if let Some(tags) = info.tags.as_ref().filter(|t| !t.is_empty()) {
            output.push(format!("Tags: {}", tags.join(", ")));
        }
        if let Some(twitter) = &info.twitter_username {
            output.push(format!("Twitter: @{}", twitter));
        }
        output.push(format!("Added: {}", info.date_added.format("%Y-%m-%d")));
        if info.is_hidden != 0 {
            output.push("Hidden: yes".yellow().to_string());
        }
        if let Some(notice) = info.notice.as_ref().filter(|n| !n.is_empty()) {
            output.push(format!("Notice: {}", notice.yellow()));
        }
        if let Some(description) = &info.description {
            output.push(format!("\n{}", description));
        }

        output.join("\n")
    }

    pub fn format_ticker_table(&self, crypto_id: &str, tickers: &[Ticker]) -> String {
        let headers = &["Timestamp", "Price (USD)", "24h Volume", "Market Cap"];
        let rows: Vec<Vec<String>> = tickers
            .iter()
            .map(|t| {
                vec![
                    t.timestamp.clone(),
                    self.format_currency(t.price),
                    self.format_currency(t.volume_24h),
                    self.format_currency(t.market_cap),
                ]
            })
            .collect();

        format!(
            "{}\n{}",
            self.format_header(&format!("{} History", crypto_id)),
            self.format_table(headers, &rows)
        )
    }

    pub fn format_stats(&self, stats: &CacheStats) -> String {
        let lookups = stats.hits + stats.misses;
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            stats.hits as f64 / lookups as f64 * 100.0
        };

        let mut output = Vec::new();
        output.push(self.format_header("Cache"));
        output.push(format!("Entries: {}/{}", stats.entries, stats.capacity));
        output.push(format!("Hits: {}  Misses: {}  Hit rate: {:.1}%", stats.hits, stats.misses, hit_rate));

        output.join("\n")
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("{} {}", "error:".red().bold(), message)
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new()
    }
}
