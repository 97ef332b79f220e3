//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use gullak_core::models::{
    Bill, Channel, ChannelMessage, ChatMessage, Goal, Investment, ProfileSummary, Transaction,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print the dashboard: headline numbers plus recent transactions
    pub fn print_dashboard(&self, summary: &ProfileSummary, transactions: &[Transaction]) {
        match self.format {
            OutputFormat::Human => {
                println!("Balance:          ₹{}", rupees(summary.balance));
                println!("Spent this month: ₹{}", rupees(summary.spent_this_month));
                println!("Total saved:      ₹{}", rupees(summary.total_saved));
                println!("Goal progress:    {}%", summary.goal_progress);

                if !transactions.is_empty() {
                    println!();
                    println!("── Recent transactions ──");
                    for t in transactions {
                        let sign = if t.amount < 0 { "-" } else { "+" };
                        println!(
                            "{} | {} | {}₹{} | {}",
                            t.time.format("%Y-%m-%d"),
                            t.name,
                            sign,
                            rupees(t.amount.abs()),
                            t.category
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "summary": summary,
                        "transactions": transactions,
                    }))
                    .unwrap()
                );
            }
            OutputFormat::Quiet => {
                println!("{}", summary.balance);
            }
        }
    }

    /// Print a list of goals
    pub fn print_goals(&self, goals: &[Goal]) {
        match self.format {
            OutputFormat::Human => {
                if goals.is_empty() {
                    println!("No goals yet.");
                    return;
                }
                for g in goals {
                    let badge = if g.is_achieved() { " 🎉" } else { "" };
                    println!(
                        "{} | {} | ₹{} / ₹{} ({}%){} | due {}",
                        &g.id[..8.min(g.id.len())],
                        g.name,
                        rupees(g.current),
                        rupees(g.target),
                        g.progress_percent(),
                        badge,
                        g.deadline
                    );
                }
                println!("\n{} goal(s)", goals.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(goals).unwrap());
            }
            OutputFormat::Quiet => {
                for g in goals {
                    println!("{}", g.id);
                }
            }
        }
    }

    /// Print a list of bills
    pub fn print_bills(&self, bills: &[Bill], today: chrono::NaiveDate) {
        match self.format {
            OutputFormat::Human => {
                if bills.is_empty() {
                    println!("No bills yet.");
                    return;
                }
                for b in bills {
                    let status = if b.paid {
                        "paid"
                    } else if b.is_overdue(today) {
                        "OVERDUE"
                    } else if b.is_due_today(today) {
                        "due today"
                    } else {
                        "upcoming"
                    };
                    println!(
                        "{} | {} | ₹{} | {} | {}",
                        &b.id[..8.min(b.id.len())],
                        b.name,
                        rupees(b.amount),
                        b.due_date,
                        status
                    );
                }
                println!("\n{} bill(s)", bills.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(bills).unwrap());
            }
            OutputFormat::Quiet => {
                for b in bills {
                    println!("{}", b.id);
                }
            }
        }
    }

    /// Print the portfolio with totals
    pub fn print_investments(
        &self,
        investments: &[Investment],
        total_invested: i64,
        total_current: i64,
        returns_percent: Option<f64>,
    ) {
        match self.format {
            OutputFormat::Human => {
                if investments.is_empty() {
                    println!("No investments yet.");
                    return;
                }
                for i in investments {
                    let tag = if i.is_demo { " [demo]" } else { "" };
                    println!(
                        "{} | {}{} | {} | ₹{} → ₹{} | {} risk",
                        &i.id[..8.min(i.id.len())],
                        i.name,
                        tag,
                        i.kind,
                        rupees(i.invested),
                        rupees(i.current),
                        i.risk
                    );
                }
                println!();
                println!("Invested: ₹{}", rupees(total_invested));
                println!("Current:  ₹{}", rupees(total_current));
                match returns_percent {
                    Some(pct) => println!("Returns:  {:.2}%", pct),
                    None => println!("Returns:  —"),
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "investments": investments,
                        "totalInvested": total_invested,
                        "totalCurrent": total_current,
                        "returnsPercent": returns_percent,
                    }))
                    .unwrap()
                );
            }
            OutputFormat::Quiet => {
                for i in investments {
                    println!("{}", i.id);
                }
            }
        }
    }

    /// Print the channel list
    pub fn print_channels(&self, channels: &[Channel]) {
        match self.format {
            OutputFormat::Human => {
                if channels.is_empty() {
                    println!("No channels yet.");
                    return;
                }
                for c in channels {
                    println!(
                        "{} | {} | by {}",
                        &c.id[..8.min(c.id.len())],
                        c.name,
                        c.owner
                    );
                }
                println!("\n{} channel(s)", channels.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(channels).unwrap());
            }
            OutputFormat::Quiet => {
                for c in channels {
                    println!("{}", c.id);
                }
            }
        }
    }

    /// Print a channel's messages, oldest first
    pub fn print_channel_messages(&self, messages: &[ChannelMessage]) {
        match self.format {
            OutputFormat::Human => {
                if messages.is_empty() {
                    println!("No messages in this channel.");
                    return;
                }
                for m in messages {
                    println!(
                        "[{}] {}: {}",
                        m.created_at.format("%Y-%m-%d %H:%M"),
                        m.user,
                        m.text
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(messages).unwrap());
            }
            OutputFormat::Quiet => {
                for m in messages {
                    println!("{}", m.id);
                }
            }
        }
    }

    /// Print a chat transcript
    pub fn print_chat(&self, messages: &[ChatMessage]) {
        match self.format {
            OutputFormat::Human => {
                for m in messages {
                    println!("[{}] {}", m.role.as_str(), m.content);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(messages).unwrap());
            }
            OutputFormat::Quiet => {
                if let Some(last) = messages.last() {
                    println!("{}", last.content);
                }
            }
        }
    }

    /// Print one piece of advisor advice
    pub fn print_advice(&self, advice: &str) {
        match self.format {
            OutputFormat::Human => println!("💡 {}", advice),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"advice": advice}));
            }
            OutputFormat::Quiet => println!("{}", advice),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Format an amount with Indian digit grouping: 1234567 -> "12,34,567"
pub fn rupees(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.abs().to_string();

    let mut grouped = String::new();
    let chars: Vec<char> = digits.chars().collect();
    let n = chars.len();
    for (i, c) in chars.iter().enumerate() {
        let remaining = n - i;
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_rupees_grouping() {
        assert_eq!(rupees(0), "0");
        assert_eq!(rupees(999), "999");
        assert_eq!(rupees(12_450), "12,450");
        assert_eq!(rupees(123_456), "1,23,456");
        assert_eq!(rupees(1_234_567), "12,34,567");
        assert_eq!(rupees(-8000), "-8,000");
    }
}
