//! Operator-mode rendering: headers, tables, spinners.

use std::time::Duration;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};

use recipient_core::{
    format_litoshi_as_ltc, truncate_address, Classification, OutputMode, PaymentRequest,
    RequestKind,
};

pub fn spinner(mode: OutputMode, message: &str) -> Option<ProgressBar> {
    if mode != OutputMode::Human {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

pub fn human_header(title: &str) {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════════╗".bright_white()
    );
    println!("{}", format!("║  {:<61}║", title).bright_white());
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════════╝".bright_white()
    );
    println!();
}

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

pub fn request_table(request: &PaymentRequest) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![bold("Field"), bold("Value")]);

    let address = if request.address.is_empty() {
        "—".to_string()
    } else {
        truncate_address(&request.address)
    };
    table.add_row(vec![Cell::new("Address"), Cell::new(address)]);
    if let Some(amount) = request.amount_litoshi {
        table.add_row(vec![Cell::new("Amount"), Cell::new(format_litoshi_as_ltc(amount))]);
    }
    if let Some(label) = &request.label {
        table.add_row(vec![Cell::new("Label"), Cell::new(label)]);
    }
    if let Some(message) = &request.message {
        table.add_row(vec![Cell::new("Message"), Cell::new(message)]);
    }
    if let RequestKind::Remote { remote_url } = &request.kind {
        table.add_row(vec![Cell::new("Fetch from"), Cell::new(remote_url)]);
    }

    table
}

pub fn print_classification(input: &str, classification: &Classification) {
    human_header("RECIPIENT — Classification");
    match classification {
        Classification::PaymentRequest(request) => {
            println!("{} {}", "✓".green(), "Payment request recognized.".green());
            println!();
            println!("{}", request_table(request));
        }
        Classification::Domain(name) => {
            println!(
                "{} {} {}",
                "◆".cyan(),
                name.as_str().cyan().bold(),
                format!("looks like a .{} domain; resolve it to get an address.", name.suffix())
                    .cyan()
            );
        }
        Classification::Literal => {
            println!(
                "{} {}",
                "✗".yellow(),
                format!("'{input}' is neither a payment request nor a known domain.").yellow()
            );
        }
    }
}
