mod app;
mod config;
mod labels;
mod theme;
mod ui;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use labels::{expiry_status, parse_production_date, Catalog, LabelSession};

#[derive(Parser, Debug)]
#[command(name = "kitchen-labels")]
#[command(version = "0.1.0")]
#[command(about = "Expiry label printer for restaurant kitchens")]
struct Args {
    /// Print a label for this product and output it as JSON
    #[arg(short, long, value_name = "PRODUCT", requires = "category")]
    print: Option<String>,

    /// Category of the product (exact name, see --categories)
    #[arg(short, long)]
    category: Option<String>,

    /// Production date, YYYY-MM-DD or dd.mm.yyyy (default: today)
    #[arg(short, long)]
    date: Option<String>,

    /// List product categories as JSON
    #[arg(long)]
    categories: bool,
}

fn main() -> Result<()> {
    // Log to stderr so the TUI on stdout stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Handle CLI-only commands
    if args.categories {
        return print_categories();
    }

    if let Some(product) = args.print {
        let category = args.category.unwrap_or_default();
        return print_label(&product, &category, args.date.as_deref());
    }

    // Run TUI
    run_tui()
}

fn print_categories() -> Result<()> {
    let catalog = Catalog::builtin();
    let rules: Vec<_> = catalog.rules().collect();
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

fn print_label(product: &str, category: &str, date: Option<&str>) -> Result<()> {
    let config = AppConfig::load().unwrap_or_default();
    let production_date = match date {
        Some(d) => parse_production_date(d)?,
        None => Local::now().date_naive(),
    };

    let mut session = LabelSession::new(Catalog::builtin());
    let record = session.print(product, category, production_date)?;
    let status = expiry_status(&record, &Local::now());

    let mut output = serde_json::to_value(&record)?;
    output["status"] = serde_json::to_value(status)?;
    output["barcode"] = serde_json::Value::String(record.barcode());
    println!("{}", serde_json::to_string_pretty(&output)?);

    if config.notifications {
        notify(
            "Этикетка отправлена на печать",
            &format!("Этикетка для \"{}\" успешно напечатана.", record.product_name),
        )?;
    }
    Ok(())
}

fn run_tui() -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::load()?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && !app.is_editing_text() => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                app.set_status(format!("Ошибка: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}

pub(crate) fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("printer")
        .show()?;
    Ok(())
}
