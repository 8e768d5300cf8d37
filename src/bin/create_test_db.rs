use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use lumina::{
    BudgetLimit, PasswordHash, Transaction, TransactionKind, Username, ValidatedPassword,
    create_transaction, create_user, initialize_db, set_budget,
};

/// A utility for creating a demo database for the lumina server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "demo";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user {DEMO_EMAIL} with the password {DEMO_PASSWORD:?}...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        Username::new("Demo User")?,
        EmailAddress::new_unchecked(DEMO_EMAIL),
        password_hash,
        &conn,
    )?;

    println!("Adding sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let sample_transactions = [
        (TransactionKind::Income, 5000.0, 1, 14, "Monthly salary"),
        (TransactionKind::Income, 1200.0, 2, 9, "Website project"),
        (TransactionKind::Expense, 2000.0, 5, 13, "Rent"),
        (TransactionKind::Expense, 182.45, 4, 6, "Weekly shop"),
        (TransactionKind::Expense, 96.1, 6, 5, "Power bill"),
        (TransactionKind::Expense, 45.5, 7, 3, "Cinema"),
        (TransactionKind::Expense, 60.0, 8, 2, "Fuel"),
        (TransactionKind::Expense, 210.3, 4, 0, "Weekly shop"),
    ];

    for (kind, amount, category_id, days_ago, description) in sample_transactions {
        create_transaction(
            Transaction::build(kind, amount, category_id, today - Duration::days(days_ago))
                .description(Some(description)),
            user.id,
            &conn,
        )?;
    }

    println!("Adding sample budgets...");

    for (category_id, limit) in [(4, 500.0), (6, 120.0), (7, 50.0), (8, 200.0)] {
        set_budget(user.id, category_id, BudgetLimit::new(limit)?, &conn)?;
    }

    println!("Success!");

    Ok(())
}
