use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use fintrack_rs::{
    NewTransaction, NewUser, PasswordHash, TransactionType, add_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of fintrack_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The demo user logs in with the email `test@example.com` and the password `test`.
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

    println!("Creating test user...");

    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: "test@example.com".to_owned(),
            password_hash: PasswordHash::new("test", PasswordHash::DEFAULT_COST)?,
        },
        &conn,
    )?;

    println!("Creating test transactions...");

    let now = OffsetDateTime::now_utc();
    let transactions = [
        ("Salary", 5000.0, "Work", "Monthly salary", 3, TransactionType::Income),
        ("Rent", 1200.0, "Housing", "Monthly rent", 2, TransactionType::Expense),
        ("Groceries", 85.5, "Food", "Weekly shop", 1, TransactionType::Expense),
        ("Coffee", 4.5, "Food", "Flat white", 0, TransactionType::Expense),
        ("Birthday gift", 50.0, "Gifts", "From Grandma", 20, TransactionType::Income),
        ("Power bill", 140.0, "Utilities", "Electricity", 45, TransactionType::Expense),
    ];

    for (title, amount, category, description, days_ago, transaction_type) in transactions {
        add_transaction(
            NewTransaction {
                title: title.to_owned(),
                amount,
                category: category.to_owned(),
                description: description.to_owned(),
                date: now - Duration::days(days_ago),
                transaction_type,
                user_id: user.id,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
