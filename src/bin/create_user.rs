use std::{
    error::Error,
    io::{self},
    path::PathBuf,
    process::exit,
};

use clap::Parser;
use rusqlite::Connection;

use caixa_rs::{PasswordHash, Username, create_user, initialize_db};

/// A utility for adding a user to the ledger database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database, created if it does not exist.
    #[arg(long)]
    db_path: PathBuf,

    /// The name the new user will log in with.
    #[arg(long)]
    username: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let username = match Username::new(&args.username) {
        Ok(username) => username,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    let connection = Connection::open(&args.db_path)?;
    initialize_db(&connection)?;

    println!("Creating user {username} in {:#?}", args.db_path);

    let Some(password_hash) = get_new_password_hash() else {
        return Ok(());
    };

    match create_user(username, password_hash, &connection) {
        Ok(user) => println!("Created user {} with ID {}.", user.username, user.id),
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }

    Ok(())
}

fn get_new_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let password = read_password("Enter a password: ")?;
        let confirmation = read_password("Enter the same password again: ")?;

        match PasswordHash::from_confirmed(&password, &confirmation, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => print_error(format!("{error}. Try again.")),
        }
    }
}

/// Prompt for a password without echoing it, `None` on end of input or a
/// terminal error.
fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("Could not read password from stdin: {error}"));
            None
        }
    }
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

/// From https://crates.io/crates/capitalize
fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
