use auctionsite_backend::config::Config;
use auctionsite_backend::models::db_operations::{blocks_db_operations, users_db_operations};
use auctionsite_backend::setup::db_setup;
use clap::{Parser, Subcommand};
use redb::Database;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial site setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    Blocks {
        #[command(subcommand)]
        action: BlocksAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the site (SQLite) and/or content (redb) database.
    Setup {
        db_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        new_password: String,
    },
    /// Blocks an admin from logging in without deleting the account.
    Suspend {
        #[arg(long)]
        username: String,
    },
    Reactivate {
        #[arg(long)]
        username: String,
    },
}

#[derive(Subcommand, Debug)]
enum BlocksAction {
    /// Creates the content slots the public pages expect.
    Provision,
    List {
        #[arg(long)]
        page: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup { db_type } => match db_type.as_deref() {
                Some("site") => setup_site_database(&config),
                Some("content") => setup_content_database(&config),
                Some(other) => eprintln!("❌ Error: Unknown database type '{}'. Use 'site' or 'content'.", other),
                None => {
                    setup_site_database(&config);
                    setup_content_database(&config);
                }
            },
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => create_admin_user(&config, username, password),
            AdminAction::List => list_admin_users(&config),
            AdminAction::ChangePassword { username, new_password } => {
                change_admin_password(&config, username, new_password)
            }
            AdminAction::Suspend { username } => set_admin_active(&config, username, false),
            AdminAction::Reactivate { username } => set_admin_active(&config, username, true),
        },
        Commands::Blocks { action } => match action {
            BlocksAction::Provision => provision_blocks(&config),
            BlocksAction::List { page } => list_blocks(&config, page.as_deref()),
        },
    }
}

fn setup_site_database(config: &Config) {
    let db_path = config.site_db_path();
    if db_path.exists() {
        println!("ℹ️ Site database already exists at '{}'. Skipping creation.", db_path.display());
        return;
    }
    println!("\nSetting up site database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create site database file.");
    match db_setup::setup_site_db(&mut conn) {
        Ok(_) => println!("✅ Site database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up site database: {}", e),
    }
}

fn setup_content_database(config: &Config) {
    let db_path = config.content_db_path();
    if db_path.exists() {
        println!("ℹ️ Content database already exists at '{}'. Skipping creation.", db_path.display());
        return;
    }
    println!("\nSetting up content database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let db = Database::create(&db_path).expect("Failed to create content database file.");
    match db_setup::setup_content_db(&db) {
        Ok(_) => println!("✅ Content database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up content database: {}", e),
    }
}

fn open_site_db(config: &Config) -> Option<Connection> {
    let db_path = config.site_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Site database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return None;
    }
    match Connection::open(&db_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("❌ Error opening site database: {}", e);
            None
        }
    }
}

fn open_content_db(config: &Config) -> Option<Database> {
    let db_path = config.content_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Content database not found at '{}'. Please run `setup_cli db setup content` first.", db_path.display());
        return None;
    }
    match Database::open(&db_path) {
        Ok(db) => Some(db),
        Err(e) => {
            eprintln!("❌ Error opening content database: {}", e);
            None
        }
    }
}

fn create_admin_user(config: &Config, username: &str, password: &str) {
    let Some(conn) = open_site_db(config) else { return };
    if username.trim().is_empty() || password.is_empty() {
        eprintln!("❌ Error: Username and password are required.");
        return;
    }
    match users_db_operations::create_admin(&conn, username.trim(), password) {
        Ok(_) => println!("✅ Admin user '{}' created successfully.", username.trim()),
        Err(e) => eprintln!("❌ Error creating admin user: {}. It might be because the username already exists.", e),
    }
}

fn list_admin_users(config: &Config) {
    let Some(conn) = open_site_db(config) else { return };
    match users_db_operations::read_all_admins(&conn) {
        Ok(admins) => {
            println!("Listing Admin Users:");
            for admin in admins {
                let status = if admin.is_active { "active" } else { "suspended" };
                let last_login = admin.last_login_time.as_deref().unwrap_or("never");
                println!("- {} ({}, last login: {})", admin.username, status, last_login);
            }
        }
        Err(e) => eprintln!("❌ Error fetching admins: {}", e),
    }
}

fn change_admin_password(config: &Config, username: &str, new_password: &str) {
    let Some(conn) = open_site_db(config) else { return };
    match users_db_operations::change_password(&conn, username, new_password) {
        Ok(false) => eprintln!("❌ Error: No admin user named '{}' found.", username),
        Ok(true) => println!("✅ Password for admin user '{}' changed successfully.", username),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}

fn set_admin_active(config: &Config, username: &str, is_active: bool) {
    let Some(conn) = open_site_db(config) else { return };
    let verb = if is_active { "reactivated" } else { "suspended" };
    match users_db_operations::set_admin_active(&conn, username, is_active) {
        Ok(false) => eprintln!("❌ Error: No admin user named '{}' found.", username),
        Ok(true) => println!("✅ Admin user '{}' {}.", username, verb),
        Err(e) => eprintln!("❌ Error updating admin user: {}", e),
    }
}

fn provision_blocks(config: &Config) {
    let Some(db) = open_content_db(config) else { return };
    match db_setup::provision_site_blocks(&db) {
        Ok(provisioned) => {
            for (block, created) in provisioned {
                if created {
                    println!("✅ Created {}/{} ({})", block.page, block.block_key, block.block_type);
                } else {
                    println!("ℹ️ {}/{} already exists, skipping.", block.page, block.block_key);
                }
            }
        }
        Err(e) => eprintln!("❌ Error provisioning blocks: {}", e),
    }
}

fn list_blocks(config: &Config, page: Option<&str>) {
    let Some(db) = open_content_db(config) else { return };
    let blocks = match page {
        Some(page) => blocks_db_operations::list_blocks_by_page(&db, page),
        None => blocks_db_operations::list_all_blocks(&db),
    };
    match blocks {
        Ok(blocks) => {
            println!("Listing CMS blocks:");
            for block in blocks {
                let state = if block.is_published() { "published" } else { "draft pending" };
                println!("- {}/{} [{}] {} ({})", block.page, block.block_key, block.block_type, block.id, state);
            }
        }
        Err(e) => eprintln!("❌ Error listing blocks: {}", e),
    }
}
