use clap::{Parser, Subcommand};

/// Flock Directory - terminal client for the membership directory
#[derive(Parser, Debug)]
#[command(name = "flock")]
#[command(version)]
#[command(about = "Membership directory client", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides DIRECTORY_API_URL)
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log out and clear stored credentials
    Logout,

    /// Create a new account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Show the currently logged-in user
    Whoami,

    /// Member directory operations
    #[command(subcommand)]
    Members(MembersCommand),
}

#[derive(Subcommand, Debug)]
pub enum MembersCommand {
    /// List members with optional filters
    List {
        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long = "per-page", default_value = "10")]
        per_page: u32,

        /// Filter by gender
        #[arg(long)]
        gender: Option<String>,

        /// Filter by district
        #[arg(long)]
        district: Option<String>,

        /// Filter by church position
        #[arg(long)]
        position: Option<String>,
    },

    /// Search members by name
    Search { name: String },

    /// Show a single member
    Show { id: i64 },

    /// Register a new member (admin only)
    Register {
        #[arg(long)]
        name: String,

        #[arg(long = "birth-year")]
        birth_year: i32,

        #[arg(long = "birth-month")]
        birth_month: u32,

        #[arg(long = "birth-day")]
        birth_day: u32,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        zipcode: Option<String>,

        #[arg(long)]
        district: Option<String>,

        #[arg(long)]
        spouse: Option<String>,

        #[arg(long)]
        position: Option<String>,
    },

    /// Remove a member (admin only)
    Remove { id: i64 },
}
