use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod api;
mod args;

use api::{DirectoryApi, Member, MemberFilter, NewMember};
use args::{Cli, Command, MembersCommand};
use session::{
    ApiClient, ClientConfig, CredentialStore, FileCredentialStore, Navigator, Role, SessionStore,
    guard,
};

/// Tells the user how to re-enter when the session dies mid-command
struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect_to_login(&self) {
        eprintln!("Session expired. Run `flock login` to sign in again.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.url {
        config.base_url = url;
    }

    let store: Arc<dyn CredentialStore> = match &config.credentials_path {
        Some(path) => Arc::new(FileCredentialStore::with_path(path.clone())),
        None => Arc::new(FileCredentialStore::new()),
    };

    let client = Arc::new(ApiClient::new(&config, store, Arc::new(CliNavigator))?);
    let session = SessionStore::new(Arc::clone(&client));

    // Restore any persisted session before dispatching the command
    session.check_auth().await;
    info!("Session check complete");

    let directory = DirectoryApi::new(session.client());

    match cli.command {
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("Logged in as {} ({})", user.email, user.role);
        }

        Command::Logout => {
            session.logout().await;
            println!("Logged out");
        }

        Command::Signup { email, password } => {
            let message = session.signup(&email, &password).await?;
            println!("{message}");
        }

        Command::Whoami => match session.user() {
            Some(user) => println!("{} ({})", user.email, user.role),
            None => println!("Not logged in"),
        },

        Command::Members(command) => run_members(command, &session, &directory).await?,
    }

    Ok(())
}

async fn run_members(
    command: MembersCommand,
    session: &SessionStore,
    directory: &DirectoryApi,
) -> Result<()> {
    match command {
        MembersCommand::List {
            page,
            per_page,
            gender,
            district,
            position,
        } => {
            guard::require_login(session)?;
            let filter = MemberFilter {
                gender,
                district,
                position,
            };
            let listing = directory.list_members(page, per_page, &filter).await?;
            for member in &listing.members {
                print_member_row(member);
            }
            println!(
                "Page {}/{} ({} members total)",
                listing.current_page, listing.pages, listing.total
            );
        }

        MembersCommand::Search { name } => {
            guard::require_login(session)?;
            let members = directory.search_members(&name).await?;
            if members.is_empty() {
                println!("No members matching '{name}'");
            } else {
                for member in &members {
                    print_member_row(member);
                }
            }
        }

        MembersCommand::Show { id } => {
            guard::require_login(session)?;
            let member = directory.get_member(id).await?;
            print_member_detail(&member);
        }

        MembersCommand::Register {
            name,
            birth_year,
            birth_month,
            birth_day,
            phone,
            gender,
            address,
            city,
            state,
            zipcode,
            district,
            spouse,
            position,
        } => {
            guard::require_role(session, Role::Admin)?;
            let member = NewMember {
                name,
                birth_year,
                birth_month,
                birth_day,
                phone,
                gender,
                address,
                city,
                state,
                zipcode,
                district,
                spouse,
                position,
            };
            let message = directory.register_member(&member).await?;
            println!("{message}");
        }

        MembersCommand::Remove { id } => {
            guard::require_role(session, Role::Admin)?;
            directory.remove_member(id).await?;
            println!("Member {id} removed");
        }
    }

    Ok(())
}

fn print_member_row(member: &Member) {
    println!(
        "{:>5}  {:<20}  {:<14}  {:<12}  {}",
        member.id,
        member.name,
        member.phone.as_deref().unwrap_or("-"),
        member.district.as_deref().unwrap_or("-"),
        member.position.as_deref().unwrap_or("-"),
    );
}

fn print_member_detail(member: &Member) {
    println!("Member #{}", member.id);
    println!("  Name:     {}", member.name);
    if let (Some(year), Some(month), Some(day)) =
        (member.birth_year, member.birth_month, member.birth_day)
    {
        println!("  Born:     {year}-{month:02}-{day:02}");
    }
    println!("  Phone:    {}", member.phone.as_deref().unwrap_or("-"));
    println!("  Gender:   {}", member.gender.as_deref().unwrap_or("-"));
    if let Some(address) = &member.address {
        let city = member.city.as_deref().unwrap_or("");
        let state = member.state.as_deref().unwrap_or("");
        let zipcode = member.zipcode.as_deref().unwrap_or("");
        println!("  Address:  {address}, {city} {state} {zipcode}");
    }
    println!("  District: {}", member.district.as_deref().unwrap_or("-"));
    println!("  Spouse:   {}", member.spouse.as_deref().unwrap_or("-"));
    println!("  Position: {}", member.position.as_deref().unwrap_or("-"));
    if let Some(photo_url) = &member.photo_url {
        println!("  Photo:    {photo_url}");
    }
}
