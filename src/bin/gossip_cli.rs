//! gossip-cli: sign in, search and manage profiles against a Gossip server.
//!
//! Usage:
//!   gossip-cli sign-in <email-or-username> <password>
//!   gossip-cli sign-up --username <u> --email <e> --password <p> --first-name <f> --last-name <l> [--gender <0|1|2>]
//!   gossip-cli sign-out
//!   gossip-cli whoami
//!   gossip-cli search [query] [--page <n>] [--per-page <n>]
//!   gossip-cli profile <user-id>
//!   gossip-cli guest <user-id>
//!   gossip-cli avatar <user-id>
//!   gossip-cli upload-avatar <user-id> <image-file>
//!   gossip-cli update-profile <user-id> [--first-name <f>] [--last-name <l>] [--bio <b>]
//!   gossip-cli activation <redirect-url>

use anyhow::{anyhow, bail, Context};
use gossip_client::forms::{ProfileUpdate, SignInForm, SignUpForm};
use gossip_client::models::{ActivationStatus, Profile};
use gossip_client::{AvatarUpload, FileSessionStore, GossipClient, SearchQuery, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

const ENV_SESSION_FILE: &str = "GOSSIP_SESSION_FILE";

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let rest = &args[2..];
    let result = match args[1].as_str() {
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "activation" => cmd_activation(rest),
        command => run(command, rest).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"gossip-cli: command-line client for the Gossip API

USAGE:
    gossip-cli <COMMAND> [OPTIONS]

COMMANDS:
    sign-in <login> <password>        Sign in and store the session
    sign-up --username .. --email .. --password .. --first-name .. --last-name .. [--gender n]
    sign-out                          Forget the stored session
    whoami                            Show the signed-in user
    search [query] [--page n] [--per-page n]
    profile <user-id>                 Show a profile as its owner
    guest <user-id>                   Show a profile as a visitor
    avatar <user-id>                  Print a user's avatar URL
    upload-avatar <user-id> <file>    Replace a user's avatar
    update-profile <user-id> [--first-name f] [--last-name l] [--bio b]
    activation <redirect-url>         Explain an activation link result
    version                           Show version information
    help                              Show this help message

ENVIRONMENT:
    GOSSIP_API_SERVER_URL             Server origin (required)
    GOSSIP_API_V1_SERVER              API version segment, e.g. /api/v1
    GOSSIP_SESSION_FILE               Session file (default ~/.gossip/auth-storage.json)
    RUST_LOG                          Log filter (default warn)"#
    );
}

fn cmd_version() {
    println!("gossip-cli {}", env!("CARGO_PKG_VERSION"));
}

fn session_file() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_SESSION_FILE) {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    home.join(".gossip").join("auth-storage.json")
}

fn build_client() -> anyhow::Result<GossipClient> {
    let path = session_file();
    let session = FileSessionStore::open(&path)
        .with_context(|| format!("cannot open session file {}", path.display()))?;
    let session: Arc<dyn SessionStore> = Arc::new(session);
    Ok(GossipClient::builder().session_store(session).build()?)
}

/// Returns the value following `--name`, if present.
fn flag(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn required_flag(args: &[String], name: &str) -> anyhow::Result<String> {
    flag(args, name).ok_or_else(|| anyhow!("missing {name}"))
}

/// Returns the `index`-th argument that is neither a `--flag` nor a flag's value.
fn positional(args: &[String], index: usize, what: &str) -> anyhow::Result<String> {
    let mut found = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            iter.next();
        } else {
            found.push(arg);
        }
    }
    found
        .get(index)
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("missing {what}"))
}

fn user_id(args: &[String]) -> anyhow::Result<u64> {
    let raw = positional(args, 0, "<user-id>")?;
    raw.parse::<u64>()
        .with_context(|| format!("invalid user id '{raw}'"))
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let client = build_client()?;
    match command {
        "sign-in" => {
            let form = SignInForm::new(
                positional(args, 0, "<email-or-username>")?,
                positional(args, 1, "<password>")?,
            );
            let response = client.sign_in(&form).await?;
            match response.user {
                Some(user) => println!("Signed in as {}", user.display_name()),
                None => println!("Signed in"),
            }
        }
        "sign-up" => {
            let gender = flag(args, "--gender")
                .map(|g| g.parse::<i64>())
                .transpose()
                .context("--gender must be a number")?;
            let password = required_flag(args, "--password")?;
            let form = SignUpForm {
                username: required_flag(args, "--username")?,
                email: required_flag(args, "--email")?,
                password_confirmation: flag(args, "--password-confirmation")
                    .unwrap_or_else(|| password.clone()),
                password,
                first_name: required_flag(args, "--first-name")?,
                last_name: required_flag(args, "--last-name")?,
                gender: gender.or(SignUpForm::default().gender),
            };
            client.sign_up(&form).await?;
            println!("Registered. Check your email for the activation link.");
        }
        "sign-out" => {
            if client.sign_out() {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        "whoami" => match client.current_user() {
            Some(user) => println!("{} (id {})", user.display_name(), user.id),
            None if client.session().is_signed_in() => println!("Signed in (no profile stored)"),
            None => println!("Not signed in"),
        },
        "search" => {
            let mut query = SearchQuery::new(positional(args, 0, "query").unwrap_or_default());
            if let Some(page) = flag(args, "--page") {
                query = query.page(page.parse().context("--page must be a number")?);
            }
            if let Some(per_page) = flag(args, "--per-page") {
                query = query.per_page(per_page.parse().context("--per-page must be a number")?);
            }
            let page = client.search_profiles(&query).await?;
            for profile in &page.data {
                print_profile_line(profile);
            }
            println!("Page {} of {}", query.page, page.total_pages());
        }
        "profile" => print_profile(&client.host_profile(user_id(args)?).await?),
        "guest" => print_profile(&client.guest_profile(user_id(args)?).await?),
        "avatar" => {
            let avatar = client.avatar(user_id(args)?).await?;
            println!("{}", avatar.url().unwrap_or("(no avatar)"));
        }
        "upload-avatar" => {
            let id = user_id(args)?;
            let file = positional(args, 1, "<image-file>")?;
            let upload = AvatarUpload::from_path(&file)?;
            client.update_avatar(id, upload).await?;
            println!("Avatar updated");
        }
        "update-profile" => {
            let id = user_id(args)?;
            let update = ProfileUpdate {
                first_name: flag(args, "--first-name"),
                last_name: flag(args, "--last-name"),
                bio: flag(args, "--bio"),
                ..Default::default()
            };
            client.update_profile(id, &update).await?;
            println!("Profile updated");
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
    Ok(())
}

fn cmd_activation(args: &[String]) -> anyhow::Result<()> {
    let url = positional(args, 0, "<redirect-url>")?;
    let message = match ActivationStatus::from_url(&url) {
        ActivationStatus::Confirmed => "Account activated. You can sign in now.",
        ActivationStatus::AlreadyConfirmed => "Account was already activated. Please sign in.",
        ActivationStatus::Invalid => {
            "Activation link is invalid or expired. Request a new activation email."
        }
        ActivationStatus::Unknown => "No activation result in this link. Please sign in.",
    };
    println!("{message}");
    Ok(())
}

fn print_profile_line(profile: &Profile) {
    let name = profile.full_name();
    let username = profile.username.as_deref().unwrap_or("-");
    println!("{:>6}  {:<20} {}", profile.id, username, name);
}

fn print_profile(profile: &Profile) {
    println!("id:           {}", profile.id);
    if let Some(username) = &profile.username {
        println!("username:     {username}");
    }
    println!("name:         {}", profile.full_name());
    if let Some(email) = &profile.email {
        println!("email:        {email}");
    }
    if let Some(gender) = profile.gender {
        println!("gender:       {gender}");
    }
    if let Some(status) = profile.relationship_status {
        println!("relationship: {status}");
    }
    if let Some(bio) = &profile.bio {
        println!("bio:          {bio}");
    }
    if let Some(url) = profile.avatar() {
        println!("avatar:       {url}");
    }
}
