use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use interview_prep::api::{
    Difficulty, InterviewForm, InterviewType, LoginRequest, QuestionPager, RegisterRequest,
    Session,
};
use interview_prep::store::FileStore;
use interview_prep::{Config, Gateway};

/// Command-line client for the interview-prep backend
#[derive(Parser, Debug)]
#[command(name = "interview-prep")]
#[command(about = "Log in and generate interview questions", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session credentials
    Logout,
    /// Generate interview questions
    Questions {
        #[arg(long)]
        role: String,
        #[arg(long)]
        company: String,
        #[arg(long, value_parser = parse_difficulty, default_value = "Medium")]
        difficulty: Difficulty,
        #[arg(long, value_parser = parse_interview_type, default_value = "Technical")]
        kind: InterviewType,
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=5))]
        rounds: u8,
        /// Number of pages to print
        #[arg(long, default_value = "1")]
        pages: u32,
    },
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown difficulty {s:?} (Easy, Medium, Hard)"))
}

fn parse_interview_type(s: &str) -> Result<InterviewType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
        format!("unknown interview type {s:?} (Technical, HR, Behavioral, System Design)")
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_prep=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    info!("interview-prep v{} → {}", env!("CARGO_PKG_VERSION"), config.api_base_url);

    let store = Arc::new(FileStore::open(&config.credentials_path)?);
    let gateway = Gateway::new(&config, store)?;
    let session = Session::new(&gateway);

    match args.command {
        Command::Login { email, password } => {
            session
                .login(&LoginRequest { email, password })
                .await
                .context("Login failed")?;
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            session
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                })
                .await
                .context("Registration failed")?;
        }
        Command::Logout => session.logout(),
        Command::Questions {
            role,
            company,
            difficulty,
            kind,
            rounds,
            pages,
        } => {
            let form = InterviewForm {
                job_role: role,
                company,
                difficulty,
                interview_type: kind,
                rounds,
            };
            let mut pager = QuestionPager::new(&gateway, form);

            for page in 1..=pages.max(1) {
                let result = if page == 1 {
                    pager.submit().await.map(|_| ())
                } else {
                    pager.next().await.map(|_| ())
                };
                if let Err(e) = result {
                    if e.is_session_ended() {
                        anyhow::bail!("Session expired, run `interview-prep login` again: {e}");
                    }
                    return Err(e).context("Failed to generate questions");
                }

                println!("Questions — Page {}", pager.current_page());
                for (number, question) in pager.numbered() {
                    println!("{number}. {question}");
                }
            }
        }
    }

    Ok(())
}
