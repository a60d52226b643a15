use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use opencrm_api::{
    auth::{is_known_role, AuthConfig, AuthService, ROLES},
    config::{self, AppConfig},
    db::{self, DbPool},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Listing roles needs neither config nor a database.
    if matches!(cli.command, Commands::Roles) {
        return handle_roles(cli.json);
    }
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::CreateUser(args) => handle_create_user(&context, args, cli.json).await?,
        Commands::Login(args) => handle_login(&context, args, cli.json).await?,
        Commands::Migrate => handle_migrate(&context).await?,
        Commands::Roles => handle_roles(cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "opencrm-cli", about = "Operator tooling for the OpenCRM API", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an enabled user holding one or more roles
    CreateUser(CreateUserArgs),
    /// Issue a bearer token for an existing user
    Login(LoginArgs),
    /// Apply pending database migrations
    Migrate,
    /// List the roles a user can hold
    Roles,
}

#[derive(Args)]
struct CreateUserArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Repeat for several roles, e.g. `--role ROLE_SALES --role ROLE_INVENTORY`
    #[arg(long = "role", required = true)]
    roles: Vec<String>,
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    password: String,
}

#[derive(Serialize)]
struct CreatedUser<'a> {
    id: i64,
    username: &'a str,
    email: &'a str,
    roles: &'a [String],
}

struct CliContext {
    db: Arc<DbPool>,
    auth_service: Arc<AuthService>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config: AppConfig = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(db_pool);
        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&config), db.clone()));

        Ok(Self { db, auth_service })
    }
}

async fn handle_create_user(context: &CliContext, args: CreateUserArgs, json: bool) -> Result<()> {
    if let Some(unknown) = args.roles.iter().find(|role| !is_known_role(role)) {
        return Err(anyhow!(
            "unknown role {unknown}; run `opencrm-cli roles` to list the valid ones"
        ));
    }

    let user = context
        .auth_service
        .register_user(&args.username, &args.email, &args.password, &args.roles)
        .await
        .context("failed to create user")?;

    if json {
        print_json(&CreatedUser {
            id: user.id,
            username: &user.username,
            email: &user.email,
            roles: &args.roles,
        })?;
    } else {
        println!(
            "User {} created (id {}) with roles {}",
            user.username,
            user.id,
            args.roles.join(", ")
        );
    }
    Ok(())
}

async fn handle_login(context: &CliContext, args: LoginArgs, json: bool) -> Result<()> {
    let token = context
        .auth_service
        .login(&args.username, &args.password)
        .await
        .context("failed to authenticate")?;

    if json {
        print_json(&token)?;
    } else {
        println!("{}", token.access_token);
    }
    Ok(())
}

async fn handle_migrate(context: &CliContext) -> Result<()> {
    db::run_migrations(&context.db)
        .await
        .context("failed to run migrations")?;
    println!("Migrations applied");
    Ok(())
}

fn handle_roles(json: bool) -> Result<()> {
    let mut roles: Vec<_> = ROLES.values().collect();
    roles.sort_by_key(|role| role.name);

    if json {
        let rendered: Vec<_> = roles
            .iter()
            .map(|role| serde_json::json!({ "name": role.name, "description": role.description }))
            .collect();
        print_json(&rendered)?;
    } else {
        for role in roles {
            println!("- {} • {}", role.name, role.description);
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
