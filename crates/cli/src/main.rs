//! `supplydesk` — terminal front end for the SupplyDesk admin console.

mod render;
mod terminal;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};

use supplydesk_access::{Role, User, role, user};
use supplydesk_categories::{Category, fields as category_fields};
use supplydesk_client::HttpGateway;
use supplydesk_console::{
    Backend, Capabilities, Confirm, Console, ConsoleConfig, DeleteOutcome, LifecycleController, ListView, Managed,
    ScriptedConfirm,
};
use supplydesk_core::{CategoryId, Lifecycle, PermissionId, RoleId, UserId};
use supplydesk_observability::LogFormat;

use crate::terminal::{StdinConfirm, TerminalNotifier};

#[derive(Debug, Parser)]
#[command(name = "supplydesk", version, about = "Manage supply categories, roles and users")]
struct Cli {
    /// Log output format (json or pretty).
    #[arg(long, env = "SUPPLYDESK_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Answer "yes" to every confirmation.
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Roles(RoleCommand),
    #[command(subcommand)]
    Users(UserCommand),
    /// List the permission catalog.
    Permissions,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Case-insensitive name filter.
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    List(ListArgs),
    Show { id: i64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete { id: i64 },
    /// Activate or deactivate.
    Toggle { id: i64 },
}

#[derive(Debug, Subcommand)]
enum RoleCommand {
    List(ListArgs),
    Show { id: i64 },
    Create {
        #[arg(long)]
        name: String,
        /// Permission id to grant; repeatable.
        #[arg(long = "permission")]
        permissions: Vec<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        grant: Vec<i64>,
        #[arg(long)]
        revoke: Vec<i64>,
    },
    Delete { id: i64 },
    Toggle { id: i64 },
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    List(ListArgs),
    Show { id: i64 },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SUPPLYDESK_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        role: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// New password; leave out to keep the current one.
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<i64>,
    },
    Delete { id: i64 },
    Toggle { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    supplydesk_observability::init_with(cli.log_format);

    let config = ConsoleConfig::from_env().context("invalid SUPPLYDESK_* configuration")?;
    let gateway = Arc::new(HttpGateway::new(&config).context("failed to build HTTP client")?);
    tracing::debug!(api_url = %gateway.base_url(), "using remote service");

    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(ScriptedConfirm::always(true))
    } else {
        Arc::new(StdinConfirm)
    };
    let caps = Capabilities::new(confirm, Arc::new(TerminalNotifier));
    let console = Console::new(Backend::shared(gateway), caps, &config);

    match cli.command {
        Command::Categories(cmd) => categories(&console.categories, cmd).await,
        Command::Roles(cmd) => roles(&console.roles, cmd).await,
        Command::Users(cmd) => users(&console.users, &config, cmd).await,
        Command::Permissions => {
            for permission in console.roles.permission_catalog().await?.iter() {
                println!("{}", render::permission_row(permission));
            }
            Ok(())
        }
    }
}

async fn find<E: Managed>(screen: &LifecycleController<E>, id: E::Id) -> Result<E> {
    screen.load().await?;
    screen
        .loaded()
        .into_iter()
        .find(|e| e.id() == id)
        .ok_or_else(|| anyhow!("no {} with id {id}", E::KIND))
}

async fn list<E: Managed>(screen: &LifecycleController<E>, args: &ListArgs) -> Result<ListView<E>> {
    screen.load().await?;
    screen.set_search(&args.search);
    Ok(screen.go_to_page(args.page))
}

async fn delete<E: Managed>(screen: &LifecycleController<E>, entity: &E) -> Result<()> {
    if screen.delete(entity).await? == DeleteOutcome::Declined {
        println!("cancelled");
    }
    Ok(())
}

async fn categories(screen: &LifecycleController<Category>, cmd: CategoryCommand) -> Result<()> {
    match cmd {
        CategoryCommand::List(args) => {
            let view = list(screen, &args).await?;
            view.rows.iter().for_each(|c| println!("{}", render::category_row(c)));
            println!("{}", render::page_footer(&view));
        }
        CategoryCommand::Show { id } => {
            let category = find(screen, CategoryId::new(id)).await?;
            screen.open_details(&category)?;
            if let Some(details) = screen.details() {
                render::category_details(&details).iter().for_each(|l| println!("{l}"));
            }
        }
        CategoryCommand::Create { name, description } => {
            screen.open_create()?;
            screen.edit(category_fields::NAME, |d| d.name = name)?;
            screen.edit(category_fields::DESCRIPTION, |d| d.description = description)?;
            save(screen).await?;
        }
        CategoryCommand::Update { id, name, description } => {
            let category = find(screen, CategoryId::new(id)).await?;
            screen.open_edit(&category)?;
            if let Some(name) = name {
                screen.edit(category_fields::NAME, |d| d.name = name)?;
            }
            if let Some(description) = description {
                screen.edit(category_fields::DESCRIPTION, |d| d.description = description)?;
            }
            save(screen).await?;
        }
        CategoryCommand::Delete { id } => delete(screen, &find(screen, CategoryId::new(id)).await?).await?,
        CategoryCommand::Toggle { id } => {
            screen.toggle_active(&find(screen, CategoryId::new(id)).await?).await?;
        }
    }
    Ok(())
}

/// Grant or revoke permissions in the open role buffer.
async fn apply_permissions(screen: &LifecycleController<Role>, grant: &[i64], revoke: &[i64]) -> Result<()> {
    let catalog = screen.permission_catalog().await?;
    let lookup = |raw: i64| {
        catalog
            .iter()
            .find(|p| p.id == PermissionId::new(raw))
            .ok_or_else(|| anyhow!("no permission with id {raw}"))
    };

    for (raw, wanted) in grant.iter().map(|r| (*r, true)).chain(revoke.iter().map(|r| (*r, false))) {
        let permission = lookup(raw)?;
        let held = screen.draft().is_some_and(|d| d.has_permission(permission.id));
        if held != wanted && !screen.toggle_permission(permission)? {
            eprintln!("permission {} is locked for this role", permission.name);
        }
    }
    Ok(())
}

async fn roles(screen: &LifecycleController<Role>, cmd: RoleCommand) -> Result<()> {
    match cmd {
        RoleCommand::List(args) => {
            let view = list(screen, &args).await?;
            view.rows.iter().for_each(|r| println!("{}", render::role_row(r)));
            println!("{}", render::page_footer(&view));
        }
        RoleCommand::Show { id } => {
            let found = find(screen, RoleId::new(id)).await?;
            screen.open_details(&found)?;
            if let Some(details) = screen.details() {
                render::role_details(&details).iter().for_each(|l| println!("{l}"));
            }
        }
        RoleCommand::Create { name, permissions } => {
            screen.open_create()?;
            screen.edit(role::fields::NAME, |d| d.name = name)?;
            apply_permissions(screen, &permissions, &[]).await?;
            save(screen).await?;
        }
        RoleCommand::Update { id, name, grant, revoke } => {
            let found = find(screen, RoleId::new(id)).await?;
            screen.open_edit(&found)?;
            if let Some(name) = name {
                screen.edit(role::fields::NAME, |d| d.name = name)?;
            }
            apply_permissions(screen, &grant, &revoke).await?;
            save(screen).await?;
        }
        RoleCommand::Delete { id } => delete(screen, &find(screen, RoleId::new(id)).await?).await?,
        RoleCommand::Toggle { id } => {
            screen.toggle_active(&find(screen, RoleId::new(id)).await?).await?;
        }
    }
    Ok(())
}

async fn users(screen: &LifecycleController<User>, config: &ConsoleConfig, cmd: UserCommand) -> Result<()> {
    let not_self = |id: i64| -> Result<UserId> {
        let id = UserId::new(id);
        if config.current_user_id == Some(id) {
            bail!("the signed-in user cannot be changed from this console");
        }
        Ok(id)
    };

    match cmd {
        UserCommand::List(args) => {
            let view = list(screen, &args).await?;
            for (row, role_name) in screen.rows_with_role_names().await? {
                println!("{}", render::user_row(&row, &role_name));
            }
            println!("{}", render::page_footer(&view));
        }
        UserCommand::Show { id } => {
            let found = find(screen, not_self(id)?).await?;
            screen.open_details(&found)?;
            let role_name = screen.role_name(&found).await?;
            render::user_details(&found, &role_name).iter().for_each(|l| println!("{l}"));
        }
        UserCommand::Create {
            name,
            email,
            password,
            role,
        } => {
            screen.open_create()?;
            screen.edit(user::fields::NAME, |d| d.name = name)?;
            screen.edit(user::fields::EMAIL, |d| d.email = email)?;
            screen.edit(user::fields::PASSWORD, |d| d.password = password)?;
            screen.edit(user::fields::ROLE, |d| d.role_id = Some(RoleId::new(role)))?;
            save(screen).await?;
        }
        UserCommand::Update {
            id,
            name,
            email,
            password,
            role,
        } => {
            let found = find(screen, not_self(id)?).await?;
            screen.open_edit(&found)?;
            if let Some(name) = name {
                screen.edit(user::fields::NAME, |d| d.name = name)?;
            }
            if let Some(email) = email {
                screen.edit(user::fields::EMAIL, |d| d.email = email)?;
            }
            if let Some(password) = password {
                screen.edit(user::fields::PASSWORD, |d| d.password = password)?;
            }
            if let Some(role) = role {
                screen.edit(user::fields::ROLE, |d| d.role_id = Some(RoleId::new(role)))?;
            }
            save(screen).await?;
        }
        UserCommand::Delete { id } => delete(screen, &find(screen, not_self(id)?).await?).await?,
        UserCommand::Toggle { id } => {
            screen.toggle_active(&find(screen, not_self(id)?).await?).await?;
        }
    }
    Ok(())
}

/// Save the open buffer, printing each field error on failure.
async fn save<E: Managed>(screen: &LifecycleController<E>) -> Result<()> {
    if let Err(err) = screen.save().await {
        for (field, message) in screen.field_errors().iter() {
            eprintln!("  {field}: {message}");
        }
        return Err(err.into());
    }
    Ok(())
}
