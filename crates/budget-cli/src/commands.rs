//! Subcommand handlers.

use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Utc};
use clap::Subcommand;
use tracing::warn;

use budget_core::budget;
use budget_core::config::Config;
use budget_core::models::{Account, Category, CategoryBalance, CategoryKind, OperationFilter};
use budget_core::utils::{format_amount, format_time, group_by_date, truncate_string};
use budget_core::validation;
use budget_core::{ApiClient, ApiError, AuthService};

use crate::Command;

/// Width of the name column in listings
const NAME_WIDTH: usize = 24;

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts with balances
    List,
    /// Add an account
    Add {
        name: String,
        #[arg(long, default_value = "💳")]
        icon: String,
        /// Currency code (default KGS)
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete an account by id
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List all categories
    List,
    /// Add a category
    Add {
        name: String,
        /// expense or income
        #[arg(long, value_parser = parse_kind)]
        kind: CategoryKind,
        #[arg(long)]
        icon: String,
        #[arg(long)]
        color: Option<String>,
    },
    /// Category totals for one kind
    Balances {
        #[arg(value_parser = parse_kind, default_value = "expense")]
        kind: CategoryKind,
    },
}

#[derive(Subcommand)]
pub enum OpsAction {
    /// Record an operation
    Add {
        /// Amount, e.g. 150 or 12,50
        amount: String,
        /// Category id or name
        #[arg(long)]
        category: String,
        /// Account id or name (default: first account)
        #[arg(long)]
        account: Option<String>,
    },
    /// List raw operations
    List {
        #[arg(long)]
        account: Option<i64>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Operation history grouped by day
    History,
}

fn parse_kind(s: &str) -> Result<CategoryKind, String> {
    s.parse()
}

/// Turn an API error into the message the user should see
fn user_error(err: ApiError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn require_login(api: &ApiClient) -> Result<()> {
    if !api.session().is_authenticated() {
        bail!("Not logged in. Run 'budget login'.");
    }
    Ok(())
}

pub async fn run(command: Command, api: &ApiClient, config: &mut Config) -> Result<()> {
    let auth = AuthService::new(api.clone());
    match command {
        Command::Login { email } => login(&auth, api, config, email).await,
        Command::Register { email, username } => register(&auth, &email, &username).await,
        Command::Logout => {
            auth.sign_out();
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            require_login(api)?;
            match api.session().user() {
                Some(user) => println!("{} <{}>", user.display_name(), user.email),
                None => println!("Signed in"),
            }
            Ok(())
        }
        Command::Home => {
            require_login(api)?;
            home(api).await
        }
        Command::Accounts { action } => {
            require_login(api)?;
            accounts(api, action).await
        }
        Command::Categories { action } => {
            require_login(api)?;
            categories(api, action).await
        }
        Command::Ops { action } => {
            require_login(api)?;
            operations(api, action).await
        }
    }
}

// ===== Auth =====

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

fn prompt_password() -> Result<String> {
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

async fn login(
    auth: &AuthService,
    api: &ApiClient,
    config: &mut Config,
    email: Option<String>,
) -> Result<()> {
    if let Some(user) = api.session().user().filter(|_| api.session().is_authenticated()) {
        println!("Already signed in as {}.", user.display_name());
        return Ok(());
    }

    let email = match email {
        Some(e) => e,
        None => prompt_line("Email", config.last_email.as_deref())?,
    };
    let password = prompt_password()?;

    println!("Signing in...");
    let user = auth.sign_in(&email, &password).await.map_err(user_error)?;

    config.last_email = Some(email.trim().to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    match user {
        Some(user) => println!("Welcome, {}!", user.display_name()),
        None => println!("Signed in."),
    }
    Ok(())
}

async fn register(auth: &AuthService, email: &str, username: &str) -> Result<()> {
    let password = prompt_password()?;
    auth.sign_up(email, username, &password)
        .await
        .map_err(user_error)?;
    println!("Registration complete. Sign in with 'budget login --email {}'.", email);
    Ok(())
}

// ===== Home =====

fn print_category_balances(title: &str, balances: &[CategoryBalance]) {
    println!("\n{}", title);
    if balances.is_empty() {
        println!("  (none)");
    }
    for b in balances {
        println!(
            "  {} {:<width$} {:>12}",
            b.category.icon,
            truncate_string(&b.category.name, NAME_WIDTH),
            format_amount(b.total_amount, None),
            width = NAME_WIDTH
        );
    }
}

async fn home(api: &ApiClient) -> Result<()> {
    let name = match api.fetch_profile().await {
        Ok(user) => user.display_name().to_string(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch profile");
            api.session()
                .user()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "User".to_string())
        }
    };

    budget::bootstrap(api).await;
    let summary = budget::summary(api).await?;

    println!("Hello, {}", name);
    println!("Balance:  {}", format_amount(summary.balance, None));
    println!("Income:   {}", format_amount(summary.income_total, None));
    println!("Expenses: {}", format_amount(summary.expense_total, None));
    print_category_balances("Expenses", summary.categories(CategoryKind::Expense));
    print_category_balances("Income", summary.categories(CategoryKind::Income));
    Ok(())
}

// ===== Accounts =====

async fn accounts(api: &ApiClient, action: AccountsAction) -> Result<()> {
    match action {
        AccountsAction::List => {
            let accounts = api.fetch_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts yet. Add one with 'budget accounts add <name>'.");
            }
            for account in &accounts {
                println!(
                    "{:>4}  {:<width$} {:>12}",
                    account.id,
                    truncate_string(&account.label(), NAME_WIDTH),
                    format_amount(account.balance, Some(&account.currency)),
                    width = NAME_WIDTH
                );
            }
        }
        AccountsAction::Add {
            name,
            icon,
            currency,
        } => {
            let new = validation::new_account(&name, &icon, currency.as_deref())
                .map_err(user_error)?;
            let account = api.create_account(&new).await.map_err(user_error)?;
            println!("Account added: {} (id {})", account.label(), account.id);
        }
        AccountsAction::Delete { id } => {
            api.delete_account(id).await.map_err(user_error)?;
            println!("Account {} deleted.", id);
        }
    }
    Ok(())
}

// ===== Categories =====

async fn categories(api: &ApiClient, action: CategoriesAction) -> Result<()> {
    match action {
        CategoriesAction::List => {
            for category in api.fetch_categories().await? {
                println!(
                    "{:>4}  {} {:<width$} {}",
                    category.id,
                    category.icon,
                    truncate_string(&category.name, NAME_WIDTH),
                    category.kind,
                    width = NAME_WIDTH
                );
            }
        }
        CategoriesAction::Add {
            name,
            kind,
            icon,
            color,
        } => {
            let new = validation::new_category(&name, kind, &icon, color.as_deref())
                .map_err(user_error)?;
            let category = api.create_category(&new).await.map_err(user_error)?;
            println!("Category added: {} {} (id {})", category.icon, category.name, category.id);
        }
        CategoriesAction::Balances { kind } => {
            let balances = api.fetch_category_balances(kind).await?;
            let total: f64 = balances.iter().map(|b| b.total_amount).sum();
            print_category_balances(&format!("{} ({})", kind, format_amount(total, None)), &balances);
        }
    }
    Ok(())
}

// ===== Operations =====

/// Find an item by numeric id or case-insensitive name
fn find_by_id_or_name<'a, T>(
    items: &'a [T],
    key: &str,
    id: impl Fn(&T) -> i64,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let key = key.trim();
    match key.parse::<i64>() {
        Ok(wanted) => items.iter().find(|item| id(item) == wanted),
        Err(_) => items
            .iter()
            .find(|item| name(item).eq_ignore_ascii_case(key)),
    }
}

async fn operations(api: &ApiClient, action: OpsAction) -> Result<()> {
    match action {
        OpsAction::Add {
            amount,
            category,
            account,
        } => {
            let amount = validation::parse_amount(&amount).map_err(user_error)?;

            let (categories, accounts) =
                tokio::try_join!(api.fetch_categories(), api.fetch_accounts())?;

            let category: &Category =
                find_by_id_or_name(&categories, &category, |c| c.id, |c| c.name.as_str())
                    .ok_or_else(|| anyhow!("Category '{}' not found", category))?;

            let account: Option<&Account> = match account {
                Some(key) => find_by_id_or_name(&accounts, &key, |a| a.id, |a| a.name.as_str()),
                None => accounts.first(),
            };

            let new = validation::new_operation(account.map(|a| a.id), category, amount, Utc::now())
                .map_err(user_error)?;
            api.create_operation(&new).await.map_err(user_error)?;
            println!(
                "Operation added: {} {}{}",
                category.name,
                category.kind.sign(),
                format_amount(amount, account.map(|a| a.currency.as_str()))
            );
        }
        OpsAction::List {
            account,
            category,
            limit,
        } => {
            let filter = OperationFilter {
                account_id: account,
                category_id: category,
                limit,
                ..Default::default()
            };
            for op in api.fetch_operations(&filter).await? {
                println!(
                    "{:>5}  {:<20} {:>12}  {}",
                    op.id,
                    op.operation_date.as_deref().map(format_time).unwrap_or_default(),
                    format_amount(op.amount, None),
                    op.description.unwrap_or_default()
                );
            }
        }
        OpsAction::History => {
            let details = api.fetch_operation_details().await?;
            if details.is_empty() {
                println!("No operations yet.");
            }
            let today = Local::now().date_naive();
            for group in group_by_date(&details, today) {
                println!("\n{}", group.label);
                for op in group.operations {
                    let sign = if op.is_income() { '+' } else { '-' };
                    println!(
                        "  {}  {} {:<width$} {}{}",
                        op.created_at.as_deref().map(format_time).unwrap_or_default(),
                        op.category_icon.as_deref().unwrap_or(" "),
                        truncate_string(
                            op.description
                                .as_deref()
                                .or(op.category_name.as_deref())
                                .unwrap_or(""),
                            NAME_WIDTH
                        ),
                        sign,
                        format_amount(op.amount, None),
                        width = NAME_WIDTH
                    );
                }
            }
        }
    }
    Ok(())
}
