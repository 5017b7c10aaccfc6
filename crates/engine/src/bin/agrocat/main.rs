//! agrocat CLI entry point.

mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use agrocat_accounts::{Account, AccountTier};
use agrocat_engine::{CatalogEngine, EngineError, RequestContext};
use agrocat_infra::{
    AccountStore, CatalogSnapshot, InMemoryAccountStore, InMemoryCatalogStore, MockRegistry,
    StoreError,
};
use cli::{Cli, Command, parse_params};

type Engine = CatalogEngine<InMemoryCatalogStore, Arc<InMemoryAccountStore>, MockRegistry>;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    agrocat_observability::init_with(cli.log_format.into(), &cli.log_level);

    let config = cli.engine_config()?;
    let snapshot: CatalogSnapshot = load_json(&cli.catalog)?;
    let catalog = InMemoryCatalogStore::new(snapshot).context("catalog snapshot rejected")?;

    let accounts = Arc::new(InMemoryAccountStore::new());
    if let Some(path) = &cli.accounts {
        let list: Vec<Account> = load_json(path)?;
        for account in list {
            accounts.insert(account)?;
        }
    }
    info!(
        environment = ?config.environment,
        accounts = accounts.len(),
        "agrocat v{}",
        env!("CARGO_PKG_VERSION")
    );

    let engine: Engine = CatalogEngine::new(&config, catalog, Arc::clone(&accounts), MockRegistry::new)?;

    let mut request = match cli.as_account {
        Some(id) => RequestContext::for_account(id),
        None => RequestContext::anonymous(),
    };
    request.language_hint = cli.lang.clone();

    run(&engine, &accounts, &request, &cli.command)
}

fn run(
    engine: &Engine,
    accounts: &InMemoryAccountStore,
    request: &RequestContext,
    command: &Command,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::Filter { params } => render(engine.filter_catalog(request, parse_params(params)?)),
        Command::Search { query } => render(engine.search(request, query)),
        Command::Detail { slug } => render(engine.product_detail(request, slug)),
        Command::Related { slug } => render(engine.related(request, slug)),
        Command::Featured => render(engine.featured(request)),
        Command::Categories { flat: false } => render(engine.categories(request)),
        Command::Categories { flat: true } => render(engine.categories_flat(request)),
        Command::FeaturedBrands => render(engine.featured_brands(request)),
        Command::Compare { ids } => render(engine.compare(request, ids)),
        Command::Quote { slug } => render(engine.quote(request, slug)),
        Command::Specs { slug } => render(engine.render_specifications(request, slug)),
        Command::Verify { tax_id } => {
            if let Some(id) = request.account_id {
                ensure_account(accounts, id)?;
            }
            render(engine.verify(request, tax_id))
        }
    }
}

/// Register an individual account for an id the fixtures don't know.
fn ensure_account(accounts: &InMemoryAccountStore, id: agrocat_core::AccountId) -> anyhow::Result<()> {
    match accounts.account(id) {
        Ok(_) => Ok(()),
        Err(StoreError::AccountNotFound(_)) => {
            info!(account_id = %id, "registering individual account");
            accounts.insert(Account::new(id, format!("cli-{id}"), AccountTier::Individual))?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn render<T: Serialize>(result: Result<T, EngineError>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            warn!(kind = err.kind().code(), error = %err, "request failed");
            println!("{}", serde_json::to_string_pretty(&err.to_json())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))
}
