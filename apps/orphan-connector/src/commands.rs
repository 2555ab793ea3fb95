//! Subcommands, one per connector lifecycle callback.

use clap::Subcommand;
use serde::Serialize;
use std::io::Write;
use tracing::info;
use xavyo_connector_orphan::{AccountSchema, AttributeChange, ChangeOp, LifecycleDispatcher};

use crate::error::{CliError, CliResult};

/// Attribute the host uses for orphan-account entitlements.
const ENTITLEMENT_ATTRIBUTE: &str = "groups";

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Verify connectivity and credentials
    Test,

    /// List orphan accounts of the configured sources
    ListAccounts,

    /// Read one account
    ReadAccount {
        /// Account id
        id: String,
    },

    /// Correlate an orphan account to the identity with the given uid
    CreateAccount {
        /// Identity uid
        identity_name: String,
        /// Account id
        account_id: String,
    },

    /// Apply entitlement changes to an account
    UpdateAccount {
        /// Account id
        id: String,
        /// Entitlements to add (ignored for orphan accounts)
        #[arg(long)]
        add: Vec<String>,
        /// Entitlements to remove (disables the underlying accounts)
        #[arg(long)]
        remove: Vec<String>,
    },

    /// Enable an account
    EnableAccount {
        /// Account id
        id: String,
    },

    /// Disable an account
    DisableAccount {
        /// Account id
        id: String,
    },

    /// List orphan accounts as group entitlements
    ListEntitlements,

    /// Read one entitlement
    ReadEntitlement {
        /// Entitlement (account) id
        id: String,
    },
}

/// Runs `command` against `dispatcher`, writing one JSON object per line to `out`.
pub async fn execute<D, W>(
    dispatcher: &D,
    command: Commands,
    schema: Option<&AccountSchema>,
    out: &mut W,
) -> CliResult<()>
where
    D: LifecycleDispatcher + ?Sized,
    W: Write,
{
    match command {
        Commands::Test => {
            dispatcher.test_connection().await?;
            info!("Connection test succeeded");
            emit(out, &serde_json::json!({}))
        }
        Commands::ListAccounts => {
            let accounts = dispatcher.list_accounts(schema).await?;
            emit_all(out, &accounts)
        }
        Commands::ReadAccount { id } => {
            let account = dispatcher.read_account(&id, schema).await?;
            emit(out, &account)
        }
        Commands::CreateAccount {
            identity_name,
            account_id,
        } => {
            let account = dispatcher
                .create_account(&identity_name, &account_id, schema)
                .await?;
            emit(out, &account)
        }
        Commands::UpdateAccount { id, add, remove } => {
            let changes = build_changes(&add, &remove)?;
            let account = dispatcher.update_account(&id, &changes, schema).await?;
            emit(out, &account)
        }
        Commands::EnableAccount { id } => {
            let account = dispatcher.enable_account(&id, schema).await?;
            emit(out, &account)
        }
        Commands::DisableAccount { id } => {
            let account = dispatcher.disable_account(&id, schema).await?;
            emit(out, &account)
        }
        Commands::ListEntitlements => {
            let entitlements = dispatcher.list_entitlements().await?;
            emit_all(out, &entitlements)
        }
        Commands::ReadEntitlement { id } => {
            let entitlement = dispatcher.read_entitlement(&id).await?;
            emit(out, &entitlement)
        }
    }
}

fn build_changes(add: &[String], remove: &[String]) -> CliResult<Vec<AttributeChange>> {
    if add.is_empty() && remove.is_empty() {
        return Err(CliError::Validation(
            "update-account needs at least one --add or --remove value".into(),
        ));
    }

    let mut changes = Vec::new();
    for (op, values) in [(ChangeOp::Add, add), (ChangeOp::Remove, remove)] {
        if !values.is_empty() {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            changes.push(AttributeChange::new(op, ENTITLEMENT_ATTRIBUTE, &values));
        }
    }
    Ok(changes)
}

fn emit<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn emit_all<W: Write, T: Serialize>(out: &mut W, values: &[T]) -> CliResult<()> {
    for value in values {
        emit(out, value)?;
    }
    info!(count = values.len(), "Records written");
    Ok(())
}
