//! MongoDB persistence for dashboard documents.
//!
//! One document per user. Mutating handlers load the document, rework it in
//! memory and write it back with a single `replace_one`, so an operation that
//! touches several member balances commits atomically and concurrent
//! requests never observe a reversed-but-not-reapplied state.

use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, IndexModel,
};

use crate::error::Error;
use crate::schemas::Dashboard;

const DB_NAME: &str = "SplitShare";
const COLLECTION: &str = "Dashboards";

// Server code for a unique-index violation.
const DUPLICATE_KEY: i32 = 11000;

fn dashboards(client: &Client) -> Collection<Dashboard> {
    client.database(DB_NAME).collection(COLLECTION)
}

fn username_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "username": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Called once at startup. With the unique index in place, concurrent
/// registrations of the same username race on the insert itself rather than
/// on a check-then-insert window.
pub async fn ensure_username_index(client: &Client) -> Result<(), Error> {
    dashboards(client).create_index(username_index(), None).await?;
    Ok(())
}

pub async fn load(client: &Client, username: &str) -> Result<Dashboard, Error> {
    dashboards(client)
        .find_one(doc! { "username": username }, None)
        .await?
        .ok_or(Error::DashboardNotFound)
}

pub async fn save(client: &Client, dashboard: &Dashboard) -> Result<(), Error> {
    dashboards(client)
        .replace_one(doc! { "username": &dashboard.username }, dashboard, None)
        .await?;
    Ok(())
}

/// Inserts the dashboard for a new user. The unique index rejects a taken
/// username; the duplicate-key error is translated rather than pre-checked.
pub async fn create(client: &Client, dashboard: &Dashboard) -> Result<(), Error> {
    dashboards(client)
        .insert_one(dashboard, None)
        .await
        .map_err(|err| {
            if is_duplicate_key(&err) {
                Error::UsernameTaken(dashboard.username.clone())
            } else {
                Error::Database(err)
            }
        })?;
    Ok(())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        _ => false,
    }
}

/// Deletes a user's dashboard document, expenses and members included.
pub async fn delete(client: &Client, username: &str) -> Result<(), Error> {
    let result = dashboards(client)
        .delete_one(doc! { "username": username }, None)
        .await?;
    confirm_deletion(result.deleted_count)
}

/// A delete that matched nothing means the username never had a dashboard.
fn confirm_deletion(deleted_count: u64) -> Result<(), Error> {
    if deleted_count == 0 {
        Err(Error::DashboardNotFound)
    } else {
        Ok(())
    }
}

pub async fn usernames(client: &Client) -> Result<Vec<String>, Error> {
    let mut cursor = dashboards(client).find(None, None).await?;
    let mut names = Vec::new();
    while let Some(dashboard) = cursor.try_next().await? {
        names.push(dashboard.username);
    }
    Ok(names)
}
