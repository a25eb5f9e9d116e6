pub mod list;
pub mod query;
pub mod update_qty;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

#[async_trait]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
