use anyhow::Result;
use folio::cli::{actions, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    actions::execute(action).await
}
