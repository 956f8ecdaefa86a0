use crate::client::ServingClient;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Kind;

pub fn run(client: &dyn ServingClient, kind: Kind, name: &str) -> Result<CmdResult> {
    let resource = client.get(kind, name)?;
    Ok(CmdResult::default().with_affected(vec![resource]))
}
