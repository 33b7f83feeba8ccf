use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    client::ChainClient,
    explorer::Explorer,
    serve::{
        AppState,
        error::ServeError,
        types::{ChainTip, ExplorerInfo},
    },
};

#[async_trait]
pub trait ServeSessionHelper {
    /// Client of the active session plus a snapshot of the explorer state to
    /// attach to the response. The explorer lock is released on return.
    async fn start_session(&self) -> Result<(Arc<ChainClient>, ExplorerInfo), ServeError>;

    /// As [`start_session`](Self::start_session), refusing chains whose
    /// config does not enable `module`
    async fn start_module_session(
        &self,
        module: &str,
    ) -> Result<(Arc<ChainClient>, ExplorerInfo), ServeError>;
}

#[async_trait]
impl ServeSessionHelper for AppState {
    async fn start_session(&self) -> Result<(Arc<ChainClient>, ExplorerInfo), ServeError> {
        let explorer = self.read().await;

        let client = explorer
            .session()
            .ok_or(ServeError::NoChainSelected)?
            .client();

        Ok((client, explorer_info(&explorer)?))
    }

    async fn start_module_session(
        &self,
        module: &str,
    ) -> Result<(Arc<ChainClient>, ExplorerInfo), ServeError> {
        let explorer = self.read().await;

        let client = explorer
            .session()
            .ok_or(ServeError::NoChainSelected)?
            .client();

        if !explorer.registry().supports_module(module) {
            return Err(ServeError::ModuleDisabled(module.to_string()));
        }

        Ok((client, explorer_info(&explorer)?))
    }
}

pub fn explorer_info(explorer: &Explorer) -> Result<ExplorerInfo, ServeError> {
    let session = explorer.session().ok_or(ServeError::NoChainSelected)?;
    let blocks = session.blocks();

    Ok(ExplorerInfo {
        chain: session.chain().to_string(),
        chain_tip: blocks.latest().map(ChainTip::from),
        connected: blocks.connected(),
    })
}
