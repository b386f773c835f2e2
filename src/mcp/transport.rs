//! In-process message transport.
//!
//! A pair of bounded queues between an HTTP front end and a running rmcp
//! service: client messages go in through [`ChannelTransport::pair`]'s
//! sender, server messages come out of its receiver.

use rmcp::RoleServer;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::service::{RxJsonRpcMessage, TxJsonRpcMessage};
use rmcp::transport::Transport;
use thiserror::Error;
use tokio::sync::mpsc;

/// The receiving end of the outbound queue is gone.
#[derive(Error, Debug)]
#[error("message channel closed")]
pub struct ChannelClosed;

/// Server-side transport over two mpsc queues.
pub struct ChannelTransport {
    inbound: mpsc::Receiver<ClientJsonRpcMessage>,
    outbound: mpsc::Sender<ServerJsonRpcMessage>,
}

impl ChannelTransport {
    /// Build a transport plus the client-facing ends of its queues.
    pub fn pair(
        buffer: usize,
    ) -> (
        Self,
        mpsc::Sender<ClientJsonRpcMessage>,
        mpsc::Receiver<ServerJsonRpcMessage>,
    ) {
        let (inbound_tx, inbound) = mpsc::channel(buffer);
        let (outbound, outbound_rx) = mpsc::channel(buffer);
        (Self { inbound, outbound }, inbound_tx, outbound_rx)
    }
}

impl Transport<RoleServer> for ChannelTransport {
    type Error = ChannelClosed;

    fn send(
        &mut self,
        item: TxJsonRpcMessage<RoleServer>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        let outbound = self.outbound.clone();
        async move { outbound.send(item).await.map_err(|_| ChannelClosed) }
    }

    async fn receive(&mut self) -> Option<RxJsonRpcMessage<RoleServer>> {
        self.inbound.recv().await
    }

    async fn close(&mut self) -> Result<(), Self::Error> {
        self.inbound.close();
        Ok(())
    }
}
