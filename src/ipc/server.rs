//! Loopback TCP server for tray menu commands
//!
//! Each request is forwarded to the gesture driver and answered with the
//! driver's reply, so menu switches run on the same timeline as hotkeys.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::gesture::MenuCommand;

use super::protocol::{read_message, response_for, write_message, Request, Response};

/// IPC server handling tray connections
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Shared server state
struct ServerState {
    menu_tx: mpsc::Sender<MenuCommand>,
    start_time: Instant,
    hotkey_registered: bool,
}

impl Server {
    /// Bind the server to `addr`
    pub async fn bind(
        addr: SocketAddr,
        menu_tx: mpsc::Sender<MenuCommand>,
        hotkey_registered: bool,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind IPC server to {}", addr))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, _) = broadcast::channel(1);

        info!(%local_addr, "IPC server listening");

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(ServerState {
                menu_tx,
                start_time: Instant::now(),
                hotkey_registered,
            }),
            shutdown_tx,
        })
    }

    #[cfg(test)]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        debug!(local_addr = %self.local_addr, "accepting connections");
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "client connected");
                    let state = Arc::clone(&self.state);
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(mut stream: TcpStream, state: Arc<ServerState>) -> Result<()> {
        while let Some(request) = read_message::<_, Request>(&mut stream).await? {
            debug!(?request, "received request");
            let response = Self::process_request(request, &state).await;
            write_message(&mut stream, &response).await?;
        }

        debug!("client disconnected");
        Ok(())
    }

    /// Process a request and return a response
    async fn process_request(request: Request, state: &ServerState) -> Response {
        let Some(action) = request.action() else {
            return Response::Pong;
        };

        let (command, reply_rx) = MenuCommand::with_reply(action);
        if state.menu_tx.send(command).await.is_err() {
            return Response::error("unavailable", "switcher is not running");
        }

        match reply_rx.await {
            Ok(reply) => response_for(
                reply,
                state.hotkey_registered,
                state.start_time.elapsed().as_secs(),
            ),
            Err(_) => Response::error("unavailable", "switcher dropped the request"),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("IPC server shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{MenuAction, MenuReply};
    use crate::layout::{Layout, LayoutHandle};
    use crate::strategy::SwitchingAlgorithm;

    /// Answers menu commands the way the driver would for a single layout
    async fn respond(mut menu_rx: mpsc::Receiver<MenuCommand>) {
        while let Some(command) = menu_rx.recv().await {
            let reply = match command.action {
                MenuAction::Switch(_) => MenuReply::Switched(Layout::new(LayoutHandle(1), "A")),
                MenuAction::SetAlgorithm(algorithm) => MenuReply::AlgorithmSet(algorithm),
                MenuAction::ResetStrategies => MenuReply::Reset,
                MenuAction::Status => panic!("status not expected"),
            };
            if let Some(tx) = command.reply {
                let _ = tx.send(reply);
            }
        }
    }

    async fn round_trip(stream: &mut TcpStream, request: &Request) -> Response {
        write_message(stream, request).await.unwrap();
        read_message(stream).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_requests_are_forwarded() {
        let (menu_tx, menu_rx) = mpsc::channel(8);
        let server = Server::bind("127.0.0.1:0".parse().unwrap(), menu_tx, true)
            .await
            .unwrap();
        let addr = server.local_addr();

        let client = async {
            let mut stream = TcpStream::connect(addr).await.unwrap();

            assert!(matches!(round_trip(&mut stream, &Request::Ping).await, Response::Pong));

            match round_trip(&mut stream, &Request::Switch { algorithm: None }).await {
                Response::Switched { layout } => assert_eq!(layout.name(), "A"),
                other => panic!("unexpected response {:?}", other),
            }

            let request = Request::SetAlgorithm {
                algorithm: SwitchingAlgorithm::Cycle,
            };
            assert!(matches!(
                round_trip(&mut stream, &request).await,
                Response::AlgorithmSet {
                    algorithm: SwitchingAlgorithm::Cycle
                }
            ));
        };

        tokio::select! {
            _ = client => {}
            _ = server.run() => panic!("server exited"),
            _ = respond(menu_rx) => panic!("responder exited"),
        }
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_unavailable_switcher() {
        let (menu_tx, menu_rx) = mpsc::channel(8);
        drop(menu_rx);
        let server = Server::bind("127.0.0.1:0".parse().unwrap(), menu_tx, false)
            .await
            .unwrap();
        let addr = server.local_addr();

        let client = async {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            match round_trip(&mut stream, &Request::ResetStrategies).await {
                Response::Error { code, .. } => assert_eq!(code, "unavailable"),
                other => panic!("unexpected response {:?}", other),
            }
        };

        tokio::select! {
            _ = client => {}
            _ = server.run() => panic!("server exited"),
        }
    }
}
