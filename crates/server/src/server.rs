use crate::Host;
use crate::Session;
use crate::handle_command;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::net::TcpStream;

/// Serve the command surface on a TCP address until the process ends.
pub async fn serve(host: Arc<Host>, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("[server] listening on {}", addr);
    loop {
        let (stream, peer) = listener.accept().await?;
        log::debug!("[server] connection from {}", peer);
        let host = host.clone();
        tokio::spawn(async move {
            if let Err(error) = handle_connection(host, stream).await {
                log::debug!("[server] connection from {} closed: {}", peer, error);
            }
        });
    }
}

/// One connection: a session, commands line by line, replies in order.
async fn handle_connection(host: Arc<Host>, stream: TcpStream) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut session = Session::admin();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if line.trim().eq_ignore_ascii_case("QUIT") {
            writer.write_all(b"+BYE\r\n").await?;
            break;
        }
        // Command execution is synchronous store work; keep it off the
        // reactor threads.
        let reply = {
            let host = host.clone();
            let mut moved_session = session.clone();
            let line = line.clone();
            let (reply, returned) = tokio::task::spawn_blocking(move || {
                let reply = handle_command(&host, &mut moved_session, &line);
                (reply, moved_session)
            })
            .await?;
            session = returned;
            reply
        };
        writer.write_all(reply.to_wire().as_bytes()).await?;
    }
    Ok(())
}
