// End-to-end tests over a real WebSocket
//
// The router is served on an ephemeral port and driven by a tokio-tungstenite
// client, so frame mapping, the JSON wire form and the close handshake are all
// exercised the way a remote peer sees them.

mod common;

use anyhow::{bail, Result};
use common::{pcm, recorded_payload, silence, ScriptedFactory};
use futures::{SinkExt, StreamExt};
use speech_stream::{create_router, AppState, Dispatcher, DispatcherConfig, ResultMessage};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WS_PATH: &str = "/ws/speech";

async fn serve(temp_dir: &TempDir) -> Result<(SocketAddr, Dispatcher)> {
    let dispatcher = Dispatcher::new(
        Arc::new(ScriptedFactory::new()),
        DispatcherConfig {
            recordings_dir: temp_dir.path().to_path_buf(),
            sample_rate: 16000,
        },
    );
    let app = create_router(AppState::new(dispatcher.clone()), WS_PATH);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, dispatcher))
}

async fn connect(addr: SocketAddr) -> Result<Client> {
    let (ws, _response) = connect_async(format!("ws://{}{}", addr, WS_PATH)).await?;
    Ok(ws)
}

/// Next frame that is not a ping or pong.
async fn next_frame(ws: &mut Client) -> Result<Option<Message>> {
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Ping(_) | Message::Pong(_) => continue,
            other => return Ok(Some(other)),
        }
    }
    Ok(None)
}

async fn next_result(ws: &mut Client) -> Result<ResultMessage> {
    match next_frame(ws).await? {
        Some(Message::Text(text)) => Ok(serde_json::from_str(&text)?),
        other => bail!("expected a text result frame, got {:?}", other),
    }
}

async fn wait_until_idle(dispatcher: &Dispatcher) {
    for _ in 0..200 {
        if dispatcher.registry().active_count() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

fn only_recording(temp_dir: &TempDir) -> Result<PathBuf> {
    let files: Vec<_> = std::fs::read_dir(temp_dir.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "wav"))
        .collect();
    match files.as_slice() {
        [path] => Ok(path.clone()),
        _ => bail!("expected one recording, found {}", files.len()),
    }
}

#[tokio::test]
async fn test_streamed_chunks_get_ordered_text_results() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (addr, dispatcher) = serve(&temp_dir).await?;
    let mut ws = connect(addr).await?;

    let chunk1 = pcm(&[5, 6, 7]);
    let chunk2 = silence(4);
    let chunk3 = pcm(&[9, -9]);

    ws.send(Message::Binary(chunk1.clone())).await?;
    ws.send(Message::Binary(chunk2.clone())).await?;
    // Control frames are not audio and get no result
    ws.send(Message::Ping(vec![1, 2, 3])).await?;
    ws.send(Message::Binary(chunk3.clone())).await?;

    // Raw wire form of the first result
    match next_frame(&mut ws).await? {
        Some(Message::Text(text)) => {
            let value: serde_json::Value = serde_json::from_str(&text)?;
            assert_eq!(value["type"], "partial");
            assert_eq!(value["text"], "w5");
            assert_eq!(value.as_object().map(|o| o.len()), Some(2));
        }
        other => bail!("expected a text result frame, got {:?}", other),
    }
    assert_eq!(
        next_result(&mut ws).await?,
        ResultMessage::Final {
            text: "w5".to_string()
        }
    );
    assert_eq!(
        next_result(&mut ws).await?,
        ResultMessage::Partial {
            text: "w9".to_string()
        }
    );

    // Client-initiated close is answered with a Close, not a reset
    ws.close(None).await?;
    assert!(matches!(next_frame(&mut ws).await?, Some(Message::Close(_))));

    wait_until_idle(&dispatcher).await;
    assert_eq!(dispatcher.registry().active_count(), 0);

    let recording = only_recording(&temp_dir)?;
    assert_eq!(recorded_payload(&recording), [chunk1, chunk2, chunk3].concat());

    Ok(())
}

#[tokio::test]
async fn test_text_frame_gets_no_result_and_server_closes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (addr, dispatcher) = serve(&temp_dir).await?;
    let mut ws = connect(addr).await?;

    ws.send(Message::Binary(pcm(&[4]))).await?;
    assert_eq!(
        next_result(&mut ws).await?,
        ResultMessage::Partial {
            text: "w4".to_string()
        }
    );

    ws.send(Message::Text("hello".to_string())).await?;

    // Session ends; the server starts the close handshake
    assert!(matches!(next_frame(&mut ws).await?, Some(Message::Close(_))));

    wait_until_idle(&dispatcher).await;
    assert_eq!(dispatcher.registry().active_count(), 0);

    let recording = only_recording(&temp_dir)?;
    assert_eq!(recorded_payload(&recording), pcm(&[4]));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_clients_get_separate_recordings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (addr, dispatcher) = serve(&temp_dir).await?;
    let mut first = connect(addr).await?;
    let mut second = connect(addr).await?;

    first.send(Message::Binary(pcm(&[10]))).await?;
    second.send(Message::Binary(pcm(&[20]))).await?;

    assert_eq!(
        next_result(&mut first).await?,
        ResultMessage::Partial {
            text: "w10".to_string()
        }
    );
    assert_eq!(
        next_result(&mut second).await?,
        ResultMessage::Partial {
            text: "w20".to_string()
        }
    );
    assert_eq!(dispatcher.registry().active_count(), 2);

    first.close(None).await?;
    second.close(None).await?;
    assert!(matches!(next_frame(&mut first).await?, Some(Message::Close(_))));
    assert!(matches!(next_frame(&mut second).await?, Some(Message::Close(_))));

    wait_until_idle(&dispatcher).await;
    assert_eq!(dispatcher.registry().active_count(), 0);

    let mut payloads: Vec<Vec<u8>> = std::fs::read_dir(temp_dir.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .map(|path| recorded_payload(&path))
        .collect();
    payloads.sort();
    assert_eq!(payloads, vec![pcm(&[10]), pcm(&[20])]);

    Ok(())
}
