//! QR raster for the share card, fetched from an image service.

use std::io::Cursor;
use std::time::Duration;

use image::ImageFormat;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::QrConfig;
use crate::error::Result;

const USER_AGENT: &str = concat!("tripos/", env!("CARGO_PKG_VERSION"));

/// A decoded QR image, or the marker that the placeholder must be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrAsset {
    Ready { png: Vec<u8>, width: u32, height: u32 },
    Unavailable,
}

impl QrAsset {
    /// Decode any format the `image` crate reads and keep it as PNG.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let mut png = Cursor::new(Vec::new());
        decoded.write_to(&mut png, ImageFormat::Png)?;
        Ok(QrAsset::Ready {
            png: png.into_inner(),
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    pub fn png(&self) -> Option<&[u8]> {
        match self {
            QrAsset::Ready { png, .. } => Some(png),
            QrAsset::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, QrAsset::Ready { .. })
    }
}

/// Image service URL rendering `target` as a `size`×`size` QR code.
pub fn qr_url(service_url: &str, target: &str, size: u32) -> String {
    format!(
        "{}?size={size}x{size}&data={}&bgcolor=ffffff&color=1e293b&margin=0",
        service_url,
        urlencoding::encode(target)
    )
}

/// Fetch and decode `url`, giving up after `timeout`.
///
/// Never fails: every problem is logged and turns into
/// [`QrAsset::Unavailable`].
pub async fn fetch_qr(client: &Client, url: &str, timeout: Duration) -> QrAsset {
    match tokio::time::timeout(timeout, download(client, url)).await {
        Ok(Ok(bytes)) => match QrAsset::from_bytes(&bytes) {
            Ok(asset) => {
                debug!(url, bytes = bytes.len(), "fetched QR code");
                asset
            }
            Err(e) => {
                warn!(url, error = %e, "QR response is not an image");
                QrAsset::Unavailable
            }
        },
        Ok(Err(e)) => {
            warn!(url, error = %e, "QR request failed");
            QrAsset::Unavailable
        }
        Err(_) => {
            warn!(url, timeout_ms = timeout.as_millis() as u64, "QR request timed out");
            QrAsset::Unavailable
        }
    }
}

async fn download(client: &Client, url: &str) -> reqwest::Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Reusable QR client bound to one service and timeout.
#[derive(Debug, Clone)]
pub struct QrFetcher {
    client: Client,
    service_url: String,
    timeout: Duration,
}

impl QrFetcher {
    pub fn new(config: &QrConfig) -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            service_url: config.service_url.clone(),
            timeout: config.timeout(),
        })
    }

    pub async fn fetch(&self, target: &str, size: u32) -> QrAsset {
        let url = qr_url(&self.service_url, target, size);
        fetch_qr(&self.client, &url, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn tiny_png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        RgbaImage::new(4, 4).write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Serve one connection with `body`, or hold it open silently when `None`.
    async fn serve_once(body: Option<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            match body {
                Some(body) => {
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    socket.write_all(head.as_bytes()).await.unwrap();
                    socket.write_all(&body).await.unwrap();
                }
                None => tokio::time::sleep(Duration::from_secs(10)).await,
            }
        });
        format!("http://{addr}/qr")
    }

    #[test]
    fn url_encodes_target() {
        let url = qr_url(
            "https://api.qrserver.com/v1/create-qr-code/",
            "https://tripos.app/?share=Ab3dE6gH&lang=zh-TW",
            160,
        );
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=160x160\
             &data=https%3A%2F%2Ftripos.app%2F%3Fshare%3DAb3dE6gH%26lang%3Dzh-TW\
             &bgcolor=ffffff&color=1e293b&margin=0"
        );
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(QrAsset::from_bytes(b"not an image").is_err());
        let asset = QrAsset::from_bytes(&tiny_png()).unwrap();
        assert!(asset.is_available());
        assert!(matches!(asset, QrAsset::Ready { width: 4, height: 4, .. }));
    }

    #[tokio::test]
    async fn fetches_and_decodes() {
        let url = serve_once(Some(tiny_png())).await;
        let asset = fetch_qr(&Client::new(), &url, Duration::from_secs(5)).await;
        assert!(asset.is_available());
    }

    #[tokio::test]
    async fn invalid_body_is_unavailable() {
        let url = serve_once(Some(b"<html>oops</html>".to_vec())).await;
        let asset = fetch_qr(&Client::new(), &url, Duration::from_secs(5)).await;
        assert_eq!(asset, QrAsset::Unavailable);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let url = serve_once(None).await;
        let asset = fetch_qr(&Client::new(), &url, Duration::from_millis(200)).await;
        assert_eq!(asset, QrAsset::Unavailable);
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let asset = fetch_qr(&Client::new(), &format!("http://{addr}/"), Duration::from_secs(5)).await;
        assert_eq!(asset, QrAsset::Unavailable);
    }
}
