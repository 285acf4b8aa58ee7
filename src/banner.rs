//! Banner grabbing for open TCP connections.
//!
//! After a successful connect, a service often sends a greeting line (SSH,
//! SMTP, FTP...). We read whatever arrives within the banner timeout, up to
//! a fixed-size buffer, and sanitize it for display. Nothing is sent to the
//! peer; the banner is strictly what the service volunteers.

use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Read a banner from an already-connected TCP stream.
///
/// A read timeout or an empty read is not an error; the caller still reports
/// the port as open, just without a banner. The stream is consumed and
/// dropped here, so the socket closes on every path.
pub async fn read_banner(mut stream: TcpStream, banner_timeout: Duration) -> Option<String> {
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(banner_timeout, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => Some(sanitize_banner(&buffer[..n])),
        _ => None,
    }
}

/// Sanitize banner bytes into a single printable line.
///
/// Non-printable bytes become `.`, line breaks and tabs collapse to single
/// spaces, and the result is trimmed.
fn sanitize_banner(data: &[u8]) -> String {
    let s: String = data
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else if b == b'\r' || b == b'\n' || b == b'\t' {
                ' '
            } else {
                '.'
            }
        })
        .collect();

    // Collapse runs of spaces left behind by CRLF pairs.
    let mut result = String::new();
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(c);
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_sanitize_banner() {
        let data = b"SSH-2.0-OpenSSH_8.9\r\n";
        assert_eq!(sanitize_banner(data), "SSH-2.0-OpenSSH_8.9");
    }

    #[test]
    fn test_sanitize_binary_data() {
        let data = b"\x00\x01Hello\x02World\x03";
        assert_eq!(sanitize_banner(data), "..Hello.World.");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        let data = b"220 mail.example.com\r\n250 ok\r\n";
        assert_eq!(sanitize_banner(data), "220 mail.example.com 250 ok");
    }

    #[tokio::test]
    async fn test_read_banner_from_talkative_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"SSH-2.0-test\r\n").await.unwrap();
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let banner = read_banner(stream, Duration::from_secs(1)).await;
        assert_eq!(banner.as_deref(), Some("SSH-2.0-test"));
    }

    #[tokio::test]
    async fn test_read_banner_from_silent_listener_is_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection open without sending anything.
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let banner = read_banner(stream, Duration::from_millis(100)).await;
        assert!(banner.is_none());
    }

    #[tokio::test]
    async fn test_read_banner_truncates_to_buffer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let big = vec![b'A'; MAX_BANNER_SIZE * 4];
            let _ = sock.write_all(&big).await;
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let banner = read_banner(stream, Duration::from_secs(1)).await.unwrap();
        assert!(banner.len() <= MAX_BANNER_SIZE);
    }
}
