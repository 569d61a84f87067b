//! Shared HTTP agent and bounded response helpers.
//!
//! Only the connect phase is time-limited: training requests can legitimately
//! run for minutes and the API offers no progress channel.

use std::io::{self, Read};
use std::sync::OnceLock;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for any body read from the API.
pub(crate) const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub(crate) enum BodyError {
    #[error("response announces {declared} bytes, over the {limit} byte limit")]
    Declared { declared: u64, limit: usize },
    #[error("response body is larger than {limit} bytes")]
    Overflow { limit: usize },
    #[error("failed to read response body: {0}")]
    Io(#[from] io::Error),
}

/// Process-wide agent; ureq pools connections per agent.
pub(crate) fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .user_agent(concat!("regresslab/", env!("CARGO_PKG_VERSION")))
            .build()
    })
}

/// Read a whole body of at most [`MAX_RESPONSE_BYTES`].
pub(crate) fn read_body(response: ureq::Response) -> Result<Vec<u8>, BodyError> {
    read_body_limited(response, MAX_RESPONSE_BYTES)
}

pub(crate) fn read_body_limited(
    response: ureq::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyError> {
    if let Some(declared) = declared_length(&response)
        && declared > limit as u64
    {
        return Err(BodyError::Declared { declared, limit });
    }
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut bytes)?;
    if bytes.len() > limit {
        return Err(BodyError::Overflow { limit });
    }
    Ok(bytes)
}

/// Text of an error response. Unreadable bodies become empty text so the
/// caller can still report the status.
pub(crate) fn error_body_text(response: ureq::Response) -> String {
    match read_body(response) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            tracing::debug!("Ignoring unreadable error body: {err}");
            String::new()
        }
    }
}

fn declared_length(response: &ureq::Response) -> Option<u64> {
    response.header("Content-Length")?.trim().parse().ok()
}

/// One-shot HTTP fixture for tests: answers the first connection with a
/// canned response and hands back the raw request text.
#[cfg(test)]
pub(crate) mod test_server {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;
    use std::time::Duration;

    pub(crate) struct ServedOnce {
        pub(crate) base_url: String,
        request_rx: Receiver<String>,
    }

    impl ServedOnce {
        pub(crate) fn request(&self) -> String {
            self.request_rx
                .recv_timeout(Duration::from_secs(5))
                .unwrap_or_default()
        }
    }

    pub(crate) fn json_response(status: u16, reason: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    pub(crate) fn serve_once(response: String) -> ServedOnce {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, request_rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let request = read_request(&mut stream);
                let _ = tx.send(request);
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        ServedOnce {
            base_url: format!("http://{addr}"),
            request_rx,
        }
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let Ok(read) = stream.read(&mut buf) else {
                break;
            };
            if read == 0 {
                break;
            }
            data.extend_from_slice(&buf[..read]);
            if request_complete(&data) {
                break;
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn request_complete(data: &[u8]) -> bool {
        let text = String::from_utf8_lossy(data);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        data.len() >= header_end + 4 + content_length
    }
}
