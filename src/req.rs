use anyhow::{Context, Result};
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, PartialEq)]
pub enum Method {
    GET,
    POST,
    OPTIONS,
}

impl TryFrom<&str> for Method {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, anyhow::Error> {
        match value {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(anyhow::anyhow!("Method not supported")),
        }
    }
}

pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Request {
    /// Reads one HTTP/1.1 request: head up to the blank line, then `Content-Length` bytes.
    pub async fn new<Reader>(reader: Reader) -> Result<Self>
    where
        Reader: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);

        let mut first = String::new();
        reader
            .read_line(&mut first)
            .await
            .context("Headline Error")?;
        if first.trim().is_empty() {
            return Err(anyhow::anyhow!("Empty Request"));
        }

        // Method and path
        let mut request_parts = first.split_whitespace();
        let method: Method = request_parts
            .next()
            .ok_or(anyhow::anyhow!("missing method"))
            .and_then(TryInto::try_into)
            .context("Missing Method")?;
        let target = request_parts.next().context("No Path")?;
        let path = target.split('?').next().unwrap_or(target);

        // Headers
        let mut headers = HashMap::new();
        loop {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .await
                .context("Failed to read header")?;
            if read == 0 || line.trim_end().is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.insert(k.trim().to_lowercase(), v.trim().to_string());
            }
        }

        // Body
        let length = headers
            .get("content-length")
            .map(|v| v.parse::<usize>())
            .transpose()
            .context("Invalid Content-Length")?
            .unwrap_or(0);
        if length > MAX_BODY_BYTES {
            return Err(anyhow::anyhow!("Body too large: {} bytes", length));
        }
        let mut body = vec![0; length];
        reader
            .read_exact(&mut body)
            .await
            .context("Failed to read body")?;

        Ok(Request {
            method,
            path: path.into(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_head_and_sized_body() {
        let raw = "POST /api/login?x=1 HTTP/1.1\r\nHost: localhost\r\nX-Access-Token: abc\r\nContent-Length: 13\r\n\r\n{\"email\":\"a\"}";
        let request = Request::new(raw.as_bytes()).await.unwrap();

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/api/login");
        assert_eq!(request.headers.get("x-access-token").unwrap(), "abc");
        assert_eq!(request.body, "{\"email\":\"a\"}");
    }

    #[tokio::test]
    async fn rejects_unknown_method() {
        let raw = "DELETE /api/deleteUser HTTP/1.1\r\n\r\n";
        assert!(Request::new(raw.as_bytes()).await.is_err());
    }
}
