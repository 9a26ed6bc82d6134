//! In-process upstream for handler and client tests

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone)]
struct MockFile {
    status: u16,
    content_type: String,
    body: String,
}

#[derive(Default)]
pub struct MockUpstreamBuilder {
    files: HashMap<String, MockFile>,
    delay: Option<Duration>,
}

impl MockUpstreamBuilder {
    /// Serve `body` with status 200
    pub fn file(self, name: &str, content_type: &str, body: &str) -> Self {
        self.response(name, 200, content_type, body)
    }

    pub fn response(mut self, name: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.files.insert(
            name.to_string(),
            MockFile {
                status,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Wait before answering every request
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn start(self) -> MockUpstream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let files = Arc::new(self.files);
        let hits = Arc::new(AtomicUsize::new(0));
        let delay = self.delay;

        let counter = Arc::clone(&hits);
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let files = Arc::clone(&files);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let files = Arc::clone(&files);
                        let counter = Arc::clone(&counter);
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(delay) = delay {
                                tokio::time::sleep(delay).await;
                            }
                            Ok::<_, Infallible>(respond(&files, req.uri().path()))
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        MockUpstream {
            base: format!("http://{addr}/"),
            hits,
            task,
        }
    }
}

fn respond(files: &HashMap<String, MockFile>, path: &str) -> Response<Full<Bytes>> {
    match files.get(path.trim_start_matches('/')) {
        Some(file) => Response::builder()
            .status(file.status)
            .header("Content-Type", file.content_type.as_str())
            .body(Full::new(Bytes::from(file.body.clone())))
            .unwrap(),
        None => Response::builder()
            .status(404)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("not found")))
            .unwrap(),
    }
}

/// A running mock upstream, stopped on drop
pub struct MockUpstream {
    base: String,
    hits: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockUpstream {
    pub fn builder() -> MockUpstreamBuilder {
        MockUpstreamBuilder::default()
    }

    /// Resource URL with trailing slash
    pub fn base(&self) -> String {
        self.base.clone()
    }

    /// Absolute URL of `path` on this upstream
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Base URL of a port nobody listens on
pub async fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}
