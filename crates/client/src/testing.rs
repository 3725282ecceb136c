//! Scripted in-process network for policy, lifecycle and tool tests.
//!
//! Available to other crates with the `test-util` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use kiteshell_core::Error;
use tokio::sync::Notify;

use crate::fetch::{FetchResponse, Network, Request, StatusCode, header};

#[derive(Debug, Clone)]
enum Scripted {
    Respond(u16, Bytes),
    /// Respond once the gate is notified.
    Held(u16, Bytes, Arc<Notify>),
    Fail,
}

/// Answers requests from a URL table; unknown URLs fail like an offline network.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.script(url, Scripted::Respond(status, Bytes::copy_from_slice(body.as_bytes())));
    }

    /// Respond to `url` only after `gate` is notified.
    pub fn hold(&self, url: &str, status: u16, body: &str, gate: Arc<Notify>) {
        self.script(url, Scripted::Held(status, Bytes::copy_from_slice(body.as_bytes()), gate));
    }

    pub fn fail(&self, url: &str) {
        self.script(url, Scripted::Fail);
    }

    /// Forget every route; all URLs fail from now on.
    pub fn clear(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn script(&self, url: &str, scripted: Scripted) {
        self.routes.lock().unwrap().insert(url.to_string(), scripted);
    }
}

fn response(request: &Request, status: u16, body: Bytes) -> FetchResponse {
    FetchResponse {
        url: request.url.clone(),
        final_url: request.url.clone(),
        status: StatusCode::from_u16(status).unwrap(),
        bytes: body,
        headers: header::HeaderMap::new(),
        fetch_ms: 0,
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<FetchResponse, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        let scripted = self.routes.lock().unwrap().get(&url).cloned();
        match scripted {
            Some(Scripted::Respond(status, body)) => Ok(response(request, status, body)),
            Some(Scripted::Held(status, body, gate)) => {
                gate.notified().await;
                Ok(response(request, status, body))
            }
            Some(Scripted::Fail) | None => Err(Error::Network(format!("offline: {url}"))),
        }
    }
}
