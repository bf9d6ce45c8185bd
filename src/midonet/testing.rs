// Copyright (c) 2025 midonet-kube contributors
// SPDX-License-Identifier: MIT

//! In-memory MidoNet API for unit tests.

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::errors::ClientError;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Fake backend answering every request with a success status unless a
/// response has been scripted for its method and path.
///
/// Success statuses: POST 201, PUT 200, DELETE 204, GET 200.
#[derive(Debug, Default)]
pub struct FakeBackend {
    scripted: Mutex<HashMap<(Method, String), VecDeque<Result<StatusCode, String>>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `method path` request with `status`.
    pub fn respond(&self, method: Method, path: impl Into<String>, status: StatusCode) {
        self.script(method, path.into(), Ok(status));
    }

    /// Fail the next `method path` request at the transport level.
    pub fn fail(&self, method: Method, path: impl Into<String>) {
        self.script(method, path.into(), Err("connection refused".to_string()));
    }

    fn script(&self, method: Method, path: String, outcome: Result<StatusCode, String>) {
        self.scripted
            .lock()
            .unwrap()
            .entry((method, path))
            .or_default()
            .push_back(outcome);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD path"` of every request received so far.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        let scripted = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(&(request.method.clone(), request.path.clone()))
            .and_then(VecDeque::pop_front);

        let status = match scripted {
            Some(Ok(status)) => status,
            Some(Err(reason)) => {
                return Err(ClientError::Transport {
                    method: request.method.to_string(),
                    url: self.url(&request.path),
                    reason,
                })
            }
            None => match request.method {
                Method::POST => StatusCode::CREATED,
                Method::DELETE => StatusCode::NO_CONTENT,
                _ => StatusCode::OK,
            },
        };

        Ok(ApiResponse {
            status,
            body: String::new(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://midonet.test{path}")
    }
}
