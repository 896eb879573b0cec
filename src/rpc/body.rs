// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-or-batch JSON-RPC request bodies.

use serde::Deserialize;
use serde_json::Value;

use super::{is_allowed, RpcError};

/// A request body as sent by the client: one call object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RpcBody {
    Batch(Vec<Value>),
    Single(Value),
}

impl RpcBody {
    pub fn parse(raw: &[u8]) -> Result<Self, RpcError> {
        serde_json::from_slice(raw).map_err(|_| RpcError::InvalidJson)
    }

    /// Normalize to a non-empty list of call objects.
    pub fn into_calls(self) -> Result<Vec<Value>, RpcError> {
        let calls = match self {
            RpcBody::Batch(calls) if calls.is_empty() => return Err(RpcError::EmptyBatch),
            RpcBody::Batch(calls) => calls,
            RpcBody::Single(call) => vec![call],
        };
        if calls.iter().all(Value::is_object) {
            Ok(calls)
        } else {
            Err(RpcError::InvalidRequest)
        }
    }

    /// Check every call against the allow-list.
    ///
    /// Fails closed on the first call that is malformed or uses a method
    /// outside the list; nothing is forwarded in that case.
    pub fn validate(self) -> Result<usize, RpcError> {
        let calls = self.into_calls()?;
        for call in &calls {
            let method = call
                .get("method")
                .and_then(Value::as_str)
                .ok_or(RpcError::InvalidRequest)?;
            if !is_allowed(method) {
                return Err(RpcError::MethodNotAllowed(method.to_string()));
            }
        }
        Ok(calls.len())
    }
}
