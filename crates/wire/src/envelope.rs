// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Carried on every request so the dispatcher can fall back to
/// `client.name` as the default log `component` (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub schema_version: u32,
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}
