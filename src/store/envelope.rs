//! The persisted form of a store: `{ "data": [...], "initialized": bool }`.

use serde::{Deserialize, Serialize};

use crate::record::Record;

#[derive(Serialize)]
pub(crate) struct EnvelopeRef<'a, R> {
    pub data: &'a [R],
    pub initialized: bool,
}

#[derive(Deserialize)]
pub(crate) struct Envelope<R> {
    #[serde(default = "Vec::new")]
    pub data: Vec<R>,
    #[serde(default)]
    pub initialized: bool,
}

impl<'a, R: Record> EnvelopeRef<'a, R> {
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<R: Record> Envelope<R> {
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}
