//! The in-memory schema container: buses, nodes, messages, and the
//! lookup/encode/decode entry points built on top of them.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use crate::bus::Bus;
use crate::error::{Error, Result};
use crate::message::Message;
use crate::node::Node;
use crate::parser;
use crate::value::Value;

/// A CAN network description: buses, nodes, and messages, indexed for O(1)
/// lookup by frame id or message name.
#[derive(Debug, Clone, Default)]
pub struct Database {
    version: Option<String>,
    buses: Vec<Bus>,
    nodes: Vec<Node>,
    messages: Vec<Message>,
    by_frame_id: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = Some(version.into());
    }

    #[inline]
    #[must_use]
    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn add_bus(&mut self, bus: Bus) {
        self.buses.push(bus);
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Add a message to the schema, indexing it for lookup. Errors if a
    /// message with the same frame id or name is already present.
    pub fn add_message(&mut self, message: Message) -> Result<()> {
        if self.by_frame_id.contains_key(&message.frame_id()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate frame id 0x{:x}",
                message.frame_id()
            )));
        }
        if self.by_name.contains_key(message.name()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate message name '{}'",
                message.name()
            )));
        }
        let index = self.messages.len();
        self.by_frame_id.insert(message.frame_id(), index);
        self.by_name.insert(message.name().to_string(), index);
        self.messages.push(message);
        Ok(())
    }

    #[must_use]
    pub fn lookup_message(&self, frame_id: u32) -> Option<&Message> {
        self.by_frame_id.get(&frame_id).map(|&i| &self.messages[i])
    }

    #[must_use]
    pub fn lookup_message_by_name(&self, name: &str) -> Option<&Message> {
        self.by_name.get(name).map(|&i| &self.messages[i])
    }

    /// Parse `source` as a DBC file and merge its buses, nodes, and
    /// messages into this database.
    pub fn add_dbc(&mut self, source: &str) -> Result<()> {
        let parsed = parser::dbc::parse(source)?;
        self.merge(parsed)
    }

    /// Read and parse a DBC file from disk.
    pub fn add_dbc_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
        self.add_dbc(&source)
    }

    /// KCD is sniffed but not parsed by this crate; always returns
    /// [`Error::FormatNotBundled`].
    pub fn add_kcd_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
        parser::kcd::sniff(&source)?;
        Err(Error::FormatNotBundled("kcd"))
    }

    /// SYM is sniffed and version-gated but not parsed by this crate;
    /// always returns [`Error::FormatNotBundled`] for well-formed 6.0
    /// files, or a parse error for anything else.
    pub fn add_sym_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
        parser::sym::sniff(&source)?;
        Err(Error::FormatNotBundled("sym"))
    }

    fn merge(&mut self, parsed: Database) -> Result<()> {
        if self.version.is_none() {
            self.version = parsed.version;
        }
        self.buses.extend(parsed.buses);
        self.nodes.extend(parsed.nodes);
        for message in parsed.messages {
            self.add_message(message)?;
        }
        Ok(())
    }

    /// Encode `data` against the message named `name`.
    pub fn encode_message(
        &self,
        name: &str,
        data: &BTreeMap<String, Value>,
        scaling: bool,
    ) -> Result<Vec<u8>> {
        let message = self
            .lookup_message_by_name(name)
            .ok_or_else(|| Error::UnknownMessageName(name.to_string()))?;
        message.encode(data, scaling, true)
    }

    /// Decode the payload for the message with frame id `frame_id`.
    pub fn decode_message(
        &self,
        frame_id: u32,
        payload: &[u8],
        decode_choices: bool,
        scaling: bool,
    ) -> Result<BTreeMap<String, Value>> {
        let message = self
            .lookup_message(frame_id)
            .ok_or(Error::UnknownFrameId(frame_id))?;
        message.decode(payload, decode_choices, scaling)
    }

    /// Emit this schema as DBC text.
    #[must_use]
    pub fn as_dbc_string(&self) -> String {
        crate::serialize::dbc::write(self)
    }
}
