//! Core of a CAN-bus database toolkit: an in-memory schema for CAN network
//! descriptions plus a bit-exact signal codec that packs and unpacks
//! heterogeneous signals into CAN frame payloads.
//!
//! # Examples
//!
//! ```
//! use candb::{Database, Signal, Message, ByteOrder, Value};
//! use std::collections::BTreeMap;
//!
//! let mut db = Database::new();
//! let message = Message::builder(0x100, "Engine")
//!     .signal(
//!         Signal::builder("RPM")
//!             .start_bit(0)
//!             .length_bits(16)
//!             .byte_order(ByteOrder::LittleEndian)
//!             .scale(0.25)
//!             .build()?,
//!     )
//!     .build()?;
//! db.add_message(message)?;
//!
//! let mut data = BTreeMap::new();
//! data.insert("RPM".to_string(), Value::Real(2000.0));
//! let payload = db.encode_message("Engine", &data, true)?;
//! let decoded = db.decode_message(0x100, &payload, false, true)?;
//! assert_eq!(decoded.get("RPM"), Some(&Value::Real(2000.0)));
//! # Ok::<(), candb::Error>(())
//! ```

mod attribute;
mod bitlayout;
mod bus;
mod byte_order;
mod database;
mod error;
mod message;
mod node;
mod parser;
mod serialize;
mod signal;
mod value;

pub use attribute::{AttributeDefinition, AttributeMap, AttributeTarget, AttributeValue, AttributeValueKind};
pub use bus::Bus;
pub use byte_order::ByteOrder;
pub use database::Database;
pub use error::{Error, Result};
pub use message::{Message, MessageBuilder, MAX_EXTENDED_ID, MAX_STANDARD_ID};
pub use node::Node;
pub use parser::{load, load_file};
pub use signal::{Signal, SignalBuilder};
pub use value::Value;
