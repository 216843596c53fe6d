//! # protospark-cli — Command-Line Tool
//!
//! Provides the `protospark` command-line interface over the schema handle
//! and codec.
//!
//! ## Subcommands
//!
//! - `protospark types` — list the messages in schema files with their fields.
//! - `protospark encode` — encode a JSON record, optionally as a predictive envelope.
//! - `protospark decode` — decode bytes by explicit type or from the envelope tag.
//! - `protospark peek` — print the type name carried by an envelope.
//!
//! ```bash
//! protospark types schema/messages.proto
//! protospark encode schema/messages.proto --input ping.json --output ping.bin --predictive
//! protospark decode schema/messages.proto --input ping.bin
//! protospark peek --input ping.bin --cipher-config cipher.yaml
//! ```
//!
//! Handlers return `anyhow::Result<u8>` where the `u8` is the process exit
//! code.

pub mod codec;
pub mod config;
pub mod peek;
pub mod types;
