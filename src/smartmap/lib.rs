//! # Smartmap
//!
//! Attribute-style field access over loosely-typed key/value maps.
//!
//! Code that ingests parsed JSON often wants `container.foo`-style
//! ergonomics without defining a record type ahead of time. [`SmartMap`]
//! wraps an ordinary map of [`MapKey`] to [`serde_json::Value`] and, when
//! a container opts in, turns field names into keyed reads and writes:
//!
//! ```
//! use smartmap::{KeyFormat, SmartMap};
//! use serde_json::json;
//!
//! smartmap::configure(|config| {
//!     config.enabled = true;
//! });
//!
//! let mut map = SmartMap::new().into_smart().unwrap();
//! map.set("greeting", "hello").unwrap();
//! assert_eq!(map.get("greeting").unwrap(), Some(&json!("hello")));
//! assert_eq!(map.get_from("greeting", KeyFormat::Str).unwrap(), None);
//! ```
//!
//! ## The pieces
//!
//! - **Configuration store** ([`config`]): process-wide settings — whether
//!   the capability is enabled at all, and the fallback flag/key-format
//!   defaults for containers that never set their own. Configuring with
//!   `enabled = true` is what installs the capability.
//! - **Capability state** (on [`SmartMap`]): a per-container tri-state
//!   "smart" flag and key-format preference. Unset state resolves through
//!   the configuration on first read and sticks to the instance.
//! - **Accessor dispatch** (on [`SmartMap`]): `get`/`get_from`/`set` by
//!   field name, honoring the key-format rules of [`KeyFormat`]. A
//!   container that never opted in fails these calls with
//!   [`SmartMapError::NoSuchMember`], exactly like any other undefined
//!   member.
//! - **Derivations** (on [`SmartMap`]): `compact`, `invert`, `merge`,
//!   `reject`, `select`, `slice`, `to_map`, `transform_keys`,
//!   `transform_values` — every operation that produces a new container
//!   carries the source's resolved flag onto the result.
//!
//! ## Key encodings
//!
//! A field name can be stored under a string-like or a symbol-like key;
//! the two are distinct entries. [`KeyFormat::Any`] reads both (preferring
//! the symbol encoding) and writes the symbol encoding. See [`key`].
//!
//! Nested objects stay plain [`serde_json::Value`]s — there is no deep
//! conversion. Adapt a nested object explicitly via
//! `SmartMap::from(object)` when attribute access into it is wanted.

pub mod config;
mod derive;
pub mod error;
pub mod key;
pub mod map;

pub use config::{configure, enabled, install, installed, replace, replace_from_value, snapshot,
    Configuration};
pub use error::{Result, SmartMapError};
pub use key::{KeyFormat, MapKey};
pub use map::SmartMap;
