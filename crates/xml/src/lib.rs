//! # HealthVault XML fragments
//!
//! A small owned element tree for the type-specific XML carried inside a
//! health record item. The thing codecs decode from and encode to this tree
//! rather than streaming events, because reading needs random access to the
//! children of an element and writing needs to splice in preserved content.
//!
//! - [`Fragment::parse`] reads a fragment with quick-xml and remembers the
//!   source span of every element.
//! - [`Element::preserve_verbatim`] makes the writer copy an element's
//!   original bytes instead of re-serializing it.
//! - [`Fragment::to_xml_string`] writes compact, deterministic output.
//!
//! ```
//! use healthvault_xml::{Element, Fragment};
//!
//! let fragment = Fragment::parse("<concern><description><text>anxiety</text></description></concern>")?;
//! assert_eq!(fragment.root().name(), "concern");
//!
//! let rebuilt = Fragment::new(
//!     Element::new("concern")
//!         .with_child(Element::new("description").with_child(Element::leaf("text", "anxiety"))),
//! );
//! assert_eq!(rebuilt, fragment);
//! # Ok::<(), healthvault_xml::XmlError>(())
//! ```

pub mod error;
mod reader;
mod tree;
mod writer;

pub use error::{Result, XmlError};
pub use tree::{Element, Fragment, Node};
