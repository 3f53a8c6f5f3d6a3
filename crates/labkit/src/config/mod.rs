//! Read-only experiment configuration
//!
//! A [`ConfigTree`] is a recursively immutable view over a nested mapping.
//! It exposes keyed lookup, dotted-path lookup and index-style access, plus
//! typed accessors on the leaves. There is no mutating API: the tree is
//! frozen at construction, which is what keeps a recorded experiment
//! configuration trustworthy.
//!
//! ## Usage
//!
//! ```rust
//! use labkit::config::ConfigTree;
//!
//! let cfg = ConfigTree::from_toml_str(
//!     r#"
//!     split = "train"
//!     [optimizer]
//!     lr = 0.001
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(cfg["split"].as_str(), Some("train"));
//! assert_eq!(cfg.lookup("optimizer.lr").and_then(|v| v.as_f64()), Some(0.001));
//! ```

pub mod tree;

// Re-export commonly used items
pub use tree::{ConfigError, ConfigTree, ConfigValue};
