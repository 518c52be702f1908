//! 基于标识符的依赖注入容器
//!
//! ```
//! use nestdi::{Container, Identifier};
//! use std::sync::Arc;
//!
//! let port = Identifier::<u16>::new("port");
//! let url = Identifier::<String>::new("url");
//!
//! let root = Arc::new(Container::new());
//! root.bind_constant(&port, 8080);
//!
//! let child = root.child();
//! child.try_bind_memoized(&url, move |c| {
//!     Ok(format!("http://localhost:{}", c.resolve(&port)?))
//! });
//!
//! assert_eq!(*child.resolve(&url).unwrap(), "http://localhost:8080");
//! ```

pub mod config;
pub mod container;
pub mod errors;
pub mod identifier;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{ConfigLoader, ContainerConfig};
pub use container::{BindingKind, Container, ContainerStats};
pub use errors::{ConfigError, ContainerError, Result};
pub use identifier::Identifier;
