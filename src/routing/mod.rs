//! Console routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation (path, user agent, viewport)
//!     → router.rs (route table lookup, declaration order)
//!     → matcher.rs (evaluate path patterns, capture params)
//!     → device.rs (only for `/`: mobile or desktop)
//!     → Return: Render(view, params) | Redirect(/m | /pc) | NotFound
//! ```
//!
//! # Design Decisions
//! - Route tables are static, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always resolves the same way
//! - Device policy lives in one function, independent of rendering

pub mod device;
pub mod matcher;
pub mod router;

pub use device::{classify, ClientHints, DeviceClass};
pub use matcher::{PathPattern, PathPrefixMatcher};
pub use router::{Resolution, Route, RouteTable, RouteTarget, View, ViewSet};
