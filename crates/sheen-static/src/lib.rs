//! Build-time asset pipeline for static documentation sites.
//!
//! Publishes each exported page's critical CSS as content-addressed
//! stylesheets, augments the route table with hand-registered pages, and
//! resolves locale-specific paths.

pub mod assets;
pub mod critical;
pub mod export;
pub mod locale;
pub mod publish;
pub mod routes;

pub use critical::{
    extract_critical, CriticalStyles, Placement, RuleCache, StyleCache, StyleFragment, StyleRule,
};
pub use export::{ExportConfig, ExportError, ExportOutput, ExportProcessor, ExportStats, ExportedPage};
pub use locale::LocaleScheme;
pub use publish::{CssPublisher, PublishError, PublishedFile};
pub use routes::{augment, RouteEntry, RouteError, RouteTable};
