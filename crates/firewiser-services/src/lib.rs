//! External collaborators of the incident map.
//!
//! Every service sits behind a narrow async trait and has a fallback, so a
//! failure here degrades the briefing but never stalls the map.

pub mod air_quality;
pub mod briefing;
pub mod config;
pub mod dropzone;
pub mod error;
pub mod guidance;
pub mod population;
pub mod weather;

pub use briefing::{gather_briefing, Briefing, BriefingSources};
pub use config::ServiceConfig;
pub use dropzone::{resolve_drop_zone, run_drop_zone_resolver, ResolvedDropZone};
pub use error::ServiceError;
