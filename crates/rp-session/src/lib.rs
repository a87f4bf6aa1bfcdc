//! `rp-session` — session orchestration for the routeplay framework.
//!
//! A [`RouteSession`] owns the location catalog, the route graph, the
//! router, and the single simulation player for one application session.
//! It is the seam the presentation layer talks to: synchronous
//! `find_route`, playback commands, and the playback event stream.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rp_session::{RouteSession, SessionConfig};
//! use rp_spatial::Catalog;
//!
//! let mut session = RouteSession::new(catalog, SessionConfig::default())?;
//! let events = session.events().unwrap();
//! let route = session.find_route("Central Hospital", "Harbor Clinic")?;
//! session.play(&route);
//! for event in events.iter() { /* render */ }
//! ```

pub mod error;
pub mod session;


pub use error::{SessionError, SessionResult};
pub use session::{RouteSession, SessionConfig};
