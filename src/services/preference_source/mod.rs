//! PreferenceSource: responsibility and boundaries
//!
//! Owns the long-lived monitor subprocess and turns its stdout into a stream of
//! AppearanceMode values. It knows nothing about themes or target applications;
//! resolving a mode into themes happens exclusively in the Dispatcher.

mod gsettings_monitor;

pub use self::gsettings_monitor::GsettingsMonitor;
