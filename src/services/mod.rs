pub mod dispatcher;
pub mod preference_source;
pub mod synchronizer;

pub use dispatcher::Dispatcher;
pub use preference_source::GsettingsMonitor;
pub use synchronizer::create_synchronizers;
