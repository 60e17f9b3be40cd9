/// Set of commands which the relay server can receive and process
pub mod command;
/// Set of events split into Reply and Broadcast events according to their source
pub mod event;
/// Implementation of event and command transportation over byte streams, TCP in practice.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
