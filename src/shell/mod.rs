// Composition root for the eventstored binary.
//
// Responsibilities:
// - Read settings from the command line and environment.
// - Load the initial store configurations and build the live stores.
// - Wire state into the sidecar or control plane router.

pub mod bootstrap;
pub mod http;
pub mod settings;
pub mod state;
