pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

// Page context: snapshots, resolution, click interception
pub mod intercept;
pub mod page;
pub mod resolver;

// Cross-context messages
pub mod protocol;

// Privileged context: naming and saving
pub mod naming;
pub mod saver;
pub mod storage;
