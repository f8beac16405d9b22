/// Badge rendering for organization images
pub mod badges;

/// Single image metadata
pub mod meta;

/// Rebase documentation snippets
pub mod rebase;

/// Organization package scan
pub mod scan;

/// Version command handlers
pub mod version;
