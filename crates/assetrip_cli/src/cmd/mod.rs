/// Class database inspection and repacking.
pub mod cldb;
/// Whole-game export command.
pub mod export;
/// Shared command helpers.
pub(crate) mod util;

#[cfg(test)]
pub(crate) mod test_support;
