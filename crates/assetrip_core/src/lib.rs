//! Public library API for rebuilding editor project files from compiled game assets.

/// Class database codec, field-tree decoding, exporter dispatch, and project export.
pub mod asset;
