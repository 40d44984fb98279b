//! Texture collaborator.
//!
//! Textures are owned by the asset layer. This crate only stores their
//! handles and turns them into bindless indices at GPU-write time.

/// Tag type for texture handles. Never instantiated.
#[derive(Debug)]
pub enum Texture {}
