//! Application Use Cases

mod get_assets;

pub use get_assets::GetAssetsUseCase;
