pub mod asset;

pub use asset::{AssetRecord, NewAsset, Visibility};
