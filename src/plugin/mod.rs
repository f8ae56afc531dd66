pub mod exports;
pub mod host;
pub mod shim;
