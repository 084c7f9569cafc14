mod handle;

pub use handle::{RawHandle, WalletHandle};
