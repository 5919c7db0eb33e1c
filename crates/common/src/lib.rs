pub mod labels;
pub mod lag;
pub mod severity;
pub mod snapshot;
pub mod status;
pub mod time;
