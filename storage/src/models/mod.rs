pub(crate) mod command_record;
mod command_update;

pub use command_record::CommandRecord;
pub use command_update::CommandUpdate;
