pub mod error;
pub mod file_type;
pub mod job;
pub mod price_list;
pub mod record;
pub mod render;
pub mod session;

pub use error::{InputError, ItemParseError, SessionError};
pub use file_type::{UploadFile, UploadKind};
pub use job::{
    ChatMessageJob, ChatMessageRequest, DocumentJob, ExportLink, Item, JobStatus,
    StatusRegression, UploadReceipt,
};
pub use price_list::{
    PriceListHit, PriceListOptions, PriceListReceipt, PriceListSearchQuery, PriceListStatus,
    PriceListSummary,
};
pub use record::ItemRecord;
pub use render::{FieldLayout, ResultRow, ResultTable, TableRow, render_items};
pub use session::{Session, TrackedJob};
