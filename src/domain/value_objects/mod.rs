mod encoded_image;
mod event_id;
mod local_record_id;
mod payload;
mod record_kind;
mod user_id;

pub use encoded_image::EncodedImage;
pub use event_id::EventId;
pub use local_record_id::LocalRecordId;
pub use payload::RecordPayload;
pub use record_kind::RecordKind;
pub use user_id::UserId;
