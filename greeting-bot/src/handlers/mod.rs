//! Chain handlers: request log, allowlist, commands, the greeting orchestrator and its sub-flows.

mod allowlist;
mod command;
mod greeting;
mod image_card;
mod request_log;
mod session;
mod song;
mod sub_flow;

pub use allowlist::AllowlistHandler;
pub use command::{CommandHandler, MSG_GREET_USAGE, MSG_START};
pub use greeting::{GreetingHandler, MSG_GENERIC_FAILURE};
pub use image_card::{ImageCardFlow, MSG_IMAGE_DONE, MSG_IMAGE_FAILED, MSG_IMAGE_STATUS};
pub use request_log::{RequestLogHandler, Trigger};
pub use session::{Delivery, FlowOutcome, GreetingSession, SessionState};
pub use song::{SongFlow, MSG_SONG_DONE, MSG_SONG_FAILED, MSG_SONG_STATUS, MSG_SONG_TIMEOUT};
pub use sub_flow::{SubFlow, SubFlowOutcome};
