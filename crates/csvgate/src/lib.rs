//! csvgate: decide whether an uploaded file is a CSV.
//!
//! The detection core lives in [`csvgate_detect`]; this crate adds the upload
//! event envelope (base64 content in a JSON request, HTTP-style response)
//! and the `csvgate` command-line tool.

pub mod envelope;

pub use csvgate_detect as detect;
pub use envelope::{
    decode_upload, encode_event, handle_event, EnvelopeError, EventResponse, ResponseBody, Upload,
};
