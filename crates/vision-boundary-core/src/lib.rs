//! Building blocks for flat `extern "C"` boundaries over vision SDKs.
//!
//! A vendor SDK throws exceptions and hands out objects with layouts the
//! foreign caller must never see. This crate provides the pieces used to put
//! such an SDK behind a flat ABI:
//! - [`TaggedResult`]: the record every fallible boundary call returns,
//!   separating SDK-known exceptions, unknown exceptions and success,
//! - [`translate`] / [`translate_described`]: run one SDK operation and
//!   downgrade whatever happens (including a panic) into a tagged result,
//! - [`handle`]: opaque handle construction, borrowing, release and the
//!   consuming slot take used by downcasts,
//! - [`BoundaryEnum`] / [`boundary_enum!`]: explicit native <-> boundary
//!   enumeration tables,
//! - [`BorrowedSlice`]: zero-copy pointer + length views,
//! - [`callback`]: enumerate-with-callback loops,
//! - [`text`]: bounded text copies and the owned [`BoundaryString`] handle,
//! - [`SdkLifecycle`]: explicit process-wide init/terminate state.
//!
//! It does *not* know about any concrete SDK. The calibration and camera
//! seams live in `vision-boundary-calib` and `vision-boundary-camera`.

pub mod callback;
mod enum_table;
pub mod handle;
mod lifecycle;
mod logger;
mod payload;
mod slice;
mod status;
pub mod text;
mod translate;
mod wait;

pub use enum_table::BoundaryEnum;
pub use lifecycle::SdkLifecycle;
pub use payload::{Done, Sentinel, ValueRange, DONE};
pub use slice::BorrowedSlice;
pub use status::{Fault, SdkError, SdkResult, StatusCode, TaggedResult};
pub use text::BoundaryString;
pub use translate::{translate, translate_described, translate_unit};
pub use wait::{timeout_from_millis, WaitOutcome};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_levels, level_from_name, LogLevels, Source};
