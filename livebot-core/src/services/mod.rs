pub mod notify_service;
pub mod stream_service;

pub use notify_service::NotifyService;
pub use stream_service::StreamService;
