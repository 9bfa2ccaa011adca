pub mod stream_monitor;
