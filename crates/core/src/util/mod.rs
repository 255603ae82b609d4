pub mod clock;
pub mod retry;
pub mod ring_buffer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use retry::{is_http_retryable, retry_with_backoff, RetryConfig};
pub use ring_buffer::RingBuffer;
