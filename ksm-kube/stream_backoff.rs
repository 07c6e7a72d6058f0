use futures::{Stream, TryStream};
use kube::runtime::utils::Backoff;
use kube::runtime::watcher::{Error as WatcherError, Event};
use pin_project::pin_project;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::time::{Sleep, sleep};

const ERRORS_WARN_THRESHOLD: u32 = 5;

/// Pauses the watcher stream with a [`Backoff`] policy after every error.\
/// **Note** that the backoff is not reset on [`Event::Init`], as the watcher emits it also when it relists
/// after an error. Any other successful event resets it.
#[pin_project]
pub struct StreamBackoff<S, B, K> {
    #[pin]
    stream: S,
    backoff: B,
    #[pin]
    sleep: Option<Sleep>,
    given_up: bool,
    consecutive_errors: u32,
    _phantom: PhantomData<K>,
}

impl<S, B, K> StreamBackoff<S, B, K> {
    /// Creates new [`StreamBackoff`] instance.
    pub fn new(stream: S, backoff: B) -> Self {
        Self {
            stream,
            backoff,
            sleep: None,
            given_up: false,
            consecutive_errors: 0,
            _phantom: PhantomData,
        }
    }
}

impl<S, B, K> Stream for StreamBackoff<S, B, K>
where
    S: TryStream<Ok = Event<K>, Error = WatcherError>,
    B: Backoff,
{
    type Item = Result<Event<K>, WatcherError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.given_up {
            return Poll::Ready(None);
        }

        if let Some(delay) = this.sleep.as_mut().as_pin_mut() {
            if delay.poll(cx).is_pending() {
                return Poll::Pending;
            }

            this.sleep.set(None);
        }

        let item = this.stream.try_poll_next(cx);
        match &item {
            Poll::Ready(Some(Err(_))) => {
                *this.consecutive_errors += 1;
                if *this.consecutive_errors == ERRORS_WARN_THRESHOLD {
                    tracing::warn!("Watcher failed {ERRORS_WARN_THRESHOLD} times in a row");
                }

                match this.backoff.next() {
                    Some(duration) => {
                        tracing::debug!(?duration, "Watcher error received, backing off");
                        this.sleep.set(Some(sleep(duration)));
                    },
                    None => {
                        tracing::debug!("Watcher error received, giving up");
                        *this.given_up = true;
                    },
                }
            },
            Poll::Ready(Some(Ok(Event::Init))) => (),
            Poll::Ready(Some(Ok(_))) => {
                *this.consecutive_errors = 0;
                this.backoff.reset();
            },
            Poll::Ready(None) | Poll::Pending => (),
        }

        item
    }
}
